use crate::error::Result;
use crate::node::NodeId;
use crate::tree::LayoutTree;

/// Find the node that should receive an event at `(x, y)`.
///
/// Children are tested before their parent, in document order, and the first
/// subtree containing the point wins. Overlapping siblings are therefore
/// resolved by document order rather than by paint order.
pub fn hit_test(tree: &LayoutTree, x: i32, y: i32) -> Result<Option<NodeId>> {
    tree.ensure_computed()?;
    Ok(hit_node(tree, tree.root(), x, y))
}

fn hit_node(tree: &LayoutTree, id: NodeId, x: i32, y: i32) -> Option<NodeId> {
    for &child in tree.children(id) {
        if let Some(hit) = hit_node(tree, child, x, y) {
            return Some(hit);
        }
    }
    match tree.geometry(id) {
        Some(rect) if rect.contains(x, y) => Some(id),
        _ => None,
    }
}
