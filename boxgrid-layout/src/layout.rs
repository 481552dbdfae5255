use crate::error::{LayoutError, Result};
use crate::node::{NodeId, NodeKind, Rect, SizeSpec};
use crate::tree::LayoutTree;
use tracing::{debug, trace};

/// Vec-indexed geometry storage.
///
/// Uses `NodeId::index()` for O(1) lookup with no hashing overhead.
/// Slots for nodes the last pass did not reach stay `None`.
#[derive(Debug, Clone, Default)]
pub struct GeometryMap {
    entries: Vec<Option<Rect>>,
}

impl GeometryMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: vec![None; n],
        }
    }

    #[inline]
    pub fn set(&mut self, id: NodeId, rect: Rect) {
        let idx = id.index();
        if idx >= self.entries.len() {
            self.entries.resize(idx + 1, None);
        }
        self.entries[idx] = Some(rect);
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Rect> {
        self.entries.get(id.index()).and_then(|e| e.as_ref())
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }
}

/// Assign absolute geometry to every node reachable from the root.
///
/// - **Box**: takes the whole context rectangle; its children get the same one.
/// - **Rows / Cols**: split height / width. Fixed children get exactly their
///   size, flex children share what is left in proportion to their weight,
///   each rounded down independently. The rounding remainder is left unused.
///   The cross axis always spans the full container.
///
/// On error the tree stays marked as stale and its geometry must not be used.
pub fn compute(tree: &mut LayoutTree, viewport_width: u16, viewport_height: u16) -> Result<()> {
    debug!(viewport_width, viewport_height, "computing layout");
    tree.viewport = Some((viewport_width, viewport_height));
    tree.computed = false;

    let root = tree.root();
    compute_node(
        tree,
        root,
        Rect::new(0, 0, viewport_width, viewport_height),
    )?;

    tree.computed = true;
    debug!("layout computed");
    Ok(())
}

fn compute_node(tree: &mut LayoutTree, id: NodeId, rect: Rect) -> Result<()> {
    trace!(?id, ?rect, "allocate");
    tree.geometry.set(id, rect);

    let kind = match tree.node(id) {
        Some(node) => node.kind,
        None => return Ok(()),
    };
    // Clone children vec to release the borrow on the tree
    let children = tree.children(id).to_vec();

    match kind {
        NodeKind::Box => {
            for child in children {
                compute_node(tree, child, rect)?;
            }
            Ok(())
        }
        NodeKind::Rows => compute_linear(tree, id, &children, rect, true),
        NodeKind::Cols => compute_linear(tree, id, &children, rect, false),
    }
}

fn compute_linear(
    tree: &mut LayoutTree,
    id: NodeId,
    children: &[NodeId],
    rect: Rect,
    vertical: bool,
) -> Result<()> {
    let extent = if vertical { rect.height } else { rect.width };
    let sizes = distribute(tree, id, children, extent, vertical)?;

    let mut cursor = if vertical { rect.y } else { rect.x };
    for (&child, size) in children.iter().zip(sizes) {
        let child_rect = if vertical {
            Rect::new(rect.x, cursor, rect.width, size)
        } else {
            Rect::new(cursor, rect.y, size, rect.height)
        };
        compute_node(tree, child, child_rect)?;
        cursor = cursor.saturating_add(size);
    }
    Ok(())
}

/// Sizes of `children` along the stacking axis of a container `extent` cells long.
fn distribute(
    tree: &LayoutTree,
    id: NodeId,
    children: &[NodeId],
    extent: u16,
    vertical: bool,
) -> Result<Vec<u16>> {
    let specs: Vec<SizeSpec> = children
        .iter()
        .map(|&c| {
            tree.node(c)
                .map(|n| n.size_along(vertical))
                .unwrap_or_default()
        })
        .collect();

    let mut fixed_total: i64 = 0;
    let mut total_weight = 0.0_f64;
    for spec in &specs {
        match *spec {
            SizeSpec::Fixed(n) => fixed_total += n as i64,
            SizeSpec::Flex(weight) => {
                if !(weight.is_finite() && weight > 0.0) {
                    return Err(LayoutError::InvalidSizeSpec { node: id, weight });
                }
                total_weight += weight;
            }
        }
    }

    let remaining = extent as i64 - fixed_total;
    if remaining < 0 {
        return Err(LayoutError::SizeOverflow {
            node: id,
            required: fixed_total,
            available: extent as i64,
        });
    }

    Ok(specs
        .iter()
        .map(|spec| match *spec {
            SizeSpec::Fixed(n) => n,
            SizeSpec::Flex(weight) => (weight / total_weight * remaining as f64).floor() as u16,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeArena};

    fn linear(kind: NodeKind, sizes: &[Option<SizeSpec>]) -> (LayoutTree, Vec<NodeId>) {
        let mut arena = NodeArena::new();
        let children: Vec<NodeId> = sizes
            .iter()
            .map(|size| {
                let mut node = Node::boxed();
                match kind {
                    NodeKind::Rows => node.height = *size,
                    _ => node.width = *size,
                }
                arena.create(node)
            })
            .collect();
        let root = arena.create(Node::new(kind).with_children(children.clone()));
        (LayoutTree::new(arena, root), children)
    }

    #[test]
    fn test_cols_fixed_then_flex() {
        let (mut tree, kids) = linear(NodeKind::Cols, &[Some(SizeSpec::Fixed(4)), None]);
        compute(&mut tree, 10, 3).unwrap();

        assert_eq!(tree.geometry(kids[0]), Some(Rect::new(0, 0, 4, 3)));
        assert_eq!(tree.geometry(kids[1]), Some(Rect::new(4, 0, 6, 3)));
        assert!(tree.is_computed());
    }

    #[test]
    fn test_rows_rounding_remainder_is_dropped() {
        let (mut tree, kids) = linear(NodeKind::Rows, &[None, None, None]);
        compute(&mut tree, 5, 10).unwrap();

        let heights: Vec<u16> = kids.iter().map(|&k| tree.geometry(k).unwrap().height).collect();
        assert_eq!(heights, vec![3, 3, 3]);
        assert_eq!(tree.geometry(kids[2]).unwrap().y, 6);
    }

    #[test]
    fn test_weighted_flex() {
        let (mut tree, kids) = linear(
            NodeKind::Cols,
            &[Some(SizeSpec::Flex(1.0)), Some(SizeSpec::Flex(3.0))],
        );
        compute(&mut tree, 20, 1).unwrap();

        assert_eq!(tree.geometry(kids[0]).unwrap().width, 5);
        assert_eq!(tree.geometry(kids[1]).unwrap().width, 15);
    }

    #[test]
    fn test_fixed_overflow_is_error() {
        let (mut tree, _) = linear(
            NodeKind::Rows,
            &[Some(SizeSpec::Fixed(6)), Some(SizeSpec::Fixed(5))],
        );
        let err = compute(&mut tree, 4, 10).unwrap_err();

        assert!(matches!(
            err,
            LayoutError::SizeOverflow {
                required: 11,
                available: 10,
                ..
            }
        ));
        assert!(!tree.is_computed());
    }

    #[test]
    fn test_zero_weight_is_error() {
        let (mut tree, _) = linear(NodeKind::Cols, &[Some(SizeSpec::Flex(0.0)), None]);
        let err = compute(&mut tree, 10, 10).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSizeSpec { weight, .. } if weight == 0.0));
        assert!(!tree.is_computed());
    }

    #[test]
    fn test_negative_and_non_finite_weights_are_errors() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let (mut tree, _) = linear(NodeKind::Rows, &[Some(SizeSpec::Flex(weight)), None]);
            let err = compute(&mut tree, 10, 10).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidSizeSpec { .. }), "{weight}");
            assert!(!tree.is_computed());
        }
    }

    #[test]
    fn test_flex_share_rounds_after_dividing_weight() {
        // 1/49 * 49 is just under 1.0 in f64, so each child floors to zero
        let (mut tree, kids) = linear(NodeKind::Cols, &[Some(SizeSpec::Flex(1.0)); 49]);
        compute(&mut tree, 49, 3).unwrap();

        for k in &kids {
            assert_eq!(tree.geometry(*k).unwrap().width, 0);
        }
        assert_eq!(tree.geometry(kids[48]).unwrap().x, 0);
    }

    #[test]
    fn test_box_children_share_rect() {
        let mut arena = NodeArena::new();
        let inner = arena.create(Node::boxed());
        let root = arena.create(Node::boxed().with_children([inner]));
        let mut tree = LayoutTree::new(arena, root);

        compute(&mut tree, 7, 4).unwrap();
        assert_eq!(tree.geometry(inner), tree.geometry(root));
    }

    #[test]
    fn test_cross_axis_fills_container() {
        let (mut tree, kids) = linear(NodeKind::Rows, &[Some(SizeSpec::Fixed(2)), None]);
        compute(&mut tree, 9, 6).unwrap();
        for k in kids {
            assert_eq!(tree.geometry(k).unwrap().width, 9);
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let (mut tree, kids) = linear(
            NodeKind::Cols,
            &[Some(SizeSpec::Flex(2.0)), Some(SizeSpec::Fixed(3)), None],
        );
        compute(&mut tree, 17, 2).unwrap();
        let first: Vec<_> = kids.iter().map(|&k| tree.geometry(k)).collect();
        compute(&mut tree, 17, 2).unwrap();
        let second: Vec<_> = kids.iter().map(|&k| tree.geometry(k)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_geometry_map_set_get_clear() {
        let mut map = GeometryMap::new();
        let id = NodeId::from_u32(5);
        assert!(map.get(id).is_none());

        map.set(id, Rect::new(1, 2, 3, 4));
        assert_eq!(map.get(id), Some(&Rect::new(1, 2, 3, 4)));

        map.clear();
        assert!(map.get(id).is_none());
    }
}
