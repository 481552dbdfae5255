use crate::error::{LayoutError, Result};
use crate::layout::GeometryMap;
use crate::node::{Node, NodeArena, NodeId, Rect};

/// A node tree plus the geometry of its most recent compute pass.
///
/// Geometry is only valid while [`LayoutTree::is_computed`] is true; changing
/// the viewport or calling [`LayoutTree::invalidate`] clears it.
pub struct LayoutTree {
    arena: NodeArena,
    root: NodeId,
    pub(crate) geometry: GeometryMap,
    pub(crate) viewport: Option<(u16, u16)>,
    pub(crate) computed: bool,
}

impl LayoutTree {
    pub fn new(arena: NodeArena, root: NodeId) -> Self {
        let geometry = GeometryMap::with_capacity(arena.len());
        Self {
            arena,
            root,
            geometry,
            viewport: None,
            computed: false,
        }
    }

    /// Parse a JSON layout document (`{"root": {...}}`).
    pub fn from_json(source: &str) -> Result<Self> {
        crate::document::load_document(source)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Mutable access to node data. Geometry is left as is; callers that
    /// change sizes or children must [`invalidate`](Self::invalidate).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.children(id)
    }

    /// Replace the text of a node. Returns false if the id is unknown.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.text = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Computed rectangle of a node, if the last compute pass reached it.
    pub fn geometry(&self, id: NodeId) -> Option<Rect> {
        self.geometry.get(id).copied()
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn viewport(&self) -> Option<(u16, u16)> {
        self.viewport
    }

    /// Record a new viewport size; geometry becomes stale if it changed.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        if self.viewport != Some((width, height)) {
            self.viewport = Some((width, height));
            self.computed = false;
        }
    }

    pub fn invalidate(&mut self) {
        self.computed = false;
    }

    pub(crate) fn ensure_computed(&self) -> Result<()> {
        if self.computed {
            Ok(())
        } else {
            tracing::warn!("layout used before a compute pass for the current viewport");
            Err(LayoutError::StaleGeometry)
        }
    }
}

impl std::fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutTree")
            .field("root", &self.root)
            .field("nodes", &self.arena.len())
            .field("viewport", &self.viewport)
            .field("computed", &self.computed)
            .finish()
    }
}

/// Find a node by name. Children are searched before their parent, in child
/// order; the first match wins.
pub fn find_by_name(tree: &LayoutTree, name: &str) -> Option<NodeId> {
    find_in(tree, tree.root(), name)
}

fn find_in(tree: &LayoutTree, id: NodeId, name: &str) -> Option<NodeId> {
    let node = tree.node(id)?;
    for &child in &node.children {
        if let Some(found) = find_in(tree, child, name) {
            return Some(found);
        }
    }
    if node.name() == Some(name) {
        Some(id)
    } else {
        None
    }
}
