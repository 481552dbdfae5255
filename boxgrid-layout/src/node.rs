use crate::style::PartialStyle;
use smartstring::{LazyCompact, SmartString};

/// Stable identifier of a node, assigned when it is added to a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Drawn as a bordered rectangle; children share its rectangle.
    Box,
    /// Stacks children top to bottom.
    Rows,
    /// Stacks children left to right.
    Cols,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Box => "box",
            NodeKind::Rows => "rows",
            NodeKind::Cols => "cols",
        }
    }
}

/// Size of a node along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSpec {
    Fixed(u16),
    Flex(f64),
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec::Flex(1.0)
    }
}

/// Absolute screen rectangle in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (left, top) = (self.x as i32, self.y as i32);
        x >= left && y >= top && x < left + self.width as i32 && y < top + self.height as i32
    }
}

pub struct Node {
    pub kind: NodeKind,
    pub name: Option<SmartString<LazyCompact>>,
    pub text: Option<String>,
    pub width: Option<SizeSpec>,
    pub height: Option<SizeSpec>,
    pub style: PartialStyle,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            text: None,
            width: None,
            height: None,
            style: PartialStyle::default(),
            children: Vec::new(),
        }
    }

    pub fn boxed() -> Self {
        Self::new(NodeKind::Box)
    }

    pub fn rows() -> Self {
        Self::new(NodeKind::Rows)
    }

    pub fn cols() -> Self {
        Self::new(NodeKind::Cols)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_width(mut self, size: SizeSpec) -> Self {
        self.width = Some(size);
        self
    }

    pub fn with_height(mut self, size: SizeSpec) -> Self {
        self.height = Some(size);
        self
    }

    pub fn with_style(mut self, style: PartialStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeId>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Size spec along the stacking axis of a `Rows` (vertical) or `Cols` parent.
    pub fn size_along(&self, vertical: bool) -> SizeSpec {
        let spec = if vertical { self.height } else { self.width };
        spec.unwrap_or_default()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("name", &self.name.as_deref())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Append-only node storage. Ids index straight into the backing `Vec`.
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn create(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_ids_are_sequential() {
        let mut arena = NodeArena::new();
        let a = arena.create(Node::boxed());
        let b = arena.create(Node::rows());

        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).unwrap().kind, NodeKind::Rows);
    }

    #[test]
    fn test_missing_size_defaults_to_flex_one() {
        let node = Node::boxed().with_width(SizeSpec::Fixed(4));
        assert_eq!(node.size_along(false), SizeSpec::Fixed(4));
        assert_eq!(node.size_along(true), SizeSpec::Flex(1.0));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 4));
        assert!(!rect.contains(6, 4));
        assert!(!rect.contains(5, 5));
        assert!(!rect.contains(1, 3));
        assert!(!rect.contains(-1, -1));
    }

    #[test]
    fn test_children_of_unknown_id_is_empty() {
        let arena = NodeArena::new();
        assert!(arena.children(NodeId(7)).is_empty());
    }
}
