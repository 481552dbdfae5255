use crate::app::App;
use boxgrid_layout::{LayoutTree, Node, NodeId, PartialStyle, Style};
use tracing::info;

const HOVER_SHADE: i32 = 30;

/// Shows any layout document; highlights the box under the mouse and logs clicks.
pub struct ViewerApp {
    tree: LayoutTree,
}

impl ViewerApp {
    pub fn new(tree: LayoutTree) -> Self {
        Self { tree }
    }
}

impl App for ViewerApp {
    fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    fn stylize(
        &self,
        id: NodeId,
        _node: &Node,
        style: &Style,
        hovered: Option<NodeId>,
    ) -> PartialStyle {
        if hovered == Some(id) {
            PartialStyle::new()
                .bg(style.bg - HOVER_SHADE)
                .fg(style.fg - HOVER_SHADE)
        } else {
            PartialStyle::new()
        }
    }

    fn on_click(&mut self, id: NodeId) -> bool {
        if let Some(node) = self.tree.node(id) {
            match node.name() {
                Some(name) => info!(?id, name, "clicked"),
                None => info!(?id, kind = node.kind.as_str(), "clicked"),
            }
        }
        false
    }
}
