use boxgrid_layout::{LayoutTree, Node, NodeId, PartialStyle, Style, Stylizer};
use crossterm::event::{KeyCode, KeyEvent};

/// What the runner should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Redraw,
    Quit,
}

/// An interactive application driven by [`crate::TuiRunner`].
///
/// The app owns its layout tree; the runner owns the terminal, the hover
/// state and the frame loop.
pub trait App {
    fn tree(&self) -> &LayoutTree;

    fn tree_mut(&mut self) -> &mut LayoutTree;

    /// Per-frame style overrides. `hovered` is the node under the mouse, if any.
    fn stylize(
        &self,
        _id: NodeId,
        _node: &Node,
        _style: &Style,
        _hovered: Option<NodeId>,
    ) -> PartialStyle {
        PartialStyle::new()
    }

    /// Left click on `id`. Returns whether the screen needs a redraw.
    fn on_click(&mut self, _id: NodeId) -> bool {
        false
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
            _ => Control::Continue,
        }
    }
}

/// Adapts an [`App`] plus the current hover target into a [`Stylizer`].
pub struct HostStylizer<'a, A: ?Sized> {
    pub app: &'a A,
    pub hovered: Option<NodeId>,
}

impl<A: App + ?Sized> Stylizer for HostStylizer<'_, A> {
    fn stylize(&self, id: NodeId, node: &Node, style: &Style) -> PartialStyle {
        self.app.stylize(id, node, style, self.hovered)
    }
}
