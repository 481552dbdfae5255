use crate::error::{LayoutError, Result};
use crate::node::{NodeId, NodeKind, Rect};
use crate::style::{Style, Stylizer, resolve_style};
use crate::surface::{Paint, Surface};
use crate::tree::LayoutTree;
use unicode_width::UnicodeWidthStr;

/// Knobs for a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// How much lighter (top/left) and darker (bottom/right) than the
    /// background the border is drawn.
    pub bevel: i32,
    /// Style inherited by the root.
    pub defaults: Style,
}

impl RenderOptions {
    pub const DEFAULT_BEVEL: i32 = 30;
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bevel: Self::DEFAULT_BEVEL,
            defaults: Style::default(),
        }
    }
}

const VERTICAL: char = '│';
const HORIZONTAL: char = '─';
const BOTTOM_RIGHT: &str = "┘";
const TOP_LEFT: &str = "┌";

/// Draw `tree` onto `surface` with the default [`RenderOptions`].
pub fn render<T, S>(tree: &LayoutTree, surface: &mut T, stylizer: &S) -> Result<()>
where
    T: Surface + ?Sized,
    S: Stylizer + ?Sized,
{
    render_with(tree, surface, stylizer, &RenderOptions::default())
}

/// Walk the tree pre-order, resolving each node's style and drawing every box.
///
/// Rows and columns are not drawn themselves; their resolved style is what
/// their children inherit.
pub fn render_with<T, S>(
    tree: &LayoutTree,
    surface: &mut T,
    stylizer: &S,
    options: &RenderOptions,
) -> Result<()>
where
    T: Surface + ?Sized,
    S: Stylizer + ?Sized,
{
    tree.ensure_computed()?;
    render_node(tree, tree.root(), &options.defaults, surface, stylizer, options)
}

fn render_node<T, S>(
    tree: &LayoutTree,
    id: NodeId,
    parent: &Style,
    surface: &mut T,
    stylizer: &S,
    options: &RenderOptions,
) -> Result<()>
where
    T: Surface + ?Sized,
    S: Stylizer + ?Sized,
{
    let Some(node) = tree.node(id) else {
        return Ok(());
    };
    let style = resolve_style(parent, id, node, stylizer);

    if node.kind == NodeKind::Box {
        let rect = tree.geometry(id).ok_or(LayoutError::StaleGeometry)?;
        if rect.width > 0 && rect.height > 0 {
            draw_box(surface, rect, &style, options.bevel)?;
            if let Some(text) = node.text.as_deref() {
                draw_text(surface, rect, text, &style)?;
            }
        }
    }

    for &child in &node.children {
        render_node(tree, child, &style, surface, stylizer, options)?;
    }
    Ok(())
}

/// Background fill plus a one-cell bevelled border.
pub fn draw_box<T: Surface + ?Sized>(
    surface: &mut T,
    rect: Rect,
    style: &Style,
    bevel: i32,
) -> Result<()> {
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }
    let (x, y) = (rect.x as i32, rect.y as i32);
    let (w, h) = (rect.width as i32, rect.height as i32);
    let dark = style.bg - bevel;
    let light = style.bg + bevel;

    surface.fill(x, y, w, h, Paint::background(style.bg))?;

    // bottom / right
    surface.fill(x + w - 1, y + 1, 1, h - 1, Paint::glyph(VERTICAL, dark))?;
    surface.fill(x + 1, y + h - 1, w - 1, 1, Paint::glyph(HORIZONTAL, dark))?;

    // top / left
    surface.fill(x, y, 1, h - 1, Paint::glyph(VERTICAL, light))?;
    surface.fill(x, y, w - 1, 1, Paint::glyph(HORIZONTAL, light))?;

    surface.print(BOTTOM_RIGHT, x + w - 1, y + h - 1, dark)?;
    surface.print(TOP_LEFT, x, y, light)?;
    Ok(())
}

/// Aligned multi-line text inside the border of `rect`.
pub fn draw_text<T: Surface + ?Sized>(
    surface: &mut T,
    rect: Rect,
    text: &str,
    style: &Style,
) -> Result<()> {
    let lines = split_lines(text);
    let inner_x = rect.x as i32 + 1;
    let inner_y = rect.y as i32 + 1;
    let inner_w = rect.width as i32 - 2;
    let inner_h = rect.height as i32 - 2;

    let top = inner_y + style.v_align.offset(lines.len() as i32, inner_h);
    for (i, line) in lines.iter().enumerate() {
        let left = inner_x + style.h_align.offset(line.width() as i32, inner_w);
        surface.print(line, left, top + i as i32, style.fg)?;
    }
    Ok(())
}

/// Split on every line boundary: `\n`, `\r\n`, a lone `\r`, and the
/// vertical tab, form feed, file/group/record separators, NEL, LS and PS.
/// A trailing boundary does not start an empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute;
    use crate::node::{Node, NodeArena, SizeSpec};
    use crate::style::{Color, HAlign, NoStyle, PartialStyle, VAlign};
    use crate::surface::CellBuffer;

    fn single_box(node: Node, w: u16, h: u16) -> (LayoutTree, NodeId) {
        let mut arena = NodeArena::new();
        let root = arena.create(node);
        let mut tree = LayoutTree::new(arena, root);
        compute(&mut tree, w, h).unwrap();
        (tree, root)
    }

    #[test]
    fn test_render_rejects_stale_tree() {
        let mut arena = NodeArena::new();
        let root = arena.create(Node::boxed());
        let tree = LayoutTree::new(arena, root);
        let mut buf = CellBuffer::new(4, 4);
        assert!(matches!(
            render(&tree, &mut buf, &NoStyle),
            Err(LayoutError::StaleGeometry)
        ));
    }

    #[test]
    fn test_box_border_glyphs() {
        let (tree, _) = single_box(Node::boxed(), 4, 3);
        let mut buf = CellBuffer::new(4, 3);
        render(&tree, &mut buf, &NoStyle).unwrap();

        // top-right and bottom-left corners stay blank
        assert_eq!(buf.to_lines(), vec!["┌── ", "│  │", " ──┘"]);
    }

    #[test]
    fn test_bevel_colors() {
        let style = PartialStyle::new().bg(Color::rgb(100, 100, 100));
        let (tree, _) = single_box(Node::boxed().with_style(style), 4, 3);
        let mut buf = CellBuffer::new(4, 3);
        render(&tree, &mut buf, &NoStyle).unwrap();

        let light = Color::rgb(130, 130, 130);
        let dark = Color::rgb(70, 70, 70);
        assert_eq!(buf.get(0, 0).unwrap().fg, Some(light));
        assert_eq!(buf.get(0, 1).unwrap().fg, Some(light));
        assert_eq!(buf.get(3, 2).unwrap().fg, Some(dark));
        assert_eq!(buf.get(1, 2).unwrap().fg, Some(dark));
        assert_eq!(buf.get(1, 1).unwrap().bg, Some(Color::rgb(100, 100, 100)));
    }

    #[test]
    fn test_custom_bevel() {
        let style = PartialStyle::new().bg(Color::rgb(100, 100, 100));
        let (tree, _) = single_box(Node::boxed().with_style(style), 3, 3);
        let mut buf = CellBuffer::new(3, 3);
        let options = RenderOptions {
            bevel: 10,
            ..RenderOptions::default()
        };
        render_with(&tree, &mut buf, &NoStyle, &options).unwrap();
        assert_eq!(buf.get(0, 0).unwrap().fg, Some(Color::rgb(110, 110, 110)));
    }

    #[test]
    fn test_text_top_left() {
        let (tree, _) = single_box(Node::boxed().with_text("ab\ncd"), 6, 5);
        let mut buf = CellBuffer::new(6, 5);
        render(&tree, &mut buf, &NoStyle).unwrap();

        assert_eq!(buf.text_at(1, 1, 2), "ab");
        assert_eq!(buf.text_at(1, 2, 2), "cd");
        assert_eq!(buf.get(1, 1).unwrap().fg, Some(Style::DEFAULT_FG));
    }

    #[test]
    fn test_text_centered() {
        let style = PartialStyle::new()
            .h_align(HAlign::Center)
            .v_align(VAlign::Center);
        let (tree, _) = single_box(Node::boxed().with_text("7").with_style(style), 7, 5);
        let mut buf = CellBuffer::new(7, 5);
        render(&tree, &mut buf, &NoStyle).unwrap();

        // inner 5x3: column floor(2.5 - 0.5) = 2, row floor(1.5 - 0.5) = 1
        assert_eq!(buf.get(3, 2).unwrap().ch, '7');
    }

    #[test]
    fn test_text_bottom_right() {
        let style = PartialStyle::new()
            .h_align(HAlign::Right)
            .v_align(VAlign::Bottom);
        let (tree, _) = single_box(Node::boxed().with_text("abc").with_style(style), 8, 4);
        let mut buf = CellBuffer::new(8, 4);
        render(&tree, &mut buf, &NoStyle).unwrap();

        assert_eq!(buf.text_at(4, 2, 3), "abc");
    }

    #[test]
    fn test_containers_are_not_drawn_but_pass_style_down() {
        let mut arena = NodeArena::new();
        let child = arena.create(Node::boxed().with_height(SizeSpec::Fixed(3)));
        let red = Color::rgb(200, 0, 0);
        let root = arena.create(
            Node::rows()
                .with_style(PartialStyle::new().bg(red))
                .with_children([child]),
        );
        let mut tree = LayoutTree::new(arena, root);
        compute(&mut tree, 4, 5).unwrap();

        let mut buf = CellBuffer::new(4, 5);
        render(&tree, &mut buf, &NoStyle).unwrap();

        assert_eq!(buf.get(1, 1).unwrap().bg, Some(red));
        // rows below the fixed child belong only to the container
        assert_eq!(buf.get(1, 4).unwrap().bg, None);
    }

    #[test]
    fn test_stylizer_applies_per_node() {
        let mut arena = NodeArena::new();
        let a = arena.create(Node::boxed().with_name("hot"));
        let b = arena.create(Node::boxed());
        let root = arena.create(Node::cols().with_children([a, b]));
        let mut tree = LayoutTree::new(arena, root);
        compute(&mut tree, 6, 3).unwrap();

        let hot = Color::rgb(250, 10, 10);
        let stylizer = |_: NodeId, node: &Node, _: &Style| {
            if node.name() == Some("hot") {
                PartialStyle::new().bg(hot)
            } else {
                PartialStyle::new()
            }
        };
        let mut buf = CellBuffer::new(6, 3);
        render(&tree, &mut buf, &stylizer).unwrap();

        assert_eq!(buf.get(1, 1).unwrap().bg, Some(hot));
        assert_eq!(buf.get(4, 1).unwrap().bg, Some(Style::DEFAULT_BG));
    }

    #[test]
    fn test_zero_sized_box_draws_nothing() {
        let mut arena = NodeArena::new();
        let empty = arena.create(
            Node::boxed()
                .with_width(SizeSpec::Fixed(0))
                .with_text("Z"),
        );
        let root = arena.create(Node::cols().with_children([empty]));
        let mut tree = LayoutTree::new(arena, root);
        compute(&mut tree, 3, 3).unwrap();

        let mut buf = CellBuffer::new(3, 3);
        render(&tree, &mut buf, &NoStyle).unwrap();
        assert_eq!(buf.to_lines(), vec!["   ", "   ", "   "]);
    }

    #[test]
    fn test_split_lines_boundaries() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\rb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\u{2028}b\u{0c}c"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_carriage_return_starts_a_new_row() {
        let (tree, _) = single_box(Node::boxed().with_text("ab\rc"), 5, 4);
        let mut buf = CellBuffer::new(5, 4);
        render(&tree, &mut buf, &NoStyle).unwrap();
        assert_eq!(buf.text_at(1, 1, 2), "ab");
        assert_eq!(buf.text_at(1, 2, 2), "c ");
    }
}
