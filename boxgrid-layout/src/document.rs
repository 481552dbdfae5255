//! JSON layout documents.
//!
//! ```json
//! { "root": { "type": "rows", "elements": [
//!     { "type": "box", "height": { "fixed": 3 }, "name": "title", "text": "Hi" },
//!     { "type": "box", "style": { "bg": "#303080", "h-align": "center" } }
//! ] } }
//! ```

use crate::error::{LayoutError, Result};
use crate::node::{Node, NodeArena, NodeId, NodeKind, SizeSpec};
use crate::style::{Color, HAlign, PartialStyle, VAlign};
use crate::tree::LayoutTree;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RawDocument {
    root: RawNode,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    elements: Vec<RawNode>,
    width: Option<RawSize>,
    height: Option<RawSize>,
    text: Option<serde_json::Value>,
    style: Option<RawStyle>,
    name: Option<String>,
}

/// `{"fixed": n}` wins over `{"flex": w}`; `{}` means flex 1.
#[derive(Debug, Deserialize)]
struct RawSize {
    fixed: Option<u16>,
    flex: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawStyle {
    bg: Option<RawColor>,
    fg: Option<RawColor>,
    #[serde(rename = "h-align")]
    h_align: Option<String>,
    #[serde(rename = "v-align")]
    v_align: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColor {
    Hex(String),
    Channels([u8; 3]),
    Packed(u32),
}

impl RawSize {
    fn into_spec(self) -> SizeSpec {
        match self.fixed {
            Some(n) => SizeSpec::Fixed(n),
            None => SizeSpec::Flex(self.flex.unwrap_or(1.0)),
        }
    }
}

impl RawColor {
    fn into_color(self) -> Result<Color> {
        match self {
            RawColor::Hex(s) => Color::parse_hex(&s),
            RawColor::Channels([r, g, b]) => Ok(Color::rgb(r, g, b)),
            RawColor::Packed(v) if v <= 0xff_ffff => Ok(Color::from_u32(v)),
            RawColor::Packed(v) => Err(LayoutError::InvalidColor(format!("{v:#x}"))),
        }
    }
}

impl RawStyle {
    fn into_style(self) -> Result<PartialStyle> {
        Ok(PartialStyle {
            bg: self.bg.map(RawColor::into_color).transpose()?,
            fg: self.fg.map(RawColor::into_color).transpose()?,
            h_align: self.h_align.as_deref().map(str::parse::<HAlign>).transpose()?,
            v_align: self.v_align.as_deref().map(str::parse::<VAlign>).transpose()?,
        })
    }
}

fn parse_kind(kind: &str) -> Result<NodeKind> {
    match kind {
        "box" => Ok(NodeKind::Box),
        "rows" => Ok(NodeKind::Rows),
        "cols" => Ok(NodeKind::Cols),
        other => Err(LayoutError::UnknownNodeKind(other.to_string())),
    }
}

fn text_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn build(raw: RawNode, arena: &mut NodeArena) -> Result<NodeId> {
    let kind = parse_kind(&raw.kind)?;
    let children = raw
        .elements
        .into_iter()
        .map(|child| build(child, arena))
        .collect::<Result<Vec<_>>>()?;

    let node = Node {
        kind,
        name: raw.name.map(Into::into),
        text: raw.text.and_then(text_value),
        width: raw.width.map(RawSize::into_spec),
        height: raw.height.map(RawSize::into_spec),
        style: raw.style.map(RawStyle::into_style).transpose()?.unwrap_or_default(),
        children,
    };
    Ok(arena.create(node))
}

fn into_tree(doc: RawDocument) -> Result<LayoutTree> {
    let mut arena = NodeArena::new();
    let root = build(doc.root, &mut arena)?;
    tracing::debug!(nodes = arena.len(), "layout document loaded");
    Ok(LayoutTree::new(arena, root))
}

/// Parse a layout document from a JSON string.
pub fn load_document(source: &str) -> Result<LayoutTree> {
    into_tree(serde_json::from_str(source)?)
}

/// Parse a layout document from any reader (file, stdin, ...).
pub fn load_document_from_reader<R: Read>(reader: R) -> Result<LayoutTree> {
    into_tree(serde_json::from_reader(reader)?)
}
