//! Declarative layout and rendering for character-grid user interfaces.
//!
//! A [`LayoutTree`] of boxes, rows and columns is sized with [`compute`],
//! queried with [`hit_test`] / [`find_by_name`] and drawn with [`render`]
//! onto any [`Surface`].

pub mod document;
pub mod error;
pub mod hit;
pub mod layout;
pub mod node;
pub mod render;
pub mod style;
pub mod surface;
pub mod tree;

pub use document::{load_document, load_document_from_reader};
pub use error::{LayoutError, Result};
pub use hit::hit_test;
pub use layout::{GeometryMap, compute};
pub use node::{Node, NodeArena, NodeId, NodeKind, Rect, SizeSpec};
pub use render::{RenderOptions, render, render_with};
pub use style::{
    Color, HAlign, NoStyle, PartialStyle, Style, Stylizer, VAlign, resolve_style,
};
pub use surface::{Cell, CellBuffer, Paint, Surface};
pub use tree::{LayoutTree, find_by_name};
