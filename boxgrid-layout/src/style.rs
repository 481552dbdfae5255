use crate::error::{LayoutError, Result};
use crate::node::{Node, NodeId};
use std::ops::{Add, Not, Sub};
use std::str::FromStr;

/// 24-bit colour. Scalar arithmetic clamps every channel into `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_u32(packed: u32) -> Self {
        Self::rgb(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn parse_hex(value: &str) -> Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        let invalid = || LayoutError::InvalidColor(value.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16)
                .map(Self::from_u32)
                .map_err(|_| invalid()),
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = v * 16 + v;
                }
                Ok(Self::rgb(channels[0], channels[1], channels[2]))
            }
            _ => Err(invalid()),
        }
    }

    pub fn invert(self) -> Self {
        Self::rgb(255 - self.r, 255 - self.g, 255 - self.b)
    }

    fn shift(self, delta: i32) -> Self {
        let channel = |c: u8| (c as i32).saturating_add(delta).clamp(0, 255) as u8;
        Self::rgb(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl Add<i32> for Color {
    type Output = Color;

    fn add(self, rhs: i32) -> Color {
        self.shift(rhs)
    }
}

impl Sub<i32> for Color {
    type Output = Color;

    fn sub(self, rhs: i32) -> Color {
        self.shift(rhs.saturating_neg())
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.invert()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Bottom,
    Center,
}

impl HAlign {
    /// Column offset of content `size` cells wide inside `available` cells.
    pub fn offset(self, size: i32, available: i32) -> i32 {
        match self {
            HAlign::Left => 0,
            HAlign::Right => available - size,
            HAlign::Center => centered(size, available),
        }
    }
}

impl VAlign {
    /// Row offset of content `size` rows tall inside `available` rows.
    pub fn offset(self, size: i32, available: i32) -> i32 {
        match self {
            VAlign::Top => 0,
            VAlign::Bottom => available - size,
            VAlign::Center => centered(size, available),
        }
    }
}

fn centered(size: i32, available: i32) -> i32 {
    (available as f64 / 2.0 - size as f64 / 2.0).floor() as i32
}

impl FromStr for HAlign {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(HAlign::Left),
            "right" => Ok(HAlign::Right),
            "center" => Ok(HAlign::Center),
            other => Err(LayoutError::InvalidAlignment(other.to_string())),
        }
    }
}

impl FromStr for VAlign {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(VAlign::Top),
            "bottom" => Ok(VAlign::Bottom),
            "center" => Ok(VAlign::Center),
            other => Err(LayoutError::InvalidAlignment(other.to_string())),
        }
    }
}

/// Fully resolved style: every key present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub bg: Color,
    pub fg: Color,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl Style {
    pub const DEFAULT_BG: Color = Color::rgb(51, 51, 51);
    pub const DEFAULT_FG: Color = Color::rgb(204, 204, 204);

    /// Copy of `self` with every key present in `overrides` replaced.
    pub fn merged(&self, overrides: &PartialStyle) -> Style {
        Style {
            bg: overrides.bg.unwrap_or(self.bg),
            fg: overrides.fg.unwrap_or(self.fg),
            h_align: overrides.h_align.unwrap_or(self.h_align),
            v_align: overrides.v_align.unwrap_or(self.v_align),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bg: Self::DEFAULT_BG,
            fg: Self::DEFAULT_FG,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
        }
    }
}

/// Style overrides as declared on a node or returned by a [`Stylizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialStyle {
    pub bg: Option<Color>,
    pub fg: Option<Color>,
    pub h_align: Option<HAlign>,
    pub v_align: Option<VAlign>,
}

impl PartialStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn h_align(mut self, align: HAlign) -> Self {
        self.h_align = Some(align);
        self
    }

    pub fn v_align(mut self, align: VAlign) -> Self {
        self.v_align = Some(align);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bg.is_none() && self.fg.is_none() && self.h_align.is_none() && self.v_align.is_none()
    }
}

/// Late-bound per-node style override, consulted on every render pass.
///
/// Receives the style resolved from defaults, inheritance and the node's own
/// declaration; whatever it returns is merged on top. Implementations must not
/// touch the tree; they may read host state such as the hovered node.
pub trait Stylizer {
    fn stylize(&self, id: NodeId, node: &Node, style: &Style) -> PartialStyle;
}

impl<F> Stylizer for F
where
    F: Fn(NodeId, &Node, &Style) -> PartialStyle,
{
    fn stylize(&self, id: NodeId, node: &Node, style: &Style) -> PartialStyle {
        self(id, node, style)
    }
}

/// Stylizer that never overrides anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyle;

impl Stylizer for NoStyle {
    fn stylize(&self, _id: NodeId, _node: &Node, _style: &Style) -> PartialStyle {
        PartialStyle::default()
    }
}

/// Resolve the style of `node` given its parent's resolved style.
///
/// The result is also the inheritance baseline for the node's children.
pub fn resolve_style<S: Stylizer + ?Sized>(
    parent: &Style,
    id: NodeId,
    node: &Node,
    stylizer: &S,
) -> Style {
    let declared = parent.merged(&node.style);
    let dynamic = stylizer.stylize(id, node, &declared);
    declared.merged(&dynamic)
}
