//! Four-function calculator on top of an embedded layout document.

use crate::app::{App, Control};
use crate::runner::RunError;
use boxgrid_layout::{Color, LayoutTree, Node, NodeId, PartialStyle, Style, find_by_name};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

const OUTPUT: &str = "text_output";
const BUTTON_PREFIX: &str = "btn_";
const MAX_ENTRY_LEN: usize = 15;

const BASE_BG: Color = Color::rgb(178, 178, 178);
const BASE_FG: Color = Color::rgb(25, 25, 25);
const EQUALS_BG: Color = Color::rgb(114, 0, 0);
const HOVER_SHADE: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    /// `None` when the result is not a finite number (division by zero included).
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        let result = match self {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div if rhs == 0.0 => return None,
            Op::Div => lhs / rhs,
        };
        result.is_finite().then_some(result)
    }
}

/// One calculator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Op(Op),
    Equals,
    Clear,
}

impl Key {
    pub fn from_char(c: char) -> Option<Key> {
        let key = match c {
            '0'..='9' => Key::Digit(c as u8 - b'0'),
            '.' => Key::Point,
            '+' => Key::Op(Op::Add),
            '-' => Key::Op(Op::Sub),
            '*' => Key::Op(Op::Mul),
            '/' => Key::Op(Op::Div),
            '=' => Key::Equals,
            'c' | 'C' => Key::Clear,
            _ => return None,
        };
        Some(key)
    }

    /// Key for a button node name such as `btn_7` or `btn_+`.
    pub fn from_button(name: &str) -> Option<Key> {
        let mut chars = name.strip_prefix(BUTTON_PREFIX)?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::from_char(c),
            _ => None,
        }
    }
}

/// Immediate-execution calculator: operators apply left to right, and a
/// repeated `=` repeats the last operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculator {
    accumulator: f64,
    entry: String,
    pending: Option<Op>,
    last: Option<(Op, f64)>,
    error: bool,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        if self.error {
            self.clear();
        }
        match key {
            Key::Digit(d) => {
                if self.entry == "0" {
                    self.entry.clear();
                }
                if self.entry.len() < MAX_ENTRY_LEN {
                    self.entry.push(char::from(b'0' + d.min(9)));
                }
            }
            Key::Point => {
                if self.entry.is_empty() {
                    self.entry.push('0');
                }
                if !self.entry.contains('.') {
                    self.entry.push('.');
                }
            }
            Key::Op(op) => {
                if let Some(value) = self.take_entry() {
                    match self.pending {
                        Some(pending) => self.apply(pending, value),
                        None => self.accumulator = value,
                    }
                }
                if !self.error {
                    self.pending = Some(op);
                    self.last = None;
                }
            }
            Key::Equals => {
                let entry = self.take_entry();
                if let Some(op) = self.pending.take() {
                    let operand = entry.unwrap_or(self.accumulator);
                    self.last = Some((op, operand));
                    self.apply(op, operand);
                } else if let Some(value) = entry {
                    self.accumulator = value;
                    if let Some((op, operand)) = self.last {
                        self.apply(op, operand);
                    }
                } else if let Some((op, operand)) = self.last {
                    self.apply(op, operand);
                }
            }
            Key::Clear => self.clear(),
        }
    }

    /// Text for the display: the entry being typed, else the last result.
    pub fn display(&self) -> String {
        if self.error {
            "Error".to_string()
        } else if !self.entry.is_empty() {
            self.entry.clone()
        } else {
            format_number(self.accumulator)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn take_entry(&mut self) -> Option<f64> {
        if self.entry.is_empty() {
            return None;
        }
        let value = self.entry.parse().ok();
        self.entry.clear();
        value
    }

    fn apply(&mut self, op: Op, rhs: f64) {
        match op.apply(self.accumulator, rhs) {
            Some(result) => self.accumulator = result,
            None => {
                self.clear();
                self.error = true;
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{value:.10}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Calculator UI: buttons named `btn_<key>` and a `text_output` display.
pub struct CalcApp {
    tree: LayoutTree,
    output: NodeId,
    calculator: Calculator,
}

impl CalcApp {
    pub const LAYOUT: &'static str = include_str!("../layouts/calculator.json");

    /// Load the built-in calculator layout.
    pub fn new() -> Result<Self, RunError> {
        Self::with_tree(LayoutTree::from_json(Self::LAYOUT)?)
    }

    /// Use a custom layout. It must contain a node named `text_output`.
    pub fn with_tree(tree: LayoutTree) -> Result<Self, RunError> {
        let output = find_by_name(&tree, OUTPUT).ok_or(RunError::MissingNode(OUTPUT))?;
        let mut app = Self {
            tree,
            output,
            calculator: Calculator::new(),
        };
        app.sync_display();
        Ok(app)
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn press(&mut self, key: Key) {
        debug!(?key, "calculator key");
        self.calculator.press(key);
        self.sync_display();
    }

    fn sync_display(&mut self) {
        self.tree.set_text(self.output, self.calculator.display());
    }
}

impl App for CalcApp {
    fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    fn stylize(
        &self,
        id: NodeId,
        node: &Node,
        _style: &Style,
        hovered: Option<NodeId>,
    ) -> PartialStyle {
        let name = node.name().unwrap_or_default();
        let (mut bg, mut fg) = (BASE_BG, BASE_FG);
        if name == "btn_=" {
            bg = EQUALS_BG;
            fg = Color::WHITE;
        } else if name.starts_with("btn") {
            bg = !bg;
            fg = !fg;
        }
        if hovered == Some(id) && !name.starts_with("text") {
            bg = bg - HOVER_SHADE;
            fg = fg - HOVER_SHADE;
        }
        PartialStyle::new().bg(bg).fg(fg)
    }

    fn on_click(&mut self, id: NodeId) -> bool {
        let key = self
            .tree
            .node(id)
            .and_then(Node::name)
            .and_then(Key::from_button);
        match key {
            Some(key) => {
                self.press(key);
                true
            }
            None => false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        let calc_key = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Enter => Some(Key::Equals),
            KeyCode::Delete => Some(Key::Clear),
            KeyCode::Char(c) => Key::from_char(c),
            _ => None,
        };
        match calc_key {
            Some(k) => {
                self.press(k);
                Control::Redraw
            }
            None => Control::Continue,
        }
    }
}
