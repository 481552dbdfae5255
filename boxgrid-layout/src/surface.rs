use crate::style::Color;
use std::io;
use unicode_width::UnicodeWidthChar;

/// What a [`Surface::fill`] writes into each covered cell. `None` fields leave
/// the cell's current value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paint {
    pub bg: Option<Color>,
    pub glyph: Option<char>,
    pub fg: Option<Color>,
}

impl Paint {
    pub fn background(bg: Color) -> Self {
        Self {
            bg: Some(bg),
            ..Self::default()
        }
    }

    pub fn glyph(glyph: char, fg: Color) -> Self {
        Self {
            bg: None,
            glyph: Some(glyph),
            fg: Some(fg),
        }
    }
}

/// Character-grid drawing target.
///
/// Coordinates may be negative or past the edge; implementations clip.
pub trait Surface {
    /// Visible size in cells (columns, rows).
    fn size(&self) -> (u16, u16);

    fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, paint: Paint) -> io::Result<()>;

    fn print(&mut self, text: &str, x: i32, y: i32, fg: Color) -> io::Result<()>;
}

/// Clip `[start, start + len)` to `[0, limit)`.
pub fn clip_span(start: i32, len: i32, limit: u16) -> Option<(u16, u16)> {
    let lo = start.max(0);
    let hi = start.saturating_add(len).min(limit as i32);
    if hi > lo {
        Some((lo as u16, (hi - lo) as u16))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
    };

    /// Right half of a double-width character.
    pub const CONTINUATION: char = '\0';
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// In-memory surface, used for offline rendering and tests.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Cell::BLANK; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            self.cells
                .get_mut(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Characters of one row, continuation cells skipped.
    pub fn line(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| c.ch != Cell::CONTINUATION)
            .map(|c| c.ch)
            .collect()
    }

    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.line(y)).collect()
    }

    /// `len` characters of row `y` starting at column `x`.
    pub fn text_at(&self, x: u16, y: u16, len: usize) -> String {
        self.line(y).chars().skip(x as usize).take(len).collect()
    }
}

impl Surface for CellBuffer {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, paint: Paint) -> io::Result<()> {
        let (Some((x0, w)), Some((y0, h))) = (
            clip_span(x, width, self.width),
            clip_span(y, height, self.height),
        ) else {
            return Ok(());
        };
        for row in y0..y0 + h {
            for col in x0..x0 + w {
                if let Some(cell) = self.get_mut(col, row) {
                    if let Some(bg) = paint.bg {
                        cell.bg = Some(bg);
                    }
                    if let Some(glyph) = paint.glyph {
                        cell.ch = glyph;
                    }
                    if let Some(fg) = paint.fg {
                        cell.fg = Some(fg);
                    }
                }
            }
        }
        Ok(())
    }

    fn print(&mut self, text: &str, x: i32, y: i32, fg: Color) -> io::Result<()> {
        if y < 0 || y >= self.height as i32 {
            return Ok(());
        }
        let row = y as u16;
        let mut col = x;
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(1).max(1) as i32;
            if col >= self.width as i32 {
                break;
            }
            if col >= 0 && col + w <= self.width as i32 {
                let start = col as u16;
                if let Some(cell) = self.get_mut(start, row) {
                    cell.ch = ch;
                    cell.fg = Some(fg);
                }
                for i in 1..w as u16 {
                    if let Some(cell) = self.get_mut(start + i, row) {
                        cell.ch = Cell::CONTINUATION;
                    }
                }
            }
            col += w;
        }
        Ok(())
    }
}
