use boxgrid_layout::{Cell, CellBuffer, Color, Paint, Surface};
use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{self, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Stdout, Write};

/// Fullscreen crossterm terminal.
///
/// Drawing goes into a back buffer; [`Terminal::present`] writes only the
/// cells that changed since the previous frame and flushes once.
pub struct Terminal {
    stdout: Stdout,
    active: bool,
    mouse: bool,
    back: CellBuffer,
    /// Last presented frame. `None` forces a full redraw.
    front: Option<CellBuffer>,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        Ok(Self {
            stdout: io::stdout(),
            active: false,
            mouse: false,
            back: CellBuffer::new(cols, rows),
            front: None,
        })
    }

    /// Enter fullscreen mode: alternate screen, raw mode, hidden cursor and,
    /// optionally, mouse reporting.
    pub fn enter(&mut self, mouse: bool) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        self.stdout.execute(terminal::EnterAlternateScreen)?;
        self.stdout.execute(cursor::Hide)?;
        if mouse {
            self.stdout.execute(EnableMouseCapture)?;
        }
        self.active = true;
        self.mouse = mouse;
        self.refresh_size();
        Ok(())
    }

    /// Leave fullscreen mode, restoring the terminal.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        if self.mouse {
            self.stdout.execute(DisableMouseCapture)?;
        }
        self.stdout.execute(style::ResetColor)?;
        self.stdout.execute(cursor::Show)?;
        self.stdout.execute(terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    /// Current size in (columns, rows).
    #[inline]
    pub fn size(&self) -> (u16, u16) {
        (self.back.width(), self.back.height())
    }

    /// Re-read the terminal size. Call on resize events.
    pub fn refresh_size(&mut self) {
        if let Ok((cols, rows)) = terminal::size() {
            self.resize(cols, rows);
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if self.size() != (cols, rows) {
            self.back = CellBuffer::new(cols, rows);
            self.front = None;
        }
    }

    /// Blank the back buffer.
    pub fn clear(&mut self) {
        self.back.clear();
    }

    /// Write changed cells to the terminal and flush.
    pub fn present(&mut self) -> io::Result<()> {
        if self.front.is_none() {
            self.stdout.queue(style::ResetColor)?;
            self.stdout.queue(terminal::Clear(ClearType::All))?;
        }

        let (cols, rows) = self.size();
        let mut pen: Option<(Option<Color>, Option<Color>)> = None;
        for y in 0..rows {
            let mut cursor_x: Option<u16> = None;
            for x in 0..cols {
                let Some(cell) = self.back.get(x, y) else {
                    continue;
                };
                let unchanged = self
                    .front
                    .as_ref()
                    .and_then(|f| f.get(x, y))
                    .is_some_and(|old| old == cell);
                if unchanged || cell.ch == Cell::CONTINUATION {
                    cursor_x = None;
                    continue;
                }

                if cursor_x != Some(x) {
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                if pen != Some((cell.fg, cell.bg)) {
                    self.stdout.queue(SetForegroundColor(to_crossterm(cell.fg)))?;
                    self.stdout.queue(SetBackgroundColor(to_crossterm(cell.bg)))?;
                    pen = Some((cell.fg, cell.bg));
                }
                self.stdout.queue(Print(cell.ch))?;
                cursor_x = Some(x + 1);
            }
        }

        self.stdout.queue(style::ResetColor)?;
        self.stdout.flush()?;
        self.front = Some(self.back.clone());
        Ok(())
    }
}

fn to_crossterm(color: Option<Color>) -> style::Color {
    match color {
        Some(Color { r, g, b }) => style::Color::Rgb { r, g, b },
        None => style::Color::Reset,
    }
}

impl Surface for Terminal {
    fn size(&self) -> (u16, u16) {
        Terminal::size(self)
    }

    fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, paint: Paint) -> io::Result<()> {
        self.back.fill(x, y, width, height, paint)
    }

    fn print(&mut self, text: &str, x: i32, y: i32, fg: Color) -> io::Result<()> {
        self.back.print(text, x, y, fg)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
