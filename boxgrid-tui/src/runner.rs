use crate::app::{App, Control, HostStylizer};
use crate::terminal::Terminal;
use boxgrid_layout::{
    LayoutError, NodeId, RenderOptions, Surface, compute, hit_test, render_with,
};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Knobs for [`TuiRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// How long to wait for input before checking for a redraw.
    pub frame_interval: Duration,
    /// Report mouse movement and clicks.
    pub mouse: bool,
    pub render: RenderOptions,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            mouse: true,
            render: RenderOptions::default(),
        }
    }
}

/// Redraw bookkeeping, kept apart from the terminal so it can be driven in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    /// The screen must be redrawn.
    pub dirty: bool,
    /// Geometry must be recomputed before the next redraw.
    pub layout_dirty: bool,
    /// Node under the mouse as of the last mouse event.
    pub hovered: Option<NodeId>,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            dirty: true,
            layout_dirty: true,
            hovered: None,
        }
    }
}

impl FrameState {
    pub fn on_resize(&mut self) {
        self.dirty = true;
        self.layout_dirty = true;
    }

    /// Track the hovered node. Returns whether it changed.
    pub fn hover(&mut self, hit: Option<NodeId>) -> bool {
        if self.hovered == hit {
            return false;
        }
        debug!(?hit, "hover changed");
        self.hovered = hit;
        self.dirty = true;
        true
    }

    /// Apply a mouse event: update the hover target and dispatch left clicks.
    ///
    /// Ignored while the tree has no valid geometry.
    pub fn on_mouse<A: App + ?Sized>(&mut self, app: &mut A, mouse: MouseEvent) -> Result<(), RunError> {
        if !app.tree().is_computed() {
            return Ok(());
        }
        let hit = hit_test(app.tree(), mouse.column as i32, mouse.row as i32)?;
        self.hover(hit);

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if let Some(id) = hit {
                debug!(?id, "click");
                if app.on_click(id) {
                    self.dirty = true;
                }
            }
        }
        Ok(())
    }
}

/// Draw one frame if the state says it is needed.
///
/// Recomputes geometry first when `layout_dirty` is set. A layout that does
/// not fit the surface leaves it as is and stays `layout_dirty` until the
/// next resize. Returns whether anything was drawn.
pub fn draw_frame<A, T>(
    app: &mut A,
    surface: &mut T,
    state: &mut FrameState,
    options: &RenderOptions,
) -> Result<bool, RunError>
where
    A: App + ?Sized,
    T: Surface + ?Sized,
{
    if !state.dirty {
        return Ok(false);
    }
    state.dirty = false;

    if state.layout_dirty {
        let (width, height) = surface.size();
        match compute(app.tree_mut(), width, height) {
            Ok(()) => state.layout_dirty = false,
            Err(err @ LayoutError::SizeOverflow { .. }) => {
                warn!(%err, width, height, "layout does not fit the terminal");
                state.hovered = None;
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let stylizer = HostStylizer {
        app: &*app,
        hovered: state.hovered,
    };
    render_with(app.tree(), surface, &stylizer, options)?;
    Ok(true)
}

/// Runs an [`App`] fullscreen: polls terminal input, tracks hover and clicks,
/// and redraws only when something changed.
pub struct TuiRunner<A> {
    app: A,
    terminal: Terminal,
    config: RunnerConfig,
    state: FrameState,
}

impl<A: App> TuiRunner<A> {
    pub fn new(app: A, config: RunnerConfig) -> io::Result<Self> {
        Ok(Self {
            app,
            terminal: Terminal::new()?,
            config,
            state: FrameState::default(),
        })
    }

    /// Run the event loop. Blocks until the app asks to quit.
    pub fn run(&mut self) -> Result<(), RunError> {
        self.terminal.enter(self.config.mouse)?;
        self.state = FrameState::default();
        let result = self.event_loop();
        self.terminal.leave()?;
        result
    }

    fn event_loop(&mut self) -> Result<(), RunError> {
        loop {
            if self.state.dirty {
                self.terminal.clear();
                draw_frame(
                    &mut self.app,
                    &mut self.terminal,
                    &mut self.state,
                    &self.config.render,
                )?;
                self.terminal.present()?;
            }

            if !event::poll(self.config.frame_interval)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => self.state.on_mouse(&mut self.app, mouse)?,
                Event::Resize(cols, rows) => {
                    debug!(cols, rows, "resize");
                    self.terminal.resize(cols, rows);
                    self.state.on_resize();
                }
                _ => {}
            }
        }
    }

    /// Handle a key event. Returns `true` if the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        // Ctrl+C always exits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.app.on_key(key) {
            Control::Quit => true,
            Control::Redraw => {
                self.state.dirty = true;
                false
            }
            Control::Continue => false,
        }
    }
}

/// Errors that can occur during a TUI run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("layout has no node named `{0}`")]
    MissingNode(&'static str),
}
