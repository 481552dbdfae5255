pub mod app;
pub mod calc;
pub mod runner;
pub mod terminal;
pub mod viewer;

pub use app::{App, Control, HostStylizer};
pub use calc::{CalcApp, Calculator, Key, Op};
pub use runner::{FrameState, RunError, RunnerConfig, TuiRunner, draw_frame};
pub use terminal::Terminal;
pub use viewer::ViewerApp;
