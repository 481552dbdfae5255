mod offline;

use anyhow::{Context, Result};
use boxgrid_layout::RenderOptions;
use boxgrid_tui::{App, CalcApp, RunnerConfig, TuiRunner, ViewerApp};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BOXGRID_LOG";

#[derive(Parser)]
#[command(name = "boxgrid")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show verbose output including the full error chain
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file. Interactive commands log nothing without it
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct Viewport {
    /// Grid width in cells
    #[arg(long, default_value_t = 80)]
    width: u16,
    /// Grid height in cells
    #[arg(long, default_value_t = 24)]
    height: u16,
}

#[derive(Args, Debug, Clone, Copy)]
struct Look {
    /// Border shading relative to the box background
    #[arg(long, default_value_t = RenderOptions::DEFAULT_BEVEL, allow_negative_numbers = true)]
    bevel: i32,
}

impl Look {
    fn render_options(self) -> RenderOptions {
        RenderOptions {
            bevel: self.bevel,
            ..RenderOptions::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a document and print the drawn character grid
    Render {
        /// Path to the layout document
        file: PathBuf,
        #[command(flatten)]
        viewport: Viewport,
        #[command(flatten)]
        look: Look,
    },
    /// Print the node at a cell: its name, kind#id when unnamed, or `none`
    #[command(allow_negative_numbers = true)]
    Hit {
        /// Path to the layout document
        file: PathBuf,
        x: i32,
        y: i32,
        #[command(flatten)]
        viewport: Viewport,
    },
    /// Show a document fullscreen with hover highlighting
    Run {
        /// Path to the layout document
        file: PathBuf,
        /// Do not capture the mouse
        #[arg(long)]
        no_mouse: bool,
        #[command(flatten)]
        look: Look,
    },
    /// Interactive calculator
    Calc {
        #[command(flatten)]
        look: Look,
    },
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Run { .. } | Commands::Calc { .. })
    }
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    if let Err(err) = run(cli) {
        if verbose {
            eprintln!("Error: {err:?}");
        } else {
            eprintln!("Error: {err}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(
        cli.verbose,
        cli.log_file.as_deref(),
        cli.command.is_interactive(),
    )?;

    match cli.command {
        Commands::Render {
            file,
            viewport,
            look,
        } => {
            let mut tree = offline::load(&file)?;
            let lines = offline::render_lines(
                &mut tree,
                viewport.width,
                viewport.height,
                &look.render_options(),
            )?;
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Hit {
            file,
            x,
            y,
            viewport,
        } => {
            let mut tree = offline::load(&file)?;
            let hit = offline::describe_hit(&mut tree, viewport.width, viewport.height, x, y)?;
            println!("{hit}");
            Ok(())
        }
        Commands::Run {
            file,
            no_mouse,
            look,
        } => {
            let app = ViewerApp::new(offline::load(&file)?);
            run_fullscreen(app, !no_mouse, look)
        }
        Commands::Calc { look } => {
            let app = CalcApp::new().context("Failed to load the calculator layout")?;
            run_fullscreen(app, true, look)
        }
    }
}

fn run_fullscreen<A: App>(app: A, mouse: bool, look: Look) -> Result<()> {
    let config = RunnerConfig {
        mouse,
        render: look.render_options(),
        ..RunnerConfig::default()
    };
    let mut runner = TuiRunner::new(app, config).context("Failed to open the terminal")?;
    runner.run().context("Application error")?;
    Ok(())
}

/// Install the global subscriber. Filter from `BOXGRID_LOG`, else `warn`
/// (`debug` with `--verbose`).
fn init_logging(verbose: bool, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        // stderr shares the screen with the fullscreen UI
        None if interactive => return Ok(()),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_defaults() {
        let cli = Cli::try_parse_from(["boxgrid", "render", "layout.json"]).unwrap();
        match cli.command {
            Commands::Render {
                file,
                viewport,
                look,
            } => {
                assert_eq!(file, PathBuf::from("layout.json"));
                assert_eq!((viewport.width, viewport.height), (80, 24));
                assert_eq!(look.bevel, 30);
            }
            _ => panic!("expected render"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_hit_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "boxgrid", "hit", "layout.json", "-1", "3", "--width", "40", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Hit { x, y, viewport, .. } => {
                assert_eq!((x, y), (-1, 3));
                assert_eq!(viewport.width, 40);
            }
            _ => panic!("expected hit"),
        }
    }

    #[test]
    fn test_interactive_commands() {
        let calc = Cli::try_parse_from(["boxgrid", "calc", "--bevel", "10"]).unwrap();
        assert!(calc.command.is_interactive());

        let run = Cli::try_parse_from(["boxgrid", "run", "x.json", "--no-mouse"]).unwrap();
        assert!(run.command.is_interactive());

        let render = Cli::try_parse_from(["boxgrid", "render", "x.json"]).unwrap();
        assert!(!render.command.is_interactive());
    }

    #[test]
    fn test_bevel_flows_into_render_options() {
        let options = Look { bevel: -5 }.render_options();
        assert_eq!(options.bevel, -5);
        assert_eq!(options.defaults, RenderOptions::default().defaults);
    }
}
