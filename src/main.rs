//! termlife - Conway's Game of Life in the terminal
//!
//! The board fills the terminal window and wraps around at every edge.
//! The simulation starts paused with every cell dead.
//!
//! # Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | Left click / drag (paused) | Bring a cell to life |
//! | Enter | Pause / run |
//! | Esc, Ctrl+C | Quit |
//!
//! Keys, colors and timing can be changed in `~/.termlife/config.toml`.
//! A log is written to `~/.termlife/termlife.log`.

mod config;
mod core;
mod game;
mod ui;

use std::env;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::game::Game;
use crate::ui::{CrosstermEvents, InputReader, KeyMapper, Renderer, Surface, TerminalSurface};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Run,
    Help,
    Version,
}

fn print_version() {
    eprintln!("termlife {}", VERSION);
}

fn print_help() {
    eprintln!("termlife {} - Conway's Game of Life in your terminal", VERSION);
    eprintln!();
    eprintln!("Usage: termlife [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  Left click / drag     Bring a cell to life (while paused)");
    eprintln!("  Enter                 Pause / run");
    eprintln!("  Esc, Ctrl+C           Quit");
    eprintln!();
    eprintln!("Configuration: ~/.termlife/config.toml");
}

/// Returns the requested mode and any arguments that were not understood
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> (Mode, Vec<String>) {
    let mut mode = Mode::Run;
    let mut ignored = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => mode = Mode::Help,
            "-v" | "--version" => {
                if mode != Mode::Help {
                    mode = Mode::Version;
                }
            }
            _ => ignored.push(arg),
        }
    }
    (mode, ignored)
}

/// Log to `~/.termlife/termlife.log`; the terminal itself belongs to the game
fn init_logging(level: &str) {
    let log_path = config::app_dir()
        .map(|dir| dir.join("termlife.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("termlife.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let (mode, ignored) = parse_args(env::args().skip(1));
    match mode {
        Mode::Run => {}
        Mode::Help => {
            print_help();
            return Ok(());
        }
        Mode::Version => {
            print_version();
            return Ok(());
        }
    }

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config.log_level);
    info!("termlife {} starting", VERSION);
    if let Some(e) = config_error {
        warn!("{}; using defaults", e);
    }
    for arg in &ignored {
        warn!("ignoring unknown argument: {}", arg);
    }

    let style = config.cell_style();
    let mut surface = TerminalSurface::init(style).context("could not set up the terminal")?;
    surface
        .enable_mouse()
        .context("could not enable mouse reporting")?;

    let viewport = surface.size();
    info!("Terminal size: {}x{}", viewport.0, viewport.1);

    let (_reader, events) =
        InputReader::spawn(CrosstermEvents).context("could not start the input reader")?;

    let mut game = Game::new(viewport, KeyMapper::from_config(&config.keys), Renderer::new(style));
    let result = game.run(
        &mut surface,
        &events,
        config.tick_interval(),
        config.idle_interval(),
    );

    // Give the terminal back before anything is printed
    drop(surface);

    let (cols, rows) = game.viewport();
    info!(
        "exiting {:?} at generation {} on {}x{} with {} live cells",
        game.state(),
        game.generation(),
        cols,
        rows,
        game.grid().population()
    );
    result
}
