// src/main.rs

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Terminal specific imports
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, MouseButton as CrosstermButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::CrosstermBackend;

// Tableau imports
use tableau::build_demo;
use tableau_ratatui::RatatuiRenderer;
use tableau_render::{InputEvent, MouseButton, Renderer};
use tableau_runtime::{Session, SessionOptions};

#[derive(Parser)]
#[command(name = "tableau")]
#[command(about = "Runs the tableau demo presentation in the terminal")]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log per-node layout results at debug level
    #[arg(long)]
    debug_layout: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<String>,

    /// Design canvas width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Design canvas height
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Milliseconds between frames
    #[arg(long, default_value_t = 16)]
    frame_interval: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug, args.log_file.as_deref())?;

    let options = SessionOptions {
        canvas_width: args.width,
        canvas_height: args.height,
        frame_interval_ms: args.frame_interval,
        debug_layout: args.debug_layout,
        ..SessionOptions::default()
    };

    // --- Terminal and Renderer Initialization ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let renderer = RatatuiRenderer::initialize(backend)?;

    let result = run(renderer, options);

    // --- Cleanup ---
    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    info!("Terminal renderer shutdown complete.");
    result
}

fn run(renderer: RatatuiRenderer<CrosstermBackend<io::Stdout>>, options: SessionOptions) -> Result<()> {
    let frame_interval = Duration::from_millis(options.frame_interval_ms);
    let mut session = Session::new(renderer, options);
    build_demo(&mut session).context("Failed to build demo scenes")?;

    info!("Starting terminal render loop... (Press 'q' to quit)");

    let started = Instant::now();
    'main_loop: loop {
        if event::poll(frame_interval)? {
            match event::read()? {
                CrosstermEvent::Key(key) if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc => {
                    info!("Exit requested.");
                    break 'main_loop;
                }
                CrosstermEvent::Resize(width, height) => {
                    let event = InputEvent::Resize {
                        size: glam::vec2(width as f32, height as f32),
                    };
                    if let Err(e) = session.handle_input(event) {
                        error!("Failed to handle resize: {}", e);
                    }
                }
                CrosstermEvent::Mouse(mouse) => {
                    if let MouseEventKind::Down(CrosstermButton::Left) = mouse.kind {
                        let position = session.renderer().backend().cell_to_source(mouse.column, mouse.row);
                        let event = InputEvent::MousePress {
                            position,
                            button: MouseButton::Left,
                        };
                        if let Err(e) = session.handle_input(event) {
                            error!("Failed to handle tap: {}", e);
                            break 'main_loop;
                        }
                    }
                }
                _ => {}
            }
        }

        let now = started.elapsed().as_secs_f64() * 1000.0;
        if let Err(e) = session.tick(now) {
            error!("Failed to run frame: {:#}", e);
            return Err(e);
        }
    }
    Ok(())
}

fn init_logging(debug: bool, log_file: Option<&str>) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact();

    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file: {}", path))?;
            let subscriber = builder.with_ansi(false).with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
        }
        None => {
            let subscriber = builder.with_writer(io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
        }
    }
}
