//! Terminal match-3 runner (default binary).
//!
//! `play` runs the game with crossterm input and the framebuffer renderer.
//! `simulate` runs headless and prints the final snapshot as JSON.

mod cli;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event;

use tui_match3::core::{GameConfig, GameSnapshot, GameState};
use tui_match3::input::{InputEvent, InputHandler};
use tui_match3::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_match3::types::TICK_MS;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.game.resolve()?;

    match cli.command.unwrap_or(Command::Play { no_mouse: false }) {
        Command::Play { no_mouse } => {
            init_file_logging(&cli.log_file)?;
            play(config, no_mouse)
        }
        Command::Simulate { swaps, pretty } => {
            init_stderr_logging();
            simulate(config, swaps, pretty)
        }
    }
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// The terminal is in raw mode while playing, so logs go to a file.
fn init_file_logging(path: &std::path::Path) -> Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(config: GameConfig, swaps: u32, pretty: bool) -> Result<()> {
    let mut game = GameState::new(config)?;
    game.start();
    game.settle();
    game.drain_events();

    for n in 0..swaps {
        let Some((a, b)) = game.hint() else {
            tracing::info!(made = n, "no swap left");
            break;
        };
        game.attempt_swap(a, b);
        let steps = game.settle();
        let events = game.drain_events();
        tracing::debug!(swap = n, steps, events = events.len(), score = game.score(), "swap resolved");
    }

    let snap = game.snapshot();
    let json = if pretty {
        serde_json::to_string_pretty(&snap)?
    } else {
        serde_json::to_string(&snap)?
    };
    println!("{}", json);
    Ok(())
}

fn play(config: GameConfig, no_mouse: bool) -> Result<()> {
    let mut term = TerminalRenderer::new();
    if no_mouse {
        term = term.without_mouse();
    }
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        tracing::error!(error = %e, "game loop failed");
    }
    result
}

fn run(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    let mut game = GameState::new(config)?;
    game.start();

    let view = GameView::default();
    let mut input = InputHandler::new();
    let mut snap = GameSnapshot::default();
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut viewport = Viewport::new(w, h);
    let mut fb = FrameBuffer::new(w, h);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        if dirty {
            game.snapshot_into(&mut snap);
            view.render_into(&snap, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let ev = event::read()?;
            match input.handle_event(&ev) {
                Some(InputEvent::Quit) => return Ok(()),
                Some(InputEvent::Action(action)) => {
                    dirty |= game.apply_action(action);
                }
                Some(InputEvent::Click { column, row }) => {
                    if let Some(pos) = view.hit_test(&snap, viewport, column, row) {
                        game.set_cursor(pos);
                        game.select(pos);
                        dirty = true;
                    }
                }
                Some(InputEvent::Drag { from, to }) => {
                    let from = view.hit_test(&snap, viewport, from.0, from.1);
                    let to = view.hit_test(&snap, viewport, to.0, to.1);
                    if let (Some(from), Some(to)) = (from, to) {
                        if from != to && game.selected() == Some(from) {
                            game.set_cursor(to);
                            game.select(to);
                            dirty = true;
                        }
                    }
                }
                Some(InputEvent::Resize { width, height }) => {
                    viewport = Viewport::new(width, height);
                    term.invalidate();
                    dirty = true;
                }
                None => {}
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
            dirty |= game.tick(elapsed_ms);
            let events = game.drain_events();
            if !events.is_empty() {
                tracing::trace!(count = events.len(), "board events");
            }
        }
    }
}
