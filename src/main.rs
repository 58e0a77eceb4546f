mod actor;
mod color;
mod config;
mod field;
mod graphics;
mod math;
mod page;
mod scene;
mod state;
mod term;
mod trigger;
mod vertex;

use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::Rgb;
use crate::config::Config;
use crate::field::{Field, SimParams};
use crate::page::Page;
use crate::scene::Scene;
use crate::state::AppState;
use crate::term::TerminalGuard;
use crate::trigger::TriggerWatcher;

const FRAME_PERIOD: Duration = Duration::from_millis(15);
const SCROLL_STEP: f64 = 4.0;

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_logging(&config)?;

    let palette = config.parse_palette()?;
    let params = SimParams {
        speed: config.speed,
        max_wait_ms: config.max_wait_ms,
        spawn_range: config.spawn_range,
        palette,
    };
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let field = Field::new(params, config.actors, rng);

    let (cols, rows) = match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => crossterm::terminal::size().context("querying terminal size")?,
    };
    // One character cell is two vertically stacked pixels
    let scene = Scene::new(cols as usize, rows as usize * 2, &config);
    let page = Page::standard(rows as f64 * 2.0);
    let watcher = TriggerWatcher::new(config.threshold, Rgb::new(12, 14, 24), page.regions());

    tracing::info!(cols, rows, actors = config.actors, seed = ?config.seed, "starting");

    let guard = TerminalGuard::enter()?;
    let result = run(&config, field, scene, page, watcher);
    drop(guard);
    result
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(
    config: &Config,
    mut field: Field,
    mut scene: Scene,
    mut page: Page,
    mut watcher: TriggerWatcher,
) -> Result<()> {
    let mut out = BufWriter::new(io::stdout());
    let mut state = AppState::new(config);
    let mut last = Instant::now();

    // FPS bookkeeping for the debug overlay
    let mut frames_since_last_update = 0usize;
    let mut last_fps_calculation = Instant::now();
    let mut fps = 0.0;

    loop {
        if event::poll(FRAME_PERIOD)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key(&key, &mut state, &mut page) {
                        break;
                    }
                }
                Event::Resize(cols, rows) => {
                    scene.resize(cols as usize, rows as usize * 2);
                    page.set_viewport(rows as f64 * 2.0);
                    tracing::debug!(cols, rows, "terminal resized");
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        frames_since_last_update += 1;
        let window = now.duration_since(last_fps_calculation).as_secs_f64();
        if window >= 1.0 {
            fps = frames_since_last_update as f64 / window;
            frames_since_last_update = 0;
            last_fps_calculation = now;
        }

        if !state.paused {
            field.advance(elapsed_ms);
        }
        page.emit(&mut watcher);
        scene.render(&field, watcher.background(), &state);
        term::present(&mut out, scene.pixels(), scene.width(), scene.height())?;

        let mut lines = Vec::new();
        if state.debug {
            lines.extend(debug_lines(&field, &scene, &page, &state, fps));
        }
        if state.paused {
            lines.push("paused".to_string());
        }
        if !lines.is_empty() {
            term::overlay(&mut out, &lines)?;
        }
        out.flush()?;
    }
    Ok(())
}

/// Returns true when the application should quit.
fn handle_key(key: &KeyEvent, state: &mut AppState, page: &mut Page) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('p') => state.paused = !state.paused,
        KeyCode::Char('d') => state.debug = !state.debug,
        KeyCode::Char('g') => state.grid = !state.grid,
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.zoom = (state.zoom * 1.1).clamp(0.1, 10.0);
        }
        KeyCode::Char('-') => {
            state.zoom = (state.zoom / 1.1).clamp(0.1, 10.0);
        }
        KeyCode::Char('r') => {
            state.zoom = 1.0;
            page.scroll_to(0.0);
        }
        KeyCode::Up => page.scroll_by(-SCROLL_STEP),
        KeyCode::Down => page.scroll_by(SCROLL_STEP),
        KeyCode::PageUp => {
            let viewport = page.viewport();
            page.scroll_by(-viewport);
        }
        KeyCode::PageDown => {
            let viewport = page.viewport();
            page.scroll_by(viewport);
        }
        _ => {}
    }
    false
}

fn debug_lines(
    field: &Field,
    scene: &Scene,
    page: &Page,
    state: &AppState,
    fps: f64,
) -> Vec<String> {
    let (idle, rolling) = field.phase_counts();
    vec![
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("FPS: {fps:.1}"),
        format!("Actors: {idle} idle / {rolling} rolling"),
        format!("Zoom: {:.2}  Scroll: {:.0}", state.zoom, page.scroll()),
        format!("Surface: {}x{}", scene.width(), scene.height()),
    ]
}
