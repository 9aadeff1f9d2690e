mod audio;
mod audio_api;
mod error;
mod loader;
mod middle;
mod recorder;
mod session;
mod shared;
mod tui;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::Context;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use middle::Middle;
use session::Session;
use shared::InputEvent;

const LOG_FILE: &str = "looptty.log";

fn main() {
    if let Err(e) = run() {
        error!("fatal: {e:#}");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// The terminal belongs to the TUI, so logs go to <project_dir>/looptty.log
fn init_logging(project_dir: &Path) -> anyhow::Result<()> {
    let path = project_dir.join(LOG_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let project_dir: PathBuf = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("no current directory")?,
    };
    init_logging(&project_dir)?;
    info!(project_dir = %project_dir.display(), "looptty starting");

    let kit = session::load_kit(&project_dir);
    let audio = audio::start_audio()?;

    let mut middle = Middle::new(
        Session::with_tracks(kit.initial_tracks),
        audio.sample_rate(),
        kit.recording_path(&project_dir),
        audio.has_input(),
    );
    for cmd in middle.load_kit(&kit, &project_dir) {
        audio.send(cmd);
    }

    terminal::enable_raw_mode()?;
    // Enable keyboard enhancement for real press/release detection.
    // Falls back gracefully if the terminal doesn't support it.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        // engine -> middle: which clip each track just started
        for event in audio.poll_events() {
            middle.on_playback_event(event);
        }
        audio.free_retired();
        // mic -> recorder
        for chunk in audio.drain_input() {
            middle.on_input_frames(&chunk);
        }

        let ds = middle.display_state();
        term.draw(|frame| {
            let area = frame.area();
            tui::view::render(frame, area, &ds, &tui_state);
        })?;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                info!("quit");
                return Ok(());
            }
            for cmd in middle.handle_input(event) {
                audio.send(cmd);
            }
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
