use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use neon_snake::app::{App, AppOptions};
use neon_snake::config::{DifficultyMode, THEME_NEON};
use neon_snake::game::CollisionRules;
use neon_snake::input::raw_key;
use neon_snake::persistence::{FileStorage, storage_path};
use neon_snake::renderer;
use neon_snake::terminal_runtime::{AppTerminal, TerminalSession, install_panic_hook};
use neon_snake::timer::IntervalTimer;
use ratatui::layout::Rect;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(16);
const LOG_FILTER_ENV: &str = "NEON_SNAKE_LOG";

type GameApp = App<FileStorage, IntervalTimer>;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory for the saved game and preferences.
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Board preset; also saved as the new default.
    #[arg(long, value_enum)]
    mode: Option<DifficultyMode>,

    /// Speed level 1-5; also saved as the new default.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=5))]
    speed: Option<u32>,

    /// Seed for food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Allow the head to enter the cell the tail is leaving.
    #[arg(long = "lenient-tail")]
    lenient_tail: bool,

    /// Append logs to this file (filter with NEON_SNAKE_LOG).
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let app = App::new(
        open_storage(cli.data_dir.as_deref()),
        IntervalTimer::new(),
        IntervalTimer::new(),
        AppOptions {
            rules: CollisionRules {
                tail_vacates: cli.lenient_tail,
            },
            seed: cli.seed,
            mode: cli.mode,
            speed_level: cli.speed,
        },
    );

    install_panic_hook();
    let mut session = TerminalSession::enter()?;
    run(session.terminal_mut(), app)?;

    info!("exiting");
    Ok(())
}

fn run(terminal: &mut AppTerminal, mut app: GameApp) -> io::Result<()> {
    let size = terminal.size()?;
    let mut viewport = Rect::new(0, 0, size.width, size.height);

    loop {
        if app.take_redraw() {
            terminal.draw(|frame| renderer::render(frame, &app, &THEME_NEON))?;
        }

        let now = Instant::now();
        let timeout = [
            app.movement_timer().remaining(now),
            app.clock_timer().remaining(now),
        ]
        .into_iter()
        .flatten()
        .fold(FRAME_POLL_INTERVAL, Duration::min);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }

                    if let Some(raw) = raw_key(&key) {
                        if app.is_quit_key(&raw) {
                            break;
                        }
                        app.handle_key(&raw);
                    }
                }
                Event::Resize(width, height) => {
                    viewport = Rect::new(0, 0, width, height);
                    app.request_redraw();
                }
                _ => {}
            }
        }

        // Never step a board the terminal cannot show in full.
        if !renderer::board_fits(viewport, app.state().board()) {
            app.pause();
        }

        let now = Instant::now();
        if app.movement_timer_mut().poll(now) {
            app.step();
        }
        if app.clock_timer_mut().poll(now) {
            app.tick_clock();
        }
    }

    Ok(())
}

fn open_storage(data_dir: Option<&Path>) -> FileStorage {
    let storage = FileStorage::open_or_quarantine(storage_path(data_dir));
    info!(path = %storage.path().display(), "storage opened");
    storage
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
