mod app;
mod clock;
mod notify;
mod pomodoro;
mod settings;
mod stats;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    app::{App, View, handle_input},
    clock::SystemClock,
    notify::DesktopNotifier,
    settings::ThemeMode,
    storage::FileStorage,
};

// ============================================================================
// Constants
// ============================================================================

const TICK_RATE: Duration = Duration::from_millis(200);
const DEFAULT_DATA_DIR: &str = "clocklab";
const LOG_FILE: &str = "clocklab.log";
const EXPORT_FILE: &str = "stats_export.csv";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "🍅 clocklab - A Terminal Pomodoro Focus Clock")]
struct Args {
    /// Work minutes for this run (1-180)
    #[arg(short, long)]
    work: Option<u32>,
    /// Break minutes for this run (1-60)
    #[arg(short = 'b', long = "break")]
    brk: Option<u32>,
    #[arg(short = 't', long, value_parser = parse_theme)]
    theme: Option<ThemeMode>,
    #[arg(long, value_parser = parse_view)]
    view: Option<View>,
    #[arg(long)]
    no_sound: bool,
    /// Directory holding settings, statistics and the log file
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

fn parse_theme(s: &str) -> std::result::Result<ThemeMode, String> {
    ThemeMode::parse(s).ok_or_else(|| format!("unknown theme '{s}' (expected dark or light)"))
}

fn parse_view(s: &str) -> std::result::Result<View, String> {
    View::from_name(s).ok_or_else(|| format!("unknown view '{s}' (expected timer or stats)"))
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging(data_dir: &Path) {
    let file = fs::create_dir_all(data_dir).and_then(|_| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(LOG_FILE))
    });

    match file {
        Ok(file) => {
            let env = env_logger::Env::default().default_filter_or("info");
            let _ = env_logger::Builder::from_env(env)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .try_init();
        }
        Err(err) => eprintln!("logging disabled: {err}"),
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.data_dir);

    let storage = FileStorage::new(&args.data_dir);
    let export_path = storage.dir().join(EXPORT_FILE);
    let mut app = App::new(
        Box::new(storage),
        Box::new(SystemClock),
        Box::new(DesktopNotifier),
        export_path,
    );

    // CLI overrides, for this run only
    app.override_minutes(args.work, args.brk);
    if let Some(theme) = args.theme {
        app.set_theme(theme);
    }
    if let Some(view) = args.view {
        app.current_view = view;
    }
    if args.no_sound {
        app.settings.sound_enabled = false;
    }

    log::info!(
        "starting with {}m work / {}m break, data in {}",
        app.pomodoro.work_minutes(),
        app.pomodoro.break_minutes(),
        args.data_dir.display()
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    log::info!("shutting down");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(key, app) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update();
            last_tick = Instant::now();
        }
    }
}
