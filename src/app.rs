use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use crate::{
    clock::{Clock, date_key},
    notify::{Cue, Notifier},
    pomodoro::{Pomodoro, Transition},
    settings::{PomodoroConfig, Settings, Theme, ThemeMode},
    stats::DailyStats,
    storage::Storage,
};

// ============================================================================
// Views & fields
// ============================================================================

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum View {
    Timer,
    Stats,
    Settings,
    Help,
}

impl View {
    /// Views that may be chosen as the startup view.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "timer" => Some(Self::Timer),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SettingsField {
    SoundEnabled,
    DesktopNotifications,
    DefaultView,
    Theme,
}

impl SettingsField {
    pub const ALL: [Self; 4] = [
        Self::SoundEnabled,
        Self::DesktopNotifications,
        Self::DefaultView,
        Self::Theme,
    ];

    fn next(self) -> Self {
        match self {
            Self::SoundEnabled => Self::DesktopNotifications,
            Self::DesktopNotifications => Self::DefaultView,
            Self::DefaultView => Self::Theme,
            Self::Theme => Self::SoundEnabled,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::SoundEnabled => Self::Theme,
            Self::DesktopNotifications => Self::SoundEnabled,
            Self::DefaultView => Self::DesktopNotifications,
            Self::Theme => Self::DefaultView,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MinuteField {
    Work,
    Break,
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub pomodoro: Pomodoro,
    pub stats: DailyStats,
    pub settings: Settings,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    pub current_view: View,
    pub settings_field: SettingsField,
    pub editing: Option<MinuteField>,
    pub input: String,
    pub status: Option<String>,
    /// On-disk copies. Run-only overrides never reach these.
    saved_settings: Settings,
    saved_minutes: PomodoroConfig,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
    export_path: PathBuf,
}

impl App {
    pub fn new(
        storage: Box<dyn Storage>,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
        export_path: PathBuf,
    ) -> Self {
        let settings = Settings::load(storage.as_ref());
        let config = PomodoroConfig::load(storage.as_ref());
        let theme_mode = ThemeMode::load(storage.as_ref());
        let stats = DailyStats::load(storage.as_ref());
        let current_view = View::from_name(&settings.default_view).unwrap_or(View::Timer);

        Self {
            pomodoro: Pomodoro::new(config.work_minutes, config.break_minutes, clock.now()),
            stats,
            settings: settings.clone(),
            theme_mode,
            theme: theme_mode.palette(),
            current_view,
            settings_field: SettingsField::SoundEnabled,
            editing: None,
            input: String::new(),
            status: None,
            saved_settings: settings,
            saved_minutes: config,
            storage,
            clock,
            notifier,
            export_path,
        }
    }

    pub fn today_key(&self) -> String {
        date_key(self.clock.today())
    }

    pub fn stats_summary(&self) -> String {
        self.stats.summary(&self.today_key())
    }

    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.theme = mode.palette();
    }

    /// Startup override of the minute fields. Not persisted.
    pub fn override_minutes(&mut self, work: Option<u32>, brk: Option<u32>) {
        let work = work.unwrap_or(self.pomodoro.work_minutes()).to_string();
        let brk = brk.unwrap_or(self.pomodoro.break_minutes()).to_string();
        self.pomodoro.configure(&work, &brk);
    }

    fn apply(&mut self, transition: Option<Transition>) {
        let Some(transition) = transition else { return };
        log::info!("phase {:?} -> {:?}", transition.from, transition.to);

        if let Some(credited) = transition.credited {
            let day = self.today_key();
            self.stats.record_completed_work_session(self.storage.as_ref(), &day, credited);
        }
        if let Some(cue) = Cue::for_phase(transition.to) {
            self.notifier.notify(cue, &self.settings);
        }
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    pub fn update(&mut self) {
        let transition = self.pomodoro.tick(self.clock.now());
        self.apply(transition);
    }

    pub fn toggle(&mut self) {
        let transition = self.pomodoro.toggle(self.clock.now());
        self.apply(transition);
    }

    pub fn skip(&mut self) {
        let transition = self.pomodoro.skip(self.clock.now());
        self.apply(transition);
    }

    pub fn reset(&mut self) {
        self.pomodoro.reset();
        self.editing = None;
        self.input.clear();
    }

    pub fn begin_edit(&mut self, field: MinuteField) {
        if !self.pomodoro.is_configurable() {
            self.status = Some("Reset the timer to change durations".into());
            return;
        }
        self.input = match field {
            MinuteField::Work => self.pomodoro.work_minutes(),
            MinuteField::Break => self.pomodoro.break_minutes(),
        }
        .to_string();
        self.editing = Some(field);
        self.status = None;
    }

    /// Applies the edited minute field. Ignored unless the engine is idle and
    /// stopped; only the edited field is persisted.
    pub fn commit_edit(&mut self) {
        let Some(field) = self.editing.take() else { return };
        let (work, brk) = match field {
            MinuteField::Work => (self.input.clone(), self.pomodoro.break_minutes().to_string()),
            MinuteField::Break => (self.pomodoro.work_minutes().to_string(), self.input.clone()),
        };
        self.input.clear();

        if self.pomodoro.configure(&work, &brk) {
            let (work, brk) = (self.pomodoro.work_minutes(), self.pomodoro.break_minutes());
            match field {
                MinuteField::Work => self.saved_minutes.work_minutes = work,
                MinuteField::Break => self.saved_minutes.break_minutes = brk,
            }
            log::info!("durations set to {work}m work / {brk}m break");
            self.saved_minutes.save(self.storage.as_ref());
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme_mode.toggled());
        self.theme_mode.save(self.storage.as_ref());
    }

    pub fn export_stats(&mut self) {
        self.status = Some(match self.stats.export_csv(&self.export_path) {
            Ok(()) => format!("Exported to {}", self.export_path.display()),
            Err(err) => {
                log::warn!("stats export failed: {err:#}");
                "Export failed".into()
            }
        });
    }

    fn toggle_setting(&mut self) {
        let (live, saved) = (&mut self.settings, &mut self.saved_settings);
        match self.settings_field {
            SettingsField::SoundEnabled => {
                live.sound_enabled = !live.sound_enabled;
                saved.sound_enabled = live.sound_enabled;
            }
            SettingsField::DesktopNotifications => {
                live.desktop_notifications = !live.desktop_notifications;
                saved.desktop_notifications = live.desktop_notifications;
            }
            SettingsField::DefaultView => {
                live.default_view = match View::from_name(&live.default_view) {
                    Some(View::Stats) => "timer".into(),
                    _ => "stats".into(),
                };
                saved.default_view = live.default_view.clone();
            }
            SettingsField::Theme => {
                self.toggle_theme();
                return;
            }
        }
        self.saved_settings.save(self.storage.as_ref());
    }
}

// ============================================================================
// Event Handlers
// ============================================================================

/// Returns true when the user asked to quit.
pub fn handle_input(key: KeyEvent, app: &mut App) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.editing.is_some() {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => app.input.push(c),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Esc => app.cancel_edit(),
            _ => {}
        }
        return false;
    }

    match app.current_view {
        View::Timer => handle_timer_view(key, app),
        View::Stats => handle_stats_view(key, app),
        View::Settings => handle_settings_view(key, app),
        View::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')
            ) {
                app.current_view = View::Timer;
            }
            false
        }
    }
}

fn handle_timer_view(key: KeyEvent, app: &mut App) -> bool {
    app.status = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char(' ') => app.toggle(),
        KeyCode::Char('n') => app.skip(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('w') => app.begin_edit(MinuteField::Work),
        KeyCode::Char('b') => app.begin_edit(MinuteField::Break),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('s') => app.current_view = View::Stats,
        KeyCode::Char('d') => app.current_view = View::Settings,
        KeyCode::Char('h') | KeyCode::Char('?') => app.current_view = View::Help,
        _ => {}
    }
    false
}

fn handle_stats_view(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('s') => {
            app.status = None;
            app.current_view = View::Timer;
        }
        KeyCode::Char('e') => app.export_stats(),
        // Timer controls stay live while browsing stats.
        KeyCode::Char(' ') => app.toggle(),
        _ => {}
    }
    false
}

fn handle_settings_view(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('d') => app.current_view = View::Timer,
        KeyCode::Down | KeyCode::Char('j') => app.settings_field = app.settings_field.next(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_field = app.settings_field.prev(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_setting(),
        _ => {}
    }
    false
}
