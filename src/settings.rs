use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::pomodoro::{
    DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES, MAX_BREAK_MINUTES, MAX_WORK_MINUTES, clamp_minutes,
};
use crate::storage::{Storage, load_json, save_json};

pub const SETTINGS_KEY: &str = "settings";
pub const THEME_KEY: &str = "theme";
pub const POMODORO_KEY: &str = "pomodoro";

// ============================================================================
// User settings
// ============================================================================

/// Shared preferences. Missing fields take their defaults, so older or
/// partial payloads still load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub desktop_notifications: bool,
    pub default_view: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            desktop_notifications: true,
            default_view: "timer".into(),
        }
    }
}

impl Settings {
    pub fn load(storage: &dyn Storage) -> Self {
        load_json(storage, SETTINGS_KEY)
    }

    pub fn save(&self, storage: &dyn Storage) {
        if let Err(err) = save_json(storage, SETTINGS_KEY, self) {
            log::warn!("failed to persist settings: {err:#}");
        }
    }
}

// ============================================================================
// Pomodoro minute fields
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PomodoroConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl PomodoroConfig {
    pub fn load(storage: &dyn Storage) -> Self {
        let raw: Self = load_json(storage, POMODORO_KEY);
        raw.normalized()
    }

    pub fn save(&self, storage: &dyn Storage) {
        if let Err(err) = save_json(storage, POMODORO_KEY, self) {
            log::warn!("failed to persist pomodoro minutes: {err:#}");
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            work_minutes: clamp_minutes(self.work_minutes, DEFAULT_WORK_MINUTES, MAX_WORK_MINUTES),
            break_minutes: clamp_minutes(
                self.break_minutes,
                DEFAULT_BREAK_MINUTES,
                MAX_BREAK_MINUTES,
            ),
        }
    }
}

// ============================================================================
// Theme
// ============================================================================

/// Stored under [`THEME_KEY`] as the bare name, `dark` or `light`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Unknown or missing values fall back to dark.
    pub fn load(storage: &dyn Storage) -> Self {
        storage.get(THEME_KEY).and_then(|raw| Self::parse(&raw)).unwrap_or_default()
    }

    pub fn save(self, storage: &dyn Storage) {
        if let Err(err) = storage.set(THEME_KEY, self.name()) {
            log::warn!("failed to persist theme: {err:#}");
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> Theme {
        match self {
            Self::Dark => Theme {
                idle_color: Color::Gray,
                work_color: Color::Rgb(100, 181, 246),
                short_break_color: Color::Rgb(255, 0, 100),
                long_break_color: Color::Rgb(0, 255, 150),
                border_color: Color::Rgb(0, 200, 255),
                accent_color: Color::Rgb(255, 100, 0),
                text_color: Color::White,
                muted_color: Color::DarkGray,
            },
            Self::Light => Theme {
                idle_color: Color::DarkGray,
                work_color: Color::Rgb(21, 101, 192),
                short_break_color: Color::Rgb(194, 24, 91),
                long_break_color: Color::Rgb(0, 137, 123),
                border_color: Color::Rgb(38, 50, 56),
                accent_color: Color::Rgb(230, 81, 0),
                text_color: Color::Black,
                muted_color: Color::Gray,
            },
        }
    }
}

#[derive(Clone, Copy)]
pub struct Theme {
    pub idle_color: Color,
    pub work_color: Color,
    pub short_break_color: Color,
    pub long_break_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
    pub text_color: Color,
    pub muted_color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn partial_settings_merge_over_defaults() {
        let storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, r#"{"sound_enabled": false}"#).unwrap();

        let settings = Settings::load(&storage);
        assert!(!settings.sound_enabled);
        assert!(settings.desktop_notifications);
        assert_eq!(settings.default_view, "timer");
    }

    #[test]
    fn malformed_settings_use_defaults() {
        let storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, "{{{{").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn settings_save_swallows_failures() {
        let storage = MemoryStorage::new();
        storage.set_failing(true);
        Settings::default().save(&storage);
        assert_eq!(storage.get(SETTINGS_KEY), None);
    }

    #[test]
    fn pomodoro_config_is_normalized_on_load() {
        let storage = MemoryStorage::new();
        storage.set(POMODORO_KEY, r#"{"work_minutes": 900, "break_minutes": 0}"#).unwrap();

        let config = PomodoroConfig::load(&storage);
        assert_eq!(config, PomodoroConfig { work_minutes: 180, break_minutes: 5 });
    }

    #[test]
    fn theme_round_trips_and_defaults_to_dark() {
        let storage = MemoryStorage::new();
        assert_eq!(ThemeMode::load(&storage), ThemeMode::Dark);

        ThemeMode::Dark.toggled().save(&storage);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(ThemeMode::load(&storage), ThemeMode::Light);

        storage.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeMode::load(&storage), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse(" Light "), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse("sepia"), None);
    }
}
