use notify_rust::{Notification, Urgency};
use std::{path::Path, process::Command, process::Stdio};

use crate::pomodoro::Phase;
use crate::settings::Settings;

const CHIMES: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Notification cue played when a phase begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Cue {
    /// `None` for Idle: entering Idle is always silent.
    pub fn for_phase(phase: Phase) -> Option<Self> {
        match phase {
            Phase::Idle => None,
            Phase::Work => Some(Self::Focus),
            Phase::ShortBreak => Some(Self::ShortBreak),
            Phase::LongBreak => Some(Self::LongBreak),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Focus => "Back to Work! 🎯",
            Self::ShortBreak => "Break Time! ☕",
            Self::LongBreak => "Long Break Time! 🌴",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Self::Focus => "Let's focus on your next session.",
            Self::ShortBreak => "Time for a short break.",
            Self::LongBreak => "Great work! Take a longer break.",
        }
    }
}

/// Best-effort notification sink gated by the user's preferences.
/// Implementations never fail outward.
pub trait Notifier {
    fn notify(&self, cue: Cue, prefs: &Settings);
}

/// Desktop popup plus a system chime.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, cue: Cue, prefs: &Settings) {
        if prefs.desktop_notifications {
            if let Err(err) = Notification::new()
                .summary(cue.title())
                .body(cue.body())
                .appname("clocklab")
                .icon("alarm-clock")
                .urgency(Urgency::Critical)
                .show()
            {
                log::debug!("desktop notification failed: {err}");
            }
        }

        if prefs.sound_enabled {
            std::thread::spawn(play_chime);
        }
    }
}

fn play_chime() {
    let Some((cmd, file)) = CHIMES.iter().find(|(_, file)| Path::new(file).exists()) else {
        log::debug!("no chime sound file found");
        return;
    };

    if let Err(err) = Command::new(cmd)
        .arg(file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        log::debug!("failed to play chime with {cmd}: {err}");
    }
}

#[cfg(test)]
pub use recording::RecordingNotifier;

#[cfg(test)]
mod recording {
    use super::{Cue, Notifier};
    use crate::settings::Settings;
    use std::{cell::RefCell, rc::Rc};

    /// Remembers every cue that would have been audible.
    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub played: Rc<RefCell<Vec<Cue>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, cue: Cue, prefs: &Settings) {
            if prefs.sound_enabled {
                self.played.borrow_mut().push(cue);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_has_no_cue() {
        assert_eq!(Cue::for_phase(Phase::Idle), None);
        assert_eq!(Cue::for_phase(Phase::Work), Some(Cue::Focus));
        assert_eq!(Cue::for_phase(Phase::LongBreak), Some(Cue::LongBreak));
    }
}
