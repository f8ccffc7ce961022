use chrono::{DateTime, Utc};
use std::time::Duration;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const MAX_WORK_MINUTES: u32 = 180;
pub const MAX_BREAK_MINUTES: u32 = 60;
pub const SESSIONS_PER_CYCLE: u32 = 4;
const MIN_LONG_BREAK: Duration = Duration::from_secs(10 * 60);

// ============================================================================
// Phases & durations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "⏳ READY",
            Self::Work => "🎯 FOCUS TIME",
            Self::ShortBreak => "☕ SHORT BREAK",
            Self::LongBreak => "🌴 LONG BREAK",
        }
    }
}

/// Parses a minute field. Non-numeric or non-positive input falls back to
/// `default`; everything else is clamped to `1..=max`.
pub fn normalize_minutes(input: &str, default: u32, max: u32) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(m) if m > 0 => m.min(i64::from(max)) as u32,
        _ => default,
    }
}

/// Same rules as [`normalize_minutes`] for an already numeric value.
pub fn clamp_minutes(m: u32, default: u32, max: u32) -> u32 {
    if m == 0 { default } else { m.min(max) }
}

/// Phase lengths derived from the configured minute fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub work: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
}

impl Durations {
    pub fn from_minutes(work_minutes: u32, break_minutes: u32) -> Self {
        let short_break = minutes(break_minutes);
        Self {
            work: minutes(work_minutes),
            short_break,
            long_break: (short_break * 3).max(MIN_LONG_BREAK),
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

/// What a phase change means for the host: credit `credited` to today's stats
/// if present, and cue the new phase unless it is Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub credited: Option<Duration>,
}

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone)]
pub struct Pomodoro {
    phase: Phase,
    running: bool,
    remaining: Duration,
    durations: Durations,
    work_minutes: u32,
    break_minutes: u32,
    completed_work_sessions: u32,
    last_tick: DateTime<Utc>,
}

impl Pomodoro {
    pub fn new(work_minutes: u32, break_minutes: u32, now: DateTime<Utc>) -> Self {
        let mut pomodoro = Self {
            phase: Phase::Idle,
            running: false,
            remaining: Duration::ZERO,
            durations: Durations::default(),
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            completed_work_sessions: 0,
            last_tick: now,
        };
        pomodoro.store_minutes(work_minutes, break_minutes);
        pomodoro.read_settings();
        pomodoro.remaining = pomodoro.durations.work;
        pomodoro
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Minute fields are editable only while idle and stopped.
    pub fn is_configurable(&self) -> bool {
        self.phase == Phase::Idle && !self.running
    }

    fn store_minutes(&mut self, work_minutes: u32, break_minutes: u32) {
        self.work_minutes = clamp_minutes(work_minutes, DEFAULT_WORK_MINUTES, MAX_WORK_MINUTES);
        self.break_minutes = clamp_minutes(break_minutes, DEFAULT_BREAK_MINUTES, MAX_BREAK_MINUTES);
    }

    fn read_settings(&mut self) {
        self.durations = Durations::from_minutes(self.work_minutes, self.break_minutes);
    }

    fn phase_duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Idle | Phase::Work => self.durations.work,
            Phase::ShortBreak => self.durations.short_break,
            Phase::LongBreak => self.durations.long_break,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.phase_duration(self.phase)
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining = self.phase_duration(phase);
    }

    fn next_phase(&mut self, auto_completed: bool) -> Transition {
        let from = self.phase;
        let mut credited = None;

        let to = match from {
            Phase::Work => {
                if auto_completed {
                    credited = Some(self.durations.work);
                }
                self.completed_work_sessions += 1;
                if self.completed_work_sessions % SESSIONS_PER_CYCLE == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::Idle | Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };

        self.enter_phase(to);
        log::debug!("pomodoro {from:?} -> {to:?} (auto: {auto_completed})");
        Transition { from, to, credited }
    }

    /// Start from Idle, or resume a paused phase. Resuming re-anchors the tick
    /// reference so time spent paused is never counted.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        let transition = if self.phase == Phase::Idle {
            self.read_settings();
            Some(self.next_phase(false))
        } else {
            None
        };
        self.running = true;
        self.last_tick = now;
        transition
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Start/Pause control.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if self.running {
            self.pause();
            None
        } else {
            self.start(now)
        }
    }

    /// Ends the current phase immediately without crediting statistics. A
    /// running engine keeps running from `now`; a paused one stays paused and
    /// keeps its old tick reference until resumed.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if self.phase == Phase::Idle {
            return None;
        }
        let was_running = self.running;
        self.running = false;
        let transition = self.next_phase(false);
        if was_running {
            self.running = true;
            self.last_tick = now;
        }
        Some(transition)
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Idle;
        self.completed_work_sessions = 0;
        self.read_settings();
        self.remaining = self.durations.work;
    }

    /// Applies edited minute fields. Ignored (returns false) unless idle and
    /// stopped; otherwise the fields are normalized and the upcoming Work
    /// countdown is recomputed.
    pub fn configure(&mut self, work_input: &str, break_input: &str) -> bool {
        if !self.is_configurable() {
            return false;
        }
        self.work_minutes =
            normalize_minutes(work_input, DEFAULT_WORK_MINUTES, MAX_WORK_MINUTES);
        self.break_minutes =
            normalize_minutes(break_input, DEFAULT_BREAK_MINUTES, MAX_BREAK_MINUTES);
        self.read_settings();
        self.remaining = self.durations.work;
        true
    }

    /// Periodic poll. Decrements by the wall-clock time since the previous
    /// tick, so a suspended machine catches up on wake, and advances the phase
    /// once the countdown reaches zero. A clock that jumped backwards counts
    /// as no time passing.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if !self.running {
            return None;
        }
        let elapsed = (now - self.last_tick).to_std().unwrap_or(Duration::ZERO);
        self.last_tick = now;
        self.advance(elapsed, now)
    }

    /// Tick arithmetic with the elapsed delta supplied directly. Overshoot past
    /// zero is dropped; the next phase starts counting from `now`.
    pub fn advance(&mut self, elapsed: Duration, now: DateTime<Utc>) -> Option<Transition> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if !self.remaining.is_zero() {
            return None;
        }
        let transition = self.next_phase(true);
        self.last_tick = now;
        Some(transition)
    }

    // ------------------------------------------------------------------------
    // Display outputs
    // ------------------------------------------------------------------------

    pub fn control_label(&self) -> &'static str {
        if self.running {
            "Pause"
        } else if self.phase == Phase::Idle {
            "Start"
        } else {
            "Resume"
        }
    }

    pub fn progress_ratio(&self) -> f64 {
        let total = self.total_duration().as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        (1.0 - self.remaining.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    /// Four cycle slots. A finished cycle stays fully lit through its long
    /// break and starts over with the next completed session.
    pub fn progress_slots(&self) -> [bool; SESSIONS_PER_CYCLE as usize] {
        let filled = match self.completed_work_sessions {
            0 => 0,
            n => (n - 1) % SESSIONS_PER_CYCLE + 1,
        };
        std::array::from_fn(|i| (i as u32) < filled)
    }
}

/// `MM:SS`, seconds floored. Minutes are not wrapped into hours.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
