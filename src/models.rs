//! Data models for the Focusbar application.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The three kinds of session the timer cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [Self::Focus, Self::ShortBreak, Self::LongBreak];

    /// Human readable label shown in the menu.
    pub fn label(self) -> &'static str {
        match self {
            Self::Focus => "Focus Time",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Stable identifier used in menu ids and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "short-break",
            Self::LongBreak => "long-break",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Colour scheme for the tray icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn id(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Longest accepted session, in minutes.
pub const MAX_DURATION_MINS: u32 = 24 * 60;

/// User-configurable settings for the timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Duration of a focus session in minutes.
    pub focus_duration: u32,
    /// Duration of a short break in minutes.
    pub short_break_duration: u32,
    /// Duration of a long break in minutes.
    pub long_break_duration: u32,
    /// Number of focus sessions before a long break.
    pub sessions_until_long_break: u32,
    /// Whether to play the alert tones on completion.
    pub sound_enabled: bool,
    /// Alert volume, 0 to 100.
    pub sound_volume: u8,
    pub theme: Theme,
    /// Whether to show desktop notifications.
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_until_long_break: 4,
            sound_enabled: true,
            sound_volume: 50,
            theme: Theme::Dark,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// Merges a stored JSON document over the defaults, field by field.
    ///
    /// Fields that are missing or hold an unusable value keep their default,
    /// so a partially corrupt record still yields a valid configuration.
    pub fn from_stored(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };

        let stored = Self {
            focus_duration: positive_field(obj, "focus_duration", defaults.focus_duration),
            short_break_duration: positive_field(
                obj,
                "short_break_duration",
                defaults.short_break_duration,
            ),
            long_break_duration: positive_field(
                obj,
                "long_break_duration",
                defaults.long_break_duration,
            ),
            sessions_until_long_break: positive_field(
                obj,
                "sessions_until_long_break",
                defaults.sessions_until_long_break,
            ),
            sound_enabled: obj
                .get("sound_enabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.sound_enabled),
            sound_volume: obj
                .get("sound_volume")
                .and_then(volume_value)
                .unwrap_or(defaults.sound_volume),
            theme: obj
                .get("theme")
                .and_then(Value::as_str)
                .and_then(Theme::from_id)
                .unwrap_or(defaults.theme),
            notifications_enabled: obj
                .get("notifications_enabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.notifications_enabled),
        };
        stored.sanitized()
    }

    /// Replaces zero values with their defaults and caps durations at a day.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.focus_duration = clamp_duration(self.focus_duration, defaults.focus_duration);
        self.short_break_duration =
            clamp_duration(self.short_break_duration, defaults.short_break_duration);
        self.long_break_duration =
            clamp_duration(self.long_break_duration, defaults.long_break_duration);
        if self.sessions_until_long_break == 0 {
            self.sessions_until_long_break = defaults.sessions_until_long_break;
        }
        self.sound_volume = self.sound_volume.min(100);
        self
    }

    /// Returns the configured duration for a session kind, in minutes.
    pub fn duration_mins(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus_duration,
            SessionKind::ShortBreak => self.short_break_duration,
            SessionKind::LongBreak => self.long_break_duration,
        }
    }
}

fn clamp_duration(mins: u32, default: u32) -> u32 {
    match mins {
        0 => default,
        mins => mins.min(MAX_DURATION_MINS),
    }
}

fn positive_field(obj: &Map<String, Value>, key: &str, default: u32) -> u32 {
    obj.get(key).and_then(positive_value).unwrap_or(default)
}

fn positive_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0),
        Value::String(s) => parse_positive(s),
        _ => None,
    }
}

fn volume_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(|n| n.min(100) as u8),
        Value::String(s) => parse_volume(s),
        _ => None,
    }
}

/// Parses the leading integer of user input, the way a form field is read.
fn leading_digits(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Parses a positive integer (durations, thresholds). Zero is rejected.
pub fn parse_positive(raw: &str) -> Option<u32> {
    leading_digits(raw)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

/// Parses a volume, clamping anything above 100.
pub fn parse_volume(raw: &str) -> Option<u8> {
    leading_digits(raw).map(|n| n.min(100) as u8)
}

/// Transient state of the countdown. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub kind: SessionKind,
    /// Focus sessions completed since the last long break, starting at 1.
    pub session_count: u32,
    pub remaining_secs: u32,
    /// Length the current session started with.
    pub total_secs: u32,
    pub is_running: bool,
}

impl SessionState {
    /// A paused focus session at the start of a cycle.
    pub fn new(settings: &Settings) -> Self {
        let total_secs = settings.focus_duration.saturating_mul(60);
        Self {
            kind: SessionKind::Focus,
            session_count: 1,
            remaining_secs: total_secs,
            total_secs,
            is_running: false,
        }
    }

    /// Loads a full-length session of the given kind.
    pub fn load(&mut self, kind: SessionKind, duration_mins: u32) {
        self.kind = kind;
        self.total_secs = duration_mins.saturating_mul(60);
        self.remaining_secs = self.total_secs;
    }

    /// Fraction of the session still remaining (1.0 at start, 0.0 when done).
    pub fn remaining_fraction(&self) -> f32 {
        if self.total_secs == 0 {
            return 0.0;
        }
        self.remaining_secs as f32 / self.total_secs as f32
    }
}

/// Daily statistics, reset at the day boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub date: NaiveDate,
    #[serde(default)]
    pub focus_minutes: u32,
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub completed_tasks: u32,
}

impl Stats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            focus_minutes: 0,
            completed_sessions: 0,
            completed_tasks: 0,
        }
    }

    /// Returns the stored stats if they belong to `today`, fresh ones otherwise.
    pub fn for_today(stored: Option<Stats>, today: NaiveDate) -> Self {
        match stored {
            Some(stats) if stats.date == today => stats,
            _ => Self::new(today),
        }
    }

    /// Resets the counters if the day has changed. Returns true on reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        *self = Self::new(today);
        true
    }

    /// Records completion of a focus session.
    pub fn record_focus_completion(&mut self, minutes: u32) {
        self.completed_sessions = self.completed_sessions.saturating_add(1);
        self.focus_minutes = self.focus_minutes.saturating_add(minutes);
    }

    pub fn increment_completed_tasks(&mut self) {
        self.completed_tasks = self.completed_tasks.saturating_add(1);
    }

    pub fn decrement_completed_tasks(&mut self) {
        self.completed_tasks = self.completed_tasks.saturating_sub(1);
    }
}

/// A checklist entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
