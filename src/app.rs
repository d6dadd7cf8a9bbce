//! Main application state and logic.
//!
//! `App` is the session controller: it owns the settings, the countdown, the
//! daily stats and the task list, and persists them through [`Storage`].
//! Presentation code reads its fields and drives it only through the methods
//! below.

use crate::models::{SessionKind, SessionState, Settings, Stats, Theme};
use crate::persistence::{Database, DatabaseError, Storage};
use crate::quotes::{self, Quote};
use crate::tasks::{TaskList, Toggled};
use chrono::{Local, NaiveDate, Utc};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Emitted when a session runs out, so the main thread can play the alert
/// and show a notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvent {
    pub finished: SessionKind,
    pub next: SessionKind,
    /// Focus sessions completed today, after this completion.
    pub completed_sessions: u32,
}

pub struct App {
    pub settings: Settings,
    pub session: SessionState,
    pub stats: Stats,
    pub tasks: TaskList,
    pub zen_mode: bool,
    pub quote: Quote,
    storage: Storage,
}

impl App {
    /// Opens the database (the default location unless `path` is given) and
    /// restores the persisted state.
    pub fn open(path: Option<&Path>) -> Result<Self, AppError> {
        let db = match path {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        Ok(Self::with_storage(Storage::new(db)))
    }

    /// Creates an app on top of an existing storage gateway.
    pub fn with_storage(storage: Storage) -> Self {
        let settings = storage.load_settings();
        let stats = storage.load_stats();
        let tasks = TaskList::new(storage.load_tasks());

        Self {
            session: SessionState::new(&settings),
            settings,
            stats,
            tasks,
            zen_mode: false,
            quote: quotes::random_quote(),
            storage,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Starts or pauses the countdown depending on its current state.
    pub fn toggle_timer(&mut self) {
        if self.session.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Starts the countdown. No-op if already running.
    pub fn start(&mut self) {
        if self.session.is_running {
            return;
        }
        self.session.is_running = true;
    }

    /// Pauses the countdown, keeping the remaining time.
    pub fn pause(&mut self) {
        self.session.is_running = false;
    }

    /// Pauses and reloads the full duration of the current session.
    pub fn reset(&mut self) {
        self.pause();
        self.reload_session();
    }

    fn reload_session(&mut self) {
        let kind = self.session.kind;
        self.session.load(kind, self.settings.duration_mins(kind));
    }

    /// Jumps to the given session kind, paused and at full length.
    /// The cycle counter and stats are left alone.
    pub fn switch_session(&mut self, kind: SessionKind) {
        self.pause();
        self.session.load(kind, self.settings.duration_mins(kind));
    }

    /// Advances the timer by one second.
    /// Returns (state_changed, optional_completion_event).
    pub fn tick(&mut self) -> (bool, Option<CompletionEvent>) {
        if !self.session.is_running {
            return (false, None);
        }

        self.session.remaining_secs = self.session.remaining_secs.saturating_sub(1);
        if self.session.remaining_secs == 0 {
            (true, Some(self.complete_session()))
        } else {
            (true, None)
        }
    }

    /// Finishes the current session and moves to the next one in the cycle.
    pub fn complete_session(&mut self) -> CompletionEvent {
        self.pause();
        let finished = self.session.kind;

        let next = if finished == SessionKind::Focus {
            self.stats.roll_over(Self::today());
            self.stats
                .record_focus_completion(self.settings.focus_duration);

            if self.session.session_count >= self.settings.sessions_until_long_break {
                self.session.session_count = 1;
                SessionKind::LongBreak
            } else {
                self.session.session_count += 1;
                SessionKind::ShortBreak
            }
        } else {
            SessionKind::Focus
        };

        self.switch_session(next);
        self.storage.save_stats(&self.stats);
        self.quote = quotes::random_quote();

        CompletionEvent {
            finished,
            next,
            completed_sessions: self.stats.completed_sessions,
        }
    }

    /// Updates settings and saves them.
    ///
    /// A paused countdown is reloaded at the (possibly new) duration right
    /// away. A running one picks the change up at the next session boundary.
    pub fn update_settings<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        self.settings = self.settings.clone().sanitized();
        self.session.session_count = self
            .session
            .session_count
            .min(self.settings.sessions_until_long_break);
        self.storage.save_settings(&self.settings);

        if !self.session.is_running {
            self.reload_session();
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.update_settings(|s| s.theme = theme);
    }

    /// Adds a task. Returns false if the text was blank.
    pub fn add_task(&mut self, text: &str) -> bool {
        if self.tasks.add(text, Utc::now()).is_none() {
            return false;
        }
        self.storage.save_tasks(self.tasks.as_slice());
        true
    }

    /// Toggles a task and keeps the completed-task stat in step.
    pub fn toggle_task(&mut self, id: i64) -> bool {
        let Some(toggled) = self.tasks.toggle(id) else {
            return false;
        };

        self.stats.roll_over(Self::today());
        match toggled {
            Toggled::Completed => self.stats.increment_completed_tasks(),
            Toggled::Reopened => self.stats.decrement_completed_tasks(),
        }

        self.storage.save_stats(&self.stats);
        self.storage.save_tasks(self.tasks.as_slice());
        true
    }

    pub fn delete_task(&mut self, id: i64) -> bool {
        if !self.tasks.delete(id) {
            return false;
        }
        self.storage.save_tasks(self.tasks.as_slice());
        true
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.active_count()
    }

    pub fn toggle_zen(&mut self) {
        self.zen_mode = !self.zen_mode;
    }

    /// Closes whatever overlay is open. Returns true if anything changed.
    pub fn escape(&mut self) -> bool {
        if self.zen_mode {
            self.zen_mode = false;
            return true;
        }
        false
    }

    /// Clears all persisted data and reloads the in-memory state from the
    /// now empty store.
    pub fn reset_all_data(&mut self) {
        self.storage.reset_all();

        self.settings = self.storage.load_settings();
        self.stats = self.storage.load_stats();
        self.tasks = TaskList::new(self.storage.load_tasks());
        self.session = SessionState::new(&self.settings);
        self.zen_mode = false;
        self.quote = quotes::random_quote();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_DURATION_MINS;
    use crate::persistence::{Database, FailingStore, KeyValueStore};

    fn create_test_app() -> App {
        let db = Database::new_in_memory().unwrap();
        App::with_storage(Storage::new(db))
    }

    /// Runs the current session down to zero.
    fn run_out(app: &mut App) -> CompletionEvent {
        app.start();
        let ticks = app.session.remaining_secs;
        let mut event = None;
        for _ in 0..ticks {
            let (_, completion) = app.tick();
            if completion.is_some() {
                event = completion;
            }
        }
        event.expect("session should complete")
    }

    #[test]
    fn test_app_initial_state() {
        let app = create_test_app();
        assert_eq!(app.settings, Settings::default());
        assert_eq!(app.session.kind, SessionKind::Focus);
        assert_eq!(app.session.session_count, 1);
        assert_eq!(app.session.remaining_secs, 25 * 60);
        assert_eq!(app.session.total_secs, 25 * 60);
        assert!(!app.session.is_running);
        assert!(app.tasks.is_empty());
        assert_eq!(app.stats.date, Local::now().date_naive());
    }

    #[test]
    fn test_toggle_timer() {
        let mut app = create_test_app();
        app.toggle_timer();
        assert!(app.session.is_running);
        app.toggle_timer();
        assert!(!app.session.is_running);
    }

    #[test]
    fn test_pause_preserves_remaining() {
        let mut app = create_test_app();
        app.start();
        for _ in 0..10 {
            app.tick();
        }

        app.pause();
        assert_eq!(app.session.remaining_secs, 1490);

        // Tick shouldn't change time when paused
        let (changed, event) = app.tick();
        assert!(!changed);
        assert!(event.is_none());
        assert_eq!(app.session.remaining_secs, 1490);

        app.start();
        app.tick();
        assert_eq!(app.session.remaining_secs, 1489);
    }

    #[test]
    fn test_reset() {
        let mut app = create_test_app();
        app.start();
        for _ in 0..30 {
            app.tick();
        }

        app.reset();
        assert!(!app.session.is_running);
        assert_eq!(app.session.remaining_secs, 1500);
        assert_eq!(app.session.total_secs, 1500);
    }

    #[test]
    fn test_full_focus_session_scenario() {
        let mut app = create_test_app();
        app.start();

        let mut completions = 0;
        for _ in 0..1500 {
            if app.tick().1.is_some() {
                completions += 1;
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(app.stats.focus_minutes, 25);
        assert_eq!(app.stats.completed_sessions, 1);
        assert_eq!(app.session.kind, SessionKind::ShortBreak);
        assert_eq!(app.session.session_count, 2);
        assert!(!app.session.is_running);
        assert_eq!(app.session.remaining_secs, 5 * 60);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut app = create_test_app();
        app.update_settings(|s| s.focus_duration = 1);
        app.start();

        let events: Vec<_> = (0..120).filter_map(|_| app.tick().1).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            CompletionEvent {
                finished: SessionKind::Focus,
                next: SessionKind::ShortBreak,
                completed_sessions: 1,
            }
        );
    }

    #[test]
    fn test_long_break_after_threshold() {
        let mut app = create_test_app();

        for round in 1..=4 {
            let event = run_out(&mut app);
            assert_eq!(event.finished, SessionKind::Focus);
            if round < 4 {
                assert_eq!(app.session.kind, SessionKind::ShortBreak);
                assert_eq!(app.session.session_count, round + 1);
                let event = run_out(&mut app);
                assert_eq!(event.next, SessionKind::Focus);
            }
        }

        assert_eq!(app.session.kind, SessionKind::LongBreak);
        assert_eq!(app.session.session_count, 1);
        assert_eq!(app.stats.completed_sessions, 4);
        assert_eq!(app.stats.focus_minutes, 100);
    }

    #[test]
    fn test_break_completion_returns_to_focus() {
        let mut app = create_test_app();
        app.switch_session(SessionKind::LongBreak);
        app.session.session_count = 3;

        let event = run_out(&mut app);

        assert_eq!(event.finished, SessionKind::LongBreak);
        assert_eq!(app.session.kind, SessionKind::Focus);
        assert_eq!(app.session.session_count, 3);
        assert_eq!(app.stats.completed_sessions, 0);
        assert_eq!(app.stats.focus_minutes, 0);
    }

    #[test]
    fn test_switch_session_leaves_counters() {
        let mut app = create_test_app();
        app.session.session_count = 2;
        app.start();
        app.tick();

        app.switch_session(SessionKind::ShortBreak);

        assert!(!app.session.is_running);
        assert_eq!(app.session.kind, SessionKind::ShortBreak);
        assert_eq!(app.session.remaining_secs, 300);
        assert_eq!(app.session.total_secs, 300);
        assert_eq!(app.session.session_count, 2);
        assert_eq!(app.stats.completed_sessions, 0);
    }

    #[test]
    fn test_duration_edit_while_paused_applies_immediately() {
        let mut app = create_test_app();
        app.update_settings(|s| s.focus_duration = 40);
        assert_eq!(app.session.total_secs, 40 * 60);
        assert_eq!(app.session.remaining_secs, 40 * 60);
    }

    #[test]
    fn test_duration_edit_while_running_waits_for_boundary() {
        let mut app = create_test_app();
        app.start();
        app.tick();

        app.update_settings(|s| s.focus_duration = 40);
        assert_eq!(app.session.total_secs, 25 * 60);
        assert_eq!(app.session.remaining_secs, 25 * 60 - 1);

        app.reset();
        assert_eq!(app.session.total_secs, 40 * 60);
    }

    #[test]
    fn test_invalid_duration_falls_back_to_default() {
        let mut app = create_test_app();
        app.update_settings(|s| s.focus_duration = 0);
        assert_eq!(app.settings.focus_duration, 25);
        assert_eq!(app.session.total_secs, 25 * 60);
    }

    #[test]
    fn test_any_edit_while_paused_reloads_countdown() {
        let mut app = create_test_app();
        app.start();
        app.tick();
        app.pause();
        assert_eq!(app.session.remaining_secs, 1499);

        app.update_settings(|s| s.sound_enabled = false);
        assert_eq!(app.session.remaining_secs, 25 * 60);
        assert_eq!(app.session.total_secs, 25 * 60);

        app.start();
        app.tick();
        app.pause();
        app.set_theme(Theme::Light);
        assert_eq!(app.session.remaining_secs, 25 * 60);
        assert_eq!(app.settings.theme, Theme::Light);
    }

    #[test]
    fn test_huge_stored_duration_opens_capped() {
        let db = Database::new_in_memory().unwrap();
        db.set("settings", r#"{"focus_duration": 100000000}"#).unwrap();

        let app = App::with_storage(Storage::new(db));
        assert_eq!(app.settings.focus_duration, MAX_DURATION_MINS);
        assert_eq!(app.session.total_secs, MAX_DURATION_MINS * 60);
    }

    #[test]
    fn test_huge_duration_edit_is_capped_and_persisted() {
        let mut app = create_test_app();
        app.update_settings(|s| s.long_break_duration = 100_000_000);
        app.switch_session(SessionKind::LongBreak);

        assert_eq!(app.settings.long_break_duration, MAX_DURATION_MINS);
        assert_eq!(app.session.total_secs, MAX_DURATION_MINS * 60);
        assert_eq!(app.storage.load_settings().long_break_duration, MAX_DURATION_MINS);
    }

    #[test]
    fn test_lowering_threshold_clamps_session_count() {
        let mut app = create_test_app();
        app.session.session_count = 4;
        app.update_settings(|s| s.sessions_until_long_break = 2);
        assert_eq!(app.session.session_count, 2);
    }

    #[test]
    fn test_settings_are_persisted() {
        let mut app = create_test_app();
        app.update_settings(|s| s.short_break_duration = 7);
        assert_eq!(app.storage.load_settings().short_break_duration, 7);
    }

    #[test]
    fn test_stats_are_persisted_on_completion() {
        let mut app = create_test_app();
        run_out(&mut app);
        assert_eq!(app.storage.load_stats().completed_sessions, 1);
    }

    #[test]
    fn test_add_task() {
        let mut app = create_test_app();
        assert!(app.add_task("  Write docs "));
        assert!(!app.add_task("  "));

        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks.as_slice()[0].text, "Write docs");
        assert_eq!(app.storage.load_tasks().len(), 1);
    }

    #[test]
    fn test_toggle_task_roundtrip_restores_stat() {
        let mut app = create_test_app();
        app.add_task("a");
        let id = app.tasks.as_slice()[0].id;
        app.stats.completed_tasks = 3;

        assert!(app.toggle_task(id));
        assert_eq!(app.stats.completed_tasks, 4);
        assert_eq!(app.active_task_count(), 0);

        assert!(app.toggle_task(id));
        assert_eq!(app.stats.completed_tasks, 3);
        assert_eq!(app.active_task_count(), 1);

        assert_eq!(app.storage.load_stats().completed_tasks, 3);
    }

    #[test]
    fn test_reopen_task_floors_stat_at_zero() {
        let mut app = create_test_app();
        app.add_task("a");
        let id = app.tasks.as_slice()[0].id;
        app.toggle_task(id);
        app.stats.completed_tasks = 0;

        app.toggle_task(id);
        assert_eq!(app.stats.completed_tasks, 0);
    }

    #[test]
    fn test_unknown_task_ids_are_ignored() {
        let mut app = create_test_app();
        app.add_task("a");
        assert!(!app.toggle_task(42));
        assert!(!app.delete_task(42));
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.stats.completed_tasks, 0);
    }

    #[test]
    fn test_delete_task() {
        let mut app = create_test_app();
        app.add_task("a");
        let id = app.tasks.as_slice()[0].id;
        assert!(app.delete_task(id));
        assert!(app.tasks.is_empty());
        assert!(app.storage.load_tasks().is_empty());
    }

    #[test]
    fn test_zen_and_escape() {
        let mut app = create_test_app();
        assert!(!app.escape());

        app.toggle_zen();
        assert!(app.zen_mode);

        assert!(app.escape());
        assert!(!app.zen_mode);
    }

    #[test]
    fn test_reset_all_data() {
        let mut app = create_test_app();
        app.update_settings(|s| s.focus_duration = 50);
        app.add_task("a");
        run_out(&mut app);
        app.toggle_zen();

        app.reset_all_data();

        assert_eq!(app.settings, Settings::default());
        assert!(app.tasks.is_empty());
        assert_eq!(app.stats.completed_sessions, 0);
        assert_eq!(app.session, SessionState::new(&Settings::default()));
        assert!(!app.zen_mode);
    }

    #[test]
    fn test_storage_failures_do_not_interrupt() {
        let mut app = App::with_storage(Storage::new(FailingStore));
        assert_eq!(app.settings, Settings::default());

        app.update_settings(|s| s.focus_duration = 1);
        assert!(app.add_task("still works"));
        let event = run_out(&mut app);

        assert_eq!(event.next, SessionKind::ShortBreak);
        assert_eq!(app.stats.completed_sessions, 1);
        assert_eq!(app.tasks.len(), 1);
    }
}
