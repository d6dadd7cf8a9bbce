//! Command-line interface.
//!
//! Without a subcommand the tray app runs. Subcommands inspect and edit the
//! persisted tasks, stats and settings.

use crate::app::App;
use crate::menu::{format_focus_time, format_tasks_count};
use crate::models::{parse_positive, parse_volume, Settings, Theme};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "🍅 focusbar - A menubar Pomodoro timer")]
pub struct Args {
    /// Database file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Manage the task checklist
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Show today's statistics
    Stats,
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommand>,
    },
    /// Erase all settings, stats and tasks
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TaskCommand {
    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List all tasks
    List,
    /// Mark a task done, or not done
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SettingsCommand {
    /// Print all settings
    Show,
    /// Change one setting. Invalid values fall back to the default.
    Set { field: SettingField, value: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    FocusDuration,
    ShortBreakDuration,
    LongBreakDuration,
    SessionsUntilLongBreak,
    SoundEnabled,
    SoundVolume,
    Theme,
    NotificationsEnabled,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl SettingField {
    /// Applies raw user input to the settings, using the field default when
    /// the input does not parse.
    pub fn apply(self, settings: &mut Settings, raw: &str) {
        let defaults = Settings::default();
        match self {
            Self::FocusDuration => {
                settings.focus_duration = parse_positive(raw).unwrap_or(defaults.focus_duration)
            }
            Self::ShortBreakDuration => {
                settings.short_break_duration =
                    parse_positive(raw).unwrap_or(defaults.short_break_duration)
            }
            Self::LongBreakDuration => {
                settings.long_break_duration =
                    parse_positive(raw).unwrap_or(defaults.long_break_duration)
            }
            Self::SessionsUntilLongBreak => {
                settings.sessions_until_long_break =
                    parse_positive(raw).unwrap_or(defaults.sessions_until_long_break)
            }
            Self::SoundEnabled => {
                settings.sound_enabled = parse_flag(raw).unwrap_or(defaults.sound_enabled)
            }
            Self::SoundVolume => {
                settings.sound_volume = parse_volume(raw).unwrap_or(defaults.sound_volume)
            }
            Self::Theme => {
                settings.theme = Theme::from_id(raw.trim()).unwrap_or(defaults.theme)
            }
            Self::NotificationsEnabled => {
                settings.notifications_enabled =
                    parse_flag(raw).unwrap_or(defaults.notifications_enabled)
            }
        }
    }
}

fn write_settings(out: &mut impl Write, settings: &Settings) -> io::Result<()> {
    writeln!(out, "focus-duration = {} min", settings.focus_duration)?;
    writeln!(out, "short-break-duration = {} min", settings.short_break_duration)?;
    writeln!(out, "long-break-duration = {} min", settings.long_break_duration)?;
    writeln!(
        out,
        "sessions-until-long-break = {}",
        settings.sessions_until_long_break
    )?;
    writeln!(out, "sound-enabled = {}", settings.sound_enabled)?;
    writeln!(out, "sound-volume = {}", settings.sound_volume)?;
    writeln!(out, "theme = {}", settings.theme.id())?;
    writeln!(out, "notifications-enabled = {}", settings.notifications_enabled)?;
    Ok(())
}

/// Runs a subcommand against the app, writing human readable output.
pub fn run_command<W, C>(
    app: &mut App,
    command: Command,
    out: &mut W,
    confirm: C,
) -> Result<(), CliError>
where
    W: Write,
    C: FnOnce() -> io::Result<bool>,
{
    match command {
        Command::Task { action } => run_task_command(app, action, out)?,
        Command::Stats => {
            let stats = &app.stats;
            writeln!(out, "Date: {}", stats.date)?;
            writeln!(out, "Focus time: {}", format_focus_time(stats.focus_minutes))?;
            writeln!(out, "Sessions: {}", stats.completed_sessions)?;
            writeln!(out, "Tasks done: {}", stats.completed_tasks)?;
        }
        Command::Settings { action } => match action.unwrap_or(SettingsCommand::Show) {
            SettingsCommand::Show => write_settings(out, &app.settings)?,
            SettingsCommand::Set { field, value } => {
                app.update_settings(|s| field.apply(s, &value));
                write_settings(out, &app.settings)?;
            }
        },
        Command::Reset { yes } => {
            if yes || confirm()? {
                app.reset_all_data();
                writeln!(out, "All data cleared.")?;
            } else {
                writeln!(out, "Reset cancelled.")?;
            }
        }
    }
    Ok(())
}

fn run_task_command(app: &mut App, action: TaskCommand, out: &mut impl Write) -> io::Result<()> {
    match action {
        TaskCommand::Add { text } => {
            if app.add_task(&text.join(" ")) {
                if let Some(task) = app.tasks.as_slice().last() {
                    writeln!(out, "Added task {}: {}", task.id, task.text)?;
                }
            } else {
                writeln!(out, "Nothing to add.")?;
            }
        }
        TaskCommand::List => {
            for task in app.tasks.as_slice() {
                let mark = if task.completed { "x" } else { " " };
                writeln!(out, "[{}] {}  {}", mark, task.id, task.text)?;
            }
            writeln!(out, "{} left", format_tasks_count(app.active_task_count()))?;
        }
        TaskCommand::Toggle { id } => {
            if app.toggle_task(id) {
                let done = app.tasks.get(id).is_some_and(|t| t.completed);
                let state = if done { "done" } else { "not done" };
                writeln!(out, "Task {} marked {}", id, state)?;
            } else {
                writeln!(out, "No task with id {}", id)?;
            }
        }
        TaskCommand::Delete { id } => {
            if app.delete_task(id) {
                writeln!(out, "Deleted task {}", id)?;
            } else {
                writeln!(out, "No task with id {}", id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_DURATION_MINS;
    use crate::persistence::{Database, Storage};

    fn create_test_app() -> App {
        App::with_storage(Storage::new(Database::new_in_memory().unwrap()))
    }

    fn run(app: &mut App, args: &[&str]) -> String {
        let args = Args::try_parse_from(std::iter::once("focusbar").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run_command(app, args.command.unwrap(), &mut out, || Ok(false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_no_subcommand_runs_tray() {
        let args = Args::try_parse_from(["focusbar"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.db.is_none());
    }

    #[test]
    fn test_parse_global_db_flag() {
        let args = Args::try_parse_from(["focusbar", "stats", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(args.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(args.command, Some(Command::Stats));
    }

    #[test]
    fn test_parse_unknown_setting_field_fails() {
        assert!(Args::try_parse_from(["focusbar", "settings", "set", "colour", "red"]).is_err());
    }

    #[test]
    fn test_task_add_and_list() {
        let mut app = create_test_app();
        let output = run(&mut app, &["task", "add", "Write", "the", "report"]);
        assert!(output.starts_with("Added task "));
        assert!(output.trim_end().ends_with(": Write the report"));

        let output = run(&mut app, &["task", "add", "   "]);
        assert_eq!(output, "Nothing to add.\n");
        assert_eq!(app.tasks.len(), 1);

        let id = app.tasks.as_slice()[0].id;
        let output = run(&mut app, &["task", "list"]);
        assert_eq!(output, format!("[ ] {}  Write the report\n1 task left\n", id));
    }

    #[test]
    fn test_task_toggle_and_delete() {
        let mut app = create_test_app();
        app.add_task("Read");
        let id = app.tasks.as_slice()[0].id.to_string();

        assert_eq!(
            run(&mut app, &["task", "toggle", &id]),
            format!("Task {} marked done\n", id)
        );
        assert_eq!(app.stats.completed_tasks, 1);
        assert_eq!(
            run(&mut app, &["task", "toggle", &id]),
            format!("Task {} marked not done\n", id)
        );
        assert_eq!(app.stats.completed_tasks, 0);

        assert_eq!(run(&mut app, &["task", "delete", "7"]), "No task with id 7\n");
        assert_eq!(
            run(&mut app, &["task", "delete", &id]),
            format!("Deleted task {}\n", id)
        );
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_stats_output() {
        let mut app = create_test_app();
        app.stats.focus_minutes = 75;
        app.stats.completed_sessions = 3;

        let output = run(&mut app, &["stats"]);
        assert!(output.contains("Focus time: 1h 15m\n"));
        assert!(output.contains("Sessions: 3\n"));
        assert!(output.contains("Tasks done: 0\n"));
    }

    #[test]
    fn test_settings_set() {
        let mut app = create_test_app();
        let output = run(&mut app, &["settings", "set", "focus-duration", "50"]);
        assert!(output.contains("focus-duration = 50 min"));
        assert_eq!(app.session.total_secs, 50 * 60);

        run(&mut app, &["settings", "set", "theme", "light"]);
        assert_eq!(app.settings.theme, Theme::Light);

        run(&mut app, &["settings", "set", "sound-enabled", "off"]);
        assert!(!app.settings.sound_enabled);
    }

    #[test]
    fn test_settings_set_huge_duration_is_capped() {
        let mut app = create_test_app();
        run(&mut app, &["settings", "set", "focus-duration", "100000000"]);
        assert_eq!(app.settings.focus_duration, MAX_DURATION_MINS);
        assert_eq!(app.session.total_secs, MAX_DURATION_MINS * 60);
    }

    #[test]
    fn test_settings_set_invalid_falls_back_to_default() {
        let mut app = create_test_app();
        app.update_settings(|s| s.focus_duration = 50);

        run(&mut app, &["settings", "set", "focus-duration", "abc"]);
        assert_eq!(app.settings.focus_duration, 25);

        run(&mut app, &["settings", "set", "sessions-until-long-break", "0"]);
        assert_eq!(app.settings.sessions_until_long_break, 4);

        run(&mut app, &["settings", "set", "sound-volume", "0"]);
        assert_eq!(app.settings.sound_volume, 0);
    }

    #[test]
    fn test_settings_show_is_default_action() {
        let mut app = create_test_app();
        let output = run(&mut app, &["settings"]);
        assert!(output.contains("focus-duration = 25 min\n"));
        assert!(output.contains("theme = dark\n"));
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut app = create_test_app();
        app.add_task("keep me");

        let output = run(&mut app, &["reset"]);
        assert_eq!(output, "Reset cancelled.\n");
        assert_eq!(app.tasks.len(), 1);

        let output = run(&mut app, &["reset", "--yes"]);
        assert_eq!(output, "All data cleared.\n");
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_reset_with_confirmed_prompt() {
        let mut app = create_test_app();
        app.add_task("gone");

        let mut out = Vec::new();
        run_command(&mut app, Command::Reset { yes: false }, &mut out, || Ok(true)).unwrap();
        assert!(app.tasks.is_empty());
    }
}
