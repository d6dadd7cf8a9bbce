//! Menu building and updating for the tray dropdown.

use crate::app::App;
use crate::models::{SessionKind, SessionState, Settings, Stats, Task, Theme};
use crate::shortcuts::Shortcut;
use crate::ticker::format_time;
use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;
use thiserror::Error;

// Menu item IDs as constants
pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_COUNTER: &str = "counter";
pub const ID_STATS: &str = "stats";
pub const ID_QUOTE: &str = "quote";
pub const ID_TOGGLE_RUN: &str = "toggle_run";
pub const ID_RESET: &str = "reset";
pub const ID_ZEN: &str = "zen";
pub const ID_EXIT_ZEN: &str = "exit_zen";
pub const ID_ADD_TASK: &str = "add_task";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_NOTIF_TOGGLE: &str = "notif_toggle";
pub const ID_RESET_ALL: &str = "reset_all";
pub const ID_QUIT: &str = "quit";

// Prefixes for parameterised items
pub const PREFIX_SESSION: &str = "session_";
pub const PREFIX_TASK_TOGGLE: &str = "task_toggle_";
pub const PREFIX_TASK_DELETE: &str = "task_delete_";
pub const PREFIX_FOCUS: &str = "focus_";
pub const PREFIX_SHORT: &str = "short_";
pub const PREFIX_LONG: &str = "long_";
pub const PREFIX_THRESH: &str = "thresh_";
pub const PREFIX_VOLUME: &str = "volume_";
pub const PREFIX_THEME: &str = "theme_";

const FOCUS_PRESETS: [u32; 7] = [15, 20, 25, 30, 45, 50, 60];
const SHORT_PRESETS: [u32; 4] = [3, 5, 10, 15];
const LONG_PRESETS: [u32; 4] = [10, 15, 20, 30];
const THRESH_PRESETS: [u32; 5] = [2, 3, 4, 5, 6];
const VOLUME_PRESETS: [u32; 5] = [0, 25, 50, 75, 100];

const TASK_LABEL_MAX: usize = 40;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// Holds references to menu items that need dynamic updates.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub counter: MenuItem,
    pub stats: MenuItem,
    pub quote: MenuItem,
    pub toggle_run: MenuItem,
    pub zen: CheckMenuItem,
    pub exit_zen: MenuItem,
    pub session_checks: HashMap<SessionKind, CheckMenuItem>,
}

fn info_item(id: &str, text: String) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, false, None::<Accelerator>)
}

/// Builds the complete menu structure.
pub fn build_menu(app: &App) -> Result<(Menu, MenuItems), MenuError> {
    let menu = Menu::new();

    // Status display (disabled, info only)
    let status = info_item(ID_STATUS, format_status(&app.session));
    let progress = info_item(ID_PROGRESS, format_progress(&app.session));
    let counter = info_item(
        ID_COUNTER,
        format_session_counter(&app.session, &app.settings),
    );
    menu.append(&status)?;
    menu.append(&progress)?;
    menu.append(&counter)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let stats = info_item(ID_STATS, format_stats(&app.stats));
    let quote = info_item(ID_QUOTE, app.quote.display());
    menu.append(&stats)?;
    menu.append(&quote)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Control buttons
    let toggle_run = MenuItem::with_id(
        MenuId::new(Shortcut::ToggleRun.menu_id()),
        toggle_run_label(&app.session),
        true,
        Some(Shortcut::ToggleRun.accelerator()),
    );
    let reset = MenuItem::with_id(
        MenuId::new(Shortcut::Reset.menu_id()),
        "↺  Reset",
        true,
        Some(Shortcut::Reset.accelerator()),
    );
    let zen = CheckMenuItem::with_id(
        MenuId::new(Shortcut::ToggleZen.menu_id()),
        "Zen Display",
        true,
        app.zen_mode,
        Some(Shortcut::ToggleZen.accelerator()),
    );
    let exit_zen = MenuItem::with_id(
        MenuId::new(Shortcut::Escape.menu_id()),
        "Exit Zen Display",
        app.zen_mode,
        Some(Shortcut::Escape.accelerator()),
    );
    menu.append(&toggle_run)?;
    menu.append(&reset)?;
    menu.append(&zen)?;
    menu.append(&exit_zen)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Session tabs
    let mut session_checks = HashMap::new();
    for kind in SessionKind::ALL {
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", PREFIX_SESSION, kind.id())),
            kind.label(),
            true,
            kind == app.session.kind,
            None::<Accelerator>,
        );
        menu.append(&item)?;
        session_checks.insert(kind, item);
    }

    menu.append(&PredefinedMenuItem::separator())?;

    menu.append(&build_tasks_submenu(app.tasks.as_slice(), app.active_task_count())?)?;
    menu.append(&build_settings_submenu(&app.settings)?)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Quit
    let quit = MenuItem::with_id(MenuId::new(ID_QUIT), "Quit Focusbar", true, None::<Accelerator>);
    menu.append(&quit)?;

    let items = MenuItems {
        status,
        progress,
        counter,
        stats,
        quote,
        toggle_run,
        zen,
        exit_zen,
        session_checks,
    };

    Ok((menu, items))
}

fn build_tasks_submenu(tasks: &[Task], active: usize) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new(format!("☰  Tasks ({})", format_tasks_count(active)), true);

    let add = MenuItem::with_id(
        MenuId::new(ID_ADD_TASK),
        "＋ Add Task from Clipboard",
        true,
        None::<Accelerator>,
    );
    submenu.append(&add)?;

    if !tasks.is_empty() {
        submenu.append(&PredefinedMenuItem::separator())?;
    }

    for task in tasks {
        let task_sub = Submenu::new(format_task_label(task), true);
        let toggle_text = if task.completed {
            "Mark Not Done"
        } else {
            "Mark Done"
        };
        task_sub.append(&MenuItem::with_id(
            MenuId::new(format!("{}{}", PREFIX_TASK_TOGGLE, task.id)),
            toggle_text,
            true,
            None::<Accelerator>,
        ))?;
        task_sub.append(&MenuItem::with_id(
            MenuId::new(format!("{}{}", PREFIX_TASK_DELETE, task.id)),
            "Delete",
            true,
            None::<Accelerator>,
        ))?;
        submenu.append(&task_sub)?;
    }

    Ok(submenu)
}

/// Builds a submenu of check items for a numeric setting.
fn preset_submenu(
    title: String,
    prefix: &str,
    presets: &[u32],
    current: u32,
    unit: &str,
) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new(title, true);
    for value in presets_with(presets, current) {
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", prefix, value)),
            format!("{} {}", value, unit),
            true,
            value == current,
            None::<Accelerator>,
        );
        submenu.append(&item)?;
    }
    Ok(submenu)
}

fn build_settings_submenu(settings: &Settings) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new("⚙  Settings", true);

    submenu.append(&preset_submenu(
        format!("Focus: {} min", settings.focus_duration),
        PREFIX_FOCUS,
        &FOCUS_PRESETS,
        settings.focus_duration,
        "min",
    )?)?;
    submenu.append(&preset_submenu(
        format!("Short Break: {} min", settings.short_break_duration),
        PREFIX_SHORT,
        &SHORT_PRESETS,
        settings.short_break_duration,
        "min",
    )?)?;
    submenu.append(&preset_submenu(
        format!("Long Break: {} min", settings.long_break_duration),
        PREFIX_LONG,
        &LONG_PRESETS,
        settings.long_break_duration,
        "min",
    )?)?;
    submenu.append(&preset_submenu(
        format!(
            "Long Break After: {} sessions",
            settings.sessions_until_long_break
        ),
        PREFIX_THRESH,
        &THRESH_PRESETS,
        settings.sessions_until_long_break,
        "sessions",
    )?)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let sound_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_SOUND_TOGGLE),
        "Sound Enabled",
        true,
        settings.sound_enabled,
        None::<Accelerator>,
    );
    submenu.append(&sound_toggle)?;
    submenu.append(&preset_submenu(
        format!("Volume: {}%", settings.sound_volume),
        PREFIX_VOLUME,
        &VOLUME_PRESETS,
        u32::from(settings.sound_volume),
        "%",
    )?)?;

    let notif_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_NOTIF_TOGGLE),
        "Notifications Enabled",
        true,
        settings.notifications_enabled,
        None::<Accelerator>,
    );
    submenu.append(&notif_toggle)?;

    let theme_sub = Submenu::new("Theme", true);
    for (theme, label) in [(Theme::Light, "Light"), (Theme::Dark, "Dark")] {
        theme_sub.append(&CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", PREFIX_THEME, theme.id())),
            label,
            true,
            theme == settings.theme,
            None::<Accelerator>,
        ))?;
    }
    submenu.append(&theme_sub)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    // Destructive reset sits behind a second click
    let reset_sub = Submenu::new("Reset All Data…", true);
    reset_sub.append(&MenuItem::with_id(
        MenuId::new(ID_RESET_ALL),
        "Erase Settings, Stats and Tasks",
        true,
        None::<Accelerator>,
    ))?;
    submenu.append(&reset_sub)?;

    Ok(submenu)
}

/// Updates the menu items based on the current state.
pub fn update_menu_items(items: &MenuItems, app: &App) {
    items.status.set_text(format_status(&app.session));
    items.progress.set_text(format_progress(&app.session));
    items
        .counter
        .set_text(format_session_counter(&app.session, &app.settings));
    items.stats.set_text(format_stats(&app.stats));
    items.quote.set_text(app.quote.display());
    items.toggle_run.set_text(toggle_run_label(&app.session));

    items.zen.set_checked(app.zen_mode);
    items.exit_zen.set_enabled(app.zen_mode);

    for (&kind, check) in &items.session_checks {
        check.set_checked(kind == app.session.kind);
    }
}

/// Adds the current value to a preset list if it is not already there.
fn presets_with(presets: &[u32], current: u32) -> Vec<u32> {
    let mut values = presets.to_vec();
    if !values.contains(&current) {
        values.push(current);
        values.sort_unstable();
    }
    values
}

fn toggle_run_label(session: &SessionState) -> &'static str {
    if session.is_running {
        "⏸  Pause"
    } else {
        "▶  Start"
    }
}

/// Formats the status line for the menu.
pub fn format_status(session: &SessionState) -> String {
    let time = format_time(session.remaining_secs);
    let label = session.kind.label();
    if session.is_running {
        format!("⏱  {} · {}", time, label)
    } else if session.remaining_secs < session.total_secs {
        format!("⏸  {} · {} (paused)", time, label)
    } else {
        format!("Ready · {} {}", label, time)
    }
}

/// Formats the progress bar for the menu.
pub fn format_progress(session: &SessionState) -> String {
    let pct = 1.0 - session.remaining_fraction();
    let filled = ((pct * 20.0).round() as usize).min(20);
    let empty = 20 - filled;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

pub fn format_session_counter(session: &SessionState, settings: &Settings) -> String {
    format!(
        "Session {} of {}",
        session.session_count, settings.sessions_until_long_break
    )
}

/// Formats minutes as "1h 5m" or "25m".
pub fn format_focus_time(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

fn plural(count: u32, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Formats the daily stats for the menu.
pub fn format_stats(stats: &Stats) -> String {
    format!(
        "Today: {} focus · {} · {} done",
        format_focus_time(stats.focus_minutes),
        plural(stats.completed_sessions, "session"),
        plural(stats.completed_tasks, "task")
    )
}

pub fn format_tasks_count(active: usize) -> String {
    plural(u32::try_from(active).unwrap_or(u32::MAX), "task")
}

pub fn format_task_label(task: &Task) -> String {
    let mark = if task.completed { "☑" } else { "☐" };
    let text = if task.text.chars().count() > TASK_LABEL_MAX {
        let cut: String = task.text.chars().take(TASK_LABEL_MAX - 1).collect();
        format!("{}…", cut)
    } else {
        task.text.clone()
    };
    format!("{} {}", mark, text)
}
