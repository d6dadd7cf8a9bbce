//! Menu event handling.
//!
//! Menu ids and keyboard shortcuts are both translated into [`Action`]s,
//! which are the only way the presentation layer mutates the controller.

use crate::app::App;
use crate::clipboard;
use crate::menu::{
    ID_ADD_TASK, ID_NOTIF_TOGGLE, ID_QUIT, ID_RESET_ALL, ID_SOUND_TOGGLE, PREFIX_FOCUS,
    PREFIX_LONG, PREFIX_SESSION, PREFIX_SHORT, PREFIX_TASK_DELETE, PREFIX_TASK_TOGGLE,
    PREFIX_THEME, PREFIX_THRESH, PREFIX_VOLUME,
};
use crate::models::{SessionKind, Theme};
use crate::shortcuts::Shortcut;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleRun,
    Reset,
    ToggleZen,
    Escape,
    SwitchSession(SessionKind),
    AddTaskFromClipboard,
    AddTask(String),
    ToggleTask(i64),
    DeleteTask(i64),
    SetFocusDuration(u32),
    SetShortBreakDuration(u32),
    SetLongBreakDuration(u32),
    SetSessionsUntilLongBreak(u32),
    ToggleSound,
    SetVolume(u8),
    ToggleNotifications,
    SetTheme(Theme),
    ResetAllData,
    Quit,
}

/// Result of handling an action.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Nothing visible changed.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer or display state changed, menu items need update.
    StateChanged,
    /// Tasks or settings changed, menu needs rebuild.
    MenuRebuild,
}

/// Translates a menu item id into an action.
pub fn action_for_menu_id(id: &str) -> Option<Action> {
    if let Some(shortcut) = Shortcut::from_menu_id(id) {
        return Some(shortcut.action());
    }

    let action = match id {
        ID_ADD_TASK => Action::AddTaskFromClipboard,
        ID_SOUND_TOGGLE => Action::ToggleSound,
        ID_NOTIF_TOGGLE => Action::ToggleNotifications,
        ID_RESET_ALL => Action::ResetAllData,
        ID_QUIT => Action::Quit,
        _ => return parameterised_action(id),
    };
    Some(action)
}

fn parameterised_action(id: &str) -> Option<Action> {
    if let Some(kind) = id.strip_prefix(PREFIX_SESSION) {
        return SessionKind::from_id(kind).map(Action::SwitchSession);
    }
    if let Some(task_id) = id.strip_prefix(PREFIX_TASK_TOGGLE) {
        return task_id.parse().ok().map(Action::ToggleTask);
    }
    if let Some(task_id) = id.strip_prefix(PREFIX_TASK_DELETE) {
        return task_id.parse().ok().map(Action::DeleteTask);
    }
    if let Some(theme) = id.strip_prefix(PREFIX_THEME) {
        return Theme::from_id(theme).map(Action::SetTheme);
    }
    if let Some(volume) = id.strip_prefix(PREFIX_VOLUME) {
        return volume
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .map(Action::SetVolume);
    }

    let numeric: [(&str, fn(u32) -> Action); 4] = [
        (PREFIX_FOCUS, Action::SetFocusDuration),
        (PREFIX_SHORT, Action::SetShortBreakDuration),
        (PREFIX_LONG, Action::SetLongBreakDuration),
        (PREFIX_THRESH, Action::SetSessionsUntilLongBreak),
    ];
    numeric.into_iter().find_map(|(prefix, make)| {
        id.strip_prefix(prefix)
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .map(make)
    })
}

/// Handles a menu event id and updates the app state accordingly.
pub fn handle_menu_event(app: &mut App, id: &str) -> EventResult {
    match action_for_menu_id(id) {
        Some(action) => apply_action(app, action),
        None => {
            log::debug!("Ignoring unknown menu id {}", id);
            EventResult::Continue
        }
    }
}

/// Applies an action to the controller.
pub fn apply_action(app: &mut App, action: Action) -> EventResult {
    match action {
        Action::ToggleRun => {
            app.toggle_timer();
            EventResult::StateChanged
        }
        Action::Reset => {
            app.reset();
            EventResult::StateChanged
        }
        Action::ToggleZen => {
            app.toggle_zen();
            EventResult::StateChanged
        }
        Action::Escape => {
            if app.escape() {
                EventResult::StateChanged
            } else {
                EventResult::Continue
            }
        }
        Action::SwitchSession(kind) => {
            app.switch_session(kind);
            EventResult::StateChanged
        }
        Action::AddTaskFromClipboard => match clipboard::read_task_text() {
            Ok(text) => apply_action(app, Action::AddTask(text)),
            Err(e) => {
                log::warn!("Could not add task from clipboard: {}", e);
                EventResult::Continue
            }
        },
        Action::AddTask(text) => rebuild_if(app.add_task(&text)),
        Action::ToggleTask(id) => rebuild_if(app.toggle_task(id)),
        Action::DeleteTask(id) => rebuild_if(app.delete_task(id)),
        Action::SetFocusDuration(mins) => {
            app.update_settings(|s| s.focus_duration = mins);
            EventResult::MenuRebuild
        }
        Action::SetShortBreakDuration(mins) => {
            app.update_settings(|s| s.short_break_duration = mins);
            EventResult::MenuRebuild
        }
        Action::SetLongBreakDuration(mins) => {
            app.update_settings(|s| s.long_break_duration = mins);
            EventResult::MenuRebuild
        }
        Action::SetSessionsUntilLongBreak(count) => {
            app.update_settings(|s| s.sessions_until_long_break = count);
            EventResult::MenuRebuild
        }
        Action::ToggleSound => {
            app.update_settings(|s| s.sound_enabled = !s.sound_enabled);
            EventResult::MenuRebuild
        }
        Action::SetVolume(volume) => {
            app.update_settings(|s| s.sound_volume = volume);
            EventResult::MenuRebuild
        }
        Action::ToggleNotifications => {
            app.update_settings(|s| s.notifications_enabled = !s.notifications_enabled);
            EventResult::MenuRebuild
        }
        Action::SetTheme(theme) => {
            app.set_theme(theme);
            EventResult::MenuRebuild
        }
        Action::ResetAllData => {
            app.reset_all_data();
            EventResult::MenuRebuild
        }
        Action::Quit => EventResult::Quit,
    }
}

fn rebuild_if(changed: bool) -> EventResult {
    if changed {
        EventResult::MenuRebuild
    } else {
        EventResult::Continue
    }
}
