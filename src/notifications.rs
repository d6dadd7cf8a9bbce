//! Desktop notifications for completed sessions.

use crate::app::CompletionEvent;
use crate::models::SessionKind;
use notify_rust::Notification;
use std::thread;

const APP_NAME: &str = "Focusbar";

/// Body text for the notification after a session of the given kind ends.
pub fn completion_message(finished: SessionKind) -> &'static str {
    match finished {
        SessionKind::Focus => "Focus session complete! Time for a break.",
        SessionKind::ShortBreak => "Break is over! Ready to focus?",
        SessionKind::LongBreak => "Long break is over! Let's get back to work!",
    }
}

/// Shows a notification when a session is completed.
/// Runs in a background thread to avoid blocking.
pub fn notify_session_complete(event: CompletionEvent) {
    thread::spawn(move || {
        let mut body = completion_message(event.finished).to_string();
        if event.next == SessionKind::LongBreak {
            body.push_str(&format!(
                "\nThat's {} sessions today. Enjoy the long break.",
                event.completed_sessions
            ));
        }

        if let Err(e) = Notification::new()
            .summary(APP_NAME)
            .body(&body)
            .show()
        {
            log::warn!("Failed to show notification: {}", e);
        }
    });
}
