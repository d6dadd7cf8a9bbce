//! Reading task text from the clipboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("clipboard has no text")]
    NoText,
}

/// Returns the first non-blank line of the clipboard text.
pub fn read_task_text() -> Result<String, ClipboardError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|error| ClipboardError::Clipboard(error.to_string()))?;

    let text = match clipboard.get_text() {
        Ok(text) => text,
        Err(arboard::Error::ContentNotAvailable) => return Err(ClipboardError::NoText),
        Err(error) => return Err(ClipboardError::Clipboard(error.to_string())),
    };

    first_line(&text).ok_or(ClipboardError::NoText)
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
