//! Keyboard shortcuts.
//!
//! Each key is bound as the accelerator of one tray menu item, so a key press
//! arrives as that item's menu event and resolves back here. The tray has no
//! text field, so there is no typing state to suppress shortcuts for.

use crate::event::Action;
use crate::menu::{ID_EXIT_ZEN, ID_RESET, ID_TOGGLE_RUN, ID_ZEN};
use muda::accelerator::{Accelerator, Code};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleRun,
    Reset,
    ToggleZen,
    Escape,
}

impl Shortcut {
    pub const ALL: [Shortcut; 4] = [Self::ToggleRun, Self::Reset, Self::ToggleZen, Self::Escape];

    pub fn code(self) -> Code {
        match self {
            Self::ToggleRun => Code::Space,
            Self::Reset => Code::KeyR,
            Self::ToggleZen => Code::KeyZ,
            Self::Escape => Code::Escape,
        }
    }

    /// Id of the menu item carrying this accelerator.
    pub fn menu_id(self) -> &'static str {
        match self {
            Self::ToggleRun => ID_TOGGLE_RUN,
            Self::Reset => ID_RESET,
            Self::ToggleZen => ID_ZEN,
            Self::Escape => ID_EXIT_ZEN,
        }
    }

    pub fn from_menu_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.menu_id() == id)
    }

    pub fn action(self) -> Action {
        match self {
            Self::ToggleRun => Action::ToggleRun,
            Self::Reset => Action::Reset,
            Self::ToggleZen => Action::ToggleZen,
            Self::Escape => Action::Escape,
        }
    }

    pub fn accelerator(self) -> Accelerator {
        Accelerator::new(None, self.code())
    }
}
