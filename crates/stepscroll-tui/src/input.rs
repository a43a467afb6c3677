use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use stepscroll_core::navigation::{NavKey, NavigatorCommand, RawInput};

use crate::app::App;
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    NextSection,
    PrevSection,
    FirstSection,
    LastSection,
    ToggleDebug,
    /// First 'g' press, waiting for the second
    PendingG,
    /// Browser-style navigation key
    Key(NavKey),
    /// Positive delta scrolls toward later sections
    Wheel { delta_y: f64 },
    None,
}

impl Action {
    /// Command for the navigator, if this action navigates
    ///
    /// Keyboard actions go through the signal path as key input so they
    /// share the same guards as wheel input.
    pub fn command(&self) -> Option<NavigatorCommand> {
        let raw = match *self {
            Action::NextSection => RawInput::Key(NavKey::ArrowDown),
            Action::PrevSection => RawInput::Key(NavKey::ArrowUp),
            Action::FirstSection => RawInput::Key(NavKey::Home),
            Action::LastSection => RawInput::Key(NavKey::End),
            Action::Key(key) => RawInput::Key(key),
            Action::Wheel { delta_y } => RawInput::Wheel { delta_y },
            _ => return None,
        };
        Some(NavigatorCommand::Input(raw))
    }
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    let binding = KeyBinding::new(key.code, normalize_modifiers(key.code, key.modifiers));

    if keymap.is_g_prefix(&binding) {
        return if app.pending_key == Some('g') {
            keymap.get_pending_g_action().copied().unwrap_or(Action::None)
        } else {
            Action::PendingG
        };
    }

    keymap.get(&binding).copied().unwrap_or(Action::None)
}

/// Terminals differ on whether uppercase letters carry SHIFT; treat them as if they do
fn normalize_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => modifiers | KeyModifiers::SHIFT,
        _ => modifiers,
    }
}

/// Map mouse wheel notches to wheel input; `wheel_step` is rows per notch
pub fn handle_mouse_event(mouse: MouseEvent, wheel_step: f64) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel { delta_y: wheel_step },
        MouseEventKind::ScrollUp => Action::Wheel {
            delta_y: -wheel_step,
        },
        _ => Action::None,
    }
}
