//! Keyboard bindings.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Start reacting to the live input device
    StartLive,
    /// Play preset track `n` (0-based) from the config list
    PlayPreset(usize),
    Reset,
}

/// Digit keys 1-9 as 0-based preset slots
fn preset_slot(key: Key) -> Option<usize> {
    let slot = match key {
        Key::Key1 | Key::Numpad1 => 0,
        Key::Key2 | Key::Numpad2 => 1,
        Key::Key3 | Key::Numpad3 => 2,
        Key::Key4 | Key::Numpad4 => 3,
        Key::Key5 | Key::Numpad5 => 4,
        Key::Key6 | Key::Numpad6 => 5,
        Key::Key7 | Key::Numpad7 => 6,
        Key::Key8 | Key::Numpad8 => 7,
        Key::Key9 | Key::Numpad9 => 8,
        _ => return None,
    };
    Some(slot)
}

pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::Space => Some(Action::StartLive),
        Key::R => Some(Action::Reset),
        _ => preset_slot(key).map(Action::PlayPreset),
    }
}
