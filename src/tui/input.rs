//! Input dispatch layer.
//!
//! Maps key events to messages based on the current app mode. Global keys
//! (quit, help, the `gg` chord) are resolved here; everything else is handed
//! to the active view as `Message::Key`.

use super::app::{App, ViewKind};
use super::Message;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

/// Chord timeout in milliseconds.
const CHORD_TIMEOUT_MS: u128 = 500;

/// State machine for key chords (`gg`).
///
/// Instead of blocking with `event::poll()` inline, we track pending keys
/// and check for timeout in the main event loop.
#[derive(Debug, Default)]
pub struct InputState {
    /// The first key of a potential chord sequence
    pub pending: Option<KeyCode>,
    /// When the pending key was pressed (for timeout detection)
    pub pending_since: Option<Instant>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_timed_out(&self) -> bool {
        self.pending_since
            .is_some_and(|since| since.elapsed().as_millis() > CHORD_TIMEOUT_MS)
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.pending_since = None;
    }

    pub fn set_pending(&mut self, key: KeyCode) {
        self.pending = Some(key);
        self.pending_since = Some(Instant::now());
    }

    /// Resolve a chord that was never completed. A lone `g` jumps to the top.
    pub fn expire(&mut self) -> Option<Message> {
        if !self.has_timed_out() {
            return None;
        }
        let pending = self.pending.take();
        self.pending_since = None;
        match pending {
            Some(KeyCode::Char('g')) => Some(Message::Key(KeyEvent::new(
                KeyCode::Home,
                KeyModifiers::NONE,
            ))),
            _ => None,
        }
    }
}

/// Map a key event to a message for the current app mode.
pub fn dispatch(app: &App, input: &mut InputState, key: KeyEvent) -> Message {
    if key.kind == KeyEventKind::Release {
        return Message::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        input.clear();
        return Message::Quit;
    }

    // A pending `g` either completes `gg` or is dropped, and the new key is
    // handled normally.
    if let Some(pending) = input.pending.take() {
        input.pending_since = None;
        if pending == KeyCode::Char('g') && key.code == KeyCode::Char('g') {
            return Message::Key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        }
    }

    if app.show_help {
        return match key.code {
            KeyCode::Char('?') | KeyCode::Esc => Message::ToggleHelp,
            _ => Message::Key(key),
        };
    }

    if app.captures_text() {
        return Message::Key(key);
    }

    let kind = app.view_kind();
    match key.code {
        KeyCode::Char('q') if matches!(kind, ViewKind::List | ViewKind::Setup) => Message::Quit,
        KeyCode::Char('?') => Message::ToggleHelp,
        KeyCode::Char('g')
            if matches!(kind, ViewKind::List | ViewKind::Detail | ViewKind::Kanban)
                && !app.kanban_move_mode() =>
        {
            input.set_pending(KeyCode::Char('g'));
            Message::None
        }
        _ => Message::Key(key),
    }
}
