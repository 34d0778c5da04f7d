//! Semantic user actions.
//!
//! Key bindings resolve to an `Action` per screen; the reducer only ever
//! reasons about actions, which keeps navigation testable without key codes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitLogin,
    SubmitRegister,
    StartGoogle,
    GoRegister,
    GoLogin,
    OpenFlashcards,
    OpenSentenceBuilder,
    OpenAddWord,
    Logout,
    MenuUp,
    MenuDown,
    MenuSelect,
    Flip,
    Next,
    Prev,
    Back,
    /// Abandons an in-flight sign-in request.
    Cancel,
    Quit,
}

/// Bindings that work on every screen.
pub fn global_action(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => Some(Action::Quit),
        _ => None,
    }
}

pub fn home_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MenuUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MenuDown),
        KeyCode::Enter => Some(Action::MenuSelect),
        KeyCode::Char('f') => Some(Action::OpenFlashcards),
        KeyCode::Char('s') => Some(Action::OpenSentenceBuilder),
        KeyCode::Char('a') => Some(Action::OpenAddWord),
        KeyCode::Char('l') => Some(Action::Logout),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

pub fn flashcards_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Flip),
        KeyCode::Right | KeyCode::Char('n' | 'l') => Some(Action::Next),
        KeyCode::Left | KeyCode::Char('p' | 'h') => Some(Action::Prev),
        KeyCode::Esc | KeyCode::Char('b') => Some(Action::Back),
        _ => None,
    }
}

/// EmptyVocabulary and SentenceBuilder only know how to go back.
pub fn placeholder_action(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Enter => Some(Action::Back),
        _ => None,
    }
}
