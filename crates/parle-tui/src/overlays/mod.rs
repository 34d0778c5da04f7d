//! Modal forms drawn over the current screen.
//!
//! While an overlay is open it receives every key except the global quit
//! keys. Only Home opens one today: the add-word form.

pub mod add_word;
pub mod render_utils;

pub use add_word::AddWordState;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::state::TuiState;

/// Whether the overlay survives the key it just handled.
#[derive(Debug, PartialEq, Eq)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Result of an overlay key handler.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    pub fn stay() -> Self {
        Self {
            transition: OverlayTransition::Stay,
            effects: Vec::new(),
        }
    }

    pub fn close() -> Self {
        Self {
            transition: OverlayTransition::Close,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: UiEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    AddWord(AddWordState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        match self {
            Overlay::AddWord(form) => form.render(frame, area, spinner),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::AddWord(form) => form.handle_key(tui, key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Overlay::AddWord(form) => form.handle_paste(text),
        }
    }

    pub fn as_add_word_mut(&mut self) -> Option<&mut AddWordState> {
        match self {
            Overlay::AddWord(form) => Some(form),
        }
    }
}

/// Lets the renderer draw `app.overlay` without unwrapping it.
pub trait OverlayExt {
    fn render(&self, frame: &mut Frame, area: Rect, spinner: &str);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        if let Some(overlay) = self.as_ref() {
            overlay.render(frame, area, spinner);
        }
    }
}
