//! Pure view functions for the TUI.
//!
//! `render` reads `&AppState` and draws the active screen, then any overlay
//! on top. Nothing here mutates state or returns effects.

use ratatui::Frame;

use crate::features::auth::{render_login, render_register};
use crate::features::flashcards::{
    render_empty_vocabulary, render_flashcards, render_sentence_builder,
};
use crate::features::home::render_home;
use crate::overlays::OverlayExt;
use crate::state::{AppState, Screen, TuiState};

/// Spinner frames for in-flight requests.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

fn spinner(state: &TuiState) -> &'static str {
    SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()]
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;
    let spinner = spinner(state);

    match &state.screen {
        Screen::Login(form) => render_login(frame, area, form, state.google_enabled, spinner),
        Screen::Register(form) => render_register(frame, area, form, spinner),
        Screen::Home(home) => {
            let email = state.session.as_ref().map_or("", |s| s.email.as_str());
            render_home(
                frame,
                area,
                *home,
                email,
                &state.vocabulary,
                state.notice.as_deref(),
            );
        }
        Screen::Flashcards(view) => render_flashcards(frame, area, *view, &state.vocabulary),
        Screen::SentenceBuilder => render_sentence_builder(frame, area),
        Screen::EmptyVocabulary => render_empty_vocabulary(frame, area),
    }

    app.overlay.render(frame, area, spinner);
}
