//! Add-word overlay: a French/English pair saved to the vocabulary store.

use crossterm::event::{KeyCode, KeyEvent};
use parle_core::validation::validate_new_word;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, InputLine, OverlayConfig, render_input_line, render_overlay, render_separator, row,
    status_line,
};
use crate::common::TextInput;
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddWordField {
    #[default]
    French,
    English,
}

#[derive(Debug, Clone, Default)]
pub struct AddWordState {
    pub french: TextInput,
    pub english: TextInput,
    pub focus: AddWordField,
    /// A save is in flight.
    pub saving: bool,
    pub error: Option<String>,
}

impl AddWordState {
    pub fn open() -> Self {
        Self::default()
    }

    fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            AddWordField::French => &mut self.french,
            AddWordField::English => &mut self.english,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AddWordField::French => AddWordField::English,
            AddWordField::English => AddWordField::French,
        };
    }

    /// The save failed; keep the form open with the reason.
    pub fn fail(&mut self, message: String) {
        self.saving = false;
        self.error = Some(message);
    }

    pub fn handle_paste(&mut self, text: &str) {
        if !self.saving {
            self.focused_mut().insert_str(text);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        render_add_word_overlay(frame, self, area, spinner);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        if key.code == KeyCode::Esc {
            return OverlayUpdate::close();
        }
        if self.saving {
            return OverlayUpdate::stay();
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.toggle_focus();
                OverlayUpdate::stay()
            }
            KeyCode::Enter => self.submit(tui),
            _ => {
                if self.focused_mut().handle_key(key) {
                    self.error = None;
                }
                OverlayUpdate::stay()
            }
        }
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        let (french, english) = match validate_new_word(self.french.value(), self.english.value()) {
            Ok(pair) => pair,
            Err(err) => {
                self.error = Some(err.to_string());
                return OverlayUpdate::stay();
            }
        };
        let Some(owner_id) = tui.user_id() else {
            self.error = Some("Not signed in".to_string());
            return OverlayUpdate::stay();
        };

        self.saving = true;
        self.error = None;
        OverlayUpdate::stay().with_effect(UiEffect::AddWord {
            task: None,
            owner_id: owner_id.to_string(),
            french,
            english,
        })
    }
}

fn render_add_word_overlay(frame: &mut Frame, state: &AddWordState, area: Rect, spinner: &str) {
    let hints = [
        InputHint::new("Enter", "save"),
        InputHint::new("Tab", "next field"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Add New Word",
            border_color: Color::Yellow,
            width: 56,
            height: 9,
            hints: &hints,
        },
    );
    let body = layout.body;

    for (offset, label, input, field) in [
        (0, "French", &state.french, AddWordField::French),
        (1, "English", &state.english, AddWordField::English),
    ] {
        if let Some(rect) = row(body, offset) {
            render_input_line(
                frame,
                rect,
                &InputLine {
                    label,
                    input,
                    focused: state.focus == field && !state.saving,
                    masked: false,
                    accent: Color::Yellow,
                },
            );
        }
    }

    render_separator(frame, body, 2);

    let status = if state.saving {
        Line::from(Span::styled(
            format!("{spinner} Saving..."),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        status_line(state.error.as_deref(), "The translation is optional")
    };
    if let Some(rect) = row(body, 3) {
        frame.render_widget(Paragraph::new(status), rect);
    }
}
