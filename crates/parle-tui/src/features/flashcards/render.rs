use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::FlashcardView;
use crate::features::vocabulary::VocabularyState;
use crate::overlays::render_utils::{InputHint, OverlayConfig, render_overlay, row};

const ACCENT: Color = Color::Magenta;

pub fn render_flashcards(
    frame: &mut Frame,
    area: Rect,
    view: FlashcardView,
    vocabulary: &VocabularyState,
) {
    let hints = [
        InputHint::new("Space", "flip"),
        InputHint::new("←→", "prev/next"),
        InputHint::new("Esc", "back"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Parle · Flashcards",
            border_color: ACCENT,
            width: 60,
            height: 14,
            hints: &hints,
        },
    );
    let body = layout.body;

    let Some(card) = vocabulary.get(view.index) else {
        return;
    };

    if let Some(rect) = row(body, 0) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("Card {} of {}", view.index + 1, vocabulary.len()),
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center),
            rect,
        );
    }

    let (side, word, color) = if view.revealed {
        ("English", card.english_translation.as_str(), Color::Cyan)
    } else {
        ("French", card.french_word.as_str(), Color::White)
    };

    let card_area = Rect::new(
        body.x + 4,
        body.y + 2,
        body.width.saturating_sub(8),
        body.height.saturating_sub(5).min(5),
    );
    let card_widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            word.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(format!(" {side} ")),
    );
    frame.render_widget(card_widget, card_area);

    let toggle = if view.revealed {
        "Show French"
    } else {
        "Show Translation"
    };
    if let Some(rect) = row(body, card_area.height + 3) {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Space ", Style::default().fg(ACCENT)),
                Span::styled(toggle, Style::default().fg(Color::White)),
            ]))
            .alignment(Alignment::Center),
            rect,
        );
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let hints = [InputHint::new("Esc", "back to home")];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title,
            border_color: ACCENT,
            width: 56,
            height: 9,
            hints: &hints,
        },
    );
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout.body,
    );
}

pub fn render_empty_vocabulary(frame: &mut Frame, area: Rect) {
    render_placeholder(
        frame,
        area,
        "Parle · Flashcards",
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No words yet",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Add your first word to get started.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    );
}

pub fn render_sentence_builder(frame: &mut Frame, area: Rect) {
    render_placeholder(
        frame,
        area,
        "Parle · Sentence Builder",
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Sentence Builder (Coming Soon)",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Build French sentences from your saved words.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    );
}
