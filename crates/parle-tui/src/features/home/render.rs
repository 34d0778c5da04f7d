use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{HomeState, MenuItem};
use crate::features::vocabulary::{VocabularyState, VocabularyStatus};
use crate::overlays::render_utils::{InputHint, OverlayConfig, render_overlay, row};

const ACCENT: Color = Color::Green;

pub fn render_home(
    frame: &mut Frame,
    area: Rect,
    home: HomeState,
    email: &str,
    vocabulary: &VocabularyState,
    notice: Option<&str>,
) {
    let hints = [
        InputHint::new("↑↓", "select"),
        InputHint::new("Enter", "open"),
        InputHint::new("Ctrl+C", "quit"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Parle · Home",
            border_color: ACCENT,
            width: 60,
            height: 16,
            hints: &hints,
        },
    );
    let body = layout.body;

    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to ParleVangers",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Signed in as: {email}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vocabulary.summary()),
    ];
    if let VocabularyStatus::Failed(message) = &vocabulary.status {
        lines.push(Line::from(Span::styled(
            format!("Could not refresh words: {message}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));

    for (index, item) in MenuItem::ALL.iter().enumerate() {
        let selected = index == home.selected;
        let marker = if selected { "› " } else { "  " };
        let style = if selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            Span::styled(item.label(), style),
            Span::styled(
                format!("  ({})", item.shortcut()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    let menu_height = lines.len() as u16;
    frame.render_widget(Paragraph::new(lines), body);

    if let Some(notice) = notice
        && let Some(rect) = row(body, menu_height + 1)
    {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Yellow),
            ))),
            rect,
        );
    }
}
