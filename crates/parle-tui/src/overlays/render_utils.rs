//! Shared rendering helpers for screens and overlays.
//!
//! Every Parle view is a bordered box centered in the terminal with a hint
//! line at the bottom; these helpers draw that frame and the form fields.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::common::{TextInput, truncate_start_with_ellipsis};

/// Mask used for password fields.
pub const PASSWORD_MASK: char = '•';

/// Centers a `width` x `height` box inside `area`, shrinking it to fit.
pub fn calculate_overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clears the background and draws the border and title.
pub fn render_overlay_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

pub struct OverlayConfig<'a> {
    pub title: &'a str,
    pub border_color: Color,
    pub width: u16,
    pub height: u16,
    pub hints: &'a [InputHint<'a>],
}

pub struct OverlayLayout {
    pub popup: Rect,
    pub body: Rect,
    pub footer: Rect,
}

/// Renders a standard container and returns its layout.
pub fn render_overlay(frame: &mut Frame, area: Rect, config: &OverlayConfig<'_>) -> OverlayLayout {
    let popup = calculate_overlay_area(area, config.width, config.height);
    render_overlay_container(frame, popup, config.title, config.border_color);

    // One column of padding inside the border.
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 1,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(2),
    );

    if !config.hints.is_empty() {
        render_hints(frame, inner, config.hints, config.border_color);
    }

    let footer_height = u16::from(!config.hints.is_empty());
    let body_height = inner.height.saturating_sub(footer_height);
    let footer = Rect::new(inner.x, inner.y + body_height, inner.width, footer_height);
    let body = Rect::new(inner.x, inner.y, inner.width, body_height);

    OverlayLayout {
        popup,
        body,
        footer,
    }
}

pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

/// A labelled form field.
pub struct InputLine<'a> {
    pub label: &'a str,
    pub input: &'a TextInput,
    pub focused: bool,
    pub masked: bool,
    pub accent: Color,
}

/// Renders `label: value█` on one line; the cursor only shows when focused.
pub fn render_input_line(frame: &mut Frame, area: Rect, line: &InputLine<'_>) {
    let label = format!("{:<10}", format!("{}:", line.label));
    let label_style = if line.focused {
        Style::default().fg(line.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let value = if line.masked {
        line.input.masked(PASSWORD_MASK)
    } else {
        line.input.value().to_string()
    };
    let max_text_width = (area.width as usize).saturating_sub(label.width() + 1);
    let display = truncate_start_with_ellipsis(&value, max_text_width);

    let mut spans = vec![
        Span::styled(label, label_style),
        Span::styled(display, Style::default().fg(Color::White)),
    ];
    if line.focused {
        spans.push(Span::styled("█", Style::default().fg(line.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders a line of keyboard hints at the bottom of `area`.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    let hints_y = area.y + area.height.saturating_sub(1);
    let hints_area = Rect::new(area.x, hints_y, area.width, 1);

    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(para, hints_area);
}

/// Renders a horizontal rule `y_offset` rows into `area`.
pub fn render_separator(frame: &mut Frame, area: Rect, y_offset: u16) {
    if y_offset >= area.height {
        return;
    }
    let separator = "─".repeat(area.width as usize);
    let separator_area = Rect::new(area.x, area.y + y_offset, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        separator_area,
    );
}

/// Error line in red, or a dim message when there is none.
pub fn status_line(error: Option<&str>, fallback: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            fallback.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

/// A single row of `area` at `offset`, or `None` when it does not fit.
pub fn row(area: Rect, offset: u16) -> Option<Rect> {
    (offset < area.height).then(|| Rect::new(area.x, area.y + offset, area.width, 1))
}
