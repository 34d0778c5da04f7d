//! Auth feature view.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{LoginField, LoginForm, RegisterField, RegisterForm};
use crate::overlays::render_utils::{
    InputHint, InputLine, OverlayConfig, render_input_line, render_overlay, row, status_line,
};

const ACCENT: Color = Color::Cyan;

fn render_line(frame: &mut Frame, area: Rect, offset: u16, line: Line<'_>) {
    if let Some(rect) = row(area, offset) {
        frame.render_widget(Paragraph::new(line), rect);
    }
}

fn loading_line(spinner: &str, label: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("{spinner} {label}"),
        Style::default().fg(Color::Yellow),
    ))
}

fn shortcut_line(key: &'static str, label: String, enabled: bool) -> Line<'static> {
    let label_style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::styled(format!("{key:<8}"), Style::default().fg(ACCENT)),
        Span::styled(label, label_style),
    ])
}

pub fn render_login(
    frame: &mut Frame,
    area: Rect,
    form: &LoginForm,
    google_enabled: bool,
    spinner: &str,
) {
    let hints = [
        InputHint::new("Enter", "login"),
        InputHint::new("Tab", "next field"),
        InputHint::new("Ctrl+C", "quit"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Parle · Login",
            border_color: ACCENT,
            width: 60,
            height: 14,
            hints: &hints,
        },
    );
    let body = layout.body;

    if let Some(rect) = row(body, 0) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Welcome to ParleVangers",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center),
            rect,
        );
    }

    for (offset, label, input, field, masked) in [
        (2, "Email", &form.email, LoginField::Email, false),
        (3, "Password", &form.password, LoginField::Password, true),
    ] {
        if let Some(rect) = row(body, offset) {
            render_input_line(
                frame,
                rect,
                &InputLine {
                    label,
                    input,
                    focused: form.focus == field && !form.loading,
                    masked,
                    accent: ACCENT,
                },
            );
        }
    }

    let status = if form.loading {
        loading_line(spinner, "Logging in... (Esc to cancel)")
    } else {
        status_line(form.error.as_deref(), "")
    };
    render_line(frame, body, 5, status);

    let google_label = if google_enabled {
        "Sign in with Google".to_string()
    } else {
        "Sign in with Google (not configured)".to_string()
    };
    render_line(frame, body, 7, shortcut_line("Ctrl+G", google_label, google_enabled));
    render_line(
        frame,
        body,
        8,
        shortcut_line("Ctrl+R", "Create an account".to_string(), true),
    );
}

pub fn render_register(frame: &mut Frame, area: Rect, form: &RegisterForm, spinner: &str) {
    let hints = [
        InputHint::new("Enter", "register"),
        InputHint::new("Tab", "next field"),
        InputHint::new("Esc", "back"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Parle · Create Account",
            border_color: ACCENT,
            width: 60,
            height: 13,
            hints: &hints,
        },
    );
    let body = layout.body;

    render_line(
        frame,
        body,
        0,
        Line::from(Span::styled(
            "Create your account",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
    );

    for (offset, label, input, field, masked) in [
        (2, "Email", &form.email, RegisterField::Email, false),
        (3, "Password", &form.password, RegisterField::Password, true),
        (4, "Confirm", &form.confirm, RegisterField::Confirm, true),
    ] {
        if let Some(rect) = row(body, offset) {
            render_input_line(
                frame,
                rect,
                &InputLine {
                    label,
                    input,
                    focused: form.focus == field && !form.loading,
                    masked,
                    accent: ACCENT,
                },
            );
        }
    }

    let status = if form.loading {
        loading_line(spinner, "Creating account... (Esc to cancel)")
    } else {
        status_line(form.error.as_deref(), "")
    };
    render_line(frame, body, 6, status);
    render_line(
        frame,
        body,
        8,
        shortcut_line("Ctrl+L", "Already have an account? Login".to_string(), true),
    );
}
