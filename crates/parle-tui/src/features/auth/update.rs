//! Auth feature reducer.
//!
//! Key handling for the login and registration forms plus the local
//! validation that runs before any gateway call.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parle_core::validation::{validate_login, validate_registration};

use super::state::{LoginForm, RegisterForm};
use crate::actions::Action;
use crate::effects::UiEffect;

/// Message shown when Google sign-in is requested without a client id.
pub const GOOGLE_NOT_CONFIGURED: &str =
    "Google sign-in is not configured (set google.client_id in config)";

/// Handles a key on the login screen; form edits are applied in place.
pub fn handle_login_key(form: &mut LoginForm, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Some(Action::Cancel),
        KeyCode::Char('g') if ctrl => return Some(Action::StartGoogle),
        KeyCode::Char('r') if ctrl => return Some(Action::GoRegister),
        _ => {}
    }
    if form.loading {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(Action::SubmitLogin),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = form.focus.next();
            None
        }
        _ => {
            if form.focused_mut().handle_key(key) {
                form.error = None;
            }
            None
        }
    }
}

pub fn handle_register_key(form: &mut RegisterForm, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc if form.loading => return Some(Action::Cancel),
        KeyCode::Esc => return Some(Action::GoLogin),
        KeyCode::Char('l') if ctrl => return Some(Action::GoLogin),
        _ => {}
    }
    if form.loading {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(Action::SubmitRegister),
        KeyCode::Tab | KeyCode::Down => {
            form.focus = form.focus.next();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus = form.focus.prev();
            None
        }
        _ => {
            if form.focused_mut().handle_key(key) {
                form.error = None;
            }
            None
        }
    }
}

/// Validates the login form and returns the sign-in effect.
pub fn submit_login(form: &mut LoginForm) -> Option<UiEffect> {
    if form.loading {
        return None;
    }
    let email = form.email.value().trim().to_string();
    if let Err(err) = validate_login(&email, form.password.value()) {
        form.fail(err.to_string());
        return None;
    }
    form.loading = true;
    form.error = None;
    Some(UiEffect::SignIn {
        task: None,
        email,
        password: form.password.value().to_string(),
    })
}

/// Validates the registration form and returns the register effect.
pub fn submit_register(form: &mut RegisterForm) -> Option<UiEffect> {
    if form.loading {
        return None;
    }
    let email = form.email.value().trim().to_string();
    if let Err(err) = validate_registration(&email, form.password.value(), form.confirm.value()) {
        form.fail(err.to_string());
        return None;
    }
    form.loading = true;
    form.error = None;
    Some(UiEffect::Register {
        task: None,
        email,
        password: form.password.value().to_string(),
    })
}

pub fn start_google(form: &mut LoginForm, google_enabled: bool) -> Option<UiEffect> {
    if form.loading {
        return None;
    }
    if !google_enabled {
        form.fail(GOOGLE_NOT_CONFIGURED);
        return None;
    }
    form.loading = true;
    form.error = None;
    Some(UiEffect::StartFederatedSignIn { task: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TextInput;
    use crate::features::auth::state::{LoginField, RegisterField};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_into(form: &mut LoginForm, text: &str) {
        for ch in text.chars() {
            handle_login_key(form, key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_login_typing_targets_focused_field() {
        let mut form = LoginForm::new();
        type_into(&mut form, "marie@example.com");
        handle_login_key(&mut form, key(KeyCode::Tab));
        assert_eq!(form.focus, LoginField::Password);
        type_into(&mut form, "secret1");
        assert_eq!(form.email.value(), "marie@example.com");
        assert_eq!(form.password.value(), "secret1");
    }

    #[test]
    fn test_blank_login_is_rejected_locally() {
        let mut form = LoginForm::new();
        type_into(&mut form, "marie@example.com");
        assert!(submit_login(&mut form).is_none());
        assert_eq!(form.error.as_deref(), Some("Please enter email and password"));
        assert!(!form.loading);
    }

    #[test]
    fn test_submit_login_trims_email() {
        let mut form = LoginForm::new();
        type_into(&mut form, "  marie@example.com ");
        handle_login_key(&mut form, key(KeyCode::Tab));
        type_into(&mut form, "secret1");
        let effect = submit_login(&mut form);
        assert!(matches!(
            &effect,
            Some(UiEffect::SignIn { email, password, task: None })
                if email == "marie@example.com" && password == "secret1"
        ));
        assert!(form.loading);
        assert!(submit_login(&mut form).is_none());
    }

    #[test]
    fn test_typing_clears_error() {
        let mut form = LoginForm::new();
        form.error = Some("Invalid email or password".to_string());
        type_into(&mut form, "m");
        assert!(form.error.is_none());
    }

    #[test]
    fn test_loading_form_ignores_edits() {
        let mut form = LoginForm::new();
        form.loading = true;
        type_into(&mut form, "x");
        assert!(form.email.is_empty());
        assert_eq!(handle_login_key(&mut form, key(KeyCode::Esc)), Some(Action::Cancel));
    }

    #[test]
    fn test_google_requires_configuration() {
        let mut form = LoginForm::new();
        assert!(start_google(&mut form, false).is_none());
        assert_eq!(form.error.as_deref(), Some(GOOGLE_NOT_CONFIGURED));
        assert!(matches!(
            start_google(&mut form, true),
            Some(UiEffect::StartFederatedSignIn { task: None })
        ));
        assert!(form.loading);
    }

    #[test]
    fn test_register_field_cycle() {
        let mut form = RegisterForm::new();
        handle_register_key(&mut form, key(KeyCode::Down));
        handle_register_key(&mut form, key(KeyCode::Down));
        assert_eq!(form.focus, RegisterField::Confirm);
        handle_register_key(&mut form, key(KeyCode::Up));
        assert_eq!(form.focus, RegisterField::Password);
        assert_eq!(handle_register_key(&mut form, key(KeyCode::Esc)), Some(Action::GoLogin));
    }

    #[test]
    fn test_register_validation_order() {
        let mut form = RegisterForm::with_email("marie@example.com");
        form.password = TextInput::with_value("abcdef");
        form.confirm = TextInput::with_value("xyzxyz");
        assert!(submit_register(&mut form).is_none());
        assert_eq!(form.error.as_deref(), Some("Passwords don't match"));

        form.password = TextInput::with_value("abc");
        form.confirm = TextInput::with_value("abc");
        assert!(submit_register(&mut form).is_none());
        assert_eq!(
            form.error.as_deref(),
            Some("Password must be at least 6 characters")
        );
    }
}
