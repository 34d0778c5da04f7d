//! Login and registration form state.

use crate::common::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: TextInput,
    pub password: TextInput,
    pub focus: LoginField,
    /// A sign-in request is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with the email prefilled and the password focused.
    pub fn with_email(email: Option<&str>) -> Self {
        match email.filter(|e| !e.trim().is_empty()) {
            Some(email) => Self {
                email: TextInput::with_value(email),
                focus: LoginField::Password,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterField {
    #[default]
    Email,
    Password,
    Confirm,
}

impl RegisterField {
    pub fn next(self) -> Self {
        match self {
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::Confirm,
            RegisterField::Confirm => RegisterField::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            RegisterField::Email => RegisterField::Confirm,
            RegisterField::Password => RegisterField::Email,
            RegisterField::Confirm => RegisterField::Password,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: TextInput,
    pub password: TextInput,
    pub confirm: TextInput,
    pub focus: RegisterField,
    pub loading: bool,
    pub error: Option<String>,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carries over whatever email was typed on the login form.
    pub fn with_email(email: &str) -> Self {
        Self {
            email: TextInput::with_value(email),
            ..Self::default()
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
            RegisterField::Confirm => &mut self.confirm,
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
