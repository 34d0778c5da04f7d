//! Error taxonomy shared by the gateways and the UI.

use thiserror::Error;

/// Input rejected locally, before any gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter email and password")]
    MissingCredentials,
    #[error("Passwords don't match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Please enter the French word")]
    MissingFrenchWord,
}

/// Coarse classification of identity-provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    InvalidCredentials,
    EmailExists,
    WeakPassword,
    UserDisabled,
    TooManyAttempts,
    /// The user abandoned the provider flow.
    Cancelled,
    Network,
    Rejected,
}

/// An identity-provider failure with a message fit for the login form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    pub message: String,
}

impl AuthFailure {
    pub fn new(kind: AuthFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            AuthFailureKind::InvalidCredentials,
            "Invalid email or password",
        )
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::new(AuthFailureKind::Network, format!("Network error: {err}"))
    }

    /// Maps an Identity Toolkit error code (e.g. `EMAIL_EXISTS`) to a failure.
    ///
    /// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should be ...`).
    pub fn from_provider_code(raw: &str) -> Self {
        let code = raw
            .split([' ', ':'])
            .next()
            .unwrap_or(raw)
            .trim();
        match code {
            "EMAIL_EXISTS" => Self::new(
                AuthFailureKind::EmailExists,
                "An account already exists for this email",
            ),
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::invalid_credentials()
            }
            "USER_DISABLED" => Self::new(
                AuthFailureKind::UserDisabled,
                "This account has been disabled",
            ),
            "WEAK_PASSWORD" => Self::new(
                AuthFailureKind::WeakPassword,
                "Password must be at least 6 characters",
            ),
            "INVALID_EMAIL" => Self::new(
                AuthFailureKind::Rejected,
                "Please enter a valid email address",
            ),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::new(
                AuthFailureKind::TooManyAttempts,
                "Too many attempts, try again later",
            ),
            "INVALID_IDP_RESPONSE" => Self::new(
                AuthFailureKind::Rejected,
                "Google sign-in was rejected",
            ),
            _ => Self::new(AuthFailureKind::Rejected, raw.trim()),
        }
    }
}

/// Failure reported by an auth or vocabulary gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    #[error("{0}")]
    Store(String),
    #[error("Not signed in")]
    NotSignedIn,
}

impl GatewayError {
    pub fn store(message: impl Into<String>) -> Self {
        GatewayError::Store(message.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth(_))
    }
}
