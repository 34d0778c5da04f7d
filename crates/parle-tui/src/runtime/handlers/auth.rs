//! Sign-in handlers.

use std::sync::Arc;

use parle_core::gateway::AuthGateway;
use tokio_util::sync::CancellationToken;

use super::with_cancel;
use crate::events::{AuthUiEvent, UiEvent};

/// Which auth gateway call to make.
pub enum AuthRequest {
    Login { email: String, password: String },
    Register { email: String, password: String },
    Federated { token: String },
}

impl AuthRequest {
    fn name(&self) -> &'static str {
        match self {
            AuthRequest::Login { .. } => "login",
            AuthRequest::Register { .. } => "register",
            AuthRequest::Federated { .. } => "federated",
        }
    }
}

/// Performs the request and reports `AuthUiEvent::Completed`.
pub async fn authenticate(
    auth: Arc<dyn AuthGateway>,
    request: AuthRequest,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    tracing::debug!(request = request.name(), "auth request started");
    let call = async {
        match &request {
            AuthRequest::Login { email, password } => auth.login(email, password).await,
            AuthRequest::Register { email, password } => auth.register(email, password).await,
            AuthRequest::Federated { token } => auth.sign_in_federated(token).await,
        }
    };
    let result = match with_cancel(cancel.as_ref(), call).await {
        Some(result) => result.map_err(|e| e.to_string()),
        None => Err("Sign-in cancelled".to_string()),
    };
    UiEvent::Auth(AuthUiEvent::Completed(result))
}
