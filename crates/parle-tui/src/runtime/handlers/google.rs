//! Google sign-in through the system browser and a loopback redirect.

use parle_core::error::AuthFailure;
use parle_core::google::{CALLBACK_TIMEOUT, GoogleOAuth, accept_code, generate_pkce};
use tokio_util::sync::CancellationToken;

use super::with_cancel;
use crate::events::{AuthUiEvent, UiEvent};

/// Runs the browser flow and reports the Google ID token.
pub async fn federated_token(
    oauth: GoogleOAuth,
    http: reqwest::Client,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let result = match with_cancel(cancel.as_ref(), obtain_id_token(&oauth, &http)).await {
        Some(result) => result.map_err(|e| e.to_string()),
        None => Err("Google sign-in cancelled".to_string()),
    };
    UiEvent::Auth(AuthUiEvent::ProviderToken(result))
}

async fn obtain_id_token(oauth: &GoogleOAuth, http: &reqwest::Client) -> Result<String, AuthFailure> {
    // Listen before opening the browser so the redirect cannot race us.
    let listener = oauth.bind_callback().await?;
    let pkce = generate_pkce();
    let state = uuid::Uuid::new_v4().to_string();
    let url = oauth.build_auth_url(&pkce, &state);

    tracing::info!(redirect_uri = %oauth.redirect_uri(), "opening browser for Google sign-in");
    if let Err(err) = open::that(&url) {
        tracing::warn!(%url, "could not open browser: {err}");
    }

    let code = accept_code(&listener, &state, CALLBACK_TIMEOUT).await?;
    oauth.exchange_code(http, &code, &pkce).await
}
