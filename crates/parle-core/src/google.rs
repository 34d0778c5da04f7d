//! Google OAuth (authorization code + PKCE) with a loopback redirect.
//!
//! Produces the Google ID token that `AuthGateway::sign_in_federated` expects.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::config::GoogleConfig;
use crate::error::{AuthFailure, AuthFailureKind};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALLBACK_PATH: &str = "/oauth2callback";
const SCOPES: &str = "openid email profile";

/// How long the loopback listener waits for the browser.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// PKCE code verifier and challenge
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

/// Generate PKCE code verifier and challenge
pub fn generate_pkce() -> Pkce {
    let uuid1 = uuid::Uuid::new_v4();
    let uuid2 = uuid::Uuid::new_v4();
    let mut verifier_bytes = [0u8; 32];
    verifier_bytes[..16].copy_from_slice(uuid1.as_bytes());
    verifier_bytes[16..].copy_from_slice(uuid2.as_bytes());
    let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    Pkce {
        verifier,
        challenge,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// A configured Google OAuth client.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    client_id: String,
    client_secret: Option<String>,
    callback_port: u16,
    token_url: String,
}

impl GoogleOAuth {
    /// Returns `None` when no client id is configured.
    pub fn from_config(config: &GoogleConfig) -> Option<Self> {
        Some(Self {
            client_id: config.effective_client_id()?.to_string(),
            client_secret: config.effective_client_secret().map(str::to_string),
            callback_port: config.callback_port,
            token_url: TOKEN_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{CALLBACK_PATH}", self.callback_port)
    }

    /// Build the authorization URL for Google OAuth
    pub fn build_auth_url(&self, pkce: &Pkce, state: &str) -> String {
        let redirect_uri = self.redirect_uri();
        let params = [
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("scope", SCOPES),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("state", state),
            ("prompt", "select_account"),
        ];

        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();

        format!("{AUTHORIZE_URL}?{query}")
    }

    /// Binds the loopback listener; do this before opening the browser.
    pub async fn bind_callback(&self) -> Result<TcpListener, AuthFailure> {
        TcpListener::bind(("127.0.0.1", self.callback_port))
            .await
            .map_err(|e| {
                AuthFailure::new(
                    AuthFailureKind::Network,
                    format!(
                        "Could not listen on port {} for the Google redirect: {e}",
                        self.callback_port
                    ),
                )
            })
    }

    /// Exchanges an authorization code for a Google ID token.
    pub async fn exchange_code(
        &self,
        http: &reqwest::Client,
        code: &str,
        pkce: &Pkce,
    ) -> Result<String, AuthFailure> {
        let redirect_uri = self.redirect_uri();
        let body = {
            let mut body = url::form_urlencoded::Serializer::new(String::new());
            body.append_pair("grant_type", "authorization_code")
                .append_pair("client_id", &self.client_id)
                .append_pair("code", code)
                .append_pair("code_verifier", &pkce.verifier)
                .append_pair("redirect_uri", &redirect_uri);
            if let Some(secret) = &self.client_secret {
                body.append_pair("client_secret", secret);
            }
            body.finish()
        };

        let response = http
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(AuthFailure::network)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TokenError>(&text)
                .ok()
                .map(|e| e.error_description.unwrap_or(e.error))
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AuthFailure::new(
                AuthFailureKind::Rejected,
                format!("Google token exchange failed: {detail}"),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(AuthFailure::network)?;
        token.id_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AuthFailure::new(
                AuthFailureKind::Rejected,
                "Google did not return an ID token",
            )
        })
    }
}

/// Outcome of one request on the loopback listener.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code(String),
    Denied(String),
    StateMismatch,
    /// Not the callback path (favicon and friends).
    Unrelated,
}

fn parse_callback(request: &str, expected_state: &str) -> Callback {
    let Some(target) = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    else {
        return Callback::Unrelated;
    };
    let Ok(url) = url::Url::parse(&format!("http://localhost{target}")) else {
        return Callback::Unrelated;
    };
    if url.path() != CALLBACK_PATH {
        return Callback::Unrelated;
    }

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };
    if let Some(error) = param("error") {
        return Callback::Denied(error);
    }
    if param("state").as_deref() != Some(expected_state) {
        return Callback::StateMismatch;
    }
    param("code").map_or(Callback::Unrelated, Callback::Code)
}

fn html_response(status: &str, heading: &str, message: &str) -> String {
    let body = format!("<html><body><h3>{heading}</h3><p>{message}</p></body></html>");
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Waits for the browser redirect and returns the authorization code.
pub async fn accept_code(
    listener: &TcpListener,
    expected_state: &str,
    timeout: Duration,
) -> Result<String, AuthFailure> {
    tokio::time::timeout(timeout, serve_callback(listener, expected_state))
        .await
        .unwrap_or_else(|_| {
            Err(AuthFailure::new(
                AuthFailureKind::Cancelled,
                "Timed out waiting for Google sign-in",
            ))
        })
}

async fn serve_callback(listener: &TcpListener, expected_state: &str) -> Result<String, AuthFailure> {
    loop {
        let (mut stream, _) = listener.accept().await.map_err(AuthFailure::network)?;
        let mut buffer = [0u8; 4096];
        let read = stream.read(&mut buffer).await.map_err(AuthFailure::network)?;
        let request = String::from_utf8_lossy(&buffer[..read]);

        let (response, outcome) = match parse_callback(&request, expected_state) {
            Callback::Code(code) => (
                html_response("200 OK", "Sign-in complete", "You can close this window."),
                Some(Ok(code)),
            ),
            Callback::Denied(reason) => (
                html_response("400 Bad Request", "Sign-in cancelled", "Return to the terminal."),
                Some(Err(AuthFailure::new(
                    AuthFailureKind::Cancelled,
                    format!("Google sign-in cancelled ({reason})"),
                ))),
            ),
            Callback::StateMismatch => (
                html_response("400 Bad Request", "Sign-in failed", "Return to the terminal."),
                Some(Err(AuthFailure::new(
                    AuthFailureKind::Rejected,
                    "Google sign-in state mismatch",
                ))),
            ),
            Callback::Unrelated => (html_response("404 Not Found", "Not found", ""), None),
        };

        if let Err(err) = stream.write_all(response.as_bytes()).await {
            tracing::debug!("failed to answer OAuth callback: {err}");
        }
        if let Some(outcome) = outcome {
            return outcome;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpStream;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(port: u16) -> GoogleOAuth {
        GoogleOAuth::from_config(&GoogleConfig {
            client_id: Some("client-123".to_string()),
            client_secret: None,
            callback_port: port,
        })
        .unwrap()
    }

    #[test]
    fn test_pkce_generation() {
        let pkce = generate_pkce();
        assert!(pkce.verifier.len() >= 40);
        assert!(!pkce.challenge.is_empty());
        assert_ne!(pkce.verifier, pkce.challenge);
    }

    #[test]
    fn test_disabled_without_client_id() {
        assert!(GoogleOAuth::from_config(&GoogleConfig::default()).is_none());
    }

    #[test]
    fn test_auth_url_format() {
        let pkce = generate_pkce();
        let url = client(8085).build_auth_url(&pkce, "state-1");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("state=state-1"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8085%2Foauth2callback"));
    }

    #[test]
    fn test_parse_callback_variants() {
        assert_eq!(
            parse_callback("GET /oauth2callback?code=abc&state=s1 HTTP/1.1\r\n", "s1"),
            Callback::Code("abc".to_string())
        );
        assert_eq!(
            parse_callback("GET /oauth2callback?code=abc&state=other HTTP/1.1\r\n", "s1"),
            Callback::StateMismatch
        );
        assert_eq!(
            parse_callback("GET /oauth2callback?error=access_denied HTTP/1.1\r\n", "s1"),
            Callback::Denied("access_denied".to_string())
        );
        assert_eq!(
            parse_callback("GET /favicon.ico HTTP/1.1\r\n", "s1"),
            Callback::Unrelated
        );
    }

    #[tokio::test]
    async fn test_accept_code_skips_unrelated_requests() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            for target in ["/favicon.ico", "/oauth2callback?code=xyz&state=s1"] {
                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
                    .await
                    .unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
            }
        });

        let code = accept_code(&listener, "s1", Duration::from_secs(5)).await.unwrap();
        assert_eq!(code, "xyz");
        browser.await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_code_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let err = accept_code(&listener, "s1", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthFailureKind::Cancelled);
    }

    #[tokio::test]
    async fn test_exchange_code_returns_id_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29",
                "id_token": "google-id-token",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oauth = client(8085).with_token_url(format!("{}/token", server.uri()));
        let token = oauth
            .exchange_code(&reqwest::Client::new(), "auth-code", &generate_pkce())
            .await
            .unwrap();
        assert_eq!(token, "google-id-token");
    }

    #[tokio::test]
    async fn test_exchange_code_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let oauth = client(8085).with_token_url(format!("{}/token", server.uri()));
        let err = oauth
            .exchange_code(&reqwest::Client::new(), "stale", &generate_pkce())
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthFailureKind::Rejected);
        assert!(err.message.contains("Bad Request"));
    }
}
