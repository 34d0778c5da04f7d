//! Identity Toolkit and Secure Token endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{FirebaseSettings, error_message};
use crate::error::AuthFailure;

const GOOGLE_PROVIDER_ID: &str = "google.com";
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Identity returned by any of the sign-in endpoints.
#[derive(Debug, Clone)]
pub(super) struct SignedIn {
    pub user_id: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub is_new_user: bool,
}

#[derive(Debug, Clone)]
pub(super) struct RefreshedToken {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    is_new_user: bool,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

fn parse_expires_in(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
}

impl SignInResponse {
    fn into_signed_in(self, is_new_user: bool) -> SignedIn {
        SignedIn {
            expires_in: parse_expires_in(self.expires_in.as_deref()),
            user_id: self.local_id,
            email: self.email.filter(|e| !e.trim().is_empty()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            is_new_user: is_new_user || self.is_new_user,
        }
    }
}

fn accounts_url(settings: &FirebaseSettings, method: &str) -> String {
    format!("{}/v1/accounts:{method}", settings.auth_base_url)
}

/// Maps a non-success response to an `AuthFailure`.
async fn failure_from_response(response: reqwest::Response) -> AuthFailure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match error_message(&body) {
        Some(code) => AuthFailure::from_provider_code(&code),
        None => AuthFailure::from_provider_code(&format!("Sign-in failed (HTTP {status})")),
    }
}

async fn post_json<B, R>(http: &reqwest::Client, url: &str, api_key: &str, body: &B) -> Result<R, AuthFailure>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = http
        .post(url)
        .query(&[("key", api_key)])
        .json(body)
        .send()
        .await
        .map_err(AuthFailure::network)?;

    if !response.status().is_success() {
        return Err(failure_from_response(response).await);
    }

    response.json().await.map_err(AuthFailure::network)
}

pub(super) async fn sign_up(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    email: &str,
    password: &str,
) -> Result<SignedIn, AuthFailure> {
    let request = PasswordRequest {
        email,
        password,
        return_secure_token: true,
    };
    let response: SignInResponse = post_json(
        http,
        &accounts_url(settings, "signUp"),
        &settings.api_key,
        &request,
    )
    .await?;
    Ok(response.into_signed_in(true))
}

pub(super) async fn sign_in_with_password(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    email: &str,
    password: &str,
) -> Result<SignedIn, AuthFailure> {
    let request = PasswordRequest {
        email,
        password,
        return_secure_token: true,
    };
    let response: SignInResponse = post_json(
        http,
        &accounts_url(settings, "signInWithPassword"),
        &settings.api_key,
        &request,
    )
    .await?;
    Ok(response.into_signed_in(false))
}

/// Exchanges a Google ID token for a Firebase identity.
pub(super) async fn sign_in_with_idp(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    google_id_token: &str,
) -> Result<SignedIn, AuthFailure> {
    let post_body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id_token", google_id_token)
        .append_pair("providerId", GOOGLE_PROVIDER_ID)
        .finish();
    let request = IdpRequest {
        post_body,
        request_uri: "http://localhost",
        return_idp_credential: true,
        return_secure_token: true,
    };
    let response: SignInResponse = post_json(
        http,
        &accounts_url(settings, "signInWithIdp"),
        &settings.api_key,
        &request,
    )
    .await?;
    Ok(response.into_signed_in(false))
}

pub(super) async fn refresh(
    http: &reqwest::Client,
    settings: &FirebaseSettings,
    refresh_token: &str,
) -> Result<RefreshedToken, AuthFailure> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .finish();

    let response = http
        .post(format!("{}/v1/token", settings.token_base_url))
        .query(&[("key", settings.api_key.as_str())])
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .map_err(AuthFailure::network)?;

    if !response.status().is_success() {
        return Err(failure_from_response(response).await);
    }

    let refreshed: RefreshResponse = response.json().await.map_err(AuthFailure::network)?;
    Ok(RefreshedToken {
        expires_in: parse_expires_in(refreshed.expires_in.as_deref()),
        id_token: refreshed.id_token,
        refresh_token: refreshed.refresh_token,
    })
}
