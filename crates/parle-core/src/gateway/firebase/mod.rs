//! Firebase Authentication + Cloud Firestore over their public REST APIs.
//!
//! One `FirebaseBackend` implements both gateway traits and owns the signed-in
//! identity (ID token, refresh token), refreshing the ID token before use.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, stream};
use serde::Deserialize;

use super::{
    AuthGateway, AuthOutcome, GatewayResult, PROFILE_WARNING, QueryMode, VocabularyStore,
    WordStream,
};
use crate::config::{
    Config, DEFAULT_AUTH_BASE_URL, DEFAULT_FIRESTORE_BASE_URL, DEFAULT_TOKEN_BASE_URL,
};
use crate::credentials::{CredentialStore, StoredCredentials, compute_expires_at};
use crate::error::GatewayError;
use crate::model::{Flashcard, Session, UserProfile};

mod auth;
mod firestore;

/// Everything needed to reach one Firebase project.
#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    pub auth_base_url: String,
    pub token_base_url: String,
    pub firestore_base_url: String,
    pub request_timeout: Option<Duration>,
    pub live_poll_interval: Duration,
    /// Where the signed-in identity is cached; `None` keeps it in memory only.
    pub credentials: Option<CredentialStore>,
}

impl FirebaseSettings {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            token_base_url: DEFAULT_TOKEN_BASE_URL.to_string(),
            firestore_base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            request_timeout: None,
            live_poll_interval: Duration::from_secs(5),
            credentials: None,
        }
    }

    /// Points all three endpoints at one server (emulators, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.auth_base_url = base_url.to_string();
        self.token_base_url = base_url.to_string();
        self.firestore_base_url = base_url.to_string();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.firebase.effective_api_key().context(
            "Firebase API key is not configured (set [firebase].api_key or FIREBASE_API_KEY)",
        )?;
        let project_id = config.firebase.effective_project_id().context(
            "Firebase project id is not configured (set [firebase].project_id or FIREBASE_PROJECT_ID)",
        )?;

        Ok(Self {
            api_key,
            project_id,
            auth_base_url: config.firebase.effective_auth_base_url(),
            token_base_url: config.firebase.effective_token_base_url(),
            firestore_base_url: config.firebase.effective_firestore_base_url(),
            request_timeout: config.request_timeout(),
            live_poll_interval: config.live_poll_interval(),
            credentials: Some(CredentialStore::default_location()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts `error.message` from a Google API error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[derive(Debug)]
struct Inner {
    settings: FirebaseSettings,
    http: reqwest::Client,
    identity: Mutex<Option<StoredCredentials>>,
}

impl Inner {
    fn identity(&self) -> MutexGuard<'_, Option<StoredCredentials>> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Firebase-backed gateways.
#[derive(Debug, Clone)]
pub struct FirebaseBackend {
    inner: Arc<Inner>,
}

impl FirebaseBackend {
    /// Builds the HTTP client and restores any cached identity.
    pub fn new(settings: FirebaseSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let cached = match &settings.credentials {
            Some(store) => store.load().unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable credentials cache: {err:#}");
                None
            }),
            None => None,
        };
        if let Some(creds) = &cached {
            tracing::info!(user_id = %creds.user_id, "restored cached session");
        }

        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                http,
                identity: Mutex::new(cached),
            }),
        })
    }

    fn settings(&self) -> &FirebaseSettings {
        &self.inner.settings
    }

    fn remember(&self, creds: StoredCredentials) {
        if let Some(store) = &self.settings().credentials
            && let Err(err) = store.save(&creds)
        {
            tracing::warn!("failed to cache credentials: {err:#}");
        }
        *self.inner.identity() = Some(creds);
    }

    fn remember_sign_in(&self, signed_in: &auth::SignedIn, email: &str) -> StoredCredentials {
        let creds = StoredCredentials {
            user_id: signed_in.user_id.clone(),
            email: email.to_string(),
            id_token: signed_in.id_token.clone(),
            refresh_token: signed_in.refresh_token.clone(),
            expires_at: compute_expires_at(signed_in.expires_in),
        };
        self.remember(creds.clone());
        tracing::info!(user_id = %creds.user_id, "signed in");
        creds
    }

    /// Returns a usable ID token, refreshing it when close to expiry.
    async fn id_token(&self) -> GatewayResult<String> {
        let current = self
            .inner
            .identity()
            .clone()
            .ok_or(GatewayError::NotSignedIn)?;
        if !current.needs_refresh() {
            return Ok(current.id_token);
        }

        tracing::debug!("refreshing ID token");
        let refreshed =
            auth::refresh(&self.inner.http, self.settings(), &current.refresh_token).await?;
        let updated = StoredCredentials {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: compute_expires_at(refreshed.expires_in),
            ..current
        };

        // Signed out (or switched user) while refreshing: drop the new token.
        let still_current = self
            .inner
            .identity()
            .as_ref()
            .is_some_and(|c| c.user_id == updated.user_id);
        if !still_current {
            return Err(GatewayError::NotSignedIn);
        }
        self.remember(updated.clone());
        Ok(updated.id_token)
    }

    /// Writes the profile; failures become a warning, never an error.
    async fn save_profile_best_effort(
        &self,
        id_token: &str,
        profile: &UserProfile,
    ) -> Option<String> {
        match firestore::commit_profile(&self.inner.http, self.settings(), id_token, profile).await
        {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(user_id = %profile.user_id, "profile write failed: {err}");
                Some(PROFILE_WARNING.to_string())
            }
        }
    }

    async fn fetch_words(&self, owner_id: &str) -> GatewayResult<Vec<Flashcard>> {
        let token = self.id_token().await?;
        firestore::run_query(&self.inner.http, self.settings(), &token, owner_id).await
    }

    fn live_words(&self, owner_id: String) -> WordStream {
        struct Poll {
            backend: FirebaseBackend,
            owner_id: String,
            last: Option<Vec<Flashcard>>,
            first: bool,
        }

        let interval = self.settings().live_poll_interval;
        let initial = Poll {
            backend: self.clone(),
            owner_id,
            last: None,
            first: true,
        };

        stream::unfold(initial, move |mut poll| async move {
            loop {
                if !poll.first {
                    tokio::time::sleep(interval).await;
                }
                poll.first = false;

                let result = poll.backend.fetch_words(&poll.owner_id).await;
                match &result {
                    Ok(words) if poll.last.as_ref() == Some(words) => continue,
                    Ok(words) => poll.last = Some(words.clone()),
                    Err(err) => {
                        tracing::warn!("vocabulary poll failed: {err}");
                        poll.last = None;
                    }
                }
                return Some((result, poll));
            }
        })
        .boxed()
    }
}

impl AuthGateway for FirebaseBackend {
    fn register<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move {
            let signed_in =
                auth::sign_up(&self.inner.http, self.settings(), email, password).await?;
            let creds = self.remember_sign_in(&signed_in, email);
            let profile = UserProfile::new(&creds.user_id, email);
            let profile_warning = self.save_profile_best_effort(&creds.id_token, &profile).await;
            Ok(AuthOutcome {
                session: creds.session(),
                profile_warning,
            })
        }
        .boxed()
    }

    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move {
            let signed_in =
                auth::sign_in_with_password(&self.inner.http, self.settings(), email, password)
                    .await?;
            let email = signed_in.email.clone().unwrap_or_else(|| email.to_string());
            let creds = self.remember_sign_in(&signed_in, &email);
            Ok(AuthOutcome::new(creds.session()))
        }
        .boxed()
    }

    fn sign_in_federated<'a>(
        &'a self,
        provider_token: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move {
            let signed_in =
                auth::sign_in_with_idp(&self.inner.http, self.settings(), provider_token).await?;
            let email = signed_in.email.clone().unwrap_or_default();
            let creds = self.remember_sign_in(&signed_in, &email);

            let profile_warning = if signed_in.is_new_user {
                let profile = UserProfile::federated(&creds.user_id, signed_in.email.as_deref());
                self.save_profile_best_effort(&creds.id_token, &profile)
                    .await
            } else {
                None
            };

            Ok(AuthOutcome {
                session: creds.session(),
                profile_warning,
            })
        }
        .boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, ()> {
        async move {
            let previous = self.inner.identity().take();
            if let Some(store) = &self.settings().credentials
                && let Err(err) = store.clear()
            {
                tracing::warn!("failed to remove cached credentials: {err:#}");
            }
            if let Some(creds) = previous {
                tracing::info!(user_id = %creds.user_id, "signed out");
            }
        }
        .boxed()
    }

    fn current_session(&self) -> Option<Session> {
        self.inner.identity().as_ref().map(StoredCredentials::session)
    }
}

impl VocabularyStore for FirebaseBackend {
    fn add_word<'a>(
        &'a self,
        owner_id: &'a str,
        french: &'a str,
        english: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        async move {
            let token = self.id_token().await?;
            let card = Flashcard::new(owner_id, french, english);
            firestore::create_vocabulary_document(
                &self.inner.http,
                self.settings(),
                &token,
                &card.to_document(),
            )
            .await
        }
        .boxed()
    }

    fn query_words(&self, owner_id: &str, mode: QueryMode) -> WordStream {
        match mode {
            QueryMode::Snapshot => {
                let backend = self.clone();
                let owner_id = owner_id.to_string();
                stream::once(async move { backend.fetch_words(&owner_id).await }).boxed()
            }
            QueryMode::Live => self.live_words(owner_id.to_string()),
        }
    }
}
