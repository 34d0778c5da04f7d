//! Capability interfaces for identity and vocabulary storage.
//!
//! The UI only ever sees these traits. `Backend` bundles one implementation
//! of each and is built once at startup.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

pub use crate::config::QueryMode;
use crate::config::{BackendKind, Config};
use crate::error::GatewayError;
use crate::model::{Flashcard, Session};

pub mod firebase;
pub mod memory;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Notice returned when an identity was created but its profile was not saved.
pub const PROFILE_WARNING: &str = "Signed in, but your profile could not be saved";

/// Stream of complete vocabulary lists, never diffs.
pub type WordStream = BoxStream<'static, GatewayResult<Vec<Flashcard>>>;

/// Result of a successful sign-in or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub session: Session,
    /// Set when the identity exists but the profile record could not be saved.
    pub profile_warning: Option<String>,
}

impl AuthOutcome {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            profile_warning: None,
        }
    }
}

/// Identity provider operations.
pub trait AuthGateway: Send + Sync {
    /// Creates an account and persists its profile.
    fn register<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>>;

    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>>;

    /// Signs in with a Google ID token; persists the profile on first sign-in.
    fn sign_in_federated<'a>(
        &'a self,
        provider_token: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>>;

    fn sign_out(&self) -> BoxFuture<'_, ()>;

    fn current_session(&self) -> Option<Session>;
}

/// Document store operations scoped to the vocabulary collection.
pub trait VocabularyStore: Send + Sync {
    fn add_word<'a>(
        &'a self,
        owner_id: &'a str,
        french: &'a str,
        english: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>>;

    /// Words owned by `owner_id`, in store order, malformed records excluded.
    ///
    /// `Snapshot` yields exactly one item; `Live` yields the initial list and
    /// a full replacement after every change until the stream is dropped.
    fn query_words(&self, owner_id: &str, mode: QueryMode) -> WordStream;
}

/// The pair of gateways the app runs against.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthGateway>,
    pub store: Arc<dyn VocabularyStore>,
}

impl Backend {
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn VocabularyStore>) -> Self {
        Self { auth, store }
    }

    /// An in-process backend; both traits share one `MemoryBackend`.
    pub fn memory(backend: memory::MemoryBackend) -> Self {
        let shared = Arc::new(backend);
        Self {
            auth: Arc::clone(&shared) as Arc<dyn AuthGateway>,
            store: shared,
        }
    }

    /// Builds the backend selected by `config.backend`.
    ///
    /// `force_memory` wins over the config (the `--offline` flag).
    pub fn from_config(config: &Config, force_memory: bool) -> Result<Self> {
        let kind = if force_memory {
            BackendKind::Memory
        } else {
            config.backend
        };
        match kind {
            BackendKind::Memory => {
                tracing::info!("using in-memory backend");
                Ok(Self::memory(memory::MemoryBackend::new()))
            }
            BackendKind::Firebase => {
                let settings = firebase::FirebaseSettings::from_config(config)?;
                let shared = Arc::new(firebase::FirebaseBackend::new(settings)?);
                Ok(Self {
                    auth: Arc::clone(&shared) as Arc<dyn AuthGateway>,
                    store: shared,
                })
            }
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
