//! In-process gateways used by `--offline` and by tests.
//!
//! One `MemoryBackend` implements both traits. Live queries are driven by a
//! `watch` version counter bumped on every document write.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, stream};
use tokio::sync::watch;

use super::{
    AuthGateway, AuthOutcome, GatewayResult, PROFILE_WARNING, QueryMode, VocabularyStore,
    WordStream,
};
use crate::error::{AuthFailure, GatewayError};
use crate::model::{
    Document, FIELD_USER_ID, Flashcard, Session, UserProfile, decode_flashcards,
};
use crate::validation::MIN_PASSWORD_LEN;

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct FederatedIdentity {
    email: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    federated: HashMap<String, FederatedIdentity>,
    profiles: BTreeMap<String, UserProfile>,
    documents: Vec<Document>,
    current: Option<Session>,
    next_uid: u64,
    auth_calls: usize,
    fail_profile_writes: bool,
    fail_reads: bool,
    fail_writes: bool,
}

impl State {
    fn allocate_uid(&mut self) -> String {
        self.next_uid += 1;
        format!("mem-{:04}", self.next_uid)
    }

    fn write_profile(&mut self, profile: UserProfile) -> Option<String> {
        if self.fail_profile_writes {
            tracing::warn!(user_id = %profile.user_id, "profile write failed");
            return Some(PROFILE_WARNING.to_string());
        }
        self.profiles.insert(profile.user_id.clone(), profile);
        None
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    version: watch::Sender<u64>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    fn words_for(&self, owner_id: &str) -> GatewayResult<Vec<Flashcard>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(GatewayError::store("Failed to load flashcards."));
        }
        let owned = state
            .documents
            .iter()
            .filter(|doc| doc.get(FIELD_USER_ID).map(String::as_str) == Some(owner_id));
        Ok(decode_flashcards(owned))
    }
}

/// In-memory identity provider and document store.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                version,
            }),
        }
    }

    /// Seeds an email/password account without writing a profile.
    pub fn add_account(&self, email: &str, password: &str) -> Session {
        let mut state = self.inner.lock();
        let user_id = state.allocate_uid();
        state.accounts.insert(
            normalize_email(email),
            Account {
                user_id: user_id.clone(),
                email: email.to_string(),
                password: password.to_string(),
            },
        );
        Session::new(user_id, email)
    }

    /// Registers a Google ID token the fake provider will accept.
    pub fn add_federated_identity(&self, provider_token: &str, email: Option<&str>) {
        self.inner.lock().federated.insert(
            provider_token.to_string(),
            FederatedIdentity {
                email: email.map(str::to_string),
                user_id: None,
            },
        );
    }

    /// Stores a raw record, well-formed or not.
    pub fn insert_document(&self, doc: Document) {
        self.inner.lock().documents.push(doc);
        self.inner.bump();
    }

    pub fn insert_word(&self, owner_id: &str, french: &str, english: &str) {
        self.insert_document(Flashcard::new(owner_id, french, english).to_document());
    }

    pub fn profile(&self, user_id: &str) -> Option<UserProfile> {
        self.inner.lock().profiles.get(user_id).cloned()
    }

    /// Number of auth gateway calls made so far.
    pub fn auth_calls(&self) -> usize {
        self.inner.lock().auth_calls
    }

    pub fn set_fail_profile_writes(&self, fail: bool) {
        self.inner.lock().fail_profile_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    fn register_sync(&self, email: &str, password: &str) -> GatewayResult<AuthOutcome> {
        let mut state = self.inner.lock();
        state.auth_calls += 1;
        let key = normalize_email(email);
        if state.accounts.contains_key(&key) {
            return Err(AuthFailure::from_provider_code("EMAIL_EXISTS").into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthFailure::from_provider_code("WEAK_PASSWORD").into());
        }

        let user_id = state.allocate_uid();
        state.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                email: email.to_string(),
                password: password.to_string(),
            },
        );
        let profile_warning = state.write_profile(UserProfile::new(&user_id, email));
        let session = Session::new(user_id, email);
        state.current = Some(session.clone());
        tracing::info!(user_id = %session.user_id, "registered");
        Ok(AuthOutcome {
            session,
            profile_warning,
        })
    }

    fn login_sync(&self, email: &str, password: &str) -> GatewayResult<AuthOutcome> {
        let mut state = self.inner.lock();
        state.auth_calls += 1;
        let account = state
            .accounts
            .get(&normalize_email(email))
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(AuthFailure::invalid_credentials)?;
        let session = Session::new(account.user_id, account.email);
        state.current = Some(session.clone());
        Ok(AuthOutcome::new(session))
    }

    fn sign_in_federated_sync(&self, provider_token: &str) -> GatewayResult<AuthOutcome> {
        let mut state = self.inner.lock();
        state.auth_calls += 1;
        let Some(identity) = state.federated.get(provider_token).cloned() else {
            return Err(AuthFailure::from_provider_code("INVALID_IDP_RESPONSE").into());
        };

        let (user_id, profile_warning) = if let Some(user_id) = identity.user_id.clone() {
            (user_id, None)
        } else {
            let user_id = state.allocate_uid();
            if let Some(entry) = state.federated.get_mut(provider_token) {
                entry.user_id = Some(user_id.clone());
            }
            let warning =
                state.write_profile(UserProfile::federated(&user_id, identity.email.as_deref()));
            (user_id, warning)
        };

        let session = Session::new(user_id, identity.email.unwrap_or_default());
        state.current = Some(session.clone());
        Ok(AuthOutcome {
            session,
            profile_warning,
        })
    }

    fn add_word_sync(&self, owner_id: &str, french: &str, english: &str) -> GatewayResult<()> {
        {
            let mut state = self.inner.lock();
            if state.fail_writes {
                return Err(GatewayError::store("Failed to save word"));
            }
            state
                .documents
                .push(Flashcard::new(owner_id, french, english).to_document());
        }
        self.inner.bump();
        Ok(())
    }
}

impl AuthGateway for MemoryBackend {
    fn register<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move { self.register_sync(email, password) }.boxed()
    }

    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move { self.login_sync(email, password) }.boxed()
    }

    fn sign_in_federated<'a>(
        &'a self,
        provider_token: &'a str,
    ) -> BoxFuture<'a, GatewayResult<AuthOutcome>> {
        async move { self.sign_in_federated_sync(provider_token) }.boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, ()> {
        async move {
            self.inner.lock().current = None;
        }
        .boxed()
    }

    fn current_session(&self) -> Option<Session> {
        self.inner.lock().current.clone()
    }
}

impl VocabularyStore for MemoryBackend {
    fn add_word<'a>(
        &'a self,
        owner_id: &'a str,
        french: &'a str,
        english: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        async move { self.add_word_sync(owner_id, french, english) }.boxed()
    }

    fn query_words(&self, owner_id: &str, mode: QueryMode) -> WordStream {
        let inner = Arc::clone(&self.inner);
        let owner = owner_id.to_string();
        match mode {
            QueryMode::Snapshot => stream::once(async move { inner.words_for(&owner) }).boxed(),
            QueryMode::Live => {
                let rx = inner.version.subscribe();
                stream::unfold(
                    (inner, rx, owner, true),
                    |(inner, mut rx, owner, first)| async move {
                        if !first && rx.changed().await.is_err() {
                            return None;
                        }
                        let words = inner.words_for(&owner);
                        Some((words, (inner, rx, owner, false)))
                    },
                )
                .boxed()
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
