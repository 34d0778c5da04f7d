//! Headless navigation controller.
//!
//! Owns `AppState`, runs the reducer and executes its effects against a
//! `Backend`. `TuiRuntime` wraps it with a terminal; tests drive it directly.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parle_core::config::{Config, paths};
use parle_core::gateway::{Backend, QueryMode};
use parle_core::google::GoogleOAuth;
use tokio_util::sync::CancellationToken;

use super::handlers::{self, AuthRequest};
use super::inbox::{self, UiEventReceiver, UiEventSender};
use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::{AuthUiEvent, UiEvent};
use crate::features::auth::GOOGLE_NOT_CONFIGURED;
use crate::state::{AppState, TuiSettings};
use crate::update;

/// Everything the controller needs besides the backend.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub query_mode: QueryMode,
    pub last_email: Option<String>,
    pub google: Option<GoogleOAuth>,
    /// Config file that receives the last used email; `None` disables it.
    pub config_path: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
}

impl RuntimeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            query_mode: config.query_mode,
            last_email: config.effective_last_email().map(str::to_string),
            google: GoogleOAuth::from_config(&config.google),
            config_path: Some(paths::config_path()),
            request_timeout: config.request_timeout(),
        }
    }
}

pub struct Controller {
    pub state: AppState,
    backend: Backend,
    google: Option<GoogleOAuth>,
    http: reqwest::Client,
    config_path: Option<PathBuf>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
}

impl Controller {
    /// Must be called inside a tokio runtime; effects spawn tasks on it.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(backend: Backend, options: RuntimeOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let settings = TuiSettings {
            query_mode: options.query_mode,
            google_enabled: options.google.is_some(),
            last_email: options.last_email,
        };
        let (inbox_tx, inbox_rx) = inbox::channel();

        Ok(Self {
            state: AppState::new(settings),
            backend,
            google: options.google,
            http,
            config_path: options.config_path,
            inbox_tx,
            inbox_rx,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.state.tui.should_quit
    }

    /// Runs one event through the reducer and executes the resulting effects.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Moves everything already waiting in the inbox into `events`.
    pub fn drain_inbox_into(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(event) = self.inbox_rx.try_recv() {
            events.push(event);
        }
    }

    /// Processes inbox events until `done` holds or `timeout` elapses.
    ///
    /// Returns whether `done` was reached.
    pub async fn run_until<F>(&mut self, timeout: Duration, done: F) -> bool
    where
        F: Fn(&AppState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if done(&self.state) {
                return true;
            }
            match tokio::time::timeout_at(deadline, self.inbox_rx.recv()).await {
                Ok(Some(event)) => self.dispatch(event),
                Ok(None) | Err(_) => return done(&self.state),
            }
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn spawn_auth(&self, task: TaskId, request: AuthRequest) {
        let auth = Arc::clone(&self.backend.auth);
        self.spawn_task(TaskKind::Auth, task, true, move |cancel| {
            handlers::authenticate(auth, request, cancel)
        });
    }

    /// Executes a single effect by dispatching to the appropriate handler.
    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::CancelTask { kind, token } => {
                if let Some(token) = token {
                    tracing::debug!(?kind, "cancelling task");
                    token.cancel();
                }
            }

            // Auth effects
            UiEffect::SignIn {
                task,
                email,
                password,
            } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_auth(task, AuthRequest::Login { email, password });
            }
            UiEffect::Register {
                task,
                email,
                password,
            } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_auth(task, AuthRequest::Register { email, password });
            }
            UiEffect::SignInFederated { task, token } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_auth(task, AuthRequest::Federated { token });
            }
            UiEffect::StartFederatedSignIn { task } => {
                let Some(task) = task else {
                    return;
                };
                let google = self.google.clone();
                let http = self.http.clone();
                self.spawn_task(TaskKind::Federated, task, true, move |cancel| async move {
                    match google {
                        Some(oauth) => handlers::federated_token(oauth, http, cancel).await,
                        None => UiEvent::Auth(AuthUiEvent::ProviderToken(Err(
                            GOOGLE_NOT_CONFIGURED.to_string(),
                        ))),
                    }
                });
            }
            UiEffect::SignOut => {
                let auth = Arc::clone(&self.backend.auth);
                tokio::spawn(async move { auth.sign_out().await });
            }
            UiEffect::PersistLastEmail { email } => {
                if let Some(path) = &self.config_path
                    && let Err(err) = Config::save_last_email_to(path, &email)
                {
                    // The email is already in state; only the next launch loses it.
                    tracing::warn!("failed to save last email: {err:#}");
                }
            }

            // Vocabulary effects
            UiEffect::SubscribeVocabulary {
                task,
                owner_id,
                mode,
            } => {
                let Some(task) = task else {
                    return;
                };
                let store = Arc::clone(&self.backend.store);
                let tx = self.inbox_tx.clone();
                self.spawn_task(TaskKind::Vocabulary, task, true, move |cancel| {
                    handlers::subscribe_vocabulary(store, task, owner_id, mode, tx, cancel)
                });
            }
            UiEffect::AddWord {
                task,
                owner_id,
                french,
                english,
            } => {
                let Some(task) = task else {
                    return;
                };
                let store = Arc::clone(&self.backend.store);
                self.spawn_task(TaskKind::AddWord, task, false, move |_| {
                    handlers::add_word(store, owner_id, french, english)
                });
            }
        }
    }
}
