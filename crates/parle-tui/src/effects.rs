//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! Task-spawning effects carry `task: Option<TaskId>`. Feature code and
//! overlays emit them with `None`; the reducer stamps an id and activates
//! the matching task slot before the runtime ever sees the effect.

use parle_core::gateway::QueryMode;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Email/password sign-in.
    SignIn {
        task: Option<TaskId>,
        email: String,
        password: String,
    },

    /// Create an account and its profile.
    Register {
        task: Option<TaskId>,
        email: String,
        password: String,
    },

    /// Run the Google browser flow to obtain a provider token.
    StartFederatedSignIn { task: Option<TaskId> },

    /// Exchange a Google ID token for a session.
    SignInFederated { task: Option<TaskId>, token: String },

    SignOut,

    /// Start delivering vocabulary lists for `owner_id`.
    SubscribeVocabulary {
        task: Option<TaskId>,
        owner_id: String,
        mode: QueryMode,
    },

    AddWord {
        task: Option<TaskId>,
        owner_id: String,
        french: String,
        english: String,
    },

    /// Cancel a running task. The runtime just calls `cancel()` on the token.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },

    /// Remember the email for the next launch's login form.
    PersistLastEmail { email: String },
}

impl UiEffect {
    /// The task slot and id field for effects that spawn a task.
    pub fn task_mut(&mut self) -> Option<(TaskKind, &mut Option<TaskId>)> {
        match self {
            UiEffect::SignIn { task, .. }
            | UiEffect::Register { task, .. }
            | UiEffect::SignInFederated { task, .. } => Some((TaskKind::Auth, task)),
            UiEffect::StartFederatedSignIn { task } => Some((TaskKind::Federated, task)),
            UiEffect::SubscribeVocabulary { task, .. } => Some((TaskKind::Vocabulary, task)),
            UiEffect::AddWord { task, .. } => Some((TaskKind::AddWord, task)),
            UiEffect::Quit
            | UiEffect::SignOut
            | UiEffect::CancelTask { .. }
            | UiEffect::PersistLastEmail { .. } => None,
        }
    }
}
