//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, semantic actions, and
//! results of async work delivered through the runtime inbox.

use crossterm::event::Event;
use parle_core::gateway::AuthOutcome;
use parle_core::model::Flashcard;

use crate::actions::Action;
use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Animation tick.
    Tick,
    Terminal(Event),
    Action(Action),
    Auth(AuthUiEvent),
    Vocabulary(VocabularyUiEvent),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
}

#[derive(Debug)]
pub enum AuthUiEvent {
    /// Login, registration or federated sign-in finished.
    Completed(Result<AuthOutcome, String>),
    /// The Google browser flow finished.
    ProviderToken(Result<String, String>),
}

#[derive(Debug)]
pub enum VocabularyUiEvent {
    /// A complete list from the subscription `task`.
    Snapshot {
        task: TaskId,
        owner_id: String,
        result: Result<Vec<Flashcard>, String>,
    },
    /// The subscription stream ended or was cancelled.
    Closed,
    WordAdded {
        french: String,
        result: Result<(), String>,
    },
}
