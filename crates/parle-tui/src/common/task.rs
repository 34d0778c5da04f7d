use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Email/password login, registration, or the token sign-in step of Google.
    Auth,
    /// Browser round-trip that yields a Google ID token.
    Federated,
    AddWord,
    /// Long-lived vocabulary subscription for the signed-in user.
    Vocabulary,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
///
/// A slot becomes active when the reducer emits the effect, not when the
/// runtime reports `TaskStarted`, so a cancel issued in between still wins.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.active == Some(id)
    }

    /// Marks `id` as the only task allowed to report into this slot.
    ///
    /// Returns the cancel token of the task it replaces, if any.
    pub fn begin(&mut self, id: TaskId) -> Option<CancellationToken> {
        self.active = Some(id);
        self.cancel.take()
    }

    /// Records the cancel token for `started` if it is still the active task.
    ///
    /// Returns false for a task that was superseded or cancelled before it
    /// reported in; the caller should cancel its token.
    pub fn on_started(&mut self, started: &TaskStarted) -> bool {
        if self.is_active(started.id) {
            self.cancel.clone_from(&started.cancel);
            true
        } else {
            false
        }
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.is_active(id);
        if ok {
            self.clear();
        }
        ok
    }

    /// Deactivates the slot and hands back the token to cancel.
    pub fn cancel(&mut self) -> Option<CancellationToken> {
        self.active = None;
        self.cancel.take()
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub auth: TaskState,
    pub federated: TaskState,
    pub add_word: TaskState,
    pub vocabulary: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Auth => &self.auth,
            TaskKind::Federated => &self.federated,
            TaskKind::AddWord => &self.add_word,
            TaskKind::Vocabulary => &self.vocabulary,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Auth => &mut self.auth,
            TaskKind::Federated => &mut self.federated,
            TaskKind::AddWord => &mut self.add_word,
            TaskKind::Vocabulary => &mut self.vocabulary,
        }
    }

    /// Whether a user-initiated request is in flight.
    ///
    /// The vocabulary subscription lives for the whole session and is not counted.
    pub fn is_any_running(&self) -> bool {
        self.auth.is_running() || self.federated.is_running() || self.add_word.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_after_cancel_is_rejected() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();
        let id = seq.next_id();
        state.begin(id);
        assert!(state.cancel().is_none());

        let token = CancellationToken::new();
        let started = TaskStarted {
            id,
            cancel: Some(token),
        };
        assert!(!state.on_started(&started));
        assert!(!state.is_running());
    }

    #[test]
    fn test_begin_returns_previous_token() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();
        let first = seq.next_id();
        state.begin(first);
        let token = CancellationToken::new();
        assert!(state.on_started(&TaskStarted {
            id: first,
            cancel: Some(token.clone()),
        }));

        let second = seq.next_id();
        let previous = state.begin(second).unwrap();
        previous.cancel();
        assert!(token.is_cancelled());
        assert!(!state.finish_if_active(first));
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }

    #[test]
    fn test_vocabulary_does_not_count_as_busy() {
        let mut tasks = Tasks::default();
        tasks.vocabulary.begin(TaskId(1));
        assert!(!tasks.is_any_running());
        tasks.add_word.begin(TaskId(2));
        assert!(tasks.is_any_running());
    }
}
