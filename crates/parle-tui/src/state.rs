//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── screen: Screen          (active screen and its transient data)
//! │   ├── session: Option<Session>
//! │   ├── vocabulary: VocabularyState (words for the session, load status)
//! │   ├── task_seq: TaskSeq       (async task id generator)
//! │   └── tasks: Tasks            (task lifecycle state)
//! └── overlay: Option<Overlay>    (modal overlays)
//! ```
//!
//! State is split so overlay handlers can hold `&mut Overlay` and
//! `&TuiState` at the same time. Only the reducer mutates either half.

use parle_core::gateway::QueryMode;
use parle_core::model::Session;

use crate::common::{TaskSeq, Tasks};
use crate::features::auth::{LoginForm, RegisterForm};
use crate::features::flashcards::FlashcardView;
use crate::features::home::HomeState;
use crate::features::vocabulary::VocabularyState;
use crate::overlays::Overlay;

/// Startup settings the reducer needs.
#[derive(Debug, Clone, Default)]
pub struct TuiSettings {
    pub query_mode: QueryMode,
    pub google_enabled: bool,
    /// Prefills the login form.
    pub last_email: Option<String>,
}

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(settings: TuiSettings) -> Self {
        Self {
            tui: TuiState::new(settings),
            overlay: None,
        }
    }
}

/// The active screen with its per-screen data.
#[derive(Debug, Clone)]
pub enum Screen {
    Login(LoginForm),
    Register(RegisterForm),
    Home(HomeState),
    Flashcards(FlashcardView),
    SentenceBuilder,
    EmptyVocabulary,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login(_) => "login",
            Screen::Register(_) => "register",
            Screen::Home(_) => "home",
            Screen::Flashcards(_) => "flashcards",
            Screen::SentenceBuilder => "sentence_builder",
            Screen::EmptyVocabulary => "empty_vocabulary",
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            Screen::Login(form) => form.loading,
            Screen::Register(form) => form.loading,
            _ => false,
        }
    }
}

pub struct TuiState {
    pub should_quit: bool,
    pub screen: Screen,
    pub session: Option<Session>,
    pub vocabulary: VocabularyState,
    /// Task id sequence for async operations.
    pub task_seq: TaskSeq,
    /// Task lifecycle state for async operations.
    pub tasks: Tasks,
    /// One-shot message on the dashboard, replaced on the next navigation.
    pub notice: Option<String>,
    pub query_mode: QueryMode,
    pub google_enabled: bool,
    pub last_email: Option<String>,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(settings: TuiSettings) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Login(LoginForm::with_email(settings.last_email.as_deref())),
            session: None,
            vocabulary: VocabularyState::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            notice: None,
            query_mode: settings.query_mode,
            google_enabled: settings.google_enabled,
            last_email: settings.last_email,
            spinner_frame: 0,
        }
    }

    /// Switches screens and drops any pending notice.
    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!(from = self.screen.name(), to = screen.name(), "navigate");
        self.screen = screen;
        self.notice = None;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }
}
