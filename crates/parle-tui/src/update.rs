//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use parle_core::gateway::{AuthOutcome, QueryMode};
use parle_core::model::Flashcard;

use crate::actions::{self, Action};
use crate::common::{TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::events::{AuthUiEvent, UiEvent, VocabularyUiEvent};
use crate::features::auth::{self, LoginForm, RegisterForm};
use crate::features::flashcards::FlashcardView;
use crate::features::home::HomeState;
use crate::overlays::{AddWordState, Overlay, OverlayTransition};
use crate::state::{AppState, Screen, TuiState};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute. Task-spawning effects leave here with an id
/// and an active task slot.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let mut effects = reduce(app, event);
    stamp_tasks(&mut app.tui, &mut effects);
    effects
}

fn reduce(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Action(action) => handle_action(app, action),
        UiEvent::Auth(auth_event) => handle_auth_event(&mut app.tui, auth_event),
        UiEvent::Vocabulary(vocab_event) => handle_vocabulary_event(app, vocab_event),
        UiEvent::TaskStarted { kind, started } => {
            if app.tui.tasks.state_mut(kind).on_started(&started) {
                vec![]
            } else {
                // Superseded or cancelled before it reported in.
                tracing::debug!(?kind, id = started.id.0, "cancelling stale task");
                vec![UiEffect::CancelTask {
                    kind,
                    token: started.cancel,
                }]
            }
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tui.tasks.state_mut(kind).finish_if_active(completed.id) {
                reduce(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping stale task result");
                vec![]
            }
        }
    }
}

/// Assigns ids to task-spawning effects and activates their slots.
///
/// Starting a task of a kind that is already running supersedes it.
fn stamp_tasks(tui: &mut TuiState, effects: &mut Vec<UiEffect>) {
    let mut cancels = Vec::new();
    for effect in effects.iter_mut() {
        let Some((kind, task)) = effect.task_mut() else {
            continue;
        };
        if task.is_some() {
            continue;
        }
        let id = tui.task_seq.next_id();
        *task = Some(id);
        if let Some(token) = tui.tasks.state_mut(kind).begin(id) {
            cancels.push(UiEffect::CancelTask {
                kind,
                token: Some(token),
            });
        }
    }
    effects.extend(cancels);
}

// ============================================================================
// Terminal input
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            handle_paste(app, &text);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(action) = actions::global_action(key) {
        return handle_action(app, action);
    }

    if let Some(overlay) = &mut app.overlay {
        let update = overlay.handle_key(&app.tui, key);
        if update.transition == OverlayTransition::Close {
            app.overlay = None;
        }
        return update.effects;
    }

    let action = match &mut app.tui.screen {
        Screen::Login(form) => auth::handle_login_key(form, key),
        Screen::Register(form) => auth::handle_register_key(form, key),
        Screen::Home(_) => actions::home_action(key),
        Screen::Flashcards(_) => actions::flashcards_action(key),
        Screen::SentenceBuilder | Screen::EmptyVocabulary => actions::placeholder_action(key),
    };
    action.map_or_else(Vec::new, |action| handle_action(app, action))
}

fn handle_paste(app: &mut AppState, text: &str) {
    if let Some(overlay) = &mut app.overlay {
        overlay.handle_paste(text);
        return;
    }
    match &mut app.tui.screen {
        Screen::Login(form) if !form.loading => form.focused_mut().insert_str(text),
        Screen::Register(form) if !form.loading => form.focused_mut().insert_str(text),
        _ => {}
    }
}

// ============================================================================
// Actions
// ============================================================================

fn handle_action(app: &mut AppState, action: Action) -> Vec<UiEffect> {
    let tui = &mut app.tui;
    match action {
        Action::Quit => vec![UiEffect::Quit],
        Action::SubmitLogin => match &mut tui.screen {
            Screen::Login(form) => auth::submit_login(form).into_iter().collect(),
            _ => vec![],
        },
        Action::SubmitRegister => match &mut tui.screen {
            Screen::Register(form) => auth::submit_register(form).into_iter().collect(),
            _ => vec![],
        },
        Action::StartGoogle => {
            let google_enabled = tui.google_enabled;
            match &mut tui.screen {
                Screen::Login(form) => auth::start_google(form, google_enabled)
                    .into_iter()
                    .collect(),
                _ => vec![],
            }
        }
        Action::GoRegister => {
            if let Screen::Login(form) = &tui.screen
                && !form.loading
            {
                let register = RegisterForm::with_email(form.email.value().trim());
                tui.navigate(Screen::Register(register));
            }
            vec![]
        }
        Action::GoLogin => {
            if let Screen::Register(form) = &tui.screen
                && !form.loading
            {
                let typed = form.email.value().trim();
                let email = if typed.is_empty() {
                    tui.last_email.clone()
                } else {
                    Some(typed.to_string())
                };
                tui.navigate(Screen::Login(LoginForm::with_email(email.as_deref())));
            }
            vec![]
        }
        Action::Cancel => cancel_sign_in(tui),
        Action::OpenFlashcards => {
            if matches!(tui.screen, Screen::Home(_)) {
                let screen = if tui.vocabulary.is_empty() {
                    Screen::EmptyVocabulary
                } else {
                    Screen::Flashcards(FlashcardView::new())
                };
                tui.navigate(screen);
            }
            vec![]
        }
        Action::OpenSentenceBuilder => {
            if matches!(tui.screen, Screen::Home(_)) {
                tui.navigate(Screen::SentenceBuilder);
            }
            vec![]
        }
        Action::OpenAddWord => {
            if matches!(tui.screen, Screen::Home(_)) && tui.session.is_some() {
                tui.notice = None;
                app.overlay = Some(Overlay::AddWord(AddWordState::open()));
            }
            vec![]
        }
        Action::Logout => {
            if matches!(tui.screen, Screen::Home(_)) {
                sign_out(app)
            } else {
                vec![]
            }
        }
        Action::MenuUp => {
            if let Screen::Home(home) = &mut tui.screen {
                home.select_prev();
            }
            vec![]
        }
        Action::MenuDown => {
            if let Screen::Home(home) = &mut tui.screen {
                home.select_next();
            }
            vec![]
        }
        Action::MenuSelect => {
            let selected = match &tui.screen {
                Screen::Home(home) => Some(home.selected_item()),
                _ => None,
            };
            selected.map_or_else(Vec::new, |item| handle_action(app, item.action()))
        }
        Action::Flip => {
            if let Screen::Flashcards(view) = &mut tui.screen {
                view.flip();
            }
            vec![]
        }
        Action::Next => {
            let count = tui.vocabulary.len();
            if let Screen::Flashcards(view) = &mut tui.screen {
                view.next(count);
            }
            vec![]
        }
        Action::Prev => {
            if let Screen::Flashcards(view) = &mut tui.screen {
                view.prev();
            }
            vec![]
        }
        Action::Back => {
            if matches!(
                tui.screen,
                Screen::Flashcards(_) | Screen::EmptyVocabulary | Screen::SentenceBuilder
            ) {
                tui.navigate(Screen::Home(HomeState::default()));
            }
            vec![]
        }
    }
}

/// Esc on a loading form: abandon the request and unlock the form.
fn cancel_sign_in(tui: &mut TuiState) -> Vec<UiEffect> {
    if !tui.screen.is_loading() {
        return vec![];
    }
    let mut effects = Vec::new();
    for kind in [TaskKind::Auth, TaskKind::Federated] {
        let slot = tui.tasks.state_mut(kind);
        if slot.is_running() {
            effects.push(UiEffect::CancelTask {
                kind,
                token: slot.cancel(),
            });
        }
    }
    match &mut tui.screen {
        Screen::Login(form) => {
            form.loading = false;
            form.error = None;
        }
        Screen::Register(form) => {
            form.loading = false;
            form.error = None;
        }
        _ => {}
    }
    tracing::info!("sign-in cancelled");
    effects
}

/// Clears the session and everything scoped to it, then returns to Login.
fn sign_out(app: &mut AppState) -> Vec<UiEffect> {
    let tui = &mut app.tui;
    let mut effects = Vec::new();
    for kind in [
        TaskKind::Vocabulary,
        TaskKind::AddWord,
        TaskKind::Auth,
        TaskKind::Federated,
    ] {
        let slot = tui.tasks.state_mut(kind);
        if slot.is_running() {
            effects.push(UiEffect::CancelTask {
                kind,
                token: slot.cancel(),
            });
        }
    }

    if let Some(session) = tui.session.take() {
        tracing::info!(user_id = %session.user_id, "signed out");
    }
    tui.vocabulary.clear();
    app.overlay = None;

    let form = LoginForm::with_email(tui.last_email.as_deref());
    tui.navigate(Screen::Login(form));
    effects.push(UiEffect::SignOut);
    effects
}

// ============================================================================
// Async results
// ============================================================================

fn handle_auth_event(tui: &mut TuiState, event: AuthUiEvent) -> Vec<UiEffect> {
    match event {
        AuthUiEvent::Completed(Ok(outcome)) => sign_in(tui, outcome),
        AuthUiEvent::Completed(Err(message)) => {
            tracing::info!(%message, "sign-in failed");
            fail_form(tui, message);
            vec![]
        }
        AuthUiEvent::ProviderToken(Ok(token)) => match &tui.screen {
            Screen::Login(form) if form.loading => vec![UiEffect::SignInFederated {
                task: None,
                token,
            }],
            _ => vec![],
        },
        AuthUiEvent::ProviderToken(Err(message)) => {
            tracing::info!(%message, "google sign-in failed");
            fail_form(tui, message);
            vec![]
        }
    }
}

fn fail_form(tui: &mut TuiState, message: String) {
    match &mut tui.screen {
        Screen::Login(form) => form.fail(message),
        Screen::Register(form) => form.fail(message),
        _ => {}
    }
}

/// Session absent → present: land on Home and start the vocabulary feed.
fn sign_in(tui: &mut TuiState, outcome: AuthOutcome) -> Vec<UiEffect> {
    if tui.session.is_some() {
        tracing::warn!("ignoring sign-in result while a session is active");
        return vec![];
    }
    let AuthOutcome {
        session,
        profile_warning,
    } = outcome;
    tracing::info!(user_id = %session.user_id, "signed in");

    let mut effects = Vec::new();
    if !session.email.is_empty() {
        tui.last_email = Some(session.email.clone());
        effects.push(UiEffect::PersistLastEmail {
            email: session.email.clone(),
        });
    }

    tui.vocabulary.clear();
    tui.session = Some(session);
    tui.navigate(Screen::Home(HomeState::default()));
    tui.notice = profile_warning;
    effects.extend(subscribe_vocabulary(tui));
    effects
}

/// Starts (or restarts) the vocabulary query for the current session.
fn subscribe_vocabulary(tui: &mut TuiState) -> Option<UiEffect> {
    let owner_id = tui.user_id()?.to_string();
    tui.vocabulary.start_loading();
    Some(UiEffect::SubscribeVocabulary {
        task: None,
        owner_id,
        mode: tui.query_mode,
    })
}

fn handle_vocabulary_event(app: &mut AppState, event: VocabularyUiEvent) -> Vec<UiEffect> {
    match event {
        VocabularyUiEvent::Snapshot {
            task,
            owner_id,
            result,
        } => {
            apply_snapshot(&mut app.tui, task, &owner_id, result);
            vec![]
        }
        VocabularyUiEvent::Closed => vec![],
        VocabularyUiEvent::WordAdded { french, result } => word_added(app, &french, result),
    }
}

fn apply_snapshot(
    tui: &mut TuiState,
    task: TaskId,
    owner_id: &str,
    result: Result<Vec<Flashcard>, String>,
) {
    if !tui.tasks.vocabulary.is_active(task) || tui.user_id() != Some(owner_id) {
        tracing::debug!(id = task.0, "dropping stale vocabulary snapshot");
        return;
    }

    let words = match result {
        Ok(words) => words,
        Err(message) => {
            tracing::warn!(%message, "vocabulary query failed");
            tui.vocabulary.fail(message);
            return;
        }
    };
    tracing::debug!(count = words.len(), "vocabulary updated");
    tui.vocabulary.replace(words);

    let count = tui.vocabulary.len();
    if count == 0 && matches!(tui.screen, Screen::Flashcards(_)) {
        tui.navigate(Screen::EmptyVocabulary);
    } else if count > 0 && matches!(tui.screen, Screen::EmptyVocabulary) {
        tui.navigate(Screen::Flashcards(FlashcardView::new()));
    } else if let Screen::Flashcards(view) = &mut tui.screen {
        view.clamp(count);
    }
}

fn word_added(app: &mut AppState, french: &str, result: Result<(), String>) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            tracing::info!("word added");
            if app
                .overlay
                .as_mut()
                .and_then(Overlay::as_add_word_mut)
                .is_some()
            {
                app.overlay = None;
            }
            app.tui.notice = Some(format!("Added \"{french}\""));
            // Live subscriptions pick the write up on their own.
            if app.tui.query_mode == QueryMode::Snapshot {
                subscribe_vocabulary(&mut app.tui).into_iter().collect()
            } else {
                vec![]
            }
        }
        Err(message) => {
            tracing::warn!(%message, "add word failed");
            match app.overlay.as_mut().and_then(Overlay::as_add_word_mut) {
                Some(form) => form.fail(message),
                None => app.tui.notice = Some(format!("Could not save \"{french}\": {message}")),
            }
            vec![]
        }
    }
}
