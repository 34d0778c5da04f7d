//! Controller tests against the in-memory backend.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use parle_core::gateway::memory::MemoryBackend;
use parle_core::gateway::{Backend, PROFILE_WARNING, QueryMode};
use parle_tui::events::UiEvent;
use parle_tui::features::vocabulary::VocabularyStatus;
use parle_tui::overlays::Overlay;
use parle_tui::state::{AppState, Screen};
use parle_tui::{Controller, RuntimeOptions};

const WAIT: Duration = Duration::from_secs(5);

fn controller(memory: &MemoryBackend, mode: QueryMode) -> Controller {
    let options = RuntimeOptions {
        query_mode: mode,
        ..RuntimeOptions::default()
    };
    Controller::new(Backend::memory(memory.clone()), options).unwrap()
}

fn key(c: &mut Controller, code: KeyCode) {
    key_with(c, code, KeyModifiers::NONE);
}

fn key_with(c: &mut Controller, code: KeyCode, modifiers: KeyModifiers) {
    c.dispatch(UiEvent::Terminal(Event::Key(KeyEvent::new(code, modifiers))));
}

fn type_text(c: &mut Controller, text: &str) {
    for ch in text.chars() {
        key(c, KeyCode::Char(ch));
    }
}

fn login(c: &mut Controller, email: &str, password: &str) {
    type_text(c, email);
    key(c, KeyCode::Tab);
    type_text(c, password);
    key(c, KeyCode::Enter);
}

fn on_home_with(count: usize) -> impl Fn(&AppState) -> bool {
    move |app| {
        matches!(app.tui.screen, Screen::Home(_))
            && app.tui.vocabulary.status == VocabularyStatus::Ready
            && app.tui.vocabulary.len() == count
    }
}

fn form_error(app: &AppState) -> Option<&str> {
    match &app.tui.screen {
        Screen::Login(form) => form.error.as_deref(),
        Screen::Register(form) => form.error.as_deref(),
        _ => None,
    }
}

#[tokio::test]
async fn test_login_loads_words_and_opens_first_card() {
    let memory = MemoryBackend::new();
    let session = memory.add_account("marie@example.com", "secret1");
    for (fr, en) in [("chat", "cat"), ("chien", "dog"), ("pain", "bread")] {
        memory.insert_word(&session.user_id, fr, en);
    }
    memory.insert_word("someone-else", "lait", "milk");

    let mut c = controller(&memory, QueryMode::Live);
    login(&mut c, "marie@example.com", "secret1");
    assert!(c.run_until(WAIT, on_home_with(3)).await);
    assert_eq!(c.state.tui.user_id(), Some(session.user_id.as_str()));

    key(&mut c, KeyCode::Char('f'));
    let Screen::Flashcards(view) = c.state.tui.screen else {
        panic!("expected flashcards, got {}", c.state.tui.screen.name());
    };
    assert_eq!(view.index, 0);
    assert!(!view.revealed);
    assert_eq!(c.state.tui.vocabulary.get(0).unwrap().french_word, "chat");
}

#[tokio::test]
async fn test_short_registration_never_reaches_the_gateway() {
    let memory = MemoryBackend::new();
    let mut c = controller(&memory, QueryMode::Live);

    key_with(&mut c, KeyCode::Char('r'), KeyModifiers::CONTROL);
    type_text(&mut c, "new@example.com");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "abc");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "abc");
    key(&mut c, KeyCode::Enter);

    assert_eq!(
        form_error(&c.state),
        Some("Password must be at least 6 characters")
    );
    assert!(!c.state.tui.screen.is_loading());
    assert_eq!(memory.auth_calls(), 0);
}

#[tokio::test]
async fn test_mismatched_confirmation_is_rejected_locally() {
    let memory = MemoryBackend::new();
    let mut c = controller(&memory, QueryMode::Live);

    key_with(&mut c, KeyCode::Char('r'), KeyModifiers::CONTROL);
    type_text(&mut c, "new@example.com");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "abcdef");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "xyzxyz");
    key(&mut c, KeyCode::Enter);

    assert_eq!(form_error(&c.state), Some("Passwords don't match"));
    assert_eq!(memory.auth_calls(), 0);
}

#[tokio::test]
async fn test_wrong_password_stays_on_login_with_error() {
    let memory = MemoryBackend::new();
    memory.add_account("marie@example.com", "secret1");
    let mut c = controller(&memory, QueryMode::Live);

    login(&mut c, "marie@example.com", "wrong-password");
    let failed = c
        .run_until(WAIT, |app| form_error(app).is_some() && !app.tui.screen.is_loading())
        .await;
    assert!(failed);
    assert!(matches!(c.state.tui.screen, Screen::Login(_)));
    assert!(c.state.tui.session.is_none());
}

#[tokio::test]
async fn test_sign_out_ignores_later_changes_to_the_old_list() {
    let memory = MemoryBackend::new();
    let session = memory.add_account("marie@example.com", "secret1");
    memory.insert_word(&session.user_id, "chat", "cat");

    let mut c = controller(&memory, QueryMode::Live);
    login(&mut c, "marie@example.com", "secret1");
    assert!(c.run_until(WAIT, on_home_with(1)).await);

    key(&mut c, KeyCode::Char('l'));
    assert!(matches!(c.state.tui.screen, Screen::Login(_)));
    assert!(c.state.tui.session.is_none());
    assert!(c.state.tui.vocabulary.is_empty());

    memory.insert_word(&session.user_id, "chien", "dog");
    let applied = c
        .run_until(Duration::from_millis(200), |app| {
            !app.tui.vocabulary.is_empty()
        })
        .await;
    assert!(!applied);
    assert!(c.state.tui.session.is_none());
}

#[tokio::test]
async fn test_added_word_arrives_through_the_live_list() {
    let memory = MemoryBackend::new();
    memory.add_account("marie@example.com", "secret1");
    let mut c = controller(&memory, QueryMode::Live);
    login(&mut c, "marie@example.com", "secret1");
    assert!(c.run_until(WAIT, on_home_with(0)).await);

    key(&mut c, KeyCode::Char('a'));
    assert!(c.state.overlay.is_some());
    type_text(&mut c, "fromage");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "cheese");
    key(&mut c, KeyCode::Enter);

    assert!(
        c.run_until(WAIT, |app| app.overlay.is_none() && app.tui.vocabulary.len() == 1)
            .await
    );
    assert_eq!(c.state.tui.notice.as_deref(), Some("Added \"fromage\""));
}

#[tokio::test]
async fn test_snapshot_mode_requeries_after_adding_a_word() {
    let memory = MemoryBackend::new();
    memory.add_account("marie@example.com", "secret1");
    let mut c = controller(&memory, QueryMode::Snapshot);
    login(&mut c, "marie@example.com", "secret1");
    assert!(c.run_until(WAIT, on_home_with(0)).await);

    key(&mut c, KeyCode::Char('a'));
    type_text(&mut c, "pomme");
    key(&mut c, KeyCode::Enter);

    assert!(c.run_until(WAIT, on_home_with(1)).await);
    assert_eq!(c.state.tui.vocabulary.get(0).unwrap().english_translation, "");
}

#[tokio::test]
async fn test_failed_profile_write_still_signs_in_with_notice() {
    let memory = MemoryBackend::new();
    memory.set_fail_profile_writes(true);
    let mut c = controller(&memory, QueryMode::Live);

    key_with(&mut c, KeyCode::Char('r'), KeyModifiers::CONTROL);
    type_text(&mut c, "new@example.com");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "abcdef");
    key(&mut c, KeyCode::Tab);
    type_text(&mut c, "abcdef");
    key(&mut c, KeyCode::Enter);

    assert!(
        c.run_until(WAIT, |app| matches!(app.tui.screen, Screen::Home(_)))
            .await
    );
    assert_eq!(c.state.tui.notice.as_deref(), Some(PROFILE_WARNING));
    assert!(c.state.tui.session.is_some());
}

#[tokio::test]
async fn test_failed_read_is_reported_on_home() {
    let memory = MemoryBackend::new();
    let session = memory.add_account("marie@example.com", "secret1");
    memory.insert_word(&session.user_id, "chat", "cat");
    memory.set_fail_reads(true);

    let mut c = controller(&memory, QueryMode::Snapshot);
    login(&mut c, "marie@example.com", "secret1");
    assert!(
        c.run_until(WAIT, |app| {
            matches!(app.tui.screen, Screen::Home(_))
                && matches!(app.tui.vocabulary.status, VocabularyStatus::Failed(_))
        })
        .await
    );
    assert!(c.state.tui.vocabulary.is_empty());
    assert!(c.state.tui.session.is_some());
}

#[tokio::test]
async fn test_failed_add_keeps_form_open_with_error() {
    let memory = MemoryBackend::new();
    memory.add_account("marie@example.com", "secret1");
    let mut c = controller(&memory, QueryMode::Live);
    login(&mut c, "marie@example.com", "secret1");
    assert!(c.run_until(WAIT, on_home_with(0)).await);

    memory.set_fail_writes(true);
    key(&mut c, KeyCode::Char('a'));
    type_text(&mut c, "fromage");
    key(&mut c, KeyCode::Enter);

    assert!(
        c.run_until(WAIT, |app| matches!(
            &app.overlay,
            Some(Overlay::AddWord(form)) if form.error.is_some()
        ))
        .await
    );
    assert!(c.state.tui.vocabulary.is_empty());
}
