//! Dashboard shown after sign-in.

mod render;

pub use render::render_home;

use crate::actions::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Flashcards,
    SentenceBuilder,
    AddWord,
    SignOut,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Flashcards,
        MenuItem::SentenceBuilder,
        MenuItem::AddWord,
        MenuItem::SignOut,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Flashcards => "Practice Flashcards",
            MenuItem::SentenceBuilder => "Sentence Builder",
            MenuItem::AddWord => "Add New Word",
            MenuItem::SignOut => "Sign Out",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            MenuItem::Flashcards => 'f',
            MenuItem::SentenceBuilder => 's',
            MenuItem::AddWord => 'a',
            MenuItem::SignOut => 'l',
        }
    }

    pub fn action(self) -> Action {
        match self {
            MenuItem::Flashcards => Action::OpenFlashcards,
            MenuItem::SentenceBuilder => Action::OpenSentenceBuilder,
            MenuItem::AddWord => Action::OpenAddWord,
            MenuItem::SignOut => Action::Logout,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeState {
    pub selected: usize,
}

impl HomeState {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(MenuItem::ALL.len() - 1);
    }

    pub fn selected_item(self) -> MenuItem {
        MenuItem::ALL[self.selected.min(MenuItem::ALL.len() - 1)]
    }
}
