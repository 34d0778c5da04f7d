//! The signed-in user's word list and its load status.

use parle_core::model::Flashcard;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VocabularyStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last read failed; the previous list is kept.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct VocabularyState {
    pub words: Vec<Flashcard>,
    pub status: VocabularyStatus,
}

impl VocabularyState {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.words.get(index)
    }

    /// Replaces the whole list.
    pub fn replace(&mut self, words: Vec<Flashcard>) {
        self.words = words;
        self.status = VocabularyStatus::Ready;
    }

    pub fn fail(&mut self, message: String) {
        self.status = VocabularyStatus::Failed(message);
    }

    pub fn start_loading(&mut self) {
        self.status = VocabularyStatus::Loading;
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.status = VocabularyStatus::Idle;
    }

    /// One-line summary for the dashboard.
    pub fn summary(&self) -> String {
        match &self.status {
            VocabularyStatus::Idle | VocabularyStatus::Loading if self.words.is_empty() => {
                "Loading your vocabulary...".to_string()
            }
            _ => {
                let count = self.words.len();
                let noun = if count == 1 { "word" } else { "words" };
                format!("Your vocabulary: {count} {noun}")
            }
        }
    }
}
