//! Flashcard practice: one card at a time, French side first.

mod render;

pub use render::{render_empty_vocabulary, render_flashcards, render_sentence_builder};

/// Position in the deck and which side is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashcardView {
    pub index: usize,
    /// Translation side showing.
    pub revealed: bool,
}

impl FlashcardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flip(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Moves forward one card; a no-op on the last card.
    pub fn next(&mut self, count: usize) {
        if self.index + 1 < count {
            self.index += 1;
            self.revealed = false;
        }
    }

    /// Moves back one card; a no-op on the first card.
    pub fn prev(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.revealed = false;
        }
    }

    /// Pulls the index back into a deck that shrank to `count` (> 0) cards.
    pub fn clamp(&mut self, count: usize) {
        let last = count.saturating_sub(1);
        if self.index > last {
            self.index = last;
            self.revealed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_clamps_at_last_card() {
        let mut view = FlashcardView::new();
        view.next(2);
        assert_eq!(view.index, 1);
        view.flip();
        view.next(2);
        assert_eq!(view.index, 1);
        assert!(view.revealed, "no-op next keeps the card revealed");
    }

    #[test]
    fn test_prev_clamps_at_first_card() {
        let mut view = FlashcardView::new();
        view.flip();
        view.prev();
        assert_eq!(view.index, 0);
        assert!(view.revealed);
    }

    #[test]
    fn test_moving_hides_translation() {
        let mut view = FlashcardView::new();
        view.flip();
        view.next(3);
        assert_eq!(view.index, 1);
        assert!(!view.revealed);
        view.flip();
        view.prev();
        assert!(!view.revealed);
    }

    #[test]
    fn test_flip_twice_restores() {
        let mut view = FlashcardView { index: 2, revealed: false };
        view.flip();
        view.flip();
        assert_eq!(view, FlashcardView { index: 2, revealed: false });
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut view = FlashcardView { index: 4, revealed: true };
        view.clamp(5);
        assert_eq!(view.index, 4);
        assert!(view.revealed);
        view.clamp(2);
        assert_eq!(view, FlashcardView { index: 1, revealed: false });
    }
}
