//! Domain records: flashcards, sessions and user profiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Collection holding every user's word pairs.
pub const VOCABULARY_COLLECTION: &str = "user_vocabulary";

pub const FIELD_USER_ID: &str = "userId";
pub const FIELD_FRENCH_WORD: &str = "frenchWord";
pub const FIELD_ENGLISH_TRANSLATION: &str = "englishTranslation";

pub const DEFAULT_BACKGROUND: &str = "default";

/// A flat map of string fields as read from (or written to) the store.
///
/// Fields whose stored value is not a string are absent from the map.
pub type Document = BTreeMap<String, String>;

/// One French/English word pair owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub french_word: String,
    pub english_translation: String,
    pub owner_id: String,
}

impl Flashcard {
    pub fn new(
        owner_id: impl Into<String>,
        french_word: impl Into<String>,
        english_translation: impl Into<String>,
    ) -> Self {
        Self {
            french_word: french_word.into(),
            english_translation: english_translation.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Decodes a stored record.
    ///
    /// Returns `None` when `frenchWord` is missing or blank; a missing
    /// translation or owner decodes as the empty string.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let french_word = doc.get(FIELD_FRENCH_WORD)?;
        if french_word.trim().is_empty() {
            return None;
        }
        Some(Self {
            french_word: french_word.clone(),
            english_translation: doc
                .get(FIELD_ENGLISH_TRANSLATION)
                .cloned()
                .unwrap_or_default(),
            owner_id: doc.get(FIELD_USER_ID).cloned().unwrap_or_default(),
        })
    }

    pub fn to_document(&self) -> Document {
        Document::from([
            (FIELD_USER_ID.to_string(), self.owner_id.clone()),
            (FIELD_FRENCH_WORD.to_string(), self.french_word.clone()),
            (
                FIELD_ENGLISH_TRANSLATION.to_string(),
                self.english_translation.clone(),
            ),
        ])
    }
}

/// Decodes every well-formed record, dropping the rest in order.
pub fn decode_flashcards<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Vec<Flashcard> {
    docs.into_iter().filter_map(Flashcard::from_document).collect()
}

/// The signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

/// Profile record written on registration and first federated sign-in.
///
/// `created_at` is stamped by the store, so it is not part of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub selected_background: String,
}

impl UserProfile {
    pub fn new(user_id: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            username: username_from_email(email).to_string(),
            selected_background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    /// Profile for a federated identity, which may have no email.
    pub fn federated(user_id: &str, email: Option<&str>) -> Self {
        match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Self::new(user_id, email),
            None => Self::new(user_id, &format!("no-email-{user_id}@example.com")),
        }
    }

    /// Path of the profile document relative to the database root.
    pub fn document_path(&self) -> String {
        format!("users/{0}/users/{0}", self.user_id)
    }

    pub fn to_document(&self) -> Document {
        Document::from([
            (FIELD_USER_ID.to_string(), self.user_id.clone()),
            ("email".to_string(), self.email.clone()),
            ("username".to_string(), self.username.clone()),
            (
                "selectedBackground".to_string(),
                self.selected_background.clone(),
            ),
        ])
    }
}

/// The part of an email before `@` (the whole string if there is none).
pub fn username_from_email(email: &str) -> &str {
    email.split_once('@').map_or(email, |(name, _)| name)
}
