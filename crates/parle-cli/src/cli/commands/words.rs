//! Vocabulary command handlers.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use futures_util::StreamExt;
use parle_core::config::Config;
use parle_core::gateway::{Backend, QueryMode};
use parle_core::model::{Flashcard, Session};
use parle_core::validation::validate_new_word;

fn signed_in(backend: &Backend) -> Result<Session> {
    backend
        .auth
        .current_session()
        .context("Not signed in. Run `parle login --email <EMAIL>` first.")
}

fn render_table(words: &[Flashcard]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(["#", "French", "English"]);
    for (i, word) in words.iter().enumerate() {
        table.add_row([
            (i + 1).to_string(),
            word.french_word.clone(),
            word.english_translation.clone(),
        ]);
    }
    table.to_string()
}

pub async fn list(config: &Config, offline: bool) -> Result<()> {
    let backend = Backend::from_config(config, offline)?;
    let session = signed_in(&backend)?;

    let mut stream = backend
        .store
        .query_words(&session.user_id, QueryMode::Snapshot);
    let words = stream
        .next()
        .await
        .context("Vocabulary query ended without a result")?
        .context("Failed to load your vocabulary")?;

    if words.is_empty() {
        println!("No words yet. Add one with `parle words add <FRENCH> <ENGLISH>`.");
        return Ok(());
    }
    println!("{}", render_table(&words));
    println!("{} word(s)", words.len());
    Ok(())
}

pub async fn add(config: &Config, offline: bool, french: &str, english: &str) -> Result<()> {
    let (french, english) = validate_new_word(french, english)?;

    let backend = Backend::from_config(config, offline)?;
    let session = signed_in(&backend)?;
    backend
        .store
        .add_word(&session.user_id, &french, &english)
        .await
        .context("Failed to add word")?;

    println!("Added \"{french}\"");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_words_in_order() {
        let words = vec![
            Flashcard::new("u1", "chat", "cat"),
            Flashcard::new("u1", "chien", "dog"),
        ];
        let table = render_table(&words);
        let chat = table.find("chat").unwrap();
        let chien = table.find("chien").unwrap();
        assert!(chat < chien);
        assert!(table.contains("English"));
    }
}
