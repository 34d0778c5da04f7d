//! Vocabulary store handlers.

use std::sync::Arc;

use futures_util::StreamExt;
use parle_core::gateway::{QueryMode, VocabularyStore};
use tokio_util::sync::CancellationToken;

use super::with_cancel;
use crate::common::TaskId;
use crate::events::{UiEvent, VocabularyUiEvent};
use crate::runtime::inbox::UiEventSender;

/// Forwards every list from the store to the inbox until the stream ends
/// or `cancel` fires.
pub async fn subscribe_vocabulary(
    store: Arc<dyn VocabularyStore>,
    task: TaskId,
    owner_id: String,
    mode: QueryMode,
    tx: UiEventSender,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    tracing::debug!(id = task.0, mode = mode.display_name(), "vocabulary subscription started");
    let mut stream = store.query_words(&owner_id, mode);
    while let Some(Some(item)) = with_cancel(cancel.as_ref(), stream.next()).await {
        let event = UiEvent::Vocabulary(VocabularyUiEvent::Snapshot {
            task,
            owner_id: owner_id.clone(),
            result: item.map_err(|e| e.to_string()),
        });
        if tx.send(event).is_err() {
            break;
        }
    }
    tracing::debug!(id = task.0, "vocabulary subscription closed");
    UiEvent::Vocabulary(VocabularyUiEvent::Closed)
}

pub async fn add_word(
    store: Arc<dyn VocabularyStore>,
    owner_id: String,
    french: String,
    english: String,
) -> UiEvent {
    let result = store
        .add_word(&owner_id, &french, &english)
        .await
        .map_err(|e| e.to_string());
    UiEvent::Vocabulary(VocabularyUiEvent::WordAdded { french, result })
}
