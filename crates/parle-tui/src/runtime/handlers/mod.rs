//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return `UiEvent`. The runtime spawns
//! them and sends the result to the inbox. They never touch `AppState`.

mod auth;
mod google;
mod vocabulary;

use std::future::Future;

pub use auth::{AuthRequest, authenticate};
pub use google::federated_token;
use tokio_util::sync::CancellationToken;
pub use vocabulary::{add_word, subscribe_vocabulary};

/// Runs `fut` unless `cancel` fires first.
async fn with_cancel<F: Future>(cancel: Option<&CancellationToken>, fut: F) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            () = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_with_cancel_stops_pending_future() {
        let token = CancellationToken::new();
        token.cancel();
        let out = with_cancel(Some(&token), tokio::time::sleep(Duration::from_secs(60))).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_with_cancel_passes_through() {
        let token = CancellationToken::new();
        assert_eq!(with_cancel(Some(&token), async { 7 }).await, Some(7));
        assert_eq!(with_cancel(None, async { 8 }).await, Some(8));
    }
}
