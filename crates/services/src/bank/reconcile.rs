use std::sync::Arc;

use quiz_core::model::{Question, decode_question_list};
use storage::repository::DurableStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Full replacement of the override set fetched from the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileEvent {
    pub overrides: Vec<Question>,
}

/// Background fetch of the durable override set.
///
/// Yields nothing when the fetch fails or the token is cancelled, so the
/// caller keeps its local state.
#[derive(Debug)]
pub struct Reconciliation {
    token: CancellationToken,
    handle: JoinHandle<Option<ReconcileEvent>>,
}

impl Reconciliation {
    pub(crate) fn spawn(durable: Arc<dyn DurableStore>, token: CancellationToken) -> Self {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = task_token.cancelled() => {
                    tracing::info!("override reconcile cancelled");
                    None
                }
                fetched = durable.read_overrides() => match fetched {
                    Ok(raw) => Some(ReconcileEvent {
                        overrides: decode_overrides(&raw, "durable store"),
                    }),
                    Err(err) => {
                        tracing::warn!(error = %err, "override fetch failed; keeping local state");
                        None
                    }
                },
            }
        });
        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the fetch; `None` when it failed or was cancelled.
    pub async fn outcome(self) -> Option<ReconcileEvent> {
        let event = match self.handle.await {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "override reconcile task failed");
                None
            }
        };
        if self.token.is_cancelled() {
            return None;
        }
        event
    }
}

/// Decode a stored override set; anything that is not a list reads as empty.
pub(crate) fn decode_overrides(raw: &str, source: &'static str) -> Vec<Question> {
    match decode_question_list(raw) {
        Ok(decoded) => {
            if decoded.skipped > 0 {
                tracing::warn!(source, skipped = decoded.skipped, "dropped undecodable stored questions");
            }
            decoded.questions
        }
        Err(err) => {
            tracing::warn!(source, error = %err, "malformed override set; treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_list_content_reads_as_empty() {
        assert!(decode_overrides(r#"{"questions": []}"#, "test").is_empty());
        assert!(decode_overrides("not json", "test").is_empty());
    }

    #[test]
    fn undecodable_elements_are_dropped() {
        let raw = r#"[
            {"id": 51, "section": "grammar", "question": "Q", "correctAnswer": "a",
             "options": [{"id": "a", "text": "A"}, {"id": "b", "text": "B"}]},
            {"id": "nope"}
        ]"#;
        let overrides = decode_overrides(raw, "test");
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].id.value(), 51);
    }
}
