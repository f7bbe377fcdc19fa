//! Conversation store.
//!
//! Holds the ordered message list in memory and mirrors it to a
//! [`KeyValueStore`] under [`HISTORY_KEY`]. Persistence happens as a side
//! effect of every mutation; storage failures are logged and never surface
//! to the caller.

use tracing::{debug, warn};

use crate::message::Message;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the persisted conversation snapshot.
pub const HISTORY_KEY: &str = "chatHistory";

/// Ordered, persisted list of messages.
#[derive(Debug)]
pub struct ConversationStore<S> {
    storage: S,
    messages: Vec<Message>,
    revision: u64,
}

impl<S: KeyValueStore> ConversationStore<S> {
    /// Load the conversation from `storage`.
    ///
    /// A missing snapshot yields an empty conversation. A snapshot that is
    /// not text, or does not parse as a list of messages, is removed and also
    /// yields an empty conversation.
    pub fn load(mut storage: S) -> Self {
        let parsed = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Message>>(&raw).map_err(|e| e.to_string()),
            Ok(None) => Ok(Vec::new()),
            Err(e @ StorageError::Corrupt { .. }) => Err(e.to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read conversation history");
                Ok(Vec::new())
            }
        };

        let messages = parsed.unwrap_or_else(|error| {
            warn!(%error, "Discarding corrupt conversation history");
            if let Err(e) = storage.remove(HISTORY_KEY) {
                warn!(error = %e, "Failed to remove corrupt conversation history");
            }
            Vec::new()
        });
        debug!(count = messages.len(), "Loaded conversation history");

        Self {
            storage,
            messages,
            revision: 0,
        }
    }

    /// Append a message and persist the new state.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
        self.persist();
    }

    /// Empty the conversation and remove the persisted snapshot.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.revision += 1;
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            warn!(error = %e, "Failed to remove conversation history");
        }
        debug!("Conversation cleared");
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Counter bumped on every mutation.
    ///
    /// Renderers compare it against the last value they saw to know when to
    /// jump to the latest message.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Borrow the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        // An empty list is never written; clear() removes the key instead.
        if self.messages.is_empty() {
            return;
        }

        let json = match serde_json::to_string(&self.messages) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize conversation history");
                return;
            }
        };

        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            warn!(error = %e, "Failed to persist conversation history");
        }
    }
}
