//! chatbot-engine: Headless core of the chatbot client
//!
//! This crate provides everything except the terminal, including:
//! - Message model and the persisted conversation store
//! - Pluggable key-value storage (file and in-memory)
//! - The model catalogue and the HTTP chat dispatcher
//! - A chat session that serializes outstanding requests
//! - Configuration

pub mod config;
pub mod dispatch;
pub mod message;
pub mod model;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::{Config, ConfigError, CONFIG_FILE};
pub use dispatch::{
    ChatRequest, ChatResponse, DispatchError, Dispatcher, HttpDispatcher, DEFAULT_ENDPOINT,
};
pub use message::{Message, Sender};
pub use model::{ModelChoice, UnknownModel};
pub use session::{ChatSession, OutboundRequest, RequestId, RequestStatus, SendOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{ConversationStore, HISTORY_KEY};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
