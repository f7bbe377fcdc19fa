//! Chat session: conversation store plus explicit request tracking.
//!
//! Every submission becomes a tracked request with its own id. Requests are
//! serialized: at most one is in flight, the rest wait in FIFO order, so bot
//! replies always land in the order the user messages were sent. The
//! dispatcher's timeout bounds how long the head of the queue can hold the
//! rest back.
//!
//! The session never performs I/O on its own. [`ChatSession::submit`] and
//! [`ChatSession::resolve`] hand back the request that should be sent next,
//! which lets an event loop own the network tasks while all state changes
//! happen on the loop itself. [`ChatSession::send`] drives the same cycle
//! inline for callers that simply want to await a reply.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::message::Message;
use crate::model::ModelChoice;
use crate::storage::KeyValueStore;
use crate::store::ConversationStore;

/// Identifier assigned to each submission.
pub type RequestId = u64;

/// Lifecycle of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting for an earlier request to finish.
    Queued,
    /// Handed out for dispatch; awaiting `resolve`.
    InFlight,
}

/// A request that should be dispatched now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub id: RequestId,
    pub model: ModelChoice,
    pub user_message: String,
}

#[derive(Debug)]
struct TrackedRequest {
    request: OutboundRequest,
    status: RequestStatus,
}

/// Result of [`ChatSession::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The text was empty or whitespace-only; nothing happened.
    Blank,
    /// The service replied; the reply was appended.
    Replied(String),
    /// The dispatch failed; only the user message was appended.
    NoReply,
}

/// Conversation plus the queue of outstanding requests.
#[derive(Debug)]
pub struct ChatSession<S> {
    store: ConversationStore<S>,
    model: ModelChoice,
    requests: VecDeque<TrackedRequest>,
    next_id: RequestId,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Create a session over a loaded store.
    pub fn new(store: ConversationStore<S>, model: ModelChoice) -> Self {
        Self {
            store,
            model,
            requests: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Load the conversation from `storage` and start a session.
    pub fn load(storage: S, model: ModelChoice) -> Self {
        Self::new(ConversationStore::load(storage), model)
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Currently selected model.
    pub fn model(&self) -> ModelChoice {
        self.model
    }

    /// Select the model used for subsequent submissions.
    ///
    /// Requests already queued keep the model they were submitted with.
    pub fn select_model(&mut self, model: ModelChoice) {
        if model != self.model {
            info!(model = model.id(), "Model selected");
        }
        self.model = model;
    }

    /// Submit a user message.
    ///
    /// Blank text is ignored. Otherwise the message is appended and queued;
    /// the return value is the request to dispatch now, or `None` if another
    /// request is still in flight.
    pub fn submit(&mut self, text: &str) -> Option<OutboundRequest> {
        if text.trim().is_empty() {
            return None;
        }

        self.store.append(Message::user(text));

        let id = self.next_id;
        self.next_id += 1;
        self.requests.push_back(TrackedRequest {
            request: OutboundRequest {
                id,
                model: self.model,
                user_message: text.to_string(),
            },
            status: RequestStatus::Queued,
        });
        debug!(request_id = id, queued = self.requests.len(), "Message submitted");

        self.release_next()
    }

    /// Apply the outcome of an in-flight request.
    ///
    /// Returns the next request to dispatch, if one was waiting.
    pub fn resolve(
        &mut self,
        id: RequestId,
        result: Result<String, DispatchError>,
    ) -> Option<OutboundRequest> {
        match self.requests.front() {
            Some(front) if front.request.id == id && front.status == RequestStatus::InFlight => {}
            _ => {
                warn!(request_id = id, "Ignoring result for request that is not in flight");
                return None;
            }
        }
        self.requests.pop_front();

        match result {
            Ok(reply) => {
                debug!(request_id = id, "Reply received");
                self.store.append(Message::bot(reply));
            }
            Err(e) => {
                warn!(request_id = id, error = %e, "Chat request failed");
            }
        }

        self.release_next()
    }

    /// Status of a tracked request, or `None` once it has resolved.
    pub fn status(&self, id: RequestId) -> Option<RequestStatus> {
        self.requests
            .iter()
            .find(|t| t.request.id == id)
            .map(|t| t.status)
    }

    /// Number of requests queued or in flight.
    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Clear the conversation and drop queued requests that were never sent.
    ///
    /// A request already in flight cannot be recalled; its reply is appended
    /// to the fresh conversation when it arrives.
    pub fn clear(&mut self) {
        let before = self.requests.len();
        self.requests.retain(|t| t.status == RequestStatus::InFlight);
        let dropped = before - self.requests.len();
        if dropped > 0 {
            debug!(dropped, "Dropped queued requests");
        }
        self.store.clear();
    }

    /// Submit `text` and drive the queue until it is empty.
    pub async fn send<D: Dispatcher + ?Sized>(
        &mut self,
        dispatcher: &D,
        text: &str,
    ) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Blank;
        }

        let own_id = self.next_id;
        let mut next = self.submit(text);
        let mut outcome = SendOutcome::NoReply;

        while let Some(request) = next {
            let result = dispatcher
                .dispatch(request.model.id(), &request.user_message)
                .await;
            if request.id == own_id {
                if let Ok(reply) = &result {
                    outcome = SendOutcome::Replied(reply.clone());
                }
            }
            next = self.resolve(request.id, result);
        }

        outcome
    }

    fn release_next(&mut self) -> Option<OutboundRequest> {
        if self
            .requests
            .iter()
            .any(|t| t.status == RequestStatus::InFlight)
        {
            return None;
        }

        let front = self.requests.front_mut()?;
        front.status = RequestStatus::InFlight;
        Some(front.request.clone())
    }
}
