//! Published serving state.
//!
//! The indexing task runs in the background while HTTP serving is already
//! live, so handlers read a snapshot of this state on every request. The
//! write lock is taken only at state transitions; handlers clone the engine
//! handle out of the read guard and never hold the lock across an await.

use corpusqa_chat::ChatEngine;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Default)]
pub enum ServingState {
    #[default]
    Uninitialized,
    Indexing,
    Ready(Arc<ChatEngine>),
    Failed(String),
}

impl ServingState {
    pub fn label(&self) -> &'static str {
        match self {
            ServingState::Uninitialized => "uninitialized",
            ServingState::Indexing => "indexing",
            ServingState::Ready(_) => "ready",
            ServingState::Failed(_) => "failed",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    state: Arc<RwLock<ServingState>>,
    chat_model: Arc<str>,
}

impl AppState {
    pub fn new(chat_model: &str) -> Self {
        Self {
            state: Arc::new(RwLock::new(ServingState::Uninitialized)),
            chat_model: Arc::from(chat_model),
        }
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    pub fn publish(&self, next: ServingState) {
        tracing::info!(state = next.label(), "serving state transition");
        *self.state.write() = next;
    }

    pub fn snapshot(&self) -> ServingState {
        self.state.read().clone()
    }
}
