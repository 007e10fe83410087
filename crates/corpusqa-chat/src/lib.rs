//! Session-aware conversational answering over an indexed corpus.

pub mod engine;
pub mod session;

pub use engine::{ChatEngine, ChatResponse};
pub use session::{Session, SessionStore, DEFAULT_SESSION};
