//! HTTP serving process: startup indexing state machine plus the axum
//! routes that expose the chat engine and its health.

pub mod routes;
pub mod startup;
pub mod state;
