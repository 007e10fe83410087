//! Per-session conversation history.
//!
//! Sessions are partitioned by id; callers that present no id share one
//! implicit conversation. Each session carries its own async mutex so
//! same-session requests serialize while distinct sessions proceed in
//! parallel. The outer map lock is never held across an await.

use corpusqa_core::types::Turn;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Session id used when a request carries none.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a completed turn, dropping the oldest turns beyond `max_turns`
    /// when a bound is configured.
    pub fn record(&mut self, turn: Turn, max_turns: Option<usize>) {
        self.turns.push(turn);
        if let Some(max) = max_turns {
            if self.turns.len() > max {
                let excess = self.turns.len() - max;
                self.turns.drain(..excess);
            }
        }
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<AsyncMutex<Session>>>>,
    max_turns: Option<usize>,
}

impl SessionStore {
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns,
        }
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Handle for the session named by `id`, creating it on first use.
    pub fn resolve(&self, id: Option<&str>) -> Arc<AsyncMutex<Session>> {
        let key = id.unwrap_or(DEFAULT_SESSION);
        let mut sessions = self.sessions.lock();
        Arc::clone(
            sessions
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(Session::default()))),
        )
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> Turn {
        Turn {
            question: format!("q{}", n),
            answer: format!("a{}", n),
        }
    }

    #[test]
    fn missing_id_maps_to_the_default_session() {
        let store = SessionStore::new(None);
        let a = store.resolve(None);
        let b = store.resolve(Some(DEFAULT_SESSION));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn distinct_ids_are_partitioned() {
        let store = SessionStore::new(None);
        let a = store.resolve(Some("alice"));
        let b = store.resolve(Some("bob"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn unbounded_history_keeps_every_turn() {
        let mut session = Session::default();
        for n in 0..10 {
            session.record(turn(n), None);
        }
        assert_eq!(session.turns().len(), 10);
        assert_eq!(session.turns()[0].question, "q0");
    }

    #[test]
    fn bounded_history_drops_oldest_turns() {
        let mut session = Session::default();
        for n in 0..5 {
            session.record(turn(n), Some(3));
        }
        let questions: Vec<&str> = session.turns().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, ["q2", "q3", "q4"]);
    }
}
