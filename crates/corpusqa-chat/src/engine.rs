//! The conversational answerer: retrieve, generate, record.

use corpusqa_core::error::RemoteError;
use corpusqa_core::traits::CompletionModel;
use corpusqa_core::types::{DocumentChunk, Turn};
use corpusqa_vector::Retriever;
use std::sync::Arc;
use tracing::info;

use crate::session::SessionStore;

/// Answer plus the chunk ids it was grounded on.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<String>,
}

pub struct ChatEngine {
    retriever: Retriever,
    model: Arc<dyn CompletionModel>,
    sessions: SessionStore,
    retrieval_k: usize,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("retrieval_k", &self.retrieval_k)
            .finish_non_exhaustive()
    }
}

impl ChatEngine {
    pub fn new(
        retriever: Retriever,
        model: Arc<dyn CompletionModel>,
        retrieval_k: usize,
        max_session_turns: Option<usize>,
    ) -> Self {
        Self {
            retriever,
            model,
            sessions: SessionStore::new(max_session_turns),
            retrieval_k,
        }
    }

    /// Answer `question` within the named session.
    ///
    /// The session lock is held across the whole retrieve-generate-record
    /// sequence, so two requests for the same session cannot interleave and
    /// each sees the history the previous one recorded. The turn is recorded
    /// only on success; a failed generation leaves the history untouched.
    pub async fn answer(
        &self,
        session_id: Option<&str>,
        question: &str,
    ) -> Result<ChatResponse, RemoteError> {
        let slot = self.sessions.resolve(session_id);
        let mut session = slot.lock().await;

        let hits = self.retriever.retrieve(question, self.retrieval_k).await?;
        let context: Vec<DocumentChunk> = hits.into_iter().map(|h| h.chunk).collect();

        let answer = self
            .model
            .generate(session.turns(), &context, question)
            .await?;

        session.record(
            Turn {
                question: question.to_string(),
                answer: answer.clone(),
            },
            self.sessions.max_turns(),
        );

        let sources: Vec<String> = context.into_iter().map(|c| c.id).collect();
        info!(
            turns = session.turns().len(),
            sources = sources.len(),
            "answered question"
        );
        Ok(ChatResponse { answer, sources })
    }
}
