use crate::error::RemoteError;
use crate::types::{DocumentChunk, Turn};
use async_trait::async_trait;

/// Turns text into fixed-dimensionality vectors via a remote capability.
///
/// `embed_batch` is order-preserving: vector `i` corresponds to text `i`.
/// Dimensionality is fixed for the process lifetime; an index built with one
/// embedder must never mix vectors from another.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError>;
}

/// Produces an answer from prior turns, retrieved reference context and the
/// new question, in a single remote call.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn generate(
        &self,
        history: &[Turn],
        context: &[DocumentChunk],
        question: &str,
    ) -> Result<String, RemoteError>;
}
