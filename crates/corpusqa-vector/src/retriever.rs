use corpusqa_core::error::RemoteError;
use corpusqa_core::traits::Embedder;
use corpusqa_core::types::ScoredChunk;
use std::sync::Arc;
use tracing::debug;

use crate::index::VectorIndex;

/// Query-side composition: embed the question, then search the index.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed `query` as a batch of one and return the top-`k` chunks.
    /// Embedding failures propagate unchanged so the caller can apply its
    /// retry and reporting policy.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RemoteError> {
        let mut vectors = self.embedder.embed_batch(&[query.to_string()]).await?;
        let query_vec = vectors.pop().ok_or_else(|| RemoteError::Parse {
            message: "embedder returned no vector for the query".to_string(),
        })?;
        let hits = self.index.search(&query_vec, k);
        debug!(k, hits = hits.len(), "retrieved chunks for query");
        Ok(hits)
    }
}
