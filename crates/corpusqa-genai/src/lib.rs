//! Remote model capabilities: Gemini embedding and completion clients with a
//! bounded-backoff retry layer, plus a deterministic fake embedder for
//! offline runs and tests.

pub mod fake;
pub mod gemini;
pub mod retry;

pub use fake::FakeEmbedder;
pub use gemini::GeminiClient;
pub use retry::{with_retry, RetryPolicy};

use corpusqa_core::traits::Embedder;
use std::sync::Arc;

/// Dimensionality of the fake embedder, matching text-embedding-004.
pub const FAKE_EMBED_DIM: usize = 768;

/// Pick the embedding capability for this process.
///
/// Setting `CORPUSQA_USE_FAKE_EMBEDDINGS=1` substitutes deterministic hashed
/// bag-of-words vectors so the pipeline can run without network access.
pub fn select_embedder(gemini: &Arc<GeminiClient>) -> Arc<dyn Embedder> {
    let use_fake = std::env::var("CORPUSQA_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!("using fake embedder");
        Arc::new(FakeEmbedder::new(FAKE_EMBED_DIM))
    } else {
        Arc::clone(gemini) as Arc<dyn Embedder>
    }
}
