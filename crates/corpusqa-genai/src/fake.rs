//! Deterministic offline embedder.
//!
//! Hashed bag-of-words: each whitespace token is hashed into a bucket and the
//! vector is L2-normalized. Not semantically meaningful, but stable across
//! runs and good enough for retrieval over small corpora with distinct
//! vocabularies, which is what offline runs and tests need.

use async_trait::async_trait;
use corpusqa_core::error::RemoteError;
use corpusqa_core::traits::Embedder;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
