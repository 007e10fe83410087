//! Brute-force cosine index.
//!
//! Vectors are L2-normalized once at build time, so cosine similarity reduces
//! to a dot product at query time. The index is immutable after `build`; a
//! corpus change means rebuilding from scratch.

use corpusqa_core::error::{Error, Result};
use corpusqa_core::types::{DocumentChunk, ScoredChunk};
use tracing::info;

pub struct VectorIndex {
    chunks: Vec<DocumentChunk>,
    // Flattened row-major storage, one normalized row per chunk.
    vectors: Vec<f32>,
    dim: usize,
}

impl VectorIndex {
    /// Build an index from chunks paired with their embedding vectors.
    ///
    /// Fails on an empty input and on inconsistent dimensionality; a partially
    /// usable index would silently misrank, so neither is tolerated.
    pub fn build(entries: Vec<(DocumentChunk, Vec<f32>)>) -> Result<Self> {
        let Some(first) = entries.first() else {
            return Err(Error::EmptyCorpus(
                "cannot build an index from zero chunks".to_string(),
            ));
        };
        let dim = first.1.len();
        if dim == 0 {
            return Err(Error::IndexBuild(
                "embedding dimensionality is zero".to_string(),
            ));
        }

        let mut chunks = Vec::with_capacity(entries.len());
        let mut vectors = Vec::with_capacity(entries.len() * dim);
        for (i, (chunk, vector)) in entries.into_iter().enumerate() {
            if vector.len() != dim {
                return Err(Error::IndexBuild(format!(
                    "chunk {} ('{}') has dimensionality {}, expected {}",
                    i,
                    chunk.id,
                    vector.len(),
                    dim
                )));
            }
            vectors.extend(normalize(vector));
            chunks.push(chunk);
        }

        info!(chunks = chunks.len(), dim, "vector index built");
        Ok(Self {
            chunks,
            vectors,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Top-`k` chunks by cosine similarity, highest first. Ties keep insertion
    /// order. `k >= len` returns every chunk; `k == 0` returns none.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || query.len() != self.dim {
            return Vec::new();
        }
        let query = normalize(query.to_vec());

        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let row = &self.vectors[i * self.dim..(i + 1) * self.dim];
                let score: f32 = row.iter().zip(&query).map(|(a, b)| a * b).sum();
                (i, score)
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score,
            })
            .collect()
    }
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
