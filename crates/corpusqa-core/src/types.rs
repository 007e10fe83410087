//! Domain types shared across the indexing and chat pipeline.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A source document as loaded from disk. Lives only through the ingestion
/// phase; after chunking only the chunks are kept.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable document identity (file stem).
    pub doc_id: String,
    /// Original path to the source file.
    pub path: String,
    /// Full extracted text.
    pub text: String,
}

/// A chunk of a source document that is independently embedded and indexed.
///
/// - `id`: globally unique chunk identifier, `"{doc_id}:{chunk_index}"`
/// - `doc_id`/`doc_path`: identity and path of the parent document
/// - `content`: the text payload of the chunk
/// - `chunk_index`/`total_chunks`: position within the parent document
/// - `truncated`: set when a single oversize sentence had to be hard-split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub truncated: bool,
}

/// A chunk together with its retrieval score. Higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// One completed (question, answer) exchange in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}
