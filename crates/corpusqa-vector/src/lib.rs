//! In-memory cosine-similarity index over document chunks, plus the
//! Retriever that ties a query embedder to it.

pub mod index;
pub mod retriever;

pub use index::VectorIndex;
pub use retriever::Retriever;
