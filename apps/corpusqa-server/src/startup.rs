//! Startup indexing pipeline: load, chunk, embed, build, publish.

use corpusqa_chat::ChatEngine;
use corpusqa_core::chunker::{Chunker, ChunkerConfig};
use corpusqa_core::config::{expand_path, Settings};
use corpusqa_core::error::Error;
use corpusqa_core::loader::load_documents;
use corpusqa_core::traits::{CompletionModel, Embedder};
use corpusqa_core::types::DocumentChunk;
use corpusqa_genai::{select_embedder, GeminiClient};
use corpusqa_vector::{Retriever, VectorIndex};
use std::sync::Arc;
use tracing::{error, info};

use crate::state::{AppState, ServingState};

/// Run the startup pipeline and publish the outcome.
///
/// Failures are recorded instead of crashing the process: the HTTP surface
/// stays up and reports the failure reason to queries and health checks.
pub async fn initialize(settings: Settings, state: AppState) {
    state.publish(ServingState::Indexing);
    match build_services(&settings).await {
        Ok(engine) => {
            info!("index ready, serving queries");
            state.publish(ServingState::Ready(Arc::new(engine)));
        }
        Err(e) => {
            error!(error = %e, "startup indexing failed");
            state.publish(ServingState::Failed(e.to_string()));
        }
    }
}

async fn build_services(settings: &Settings) -> anyhow::Result<ChatEngine> {
    let gemini = Arc::new(GeminiClient::new(settings)?);
    let embedder = select_embedder(&gemini);
    let model: Arc<dyn CompletionModel> = gemini;
    build_engine(settings, embedder, model).await
}

/// Assemble a chat engine from explicit capabilities. Split out from
/// [`build_services`] so tests can substitute offline embedding and
/// completion implementations.
pub async fn build_engine(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
) -> anyhow::Result<ChatEngine> {
    let data_dir = expand_path(&settings.data_dir);
    let documents = load_documents(&data_dir)?;

    let chunker = Chunker::new(ChunkerConfig {
        max_chars: settings.chunk_max_chars,
        overlap_chars: settings.chunk_overlap_chars,
    });
    let chunks: Vec<DocumentChunk> = documents.iter().flat_map(|d| chunker.chunk(d)).collect();
    if chunks.is_empty() {
        return Err(Error::EmptyCorpus(format!(
            "no usable documents under {}",
            data_dir.display()
        ))
        .into());
    }
    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        "corpus chunked"
    );

    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(settings.embed_batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        vectors.extend(embedder.embed_batch(&texts).await?);
    }

    let entries: Vec<(DocumentChunk, Vec<f32>)> = chunks.into_iter().zip(vectors).collect();
    let index = Arc::new(VectorIndex::build(entries)?);
    // An index whose vectors disagree with the embedder would misrank every
    // query vector from here on.
    if index.dim() != embedder.dim() {
        return Err(Error::IndexBuild(format!(
            "index dimensionality {} does not match embedder dimensionality {}",
            index.dim(),
            embedder.dim()
        ))
        .into());
    }
    let retriever = Retriever::new(embedder, index);

    Ok(ChatEngine::new(
        retriever,
        model,
        settings.retrieval_k,
        settings.max_session_turns,
    ))
}
