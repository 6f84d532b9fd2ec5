//! Wires configuration into a ready retrieval engine.
//!
//! The one build path every query surface (CLI and HTTP) goes through:
//! resolve providers and vocabulary from config, load and chunk the
//! knowledge base, embed, and publish the index.

use std::sync::Arc;

use anyhow::Result;

use docent_core::engine::RetrievalEngine;

use crate::config::Config;
use crate::embedding;
use crate::kb;
use crate::lemma;

pub async fn build_engine(config: &Config) -> Result<RetrievalEngine> {
    let embedder = embedding::create_provider(&config.embedding)?;
    let lemmatizer = lemma::create_lemmatizer(&config.lemmatizer)?;
    let vocab = Arc::new(config.vocabulary());

    let documents = kb::load_documents(config)?;
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        config.kb.dir.display()
    );

    let model = embedder.model_name().to_string();
    let engine = RetrievalEngine::new(
        embedder,
        lemmatizer,
        vocab,
        config.retrieval.rerank_params(),
        config.retrieval.candidate_k,
    );
    engine.initialize(&documents);
    engine.build_index().await?;
    tracing::info!("Index built: {} chunks embedded with {}", engine.index_len(), model);

    Ok(engine)
}
