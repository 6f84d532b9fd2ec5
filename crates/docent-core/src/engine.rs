//! Retrieval engine orchestrator.
//!
//! Owns the build pipeline (documents → chunks → vectors → index) and the
//! query pipeline (question → gate → candidates → decision). The engine
//! starts unbuilt, becomes ready after the first successful
//! [`build_index`](RetrievalEngine::build_index), and stays ready for the
//! process lifetime unless explicitly rebuilt.
//!
//! # Concurrency
//!
//! The published index lives behind an `Arc` snapshot: every `ask` clones
//! the `Arc` and runs against a consistent view, so unlimited queries may
//! run concurrently without locking. A rebuild constructs the replacement
//! off to the side and swaps the shared reference atomically — queries in
//! flight finish against the old snapshot, never a mix.

use std::sync::{Arc, RwLock};

use crate::chunk::chunk_documents;
use crate::error::EngineError;
use crate::gate::LexicalGate;
use crate::index::EmbeddingIndex;
use crate::models::{Chunk, Decision, RefusalReason, SourceDocument};
use crate::provider::{EmbeddingProvider, Lemmatizer};
use crate::rerank::{Reranker, RerankParams};
use crate::vocab::Vocabulary;

/// Nearest chunks retrieved per question before reranking. Fixed to balance
/// recall against reranking cost on a small index.
pub const DEFAULT_CANDIDATE_K: usize = 15;

pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    gate: LexicalGate,
    reranker: Reranker,
    candidate_k: usize,
    /// Chunks staged by `initialize`, consumed by the next `build_index`.
    staged: RwLock<Vec<Chunk>>,
    /// Published index; `None` until the first successful build.
    snapshot: RwLock<Option<Arc<EmbeddingIndex>>>,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        lemmatizer: Option<Arc<dyn Lemmatizer>>,
        vocab: Arc<Vocabulary>,
        params: RerankParams,
        candidate_k: usize,
    ) -> Self {
        Self {
            embedder,
            gate: LexicalGate::new(vocab.clone(), lemmatizer.clone()),
            reranker: Reranker::new(vocab, lemmatizer, params),
            candidate_k,
            staged: RwLock::new(Vec::new()),
            snapshot: RwLock::new(None),
        }
    }

    /// Chunk the documents once and stage the result for the next
    /// [`build_index`](RetrievalEngine::build_index).
    pub fn initialize(&self, documents: &[SourceDocument]) {
        let chunks = chunk_documents(documents);
        *self.staged.write().unwrap() = chunks;
    }

    /// Embed every staged chunk and atomically publish the new index.
    ///
    /// Zero staged chunks build a valid empty index. A provider failure
    /// aborts the build and leaves the previously published snapshot (or the
    /// unbuilt state) untouched.
    pub async fn build_index(&self) -> Result<(), EngineError> {
        let chunks: Vec<Chunk> = self.staged.read().unwrap().clone();
        let index = if chunks.is_empty() {
            EmbeddingIndex::empty()
        } else {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let vectors = self
                .embedder
                .embed(&texts)
                .await
                .map_err(EngineError::EmbeddingProvider)?;
            EmbeddingIndex::build(chunks, vectors).map_err(EngineError::EmbeddingProvider)?
        };
        *self.snapshot.write().unwrap() = Some(Arc::new(index));
        Ok(())
    }

    /// Chunk, embed, and swap in one call.
    pub async fn rebuild(&self, documents: &[SourceDocument]) -> Result<(), EngineError> {
        self.initialize(documents);
        self.build_index().await
    }

    /// True once a successful build has published a snapshot.
    pub fn is_ready(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    /// Number of chunks in the published index; zero while unbuilt.
    pub fn index_len(&self) -> usize {
        self.snapshot
            .read()
            .unwrap()
            .as_ref()
            .map(|index| index.len())
            .unwrap_or(0)
    }

    /// Answer a question or refuse.
    ///
    /// Requires a published index. The question is lowercased before gating
    /// and embedding. Questions rejected by the noise policy refuse without
    /// touching the index or the provider.
    pub async fn ask(&self, question: &str) -> Result<Decision, EngineError> {
        let index = self
            .snapshot
            .read()
            .unwrap()
            .clone()
            .ok_or(EngineError::NotReady)?;

        let lowered = question.to_lowercase();
        let gate = self.gate.classify(&lowered);
        if gate.rejects() {
            return Ok(Decision::refusal(RefusalReason::OutOfDomain));
        }

        let mut vectors = self
            .embedder
            .embed(std::slice::from_ref(&lowered))
            .await
            .map_err(EngineError::EmbeddingProvider)?;
        if vectors.is_empty() {
            return Err(EngineError::EmbeddingProvider(anyhow::anyhow!(
                "provider returned no vector for the query"
            )));
        }
        let query = vectors.remove(0);

        let hits = index.search(&query, self.candidate_k);
        Ok(self.reranker.rerank(&hits, &gate.overlap_terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::l2_normalize;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic keyword-axis embedder: each axis counts hits from one
    /// keyword list; texts matching nothing land on a dedicated final axis,
    /// orthogonal to everything else.
    struct TopicEmbedder {
        topics: Vec<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl TopicEmbedder {
        fn new(topics: Vec<Vec<&'static str>>) -> Self {
            Self {
                topics,
                calls: AtomicUsize::new(0),
            }
        }

        fn embed_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TopicEmbedder {
        fn model_name(&self) -> &str {
            "topic-stub"
        }

        fn dims(&self) -> usize {
            self.topics.len() + 1
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|text| {
                    let lowered = text.to_lowercase();
                    let mut vector: Vec<f32> = self
                        .topics
                        .iter()
                        .map(|keywords| {
                            keywords.iter().filter(|k| lowered.contains(*k)).count() as f32
                        })
                        .collect();
                    let miss = vector.iter().all(|x| *x == 0.0);
                    vector.push(if miss { 1.0 } else { 0.0 });
                    l2_normalize(&mut vector);
                    vector
                })
                .collect())
        }
    }

    struct FailingEmbedder {
        /// Calls that succeed before the provider starts failing.
        succeed_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn model_name(&self) -> &str {
            "failing-stub"
        }

        fn dims(&self) -> usize {
            2
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.succeed_first {
                bail!("model backend unavailable");
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn documents() -> Vec<SourceDocument> {
        vec![
            SourceDocument {
                name: "definiciones.md".to_string(),
                text: "# CUPS\n\nLa Clasificación Única de Procedimientos en Salud.\n\n# Canal\n\nEl canal de ingreso identifica el origen de cada atención."
                    .to_string(),
            },
            SourceDocument {
                name: "faq_operativa.md".to_string(),
                text: "¿Como se ejecuta el pipeline? El pipeline corre cada noche en la nube."
                    .to_string(),
            },
        ]
    }

    fn topics() -> Vec<Vec<&'static str>> {
        vec![
            vec!["cups", "clasificacion", "procedimientos"],
            vec!["pipeline", "nube"],
            vec!["canal", "ingreso"],
        ]
    }

    fn engine(embedder: Arc<dyn EmbeddingProvider>) -> RetrievalEngine {
        RetrievalEngine::new(
            embedder,
            None,
            Arc::new(Vocabulary::builtin()),
            RerankParams::default(),
            DEFAULT_CANDIDATE_K,
        )
    }

    #[tokio::test]
    async fn test_ask_before_build_is_not_ready() {
        let engine = engine(Arc::new(TopicEmbedder::new(topics())));
        let err = engine.ask("que es un cups?").await.unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
        assert!(!engine.is_ready());
    }

    #[tokio::test]
    async fn test_build_then_ask_answers() {
        let engine = engine(Arc::new(TopicEmbedder::new(topics())));
        engine.initialize(&documents());
        engine.build_index().await.unwrap();
        assert!(engine.is_ready());
        assert!(engine.index_len() > 0);

        let decision = engine.ask("que es un cups?").await.unwrap();
        match decision {
            Decision::Answer(a) => {
                assert!(a.answer.contains("CUPS"));
                assert_eq!(a.source, "definiciones.md");
                assert!(a.confidence > 0.0 && a.confidence < 1.0);
            }
            Decision::Refusal(_) => panic!("expected an answer"),
        }
    }

    #[tokio::test]
    async fn test_noise_refuses_without_embedding() {
        let embedder = Arc::new(TopicEmbedder::new(topics()));
        let engine = engine(embedder.clone());
        engine.initialize(&documents());
        engine.build_index().await.unwrap();
        let calls_after_build = embedder.embed_calls();

        let decision = engine.ask("de que color es el sol?").await.unwrap();
        match decision {
            Decision::Refusal(r) => assert_eq!(r.reason, RefusalReason::OutOfDomain),
            Decision::Answer(_) => panic!("expected refusal"),
        }
        // The noise policy short-circuits before retrieval.
        assert_eq!(embedder.embed_calls(), calls_after_build);
    }

    #[tokio::test]
    async fn test_unmatched_technical_question_refuses_no_confident_match() {
        let engine = engine(Arc::new(TopicEmbedder::new(topics())));
        engine.initialize(&documents());
        engine.build_index().await.unwrap();

        // Technical ("login" is in-domain) but nothing in the base covers it:
        // the stub lands it on the miss axis, orthogonal to every chunk.
        let decision = engine.ask("como funciona el login?").await.unwrap();
        match decision {
            Decision::Refusal(r) => assert_eq!(r.reason, RefusalReason::NoConfidentMatch),
            Decision::Answer(_) => panic!("expected refusal"),
        }
    }

    #[tokio::test]
    async fn test_empty_knowledge_base_builds_and_refuses() {
        let engine = engine(Arc::new(TopicEmbedder::new(topics())));
        engine.initialize(&[]);
        engine.build_index().await.unwrap();
        assert!(engine.is_ready());
        assert_eq!(engine.index_len(), 0);

        let decision = engine.ask("que es un cups?").await.unwrap();
        assert!(decision.is_refusal());
    }

    #[tokio::test]
    async fn test_build_failure_keeps_engine_unready() {
        let engine = engine(Arc::new(FailingEmbedder {
            succeed_first: 0,
            calls: AtomicUsize::new(0),
        }));
        engine.initialize(&documents());
        let err = engine.build_index().await.unwrap_err();
        assert!(matches!(err, EngineError::EmbeddingProvider(_)));
        assert!(!engine.is_ready());
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_snapshot() {
        // The provider survives exactly one embed call: the first build
        // succeeds, the rebuild fails, and the published snapshot stays.
        let engine = engine(Arc::new(FailingEmbedder {
            succeed_first: 1,
            calls: AtomicUsize::new(0),
        }));
        engine.initialize(&documents());
        engine.build_index().await.unwrap();
        let len_before = engine.index_len();
        assert!(len_before > 0);

        let err = engine.rebuild(&documents()).await.unwrap_err();
        assert!(matches!(err, EngineError::EmbeddingProvider(_)));
        assert!(engine.is_ready());
        assert_eq!(engine.index_len(), len_before);
    }

    #[tokio::test]
    async fn test_rebuild_swaps_content() {
        let engine = engine(Arc::new(TopicEmbedder::new(topics())));
        engine.initialize(&documents());
        engine.build_index().await.unwrap();

        let replacement = vec![SourceDocument {
            name: "definiciones.md".to_string(),
            text: "# Canal\n\nEl canal de ingreso identifica el origen de cada atención."
                .to_string(),
        }];
        engine.rebuild(&replacement).await.unwrap();

        let decision = engine.ask("que es el canal de ingreso?").await.unwrap();
        match decision {
            Decision::Answer(a) => assert!(a.answer.contains("canal de ingreso")),
            Decision::Refusal(_) => panic!("expected answer"),
        }
        // The CUPS glossary entry is gone after the swap.
        let decision = engine.ask("que es un cups?").await.unwrap();
        assert!(decision.is_refusal());
    }

    #[tokio::test]
    async fn test_concurrent_asks_share_one_snapshot() {
        let engine = Arc::new(engine(Arc::new(TopicEmbedder::new(topics()))));
        engine.initialize(&documents());
        engine.build_index().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.ask("que es un cups?").await.unwrap()
            }));
        }
        for handle in handles {
            assert!(matches!(handle.await.unwrap(), Decision::Answer(_)));
        }
    }
}
