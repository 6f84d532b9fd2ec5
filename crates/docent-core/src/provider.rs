//! Capability traits consumed by the engine.
//!
//! Embedding and lemmatization are opaque capabilities: the core never knows
//! which model runtime sits behind them, so it stays implementable and
//! testable with deterministic stubs. Concrete implementations live in the
//! application crate.

use anyhow::Result;
use async_trait::async_trait;

/// Produces fixed-dimension embeddings.
///
/// Implementations must return unit-length (L2-normalized) vectors — the
/// index does not renormalize — and must be deterministic for identical
/// input and model version. [`l2_normalize`] is the helper providers use to
/// satisfy the normalization contract.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"paraphrase-multilingual-MiniLM-L12-v2"`).
    fn model_name(&self) -> &str;

    /// Embedding dimensionality.
    fn dims(&self) -> usize;

    /// Embed a batch of texts: one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// A single analyzed token from a [`Lemmatizer`].
#[derive(Debug, Clone)]
pub struct LemmaToken {
    /// Surface form as it appeared in the text.
    pub text: String,
    /// Canonical dictionary form.
    pub lemma: String,
    pub is_stopword: bool,
    pub is_punctuation: bool,
}

/// Reduces text to lemmas with stopword/punctuation flags.
///
/// The gate and reranker filter on the flags before scoring; when no
/// lemmatizer is available they fall back to raw lowercase tokens.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, text: &str) -> Vec<LemmaToken>;
}

/// Scale a vector to unit L2 length in place. Zero vectors are left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
