//! Core data models used throughout Docent.
//!
//! These types flow through the build pipeline (documents → chunks →
//! vectors) and the query pipeline (question → candidates → decision).

use std::fmt;

use serde::Serialize;

/// A named source unit, immutable once loaded.
///
/// The identifier is the file name, not the full path; reranking tiers and
/// answer provenance both key on it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    /// Decoded text, before chunking.
    pub text: String,
}

/// The atomic retrievable unit.
///
/// Created once by the chunker and never mutated; the index refers to chunks
/// by ordinal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Normalized, whitespace-collapsed passage text, always longer than
    /// [`MIN_CHUNK_CHARS`](crate::chunk::MIN_CHUNK_CHARS) characters.
    pub text: String,
    /// Identifier of the document this chunk came from.
    pub source: String,
    /// Heading in effect when the chunk was flushed, if any.
    pub header: Option<String>,
}

/// Outcome of a single `ask` call. Ephemeral, never persisted.
///
/// Serializes to `{answer, source, confidence}` for accepted answers and
/// `{refused: true, reason}` for refusals.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Decision {
    Answer(Answer),
    Refusal(Refusal),
}

/// An accepted passage with its derived confidence.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The winning chunk's text.
    pub answer: String,
    /// Document the winning chunk came from.
    pub source: String,
    /// `1 / (1 + distance)` over the pre-bonus distance. Monotonically
    /// decreasing in distance; not a calibrated probability.
    pub confidence: f64,
}

/// A declined question with a machine-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct Refusal {
    /// Always `true`, so the wire shape is self-describing.
    pub refused: bool,
    pub reason: RefusalReason,
}

/// Why a question was declined. Refusals are expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// The question hit a noise trigger without any technical overlap.
    OutOfDomain,
    /// No candidate cleared its acceptance threshold.
    NoConfidentMatch,
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalReason::OutOfDomain => write!(f, "out_of_domain"),
            RefusalReason::NoConfidentMatch => write!(f, "no_confident_match"),
        }
    }
}

impl Decision {
    pub fn refusal(reason: RefusalReason) -> Self {
        Decision::Refusal(Refusal {
            refused: true,
            reason,
        })
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, Decision::Refusal(_))
    }
}
