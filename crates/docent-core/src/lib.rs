//! # Docent Core
//!
//! The retrieval-and-decision engine behind Docent: document chunking,
//! in-memory vector indexing, lexical domain gating, lexical-bonus
//! reranking, and the orchestrating engine that wires them together.
//!
//! This crate contains no tokio, filesystem I/O, or HTTP. Embedding and
//! lemmatization are consumed through the capability traits in [`provider`],
//! so everything here runs against deterministic stubs in tests and is
//! independent of any specific model runtime.
//!
//! ## Data flow
//!
//! ```text
//! build:  documents ──chunk──▶ chunks ──embed──▶ vectors ──▶ EmbeddingIndex
//! query:  question ──gate──▶ candidates (k-NN) ──rerank──▶ Decision
//! ```

pub mod chunk;
pub mod engine;
pub mod error;
pub mod gate;
pub mod index;
pub mod models;
pub mod provider;
pub mod rerank;
pub mod vocab;
