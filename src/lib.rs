//! # Docent
//!
//! Docent answers natural-language questions against a small, curated
//! knowledge base. It retrieves the most semantically relevant passage and
//! decides, through a scoring policy, whether to answer or refuse —
//! questions outside the supported technical domain are turned away at a
//! lexical gate before any retrieval happens.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌────────────────┐
//! │ KB files  │──▶│ Chunk + Embed │──▶│ EmbeddingIndex │
//! └───────────┘   └──────────────┘   └───────┬────────┘
//!                                            │
//!                    question ──▶ gate ──▶ k-NN ──▶ rerank ──▶ Decision
//!                                            │
//!                           ┌────────────────┤
//!                           ▼                ▼
//!                      ┌─────────┐      ┌─────────┐
//!                      │   CLI   │      │  HTTP   │
//!                      │(docent) │      │ (/ask)  │
//!                      └─────────┘      └─────────┘
//! ```
//!
//! The decision logic lives in the [`docent_core`] crate; this crate wires
//! configuration, document loading, and concrete embedding/lemmatization
//! providers around it, and exposes the CLI and HTTP surfaces.
//!
//! ## Quick Start
//!
//! ```bash
//! docent chunks                          # inspect what the chunker extracts
//! docent ask "que es un cups?"           # one-shot question
//! docent eval queries.txt                # regression-run a query list
//! docent serve                           # start the HTTP query service
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`kb`] | Knowledge-base loading with encoding fallback |
//! | [`embedding`] | Embedding provider implementations |
//! | [`lemma`] | Dictionary-backed lemmatizer |
//! | [`bootstrap`] | Config → ready engine wiring |
//! | [`ask`] | One-shot question command |
//! | [`stats`] | Chunk inspection command |
//! | [`eval`] | Query-list evaluation command |
//! | [`server`] | HTTP query service |

pub mod ask;
pub mod bootstrap;
pub mod config;
pub mod embedding;
pub mod eval;
pub mod kb;
pub mod lemma;
pub mod server;
pub mod stats;
