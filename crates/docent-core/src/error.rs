//! Engine error taxonomy.
//!
//! Only an embedding provider failure is a hard error. Refusals are ordinary
//! [`Decision`](crate::models::Decision) values, and documents that cannot be
//! read never surface here — they are skipped upstream so the query path
//! stays available with a partially degraded knowledge base.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// `ask` was called before a successful `build_index`. Recoverable:
    /// retry after initialization completes.
    #[error("engine is not ready: build the index before asking")]
    NotReady,

    /// The embedding provider failed. Fatal for the build in flight; no
    /// partial index is retained.
    #[error("embedding provider failed: {0}")]
    EmbeddingProvider(anyhow::Error),
}
