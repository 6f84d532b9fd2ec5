//! In-memory exact nearest-neighbor index.
//!
//! Stores one pre-normalized vector per chunk, in insertion order, and
//! answers k-NN queries with a brute-force squared-L2 scan. On unit vectors
//! squared L2 produces the same ranking as cosine distance.
//!
//! The index never renormalizes: providers are responsible for delivering
//! unit-length vectors (see [`EmbeddingProvider`](crate::provider::EmbeddingProvider)).
//! Raw distances are not bounded to `[0, 1]` — downstream thresholds are
//! empirically calibrated constants, not probabilities.
//!
//! The index is built once from all chunks and is read-only afterward;
//! rebuilding means constructing a replacement and swapping it in.

use anyhow::{bail, Result};

use crate::models::Chunk;

/// A single search hit: the matched chunk and its squared-L2 distance.
#[derive(Debug, Clone)]
pub struct Hit<'a> {
    pub chunk: &'a Chunk,
    pub distance: f32,
}

/// An ordered collection of `(vector, chunk)` pairs.
#[derive(Debug)]
pub struct EmbeddingIndex {
    dims: usize,
    vectors: Vec<Vec<f32>>,
    chunks: Vec<Chunk>,
}

impl EmbeddingIndex {
    /// Build from parallel chunk/vector sequences.
    ///
    /// The association is positional, one vector per chunk. Count or
    /// dimension mismatches are construction errors — no partial index.
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            bail!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }
        let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
        for (i, vector) in vectors.iter().enumerate() {
            if vector.len() != dims {
                bail!("vector {} has {} dims, expected {}", i, vector.len(), dims);
            }
        }
        Ok(Self {
            dims,
            vectors,
            chunks,
        })
    }

    /// A valid, degenerate index with nothing in it.
    pub fn empty() -> Self {
        Self {
            dims: 0,
            vectors: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The `k` nearest chunks by squared L2, ascending by distance.
    ///
    /// Ties keep insertion order (the sort is stable). Searching an empty
    /// index returns an empty sequence, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<Hit<'_>> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }
        let mut hits: Vec<Hit<'_>> = self
            .vectors
            .iter()
            .zip(self.chunks.iter())
            .map(|(vector, chunk)| Hit {
                chunk,
                distance: squared_l2(query, vector),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        hits
    }
}

/// Squared Euclidean distance. Mismatched lengths rank last.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source: "kb.md".to_string(),
            header: None,
        }
    }

    fn index_of(vectors: Vec<Vec<f32>>) -> EmbeddingIndex {
        let chunks = (0..vectors.len())
            .map(|i| chunk(&format!("chunk number {}", i)))
            .collect();
        EmbeddingIndex::build(chunks, vectors).unwrap()
    }

    #[test]
    fn test_search_orders_by_distance_ascending() {
        let index = index_of(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.6, 0.8],
        ]);
        let hits = index.search(&[1.0, 0.0], 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk.text, "chunk number 1");
        assert_eq!(hits[1].chunk.text, "chunk number 2");
        assert_eq!(hits[2].chunk.text, "chunk number 0");
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[test]
    fn test_search_returns_at_most_k() {
        let index = index_of(vec![vec![1.0, 0.0]; 10]);
        assert_eq!(index.search(&[1.0, 0.0], 3).len(), 3);
        assert_eq!(index.search(&[1.0, 0.0], 25).len(), 10);
        assert!(index.search(&[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_search_on_empty_index() {
        let index = EmbeddingIndex::empty();
        assert!(index.search(&[1.0, 0.0], 5).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        // Two identical vectors: the earlier insertion must come first.
        let index = index_of(vec![vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 0.0]]);
        let hits = index.search(&[0.0, 1.0], 3);
        assert_eq!(hits[0].chunk.text, "chunk number 0");
        assert_eq!(hits[1].chunk.text, "chunk number 1");
        assert_eq!(hits[0].distance, hits[1].distance);
    }

    #[test]
    fn test_squared_l2_values() {
        // Orthogonal unit vectors sit at squared distance 2.
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let hits = index.search(&[1.0, 0.0], 2);
        assert!((hits[0].distance - 0.0).abs() < 1e-6);
        assert!((hits[1].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_build_rejects_count_mismatch() {
        let result = EmbeddingIndex::build(vec![chunk("only one chunk here")], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_dim_mismatch() {
        let result = EmbeddingIndex::build(
            vec![chunk("first chunk text"), chunk("second chunk text")],
            vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_query_ranks_last() {
        let index = index_of(vec![vec![1.0, 0.0]]);
        let hits = index.search(&[1.0, 0.0, 0.0], 1);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].distance.is_infinite());
    }
}
