//! Ephemeral in-memory vector index.
//!
//! One index per ingestion: built wholesale from a chunk set, replaced
//! wholesale by the next ingestion, destroyed at session end. No deletion
//! or incremental update exists by design — rebuild replaces.

use std::cmp::Ordering;

use crate::embedding::{cosine_similarity, EmbeddingClient};
use crate::error::Result;
use crate::models::{Chunk, RetrievedChunk};

struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every chunk in insertion order and return a fresh index.
    /// Embedding failures propagate; a partial index is never returned.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingClient) -> Result<VectorIndex> {
        let mut entries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = embedder.embed(&chunk.text).await?;
            entries.push(IndexEntry { chunk, embedding });
        }
        Ok(VectorIndex { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k by cosine similarity, descending. The sort is stable, so tied
    /// scores keep original insertion order.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<RetrievedChunk> = self
            .entries
            .iter()
            .map(|entry| RetrievedChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            start_offset: 0,
            source: "test.txt".to_string(),
        }
    }

    fn index_of(embeddings: Vec<(&str, Vec<f32>)>) -> VectorIndex {
        VectorIndex {
            entries: embeddings
                .into_iter()
                .map(|(text, embedding)| IndexEntry {
                    chunk: chunk(text),
                    embedding,
                })
                .collect(),
        }
    }

    #[test]
    fn ranks_by_similarity_descending() {
        let index = index_of(vec![
            ("far", vec![0.0, 1.0]),
            ("near", vec![1.0, 0.1]),
            ("exact", vec![1.0, 0.0]),
        ]);
        let results = index.search(&[1.0, 0.0], 3);
        assert_eq!(results[0].chunk.text, "exact");
        assert_eq!(results[1].chunk.text, "near");
        assert_eq!(results[2].chunk.text, "far");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = index_of(vec![
            ("first", vec![1.0, 0.0]),
            ("second", vec![2.0, 0.0]), // same direction, same cosine
            ("third", vec![0.0, 1.0]),
        ]);
        let results = index.search(&[1.0, 0.0], 2);
        assert_eq!(results[0].chunk.text, "first");
        assert_eq!(results[1].chunk.text, "second");
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = index_of(vec![("only", vec![1.0])]);
        assert_eq!(index.search(&[1.0], 5).len(), 1);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = index_of(vec![]);
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 3).is_empty());
    }
}
