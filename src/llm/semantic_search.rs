use serde::Serialize;
use std::cmp::Ordering;

use crate::document::chunker::Chunk;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
    pub source: String,
    pub chunk_index: usize,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// In-memory nearest-neighbour index over one ingested document. Immutable
/// once built; replacing it means building a new one.
#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    source: String,
    pages: usize,
    entries: Vec<IndexedChunk>,
}

impl KnowledgeIndex {
    /// Pairs chunks with their embeddings positionally. Callers guarantee the
    /// two slices have equal length.
    pub fn build(
        source: String,
        pages: usize,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Self {
        debug_assert_eq!(chunks.len(), embeddings.len());
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Self {
            source,
            pages,
            entries,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `limit` chunks by cosine similarity, best first. Equal scores keep
    /// document order so repeated queries are stable.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Vec<SearchResult> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query_embedding, &entry.embedding), entry))
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.index.cmp(&b.chunk.index))
        });

        scored
            .into_iter()
            .take(limit)
            .map(|(score, entry)| SearchResult {
                text: entry.chunk.text.clone(),
                score,
                source: entry.chunk.source.clone(),
                chunk_index: entry.chunk.index,
            })
            .collect()
    }
}

/// Cosine similarity; zero when either vector has no magnitude or the
/// dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Joins retrieved chunk texts, in rank order, into the prompt context.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
