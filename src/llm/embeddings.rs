use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use crate::config::EmbeddingBackend;
use crate::error::EmbeddingError;

/// Dimensionality of all-MiniLM-L6-v2, reused by the hashing backend.
pub const EMBEDDING_DIM: usize = 384;

/// Turns text into fixed-dimension vectors. Implementations are blocking and
/// are driven from `spawn_blocking` by the engine.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or(EmbeddingError::CountMismatch { expected: 1, actual: 0 })
    }
}

/// Local all-MiniLM-L6-v2 model. `TextEmbedding::embed` needs `&mut self`,
/// hence the mutex.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedder {
    pub fn new() -> Result<Self, EmbeddingError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::Model(e.to_string()))?;

        tracing::info!("all-MiniLM-L6-v2 embedding model loaded");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        Ok(embeddings)
    }
}

/// Bag-of-words feature hashing: every lowercase alphanumeric token adds one
/// to a hashed bucket, and the result is L2-normalised. Deterministic and
/// offline, so texts sharing vocabulary land close under cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct HashingEmbedder;

impl HashingEmbedder {
    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBEDDING_DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = fnv1a(token.to_lowercase().as_bytes()) as usize % EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub fn from_backend(
    backend: EmbeddingBackend,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match backend {
        EmbeddingBackend::FastEmbed => Ok(Arc::new(FastEmbedder::new()?)),
        EmbeddingBackend::Hashing => {
            tracing::info!("using deterministic hashing embeddings");
            Ok(Arc::new(HashingEmbedder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::semantic_search::cosine_similarity;

    #[test]
    fn hashing_is_deterministic_and_normalised() {
        let a = HashingEmbedder.embed_one("Refund policy is 30 days").unwrap();
        let b = HashingEmbedder.embed_one("Refund policy is 30 days").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let query = HashingEmbedder.embed_one("What is the refund window?").unwrap();
        let related = HashingEmbedder.embed_one("The refund window is 30 days").unwrap();
        let unrelated = HashingEmbedder.embed_one("Kubernetes cluster upgrade plan").unwrap();
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let v = HashingEmbedder.embed_one("  ...  ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
