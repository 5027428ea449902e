pub mod embeddings;
pub mod prompts;
pub mod semantic_search;

pub use embeddings::{EmbeddingProvider, FastEmbedder, HashingEmbedder};
pub use semantic_search::{KnowledgeIndex, SearchResult};
