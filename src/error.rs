use std::path::PathBuf;
use thiserror::Error;

/// Message returned to users who query before any document has been indexed.
pub const NOT_LOADED_MESSAGE: &str =
    "Error: Knowledge Base not loaded. Please upload and train a PDF first.";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API request failed: Status {status}, Body: {body}")]
    Api { status: u16, body: String },
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),
    #[error("Invalid response format: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to load embedding model: {0}")]
    Model(String),
    #[error("Failed to generate embeddings: {0}")]
    Generation(String),
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unreadable PDF {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("No text could be extracted from {path}")]
    Empty { path: PathBuf },
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("Ingestion task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{}", NOT_LOADED_MESSAGE)]
    NotReady,
    #[error("Error during generation: {0}")]
    Transport(#[from] ProviderError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("Engine task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum PdfWriteError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to render proposal PDF: {0}")]
    Pdf(#[from] PdfWriteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Email delivery is not configured (set SMTP_HOST, SMTP_USER, SMTP_PASSWORD)")]
    NotConfigured,
    #[error("Invalid email address {0}")]
    Address(String),
    #[error("Failed to build email: {0}")]
    Message(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Delivery task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CHUNK_OVERLAP ({overlap}) must be smaller than CHUNK_SIZE ({size})")]
    ChunkOverlap { size: usize, overlap: usize },
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("Unknown embedding backend: {0}")]
    UnknownEmbeddingBackend(String),
}
