pub mod api;
pub mod config;
pub mod delivery;
pub mod document;
pub mod engine;
pub mod error;
pub mod llm;
pub mod negotiation;
pub mod providers;

// Re-export commonly used items
pub use config::AppConfig;
pub use engine::{BidWizEngine, EngineSettings, IngestReport};
pub use error::NOT_LOADED_MESSAGE;
