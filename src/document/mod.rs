pub mod chunker;
pub mod loader;
pub mod pdf_writer;
pub mod synthesizer;

pub use chunker::{Chunk, TextSplitter};
pub use loader::{DocumentLoader, LoadedDocument, PdfLoader};
pub use pdf_writer::TextDocument;
pub use synthesizer::{SynthesisCounts, SyntheticDocument};
