use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::pdf_writer::TextDocument;
use crate::error::DeliveryError;

/// One answered requirement. Serialized as a `[requirement, answer]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ProposalEntry {
    pub requirement: String,
    pub answer: String,
}

impl From<(String, String)> for ProposalEntry {
    fn from((requirement, answer): (String, String)) -> Self {
        Self { requirement, answer }
    }
}

impl From<ProposalEntry> for (String, String) {
    fn from(entry: ProposalEntry) -> Self {
        (entry.requirement, entry.answer)
    }
}

/// Assembles finalized Q&A pairs into a proposal PDF on disk.
#[derive(Debug, Clone)]
pub struct ProposalWriter {
    output_dir: PathBuf,
}

impl ProposalWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn compose(entries: &[ProposalEntry]) -> TextDocument {
        let mut doc = TextDocument::new("Proposal Response");
        doc.push_line(&format!("Prepared: {}", Local::now().format("%Y-%m-%d")));
        doc.push_blank();

        for (i, entry) in entries.iter().enumerate() {
            doc.push_line(&format!("Requirement {}:", i + 1));
            doc.push_text(&entry.requirement);
            doc.push_blank();
            doc.push_line("Response:");
            doc.push_text(&entry.answer);
            doc.push_blank();
        }
        doc
    }

    /// Writes the proposal and returns its path.
    pub fn write(&self, entries: &[ProposalEntry]) -> Result<PathBuf, DeliveryError> {
        let file_name = format!(
            "Proposal_{}_{}.pdf",
            Local::now().format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.output_dir.join(file_name);
        Self::compose(entries).save(&path)?;

        tracing::info!(path = %path.display(), entries = entries.len(), "proposal written");
        Ok(path)
    }
}
