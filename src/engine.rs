use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::document::chunker::TextSplitter;
use crate::document::loader::{DocumentLoader, PdfLoader};
use crate::error::{EmbeddingError, EngineError, IngestError};
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::prompts::proposal_prompt;
use crate::llm::semantic_search::{format_context, KnowledgeIndex, SearchResult};
use crate::negotiation::{turn_prompt, NegotiationRole, NegotiationTurn};
use crate::providers::traits::CompletionProvider;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub splitter: TextSplitter,
    pub top_k: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            splitter: TextSplitter::default(),
            top_k: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub pages: usize,
    pub chunks: usize,
}

/// Owns the knowledge index and the model collaborators. Built once at
/// startup and shared by reference with the HTTP layer.
///
/// The index is published as an `Arc` snapshot: ingestion builds a complete
/// replacement off-lock and swaps it in under a brief write lock, readers
/// clone the pointer under a read lock. A failed ingestion never touches the
/// published index.
pub struct BidWizEngine {
    llm: Arc<dyn CompletionProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    loader: Arc<dyn DocumentLoader>,
    settings: EngineSettings,
    index: RwLock<Option<Arc<KnowledgeIndex>>>,
}

impl BidWizEngine {
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            llm,
            embedder,
            loader: Arc::new(PdfLoader),
            settings,
            index: RwLock::new(None),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Current index snapshot, if any document has been ingested.
    pub fn index(&self) -> Option<Arc<KnowledgeIndex>> {
        self.index.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.index.read().is_some()
    }

    pub async fn ingest(&self, path: &Path) -> Result<IngestReport, IngestError> {
        self.ingest_as(path, None).await
    }

    /// Ingests `path`, recording `source` as the document name instead of the
    /// file name (uploads are staged under generated names).
    pub async fn ingest_as(
        &self,
        path: &Path,
        source: Option<&str>,
    ) -> Result<IngestReport, IngestError> {
        let loader = Arc::clone(&self.loader);
        let embedder = Arc::clone(&self.embedder);
        let splitter = self.settings.splitter;
        let path: PathBuf = path.to_path_buf();
        let source = source.map(str::to_string);

        let index = tokio::task::spawn_blocking(move || -> Result<KnowledgeIndex, IngestError> {
            let document = loader.load(&path)?;
            let source = source.unwrap_or(document.source);

            let chunks = splitter.split(&document.text, &source);
            if chunks.is_empty() {
                return Err(IngestError::Empty { path });
            }

            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.embed(&texts)?;
            if embeddings.len() != chunks.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: chunks.len(),
                    actual: embeddings.len(),
                }
                .into());
            }

            Ok(KnowledgeIndex::build(source, document.pages, chunks, embeddings))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))??;

        let report = IngestReport {
            source: index.source().to_string(),
            pages: index.pages(),
            chunks: index.len(),
        };
        *self.index.write() = Some(Arc::new(index));

        tracing::info!(
            source = %report.source,
            pages = report.pages,
            chunks = report.chunks,
            "knowledge base indexed"
        );
        Ok(report)
    }

    /// Top-k chunks for `query` from the current snapshot.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
        let index = self.index().ok_or(EngineError::NotReady)?;

        let embedder = Arc::clone(&self.embedder);
        let query = query.to_string();
        let query_embedding = tokio::task::spawn_blocking(move || embedder.embed_one(&query))
            .await
            .map_err(|e| EngineError::Task(e.to_string()))??;

        Ok(index.search(&query_embedding, self.settings.top_k))
    }

    /// Drafts a proposal response for `requirement` grounded in the indexed
    /// document. Fails with `NotReady` before any successful ingestion.
    pub async fn answer(&self, requirement: &str, tone: &str) -> Result<String, EngineError> {
        let results = self.retrieve(requirement).await?;
        let context = format_context(&results);
        let prompt = proposal_prompt(tone, &context, requirement);

        self.llm.complete(&prompt).await.map_err(|e| {
            tracing::error!(error = %e, "generation failed");
            EngineError::from(e)
        })
    }

    /// Next negotiation message spoken by `role`. The caller owns `history`
    /// and appends the returned message itself.
    pub async fn next_turn(
        &self,
        history: &[NegotiationTurn],
        role: NegotiationRole,
        policy_context: &str,
    ) -> Result<String, EngineError> {
        let prompt = turn_prompt(role, history, policy_context);
        Ok(self.llm.complete(&prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::loader::LoadedDocument;
    use crate::error::ProviderError;
    use crate::llm::embeddings::HashingEmbedder;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingModel {
        async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
            self.prompts.lock().push(prompt.to_string());
            Ok("drafted".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl CompletionProvider for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Api {
                status: 503,
                body: "over capacity".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    /// Serves fixed text per path; unknown paths are unreadable.
    struct MapLoader(HashMap<PathBuf, String>);

    impl DocumentLoader for MapLoader {
        fn load(&self, path: &Path) -> Result<LoadedDocument, IngestError> {
            let text = self.0.get(path).cloned().ok_or_else(|| IngestError::Unreadable {
                path: path.to_path_buf(),
                reason: "not a PDF".to_string(),
            })?;
            Ok(LoadedDocument {
                source: path.display().to_string(),
                pages: 1,
                text,
            })
        }
    }

    fn engine_with(model: Arc<dyn CompletionProvider>, docs: &[(&str, &str)]) -> BidWizEngine {
        let loader = MapLoader(
            docs.iter()
                .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                .collect(),
        );
        let settings = EngineSettings {
            splitter: TextSplitter::new(60, 10).unwrap(),
            top_k: 2,
        };
        BidWizEngine::new(model, Arc::new(HashingEmbedder), settings).with_loader(Arc::new(loader))
    }

    const POLICY_DOC: &str = "Pricing is negotiated per contract and billed monthly. \
        Our refund policy is 30 days from the invoice date. \
        All data is encrypted at rest with AES-256 and in transit with TLS.";

    fn policy_engine() -> BidWizEngine {
        engine_with(Arc::new(RecordingModel::default()), &[("policy.pdf", POLICY_DOC)])
    }

    async fn ranked_chunks(engine: &BidWizEngine, query: &str) -> Vec<usize> {
        engine
            .retrieve(query)
            .await
            .unwrap()
            .iter()
            .map(|r| r.chunk_index)
            .collect()
    }

    #[tokio::test]
    async fn answer_before_ingest_is_not_ready_and_skips_model() {
        let model = Arc::new(RecordingModel::default());
        let engine = engine_with(model.clone(), &[]);

        let err = engine.answer("What is the refund window?", "Professional").await.unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
        assert_eq!(err.to_string(), crate::error::NOT_LOADED_MESSAGE);
        assert!(model.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn ingest_reports_chunk_count() {
        let engine = policy_engine();
        let report = engine.ingest(Path::new("policy.pdf")).await.unwrap();

        let expected = TextSplitter::new(60, 10).unwrap().split(POLICY_DOC, "policy.pdf").len();
        assert_eq!(report.chunks, expected);
        assert_eq!(report.source, "policy.pdf");
        assert!(engine.is_ready());
    }

    #[tokio::test]
    async fn answer_prompt_contains_retrieved_context() {
        let model = Arc::new(RecordingModel::default());
        let engine = engine_with(model.clone(), &[("policy.pdf", POLICY_DOC)]);
        engine.ingest(Path::new("policy.pdf")).await.unwrap();

        let reply = engine
            .answer("What is the refund policy window in days?", "Formal")
            .await
            .unwrap();
        assert_eq!(reply, "drafted");

        let prompts = model.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Adopt a Formal tone."));
        assert!(prompts[0].contains("refund policy is 30"));
        assert!(prompts[0].contains("Requirement: What is the refund policy window in days?"));
    }

    #[tokio::test]
    async fn retrieval_is_repeatable() {
        let engine = policy_engine();
        engine.ingest(Path::new("policy.pdf")).await.unwrap();

        let first = ranked_chunks(&engine, "encryption at rest").await;
        for _ in 0..5 {
            assert_eq!(first, ranked_chunks(&engine, "encryption at rest").await);
        }
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn failed_ingest_keeps_previous_index() {
        let engine = policy_engine();
        engine.ingest(Path::new("policy.pdf")).await.unwrap();
        let before = engine.index().unwrap();

        let err = engine.ingest(Path::new("garbage.bin")).await.unwrap_err();
        assert!(matches!(err, IngestError::Unreadable { .. }));

        let after = engine.index().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(!engine.retrieve("refund").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let engine = engine_with(Arc::new(RecordingModel::default()), &[("blank.pdf", "")]);
        let err = engine.ingest(Path::new("blank.pdf")).await.unwrap_err();
        assert!(matches!(err, IngestError::Empty { .. }));
        assert!(!engine.is_ready());
    }

    #[tokio::test]
    async fn reingest_replaces_index() {
        let engine = engine_with(
            Arc::new(RecordingModel::default()),
            &[("a.pdf", POLICY_DOC), ("b.pdf", "Kubernetes clusters run in three zones.")],
        );
        engine.ingest(Path::new("a.pdf")).await.unwrap();
        let report = engine.ingest(Path::new("b.pdf")).await.unwrap();

        assert_eq!(report.chunks, 1);
        let index = engine.index().unwrap();
        assert_eq!(index.source(), "b.pdf");
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn transport_errors_surface_as_results() {
        let engine = engine_with(Arc::new(FailingModel), &[("policy.pdf", POLICY_DOC)]);
        engine.ingest(Path::new("policy.pdf")).await.unwrap();

        let err = engine.answer("refund?", "Professional").await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
        assert!(err.to_string().contains("over capacity"));

        let err = engine.next_turn(&[], NegotiationRole::Buyer, "").await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }

    #[tokio::test]
    async fn next_turn_uses_role_persona_without_index() {
        let model = Arc::new(RecordingModel::default());
        let engine = engine_with(model.clone(), &[]);

        let reply = engine
            .next_turn(&[], NegotiationRole::Seller, "Floor price is $4,000")
            .await
            .unwrap();
        assert_eq!(reply, "drafted");
        let prompts = model.prompts.lock();
        assert!(prompts[0].contains("Senior Sales Executive"));
        assert!(prompts[0].contains("Floor price is $4,000"));
    }
}
