#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use bidwiz::api::{self, AppState};
use bidwiz::delivery::{Mailer, OutgoingMail, ProposalWriter, SmtpMailer};
use bidwiz::document::TextDocument;
use bidwiz::engine::{BidWizEngine, EngineSettings};
use bidwiz::error::{DeliveryError, ProviderError};
use bidwiz::llm::HashingEmbedder;
use bidwiz::providers::CompletionProvider;
use parking_lot::Mutex;
use tempfile::TempDir;

pub const BOUNDARY: &str = "bidwiz-test-boundary";

/// Replies with the prompt it was given.
pub struct EchoModel;

#[async_trait]
impl CompletionProvider for EchoModel {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Every call fails the way an overloaded hosted model does.
pub struct DownModel;

#[async_trait]
impl CompletionProvider for DownModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            status: 503,
            body: "over capacity".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

/// Records every mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_with_attachment(&self, mail: OutgoingMail<'_>) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .push((mail.to.to_string(), mail.attachment.to_path_buf()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub engine: Arc<BidWizEngine>,
    pub upload_dir: TempDir,
    pub proposal_dir: TempDir,
}

impl TestApp {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self::with_model(Arc::new(EchoModel), mailer)
    }

    pub fn with_model(model: Arc<dyn CompletionProvider>, mailer: Arc<dyn Mailer>) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let proposal_dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(BidWizEngine::new(
            model,
            Arc::new(HashingEmbedder),
            EngineSettings::default(),
        ));

        let state = AppState {
            engine: Arc::clone(&engine),
            proposals: Arc::new(ProposalWriter::new(proposal_dir.path())),
            mailer,
            upload_dir: upload_dir.path().to_path_buf(),
        };

        Self {
            router: api::create_api(state, 5 * 1024 * 1024),
            engine,
            upload_dir,
            proposal_dir,
        }
    }

    pub fn unconfigured_mail() -> Self {
        Self::new(Arc::new(SmtpMailer::new(None)))
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

pub fn multipart_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub fn raw_request(uri: &str, content_type: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Three-page policy PDF; the refund clause sits on page two.
pub fn policy_pdf() -> Vec<u8> {
    let mut doc = TextDocument::new("NexusTech Commercial Policy");
    doc.push_line("NexusTech builds managed data platforms for enterprise clients.");
    for _ in 0..50 {
        doc.push_blank();
    }
    doc.push_line("Our refund policy is 30 days from the invoice date.");
    for _ in 0..50 {
        doc.push_blank();
    }
    doc.push_line("Support engineers are available around the clock.");
    doc.render().unwrap()
}

pub fn pdf_pages(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}
