use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    OpenAI,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Local all-MiniLM-L6-v2 via fastembed.
    FastEmbed,
    /// Deterministic feature hashing, no model download.
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastembed" => Ok(EmbeddingBackend::FastEmbed),
            "hashing" => Ok(EmbeddingBackend::Hashing),
            other => Err(ConfigError::UnknownEmbeddingBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let kind: ProviderKind = env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "groq".to_string())
            .parse()?;

        let key_var = match kind {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        };
        let api_key = env::var(key_var).ok().filter(|k| !k.trim().is_empty());

        let model = env::var("LLM_MODEL").unwrap_or_else(|_| match kind {
            ProviderKind::Groq => "llama-3.3-70b-versatile".to_string(),
            ProviderKind::OpenAI => "gpt-4o-mini".to_string(),
        });

        let api_url = env::var("LLM_API_URL").unwrap_or_else(|_| match kind {
            ProviderKind::Groq => "https://api.groq.com/openai/v1/chat/completions".to_string(),
            ProviderKind::OpenAI => "https://api.openai.com/v1".to_string(),
        });

        let temperature = parse_env("LLM_TEMPERATURE").unwrap_or(0.1);
        let timeout = parse_env::<u64>("LLM_TIMEOUT_SECS").map(Duration::from_secs);

        Ok(Self {
            kind,
            api_key,
            model,
            api_url,
            temperature,
            timeout,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl SmtpConfig {
    /// Returns `None` unless host and credentials are all present.
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok()?;
        let username = env::var("SMTP_USER").ok()?;
        let password = env::var("SMTP_PASSWORD").ok()?;
        let port = parse_env("SMTP_PORT").unwrap_or(587);
        let from = env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub embedding_backend: EmbeddingBackend,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub upload_dir: PathBuf,
    pub proposal_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = ProviderConfig::from_env()?;

        let embedding_backend = env::var("EMBEDDING_BACKEND")
            .unwrap_or_else(|_| "fastembed".to_string())
            .parse()?;

        let chunk_size = parse_env("CHUNK_SIZE").unwrap_or(1000);
        let chunk_overlap = parse_env("CHUNK_OVERLAP").unwrap_or(100);
        if chunk_overlap >= chunk_size {
            return Err(ConfigError::ChunkOverlap {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }

        let upload_dir = env::var("BIDWIZ_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());
        let proposal_dir = env::var("BIDWIZ_PROPOSAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("proposals"));

        Ok(Self {
            provider,
            embedding_backend,
            chunk_size,
            chunk_overlap,
            top_k: parse_env("RETRIEVAL_TOP_K").unwrap_or(4),
            upload_dir,
            proposal_dir,
            max_upload_bytes: parse_env("BIDWIZ_MAX_UPLOAD_BYTES").unwrap_or(25 * 1024 * 1024),
            smtp: SmtpConfig::from_env(),
        })
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Groq".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert_eq!(" openai ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn embedding_backend_rejects_unknown_names() {
        assert_eq!(
            "hashing".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Hashing
        );
        assert!(matches!(
            "faiss".parse::<EmbeddingBackend>(),
            Err(ConfigError::UnknownEmbeddingBackend(_))
        ));
    }
}
