use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bidwiz::api::{self, AppState};
use bidwiz::config::AppConfig;
use bidwiz::delivery::{ProposalWriter, SmtpMailer};
use bidwiz::document::chunker::TextSplitter;
use bidwiz::document::synthesizer::{self, SynthesisCounts};
use bidwiz::engine::{BidWizEngine, EngineSettings};
use bidwiz::llm::embeddings;
use bidwiz::providers;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "RFP response and negotiation assistant", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Write the synthetic company knowledge base as PDFs
    Synthesize {
        #[arg(long, default_value = "knowledge_base")]
        out: PathBuf,

        #[arg(long, default_value_t = 20)]
        case_studies: usize,

        #[arg(long, default_value_t = 15)]
        profiles: usize,

        #[arg(long, default_value_t = 10)]
        policies: usize,

        #[arg(long, default_value_t = 10)]
        tech_specs: usize,

        /// Fixed seed for a reproducible corpus
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bidwiz=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    match args.command.unwrap_or(Command::Serve {
        host: "0.0.0.0".to_string(),
        port: 8000,
    }) {
        Command::Serve { host, port } => run_api_server(&host, port).await,
        Command::Synthesize {
            out,
            case_studies,
            profiles,
            policies,
            tech_specs,
            seed,
        } => {
            let counts = SynthesisCounts {
                case_studies,
                profiles,
                policies,
                tech_specs,
            };
            run_synthesizer(out, counts, seed).await
        }
    }
}

async fn run_api_server(host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let config = AppConfig::from_env()?;

    let llm = providers::from_config(&config.provider)?;

    let backend = config.embedding_backend;
    let embedder = tokio::task::spawn_blocking(move || embeddings::from_backend(backend))
        .await
        .context("Embedding model initialisation panicked")??;

    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap).with_context(|| {
        format!("Invalid chunking {}/{}", config.chunk_size, config.chunk_overlap)
    })?;
    let engine = BidWizEngine::new(
        llm,
        embedder,
        EngineSettings {
            splitter,
            top_k: config.top_k,
        },
    );

    let state = AppState {
        engine: Arc::new(engine),
        proposals: Arc::new(ProposalWriter::new(config.proposal_dir.clone())),
        mailer: Arc::new(SmtpMailer::new(config.smtp.clone())),
        upload_dir: config.upload_dir.clone(),
    };
    let app = api::create_api(state, config.max_upload_bytes);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!(
        "{} {}",
        "BidWiz API listening on".green().bold(),
        addr.to_string().cyan()
    );
    tracing::info!(%addr, "server started");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn run_synthesizer(
    out: PathBuf,
    counts: SynthesisCounts,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "{} {} documents into {}",
        "Generating".green().bold(),
        counts.total(),
        out.display()
    );

    let progress = ProgressBar::new(counts.total() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );

    let dir = out.clone();
    let bar = progress.clone();
    let written = tokio::task::spawn_blocking(move || {
        synthesizer::generate(&dir, &counts, &mut rng, |doc| {
            bar.set_message(doc.file_name.clone());
            bar.inc(1);
        })
    })
    .await
    .context("Synthesis task panicked")?
    .with_context(|| format!("Failed to write knowledge base into {}", out.display()))?;

    progress.finish_with_message("done");
    println!(
        "{} {} files in {}",
        "Knowledge base written:".green().bold(),
        written.len(),
        out.display().to_string().cyan()
    );
    Ok(())
}
