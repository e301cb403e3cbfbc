use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rsix::{
    segment, AnalyzeDocument, AnalyzerConfig, Document, DocumentAnalyzer, Indexer, TextAnalyzer,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Field-aware document analysis for full-text indexing", long_about = None)]
struct Args {
    /// JSON analyzer configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the normalized tokens of a text
    Tokenize { text: String },

    /// Analyze a JSON array of documents and print the analyzed terms
    Analyze { path: PathBuf },

    /// List segment descriptors, oldest first
    Segments {
        #[arg(default_value = "segments")]
        dir: PathBuf,
    },

    /// Sum document counts over all segment descriptors
    Count {
        #[arg(default_value = "segments")]
        dir: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(short, long, default_value = "segments")]
        dir: PathBuf,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_file(path),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse documents from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Tokenize { text } => {
            let analyzer = config.build();
            for token in analyzer.analyze(&text) {
                println!("{}", token);
            }
        }
        Command::Analyze { path } => {
            let analyzer = DocumentAnalyzer::new(config.build());
            let documents = load_documents(&path)?;
            let analyzed: Vec<_> = documents
                .iter()
                .map(|document| analyzer.analyze_document(document))
                .collect();
            println!("{}", serde_json::to_string_pretty(&analyzed)?);
        }
        Command::Segments { dir } => {
            for path in segment::index_file_names_in_chronological_order(&dir)? {
                println!("{}", path.display());
            }
        }
        Command::Count { dir } => {
            println!("{}", segment::document_count(&dir)?);
        }
        Command::Serve { dir, port } => {
            let indexer = Arc::new(Indexer::open(&dir, config.build())?);
            let app = rsix::api::create_router(indexer);

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("Failed to bind port {}", port))?;
            info!("Starting rsix v{} on port {} (segments in {})", rsix::VERSION, port, dir.display());
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
