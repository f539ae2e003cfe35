use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use writingway_workshop::{
    EmbeddingSource, WorkshopConfig, corpus_chunks, remote_provider, search_corpus,
    search_corpus_remote,
};

/// Find the corpus chunks nearest to a query.
#[derive(Debug, Parser)]
#[command(name = "writingway-workshop", version)]
struct Cli {
    /// Workshop configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text file with one chunk per non-empty line.
    #[arg(long)]
    corpus: PathBuf,

    /// Number of chunks to return; defaults to `retrieval.k`.
    #[arg(short)]
    k: Option<usize>,

    /// Print the distance next to each chunk.
    #[arg(long)]
    distances: bool,

    /// Print matches as JSON.
    #[arg(long, conflicts_with = "distances")]
    json: bool,

    /// Embed through the configured OpenAI-compatible API.
    #[arg(long)]
    remote: bool,

    /// Query text.
    query: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WorkshopConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => WorkshopConfig::default(),
    };
    if cli.remote {
        config.embedding.source = EmbeddingSource::OpenAi;
    }

    let corpus = std::fs::read_to_string(&cli.corpus)
        .with_context(|| format!("failed to read corpus {}", cli.corpus.display()))?;
    let chunks = corpus_chunks(&corpus);
    let k = cli.k.unwrap_or(config.retrieval.k);

    let hits = match config.embedding.source {
        EmbeddingSource::Tokens => search_corpus(&config, chunks, &cli.query, k)?,
        EmbeddingSource::OpenAi => {
            let provider = remote_provider(&config.embedding.remote);
            search_corpus_remote(&config, provider, chunks, &cli.query, k).await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    for hit in hits {
        if cli.distances {
            println!("{:>12.1}\t{}", hit.distance, hit.text);
        } else {
            println!("{}", hit.text);
        }
    }

    Ok(())
}
