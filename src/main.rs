use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rsrag::api::create_router;
use rsrag::processor;
use rsrag::{IngestOptions, RetrievalService, SearchOptions, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local TF-IDF knowledge base with retrieval-augmented prompting", long_about = None)]
struct Args {
    /// Corpus snapshot file
    #[arg(short, long, default_value = "knowledge_base.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Ingest a text or markdown file
    Add {
        path: PathBuf,

        #[arg(long, default_value_t = processor::DEFAULT_MAX_CHUNK_SIZE)]
        max_chunk_size: usize,

        #[arg(long, default_value_t = processor::DEFAULT_CHUNK_OVERLAP)]
        overlap: usize,
    },
    /// Search the knowledge base
    Search {
        query: String,

        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,

        #[arg(long, default_value_t = 0.1)]
        threshold: f64,
    },
    /// Show corpus statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let service = Arc::new(RetrievalService::new(Storage::file(&args.data)));

    match args.command {
        Command::Serve { host, port } => {
            let app = create_router(service);
            let addr = format!("{}:{}", host, port);
            tracing::info!("listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            axum::serve(listener, app).await?;
        }
        Command::Add {
            path,
            max_chunk_size,
            overlap,
        } => {
            let raw = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .context("path has no file name")?;

            let options = IngestOptions {
                max_chunk_size,
                overlap,
            };
            let report = service.add_document(file_name, &raw, &options)?;

            println!(
                "Indexed {} as {} document(s)",
                file_name, report.documents_added
            );
        }
        Command::Search {
            query,
            top_k,
            threshold,
        } => {
            let options = SearchOptions { top_k, threshold };

            let start = Instant::now();
            let hits = service.search_context(&query, &options);
            let duration = start.elapsed();

            println!("Found {} result(s) in {:?}", hits.len(), duration);
            println!();

            for hit in hits {
                println!(
                    "{:.4}\t{}\t{}",
                    hit.similarity, hit.metadata.file_name, hit.preview
                );
            }
        }
        Command::Stats => {
            let stats = service.stats();
            println!("Documents: {}", stats.total_documents);
            println!("Total words: {}", stats.total_words);
            println!(
                "Average words per document: {}",
                stats.average_words_per_document
            );
        }
    }

    Ok(())
}
