//! Explorer Engine CLI.
//!
//! A thin wrapper over the `explorer-orchestrator` library crate: parses
//! arguments, wires the concrete port adapters together, and prints
//! `ExplorerResult` rows as JSON lines. No business logic lives here beyond
//! argument parsing and collaborator wiring.

mod extractor;

use anyhow::Result;
use clap::{Parser, Subcommand};
use explorer_config::ExplorerConfig;
use explorer_embed::FastEmbedService;
use explorer_fetch::ReqwestContentFetcher;
use explorer_orchestrator::{AnswerMode, Explorer};
use explorer_search::{SearchConfig, SearxngProvider};
use explorer_types::ports::{ContentExtractor, ContentFetcher, EmbeddingService, SearchProvider, VectorStore};
use explorer_types::WorkspaceId;
use explorer_vectorstore::LanceVectorStore;
use std::sync::Arc;
use std::time::Duration;

use extractor::DispatchExtractor;

#[derive(Parser)]
#[command(name = "explorer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explorer Engine: retrieval-augmented web research over a per-workspace vector index", long_about = None)]
struct Cli {
    /// Directory backing the embedded LanceDB vector store.
    #[arg(long, global = true, env = "EXPLORER_DATA_DIR", default_value = "./.explorer-data")]
    data_dir: String,

    /// Verbose logging (debug level).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Explorer over a batch of queries for one workspace.
    Run(RunArgs),

    /// Delete every stored record for a workspace.
    Purge(PurgeArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Tenant boundary for retrieval and ingestion.
    #[arg(long)]
    workspace: String,

    /// A query to process. Repeat for a batch.
    #[arg(long = "query", required = true)]
    queries: Vec<String>,

    /// Ingest only; do not return retrieved chunks.
    #[arg(long)]
    ingest_only: bool,

    /// Cap on search results considered per query during ingestion.
    #[arg(long, default_value_t = 10)]
    max_results: u32,
}

#[derive(clap::Args)]
struct PurgeArgs {
    /// Tenant whose records should be deleted.
    #[arg(long)]
    workspace: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let config = ExplorerConfig::from_env()?;
    let explorer = build_explorer(&cli.data_dir, config).await?;

    match cli.command {
        Commands::Run(args) => run_command(&explorer, args).await,
        Commands::Purge(args) => purge_command(&explorer, args).await,
    }
}

async fn build_explorer(data_dir: &str, config: ExplorerConfig) -> Result<Explorer> {
    let embedder: Arc<dyn EmbeddingService> = Arc::new(FastEmbedService::new()?);

    let store: Arc<dyn VectorStore> = Arc::new(
        LanceVectorStore::connect(data_dir, Arc::clone(&embedder), explorer_embed::DEFAULT_DIM).await?,
    );
    store.ensure_index().await?;

    let search: Arc<dyn SearchProvider> = Arc::new(SearxngProvider::new(SearchConfig {
        host: config.searxng_host.clone(),
        min_delay_between_requests: config.min_delay_between_requests,
        max_retries: 3,
        timeout: Duration::from_secs(30),
    })?);

    let fetcher: Arc<dyn ContentFetcher> = Arc::new(ReqwestContentFetcher::new(20)?);
    let extractor: Arc<dyn ContentExtractor> = Arc::new(DispatchExtractor::new());

    Ok(Explorer::new(store, search, fetcher, extractor, embedder, config))
}

async fn run_command(explorer: &Explorer, args: RunArgs) -> Result<()> {
    let workspace = WorkspaceId::new(args.workspace);
    let answer_mode = if args.ingest_only { AnswerMode::IngestOnly } else { AnswerMode::Retrieve };

    let results = explorer.run(args.queries, &workspace, answer_mode, args.max_results).await;
    for result in results {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

async fn purge_command(explorer: &Explorer, args: PurgeArgs) -> Result<()> {
    let workspace = WorkspaceId::new(args.workspace);
    explorer.purge_workspace(&workspace).await?;
    Ok(())
}
