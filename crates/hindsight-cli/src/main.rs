use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use hindsight_core::{parse_archive, EngineConfig, InsightEngine};
use hindsight_index::IndexError;
use hindsight_insight::render_text;
use hindsight_schema::Conversation;

#[derive(Parser)]
#[command(
    name = "hindsight",
    version,
    about = "Personal growth insights from your chat-assistant archive"
)]
struct Cli {
    #[arg(
        long,
        default_value = "hindsight.yaml",
        help = "Path to the config file"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Ingest an archive, enrich it, embed it, and save the vector index")]
    Index {
        #[arg(help = "Archive JSON file (defaults to storage.archive_path)")]
        archive: Option<PathBuf>,
    },
    #[command(about = "Ask a question about your personal growth")]
    Ask {
        #[arg(help = "The question to ask")]
        question: String,
        #[arg(long, help = "Print the structured insight as JSON")]
        json: bool,
    },
    #[command(about = "Show archive statistics")]
    Stats,
    #[command(about = "Validate the config file")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index { archive } => {
            let config = load_config(&cli.config)?;
            let archive_path = archive.unwrap_or_else(|| config.storage.archive_path.clone());
            run_index(config, &archive_path).await
        }
        Commands::Ask { question, json } => {
            let config = load_config(&cli.config)?;
            run_ask(config, &question, json).await
        }
        Commands::Stats => {
            let config = load_config(&cli.config)?;
            run_stats(config).await
        }
        Commands::Validate => run_validate(&cli.config),
    }
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    if path.exists() {
        EngineConfig::load(path)
    } else {
        tracing::info!(config = %path.display(), "no config file found, using defaults");
        Ok(EngineConfig::default())
    }
}

fn read_archive(path: &Path) -> Result<Vec<Conversation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read archive {}", path.display()))?;
    parse_archive(&raw)
}

async fn run_index(config: EngineConfig, archive_path: &Path) -> Result<()> {
    let index_path = config.storage.index_path.clone();
    let engine = InsightEngine::new(config);

    let conversations = read_archive(archive_path)?;
    let loaded = engine.load_archive(conversations).await;
    println!("Loaded and enriched {loaded} conversations");

    let indexed = engine.rebuild_index().await.map_err(index_error)?;
    engine.save_index(&index_path).await.map_err(index_error)?;
    println!("Indexed {indexed} conversations -> {}", index_path.display());
    Ok(())
}

async fn run_ask(config: EngineConfig, question: &str, json: bool) -> Result<()> {
    let archive_path = config.storage.archive_path.clone();
    let index_path = config.storage.index_path.clone();
    let engine = InsightEngine::new(config);

    let conversations = read_archive(&archive_path)?;
    engine.load_archive(conversations).await;

    match engine.load_index(&index_path).await {
        Ok(count) => tracing::debug!(count, "index snapshot loaded"),
        Err(err) => {
            tracing::warn!(error = %err, "index snapshot unusable, rebuilding");
            if let Err(err) = engine.rebuild_index().await {
                // ask() degrades on its own; just surface the condition
                tracing::warn!(error = %err, "index rebuild failed, answers will be empty");
            }
        }
    }

    let insight = engine.ask(question).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
    } else {
        println!("{}", render_text(&insight));
    }
    Ok(())
}

async fn run_stats(config: EngineConfig) -> Result<()> {
    let archive_path = config.storage.archive_path.clone();
    let engine = InsightEngine::new(config);
    let conversations = read_archive(&archive_path)?;

    let total_messages: usize = conversations.iter().map(|c| c.messages.len()).sum();
    let first = conversations.iter().map(|c| c.created_at).min();
    let last = conversations.iter().map(|c| c.created_at).max();

    let loaded = engine.load_archive(conversations).await;
    println!("Conversations: {loaded}");
    println!("Messages:      {total_messages}");
    if let (Some(first), Some(last)) = (first, last) {
        println!("Date range:    {} .. {}", first.date_naive(), last.date_naive());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<()> {
    let config = EngineConfig::load(config_path)?;
    let provider = config.build_provider();
    println!("Config OK: {}", config_path.display());
    println!(
        "Embedding:  {} ({} dims, enabled: {})",
        provider.model_id(),
        provider.dimensions(),
        config.embedding.enabled
    );
    println!(
        "Search:     limit {}, min score {}",
        config.search.limit, config.search.min_score
    );
    println!("Index path: {}", config.storage.index_path.display());
    Ok(())
}

fn index_error(err: IndexError) -> anyhow::Error {
    match err {
        IndexError::Unavailable(reason) => {
            anyhow!("embedding backend unavailable: {reason}. Check the embedding section of your config")
        }
        other => anyhow!(other),
    }
}
