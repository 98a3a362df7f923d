use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use reply_assist::bridge::{BridgeEvent, EntryPoint, PageDocument, PageId, PageProcess, TabTracker};
use reply_assist::config::Config;
use reply_assist::extractor::extract_post_context;
use reply_assist::generation::OpenAiGenerator;
use reply_assist::storage::{FileStorage, Storage};
use reply_assist::store::{CredentialStore, ReplyStore};
use reply_assist::ReplyPipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reply-assist")]
#[command(about = "Suggest a context-aware reply for a Twitter/X post page")]
#[command(version)]
struct Cli {
    /// Path to config file (default: <config dir>/reply-assist/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the OpenAI API key
    SetKey { key: String },
    /// Print the conversation context extracted from a saved page
    Context {
        #[arg(long)]
        url: String,
        #[arg(long)]
        html: PathBuf,
    },
    /// Generate, validate and save a reply for a saved page
    Generate {
        #[arg(long)]
        url: String,
        #[arg(long)]
        html: PathBuf,
        /// Put the accepted reply into the page's reply box
        #[arg(long)]
        insert: bool,
    },
    /// List saved replies for a post, oldest first
    History { post_id: String },
}

/// Toolbar stand-in: reports activation changes through the log.
struct LoggedEntryPoint;

impl EntryPoint for LoggedEntryPoint {
    fn enable(&mut self, page: PageId) {
        tracing::info!(%page, "reply generation available");
    }

    fn disable(&mut self, page: PageId) {
        tracing::debug!(%page, "reply generation unavailable");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reply_assist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage.path));
    let credentials = CredentialStore::new(storage.clone());
    credentials
        .ensure_initialized()
        .await
        .context("failed to initialize storage")?;
    let replies = ReplyStore::new(storage);

    match cli.command {
        Command::SetKey { key } => {
            credentials.set(key.trim()).await?;
            println!("API key saved");
        }
        Command::Context { url, html } => {
            let html = read_page(&html)?;
            match extract_post_context(&url, &html) {
                Some(ctx) => println!("{}", serde_json::to_string_pretty(&ctx)?),
                None => println!("{}", reply_assist::ReplyError::NoContext),
            }
        }
        Command::Generate { url, html, insert } => {
            let html = read_page(&html)?;
            let pipeline = ReplyPipeline::new(
                Arc::new(OpenAiGenerator::new(&config.generation)),
                credentials,
                replies,
            );
            generate(&pipeline, url, html, insert).await;
        }
        Command::History { post_id } => {
            let saved = replies.list(&post_id).await;
            if saved.is_empty() {
                println!("No saved replies for {}", post_id);
            }
            for reply in saved {
                let when = DateTime::<Utc>::from_timestamp_millis(reply.created_at_millis)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}  {}", when, reply.content);
            }
        }
    }

    Ok(())
}

fn read_page(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

async fn generate(pipeline: &ReplyPipeline, url: String, html: String, insert: bool) {
    let page_id = PageId(1);
    let (events, events_rx) = mpsc::unbounded_channel();
    let tracker = tokio::spawn(TabTracker::new(LoggedEntryPoint).run(events_rx));

    let _ = events.send(BridgeEvent::NavigationComplete {
        page: page_id,
        url: url.clone(),
    });
    let (page, page_task) = PageProcess::spawn(page_id, PageDocument::new(url, html), events);

    match pipeline.generate_for_page(&page).await {
        Ok(accepted) => {
            println!("{}", accepted.reply.text());
            if insert {
                match page.insert_reply(accepted.reply.text()).await {
                    Ok(Ok(())) => println!("Reply inserted"),
                    Ok(Err(e)) => println!("Failed to insert reply: {}", e),
                    Err(e) => println!("{}", e.status_message()),
                }
            }
        }
        Err(e) => println!("{}", e.status_message()),
    }

    drop(page);
    if let Err(e) = page_task.await {
        tracing::warn!(error = %e, "page process ended abnormally");
    }
    let _ = tracker.await;
}
