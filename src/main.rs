use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentiment_reviews::{
    Config, JsonStore, ReviewService, ReviewStore, SentimentClassifier, SqliteStore,
    StorageBackend,
};

#[derive(Parser)]
#[command(name = "sentiment-reviews")]
#[command(about = "Rule-based sentiment labelling and storage for feedback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(long, default_value = ".sentiment-reviews/config.yml")]
    config: PathBuf,

    /// Storage backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<StorageBackend>,

    /// SQLite database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify text without storing it
    Classify {
        /// Text to classify
        text: String,
    },

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that need the review store
#[derive(Subcommand)]
enum StoreCommand {
    /// Classify and store a review
    Add {
        /// Review text (read from stdin if not provided)
        text: Option<String>,
    },

    /// List stored reviews with the given sentiment, newest first
    List {
        /// One of: positive, negative, neutral
        #[arg(long)]
        sentiment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sentiment_reviews=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(url) = cli.database_url {
        config.storage.database_url = url;
    }

    let classifier =
        SentimentClassifier::from_config(&config).context("Failed to compile lexicon")?;

    let command = match cli.command {
        Commands::Classify { text } => {
            println!("{}", classifier.classify(&text));
            return Ok(());
        }
        Commands::Store(command) => command,
    };

    match config.storage.backend {
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect(
                &config.storage.database_url,
                config.storage.max_connections,
            )
            .await?;
            let service = ReviewService::new(classifier, store);
            let result = run(&service, command).await;
            service.store().close().await;
            result
        }
        StorageBackend::Json => {
            let store = JsonStore::new(&config.storage.json_path)?;
            let service = ReviewService::new(classifier, store);
            run(&service, command).await
        }
    }
}

async fn run<S: ReviewStore>(service: &ReviewService<S>, command: StoreCommand) -> Result<()> {
    match command {
        StoreCommand::Add { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read review text from stdin")?;
                    buffer
                }
            };

            let review = service.create(&text).await?;
            println!("{}", serde_json::to_string_pretty(&review)?);
        }
        StoreCommand::List { sentiment } => {
            let reviews = service.list(&sentiment).await?;
            println!("{}", serde_json::to_string_pretty(&reviews)?);
        }
    }

    Ok(())
}
