//! muninn — train, query and correct per-user transaction classifiers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use muninn::{
    Config, DescriptionFeedback, FileModelStore, MuninnBuilder, MuninnError, StatusAggregator,
    SubcategoryFeedback, TaskClassifier, TaskKind, TrainOutcome,
};
use serde::Serialize;

/// Muninn CLI
#[derive(Parser)]
#[command(name = "muninn")]
#[command(version)]
#[command(about = "Per-user transaction classifiers")]
struct Args {
    /// Config file (default: ~/.muninn/config.toml, then /etc/muninn/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User whose models to operate on
    #[arg(short, long)]
    user: String,

    /// Bearer token for the upstream API
    #[arg(long, env = "MUNINN_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a fresh model from upstream data
    Train {
        #[arg(short, long, default_value = "subcategory")]
        task: TaskKind,
    },

    /// Predict for one transaction description
    Predict {
        /// Transaction description
        description: String,
        /// Category hint (subcategory task only)
        #[arg(long, default_value = "")]
        category: String,
        #[arg(short, long, default_value = "subcategory")]
        task: TaskKind,
    },

    /// Replay corrections from a JSON array of feedback records
    Feedback {
        /// Feedback file
        file: PathBuf,
        #[arg(short, long, default_value = "subcategory")]
        task: TaskKind,
    },

    /// Show which tasks have a trained model
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;

    // Status reads the store only and needs no upstream connection
    if let Command::Status = args.command {
        let dir = config
            .store
            .model_dir
            .clone()
            .unwrap_or_else(FileModelStore::default_dir);
        let aggregator = StatusAggregator::new(Arc::new(FileModelStore::new(dir)));
        return print_json(&aggregator.status(&args.user)?);
    }

    let engine = MuninnBuilder::from_config(&config).build()?;

    match args.command {
        Command::Train { task } => {
            let result = match task {
                TaskKind::Subcategory => engine.subcategory(&args.user)?.train(&args.token).await,
                TaskKind::Description => engine.description(&args.user)?.train(&args.token).await,
            };
            print_outcome(result)
        }
        Command::Predict {
            description,
            category,
            task,
        } => match task {
            TaskKind::Subcategory => {
                print_json(&engine.subcategory(&args.user)?.predict(&description, &category)?)
            }
            TaskKind::Description => {
                print_json(&engine.description(&args.user)?.predict(&description, &category)?)
            }
        },
        Command::Feedback { file, task } => {
            let result = match task {
                TaskKind::Subcategory => {
                    let feedbacks: Vec<SubcategoryFeedback> = read_json(&file)?;
                    engine
                        .subcategory(&args.user)?
                        .retrain_from_feedback(&feedbacks, &args.token)
                        .await
                }
                TaskKind::Description => {
                    let feedbacks: Vec<DescriptionFeedback> = read_json(&file)?;
                    engine
                        .description(&args.user)?
                        .retrain_from_feedback(&feedbacks, &args.token)
                        .await
                }
            };
            print_outcome(result)
        }
        Command::Status => Ok(()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MuninnError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MuninnError::InvalidInput(format!("failed to read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Print a training outcome; failures are reported, not raised.
fn print_outcome(result: muninn::Result<TrainOutcome>) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = TrainOutcome::from_result(result);
    print_json(&outcome)?;
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
