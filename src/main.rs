//! laptop-price command-line entry point

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use laptop_price::{PipelineConfig, TrainingWorkflow};

#[derive(Parser)]
#[command(name = "laptop-price", version, about = "Laptop price regression pipeline")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest, transform, train and evaluate
    Run,

    /// Clean and split the source file, writing data/train/test CSVs
    Ingest,

    /// Fit the transformer on a train CSV and apply it to a test CSV
    Transform {
        /// Cleaned train partition
        #[arg(long)]
        train: PathBuf,

        /// Cleaned test partition
        #[arg(long)]
        test: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laptop_price=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let workflow = TrainingWorkflow::new(config).context("invalid configuration")?;

    match cli.command {
        Commands::Run => {
            let outcome = workflow.run().context("training run failed")?;
            println!("R2 score: {:.6}", outcome.metrics.r2);
            println!("Mean squared error: {:.6}", outcome.metrics.mse);
        }
        Commands::Ingest => {
            let partitions = workflow.ingest_from_source().context("ingestion failed")?;
            println!(
                "train rows: {}, test rows: {}",
                partitions.train.len(),
                partitions.test.len()
            );
        }
        Commands::Transform { train, test } => {
            let output = workflow
                .transform_from_paths(&train, &test)
                .context("transformation failed")?;
            println!(
                "train matrix: {} x {}, test matrix: {} x {}",
                output.train.n_rows(),
                output.train.n_cols(),
                output.test.n_rows(),
                output.test.n_cols()
            );
            if !output.unseen.is_empty() {
                println!("unseen test categories: {}", output.unseen.len());
            }
        }
    }

    Ok(())
}
