//! geo-ingest - load location CSV files from the command line

use anyhow::{Context, Result};
use clap::Parser;
use geo_ingest::{
    config::IngestConfig,
    notify::LogNotifier,
    pipeline::IngestPipeline,
    service::IngestService,
    store::MemoryStore,
};
use geo_ingest_common::{
    env,
    logging::{init_logging, LogConfig, LogLevel},
};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode, sync::Arc};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "geo-ingest")]
#[command(author, version, about = "Load location CSV files into the locations table")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Validate and batch a file without touching the backend
    Check {
        /// CSV file to check
        #[arg(short, long)]
        file: PathBuf,

        /// Override the configured batch size
        #[arg(short, long)]
        batch_size: Option<NonZeroUsize>,
    },

    /// Write a file to the configured table
    Load {
        /// CSV file to load
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env::load_dotenv();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("geo-ingest")
        .filter_directives("aws_smithy_runtime=warn,aws_config=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    let config = IngestConfig::from_env()?;

    let (service, file) = match cli.command {
        Command::Check { file, batch_size } => {
            let store = MemoryStore::new(config.table_name.clone());
            let pipeline =
                IngestPipeline::new(Arc::new(store), batch_size.unwrap_or(config.batch_size));
            (IngestService::new(pipeline, Arc::new(LogNotifier)), file)
        },
        Command::Load { file } => (IngestService::from_config(&config).await, file),
    };

    let document = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    info!(
        file = %file.display(),
        table = service.pipeline().table_name(),
        batch_size = service.pipeline().batch_size().get(),
        "Ingesting file"
    );

    match service.ingest(&document).await {
        Ok(summary) => {
            info!(
                records = summary.records,
                batches = summary.batches,
                "Ingestion complete"
            );
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            error!(kind = e.kind().code(), error = %e, "Ingestion failed");
            Ok(ExitCode::FAILURE)
        },
    }
}
