//! Blueprint CLI: push local files through the upload pipeline.
//!
//! Storage and policy come from the environment (see `UploadConfig`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use blueprint_cli::{declared_content_type, declared_name, init_tracing};
use blueprint_core::{UploadConfig, UploadResponse};
use blueprint_storage::create_storage;
use blueprint_upload::{ErrorResponse, UploadRequest, UploadService};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "blueprint", about = "Blueprint upload pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file to the configured storage backend
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Content type to declare (guessed from the name if omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// Filename to declare instead of the file's own name
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the upload policy and backend in effect
    Policy,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = UploadConfig::from_env().context("Failed to load upload configuration")?;

    match cli.command {
        Commands::Upload {
            file,
            content_type,
            name,
        } => {
            let storage = create_storage(&config).context("Failed to initialize storage")?;
            let service = UploadService::new(Arc::new(config.policy()), storage);

            let source = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;

            let filename = declared_name(&file, name.as_deref());
            let content_type = declared_content_type(&filename, content_type);
            let request = UploadRequest::new(filename, content_type, Box::pin(source));

            match service.handle_upload(request).await {
                Ok(stored) => print_json(&UploadResponse::from(stored))?,
                Err(e) => {
                    print_json(&ErrorResponse::from_error(&e, !config.is_production()))?;
                    return Err(anyhow::Error::new(e).context("Upload failed"));
                }
            }
        }
        Commands::Policy => {
            print_json(&serde_json::json!({
                "storage": config.storage_backend,
                "policy": config.policy(),
            }))?;
        }
    }

    Ok(())
}
