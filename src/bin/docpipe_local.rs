//! Run the document pipeline once from the command line.
//!
//! Uses the same handler as the Lambda entrypoint. `--credentials` swaps Secrets Manager for a
//! local JSON file and `--dry-run` keeps rows in memory instead of writing to PostgreSQL.
use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use clap::Parser;
use docpipe::{
    config::{self, Config},
    documents::MemoryDocumentStore,
    handler,
    logging,
    processing::DocumentPipeline,
    secrets::StaticSecretStore,
};
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;

#[derive(Parser)]
#[command(
    name = "docpipe-local",
    about = "Process an object-creation event locally and print the invocation response"
)]
struct Cli {
    /// Path to an S3 notification event JSON file.
    #[arg(long, required_unless_present = "bucket", conflicts_with = "bucket")]
    event: Option<PathBuf>,
    /// Bucket of a single object to process.
    #[arg(long, requires = "key")]
    bucket: Option<String>,
    /// Key of a single object to process.
    #[arg(long, requires = "bucket")]
    key: Option<String>,
    /// JSON file with database credentials, used instead of Secrets Manager.
    #[arg(long)]
    credentials: Option<PathBuf>,
    /// Keep rows in memory and print them instead of writing to PostgreSQL.
    #[arg(long)]
    dry_run: bool,
}

const DRY_RUN_CREDENTIALS: &str =
    r#"{"host":"localhost","port":5432,"dbname":"dry-run","username":"dry-run","password":""}"#;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    config::load_dotenv();
    logging::init_tracing();
    let cli = Cli::parse();

    let payload = load_payload(&cli)?;
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let mut pipeline = DocumentPipeline::from_sdk_config(&sdk_config);

    if let Some(path) = &cli.credentials {
        let secret = fs::read_to_string(path)
            .with_context(|| format!("failed to read credentials at {}", path.display()))?;
        pipeline = pipeline.with_secret_store(StaticSecretStore::new(secret));
    } else if cli.dry_run {
        pipeline = pipeline.with_secret_store(StaticSecretStore::new(DRY_RUN_CREDENTIALS));
    }

    let memory_store = MemoryDocumentStore::new();
    if cli.dry_run {
        pipeline = pipeline.with_document_store(memory_store.clone());
    }

    let response = handler::handle_event(&pipeline, Config::from_env(), payload).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if cli.dry_run {
        for (id, row) in memory_store.rows().await {
            let updated_at = row
                .updated_at
                .format(&Rfc3339)
                .context("failed to format updated_at")?;
            let summary = json!({
                "id": id,
                "characters": row.content.chars().count(),
                "dimension": row.embedding.len(),
                "revision": row.revision,
                "updated_at": updated_at,
            });
            println!("{summary}");
        }
    }

    anyhow::ensure!(response.is_success(), "{}", response.message());
    Ok(())
}

fn load_payload(cli: &Cli) -> Result<Value> {
    if let Some(path) = &cli.event {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read event at {}", path.display()))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("failed to parse event at {}", path.display()));
    }

    let (Some(bucket), Some(key)) = (&cli.bucket, &cli.key) else {
        anyhow::bail!("either --event or --bucket/--key is required");
    };
    Ok(json!({
        "Records": [{
            "s3": {
                "bucket": { "name": bucket },
                "object": { "key": urlencoding::encode(key) }
            }
        }]
    }))
}
