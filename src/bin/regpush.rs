//! Bulk-upload registry records from a CSV file.
//!
//! ```sh
//! export REGPUSH_CLIENT_SECRET='...'
//! regpush --csv facilities.csv \
//!     --base-url https://registry.example.org/api/v1 \
//!     --token-url https://registry.example.org/auth/realms/registry/protocol/openid-connect/token
//! ```
//!
//! Progress is appended to the log file after every record; re-running the
//! same command resumes, skipping records already logged SUCCESS.

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use dialoguer::Confirm;

use regpush::facility::{CsvRow, FacilityTransform};
use regpush_auth::{secret_from_env_or_prompt, AuthConfig, TokenProvider};
use regpush_client::{parse_base_url, ClientConfig, HttpClient};
use regpush_upload::{BulkDriver, EngineConfig, RecordTransform, UploadEngine, UploadLog};

const SECRET_ENV_VAR: &str = "REGPUSH_CLIENT_SECRET";

#[derive(Debug, Parser)]
#[command(name = "regpush", version, about = "Resumable bulk uploader for registry APIs")]
struct Args {
    /// CSV file with one record per row.
    #[arg(long)]
    csv: PathBuf,

    /// Progress log; drives skip-on-resume. Appended to, never truncated.
    #[arg(long, default_value = "upload_progress.txt")]
    log: PathBuf,

    /// Registry API base URL, e.g. https://registry.example.org/api/v1
    #[arg(long, env = "REGPUSH_BASE_URL")]
    base_url: String,

    /// Identity token endpoint URL.
    #[arg(long, env = "REGPUSH_TOKEN_URL")]
    token_url: String,

    /// Entity type created per record.
    #[arg(long, default_value = "WaterFacility")]
    entity: String,

    /// Business-id field fetched after creation.
    #[arg(long, default_value = "wfId")]
    secondary_id_field: String,

    /// OAuth client id for the client-credentials grant.
    #[arg(long, default_value = "demo-api")]
    client_id: String,

    /// Emit a progress line every N records.
    #[arg(long, default_value_t = 50)]
    progress_every: usize,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    println!("regpush - bulk registry upload");
    println!("  Registry API: {}", args.base_url);
    println!("  CSV file:     {}", args.csv.display());
    println!("  Log file:     {}", args.log.display());
    println!();

    let base_url = parse_base_url(&args.base_url)?;
    let token_url = parse_base_url(&args.token_url)?;

    let secret = secret_from_env_or_prompt(SECRET_ENV_VAR, "Enter client secret")?;
    let mut tokens = TokenProvider::new(AuthConfig::new(&token_url, &args.client_id, secret));

    // A dead identity endpoint must fail the run before any record is touched.
    tokens
        .bearer_token()
        .await
        .map_err(|err| format!("initial token fetch failed: {err}"))?;
    println!("Token obtained");

    let log = UploadLog::new(&args.log);
    let stats = log.stats()?;
    println!(
        "Cumulative log stats: {} success, {} duplicate, {} failed",
        stats.success, stats.duplicate, stats.failed
    );

    let transform = FacilityTransform;
    let rows = read_rows(&args.csv)?;
    println!("Records in CSV: {}", rows.len());

    let completed = log.completed_keys()?;
    let remaining = rows
        .iter()
        .filter(|row| !completed.contains(&transform.item_key(row)))
        .count();
    println!("Already uploaded (from log): {}", rows.len() - remaining);
    println!("Records to upload: {remaining}");

    if remaining == 0 {
        println!("All records have already been uploaded.");
        return Ok(());
    }

    if !args.yes
        && !Confirm::new()
            .with_prompt(format!("Proceed with uploading {remaining} records?"))
            .default(false)
            .interact()?
    {
        println!("Aborted.");
        return Ok(());
    }

    let http = HttpClient::new(&ClientConfig::default())?;
    let engine_config = EngineConfig::new(&base_url, &args.entity)
        .with_secondary_id_field(&args.secondary_id_field);
    let engine = UploadEngine::new(engine_config, http, tokens);
    let mut driver =
        BulkDriver::new(engine, log, transform).with_progress_interval(args.progress_every);

    let summary = driver
        .run(&rows, |line| {
            print!("\r{line}");
            let _ = std::io::stdout().flush();
        })
        .await?;
    println!();

    println!("Upload complete");
    println!("  Total processed: {}", summary.total);
    println!("  Success:         {}", summary.success);
    println!("  Duplicates:      {}", summary.duplicate);
    println!("  Failed:          {}", summary.failed);
    println!("  Duration:        {:.1}m", summary.duration_seconds / 60.0);
    let rate = if summary.duration_seconds > 0.0 {
        summary.total as f64 / summary.duration_seconds
    } else {
        0.0
    };
    println!("  Average rate:    {rate:.1} records/s");
    println!("Log file saved to: {}", args.log.display());

    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<CsvRow>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
