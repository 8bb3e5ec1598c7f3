use anyhow::Context;
use clap::builder::TypedValueParser;
use clap::Parser;
use s3explorer::{
    collect_keys, fetch_keys, filter_keys, read_bucket_urls, EngineConfig, FetchOutcome,
    ListingOptions, ProgressCounter, RetrievalEngine, DEFAULT_CONCURRENCY, DEFAULT_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "s3explorer")]
#[command(about = "List and download objects from open S3-compatible buckets", long_about = None)]
#[command(version)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(true).args(["url", "url_file"]))]
struct Args {
    /// S3 bucket URL to retrieve keys from (takes precedence over --url-file)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// File containing list of S3 bucket URLs, one per line
    #[arg(short = 'U', long)]
    url_file: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY,
          value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    threads: usize,

    /// Limit of keys to retrieve from each bucket
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Download a single key
    #[arg(short = 'd', long = "download")]
    download_key: Option<String>,

    /// Download all keys found
    #[arg(short = 'D', long)]
    download_all: bool,

    /// Only display keys containing this substring
    #[arg(short, long)]
    filter: Option<String>,

    /// Directory downloaded files are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Show detailed error messages
    #[arg(long)]
    debug: bool,
}

/// What the run does once keys are known.
#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    /// Print the (filtered) keys.
    List,
    /// Download one key.
    Single(&'a str),
    /// Download every listed key.
    All,
}

impl Args {
    fn mode(&self) -> Mode<'_> {
        match (&self.download_key, self.download_all) {
            (Some(key), _) => Mode::Single(key),
            (None, true) => Mode::All,
            (None, false) => Mode::List,
        }
    }

    /// Keys are qualified with their bucket only when they come from a URL file.
    fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            limit: self.limit,
            prefix_with_source: self.url.is_none(),
        }
    }

    /// Keys from a URL file are already qualified, so they get no base.
    fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            concurrency: self.threads,
            output_dir: self.output.clone(),
        }
    }
}

fn listing_lines(keys: &[String], filter: Option<&str>) -> Vec<String> {
    filter_keys(keys, filter)
        .map(|key| format!("Key: {}", key))
        .collect()
}

fn completion_line(key: &str, outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Saved(path) => format!("Downloaded {} to {}", key, path.display()),
        FetchOutcome::Failed(_) => format!("Could not download {}", key),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for key listings
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("s3explorer={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let client = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let options = args.listing_options();
    let keys = if let Some(url) = &args.url {
        fetch_keys(&client, url, &options).await.unwrap_or_else(|e| {
            debug!("Failed to retrieve keys from {}: {}", url, e);
            Vec::new()
        })
    } else if let Some(url_file) = &args.url_file {
        let urls = read_bucket_urls(url_file)
            .await
            .with_context(|| format!("failed to read bucket URLs from {}", url_file.display()))?;
        collect_keys(&client, &urls, &options).await
    } else {
        Vec::new()
    };

    let mode = args.mode();
    if mode == Mode::List {
        for line in listing_lines(&keys, args.filter.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    tokio::fs::create_dir_all(&args.output)
        .await
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;

    let engine = RetrievalEngine::from_config(client, &args.engine_config());

    if let Mode::Single(key) = mode {
        let outcome = engine.fetch_single(args.base_url(), key).await;
        println!("{}", completion_line(key, &outcome));
    } else {
        info!("Downloading {} keys with {} workers", keys.len(), engine.concurrency());
        let progress = Arc::new(ProgressCounter::with_terminal_bar(keys.len() as u64));
        let summary = engine.fetch_all(args.base_url(), &keys, &progress).await?;
        progress.finish(format!(
            "✅ Downloaded {} of {} objects",
            summary.saved, summary.submitted
        ));
    }

    Ok(())
}
