//! s3explorer - enumerate and download objects from open S3-compatible buckets
//!
//! This library lists the keys exposed by an S3-style bucket listing endpoint
//! and downloads them to local files with a fixed concurrency ceiling.
//!
//! # Features
//!
//! - **Bucket Listing**: Parse `ListBucketResult` responses from one or many buckets
//! - **Bounded Concurrency**: Never more than N downloads in flight
//! - **Failure Isolation**: A missing or broken object never stops the batch
//! - **Progress Tracking**: Exact completion count with an optional progress bar
//!
//! # Example
//!
//! ```no_run
//! use s3explorer::{fetch_keys, EngineConfig, ListingOptions, ProgressCounter, RetrievalEngine};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//! let bucket = "https://bucket.s3.amazonaws.com";
//! let keys = fetch_keys(&client, bucket, &ListingOptions::default()).await?;
//!
//! let engine = RetrievalEngine::from_config(client, &EngineConfig::default());
//! let progress = Arc::new(ProgressCounter::hidden(keys.len() as u64));
//! engine.fetch_all(bucket, &keys, &progress).await?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod fetch;
mod listing;
mod progress;
mod sink;
mod types;

pub use engine::RetrievalEngine;
pub use error::ExplorerError;
pub use fetch::{Fetcher, HttpFetcher};
pub use listing::{collect_keys, fetch_keys, filter_keys, parse_listing, read_bucket_urls};
pub use progress::ProgressCounter;
pub use sink::{local_file_name, LocalSink};
pub use types::{
    EngineConfig, FetchOutcome, ListingOptions, RetrievalSummary, RetrievalTask,
    DEFAULT_CONCURRENCY, DEFAULT_LIMIT,
};
