//! Data structures shared by the lister and the retrieval engine.

use serde::Deserialize;
use std::path::PathBuf;

/// Default number of retrievals allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 30;

/// Default number of keys kept from a single listing response.
pub const DEFAULT_LIMIT: usize = 50;

/// Body of an S3 `ListBucketResult` response. Only the keys are kept.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ListBucketResult {
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ListedObject>,
}

/// One `<Contents>` entry of a listing.
#[derive(Deserialize, Debug)]
pub(crate) struct ListedObject {
    #[serde(rename = "Key")]
    pub key: String,
}

/// Options for turning a listing response into keys.
///
/// # Example
///
/// ```
/// use s3explorer::ListingOptions;
///
/// let options = ListingOptions {
///     limit: 100,
///     prefix_with_source: true,
/// };
/// assert_eq!(options.limit, 100);
/// ```
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Maximum number of keys kept per listing response (default: 50).
    pub limit: usize,
    /// Rewrite each key as `<bucket_url>/<key>` (default: false).
    ///
    /// Used when keys from several buckets are combined, so every key
    /// identifies its source and can be fetched without a shared base URL.
    pub prefix_with_source: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            prefix_with_source: false,
        }
    }
}

/// Configuration for the retrieval engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of fetches in flight at once (default: 30).
    ///
    /// Must be at least 1; the engine rejects zero rather than adjusting it.
    pub concurrency: usize,
    /// Directory downloaded objects are written to (default: current directory).
    pub output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            output_dir: PathBuf::from("."),
        }
    }
}

/// A single fetch-and-store unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalTask {
    /// Fully-qualified object URL.
    pub url: String,
    /// The key as listed; names the local file.
    pub key: String,
}

impl RetrievalTask {
    /// Joins `base_url` and `key` with `/`.
    ///
    /// An empty base means the key is already a full URL, as produced by
    /// [`ListingOptions::prefix_with_source`].
    pub fn new(base_url: &str, key: &str) -> Self {
        let url = if base_url.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", base_url, key)
        };
        Self {
            url,
            key: key.to_string(),
        }
    }
}

/// Result of one task. Failures are data, not errors: the batch goes on.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The body was written to this file.
    Saved(PathBuf),
    /// Nothing (or a partial file) was written.
    Failed(crate::error::ExplorerError),
}

impl FetchOutcome {
    /// Whether the object was written out.
    pub fn is_saved(&self) -> bool {
        matches!(self, FetchOutcome::Saved(_))
    }
}

/// Counts reported by a bulk run once every task has joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrievalSummary {
    pub submitted: u64,
    pub saved: u64,
    pub failed: u64,
}
