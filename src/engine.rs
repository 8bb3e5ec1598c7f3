//! Bounded-concurrency retrieval of listed objects.

use crate::error::ExplorerError;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::progress::ProgressCounter;
use crate::sink::LocalSink;
use crate::types::{EngineConfig, FetchOutcome, RetrievalSummary, RetrievalTask};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// Runs fetches for a key sequence with at most `concurrency` in flight.
///
/// A failed fetch is reported as [`FetchOutcome::Failed`] and logged at
/// debug level; it never stops the rest of the batch.
///
/// # Example
///
/// ```no_run
/// use s3explorer::{EngineConfig, ProgressCounter, RetrievalEngine};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = RetrievalEngine::from_config(reqwest::Client::new(), &EngineConfig::default());
/// let keys = vec!["index.html".to_string(), "backup/db.sql".to_string()];
/// let progress = Arc::new(ProgressCounter::hidden(keys.len() as u64));
///
/// let summary = engine
///     .fetch_all("https://bucket.s3.amazonaws.com", &keys, &progress)
///     .await?;
/// assert_eq!(progress.completed(), summary.submitted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RetrievalEngine<F> {
    fetcher: Arc<F>,
    concurrency: usize,
}

impl RetrievalEngine<HttpFetcher> {
    /// HTTP engine writing into `config.output_dir`.
    pub fn from_config(client: Client, config: &EngineConfig) -> Self {
        let sink = LocalSink::new(config.output_dir.clone());
        Self::new(HttpFetcher::new(client, sink), config.concurrency)
    }
}

impl<F: Fetcher> RetrievalEngine<F> {
    /// Creates an engine. A `concurrency` of zero is accepted here but
    /// rejected by [`fetch_all`](Self::fetch_all).
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            concurrency,
        }
    }

    /// The configured concurrency budget.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches and stores one task, swallowing any failure into the outcome.
    pub async fn fetch_one(&self, task: &RetrievalTask) -> FetchOutcome {
        run_task(self.fetcher.as_ref(), task).await
    }

    /// Downloads a single key relative to `base_url`, outside the pool.
    pub async fn fetch_single(&self, base_url: &str, key: &str) -> FetchOutcome {
        self.fetch_one(&RetrievalTask::new(base_url, key)).await
    }

    /// Downloads every key relative to `base_url`.
    ///
    /// A permit is acquired in the dispatch loop before each task is
    /// spawned, so once `concurrency` fetches are running the loop waits for
    /// one to finish. Each task ticks `progress` exactly once and releases
    /// its permit after the file write completes. Returns once all tasks
    /// have joined; completion order is unspecified.
    ///
    /// # Errors
    ///
    /// Only [`ExplorerError::InvalidConcurrency`] for a zero budget.
    /// Per-object failures are counted in the summary instead.
    pub async fn fetch_all(
        &self,
        base_url: &str,
        keys: &[String],
        progress: &Arc<ProgressCounter>,
    ) -> Result<RetrievalSummary, ExplorerError> {
        if self.concurrency == 0 {
            return Err(ExplorerError::InvalidConcurrency(self.concurrency));
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut download_tasks = Vec::with_capacity(keys.len());

        for key in keys {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExplorerError::TaskFailed(e.to_string()))?;

            let task = RetrievalTask::new(base_url, key);
            let fetcher = Arc::clone(&self.fetcher);
            let progress = Arc::clone(progress);

            download_tasks.push(tokio::spawn(async move {
                progress.set_message(format!("| ⬇️  {}", task.key));
                let outcome = run_task(fetcher.as_ref(), &task).await;
                progress.tick();
                drop(permit);
                outcome
            }));
        }

        let mut summary = RetrievalSummary {
            submitted: download_tasks.len() as u64,
            ..RetrievalSummary::default()
        };

        for task in download_tasks {
            match task.await {
                Ok(FetchOutcome::Saved(_)) => summary.saved += 1,
                Ok(FetchOutcome::Failed(_)) => summary.failed += 1,
                Err(e) => {
                    // The task died before it could record itself
                    error!("Retrieval task failed: {}", e);
                    progress.tick();
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

async fn run_task<F: Fetcher>(fetcher: &F, task: &RetrievalTask) -> FetchOutcome {
    match fetcher.fetch(task).await {
        Ok(path) => FetchOutcome::Saved(path),
        Err(e) => {
            debug!("Failed to download key {} from {}: {}", task.key, task.url, e);
            FetchOutcome::Failed(e)
        }
    }
}
