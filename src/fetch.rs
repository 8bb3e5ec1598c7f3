//! Object fetching over HTTP.

use crate::error::ExplorerError;
use crate::sink::LocalSink;
use crate::types::RetrievalTask;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::path::PathBuf;

/// Fetches one object and commits it to storage.
///
/// The retrieval engine is generic over this so the pool can be driven by
/// an instrumented fetcher.
pub trait Fetcher: Send + Sync + 'static {
    /// Retrieves `task.url` and stores it under `task.key`, returning the
    /// written path.
    fn fetch(
        &self,
        task: &RetrievalTask,
    ) -> impl Future<Output = Result<PathBuf, ExplorerError>> + Send;
}

/// Plain GET against the object URL, streamed into a [`LocalSink`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    sink: LocalSink,
}

impl HttpFetcher {
    /// Creates a fetcher sharing `client` across all tasks.
    pub fn new(client: Client, sink: LocalSink) -> Self {
        Self { client, sink }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, task: &RetrievalTask) -> Result<PathBuf, ExplorerError> {
        // Reject unnameable keys before touching the network
        self.sink.path_for(&task.key)?;

        let response = self.client.get(&task.url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExplorerError::HttpStatus {
                url: task.url.clone(),
                status,
            });
        }

        self.sink.store(&task.key, response.bytes_stream()).await
    }
}
