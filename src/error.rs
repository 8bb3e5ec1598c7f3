//! Error types for listing and retrieval.

use std::io;
use thiserror::Error;

/// Errors that can occur while listing or retrieving objects.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// I/O error during file operations.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// HTTP transport error (connection refused, DNS, body read, ...).
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// The listing response was not a parseable `ListBucketResult`.
    #[error("Malformed listing XML: {0}")]
    XmlError(#[from] quick_xml::DeError),

    /// The server answered with something other than 200 OK.
    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The key has no final path segment to name a local file after.
    #[error("Key {0:?} has no usable file name")]
    InvalidKey(String),

    /// A concurrency budget of zero would never admit a task.
    #[error("Concurrency budget must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    /// A spawned retrieval task panicked or was aborted.
    #[error("Retrieval task failed: {0}")]
    TaskFailed(String),
}
