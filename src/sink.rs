//! Writing fetched objects to local files.

use crate::error::ExplorerError;
use futures_util::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Returns the final path segment of `key`, used as the local file name.
///
/// Trailing slashes are ignored, so `"logs/"` maps to `"logs"`. Keys with no
/// usable segment (empty, `"."`, `".."`) yield `None`.
pub fn local_file_name(key: &str) -> Option<&str> {
    Path::new(key).file_name().and_then(|n| n.to_str())
}

/// Flat output directory for downloaded objects.
///
/// Keys are stored under their basename only, so `a/file.txt` and
/// `b/file.txt` land on the same file and the last writer wins.
#[derive(Debug, Clone)]
pub struct LocalSink {
    dir: PathBuf,
}

impl LocalSink {
    /// Creates a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Local path that `key` is written to.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ExplorerError> {
        local_file_name(key)
            .map(|name| self.dir.join(name))
            .ok_or_else(|| ExplorerError::InvalidKey(key.to_string()))
    }

    /// Streams `body` into the file for `key`, creating or truncating it.
    ///
    /// The write is not atomic: a stream error part way through leaves a
    /// partial file behind.
    pub async fn store<S, B, E>(&self, key: &str, body: S) -> Result<PathBuf, ExplorerError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        ExplorerError: From<E>,
    {
        let path = self.path_for(key)?;
        let mut file = BufWriter::new(tokio::fs::File::create(&path).await?);

        futures_util::pin_mut!(body);
        while let Some(piece) = body.next().await {
            let chunk = piece?;
            file.write_all(chunk.as_ref()).await?;
        }
        file.flush().await?;

        Ok(path)
    }
}

impl Default for LocalSink {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::io;

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("file.txt"), Some("file.txt"));
        assert_eq!(local_file_name("a/b/file.txt"), Some("file.txt"));
        assert_eq!(local_file_name("logs/"), Some("logs"));
        assert_eq!(
            local_file_name("http://bucket.example/dir/obj.bin"),
            Some("obj.bin")
        );
        assert_eq!(local_file_name(""), None);
        assert_eq!(local_file_name(".."), None);
    }

    #[tokio::test]
    async fn test_store_writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path());
        let body = stream::iter(vec![
            Ok::<_, io::Error>(b"hello, ".to_vec()),
            Ok(b"world".to_vec()),
        ]);

        let path = sink.store("nested/greeting.txt", body).await.unwrap();

        assert_eq!(path, dir.path().join("greeting.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello, world");
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), b"a much longer old body").unwrap();
        let sink = LocalSink::new(dir.path());

        sink.store("f.txt", stream::iter(vec![Ok::<_, io::Error>(b"new".to_vec())]))
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("f.txt")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_store_keeps_partial_file_on_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path());
        let body = stream::iter(vec![
            Ok(b"partial".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let result = sink.store("p.bin", body).await;

        assert!(matches!(result, Err(ExplorerError::IoError(_))));
        assert!(dir.path().join("p.bin").exists());
    }

    #[tokio::test]
    async fn test_store_rejects_key_without_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path());

        let result = sink
            .store("", stream::iter(Vec::<Result<Vec<u8>, io::Error>>::new()))
            .await;

        assert!(matches!(result, Err(ExplorerError::InvalidKey(_))));
    }
}
