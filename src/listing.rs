//! Bucket listing retrieval and key handling.

use crate::error::ExplorerError;
use crate::types::{ListBucketResult, ListingOptions};
use reqwest::{Client, StatusCode};
use std::path::Path;
use tracing::{debug, info};

/// Parses a `ListBucketResult` document into keys, applying `options`.
///
/// Keys keep their document order and are cut off at `options.limit`.
pub fn parse_listing(
    xml: &str,
    bucket_url: &str,
    options: &ListingOptions,
) -> Result<Vec<String>, ExplorerError> {
    let result: ListBucketResult = quick_xml::de::from_str(xml)?;

    Ok(result
        .contents
        .into_iter()
        .take(options.limit)
        .map(|object| {
            if options.prefix_with_source {
                format!("{}/{}", bucket_url, object.key)
            } else {
                object.key
            }
        })
        .collect())
}

/// Fetches a bucket listing and returns its keys.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `bucket_url` - Listing endpoint, e.g. `https://bucket.s3.amazonaws.com`
/// * `options` - Limit and source-prefix settings
///
/// # Returns
///
/// The keys in listing order, or an error if the request fails, the status
/// is not 200, or the body is not a listing.
pub async fn fetch_keys(
    client: &Client,
    bucket_url: &str,
    options: &ListingOptions,
) -> Result<Vec<String>, ExplorerError> {
    info!("Retrieving keys from {}", bucket_url);

    let response = client.get(bucket_url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ExplorerError::HttpStatus {
            url: bucket_url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    parse_listing(&body, bucket_url, options)
}

/// Fetches keys from every bucket in turn and concatenates them.
///
/// A bucket that cannot be listed is logged at debug level and skipped.
pub async fn collect_keys(
    client: &Client,
    bucket_urls: &[String],
    options: &ListingOptions,
) -> Vec<String> {
    let mut keys = Vec::new();
    for bucket_url in bucket_urls {
        match fetch_keys(client, bucket_url, options).await {
            Ok(found) => {
                debug!("Found {} keys in {}", found.len(), bucket_url);
                keys.extend(found);
            }
            Err(e) => {
                debug!("Failed to retrieve keys from {}: {}. Skipping.", bucket_url, e);
            }
        }
    }
    keys
}

/// Reads bucket URLs from a file, one per line.
///
/// Surrounding whitespace is trimmed and blank lines are ignored.
pub async fn read_bucket_urls(path: impl AsRef<Path>) -> Result<Vec<String>, ExplorerError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Keys containing `needle`; every key when there is no needle.
pub fn filter_keys<'a>(keys: &'a [String], needle: Option<&'a str>) -> impl Iterator<Item = &'a str> {
    keys.iter()
        .map(String::as_str)
        .filter(move |key| needle.map_or(true, |n| key.contains(n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>public-assets</Name>
  <Prefix></Prefix>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>index.html</Key>
    <LastModified>2024-01-02T03:04:05.000Z</LastModified>
    <ETag>"d41d8cd98f00b204e9800998ecf8427e"</ETag>
    <Size>512</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <Contents>
    <Key>backups/db.sql</Key>
    <Size>2048</Size>
  </Contents>
  <Contents>
    <Key>backups/users.csv</Key>
    <Size>64</Size>
  </Contents>
</ListBucketResult>"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let keys = parse_listing(LISTING, "http://b", &ListingOptions::default()).unwrap();
        assert_eq!(keys, vec!["index.html", "backups/db.sql", "backups/users.csv"]);
    }

    #[test]
    fn test_parse_truncates_to_limit() {
        let options = ListingOptions {
            limit: 2,
            ..ListingOptions::default()
        };
        let keys = parse_listing(LISTING, "http://b", &options).unwrap();
        assert_eq!(keys, vec!["index.html", "backups/db.sql"]);
    }

    #[test]
    fn test_parse_prefixes_with_source() {
        let options = ListingOptions {
            limit: 1,
            prefix_with_source: true,
        };
        let keys = parse_listing(LISTING, "http://b.example", &options).unwrap();
        assert_eq!(keys, vec!["http://b.example/index.html"]);
    }

    #[test]
    fn test_parse_empty_listing() {
        let xml = "<ListBucketResult><Name>empty</Name></ListBucketResult>";
        let keys = parse_listing(xml, "http://b", &ListingOptions::default()).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let xml = "<ListBucketResult><Contents><Key>a</Contents></ListBucketResult>";
        let result = parse_listing(xml, "http://b", &ListingOptions::default());
        assert!(matches!(result, Err(ExplorerError::XmlError(_))));
    }

    #[test]
    fn test_filter_keys() {
        let keys: Vec<String> = vec!["a.sql".into(), "b.csv".into(), "c.sql.gz".into()];
        assert_eq!(filter_keys(&keys, Some("sql")).collect::<Vec<_>>(), vec!["a.sql", "c.sql.gz"]);
        assert_eq!(filter_keys(&keys, None).count(), 3);
    }

    #[tokio::test]
    async fn test_read_bucket_urls_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buckets.txt");
        std::fs::write(&path, "http://one.example\n\n  http://two.example  \r\n").unwrap();

        let urls = read_bucket_urls(&path).await.unwrap();

        assert_eq!(urls, vec!["http://one.example", "http://two.example"]);
    }

    #[tokio::test]
    async fn test_read_bucket_urls_missing_file() {
        let result = read_bucket_urls("/nonexistent/buckets.txt").await;
        assert!(matches!(result, Err(ExplorerError::IoError(_))));
    }
}
