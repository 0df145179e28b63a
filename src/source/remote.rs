//! Remote object backend.
//!
//! Streams an object through the Google Cloud Storage JSON API
//! (`GET /storage/v1/b/{bucket}/o/{object}?alt=media`). Any server exposing the
//! same route, such as a storage emulator, works with a custom endpoint.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use url::Url;

use crate::error_handling::SourceError;

use super::lines::BoundedLineReader;
use super::LineSource;

/// Address of an object in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Storage API base URL
    pub endpoint: String,
    pub bucket: String,
    /// Object name, `/` separated
    pub key: String,
}

impl RemoteObject {
    /// `gs://bucket/key`, used in logs and errors.
    pub fn location(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.key)
    }

    /// Media download URL. The object name is a single percent-encoded path
    /// segment, so `/` inside it becomes `%2F`.
    pub fn download_url(&self) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SourceError::unavailable(self.location(), e))?;
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::unavailable(self.location(), "storage endpoint cannot be a base URL")
            })?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", self.key.as_str()]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

/// Reads lines from an object downloaded as a byte stream.
///
/// Only the HTTP response head is awaited in [`open`](Self::open); the body
/// is consumed lazily as lines are requested.
pub struct RemoteObjectSource {
    object: RemoteObject,
    reader: BoundedLineReader,
}

impl RemoteObjectSource {
    /// Starts the download of `object`.
    ///
    /// # Errors
    ///
    /// - `CredentialsMissing` if no bearer token is supplied
    /// - `SourceUnavailable` if the bucket is empty, the request fails, or the
    ///   server answers with a non-success status
    pub async fn open(
        object: RemoteObject,
        token: Option<&str>,
        timeout: Duration,
        max_line_bytes: usize,
    ) -> Result<Self, SourceError> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            SourceError::CredentialsMissing(format!(
                "no storage access token for {} (set GCS_ACCESS_TOKEN or --storage-token)",
                object.location()
            ))
        })?;
        if object.bucket.is_empty() {
            return Err(SourceError::unavailable(
                object.location(),
                "no bucket configured (set BUCKET_NAME_PRIVATE or --bucket)",
            ));
        }

        let url = object.download_url()?;
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| SourceError::unavailable(object.location(), e))?;

        let response = client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(object.location(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::unavailable(
                object.location(),
                format!("HTTP {status}: {}", body.trim()),
            ));
        }
        log::debug!(
            "Streaming {} ({} bytes)",
            object.location(),
            response
                .content_length()
                .map_or_else(|| "unknown".to_string(), |len| len.to_string())
        );

        let stream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = StreamReader::new(stream);
        Ok(Self {
            object,
            reader: BoundedLineReader::new(Box::new(reader), max_line_bytes),
        })
    }
}

#[async_trait]
impl LineSource for RemoteObjectSource {
    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        self.reader.next_line().await
    }

    async fn close(&mut self) {
        if self.reader.close() {
            log::debug!("Closed download of {}", self.object.location());
        }
    }

    fn lines_read(&self) -> u64 {
        self.reader.line_number()
    }

    fn location(&self) -> String {
        self.object.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(key: &str) -> RemoteObject {
        RemoteObject {
            endpoint: "https://storage.googleapis.com".into(),
            bucket: "terms-private".into(),
            key: key.into(),
        }
    }

    #[test]
    fn test_download_url_encodes_object_name() {
        let url = object("snomed/2024/sct2 Description.txt")
            .download_url()
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/terms-private/o/snomed%2F2024%2Fsct2%20Description.txt?alt=media"
        );
    }

    #[test]
    fn test_download_url_keeps_endpoint_path() {
        let mut obj = object("sct2.txt");
        obj.endpoint = "http://127.0.0.1:4443/emulator/".into();
        let url = obj.download_url().expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:4443/emulator/storage/v1/b/terms-private/o/sct2.txt?alt=media"
        );
    }

    #[test]
    fn test_download_url_rejects_invalid_endpoint() {
        let mut obj = object("sct2.txt");
        obj.endpoint = "not a url".into();
        assert!(matches!(
            obj.download_url(),
            Err(SourceError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_location() {
        assert_eq!(object("a/b.txt").location(), "gs://terms-private/a/b.txt");
    }

    #[tokio::test]
    async fn test_open_without_token_fails_before_network() {
        let result =
            RemoteObjectSource::open(object("sct2.txt"), None, Duration::from_secs(1), 1024).await;
        assert!(matches!(result, Err(SourceError::CredentialsMissing(_))));

        let result =
            RemoteObjectSource::open(object("sct2.txt"), Some(""), Duration::from_secs(1), 1024)
                .await;
        assert!(matches!(result, Err(SourceError::CredentialsMissing(_))));
    }

    #[tokio::test]
    async fn test_open_without_bucket_fails() {
        let mut obj = object("sct2.txt");
        obj.bucket.clear();
        let result =
            RemoteObjectSource::open(obj, Some("token"), Duration::from_secs(1), 1024).await;
        assert!(matches!(
            result,
            Err(SourceError::SourceUnavailable { .. })
        ));
    }
}
