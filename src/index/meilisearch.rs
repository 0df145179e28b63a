//! Meilisearch document sink.

use async_trait::async_trait;
use url::Url;

use crate::error_handling::{InitializationError, SinkError};
use crate::models::Document;

use super::DocumentSink;

/// Adds documents through `POST /indexes/{uid}/documents`.
///
/// Meilisearch enqueues the batch and answers `202 Accepted` with a task
/// uid; acceptance is treated as success; the task itself is not awaited.
/// Documents with an existing `id` are replaced.
#[derive(Debug, Clone)]
pub struct MeilisearchSink {
    client: reqwest::Client,
    documents_url: Url,
    index: String,
    api_key: String,
}

impl MeilisearchSink {
    /// # Errors
    ///
    /// Returns `InitializationError::IndexUrlError` if `host` is not an
    /// absolute URL.
    pub fn new(
        client: reqwest::Client,
        host: &str,
        index: &str,
        api_key: &str,
    ) -> Result<Self, InitializationError> {
        let url_error = |source| InitializationError::IndexUrlError {
            url: host.to_string(),
            source,
        };
        let mut documents_url = Url::parse(host).map_err(url_error)?;
        documents_url
            .path_segments_mut()
            .map_err(|_| url_error(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["indexes", index, "documents"]);
        documents_url
            .query_pairs_mut()
            .append_pair("primaryKey", "id");

        Ok(Self {
            client,
            documents_url,
            index: index.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn documents_url(&self) -> &Url {
        &self.documents_url
    }
}

#[async_trait]
impl DocumentSink for MeilisearchSink {
    async fn add_documents(&self, documents: &[Document]) -> Result<(), SinkError> {
        let mut request = self.client.post(self.documents_url.clone()).json(documents);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            log::trace!(
                "Index {} accepted {} documents ({})",
                self.index,
                documents.len(),
                status
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Status {
            status,
            body: body.trim().to_string(),
        })
    }

    fn name(&self) -> String {
        format!("meilisearch index '{}'", self.index)
    }
}
