use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use datamirror::{
    FileError, Handler, MappingError, PathOptions, QueryError, RemoteFileRecord, SourceDescriptor,
};

use crate::fetch::FetchClient;
use crate::listing::{ListingClient, RetryPolicy};
use crate::mapper;

/// Registry identifier of [`OceandataHandler`].
pub const HANDLER_NAME: &str = "oceandata";

/// Endpoint and transport settings. `None` URLs fall back to the public
/// provider endpoints.
#[derive(Debug, Clone, Default)]
pub struct OceandataConfig {
    pub listing_url: Option<String>,
    pub fetch_url: Option<String>,
    pub retry: RetryPolicy,
    pub request_timeout: Option<Duration>,
}

/// Handler for NASA OceanColor data files.
pub struct OceandataHandler {
    listing: ListingClient,
    fetch: FetchClient,
}

impl OceandataHandler {
    pub fn new(config: OceandataConfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("datamirror");
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            listing: ListingClient::new(client.clone(), config.listing_url).with_retry(config.retry),
            fetch: FetchClient::new(client, config.fetch_url),
        })
    }
}

#[async_trait]
impl Handler for OceandataHandler {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    async fn list(&self, source: &SourceDescriptor) -> Result<Vec<RemoteFileRecord>, QueryError> {
        self.listing.list(source).await
    }

    fn remote_url(&self, record: &RemoteFileRecord) -> String {
        self.fetch.url_for(&record.filename)
    }

    fn map_path(&self, locator: &str, options: &PathOptions) -> Result<String, MappingError> {
        mapper::map_locator(locator, options)
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        source: &SourceDescriptor,
    ) -> Result<u64, FileError> {
        self.fetch
            .download(url, destination, source.credentials.as_ref())
            .await
    }
}
