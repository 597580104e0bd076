use std::path::Path;
use std::sync::Arc;

use crate::error::{FileError, MappingError, QueryError, SyncError};
use crate::record::RemoteFileRecord;
use crate::report::SyncReport;
use crate::source::SourceDescriptor;

/// Formatting options for mapped paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOptions {
    /// Return the directory only, without the file name.
    pub path_only: bool,
    pub separator: char,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            path_only: false,
            separator: '/',
        }
    }
}

impl PathOptions {
    pub fn directory() -> Self {
        Self {
            path_only: true,
            ..Self::default()
        }
    }
}

/// Listing, path mapping, and transfer for one provider's conventions.
///
/// `sync` has a default implementation that drives the other methods
/// through the shared decision engine; handlers normally only implement
/// the provider-specific parts.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    /// Registry identifier of this handler.
    fn name(&self) -> &str;

    /// Query the provider for files matching the source's search pattern.
    /// Results are sorted by filename and unique.
    async fn list(&self, source: &SourceDescriptor) -> Result<Vec<RemoteFileRecord>, QueryError>;

    /// Remote URL a listed record is fetched from.
    fn remote_url(&self, record: &RemoteFileRecord) -> String;

    /// Map a remote locator (URL or bare filename) to its path relative to the local root.
    fn map_path(&self, locator: &str, options: &PathOptions) -> Result<String, MappingError>;

    /// Transfer `url` to `destination`, replacing any existing file.
    /// The parent directory already exists. Returns the number of bytes written.
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        source: &SourceDescriptor,
    ) -> Result<u64, FileError>;

    /// List, decide, and fetch every file for `source`.
    async fn sync(&self, source: &SourceDescriptor) -> Result<SyncReport, SyncError> {
        crate::engine::sync(self, source).await
    }
}

#[async_trait::async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn list(&self, source: &SourceDescriptor) -> Result<Vec<RemoteFileRecord>, QueryError> {
        (**self).list(source).await
    }

    fn remote_url(&self, record: &RemoteFileRecord) -> String {
        (**self).remote_url(record)
    }

    fn map_path(&self, locator: &str, options: &PathOptions) -> Result<String, MappingError> {
        (**self).map_path(locator, options)
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        source: &SourceDescriptor,
    ) -> Result<u64, FileError> {
        (**self).download(url, destination, source).await
    }

    async fn sync(&self, source: &SourceDescriptor) -> Result<SyncReport, SyncError> {
        (**self).sync(source).await
    }
}
