use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;

use crate::checksum::{ChecksumAlgorithm, digest_bytes};
use crate::record::normalize_listing;
use crate::{
    DownloadError, FileError, Handler, MappingError, PathOptions, QueryError, RemoteFileRecord,
    SourceDescriptor,
};

/// In-memory handler for testing. Serves file contents from a map and mirrors
/// every file to `<local_root>/<name>/<filename>`.
pub struct InMemoryHandler {
    name: String,
    files: BTreeMap<String, Vec<u8>>,
    unmappable: BTreeSet<String>,
    failing: BTreeSet<String>,
    listing_error: Option<QueryError>,
    downloads: Mutex<Vec<String>>,
}

impl InMemoryHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
            unmappable: BTreeSet::new(),
            failing: BTreeSet::new(),
            listing_error: None,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(mut self, filename: &str, content: &[u8]) -> Self {
        self.put_file(filename, content);
        self
    }

    /// Add or replace a remote file.
    pub fn put_file(&mut self, filename: &str, content: &[u8]) {
        self.files.insert(filename.to_owned(), content.to_vec());
    }

    /// Mapping this file fails with an unknown-code error.
    pub fn with_unmappable(mut self, filename: &str) -> Self {
        self.unmappable.insert(filename.to_owned());
        self
    }

    /// Transfers of this file fail with a transport error.
    pub fn with_failing_transfer(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_owned());
        self
    }

    pub fn with_listing_error(mut self, error: QueryError) -> Self {
        self.listing_error = Some(error);
        self
    }

    /// URLs transferred so far, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn clear_downloads(&self) {
        self.downloads.lock().unwrap().clear();
    }

    fn basename(locator: &str) -> &str {
        locator.rsplit('/').next().unwrap_or(locator)
    }
}

#[async_trait::async_trait]
impl Handler for InMemoryHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, source: &SourceDescriptor) -> Result<Vec<RemoteFileRecord>, QueryError> {
        if source.search_pattern.is_empty() {
            return Err(QueryError::EmptyPattern);
        }
        if let Some(error) = &self.listing_error {
            return Err(error.clone());
        }
        Ok(normalize_listing(
            self.files
                .iter()
                .map(|(name, content)| {
                    RemoteFileRecord::new(name, digest_bytes(content, ChecksumAlgorithm::Sha1))
                })
                .collect(),
        ))
    }

    fn remote_url(&self, record: &RemoteFileRecord) -> String {
        format!("mem://{}/{}", self.name, record.filename)
    }

    fn map_path(&self, locator: &str, options: &PathOptions) -> Result<String, MappingError> {
        let basename = Self::basename(locator);
        if self.unmappable.contains(basename) {
            return Err(MappingError::UnknownCode {
                table: "parameter",
                code: basename.to_owned(),
            });
        }
        if options.path_only {
            Ok(self.name.clone())
        } else {
            Ok(format!("{}{}{basename}", self.name, options.separator))
        }
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        _source: &SourceDescriptor,
    ) -> Result<u64, FileError> {
        let basename = Self::basename(url);
        if self.failing.contains(basename) {
            return Err(DownloadError::Transport {
                url: url.to_owned(),
                message: "connection reset by peer".into(),
            }
            .into());
        }
        let content = self.files.get(basename).ok_or_else(|| DownloadError::Status {
            url: url.to_owned(),
            status: 404,
        })?;
        std::fs::write(destination, content)
            .map_err(|e| FileError::io(destination.display(), e))?;
        self.downloads.lock().unwrap().push(url.to_owned());
        Ok(content.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_files_with_sha1_checksums() {
        let handler = InMemoryHandler::new("memory").with_file("a.nc", b"hello");
        let records = handler
            .list(&SourceDescriptor::new("*", "/unused"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].remote_checksum,
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
    }

    #[tokio::test]
    async fn empty_pattern_is_rejected() {
        let handler = InMemoryHandler::new("memory");
        let result = handler.list(&SourceDescriptor::new("", "/unused")).await;
        assert_eq!(result, Err(QueryError::EmptyPattern));
    }

    #[test]
    fn maps_into_handler_directory() {
        let handler = InMemoryHandler::new("memory");
        assert_eq!(
            handler
                .map_path("mem://memory/a.nc", &PathOptions::default())
                .unwrap(),
            "memory/a.nc"
        );
        assert_eq!(
            handler
                .map_path("a.nc", &PathOptions::directory())
                .unwrap(),
            "memory"
        );
    }
}
