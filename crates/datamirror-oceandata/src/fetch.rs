use std::path::{Path, PathBuf};

use datamirror::{Credentials, DownloadError, FileError};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const DEFAULT_FETCH_URL: &str = "https://oceandata.sci.gsfc.nasa.gov/ob/getfile";

/// Streams provider files to disk.
///
/// Bodies are written to `<destination>.part` and renamed into place once
/// the transfer completes, so an interrupted transfer never leaves a
/// truncated file at the destination.
pub struct FetchClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl FetchClient {
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self { client, base_url }
    }

    fn base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_FETCH_URL)
            .trim_end_matches('/')
    }

    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base())
    }

    /// Download `url` to `destination`, returning the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<u64, FileError> {
        let partial = partial_path(destination);

        match self.transfer(url, &partial, credentials).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, destination)
                    .await
                    .map_err(|e| FileError::io(destination.display(), e))?;
                debug!(url, path = %destination.display(), bytes, "transfer complete");
                Ok(bytes)
            }
            Err(error) => {
                if let Err(e) = tokio::fs::remove_file(&partial).await
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    debug!(path = %partial.display(), error = %e, "could not remove partial file");
                }
                Err(error)
            }
        }
    }

    async fn transfer(
        &self,
        url: &str,
        partial: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<u64, FileError> {
        let transport = |e: reqwest::Error| DownloadError::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        };

        let mut request = self.client.get(url);
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let mut response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(|e| FileError::io(partial.display(), e))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| FileError::io(partial.display(), e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| FileError::io(partial.display(), e))?;

        Ok(written)
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
