use std::fmt;
use std::path::PathBuf;

use crate::report::SyncReport;

/// The remote listing could not be obtained or was not usable.
/// Always fatal to the sync run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("search pattern must not be empty")]
    EmptyPattern,

    #[error("listing request failed after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    #[error("listing request returned HTTP {0}")]
    Status(u16),

    #[error("no files matched search pattern `{0}`")]
    NoMatch(String),

    #[error("malformed listing response: {0}")]
    Malformed(String),
}

/// A remote locator could not be turned into a local path.
/// Isolated to the file it concerns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("unclassified locator: {0}")]
    Unclassified(String),

    #[error("missing type field in locator: {0}")]
    MissingTypeField(String),

    #[error("unrecognized {table} code `{code}`")]
    UnknownCode { table: &'static str, code: String },
}

/// A single file transfer failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error("transfer of {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("transfer of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Why one file in a run did not end up in the local mirror.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileError {
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FileError {
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        Self::Io(format!("{context}: {err}"))
    }

    pub fn is_download(&self) -> bool {
        matches!(self, Self::Download(_))
    }
}

/// Errors that end a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("listing failed: {0}")]
    Query(#[from] QueryError),

    #[error("local root {} is unusable: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("sync aborted: {cause}")]
    Aborted {
        cause: FileError,
        report: Box<SyncReport>,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    /// The outcomes gathered before the run was aborted, if any work had started.
    pub fn partial_report(&self) -> Option<&SyncReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_error_messages_name_the_problem() {
        let err = MappingError::Unclassified("readme.txt".into());
        assert_eq!(err.to_string(), "unclassified locator: readme.txt");

        let err = MappingError::UnknownCode {
            table: "parameter",
            code: "XYZ_foo".into(),
        };
        assert_eq!(err.to_string(), "unrecognized parameter code `XYZ_foo`");
    }

    #[test]
    fn file_error_wraps_component_errors() {
        let err: FileError = DownloadError::Status {
            url: "https://host/f.nc".into(),
            status: 503,
        }
        .into();
        assert!(err.is_download());
        assert_eq!(
            err.to_string(),
            "download error: transfer of https://host/f.nc returned HTTP 503"
        );

        let err: FileError = MappingError::MissingTypeField("A.L3m_".into()).into();
        assert!(!err.is_download());
    }

    #[test]
    fn query_error_converts_into_sync_error() {
        let err: SyncError = QueryError::NoMatch("X*".into()).into();
        assert!(matches!(err, SyncError::Query(QueryError::NoMatch(_))));
        assert!(err.partial_report().is_none());
    }
}
