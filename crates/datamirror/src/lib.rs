pub mod checksum;
pub mod decision;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod handler;
pub mod record;
pub mod registry;
pub mod report;
pub mod source;

pub use decision::{Decision, FetchReason, SkipReason, decide};
pub use error::{DownloadError, FileError, MappingError, QueryError, SyncError};
pub use feedback::Feedback;
pub use handler::{Handler, PathOptions};
pub use record::{RemoteFileRecord, normalize_listing};
pub use registry::{HandlerRegistry, RegistryError};
pub use report::{DownloadOutcome, ReportBuilder, SyncReport};
pub use source::{ClobberLevel, Credentials, SourceDescriptor};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
