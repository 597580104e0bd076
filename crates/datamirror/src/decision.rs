use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::checksum;
use crate::source::ClobberLevel;

/// Why a listed file is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A local copy exists and the policy never overwrites.
    Present,
    /// The local copy hashes to the remote checksum.
    Unchanged,
}

/// Why a listed file is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchReason {
    Missing,
    Changed,
    /// The remote checksum is not a digest we can reproduce locally.
    UnverifiableChecksum,
    /// Fetched regardless of local state.
    Forced,
}

/// Per-file verdict of the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "reason")]
pub enum Decision {
    Skip(SkipReason),
    Fetch(FetchReason),
}

impl Decision {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip(SkipReason::Present) => write!(f, "skip (present)"),
            Self::Skip(SkipReason::Unchanged) => write!(f, "skip (unchanged)"),
            Self::Fetch(FetchReason::Missing) => write!(f, "fetch (missing)"),
            Self::Fetch(FetchReason::Changed) => write!(f, "fetch (changed)"),
            Self::Fetch(FetchReason::UnverifiableChecksum) => {
                write!(f, "fetch (unverifiable checksum)")
            }
            Self::Fetch(FetchReason::Forced) => write!(f, "fetch (forced)"),
        }
    }
}

/// Decide whether the file at `local_path` must be (re)fetched.
///
/// Only reads the filesystem: an existence probe, plus a content hash
/// under [`ClobberLevel::IfChanged`].
pub fn decide(
    level: ClobberLevel,
    local_path: &Path,
    remote_checksum: &str,
) -> io::Result<Decision> {
    if level == ClobberLevel::Always {
        return Ok(Decision::Fetch(FetchReason::Forced));
    }

    if !local_path.try_exists()? {
        return Ok(Decision::Fetch(FetchReason::Missing));
    }

    match level {
        ClobberLevel::Never => Ok(Decision::Skip(SkipReason::Present)),
        ClobberLevel::IfChanged => {
            match checksum::matches_remote(local_path, remote_checksum)? {
                Some(true) => Ok(Decision::Skip(SkipReason::Unchanged)),
                Some(false) => Ok(Decision::Fetch(FetchReason::Changed)),
                None => Ok(Decision::Fetch(FetchReason::UnverifiableChecksum)),
            }
        }
        ClobberLevel::Always => Ok(Decision::Fetch(FetchReason::Forced)),
    }
}
