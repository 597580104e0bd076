use std::fmt;

use serde::Serialize;

use crate::report::DownloadOutcome;

/// Run event collected on a [`SyncReport`](crate::SyncReport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    Listed { pattern: String, count: usize },
    /// One file failed and the run moved on to the next.
    FileFailed { file: String, error: String },
    Completed { summary: String },
    /// A fatal per-file error stopped the run.
    Aborted { summary: String },
}

impl Feedback {
    /// `FileFailed` for an outcome carrying an error, `None` otherwise.
    pub fn for_outcome(outcome: &DownloadOutcome) -> Option<Self> {
        outcome.error.as_ref().map(|error| Self::FileFailed {
            file: outcome.file_name().to_owned(),
            error: error.to_string(),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FileFailed { .. } | Self::Aborted { .. })
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listed { pattern, count } => write!(f, "{count} files matched `{pattern}`"),
            Self::FileFailed { file, error } => write!(f, "warning: {file}: {error}"),
            Self::Completed { summary } => f.write_str(summary),
            Self::Aborted { summary } => write!(f, "error: {summary}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::decision::{Decision, FetchReason};
    use crate::error::DownloadError;

    use super::*;

    #[test]
    fn failed_outcome_names_the_file() {
        let outcome = DownloadOutcome::failed(
            "https://host/getfile/A2002359.L3m_DAY_CHL_chlor_a_9km.nc",
            Some(PathBuf::from("A2002359.L3m_DAY_CHL_chlor_a_9km.nc")),
            "c",
            Some(Decision::Fetch(FetchReason::Missing)),
            DownloadError::Status {
                url: "https://host/getfile/A2002359.L3m_DAY_CHL_chlor_a_9km.nc".into(),
                status: 503,
            }
            .into(),
        );

        let feedback = Feedback::for_outcome(&outcome).unwrap();
        let Feedback::FileFailed { file, error } = &feedback else {
            panic!("expected a file failure, got {feedback:?}");
        };
        assert_eq!(file, "A2002359.L3m_DAY_CHL_chlor_a_9km.nc");
        assert!(error.contains("503"), "{error}");
        assert!(feedback.is_failure());
    }

    #[test]
    fn successful_outcome_has_no_feedback() {
        let outcome = DownloadOutcome::downloaded(
            "https://host/getfile/f.nc",
            PathBuf::from("f.nc"),
            "c",
            Decision::Fetch(FetchReason::Missing),
        );
        assert_eq!(Feedback::for_outcome(&outcome), None);
    }

    #[test]
    fn display_prefixes_failures() {
        let listed = Feedback::Listed {
            pattern: "A2002*".into(),
            count: 4,
        };
        assert_eq!(listed.to_string(), "4 files matched `A2002*`");
        assert!(!listed.is_failure());

        let aborted = Feedback::Aborted {
            summary: "stopped".into(),
        };
        assert_eq!(aborted.to_string(), "error: stopped");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Feedback::Completed {
            summary: "done".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "completed", "summary": "done"}));
    }
}
