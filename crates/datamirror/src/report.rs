use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::decision::Decision;
use crate::error::FileError;
use crate::feedback::Feedback;

/// What happened to one listed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadOutcome {
    pub source_url: String,
    /// Absent when the locator could not be mapped.
    pub local_path: Option<PathBuf>,
    pub remote_checksum: String,
    /// Absent when the engine never got as far as deciding.
    pub decision: Option<Decision>,
    pub was_downloaded: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<FileError>,
}

impl DownloadOutcome {
    pub fn downloaded(
        source_url: impl Into<String>,
        local_path: PathBuf,
        remote_checksum: impl Into<String>,
        decision: Decision,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            local_path: Some(local_path),
            remote_checksum: remote_checksum.into(),
            decision: Some(decision),
            was_downloaded: true,
            error: None,
        }
    }

    /// Skipped files and dry-run candidates: a decision, but no transfer.
    pub fn undownloaded(
        source_url: impl Into<String>,
        local_path: PathBuf,
        remote_checksum: impl Into<String>,
        decision: Decision,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            local_path: Some(local_path),
            remote_checksum: remote_checksum.into(),
            decision: Some(decision),
            was_downloaded: false,
            error: None,
        }
    }

    pub fn failed(
        source_url: impl Into<String>,
        local_path: Option<PathBuf>,
        remote_checksum: impl Into<String>,
        decision: Option<Decision>,
        error: FileError,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            local_path,
            remote_checksum: remote_checksum.into(),
            decision,
            was_downloaded: false,
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Last path segment of the source URL.
    pub fn file_name(&self) -> &str {
        self.source_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.source_url)
    }
}

fn serialize_error<S: Serializer>(error: &Option<FileError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

/// Summary of one sync run, in listing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub handler: String,
    /// False only when the run was aborted by a fatal error.
    pub ok: bool,
    pub dry_run: bool,
    pub outcomes: Vec<DownloadOutcome>,
    pub message: String,
    pub feedback: Vec<Feedback>,
}

impl SyncReport {
    pub fn downloaded(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| o.was_downloaded)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.decision, Some(Decision::Skip(_))))
    }

    pub fn failed(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Files the run selected for transfer, whether or not the transfer happened.
    pub fn candidates(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.decision.is_some_and(|d| d.is_fetch()))
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(DownloadOutcome::is_failure)
    }
}

/// Accumulates per-file outcomes into a [`SyncReport`].
#[derive(Debug)]
pub struct ReportBuilder {
    handler: String,
    dry_run: bool,
    listed: usize,
    outcomes: Vec<DownloadOutcome>,
    feedback: Vec<Feedback>,
}

impl ReportBuilder {
    pub fn new(handler: impl Into<String>, dry_run: bool, listed: usize) -> Self {
        Self {
            handler: handler.into(),
            dry_run,
            listed,
            outcomes: Vec::with_capacity(listed),
            feedback: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: DownloadOutcome) {
        self.feedback.extend(Feedback::for_outcome(&outcome));
        self.outcomes.push(outcome);
    }

    /// Note how many records the listing for `pattern` returned.
    pub fn listed(&mut self, pattern: &str) {
        self.feedback.push(Feedback::Listed {
            pattern: pattern.to_owned(),
            count: self.listed,
        });
    }

    /// Close a run that processed every listed file.
    pub fn finish(mut self) -> SyncReport {
        let message = self.summary();
        self.feedback.push(Feedback::Completed {
            summary: message.clone(),
        });
        self.build(true, message)
    }

    /// Close a run that stopped early on a fatal per-file error.
    pub fn abort(mut self, cause: &FileError) -> SyncReport {
        let message = format!("aborted: {cause}; {}", self.summary());
        self.feedback.push(Feedback::Aborted {
            summary: message.clone(),
        });
        self.build(false, message)
    }

    fn build(self, ok: bool, message: String) -> SyncReport {
        SyncReport {
            handler: self.handler,
            ok,
            dry_run: self.dry_run,
            outcomes: self.outcomes,
            message,
            feedback: self.feedback,
        }
    }

    fn summary(&self) -> String {
        let failed: Vec<&DownloadOutcome> =
            self.outcomes.iter().filter(|o| o.is_failure()).collect();

        let mut msg = if self.dry_run {
            let candidates = self
                .outcomes
                .iter()
                .filter(|o| o.decision.is_some_and(|d| d.is_fetch()))
                .count();
            format!(
                "dry run: {candidates} of {} listed files would be downloaded",
                self.listed
            )
        } else {
            let downloaded = self.outcomes.iter().filter(|o| o.was_downloaded).count();
            let skipped = self
                .outcomes
                .iter()
                .filter(|o| matches!(o.decision, Some(Decision::Skip(_))))
                .count();
            format!(
                "{} files listed: {downloaded} downloaded, {skipped} skipped, {} failed",
                self.listed,
                failed.len()
            )
        };

        if !failed.is_empty() {
            let details: Vec<String> = failed
                .iter()
                .filter_map(|o| {
                    o.error
                        .as_ref()
                        .map(|e| format!("{} ({e})", o.file_name()))
                })
                .collect();
            msg.push_str(&format!("; failures: {}", details.join(", ")));
        }

        msg
    }
}

#[cfg(test)]
mod tests {
    use crate::decision::{FetchReason, SkipReason};
    use crate::error::{DownloadError, MappingError};

    use super::*;

    fn fetched(name: &str) -> DownloadOutcome {
        DownloadOutcome::downloaded(
            format!("https://host/{name}"),
            PathBuf::from(name),
            "c",
            Decision::Fetch(FetchReason::Missing),
        )
    }

    fn skipped(name: &str) -> DownloadOutcome {
        DownloadOutcome::undownloaded(
            format!("https://host/{name}"),
            PathBuf::from(name),
            "c",
            Decision::Skip(SkipReason::Unchanged),
        )
    }

    #[test]
    fn finish_counts_each_kind_of_outcome() {
        let mut builder = ReportBuilder::new("test", false, 3);
        builder.record(fetched("a.nc"));
        builder.record(skipped("b.nc"));
        builder.record(DownloadOutcome::failed(
            "https://host/c.nc",
            None,
            "c",
            None,
            MappingError::Unclassified("c.nc".into()).into(),
        ));

        let report = builder.finish();
        assert!(report.ok);
        assert_eq!(report.downloaded().count(), 1);
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(
            report.message,
            "3 files listed: 1 downloaded, 1 skipped, 1 failed; failures: c.nc (mapping error: unclassified locator: c.nc)"
        );
    }

    #[test]
    fn failures_become_feedback() {
        let mut builder = ReportBuilder::new("test", false, 1);
        builder.record(DownloadOutcome::failed(
            "https://host/a.nc",
            Some(PathBuf::from("a.nc")),
            "c",
            Some(Decision::Fetch(FetchReason::Missing)),
            DownloadError::Status {
                url: "https://host/a.nc".into(),
                status: 500,
            }
            .into(),
        ));

        let report = builder.finish();
        let failures: Vec<&Feedback> = report.feedback.iter().filter(|f| f.is_failure()).collect();
        assert_eq!(failures.len(), 1);
        assert!(
            failures[0].to_string().starts_with("warning: a.nc: download error"),
            "{}",
            failures[0]
        );
        assert!(report.has_failures());
        assert!(matches!(
            report.feedback.last(),
            Some(Feedback::Completed { .. })
        ));
    }

    #[test]
    fn abort_marks_report_not_ok() {
        let mut builder = ReportBuilder::new("test", false, 2);
        builder.record(fetched("a.nc"));
        let cause = FileError::Download(DownloadError::Transport {
            url: "https://host/b.nc".into(),
            message: "connection reset".into(),
        });

        let report = builder.abort(&cause);
        assert!(!report.ok);
        assert!(report.message.starts_with("aborted: download error"));
        assert!(matches!(
            report.feedback.last(),
            Some(Feedback::Aborted { .. })
        ));
    }

    #[test]
    fn dry_run_summary_counts_candidates() {
        let mut builder = ReportBuilder::new("test", true, 2);
        for name in ["a.nc", "b.nc"] {
            builder.record(DownloadOutcome::undownloaded(
                format!("https://host/{name}"),
                PathBuf::from(name),
                "c",
                Decision::Fetch(FetchReason::Forced),
            ));
        }

        let report = builder.finish();
        assert_eq!(report.candidates().count(), 2);
        assert_eq!(report.downloaded().count(), 0);
        assert_eq!(report.message, "dry run: 2 of 2 listed files would be downloaded");
    }

    #[test]
    fn report_serializes_errors_as_strings() {
        let mut builder = ReportBuilder::new("test", false, 1);
        builder.record(DownloadOutcome::failed(
            "https://host/x.txt",
            None,
            "c",
            None,
            MappingError::Unclassified("x.txt".into()).into(),
        ));
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(
            json["outcomes"][0]["error"],
            "mapping error: unclassified locator: x.txt"
        );
    }
}
