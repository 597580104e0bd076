//! The per-file sync loop shared by every handler.
//!
//! Listing runs to completion first; records are then mapped, decided and
//! fetched one at a time in filename order. Mapping failures, local I/O
//! failures and (unless `stop_on_download_error` is set) transfer failures
//! are recorded on the file's outcome and the loop moves on.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::decision::{self, Decision, FetchReason};
use crate::error::{FileError, SyncError};
use crate::handler::{Handler, PathOptions};
use crate::report::{DownloadOutcome, ReportBuilder, SyncReport};
use crate::source::{ClobberLevel, SourceDescriptor};

#[tracing::instrument(
    skip_all,
    fields(handler = %handler.name(), search = %source.search_pattern, dry_run = source.dry_run)
)]
pub async fn sync<H: Handler + ?Sized>(
    handler: &H,
    source: &SourceDescriptor,
) -> Result<SyncReport, SyncError> {
    let records = handler.list(source).await?;
    info!(count = records.len(), "remote listing complete");

    if !source.dry_run {
        tokio::fs::create_dir_all(&source.local_root)
            .await
            .map_err(|e| SyncError::Io {
                path: source.local_root.clone(),
                message: e.to_string(),
            })?;
    }

    let mut report = ReportBuilder::new(handler.name(), source.dry_run, records.len());
    report.listed(&source.search_pattern);
    let options = PathOptions::default();

    for record in &records {
        let url = handler.remote_url(record);
        let checksum = record.remote_checksum.as_str();

        let relative = match handler.map_path(&url, &options) {
            Ok(relative) => relative,
            Err(e) => {
                warn!(file = %record.filename, error = %e, "cannot map remote file");
                report.record(DownloadOutcome::failed(url, None, checksum, None, e.into()));
                continue;
            }
        };
        let local_path = source.local_path(&relative);

        if source.dry_run {
            debug!(file = %record.filename, path = %local_path.display(), "would download");
            report.record(DownloadOutcome::undownloaded(
                url,
                local_path,
                checksum,
                Decision::Fetch(FetchReason::Forced),
            ));
            continue;
        }

        let decision = match decide_off_thread(source.clobber_level, &local_path, checksum).await {
            Ok(decision) => decision,
            Err(e) => {
                let error = FileError::io(local_path.display(), e);
                warn!(file = %record.filename, error = %error, "cannot inspect local copy");
                report.record(DownloadOutcome::failed(
                    url,
                    Some(local_path),
                    checksum,
                    None,
                    error,
                ));
                continue;
            }
        };
        debug!(file = %record.filename, %decision, "sync decision");

        if !decision.is_fetch() {
            report.record(DownloadOutcome::undownloaded(
                url, local_path, checksum, decision,
            ));
            continue;
        }

        match fetch_to(handler, &url, &local_path, source).await {
            Ok(bytes) => {
                info!(file = %record.filename, bytes, path = %local_path.display(), "downloaded");
                report.record(DownloadOutcome::downloaded(
                    url, local_path, checksum, decision,
                ));
            }
            Err(error) => {
                warn!(file = %record.filename, error = %error, "download failed");
                let fatal = source.stop_on_download_error && error.is_download();
                report.record(DownloadOutcome::failed(
                    url,
                    Some(local_path),
                    checksum,
                    Some(decision),
                    error.clone(),
                ));
                if fatal {
                    let partial = report.abort(&error);
                    return Err(SyncError::Aborted {
                        cause: error,
                        report: Box::new(partial),
                    });
                }
            }
        }
    }

    let report = report.finish();
    info!(summary = %report.message, "sync complete");
    Ok(report)
}

/// Hashing a multi-gigabyte local copy blocks, so it runs on the blocking pool.
async fn decide_off_thread(
    level: ClobberLevel,
    local_path: &Path,
    remote_checksum: &str,
) -> io::Result<Decision> {
    let path = local_path.to_path_buf();
    let checksum = remote_checksum.to_owned();
    tokio::task::spawn_blocking(move || decision::decide(level, &path, &checksum))
        .await
        .map_err(io::Error::other)?
}

async fn fetch_to<H: Handler + ?Sized>(
    handler: &H,
    url: &str,
    local_path: &Path,
    source: &SourceDescriptor,
) -> Result<u64, FileError> {
    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::io(parent.display(), e))?;
    }
    handler.download(url, local_path, source).await
}
