use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use datamirror::{Handler, SourceDescriptor, SyncError, SyncReport};
use serde::Serialize;
use tracing::{debug, info};

use crate::schema;

/// How recently a source completed a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    NeverSynced,
    Stale { days_old: u64 },
    Fresh { days_old: u64 },
}

/// Days after which a source is considered stale.
pub const STALE_THRESHOLD_DAYS: u64 = 7;

/// One file the ledger knows was retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievedFile {
    pub local_path: PathBuf,
    pub source_url: String,
    pub remote_checksum: String,
    /// Seconds since the Unix epoch.
    pub retrieved_at: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("ledger connection lock was poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// SQLite-backed ledger for one configured source.
pub struct MirrorLedger {
    conn: Mutex<rusqlite::Connection>,
    label: String,
}

impl MirrorLedger {
    /// Open a ledger backed by a file on disk.
    pub fn open(path: &Path, label: impl Into<String>) -> Result<Self, LedgerError> {
        let conn = rusqlite::Connection::open(path)?;
        Self::with_connection(conn, label.into())
    }

    /// Open an in-memory ledger (for testing).
    pub fn open_in_memory(label: impl Into<String>) -> Result<Self, LedgerError> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::with_connection(conn, label.into())
    }

    fn with_connection(conn: rusqlite::Connection, label: String) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            conn: Mutex::new(conn),
            label,
        };
        ledger.migrate()?;
        Ok(ledger)
    }

    fn migrate(&mut self) -> Result<(), LedgerError> {
        let conn = self.conn.get_mut().map_err(|_| LedgerError::Poisoned)?;
        schema::migrations()
            .to_latest(conn)
            .map_err(|e| LedgerError::Migration(e.to_string()))?;

        conn.execute(
            "INSERT OR IGNORE INTO sources (label, handler, last_synced_at) VALUES (?1, NULL, NULL)",
            [&self.label],
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, LedgerError> {
        self.conn.lock().map_err(|_| LedgerError::Poisoned)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sync_status(&self) -> Result<SyncStatus, LedgerError> {
        let conn = self.conn()?;

        let timestamp: Option<String> = conn.query_row(
            "SELECT last_synced_at FROM sources WHERE label = ?1",
            [&self.label],
            |row| row.get(0),
        )?;

        Ok(match timestamp {
            None => SyncStatus::NeverSynced,
            Some(timestamp) => {
                let days_old = days_since(&timestamp).unwrap_or(0);
                if days_old >= STALE_THRESHOLD_DAYS {
                    SyncStatus::Stale { days_old }
                } else {
                    SyncStatus::Fresh { days_old }
                }
            }
        })
    }

    /// Handler that last completed a sync for this source.
    pub fn last_handler(&self) -> Result<Option<String>, LedgerError> {
        let conn = self.conn()?;
        let handler = conn.query_row(
            "SELECT handler FROM sources WHERE label = ?1",
            [&self.label],
            |row| row.get(0),
        )?;
        Ok(handler)
    }

    /// Insert or replace the row for one retrieved file.
    pub fn record_file(&self, file: &RetrievedFile) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO retrieved_files
                (source_label, local_path, source_url, remote_checksum, retrieved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                &self.label,
                file.local_path.to_string_lossy().into_owned(),
                file.source_url,
                file.remote_checksum,
                file.retrieved_at.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Record a completed sync by `handler` at the current time.
    pub fn record_sync(&self, handler: &str) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE sources SET handler = ?2, last_synced_at = ?3 WHERE label = ?1",
            rusqlite::params![&self.label, handler, now_epoch_secs().to_string()],
        )?;
        Ok(())
    }

    /// Set the last_synced_at timestamp manually (for testing staleness).
    pub fn set_last_synced_at(&self, epoch_secs: u64) -> Result<(), LedgerError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE sources SET last_synced_at = ?2 WHERE label = ?1",
            rusqlite::params![&self.label, epoch_secs.to_string()],
        )?;
        Ok(())
    }

    /// Every retrieved file for this source, ordered by local path.
    pub fn retrieved_files(&self) -> Result<Vec<RetrievedFile>, LedgerError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT local_path, source_url, remote_checksum, retrieved_at
             FROM retrieved_files
             WHERE source_label = ?1
             ORDER BY local_path",
        )?;

        let rows = stmt.query_map([&self.label], |row| {
            let local_path: String = row.get(0)?;
            let retrieved_at: String = row.get(3)?;
            Ok(RetrievedFile {
                local_path: PathBuf::from(local_path),
                source_url: row.get(1)?,
                remote_checksum: row.get(2)?,
                retrieved_at: retrieved_at.parse().unwrap_or(0),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Run `handler` against `source` and record what it retrieved.
    ///
    /// A completed run records every downloaded file and the sync time. An
    /// aborted run records the files downloaded before the abort but leaves
    /// the sync time alone. Dry runs record nothing.
    pub async fn sync(
        &self,
        handler: &dyn Handler,
        source: &SourceDescriptor,
    ) -> Result<SyncReport, SyncError> {
        match handler.sync(source).await {
            Ok(report) => {
                if !report.dry_run {
                    self.record_downloads(&report).map_err(storage)?;
                    self.record_sync(&report.handler).map_err(storage)?;
                    info!(label = %self.label, "sync recorded");
                }
                Ok(report)
            }
            Err(err) => {
                if let Some(report) = err.partial_report() {
                    self.record_downloads(report).map_err(storage)?;
                }
                Err(err)
            }
        }
    }

    fn record_downloads(&self, report: &SyncReport) -> Result<(), LedgerError> {
        let retrieved_at = now_epoch_secs();
        for outcome in report.downloaded() {
            let Some(local_path) = &outcome.local_path else {
                continue;
            };
            debug!(path = %local_path.display(), "recording retrieved file");
            self.record_file(&RetrievedFile {
                local_path: local_path.clone(),
                source_url: outcome.source_url.clone(),
                remote_checksum: outcome.remote_checksum.clone(),
                retrieved_at,
            })?;
        }
        Ok(())
    }
}

fn storage(e: LedgerError) -> SyncError {
    SyncError::Storage(e.to_string())
}

fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn days_since(timestamp: &str) -> Option<u64> {
    let then: u64 = timestamp.parse().ok()?;
    Some(now_epoch_secs().saturating_sub(then) / 86400)
}
