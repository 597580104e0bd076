use anyhow::Result;
use datamirror_ledger::{MirrorLedger, SyncStatus};

pub fn describe(status: &SyncStatus) -> String {
    match status {
        SyncStatus::NeverSynced => "never synced".into(),
        SyncStatus::Fresh { days_old: 0 } => "synced today".into(),
        SyncStatus::Fresh { days_old } => format!("synced {days_old} day(s) ago"),
        SyncStatus::Stale { days_old } => format!("stale, last synced {days_old} days ago"),
    }
}

/// Print the sync state of one source.
pub fn run(ledger: &MirrorLedger, enabled: bool) -> Result<()> {
    let status = ledger.sync_status().map_err(|e| anyhow::anyhow!("{e}"))?;
    let files = ledger
        .retrieved_files()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut line = format!(
        "[{}] {}, {} file(s) retrieved",
        ledger.label(),
        describe(&status),
        files.len()
    );
    if !enabled {
        line.push_str(" (disabled)");
    }
    println!("{line}");

    if let SyncStatus::Stale { .. } = status
        && enabled
    {
        eprintln!(
            "warning: [{}] is stale. Run `datamirror sync --source {}` to refresh.",
            ledger.label(),
            ledger.label()
        );
    }

    Ok(())
}
