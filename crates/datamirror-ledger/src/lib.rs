//! SQLite record of what each configured source has retrieved and when.

mod ledger;
pub mod schema;

pub use ledger::{LedgerError, MirrorLedger, RetrievedFile, STALE_THRESHOLD_DAYS, SyncStatus};
