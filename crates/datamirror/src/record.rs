use serde::Serialize;

/// One entry of a remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFileRecord {
    pub filename: String,
    pub remote_checksum: String,
}

impl RemoteFileRecord {
    pub fn new(filename: impl Into<String>, remote_checksum: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            remote_checksum: remote_checksum.into(),
        }
    }
}

/// Sort records by filename and keep only the first record for each filename.
///
/// The sort is stable, so when a listing repeats a filename the earliest
/// occurrence wins.
pub fn normalize_listing(mut records: Vec<RemoteFileRecord>) -> Vec<RemoteFileRecord> {
    records.sort_by(|a, b| a.filename.cmp(&b.filename));
    records.dedup_by(|later, earlier| later.filename == earlier.filename);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_filename() {
        let records = normalize_listing(vec![
            RemoteFileRecord::new("c.nc", "3"),
            RemoteFileRecord::new("a.nc", "1"),
            RemoteFileRecord::new("b.nc", "2"),
        ]);
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.nc", "b.nc", "c.nc"]);
    }

    #[test]
    fn drops_duplicate_filenames_keeping_first() {
        let records = normalize_listing(vec![
            RemoteFileRecord::new("b.nc", "first"),
            RemoteFileRecord::new("a.nc", "1"),
            RemoteFileRecord::new("b.nc", "second"),
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].filename, "b.nc");
        assert_eq!(records[1].remote_checksum, "first");
    }

    #[test]
    fn empty_listing_stays_empty() {
        assert!(normalize_listing(Vec::new()).is_empty());
    }
}
