use anyhow::Result;
use datamirror::{Handler, PathOptions, RemoteFileRecord, SourceDescriptor};

/// A listed file with the path it would be mirrored to.
#[derive(Debug, PartialEq, Eq)]
pub struct ListingRow {
    pub checksum: String,
    pub filename: String,
    pub mapped: Result<String, String>,
}

pub fn rows(handler: &dyn Handler, records: &[RemoteFileRecord]) -> Vec<ListingRow> {
    records
        .iter()
        .map(|record| ListingRow {
            checksum: record.remote_checksum.clone(),
            filename: record.filename.clone(),
            mapped: handler
                .map_path(&handler.remote_url(record), &PathOptions::default())
                .map_err(|e| e.to_string()),
        })
        .collect()
}

/// Print the remote listing for a source. Touches nothing on disk.
pub async fn run(handler: &dyn Handler, source: &SourceDescriptor) -> Result<()> {
    let records = handler
        .list(source)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    for row in rows(handler, &records) {
        match &row.mapped {
            Ok(path) => println!("{}  {}  {path}", row.checksum, row.filename),
            Err(error) => println!("{}  {}  <unmapped: {error}>", row.checksum, row.filename),
        }
    }
    eprintln!("{} files", records.len());

    Ok(())
}
