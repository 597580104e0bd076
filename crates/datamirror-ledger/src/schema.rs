use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE sources (
            label           TEXT PRIMARY KEY,
            handler         TEXT,
            last_synced_at  TEXT
        );

        CREATE TABLE retrieved_files (
            source_label    TEXT NOT NULL,
            local_path      TEXT NOT NULL,
            source_url      TEXT NOT NULL,
            remote_checksum TEXT NOT NULL,
            retrieved_at    TEXT NOT NULL,
            PRIMARY KEY (source_label, local_path),
            FOREIGN KEY (source_label) REFERENCES sources(label)
        );

        CREATE INDEX idx_retrieved_files_url ON retrieved_files(source_url);",
    )])
}
