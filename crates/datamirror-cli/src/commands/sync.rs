use anyhow::Result;
use datamirror::{Feedback, Handler, SourceDescriptor, SyncError, SyncReport};
use datamirror_ledger::MirrorLedger;

/// Print failure feedback to stderr; the summary goes to stdout separately.
pub fn print_failures(feedback: &[Feedback]) {
    for item in feedback.iter().filter(|f| f.is_failure()) {
        eprintln!("{item}");
    }
}

/// One line per outcome: decision, file name, and error if any.
pub fn outcome_lines(report: &SyncReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|outcome| {
            let action = outcome
                .decision
                .map(|d| d.to_string())
                .unwrap_or_else(|| "failed".into());
            match &outcome.error {
                Some(error) => format!("{action:<18} {} ({error})", outcome.file_name()),
                None => format!("{action:<18} {}", outcome.file_name()),
            }
        })
        .collect()
}

fn print_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    print_failures(&report.feedback);
    for line in outcome_lines(report) {
        println!("  {line}");
    }
    println!("{}", report.message);
    Ok(())
}

/// Sync one source through the ledger, printing the report to stdout and
/// feedback to stderr.
pub async fn run(
    ledger: &MirrorLedger,
    handler: &dyn Handler,
    source: &SourceDescriptor,
    json: bool,
) -> Result<SyncReport> {
    if !json {
        println!("Syncing [{}] with {}...", ledger.label(), handler.name());
    }

    match ledger.sync(handler, source).await {
        Ok(report) => {
            print_report(&report, json)?;
            Ok(report)
        }
        Err(SyncError::Aborted { cause, report }) => {
            print_report(&report, json)?;
            Err(anyhow::anyhow!("sync aborted: {cause}"))
        }
        Err(e) => Err(anyhow::anyhow!("{e}")),
    }
}

#[cfg(test)]
mod tests {
    use datamirror::test_support::InMemoryHandler;

    use super::*;

    #[tokio::test]
    async fn outcome_lines_show_decisions_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let handler = InMemoryHandler::new("memory")
            .with_file("a.nc", b"hello")
            .with_file("b.nc", b"world")
            .with_unmappable("b.nc");

        let report = handler
            .sync(&SourceDescriptor::new("*", dir.path()))
            .await
            .unwrap();
        let lines = outcome_lines(&report);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("fetch (missing)"), "{}", lines[0]);
        assert!(lines[0].ends_with("a.nc"));
        assert!(lines[1].starts_with("failed"), "{}", lines[1]);
        assert!(lines[1].contains("b.nc (mapping error"), "{}", lines[1]);
    }

    #[tokio::test]
    async fn run_returns_the_recorded_report() {
        let dir = tempfile::tempdir().unwrap();
        let handler = InMemoryHandler::new("memory").with_file("a.nc", b"hello");
        let ledger = MirrorLedger::open_in_memory("test").unwrap();

        let report = run(&ledger, &handler, &SourceDescriptor::new("*", dir.path()), true)
            .await
            .unwrap();

        assert_eq!(report.downloaded().count(), 1);
        assert_eq!(ledger.retrieved_files().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn aborted_run_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = InMemoryHandler::new("memory")
            .with_file("a.nc", b"hello")
            .with_failing_transfer("a.nc");
        let ledger = MirrorLedger::open_in_memory("test").unwrap();
        let source = SourceDescriptor::new("*", dir.path()).with_stop_on_download_error(true);

        let err = run(&ledger, &handler, &source, false).await.unwrap_err();
        assert!(err.to_string().starts_with("sync aborted"), "{err}");
    }
}
