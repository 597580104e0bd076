use anyhow::Result;
use datamirror::{Handler, MappingError, PathOptions};

pub fn map_all<'a>(
    handler: &dyn Handler,
    locators: &'a [String],
    options: &PathOptions,
) -> Vec<(&'a str, Result<String, MappingError>)> {
    locators
        .iter()
        .map(|locator| (locator.as_str(), handler.map_path(locator, options)))
        .collect()
}

/// Print the mapped path of each locator. Fails if any locator cannot be mapped.
pub fn run(
    handler: &dyn Handler,
    locators: &[String],
    options: &PathOptions,
    describe: Option<&dyn Fn(&str) -> Option<String>>,
) -> Result<()> {
    let mut failed = 0usize;

    for (locator, result) in map_all(handler, locators, options) {
        match result {
            Ok(path) => {
                println!("{path}");
                if let Some(description) = describe.and_then(|describe| describe(locator)) {
                    println!("  {description}");
                }
            }
            Err(e) => {
                eprintln!("error: {locator}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} locators could not be mapped", locators.len());
    }
    Ok(())
}
