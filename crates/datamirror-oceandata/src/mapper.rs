use datamirror::{MappingError, PathOptions};

use crate::filename::{self, ParsedFilename, Product};
use crate::tables;

/// First segment of every mapped path.
pub const PROVIDER_HOST: &str = "oceandata.sci.gsfc.nasa.gov";

/// Canonical relative path for a parsed file name.
///
/// Layout:
/// - mapped: `<host>/<platform>/Mapped/<time period>/<res>/<parameter>[/<year>]`
/// - binned: `<host>/<platform>/L3BIN/<year>/<day of year>`
/// - level-2: `<host>/<platform>/L2/<year>/<day of year>`
///
/// followed by the file name unless `path_only` is set. Every table lookup
/// is strict.
pub fn map_parsed(parsed: &ParsedFilename, options: &PathOptions) -> Result<String, MappingError> {
    let mut segments: Vec<String> = vec![PROVIDER_HOST.to_owned()];

    match &parsed.product {
        Product::Mapped {
            time_period,
            parameter,
            resolution,
            unit,
        } => {
            let parameter_dir = tables::require_parameter(parsed.platform_code, parameter)?;
            let platform = tables::require_platform(parsed.platform_code)?;
            let period = tables::require_time_period(time_period)?;

            segments.push(platform.to_owned());
            segments.push("Mapped".to_owned());
            segments.push(period.to_owned());
            segments.push(format!("{resolution}{unit}"));
            segments.push(parameter_dir.to_owned());
            if tables::YEARLY_TIME_PERIODS.contains(&period) {
                segments.push(parsed.year().to_owned());
            }
        }
        Product::Binned { .. } => {
            let platform = tables::require_platform(parsed.platform_code)?;
            segments.push(platform.to_owned());
            segments.push("L3BIN".to_owned());
            segments.push(parsed.year().to_owned());
            segments.push(parsed.day_of_year().to_owned());
        }
        Product::Level2 { .. } => {
            let platform = tables::require_platform(parsed.platform_code)?;
            segments.push(platform.to_owned());
            segments.push("L2".to_owned());
            segments.push(parsed.year().to_owned());
            segments.push(parsed.day_of_year().to_owned());
        }
    }

    if !options.path_only {
        segments.push(parsed.basename.clone());
    }

    Ok(segments.join(&options.separator.to_string()))
}

/// Parse a locator and map it in one step.
pub fn map_locator(locator: &str, options: &PathOptions) -> Result<String, MappingError> {
    map_parsed(&filename::parse(locator)?, options)
}
