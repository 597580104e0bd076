//! Decoding of OceanColor file names.
//!
//! Three naming grammars are recognised, selected by a marker in the name:
//!
//! - mapped (`.L3m_`): `<P><yyyyddd>[<yyyyddd>].L3m_<period>_<parameter>_<res><unit>[.<ext>]`
//! - binned (`.L3b_`): `<P><yyyyddd>[<yyyyddd>].L3b_<period>_<parameter>[.<ext>]`
//! - level-2 (`.L2_`): `<P><yyyyddd><hhmmss>.L2_<coverage>_<parameter>[.<ext>]`
//!
//! where `<P>` is a one-letter platform code.

use std::fmt;
use std::sync::LazyLock;

use datamirror::MappingError;
use regex::{Captures, Regex};

use crate::tables;

const MAPPED_MARKER: &str = ".L3m_";
const BINNED_MARKER: &str = ".L3b_";
const LEVEL2_MARKER: &str = ".L2_";

static MAPPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<platform>[A-Z])(?P<date>\d{7}(?:\d{7})?)\.L3m_(?P<period>[A-Z0-9]+)_(?P<param>.+)_(?P<res>\d+(?:\.\d+)?)(?P<unit>km|deg)(?:\.(?P<ext>.+))?$",
    )
    .expect("mapped file name pattern is valid")
});

static BINNED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<platform>[A-Z])(?P<date>\d{7}(?:\d{7})?)\.L3b_(?P<period>[A-Z0-9]+)_(?P<param>[^.]+)(?:\.(?P<ext>.+))?$",
    )
    .expect("binned file name pattern is valid")
});

static LEVEL2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<platform>[A-Z])(?P<date>\d{7})(?P<time>\d{6})\.L2_(?P<coverage>[A-Z0-9]+)_(?P<param>[^.]+)(?:\.(?P<ext>.+))?$",
    )
    .expect("level-2 file name pattern is valid")
});

/// Processing level encoded in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingType {
    Mapped,
    Binned,
    Level2,
}

impl fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped => write!(f, "Level-3 mapped"),
            Self::Binned => write!(f, "Level-3 binned"),
            Self::Level2 => write!(f, "Level-2"),
        }
    }
}

/// Grammar-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Product {
    Mapped {
        time_period: String,
        parameter: String,
        resolution: String,
        unit: String,
    },
    Binned {
        time_period: String,
        parameter: String,
    },
    Level2 {
        coverage: String,
        parameter: String,
        time_of_day: String,
    },
}

/// Structured view of one remote file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub basename: String,
    pub platform_code: char,
    /// `yyyyddd`, or `yyyydddyyyyddd` for composites.
    pub acquisition_date: String,
    pub product: Product,
    pub extension: Option<String>,
}

impl ParsedFilename {
    pub fn processing_type(&self) -> ProcessingType {
        match self.product {
            Product::Mapped { .. } => ProcessingType::Mapped,
            Product::Binned { .. } => ProcessingType::Binned,
            Product::Level2 { .. } => ProcessingType::Level2,
        }
    }

    /// Time-period code for level-3 files, coverage code for level-2 files.
    pub fn period_or_coverage_code(&self) -> &str {
        match &self.product {
            Product::Mapped { time_period, .. } | Product::Binned { time_period, .. } => {
                time_period
            }
            Product::Level2 { coverage, .. } => coverage,
        }
    }

    pub fn parameter_token(&self) -> &str {
        match &self.product {
            Product::Mapped { parameter, .. }
            | Product::Binned { parameter, .. }
            | Product::Level2 { parameter, .. } => parameter,
        }
    }

    /// Spatial resolution with its unit, e.g. `9km`. Mapped files only.
    pub fn spatial_code(&self) -> Option<String> {
        match &self.product {
            Product::Mapped {
                resolution, unit, ..
            } => Some(format!("{resolution}{unit}")),
            _ => None,
        }
    }

    pub fn year(&self) -> &str {
        &self.acquisition_date[..4]
    }

    pub fn day_of_year(&self) -> &str {
        &self.acquisition_date[4..7]
    }

    /// End date of a composite, `yyyyddd`.
    pub fn end_date(&self) -> Option<&str> {
        (self.acquisition_date.len() == 14).then(|| &self.acquisition_date[7..])
    }

    /// One-line human description. Unknown codes are shown as `?`.
    pub fn describe(&self) -> String {
        let platform = tables::platform_name(self.platform_code).unwrap_or("?");
        let mut parts = vec![
            format!("{platform} {}", self.processing_type()),
            format!("{} day {}", self.year(), self.day_of_year()),
        ];

        match &self.product {
            Product::Mapped {
                time_period,
                parameter,
                ..
            } => {
                parts.push(tables::time_period_name(time_period).unwrap_or("?").to_owned());
                parts.push(
                    tables::parameter_name(self.platform_code, parameter)
                        .unwrap_or("?")
                        .to_owned(),
                );
                if let Some(spatial) = self.spatial_code() {
                    parts.push(spatial);
                }
            }
            Product::Binned {
                time_period,
                parameter,
            } => {
                parts.push(tables::time_period_name(time_period).unwrap_or("?").to_owned());
                parts.push(parameter.clone());
            }
            Product::Level2 {
                coverage,
                parameter,
                time_of_day,
            } => {
                parts.push(format!("{coverage} {parameter}"));
                parts.push(format!("{time_of_day} UTC"));
            }
        }

        parts.join(", ")
    }
}

/// Last path segment of a URL or path, without any query string.
pub fn basename(locator: &str) -> &str {
    let without_query = locator.split(['?', '#']).next().unwrap_or(locator);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
}

/// Grammar a locator belongs to, judged by its marker alone.
pub fn classify(locator: &str) -> Option<ProcessingType> {
    let name = basename(locator);
    if name.contains(MAPPED_MARKER) {
        Some(ProcessingType::Mapped)
    } else if name.contains(BINNED_MARKER) {
        Some(ProcessingType::Binned)
    } else if name.contains(LEVEL2_MARKER) {
        Some(ProcessingType::Level2)
    } else {
        None
    }
}

/// Parse a remote locator (URL or bare file name).
pub fn parse(locator: &str) -> Result<ParsedFilename, MappingError> {
    let name = basename(locator);
    let kind = classify(name).ok_or_else(|| MappingError::Unclassified(locator.to_owned()))?;

    let pattern: &Regex = match kind {
        ProcessingType::Mapped => &*MAPPED,
        ProcessingType::Binned => &*BINNED,
        ProcessingType::Level2 => &*LEVEL2,
    };
    let caps = pattern
        .captures(name)
        .ok_or_else(|| MappingError::MissingTypeField(locator.to_owned()))?;

    let product = match kind {
        ProcessingType::Mapped => Product::Mapped {
            time_period: group(&caps, "period"),
            parameter: group(&caps, "param"),
            resolution: group(&caps, "res"),
            unit: group(&caps, "unit"),
        },
        ProcessingType::Binned => Product::Binned {
            time_period: group(&caps, "period"),
            parameter: group(&caps, "param"),
        },
        ProcessingType::Level2 => Product::Level2 {
            coverage: group(&caps, "coverage"),
            parameter: group(&caps, "param"),
            time_of_day: group(&caps, "time"),
        },
    };

    let platform_code = caps
        .name("platform")
        .and_then(|m| m.as_str().chars().next())
        .ok_or_else(|| MappingError::MissingTypeField(locator.to_owned()))?;

    Ok(ParsedFilename {
        basename: name.to_owned(),
        platform_code,
        acquisition_date: group(&caps, "date"),
        product,
        extension: caps.name("ext").map(|m| m.as_str().to_owned()),
    })
}

fn group(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}
