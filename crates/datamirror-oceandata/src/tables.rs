//! Abbreviation tables for OceanColor file names.
//!
//! Each table comes in two flavours: a lenient lookup returning `None` for an
//! unknown code, and a strict `require_*` lookup returning a [`MappingError`].

use std::collections::HashMap;
use std::sync::LazyLock;

use datamirror::MappingError;

const PLATFORMS: &[(char, &str)] = &[
    ('A', "MODISA"),
    ('C', "CZCS"),
    ('H', "HICO"),
    ('M', "MERIS"),
    ('O', "OCTS"),
    ('Q', "Aquarius"),
    ('S', "SeaWiFS"),
    ('T', "MODIST"),
    ('V', "VIIRS"),
];

const TIME_PERIODS: &[(&str, &str)] = &[
    ("DAY", "Daily"),
    ("8D", "8-day"),
    ("R32", "Rolling-32-Day"),
    ("MO", "Monthly"),
    ("YR", "Annual"),
    ("CU", "Cumulative"),
    ("SNSP", "Seasonal"),
    ("SNSU", "Seasonal"),
    ("SNAU", "Seasonal"),
    ("SNWI", "Seasonal"),
    ("MC", "Monthly_Climatology"),
    ("8DC", "8-day_Climatology"),
    ("SCSP", "Seasonal_Climatology"),
    ("SCSU", "Seasonal_Climatology"),
    ("SCAU", "Seasonal_Climatology"),
    ("SCWI", "Seasonal_Climatology"),
    ("YC", "Annual_Climatology"),
];

/// Mapped products in these time periods get a per-year directory.
pub const YEARLY_TIME_PERIODS: &[&str] = &["Daily", "8-day", "Rolling-32-Day"];

/// (platform codes, file name token, directory name)
const PARAMETERS: &[(&str, &str, &str)] = &[
    ("ACMOSTV", "CHL_chlor_a", "chlor_a"),
    ("AMOSTV", "CHL_chl_ocx", "chl_ocx"),
    ("AMOST", "KD490_Kd_490", "Kd_490"),
    ("V", "KD_Kd_490", "Kd_490"),
    ("ASTV", "PAR_par", "par"),
    ("ASTV", "PIC_pic", "pic"),
    ("ASTV", "POC_poc", "poc"),
    ("AT", "FLH_nflh", "nflh"),
    ("AT", "FLH_ipar", "ipar"),
    ("ASTV", "RRS_angstrom", "angstrom"),
    ("AT", "RRS_aot_869", "aot_869"),
    ("S", "RRS_aot_865", "aot_865"),
    ("V", "RRS_aot_862", "aot_862"),
    ("ATV", "SST_sst", "SST"),
    ("AT", "NSST_sst", "NSST"),
    ("AT", "SST4_sst4", "SST4"),
    ("V", "SST3_sst_triple", "SST3"),
    ("ASTV", "IOP_adg_443_giop", "adg_443_giop"),
    ("ASTV", "IOP_aph_443_giop", "aph_443_giop"),
    ("ASTV", "IOP_bbp_443_giop", "bbp_443_giop"),
    ("Q", "SSS_sss", "SSS"),
];

/// Remote-sensing reflectance bands (nm) per platform; `RRS_Rrs_<band>` maps to `Rrs_<band>`.
const REFLECTANCE_BANDS: &[(&str, &[u16])] = &[
    ("AT", &[412, 443, 469, 488, 531, 547, 555, 645, 667, 678]),
    ("S", &[412, 443, 490, 510, 555, 670]),
    ("V", &[410, 443, 486, 551, 671]),
    ("O", &[412, 443, 490, 516, 565, 667]),
    ("C", &[443, 520, 550, 670]),
    ("M", &[413, 443, 490, 510, 560, 620, 665, 681, 709]),
];

static PLATFORM_MAP: LazyLock<HashMap<char, &'static str>> =
    LazyLock::new(|| PLATFORMS.iter().copied().collect());

static TIME_PERIOD_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| TIME_PERIODS.iter().copied().collect());

static PARAMETER_MAP: LazyLock<HashMap<char, HashMap<String, String>>> = LazyLock::new(|| {
    let mut map: HashMap<char, HashMap<String, String>> = HashMap::new();

    for (platforms, token, name) in PARAMETERS {
        for platform in platforms.chars() {
            map.entry(platform)
                .or_default()
                .insert((*token).to_owned(), (*name).to_owned());
        }
    }

    for (platforms, bands) in REFLECTANCE_BANDS {
        for platform in platforms.chars() {
            let entries = map.entry(platform).or_default();
            for band in *bands {
                entries.insert(format!("RRS_Rrs_{band}"), format!("Rrs_{band}"));
            }
        }
    }

    map
});

pub fn platform_name(code: char) -> Option<&'static str> {
    PLATFORM_MAP.get(&code).copied()
}

pub fn time_period_name(code: &str) -> Option<&'static str> {
    TIME_PERIOD_MAP.get(code).copied()
}

pub fn parameter_name(platform: char, token: &str) -> Option<&'static str> {
    PARAMETER_MAP
        .get(&platform)
        .and_then(|tokens| tokens.get(token))
        .map(String::as_str)
}

pub fn require_platform(code: char) -> Result<&'static str, MappingError> {
    platform_name(code).ok_or_else(|| MappingError::UnknownCode {
        table: "platform",
        code: code.to_string(),
    })
}

pub fn require_time_period(code: &str) -> Result<&'static str, MappingError> {
    time_period_name(code).ok_or_else(|| MappingError::UnknownCode {
        table: "time period",
        code: code.to_owned(),
    })
}

pub fn require_parameter(platform: char, token: &str) -> Result<&'static str, MappingError> {
    parameter_name(platform, token).ok_or_else(|| MappingError::UnknownCode {
        table: "parameter",
        code: format!("{platform}:{token}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn platform_codes_resolve() {
        assert_eq!(platform_name('A'), Some("MODISA"));
        assert_eq!(platform_name('S'), Some("SeaWiFS"));
        assert_eq!(platform_name('V'), Some("VIIRS"));
        assert_eq!(platform_name('Z'), None);
    }

    #[test]
    fn platform_abbreviations_are_unique() {
        let codes: HashSet<char> = PLATFORMS.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes.len(), PLATFORMS.len());
        let names: HashSet<&str> = PLATFORMS.iter().map(|(_, n)| *n).collect();
        assert_eq!(names.len(), PLATFORMS.len());
    }

    #[test]
    fn time_period_codes_resolve() {
        assert_eq!(time_period_name("DAY"), Some("Daily"));
        assert_eq!(time_period_name("8D"), Some("8-day"));
        assert_eq!(time_period_name("R32"), Some("Rolling-32-Day"));
        assert_eq!(time_period_name("SNWI"), Some("Seasonal"));
        assert_eq!(time_period_name("FORTNIGHT"), None);
    }

    #[test]
    fn time_period_abbreviations_are_unique() {
        let codes: HashSet<&str> = TIME_PERIODS.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes.len(), TIME_PERIODS.len());
    }

    #[test]
    fn yearly_periods_are_known_names() {
        for period in YEARLY_TIME_PERIODS {
            assert!(TIME_PERIODS.iter().any(|(_, name)| name == period), "{period}");
        }
    }

    #[test]
    fn parameters_depend_on_platform() {
        assert_eq!(parameter_name('A', "CHL_chlor_a"), Some("chlor_a"));
        assert_eq!(parameter_name('S', "KD490_Kd_490"), Some("Kd_490"));
        assert_eq!(parameter_name('V', "KD_Kd_490"), Some("Kd_490"));
        assert_eq!(parameter_name('V', "KD490_Kd_490"), None);
        assert_eq!(parameter_name('A', "NSST_sst"), Some("NSST"));
        assert_eq!(parameter_name('S', "SST_sst"), None);
    }

    #[test]
    fn reflectance_bands_are_expanded() {
        assert_eq!(parameter_name('A', "RRS_Rrs_443"), Some("Rrs_443"));
        assert_eq!(parameter_name('T', "RRS_Rrs_678"), Some("Rrs_678"));
        assert_eq!(parameter_name('S', "RRS_Rrs_670"), Some("Rrs_670"));
        assert_eq!(parameter_name('V', "RRS_Rrs_486"), Some("Rrs_486"));
        assert_eq!(parameter_name('S', "RRS_Rrs_678"), None);
    }

    #[test]
    fn strict_lookups_fail_on_unknown_codes() {
        assert_eq!(require_platform('A'), Ok("MODISA"));
        assert_eq!(
            require_platform('Z'),
            Err(MappingError::UnknownCode {
                table: "platform",
                code: "Z".into()
            })
        );
        assert!(require_time_period("XX").is_err());
        assert_eq!(
            require_parameter('A', "CHL_bogus").unwrap_err().to_string(),
            "unrecognized parameter code `A:CHL_bogus`"
        );
    }
}
