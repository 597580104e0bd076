use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy governing whether an existing local file is overwritten.
///
/// Levels are ordered: for a fixed local state, every file fetched at a
/// lower level is also fetched at any higher level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClobberLevel {
    /// Fetch only files that are missing locally.
    Never,
    /// Fetch missing files and files whose local hash differs from the remote checksum.
    #[default]
    IfChanged,
    /// Fetch every listed file.
    Always,
}

impl ClobberLevel {
    /// All levels, lowest first.
    pub fn all() -> [ClobberLevel; 3] {
        [Self::Never, Self::IfChanged, Self::Always]
    }
}

impl fmt::Display for ClobberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::IfChanged => write!(f, "if_changed"),
            Self::Always => write!(f, "always"),
        }
    }
}

impl FromStr for ClobberLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "never" | "0" => Ok(Self::Never),
            "if_changed" | "if-changed" | "ifchanged" | "1" => Ok(Self::IfChanged),
            "always" | "2" => Ok(Self::Always),
            other => Err(format!(
                "unknown clobber level `{other}` (expected never, if_changed or always)"
            )),
        }
    }
}

/// Username/password pair forwarded untouched to the transport layer.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything a handler needs to synchronize one logical data source.
///
/// Built once per run and passed by reference to every component; nothing
/// in the sync path reads settings from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub search_pattern: String,
    pub data_type_filter: Option<String>,
    pub credentials: Option<Credentials>,
    pub local_root: PathBuf,
    pub clobber_level: ClobberLevel,
    pub dry_run: bool,
    pub stop_on_download_error: bool,
}

impl SourceDescriptor {
    pub fn new(search_pattern: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            search_pattern: search_pattern.into(),
            data_type_filter: None,
            credentials: None,
            local_root: local_root.into(),
            clobber_level: ClobberLevel::default(),
            dry_run: false,
            stop_on_download_error: false,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type_filter = Some(data_type.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_clobber_level(mut self, level: ClobberLevel) -> Self {
        self.clobber_level = level;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_stop_on_download_error(mut self, stop: bool) -> Self {
        self.stop_on_download_error = stop;
        self
    }

    /// Absolute location of a mapped relative path under `local_root`.
    pub fn local_path(&self, relative: &str) -> PathBuf {
        self.local_root.join(Path::new(relative))
    }
}
