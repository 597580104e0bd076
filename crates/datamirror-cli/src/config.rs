use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use datamirror::{ClobberLevel, Credentials, SourceDescriptor};
use datamirror_oceandata::{HANDLER_NAME, OceandataConfig};
use serde::{Deserialize, Serialize};

const USER_ENV: &str = "EARTHDATA_USER";
const PASSWORD_ENV: &str = "EARTHDATA_PASSWORD";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub oceandata: OceandataSettings,
}

/// Endpoint overrides for the OceanColor handler.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OceandataSettings {
    pub listing_url: Option<String>,
    pub fetch_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl OceandataSettings {
    pub fn handler_config(&self) -> OceandataConfig {
        OceandataConfig {
            listing_url: self.listing_url.clone(),
            fetch_url: self.fetch_url.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            ..OceandataConfig::default()
        }
    }
}

/// A single mirrored data source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceEntry {
    pub label: String,
    #[serde(default = "default_handler")]
    pub handler: String,
    pub search: String,
    pub dtype: Option<String>,
    pub local_root: PathBuf,
    #[serde(default)]
    pub clobber: ClobberLevel,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub stop_on_download_error: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl SourceEntry {
    /// Build the run descriptor. `force_dry_run` overrides the configured flag.
    pub fn descriptor(&self, force_dry_run: bool) -> SourceDescriptor {
        let mut descriptor = SourceDescriptor::new(&self.search, expand_home(&self.local_root))
            .with_clobber_level(self.clobber)
            .with_dry_run(self.dry_run || force_dry_run)
            .with_stop_on_download_error(self.stop_on_download_error);

        if let Some(dtype) = &self.dtype {
            descriptor = descriptor.with_data_type(dtype);
        }
        if let Some(credentials) = self.credentials(|key| std::env::var(key).ok()) {
            descriptor = descriptor.with_credentials(credentials);
        }
        descriptor
    }

    /// Configured credentials, falling back to the environment per field.
    fn credentials(&self, env: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        let user = self.user.clone().or_else(|| env(USER_ENV))?;
        let password = self.password.clone().or_else(|| env(PASSWORD_ENV))?;
        Some(Credentials::new(user, password))
    }
}

fn default_true() -> bool {
    true
}

fn default_handler() -> String {
    HANDLER_NAME.into()
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Config file path: `~/.config/datamirror/sources.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("datamirror").join("sources.toml"))
}

/// Load config for commands that operate on configured sources.
///
/// A missing file is an error whether it was named with `--config` or not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_path().context("could not determine config directory")?,
    };
    if !path.exists() {
        anyhow::bail!(
            "no config file at {}; add [[sources]] entries there or pass --config",
            path.display()
        );
    }
    read_config(&path)
}

/// Load config for commands that need no sources (`map`, `handlers`).
///
/// A missing default file yields an empty config.
pub fn load_optional_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => load_config(Some(path)),
        None => match config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(AppConfig::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("failed to parse config at {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;

    let mut labels = std::collections::HashSet::new();
    for source in &config.sources {
        if !labels.insert(source.label.as_str()) {
            anyhow::bail!("duplicate source label `{}`", source.label);
        }
    }

    Ok(config)
}
