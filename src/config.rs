//! Application configuration: listen address and question sources.
//!
//! Loaded from TOML. Every field has a default, so an absent file or an empty
//! one yields the built-in `fe` and `ap` sources on `127.0.0.1:8080`.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::fetch::{DEFAULT_CHARSET, LEAST_INTERVAL};
use crate::query::QueryRange;
use crate::source::Source;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WAIT_SECS: u64 = 10;

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Address the HTTP front end binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP front end listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Question sources, each served under its own sub-address.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Name used on the command line.
    pub name: String,

    /// Path prefix of this source's routes, e.g. `/fe`.
    pub sub_addr: String,

    /// URL template.
    pub url: String,

    /// Per-request deadline in seconds.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,

    /// Base pacing interval in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Charset assumed for pages that do not declare one.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Day the latest autumn sitting is published.
    #[serde(default)]
    pub autumn_cutoff: Option<NaiveDate>,

    /// Questions the archive serves.
    pub range: QueryRange,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::builtin("fe", Source::fe()),
        SourceConfig::builtin("ap", Source::ap()),
    ]
}

fn default_wait_secs() -> u64 {
    DEFAULT_WAIT_SECS
}

fn default_interval_secs() -> u64 {
    LEAST_INTERVAL.as_secs()
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sources: default_sources(),
        }
    }
}

impl SourceConfig {
    /// Entry for a built-in source, mounted at `/{name}`.
    #[must_use]
    pub fn builtin(name: &str, source: Source) -> Self {
        Self {
            name: name.to_string(),
            sub_addr: format!("/{name}"),
            url: source.url,
            wait_secs: DEFAULT_WAIT_SECS,
            interval_secs: default_interval_secs(),
            charset: default_charset(),
            autumn_cutoff: source.autumn_cutoff,
            range: source.range,
        }
    }

    /// The [`Source`] this entry describes.
    #[must_use]
    pub fn source(&self) -> Source {
        Source {
            url: self.url.clone(),
            range: self.range,
            autumn_cutoff: self.autumn_cutoff,
        }
    }

    /// Path prefix the server mounts this source under, without a trailing '/'.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        self.sub_addr.trim_end_matches('/')
    }

    /// Per-request deadline.
    #[must_use]
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Base pacing interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Invalid source: `name` must not be empty");
        }
        let name = &self.name;
        if !self.sub_addr.starts_with('/') {
            bail!(
                "Invalid config value for `sub_addr` of source `{name}`: {:?}. Must start with '/'",
                self.sub_addr
            );
        }
        if self.url.trim().is_empty() {
            bail!("Invalid source `{name}`: `url` must not be empty");
        }
        if self.wait_secs == 0 {
            bail!("Invalid config value for `wait_secs` of source `{name}`: 0. Expected at least 1");
        }
        let floor = LEAST_INTERVAL.as_secs();
        if self.interval_secs < floor {
            bail!(
                "Invalid config value for `interval_secs` of source `{name}`: {}. Expected at least {floor}",
                self.interval_secs
            );
        }
        self.range
            .check_order()
            .with_context(|| format!("Invalid `range` of source `{name}`"))?;
        Ok(())
    }
}

impl AppConfig {
    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or values [`validate`](Self::validate)
    /// rejects.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("Invalid config value for `host`: must not be empty");
        }
        if self.port == 0 {
            bail!("Invalid config value for `port`: 0. Expected range: 1..=65535");
        }
        if self.sources.is_empty() {
            bail!("Invalid config: at least one `[[sources]]` entry is required");
        }

        let mut names = HashSet::new();
        let mut sub_addrs = HashSet::new();
        for source in &self.sources {
            source.validate()?;
            if !names.insert(source.name.as_str()) {
                bail!("Duplicate source name `{}`", source.name);
            }
            if !sub_addrs.insert(source.route_prefix()) {
                bail!("Duplicate source sub_addr `{}`", source.sub_addr);
            }
        }
        Ok(())
    }

    /// `host:port` for binding the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Looks up a source by name.
    #[must_use]
    pub fn source_named(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|source| source.name == name)
    }

    /// Comma-separated source names, for error messages.
    #[must_use]
    pub fn source_names(&self) -> String {
        self.sources
            .iter()
            .map(|source| source.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path that was read, or would have been read.
    pub path: Option<PathBuf>,
    /// Effective configuration.
    pub config: AppConfig,
    /// Whether the configuration came from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/kakomon/config.toml`
/// 2. `$HOME/.config/kakomon/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("kakomon")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("kakomon")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads configuration.
///
/// An explicit path must exist. Without one, the default path is read when
/// present and built-in defaults are used otherwise.
///
/// # Errors
///
/// Returns an error when a file cannot be read, parsed or validated.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        info!(path = %path.display(), "loaded configuration");
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config,
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = load_file_config(path_ref)?;
            info!(path = %path_ref.display(), "loaded configuration");
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => {
            debug!("no configuration file; using built-in sources");
            Ok(LoadedConfig {
                path,
                config: AppConfig::default(),
                loaded_from_file: false,
            })
        }
    }
}

/// Reads, parses and validates one configuration file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed or validated.
pub fn load_file_config(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    AppConfig::from_toml_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))
}
