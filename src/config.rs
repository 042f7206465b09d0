//! Layered application settings.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config FILE`, or `config.toml` in the platform config
//!    directory when present)
//! 3. Environment variables prefixed with `DUPESCAN_` (e.g. `DUPESCAN_WORKERS=8`)
//! 4. Command-line flags
//!
//! ```toml
//! workers = 8
//! include_empty = false
//! chunk_size = 131072
//! skip_hidden = true
//! min_size = 1024
//! format = "json"
//! progress = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{default_workers, FinderConfig};
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hashing workers; unset means one per available CPU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Whether zero-byte files take part in detection.
    pub include_empty: bool,
    /// Read buffer size for hashing, in bytes.
    pub chunk_size: usize,
    /// Skip entries whose name starts with a dot.
    pub skip_hidden: bool,
    /// Ignore files smaller than this many bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Ignore files larger than this many bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Report format.
    pub format: OutputFormat,
    /// Show progress bars on an interactive terminal.
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: None,
            include_empty: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            format: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the settings file and the environment.
    ///
    /// An explicit `path` must exist. Without one, the default file is used
    /// only if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if any layer
    /// holds a value of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path, ENV_PREFIX)?
            .extract()
            .context("Invalid configuration")
    }

    fn figment(path: Option<&Path>, env_prefix: &str) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                log::debug!("Loading settings from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = default_config_path().filter(|p| p.is_file()) {
                    log::debug!("Loading settings from {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(env_prefix)))
    }

    /// Apply command-line flags on top of the loaded settings.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(workers) = cli.workers {
            self.workers = Some(workers);
        }
        if cli.exclude_empty {
            self.include_empty = false;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Reject contradictory settings.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero worker count, a chunk size above 64 MiB,
    /// or a minimum size above the maximum size.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            bail!("workers must be at least 1");
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            bail!(
                "chunk_size ({}) is larger than the {} byte limit",
                self.chunk_size,
                MAX_CHUNK_SIZE
            );
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                bail!("min_size ({}) is larger than max_size ({})", min, max);
            }
        }
        Ok(())
    }

    /// Finder configuration for these settings.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers.unwrap_or_else(default_workers))
            .with_include_empty(self.include_empty)
            .with_chunk_size(self.chunk_size)
            .with_walker_config(WalkerConfig::new(
                self.skip_hidden,
                self.min_size,
                self.max_size,
            ))
    }

    /// Render the settings as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }
}

/// Platform settings file location, e.g. `~/.config/dupescan/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "dupescan", "dupescan")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
