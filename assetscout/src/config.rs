use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{Result, SearchError};
use crate::filters::strip_type_prefix;

/// Default lower size bound in bytes
pub const DEFAULT_MIN_FILE_SIZE: u64 = 100;
/// Default upper size bound in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
/// Worker count used when hardware parallelism cannot be detected
pub const FALLBACK_THREAD_COUNT: usize = 4;

/// Directory searched when no roots are given
pub const DEFAULT_CONTENT_DIR: &str = "Content/Assets";
/// Directory whose children's `Content` folders are searched with `include_plugins`
pub const PLUGINS_DIR: &str = "Plugins";

/// Inclusive byte window a file's size must fall in to be scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min: u64,
    pub max: u64,
}

impl SizeLimits {
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(SearchError::config_error(format!(
                "minimum file size ({min} bytes) exceeds maximum ({max} bytes)"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, size: u64) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_FILE_SIZE,
            max: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Hardware parallelism, or [`FALLBACK_THREAD_COUNT`] when unknown
pub fn default_thread_count() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or_else(|_| {
        NonZeroUsize::new(FALLBACK_THREAD_COUNT).expect("fallback thread count is non-zero")
    })
}

fn default_min_file_size() -> u64 {
    DEFAULT_MIN_FILE_SIZE
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

/// Everything needed to run one search.
///
/// # Configuration Locations
///
/// Values are layered, later sources winning:
/// 1. Global `$CONFIG_DIR/assetscout/config.yaml`
/// 2. Local `.assetscout.yaml` in the current directory
/// 3. A file passed via `--config`
/// 4. `ASSETSCOUT_*` environment variables (e.g. `ASSETSCOUT_MAX_FILE_SIZE`)
///
/// ```yaml
/// pattern: "Weapon"
/// roots: ["Content/Assets"]
/// min_file_size: 100
/// max_file_size: 1048576
/// thread_count: 8
/// include_plugins: true
/// strip_type_prefix: true
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Regular expression matched case-insensitively against file bytes
    #[serde(default)]
    pub pattern: String,

    /// Directories to search; empty means the project defaults
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Smallest file size scanned, inclusive
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,

    /// Largest file size scanned, inclusive
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Number of worker threads per session
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Also search `Plugins/<name>/Content` when using default roots
    #[serde(default)]
    pub include_plugins: bool,

    /// Drop a leading class-type prefix (`AWeapon` -> `Weapon`) from the pattern
    #[serde(default = "default_true")]
    pub strip_type_prefix: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            roots: Vec::new(),
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            thread_count: default_thread_count(),
            include_plugins: false,
            strip_type_prefix: true,
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("assetscout/config.yaml")),
            Some(PathBuf::from(".assetscout.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                debug!("Loading config from {}", path.display());
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("ASSETSCOUT"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Merges CLI values over file values; `cli` holds only what was given explicitly
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(pattern) = cli.pattern {
            self.pattern = pattern;
        }
        if !cli.roots.is_empty() {
            self.roots = cli.roots;
        }
        if let Some(min) = cli.min_file_size {
            self.min_file_size = min;
        }
        if let Some(max) = cli.max_file_size {
            self.max_file_size = max;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if cli.include_plugins {
            self.include_plugins = true;
        }
        if cli.keep_prefix {
            self.strip_type_prefix = false;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.size_limits().map(|_| ())
    }

    pub fn size_limits(&self) -> Result<SizeLimits> {
        SizeLimits::new(self.min_file_size, self.max_file_size)
    }

    /// The pattern actually handed to the engine
    pub fn effective_pattern(&self) -> String {
        if self.strip_type_prefix {
            strip_type_prefix(&self.pattern).into_owned()
        } else {
            self.pattern.clone()
        }
    }

    /// Roots to search, relative to `base` when falling back to defaults.
    ///
    /// Explicit roots are returned as given, existing or not. Otherwise the
    /// default content directory and, with `include_plugins`, each plugin's
    /// `Content` directory are returned if they exist.
    pub fn resolve_roots(&self, base: &Path) -> Vec<PathBuf> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }

        let mut roots = Vec::new();
        let content = base.join(DEFAULT_CONTENT_DIR);
        if content.exists() {
            roots.push(content);
        }

        if self.include_plugins {
            if let Ok(entries) = fs::read_dir(base.join(PLUGINS_DIR)) {
                let mut plugin_roots: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
                    .map(|entry| entry.path().join("Content"))
                    .filter(|path| path.exists())
                    .collect();
                plugin_roots.sort();
                roots.extend(plugin_roots);
            }
        }
        roots
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub roots: Vec<PathBuf>,
    pub min_file_size: Option<u64>,
    pub max_file_size: Option<u64>,
    pub thread_count: Option<NonZeroUsize>,
    pub include_plugins: bool,
    pub keep_prefix: bool,
    pub log_level: Option<String>,
}
