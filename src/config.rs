//! Configuration file handling.
//!
//! This module handles loading `.subagg.toml`, merging it with CLI
//! arguments, and resolving the per-variant defaults into [`Settings`].

use crate::fetch::{is_valid_user_agent, FetchOptions};
use crate::models::{DecodeStrategy, Variant};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".subagg.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Extraction settings.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Source list path.
    #[serde(default = "default_sources")]
    pub sources: String,

    /// Output path. Defaults to a per-variant file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            output: None,
        }
    }
}

fn default_sources() -> String {
    "sources.txt".to_string()
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds. Defaults per variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header. Defaults per variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Honour proxy settings from the environment.
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: None,
            use_system_proxy: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Link extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Which link shape to collect.
    #[serde(default)]
    pub variant: Variant,

    /// Base64 handling. Defaults per variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<DecodeStrategy>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sources: PathBuf,
    pub output: PathBuf,
    pub variant: Variant,
    pub decode: DecodeStrategy,
    pub fetch: FetchOptions,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sources) = args.sources {
            self.general.sources = sources.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(variant) = args.variant {
            self.extract.variant = variant;
        }
        if let Some(decode) = args.decode {
            self.extract.decode = Some(decode);
        }
        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = Some(timeout);
        }
        if let Some(ref user_agent) = args.user_agent {
            self.fetch.user_agent = Some(user_agent.clone());
        }
        if args.no_system_proxy {
            self.fetch.use_system_proxy = false;
        }
    }

    /// Fill every unset value with the selected variant's default.
    ///
    /// A zero timeout or an unusable User-Agent from the file is replaced by
    /// the variant default with a warning.
    pub fn resolve(&self) -> Settings {
        let variant = self.extract.variant;

        let output = self
            .general
            .output
            .clone()
            .unwrap_or_else(|| variant.default_output().to_string());

        let timeout_seconds = match self.fetch.timeout_seconds {
            Some(0) => {
                warn!(
                    "timeout_seconds = 0 is not allowed, using {}s",
                    variant.default_timeout()
                );
                variant.default_timeout()
            }
            Some(seconds) => seconds,
            None => variant.default_timeout(),
        };

        let user_agent = match self.fetch.user_agent {
            Some(ref ua) if is_valid_user_agent(ua) => Some(ua.clone()),
            Some(ref ua) => {
                warn!("Ignoring invalid user_agent {:?}", ua);
                variant.default_user_agent().map(String::from)
            }
            None => variant.default_user_agent().map(String::from),
        };

        Settings {
            sources: PathBuf::from(&self.general.sources),
            output: PathBuf::from(output),
            variant,
            decode: self.extract.decode.unwrap_or_else(|| variant.default_decode()),
            fetch: FetchOptions {
                timeout_seconds,
                user_agent,
                use_system_proxy: self.fetch.use_system_proxy,
            },
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
