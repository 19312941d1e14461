//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::fetch::is_valid_user_agent;
use crate::models::{DecodeStrategy, Variant};
use clap::Parser;
use std::path::PathBuf;

/// subagg - proxy subscription aggregator
///
/// Reads a list of direct links and subscription URLs, fetches and decodes
/// the subscriptions, and writes every unique link to one sorted file.
///
/// Examples:
///   subagg
///   subagg --sources my_sources.txt --variant vless
///   subagg --variant ip-comment --output ips.txt --timeout 5
///   subagg --dry-run
///   subagg --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Source list, one link or URL per line
    ///
    /// Blank lines and lines starting with '#' are ignored.
    /// Default: from config or sources.txt.
    #[arg(short, long, value_name = "FILE", env = "SUBAGG_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Output file for the aggregated links
    ///
    /// Default: from config or a per-variant name such as aggregated_proxies.txt.
    #[arg(short, long, value_name = "FILE", env = "SUBAGG_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Link shape to collect (proxies, ip-comment, vless)
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<Variant>,

    /// How to detect Base64 subscriptions (precheck, fallback)
    #[arg(long, value_name = "STRATEGY")]
    pub decode: Option<DecodeStrategy>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Ignore HTTP(S)_PROXY environment variables
    #[arg(long)]
    pub no_system_proxy: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .subagg.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Classify the sources and exit without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .subagg.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref user_agent) = self.user_agent {
            if !is_valid_user_agent(user_agent) {
                return Err("User-Agent must be a non-empty, valid HTTP header value".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
