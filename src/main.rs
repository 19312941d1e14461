//! subagg - proxy subscription aggregator
//!
//! Collects proxy links from direct entries and remote subscriptions,
//! unwraps Base64 bodies, deduplicates, and writes one sorted file.
//!
//! Every failure after argument parsing is logged and the run still exits
//! with code 0. Invalid arguments exit with code 1.

mod cli;
mod config;
mod extract;
mod fetch;
mod models;
mod output;
mod pipeline;
mod sources;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, Settings, CONFIG_FILE};
use extract::Extractor;
use fetch::Fetcher;
use models::{LinkSet, RunSummary, Source};
use pipeline::Aggregator;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("subagg v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let mut config = load_config(&args);
    config.merge_with_args(&args);
    let settings = config.resolve();

    if args.dry_run {
        handle_dry_run(&settings);
        return Ok(());
    }

    run_aggregation(&settings, !args.quiet).await;

    Ok(())
}

/// Handle --init-config: generate a default .subagg.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the source list, variant, timeout, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Config {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path).unwrap_or_else(|e| {
            warn!("{:#}; using defaults", e);
            Config::default()
        });
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            config
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Config::default()
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Config::default()
        }
    }
}

/// Fetch, extract and write. The output file is always written, even when
/// no source could be read or the HTTP client could not be built.
async fn run_aggregation(settings: &Settings, show_progress: bool) -> RunSummary {
    let start_time = Instant::now();

    let lines = sources::read_sources(&settings.sources);
    if lines.is_empty() {
        warn!("No sources found or failed to read sources file");
        write_output(settings, &LinkSet::new());
        return RunSummary::default();
    }

    println!("📥 Aggregating {} sources", lines.len());
    println!("   Variant: {}", settings.variant);
    println!("   Decode: {}", settings.decode);
    println!("   Timeout: {}s", settings.fetch.timeout_seconds);

    let fetcher = match Fetcher::new(&settings.fetch) {
        Ok(fetcher) => Some(fetcher),
        Err(e) => {
            error!("{:#}; remote sources will be skipped", e);
            None
        }
    };
    let aggregator = Aggregator::new(fetcher, Extractor::new(settings.variant), settings.decode)
        .with_progress(show_progress);

    let (links, summary) = aggregator.run(&lines).await;

    write_output(settings, &links);

    println!("\n📊 Aggregation Summary:");
    println!(
        "   Sources: {} | Direct: {} | Fetched: {} | Failed: {} | Skipped: {}",
        summary.sources, summary.direct, summary.fetched, summary.failed, summary.skipped
    );
    println!("   Unique links: {}", summary.unique_links);
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    summary
}

/// Write the link set, logging rather than propagating failures.
fn write_output(settings: &Settings, links: &LinkSet) {
    match output::write_links(&settings.output, links) {
        Ok(count) => println!("✅ Wrote {} links to {}", count, settings.output.display()),
        Err(e) => error!("{:#}", e),
    }
}

/// Handle --dry-run: classify sources, print them, exit.
fn handle_dry_run(settings: &Settings) {
    println!("\n🔍 Dry run: classifying {} (no network)...\n", settings.sources.display());

    let extractor = Extractor::new(settings.variant);
    let lines = sources::read_sources(&settings.sources);

    if lines.is_empty() {
        println!("   No sources found.");
    }

    for line in &lines {
        let source = sources::classify(line, &extractor);
        let marker = match source {
            Source::Direct(_) => "🔗",
            Source::Remote(_) => "🌐",
            Source::Invalid(_) => "⚠️ ",
        };
        println!("   {} [{}] {}", marker, source.kind(), source);
    }

    println!(
        "\n✅ Dry run complete. {} would be written to {}.",
        settings.variant,
        settings.output.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchOptions;
    use crate::models::{DecodeStrategy, Variant};
    use std::path::Path;
    use tempfile::TempDir;

    fn make_settings(dir: &Path, user_agent: Option<&str>) -> Settings {
        Settings {
            sources: dir.join("sources.txt"),
            output: dir.join("aggregated_proxies.txt"),
            variant: Variant::Proxies,
            decode: DecodeStrategy::Precheck,
            fetch: FetchOptions {
                timeout_seconds: 2,
                user_agent: user_agent.map(String::from),
                use_system_proxy: false,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_sources_clears_output() {
        let temp_dir = TempDir::new().unwrap();
        let settings = make_settings(temp_dir.path(), None);
        std::fs::write(&settings.output, "stale\n").unwrap();

        let summary = run_aggregation(&settings, false).await;

        assert_eq!(summary.sources, 0);
        assert_eq!(std::fs::metadata(&settings.output).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_comment_only_sources_clears_output() {
        let temp_dir = TempDir::new().unwrap();
        let settings = make_settings(temp_dir.path(), None);
        std::fs::write(&settings.sources, "# nothing yet\n\n").unwrap();
        std::fs::write(&settings.output, "stale\n").unwrap();

        run_aggregation(&settings, false).await;

        assert_eq!(std::fs::metadata(&settings.output).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_sources_write_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = make_settings(temp_dir.path(), None);
        std::fs::write(
            &settings.sources,
            "http://127.0.0.1:1/a\nhttp://127.0.0.1:1/b\nnot-a-url\n",
        )
        .unwrap();
        std::fs::write(&settings.output, "stale\n").unwrap();

        let summary = run_aggregation(&settings, false).await;

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(std::fs::metadata(&settings.output).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_client_build_failure_still_writes_direct_links() {
        let temp_dir = TempDir::new().unwrap();
        let settings = make_settings(temp_dir.path(), Some("bad\nua"));
        std::fs::write(
            &settings.sources,
            "vless://direct@h:1\nhttps://example.com/sub\n",
        )
        .unwrap();
        std::fs::write(&settings.output, "stale\n").unwrap();

        let summary = run_aggregation(&settings, false).await;

        assert_eq!(summary.direct, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            std::fs::read_to_string(&settings.output).unwrap(),
            "vless://direct@h:1\n"
        );
    }
}
