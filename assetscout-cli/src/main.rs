use anyhow::{bail, Context, Result};
use assetscout::{
    config::CliOverrides,
    filters::FileNameView,
    Callbacks, ProgressEvent, SearchConfig, SearchEngine, SearchResult, SessionOutcome,
};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::{
    borrow::Cow,
    num::NonZeroUsize,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Progress messages longer than this are shortened from the left
const MAX_MESSAGE_CHARS: usize = 60;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Regular expression to search for (case-insensitive)
    pattern: Option<String>,

    /// Directories to search (default: Content/Assets under the current directory)
    paths: Vec<PathBuf>,

    /// Minimum file size in kilobytes [default: 0.1]
    #[arg(long = "min-kb")]
    min_kb: Option<f64>,

    /// Maximum file size in kilobytes [default: 1000]
    #[arg(long = "max-kb")]
    max_kb: Option<f64>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Also search Plugins/<name>/Content when using the default directories
    #[arg(long)]
    plugins: bool,

    /// Search for the pattern as typed, without dropping a class-type prefix
    #[arg(long)]
    keep_prefix: bool,

    /// Only show file names containing this text (case-insensitive)
    #[arg(short, long)]
    filter: Option<String>,

    /// Show full paths and previews instead of file names
    #[arg(long, conflicts_with = "json")]
    full: bool,

    /// Print one JSON object per match as it is found
    #[arg(long)]
    json: bool,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Result<CliOverrides> {
        Ok(CliOverrides {
            pattern: self.pattern.clone(),
            roots: self.paths.clone(),
            min_file_size: self.min_kb.map(|kb| kb_to_bytes("--min-kb", kb)).transpose()?,
            max_file_size: self.max_kb.map(|kb| kb_to_bytes("--max-kb", kb)).transpose()?,
            thread_count: self.threads,
            include_plugins: self.plugins,
            keep_prefix: self.keep_prefix,
            log_level: self.log_level.clone(),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = cli.overrides()?;
    let config = SearchConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?
        .merge_with_cli(overrides);
    config.validate()?;
    init_logging(&config.log_level);

    let pattern = config.effective_pattern();
    if pattern.is_empty() {
        bail!("No search pattern given");
    }
    if pattern != config.pattern {
        debug!("Searching for '{}' (prefix stripped from '{}')", pattern, config.pattern);
    }

    let base = std::env::current_dir().context("Failed to read current directory")?;
    let roots = config.resolve_roots(&base);
    if roots.is_empty() {
        bail!("No search paths available");
    }

    let engine = SearchEngine::from_config(&config)?;
    run_search(&cli, &engine, &pattern, &roots)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second subscriber is only possible in tests; ignore it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_search(cli: &Cli, engine: &SearchEngine, pattern: &str, roots: &[PathBuf]) -> Result<()> {
    let bar = progress_bar(cli.quiet || cli.json);
    let filter = cli.filter.as_deref().map(str::to_lowercase);
    let started = Instant::now();

    let listener = Callbacks::new(
        |event: &ProgressEvent| {
            if event.is_diagnostic() {
                bar.suspend(|| eprintln!("{} {}", "warning:".yellow().bold(), event.message));
                return;
            }
            let progress = engine.progress();
            bar.set_length(progress.total as u64);
            bar.set_position(progress.processed as u64);
            bar.set_message(truncate_message(&event.message).into_owned());
        },
        |result: &SearchResult| {
            if cli.json && passes_filter(result, filter.as_deref()) {
                match serde_json::to_string(result) {
                    Ok(line) => println!("{line}"),
                    Err(e) => debug!("Failed to serialize {}: {}", result.path.display(), e),
                }
            }
        },
    );

    let outcome = engine.search(pattern, roots, &listener);
    bar.finish_and_clear();

    if outcome == SessionOutcome::InvalidPattern {
        bail!("Search aborted: invalid pattern '{}'", pattern);
    }

    let results = engine.get_results();
    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    let mut view = FileNameView::new();
    if let Some(filter) = &cli.filter {
        view.set_filter(filter.as_str());
    }
    for result in &results {
        view.push(result);
    }

    if !cli.json {
        if cli.full {
            print_full(&results, filter.as_deref());
        } else {
            for name in view.visible() {
                println!("{}", name.blue());
            }
        }
    }

    let summary = format!(
        "Found {} matching files ({} unique names) in {}",
        results.len(),
        view.len(),
        humantime::format_duration(elapsed)
    );
    if cli.json {
        eprintln!("{summary}");
    } else {
        println!("\n{}", summary.green());
    }
    Ok(())
}

fn print_full(results: &[SearchResult], filter: Option<&str>) {
    for result in results.iter().filter(|r| passes_filter(r, filter)) {
        println!("{}", result.path.display().to_string().blue());
        println!("{}: {}", result.line_number.to_string().green(), result.preview);
    }
}

fn passes_filter(result: &SearchResult, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) => result.file_name().to_lowercase().contains(filter),
        None => true,
    }
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}

fn kb_to_bytes(flag: &str, kb: f64) -> Result<u64> {
    if !kb.is_finite() || kb < 0.0 {
        bail!("{flag} must be a non-negative number of kilobytes, got {kb}");
    }
    Ok((kb * 1024.0) as u64)
}

/// Keeps the last characters of long messages, which usually hold the file or directory name
fn truncate_message(message: &str) -> Cow<'_, str> {
    let count = message.chars().count();
    if count <= MAX_MESSAGE_CHARS {
        return Cow::Borrowed(message);
    }
    let tail: String = message.chars().skip(count - (MAX_MESSAGE_CHARS - 3)).collect();
    Cow::Owned(format!("...{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kb_to_bytes() {
        assert_eq!(kb_to_bytes("--min-kb", 0.1).unwrap(), 102);
        assert_eq!(kb_to_bytes("--max-kb", 1000.0).unwrap(), 1_024_000);
        assert_eq!(kb_to_bytes("--min-kb", 0.0).unwrap(), 0);
    }

    #[test]
    fn test_kb_to_bytes_rejects_invalid() {
        for kb in [-1.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = kb_to_bytes("--max-kb", kb).unwrap_err();
            assert!(err.to_string().starts_with("--max-kb"));
        }

        let cli = Cli::parse_from(["assetscout", "Weapon", "--min-kb=-2"]);
        assert!(cli.overrides().is_err());
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("Processing files..."), "Processing files...");

        let exact = "x".repeat(60);
        assert_eq!(truncate_message(&exact), exact);

        let long = format!("Searching in: /{}", "d".repeat(80));
        let truncated = truncate_message(&long);
        assert_eq!(truncated.chars().count(), 60);
        assert!(truncated.starts_with("..."));
        assert!(long.ends_with(&truncated[3..]));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["assetscout", "AWeapon", "a", "b", "--max-kb", "2", "-j", "3"]);
        let overrides = cli.overrides().unwrap();
        assert_eq!(overrides.pattern.as_deref(), Some("AWeapon"));
        assert_eq!(overrides.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(overrides.min_file_size, None);
        assert_eq!(overrides.max_file_size, Some(2048));
        assert_eq!(overrides.thread_count.map(NonZeroUsize::get), Some(3));
        assert!(!overrides.keep_prefix);
    }
}
