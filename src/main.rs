//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for harvesting Star Tribune search results.

use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use sumi_harvest::config::{load_config, Config};
use sumi_harvest::crawler::{Harvester, HttpFetcher, Session};
use sumi_harvest::output::{print_summary, HarvestSummary, JsonDirectory, RecordSink};
use sumi_harvest::progress::ProgressLine;
use sumi_harvest::sites::StarTribune;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: an incremental article harvester
///
/// Walks the result pages of a Star Tribune search, saving every article it
/// can extract as `<SAVE_DIR>/<n>.json` while showing an estimate of the
/// time remaining.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental article harvester", long_about = None)]
struct Cli {
    /// Search terms
    #[arg(value_name = "QUERY")]
    query: String,

    /// Number of articles to harvest
    #[arg(value_name = "NUM_ARTICLES")]
    num_articles: u64,

    /// Directory receiving one JSON file per article
    #[arg(value_name = "SAVE_DIR")]
    save_dir: PathBuf,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// First search result page
    #[arg(long)]
    start: Option<u64>,

    /// Page index increment
    #[arg(long)]
    step: Option<u64>,

    /// Pause a random number of seconds between MIN and MAX after each article
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], conflicts_with = "no_pause")]
    pause: Option<Vec<u64>>,

    /// Never pause between articles (not recommended)
    #[arg(long)]
    no_pause: bool,

    /// Log file, truncated on start
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = build_config(&cli)?;

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.log_path));
    setup_logging(&log_path, cli.verbose, cli.quiet)?;

    handle_harvest(&cli, config, &log_path).await
}

/// Merges the configuration file (if any) with command-line overrides
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    config.harvest.target = cli.num_articles;
    if let Some(start) = cli.start {
        config.harvest.start = start;
    }
    if let Some(step) = cli.step {
        config.harvest.step = step;
    }
    if let Some(bounds) = &cli.pause {
        config.pacing.enabled = true;
        config.pacing.min_secs = bounds[0];
        config.pacing.max_secs = bounds[1];
    }
    if cli.no_pause {
        config.pacing.enabled = false;
    }
    config.output.directory = cli.save_dir.display().to_string();

    sumi_harvest::config::validate(&config)?;
    Ok(config)
}

/// Sends log output to a fresh file so it does not garble the progress line
fn setup_logging(path: &Path, verbose: u8, quiet: bool) -> std::io::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    Ok(())
}

/// Runs the harvest, writing each article as it arrives
async fn handle_harvest(
    cli: &Cli,
    config: Config,
    log_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = StarTribune::search_template(&cli.query)?;
    let session = Session::new(&config.user_agent.agents, template.site_root());
    let mut sink = JsonDirectory::create(&config.output.directory)?;

    tracing::info!(
        "Harvesting {} articles for '{}' starting at page {} (step {})",
        config.harvest.target,
        cli.query,
        config.harvest.start,
        config.harvest.step
    );

    let progress_line = ProgressLine::stdout(config.progress.width, config.progress.mark.clone());
    let mut records = Harvester::new(HttpFetcher::new()?, StarTribune::new()?, template)
        .harvest(config.harvest)
        .pacing(config.pacing.to_pacing())
        .progress(config.progress.clone())
        .progress_sink(Box::new(progress_line))
        .session(session)
        .span(tracing::info_span!("harvest", query = %cli.query))
        .records();

    let started = Instant::now();
    let mut summary = HarvestSummary::default();
    let mut failure = None;

    while let Some(item) = records.next().await {
        match item {
            Ok(article) => {
                sink.write(summary.articles as usize, &article)?;
                summary.articles += 1;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    sink.finish()?;

    summary.processed = records.processed();
    summary.elapsed = started.elapsed();
    summary.aborted = failure.is_some();

    println!();
    print_summary(&summary);

    match failure {
        Some(e) => {
            eprintln!("Harvest failed: {} (see {} for details)", e, log_path.display());
            Err(e.into())
        }
        None => {
            tracing::info!("Wrote {} articles to {}", sink.written(), sink.directory().display());
            Ok(())
        }
    }
}
