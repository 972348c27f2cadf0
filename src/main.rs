use anyhow::Context;
use clap::Parser;
use listings_scraper::browser::{user_agents, BrowserSession, ReplayPage, WebDriverPage};
use listings_scraper::config::{Config, DEFAULT_CONFIG_PATH};
use listings_scraper::scraper::{ListingScraper, RunReport, ScrapeError};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scrape search result listings into CSV / JSON / XLSX files.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Read saved HTML pages from this directory instead of driving a browser.
    #[arg(long, value_name = "DIR")]
    replay: Option<PathBuf>,

    /// Debug logging (RUST_LOG still takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let scraper = ListingScraper::new(&config)?;

    let report: RunReport = match &cli.replay {
        Some(dir) => {
            let page = ReplayPage::from_dir(dir).map_err(ScrapeError::Session)?;
            scraper.run(BrowserSession::new(page))
        }
        None => {
            let user_agent = user_agents::pick(&config.user_agents_file);
            let page = WebDriverPage::start(&config, &user_agent).map_err(ScrapeError::Session)?;
            scraper.run(BrowserSession::new(page))
        }
    }
    .context("scrape aborted")?;

    info!(
        pages = report.pages_visited,
        listings = report.listings.len(),
        terminal = ?report.terminal,
        "✅ Scrape complete"
    );
    for path in &report.written {
        info!("  → {}", path.display());
    }
    Ok(())
}
