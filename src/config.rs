use crate::interaction::{DEFAULT_PANEL_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::sejm::{BASE_URL, START_URL};
use crate::RunOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "sejm-crawler",
    about = "Crawl representative profiles of the Sejm",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub crawl: CrawlArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl the listing and every profile it links to (default)
    Crawl(CrawlArgs),
    /// Extract a saved profile page and print it
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CrawlArgs {
    /// Listing page with links to every profile
    #[arg(long, env = "SEJM_START_URL", default_value = START_URL)]
    pub start_url: String,

    /// Base that relative profile links are resolved against
    #[arg(long, env = "SEJM_BASE_URL", default_value = BASE_URL)]
    pub base_url: String,

    /// Profiles processed at the same time
    #[arg(long, env = "SEJM_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// Stop after this many profiles
    #[arg(long, env = "SEJM_LIMIT")]
    pub limit: Option<usize>,

    /// JSON lines output file, stdout when omitted
    #[arg(short, long, env = "SEJM_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Fetch profiles over plain HTTP and skip the dynamic panels
    #[arg(long, env = "SEJM_NO_BROWSER")]
    pub no_browser: bool,

    /// Chromium executable, looked up automatically when omitted
    #[arg(long, env = "SEJM_CHROME")]
    pub chrome: Option<PathBuf>,

    /// How long to wait for a panel to populate
    #[arg(long, env = "SEJM_PANEL_TIMEOUT_MS", default_value_t = DEFAULT_PANEL_TIMEOUT.as_millis() as u64)]
    pub panel_timeout_ms: u64,

    /// Delay between two checks of a panel
    #[arg(long, env = "SEJM_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,
}

impl CrawlArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            concurrency: self.concurrency,
            limit: self.limit,
        }
    }

    pub fn panel_timeout(&self) -> Duration {
        Duration::from_millis(self.panel_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Saved profile HTML
    pub file: PathBuf,

    /// Address the page was saved from, used to resolve relative links
    #[arg(long, default_value = "https://www.sejm.gov.pl/Sejm9.nsf/posel.xsp")]
    pub url: String,

    #[arg(long, env = "SEJM_BASE_URL", default_value = BASE_URL)]
    pub base_url: String,
}

impl Cli {
    /// The subcommand to run; bare flags mean `crawl`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Crawl(self.crawl))
    }
}
