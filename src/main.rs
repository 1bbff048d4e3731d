use clap::Parser;
use scraper::Html;
use sejm_crawler::browser::ChromiumBrowser;
use sejm_crawler::config::{Cli, Command, CrawlArgs, InspectArgs};
use sejm_crawler::sejm::SejmCrawler;
use sejm_crawler::{run_crawler, Crawler, CrawlerError, CrawlerResult, Interactor, PageSource};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

async fn crawl(args: CrawlArgs) -> Result<(), CrawlerError> {
    let crawler = SejmCrawler::new(&args.base_url)?;

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let browser = if args.no_browser {
        info!("Running without a browser, dynamic panels stay empty");
        None
    } else {
        Some(Arc::new(ChromiumBrowser::launch(args.chrome.clone()).await?))
    };
    let interactor = browser.as_ref().map(|b| {
        Interactor::new(b.clone())
            .with_timeout(args.panel_timeout())
            .with_poll_interval(args.poll_interval())
    });
    let source = PageSource::new(reqwest::Client::new(), interactor);

    let result = run_crawler(&crawler, &source, &args.start_url, &args.run_options(), out).await;

    drop(source);
    if let Some(browser) = browser.and_then(|b| Arc::try_unwrap(b).ok()) {
        browser.close().await?;
    }

    let extracted = result?;
    info!("Done, {} representatives extracted", extracted);
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<(), CrawlerError> {
    let crawler = SejmCrawler::new(&args.base_url)?;
    let html = std::fs::read_to_string(&args.file)?;
    let doc = Html::parse_document(&html);

    match crawler.crawl(&args.url, &doc) {
        CrawlerResult::Document(rep) => println!("{}", rep),
        CrawlerResult::Links(links) => {
            println!("Not a profile page, {} profile links:", links.len());
            for link in links {
                println!("{}", link);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,chromiumoxide=warn"
                    .into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    match Cli::parse().into_command() {
        Command::Crawl(args) => crawl(args).await?,
        Command::Inspect(args) => inspect(args)?,
    }

    Ok(())
}
