use futures::StreamExt;
use scraper::Html;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, error, info, warn};

pub mod browser;
pub mod config;
pub mod interaction;
pub mod sejm;

mod error;
mod utils;

pub use error::CrawlerError;
pub use interaction::{Interactor, Panel};

pub trait Record {
    fn is_empty(&self) -> bool;
}

pub enum CrawlerResult<R: Record> {
    Links(Vec<String>),
    Document(R),
}

pub trait Crawler {
    type Document: Record + Serialize;

    fn can_be_scrapped(&self, doc: &Html) -> bool;
    fn crawl(&self, url: &str, doc: &Html) -> CrawlerResult<Self::Document>;
    fn extract_links(&self, doc: &Html) -> Vec<String>;

    /// Panels to open before a document page is crawled.
    fn script(&self) -> &[Panel];
}

/// Where page HTML comes from. Listings are always fetched over plain HTTP;
/// documents go through the interactor when there is one.
pub struct PageSource {
    client: reqwest::Client,
    interactor: Option<Interactor>,
}

impl PageSource {
    pub fn new(client: reqwest::Client, interactor: Option<Interactor>) -> Self {
        PageSource { client, interactor }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, CrawlerError> {
        debug!("Visit {}", url);
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    pub async fn render(&self, url: &str, script: &[Panel]) -> Result<String, CrawlerError> {
        match &self.interactor {
            Some(interactor) => {
                debug!("Render {}", url);
                interactor.render(url, script).await
            }
            None => self.fetch(url).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub concurrency: usize,
    pub limit: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            concurrency: 4,
            limit: None,
        }
    }
}

/// Collects the document links of `start_url`, then crawls each of them and
/// writes every record as one JSON line to `out`. Returns how many records
/// were written.
pub async fn run_crawler<C, W>(
    crawler: &C,
    source: &PageSource,
    start_url: &str,
    options: &RunOptions,
    mut out: W,
) -> Result<u64, CrawlerError>
where
    C: Crawler,
    W: Write,
{
    let html = source.fetch(start_url).await?;
    let links = {
        let doc = Html::parse_document(&html);
        match crawler.crawl(start_url, &doc) {
            CrawlerResult::Links(links) => links,
            CrawlerResult::Document(_) => vec![start_url.to_string()],
        }
    };
    if links.is_empty() {
        warn!("No links found on {}", start_url);
        return Ok(0);
    }

    let links = match options.limit {
        Some(limit) => links.into_iter().take(limit).collect::<Vec<_>>(),
        None => links,
    };
    info!("Initial queue length: {}", links.len());

    let mut results = futures::stream::iter(links)
        .map(|url| async move {
            let result = handle(crawler, source, &url).await;
            (url, result)
        })
        .buffer_unordered(options.concurrency.max(1));

    let mut extracted = 0;
    while let Some((url, result)) = results.next().await {
        match result {
            Ok(CrawlerResult::Document(record)) => {
                if record.is_empty() {
                    warn!("Empty document extracted: {}", url);
                    continue;
                }
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
                extracted += 1;
                info!("[{}] Insert Result {}", extracted, url);
            }
            Ok(CrawlerResult::Links(_)) => {
                warn!("Not a document page: {}", url);
            }
            Err(e) => {
                error!("Failed to crawl {}: {}", url, e);
            }
        }
    }
    out.flush()?;

    Ok(extracted)
}

async fn handle<C>(
    crawler: &C,
    source: &PageSource,
    url: &str,
) -> Result<CrawlerResult<C::Document>, CrawlerError>
where
    C: Crawler,
{
    let html = source.render(url, crawler.script()).await?;
    let doc = Html::parse_document(&html);
    Ok(crawler.crawl(url, &doc))
}
