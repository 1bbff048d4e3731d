//! The seam between the crawler and whatever renders profile pages.
//!
//! The interaction script only needs four things from a browser: open a
//! page, click an element, ask whether a selector matches, and read back the
//! current document. Anything that can do those can drive the panels.

mod chromium;
#[cfg(test)]
pub(crate) mod fake;

pub use chromium::ChromiumBrowser;

use crate::CrawlerError;

#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    /// Opens `url` in a fresh tab and waits for the initial load.
    async fn open(&self, url: &str) -> Result<Box<dyn Tab>, CrawlerError>;
}

#[async_trait::async_trait]
pub trait Tab: Send + Sync {
    /// Clicks the first element matching `selector`.
    ///
    /// Fails with [`CrawlerError::ElementNotFound`] when nothing matches.
    async fn click(&self, selector: &str) -> Result<(), CrawlerError>;

    async fn exists(&self, selector: &str) -> Result<bool, CrawlerError>;

    /// Serialized HTML of the current document state.
    async fn html(&self) -> Result<String, CrawlerError>;

    async fn close(self: Box<Self>) -> Result<(), CrawlerError>;
}
