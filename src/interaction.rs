use crate::browser::{Browser, Tab};
use crate::CrawlerError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PANEL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One step of the interaction script: a tab to click and the selector that
/// shows its content has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub name: &'static str,
    pub trigger: &'static str,
    pub container: &'static str,
    pub ready: &'static str,
}

/// Builds a [`Panel`] from the slug the page uses in its generated ids:
/// the tab anchor id ends in `:<slug>` and the panel container id in
/// `:<slug>Content`. The panel is ready once the container has a child.
#[macro_export]
macro_rules! panel {
    ($name:literal, $slug:literal) => {
        $crate::interaction::Panel {
            name: $name,
            trigger: concat!("a[id$=\":", $slug, "\"]"),
            container: concat!("div[id$=\":", $slug, "Content\"]"),
            ready: concat!("div[id$=\":", $slug, "Content\"] > *"),
        }
    };
}

/// Drives the panels of a page open, one after the other.
pub struct Interactor {
    browser: Arc<dyn Browser>,
    timeout: Duration,
    poll_interval: Duration,
}

impl Interactor {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Interactor {
            browser,
            timeout: DEFAULT_PANEL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Opens `url`, runs every panel of `script` in order and returns the
    /// resulting document. The tab is closed whatever the outcome.
    pub async fn render(&self, url: &str, script: &[Panel]) -> Result<String, CrawlerError> {
        let tab = self.browser.open(url).await?;
        let result = self.run_script(tab.as_ref(), url, script).await;
        if let Err(e) = tab.close().await {
            warn!("Failed to close tab of {}: {}", url, e);
        }
        result
    }

    async fn run_script(
        &self,
        tab: &dyn Tab,
        url: &str,
        script: &[Panel],
    ) -> Result<String, CrawlerError> {
        for panel in script {
            debug!("Open panel {} of {}", panel.name, url);
            tab.click(panel.trigger).await?;
            self.wait_for(tab, url, panel).await?;
        }
        tab.html().await
    }

    async fn wait_for(&self, tab: &dyn Tab, url: &str, panel: &Panel) -> Result<(), CrawlerError> {
        let poll = async {
            loop {
                if tab.exists(panel.ready).await? {
                    return Ok::<(), CrawlerError>(());
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        match tokio::time::timeout(self.timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(CrawlerError::PanelTimeout {
                panel: panel.name,
                url: url.to_string(),
                waited: self.timeout,
            }),
        }
    }
}
