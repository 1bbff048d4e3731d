use super::{Browser, Tab};
use crate::CrawlerError;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct ChromiumBrowser {
    browser: CdpBrowser,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launches a headless Chromium. Without `executable` chromiumoxide
    /// looks the binary up on its own.
    pub async fn launch(executable: Option<PathBuf>) -> Result<Self, CrawlerError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(CrawlerError::BrowserError)?;

        let (browser, mut handler) = CdpBrowser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler: {}", e);
                }
            }
        });

        Ok(ChromiumBrowser { browser, handler })
    }

    pub async fn close(mut self) -> Result<(), CrawlerError> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[async_trait::async_trait]
impl Browser for ChromiumBrowser {
    async fn open(&self, url: &str) -> Result<Box<dyn Tab>, CrawlerError> {
        let page = self.browser.new_page(url).await?;
        page.wait_for_navigation().await?;
        Ok(Box::new(ChromiumTab { page }))
    }
}

struct ChromiumTab {
    page: Page,
}

impl ChromiumTab {
    async fn eval_bool(&self, script: String) -> Result<bool, CrawlerError> {
        self.page
            .evaluate_expression(script)
            .await?
            .into_value::<bool>()
            .map_err(|e| CrawlerError::BrowserError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Tab for ChromiumTab {
    async fn click(&self, selector: &str) -> Result<(), CrawlerError> {
        // Tabs may sit outside the viewport, so click through the DOM rather
        // than with synthesized mouse events.
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})()",
            serde_json::to_string(selector)?
        );
        if self.eval_bool(script).await? {
            Ok(())
        } else {
            Err(CrawlerError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool, CrawlerError> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        self.eval_bool(script).await
    }

    async fn html(&self) -> Result<String, CrawlerError> {
        Ok(self.page.content().await?)
    }

    async fn close(self: Box<Self>) -> Result<(), CrawlerError> {
        self.page.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn click_populates_panel() {
        let browser = ChromiumBrowser::launch(None).await.unwrap();
        let tab = browser
            .open(concat!(
                "data:text/html,<a id=\"x:_id1:email\" ",
                "onclick=\"document.getElementById('c').innerHTML='<p>a@b.pl</p>'\">e</a>",
                "<div id=\"c\"></div>"
            ))
            .await
            .unwrap();

        assert!(!tab.exists("#c > *").await.unwrap());
        tab.click(r#"a[id$=":email"]"#).await.unwrap();
        assert!(tab.exists("#c > *").await.unwrap());
        assert!(tab.html().await.unwrap().contains("a@b.pl"));
        assert!(matches!(
            tab.click(".missing").await,
            Err(CrawlerError::ElementNotFound { .. })
        ));

        tab.close().await.unwrap();
        browser.close().await.unwrap();
    }
}
