use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid url {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Panel {panel} of {url} not populated after {waited:?}")]
    PanelTimeout {
        panel: &'static str,
        url: String,
        waited: Duration,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for CrawlerError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        CrawlerError::BrowserError(e.to_string())
    }
}
