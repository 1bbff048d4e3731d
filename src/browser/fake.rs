//! In-memory browser whose panels fill in after their tab is clicked.

use super::{Browser, Tab};
use crate::CrawlerError;
use scraper::{Html, Selector};
use std::sync::{Arc, Mutex};

/// Clicking `trigger` replaces `from` with `to` in the page, after `delay`
/// further `exists` polls.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub trigger: &'static str,
    pub from: String,
    pub to: String,
    pub delay: usize,
}

#[derive(Debug, Default)]
struct State {
    clicks: Vec<String>,
    closed: usize,
}

#[derive(Debug, Clone)]
pub struct FakeBrowser {
    page: String,
    reactions: Vec<Reaction>,
    state: Arc<Mutex<State>>,
}

impl FakeBrowser {
    pub fn new(page: String, reactions: Vec<Reaction>) -> Self {
        FakeBrowser {
            page,
            reactions,
            state: Arc::default(),
        }
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn closed_tabs(&self) -> usize {
        self.state.lock().unwrap().closed
    }
}

fn matches(html: &str, selector: &str) -> bool {
    let selector = Selector::parse(selector).unwrap();
    Html::parse_document(html).select(&selector).next().is_some()
}

struct Pending {
    reaction: Reaction,
    polls_left: usize,
}

struct FakeTab {
    html: Mutex<String>,
    pending: Mutex<Vec<Pending>>,
    reactions: Vec<Reaction>,
    state: Arc<Mutex<State>>,
}

impl FakeTab {
    fn settle(&self) {
        let mut pending = self.pending.lock().unwrap();
        let mut html = self.html.lock().unwrap();
        pending.retain_mut(|p| {
            if p.polls_left == 0 {
                *html = html.replace(&p.reaction.from, &p.reaction.to);
                false
            } else {
                p.polls_left -= 1;
                true
            }
        });
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn open(&self, _url: &str) -> Result<Box<dyn Tab>, CrawlerError> {
        Ok(Box::new(FakeTab {
            html: Mutex::new(self.page.clone()),
            pending: Mutex::default(),
            reactions: self.reactions.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

#[async_trait::async_trait]
impl Tab for FakeTab {
    async fn click(&self, selector: &str) -> Result<(), CrawlerError> {
        let present = matches(&self.html.lock().unwrap(), selector);
        if !present {
            return Err(CrawlerError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        self.state.lock().unwrap().clicks.push(selector.to_string());
        let mut pending = self.pending.lock().unwrap();
        for reaction in self.reactions.iter().filter(|r| r.trigger == selector) {
            pending.push(Pending {
                reaction: reaction.clone(),
                polls_left: reaction.delay,
            });
        }
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool, CrawlerError> {
        self.settle();
        Ok(matches(&self.html.lock().unwrap(), selector))
    }

    async fn html(&self) -> Result<String, CrawlerError> {
        Ok(self.html.lock().unwrap().clone())
    }

    async fn close(self: Box<Self>) -> Result<(), CrawlerError> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}
