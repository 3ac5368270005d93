//! In-memory [`PageClient`] serving canned HTML, for tests and fixtures.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::dom::{DomState, HtmlNode};
use super::{PageClient, WaitCondition};
use crate::error::ScraperError;

/// Serves registered pages by exact URL. Unknown URLs fail as a transport
/// error; `fail_next` queues transient failures ahead of a page.
#[derive(Debug, Default)]
pub struct MemoryPageClient {
    pages: HashMap<String, String>,
    failures: HashMap<String, VecDeque<ScraperError>>,
    dom: DomState,
    navigations: Vec<String>,
    clicks: usize,
    dismissals: usize,
}

impl MemoryPageClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make the next `times` navigations to `url` time out.
    #[must_use]
    pub fn fail_next(mut self, url: impl Into<String>, times: usize) -> Self {
        let url = url.into();
        let queue = self.failures.entry(url.clone()).or_default();
        for _ in 0..times {
            queue.push_back(ScraperError::Timeout {
                url: url.clone(),
                timeout_secs: 0,
            });
        }
        self
    }

    /// Every URL passed to `navigate`, including failed attempts.
    #[must_use]
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    #[must_use]
    pub fn clicks(&self) -> usize {
        self.clicks
    }

    #[must_use]
    pub fn dismissals(&self) -> usize {
        self.dismissals
    }
}

impl PageClient for MemoryPageClient {
    type Node = HtmlNode;

    async fn navigate(
        &mut self,
        url: &str,
        _wait: WaitCondition,
        _timeout: Duration,
    ) -> Result<(), ScraperError> {
        self.navigations.push(url.to_owned());
        if let Some(err) = self.failures.get_mut(url).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        let body = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::Navigation {
                url: url.to_owned(),
                reason: "no such page".to_owned(),
            })?;
        self.dom.load(url, body);
        Ok(())
    }

    fn query(&self, selector: &str) -> Result<Option<HtmlNode>, ScraperError> {
        self.dom.query(selector)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<HtmlNode>, ScraperError> {
        self.dom.query_all(selector)
    }

    async fn click(&mut self, node: &HtmlNode) -> Result<(), ScraperError> {
        self.dom.ensure_attached(node)?;
        self.clicks += 1;
        let Some(target) = self.dom.activation_target(node) else {
            return Ok(());
        };
        let body = self
            .pages
            .get(&target)
            .cloned()
            .ok_or_else(|| ScraperError::Interaction(format!("no overlay at {target}")))?;
        self.dom.open_overlay(body);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<bool, ScraperError> {
        Ok(self.dom.query(selector)?.is_some())
    }

    async fn dismiss_overlay(&mut self) -> Result<(), ScraperError> {
        self.dismissals += 1;
        self.dom.close_overlay();
        Ok(())
    }
}
