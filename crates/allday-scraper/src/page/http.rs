//! [`PageClient`] over plain HTTP with a parsed, static DOM.
//!
//! Server-rendered listing and detail pages are fetched with `reqwest`; CSS
//! queries run against the response body. Activating a node that carries a
//! `data-href`/`href` fetches that URL as an overlay, which stands in for a
//! script-rendered disclosure panel.

use std::time::Duration;

use reqwest::Client;

use super::dom::{DomState, HtmlNode};
use super::{PageClient, WaitCondition};
use crate::error::ScraperError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpPageClient {
    client: Client,
    dom: DomState,
    /// Timeout applied to overlay fetches triggered by [`PageClient::click`].
    interaction_timeout: Duration,
}

impl HttpPageClient {
    /// Creates a client with a persistent cookie jar, so one instance behaves
    /// like a single browsing session.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(user_agent: &str, interaction_timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .cookie_store(true)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            dom: DomState::default(),
            interaction_timeout,
        })
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en;q=0.8")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, timeout, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(url, timeout, &e))
    }
}

fn transport_error(url: &str, timeout: Duration, err: &reqwest::Error) -> ScraperError {
    if err.is_timeout() {
        ScraperError::Timeout {
            url: url.to_owned(),
            timeout_secs: timeout.as_secs(),
        }
    } else {
        ScraperError::Navigation {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    }
}

impl PageClient for HttpPageClient {
    type Node = HtmlNode;

    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitCondition,
        timeout: Duration,
    ) -> Result<(), ScraperError> {
        // A fully received body satisfies every wait condition for static HTML.
        tracing::trace!(url, ?wait, "navigating");
        let body = self.fetch(url, timeout).await?;
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
        let Some(target) = self.dom.activation_target(node) else {
            return Ok(());
        };
        let body = self
            .fetch(&target, self.interaction_timeout)
            .await
            .map_err(|e| ScraperError::Interaction(e.to_string()))?;
        self.dom.open_overlay(body);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<bool, ScraperError> {
        // Nothing renders after load on a static page: present now or never.
        Ok(self.dom.query(selector)?.is_some())
    }

    async fn dismiss_overlay(&mut self) -> Result<(), ScraperError> {
        self.dom.close_overlay();
        Ok(())
    }
}
