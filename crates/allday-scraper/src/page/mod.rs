//! The page-rendering seam: navigation, DOM queries, and interactions.
//!
//! The crawler only ever talks to a [`PageClient`]. [`http::HttpPageClient`]
//! fetches server-rendered HTML over HTTP and answers CSS queries against it;
//! a browser-automation client can implement the same trait.

mod dom;
pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::future::Future;
use std::time::Duration;

pub use dom::HtmlNode;

use crate::error::ScraperError;

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitCondition {
    /// The document has loaded.
    Load,
    /// The document has loaded and network activity has gone quiet.
    #[default]
    NetworkIdle,
}

/// A node in the current page. Queries are scoped to the node's subtree.
pub trait PageNode: Clone + Send + Sync {
    /// Concatenated text content, untrimmed.
    fn text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`ScraperError::Selector`] if `selector` does not parse.
    fn query(&self, selector: &str) -> Result<Option<Self>, ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError::Selector`] if `selector` does not parse.
    fn query_all(&self, selector: &str) -> Result<Vec<Self>, ScraperError>;
}

/// One rendering session. A single instance drives a whole run; calls are
/// strictly sequential.
pub trait PageClient: Send {
    type Node: PageNode;

    /// Load `url` as the current page, discarding any open overlay.
    ///
    /// # Errors
    ///
    /// Transport failures surface as [`ScraperError::Navigation`],
    /// [`ScraperError::Timeout`], or [`ScraperError::UnexpectedStatus`].
    fn navigate(
        &mut self,
        url: &str,
        wait: WaitCondition,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// First node matching `selector` in the current page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NoDocument`] before the first navigation, or
    /// [`ScraperError::Selector`] for an invalid selector.
    fn query(&self, selector: &str) -> Result<Option<Self::Node>, ScraperError>;

    /// Every node matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Same as [`PageClient::query`].
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, ScraperError>;

    /// Activate `node`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Interaction`] if the node is no longer
    /// attached to the current page.
    fn click(&mut self, node: &Self::Node) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// Wait up to `timeout` for `selector` to match; resolves to whether it did.
    ///
    /// # Errors
    ///
    /// Same as [`PageClient::query`].
    fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, ScraperError>> + Send;

    /// Close whatever disclosure panel is open (the equivalent of pressing Escape).
    ///
    /// # Errors
    ///
    /// Implementation-specific interaction failures.
    fn dismiss_overlay(&mut self) -> impl Future<Output = Result<(), ScraperError>> + Send;
}
