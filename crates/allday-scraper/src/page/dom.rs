//! Static DOM state shared by the HTML-backed page clients.
//!
//! Nodes are detached snapshots (their outer HTML) tagged with the layer and
//! load generation they came from, so a node taken from a page that has
//! since been replaced is recognized as no longer attached.

use scraper::{ElementRef, Html, Selector};

use super::PageNode;
use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Document,
    Overlay,
}

/// A snapshot of one element from the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlNode {
    html: String,
    layer: Layer,
    generation: u64,
}

impl HtmlNode {
    fn with_element<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let fragment = Html::parse_fragment(&self.html);
        let element = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)?;
        Some(f(element))
    }

    fn descendant(&self, html: String) -> Self {
        Self {
            html,
            layer: self.layer,
            generation: self.generation,
        }
    }
}

impl PageNode for HtmlNode {
    fn text(&self) -> String {
        self.with_element(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.with_element(|el| el.value().attr(name).map(str::to_owned))
            .flatten()
    }

    fn query(&self, selector: &str) -> Result<Option<Self>, ScraperError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Self>, ScraperError> {
        let selector = parse_selector(selector)?;
        let htmls = self
            .with_element(|el| {
                el.select(&selector)
                    .filter(|m| m.id() != el.id())
                    .map(|m| m.html())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(htmls.into_iter().map(|h| self.descendant(h)).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

fn select_all(html: &Html, selector: &Selector, layer: Layer, generation: u64) -> Vec<HtmlNode> {
    html.select(selector)
        .map(|el| HtmlNode {
            html: el.html(),
            layer,
            generation,
        })
        .collect()
}

/// The loaded document plus at most one overlay (an opened disclosure panel).
#[derive(Debug, Default)]
pub(crate) struct DomState {
    url: Option<String>,
    document: Option<String>,
    overlay: Option<String>,
    document_generation: u64,
    overlay_generation: u64,
}

impl DomState {
    pub(crate) fn load(&mut self, url: &str, body: String) {
        self.url = Some(url.to_owned());
        self.document = Some(body);
        self.document_generation += 1;
        self.close_overlay();
    }

    pub(crate) fn open_overlay(&mut self, body: String) {
        self.overlay = Some(body);
        self.overlay_generation += 1;
    }

    pub(crate) fn close_overlay(&mut self) -> bool {
        if self.overlay.take().is_some() {
            self.overlay_generation += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn query_all(&self, selector: &str) -> Result<Vec<HtmlNode>, ScraperError> {
        let document = self.document.as_deref().ok_or(ScraperError::NoDocument)?;
        let selector = parse_selector(selector)?;

        let mut nodes = select_all(
            &Html::parse_document(document),
            &selector,
            Layer::Document,
            self.document_generation,
        );
        if let Some(overlay) = self.overlay.as_deref() {
            nodes.extend(select_all(
                &Html::parse_fragment(overlay),
                &selector,
                Layer::Overlay,
                self.overlay_generation,
            ));
        }
        Ok(nodes)
    }

    pub(crate) fn query(&self, selector: &str) -> Result<Option<HtmlNode>, ScraperError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    pub(crate) fn ensure_attached(&self, node: &HtmlNode) -> Result<(), ScraperError> {
        let current = match node.layer {
            Layer::Document => self.document.is_some().then_some(self.document_generation),
            Layer::Overlay => self.overlay.is_some().then_some(self.overlay_generation),
        };
        if current == Some(node.generation) {
            Ok(())
        } else {
            Err(ScraperError::Interaction(
                "node is no longer attached to the page".to_owned(),
            ))
        }
    }

    /// URL that activating `node` loads, resolved against the current page.
    ///
    /// `data-href` wins over `href`; fragment and `javascript:` links have no
    /// target, so activating them leaves the static page as it is.
    pub(crate) fn activation_target(&self, node: &HtmlNode) -> Option<String> {
        let raw = node
            .attribute("data-href")
            .or_else(|| node.attribute("href"))?;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') || raw.starts_with("javascript:") {
            return None;
        }
        let base = reqwest::Url::parse(self.url.as_deref()?).ok()?;
        base.join(raw).ok().map(String::from)
    }
}
