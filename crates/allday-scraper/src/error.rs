use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("invalid selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("no page loaded; navigate before querying")]
    NoDocument,
}

impl ScraperError {
    /// Returns `true` for transport-level failures worth retrying after a
    /// fixed delay: network errors, timeouts, 429 and 5xx responses.
    ///
    /// Selector, interaction, and 4xx failures are returned immediately;
    /// repeating the same request would not change the outcome.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Http(_)
            | ScraperError::Navigation { .. }
            | ScraperError::Timeout { .. } => true,
            ScraperError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            ScraperError::Interaction(_)
            | ScraperError::Selector { .. }
            | ScraperError::NoDocument => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_transient() {
        let nav = ScraperError::Navigation {
            url: "https://example.com".to_owned(),
            reason: "connection reset".to_owned(),
        };
        let timeout = ScraperError::Timeout {
            url: "https://example.com".to_owned(),
            timeout_secs: 30,
        };
        assert!(nav.is_transient());
        assert!(timeout.is_transient());
    }

    #[test]
    fn server_errors_and_throttling_are_transient() {
        for status in [429, 500, 503] {
            let err = ScraperError::UnexpectedStatus {
                status,
                url: "https://example.com".to_owned(),
            };
            assert!(err.is_transient(), "status {status} should be transient");
        }
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = ScraperError::UnexpectedStatus {
            status: 404,
            url: "https://example.com".to_owned(),
        };
        assert!(!err.is_transient());
        assert!(!ScraperError::Interaction("detached".to_owned()).is_transient());
    }
}
