//! Fixed-delay retry for page navigations.
//!
//! Transient failures (see [`ScraperError::is_transient`]) are retried after a
//! constant pause; everything else propagates on the first attempt.

use std::time::Duration;

use crate::error::ScraperError;
use crate::page::{PageClient, WaitCondition};

/// Navigation settings shared by every page visit in a run.
#[derive(Debug, Clone, Copy)]
pub struct NavigationPolicy {
    pub wait: WaitCondition,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

/// Navigate `client` to `url` under `policy`, retrying transient failures.
///
/// # Errors
///
/// Returns the navigation error that ended the attempts.
pub async fn navigate_with_retry<P: PageClient>(
    client: &mut P,
    url: &str,
    policy: NavigationPolicy,
) -> Result<(), ScraperError> {
    let mut attempt = 0u32;

    loop {
        match client.navigate(url, policy.wait, policy.timeout).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if !err.is_transient() || attempt >= policy.max_retries {
                    return Err(err);
                }
                tracing::warn!(
                    url,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    error = %err,
                    "navigation failed, retrying"
                );
            }
        }
        tokio::time::sleep(policy.retry_delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::memory::MemoryPageClient;

    fn policy(max_retries: u32) -> NavigationPolicy {
        NavigationPolicy {
            wait: WaitCondition::NetworkIdle,
            timeout: Duration::from_secs(30),
            max_retries,
            retry_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn navigation_recovers_after_transient_failures() {
        let url = "https://shop.example/page";
        let mut client = MemoryPageClient::new()
            .with_page(url, "<html><body><p>ok</p></body></html>")
            .fail_next(url, 2);

        navigate_with_retry(&mut client, url, policy(2)).await.unwrap();

        assert_eq!(client.navigations().len(), 3);
        assert!(client.query("p").unwrap().is_some());
    }

    #[tokio::test]
    async fn zero_retries_navigates_once() {
        let mut client = MemoryPageClient::new();
        let err = navigate_with_retry(&mut client, "https://shop.example/none", policy(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ScraperError::Navigation { .. }));
        assert_eq!(client.navigations().len(), 1);
    }

    #[tokio::test]
    async fn navigation_gives_up_after_max_retries() {
        let url = "https://shop.example/page";
        let mut client = MemoryPageClient::new()
            .with_page(url, "<html></html>")
            .fail_next(url, 5);

        let err = navigate_with_retry(&mut client, url, policy(2))
            .await
            .unwrap_err();

        assert!(matches!(err, ScraperError::Timeout { .. }));
        assert_eq!(client.navigations().len(), 3);
    }
}
