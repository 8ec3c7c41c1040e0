//! Process-wide cache for the service-scope bearer token.

use std::future::Future;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::enrichment::domain::{EnrichmentError, ServiceToken};

/// Caches one token and serializes refreshes so concurrent callers that find
/// it stale trigger a single exchange.
#[derive(Default)]
pub struct TokenCache {
    current: RwLock<Option<ServiceToken>>,
    refresh: Mutex<()>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if still fresh.
    pub fn cached(&self) -> Option<ServiceToken> {
        self.current
            .read()
            .as_ref()
            .filter(|token| token.is_fresh())
            .cloned()
    }

    /// Return the cached token or run `fetch` to get a new one.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<ServiceToken, EnrichmentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ServiceToken, EnrichmentError>>,
    {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let token = fetch().await?;
        *self.current.write() = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token if it is the one that was rejected.
    pub fn invalidate(&self, rejected: &str) {
        let mut current = self.current.write();
        if current
            .as_ref()
            .is_some_and(|token| token.access_token == rejected)
        {
            *current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetches_once_while_fresh() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_fetch(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(ServiceToken::new("t1", Duration::from_secs(3600)))
                })
                .await
                .unwrap();
            assert_eq!(token.access_token, "t1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_token_is_refetched() {
        let cache = TokenCache::new();
        cache
            .get_or_fetch(|| async { Ok(ServiceToken::new("old", Duration::from_secs(10))) })
            .await
            .unwrap();
        assert!(cache.cached().is_none());

        let token = cache
            .get_or_fetch(|| async { Ok(ServiceToken::new("new", Duration::from_secs(3600))) })
            .await
            .unwrap();
        assert_eq!(token.access_token, "new");
    }

    #[tokio::test]
    async fn test_invalidate_only_matching_token() {
        let cache = TokenCache::new();
        cache
            .get_or_fetch(|| async { Ok(ServiceToken::new("t1", Duration::from_secs(3600))) })
            .await
            .unwrap();

        cache.invalidate("someone-else");
        assert!(cache.cached().is_some());

        cache.invalidate("t1");
        assert!(cache.cached().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_empty() {
        let cache = TokenCache::new();
        let result = cache
            .get_or_fetch(|| async { Err(EnrichmentError::Auth("invalid_client".to_string())) })
            .await;
        assert!(result.is_err());
        assert!(cache.cached().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let cache = Arc::new(TokenCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_fetch(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(ServiceToken::new("shared", Duration::from_secs(3600)))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().access_token, "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
