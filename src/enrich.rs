use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::UrlCache;
use crate::config::FetchConfig;
use crate::dataset::types::{EvidenceRef, SearchResult};
use crate::fetch::{FetchError, PageFetcher};

/// Where the text of an enriched search result came from.
#[derive(Debug)]
pub enum ContentSource {
    /// No URL on the evidence; the snippet is used as-is.
    NoUrl,
    /// Served from the cache, possibly a cached failure (empty text).
    CacheHit,
    /// Fetched over the network just now.
    Fetched,
    /// Fetched just now and failed; the failure is cached.
    FetchFailed(FetchError),
}

pub struct Enrichment {
    pub result: SearchResult,
    pub source: ContentSource,
}

/// Turns evidence references into search results carrying full page text.
///
/// Each URL is fetched at most once across runs: successes and failures
/// alike are written to the cache, and a cached entry is never retried.
/// The request delay follows every request that reached the network.
pub struct Enricher<F> {
    fetcher: F,
    cache: UrlCache,
    request_delay: Duration,
}

impl<F: PageFetcher> Enricher<F> {
    pub fn new(fetcher: F, cache: UrlCache, config: &FetchConfig) -> Self {
        Self {
            fetcher,
            cache,
            request_delay: config.request_delay,
        }
    }

    pub fn cache(&self) -> &UrlCache {
        &self.cache
    }

    pub async fn save_cache(&mut self) {
        self.cache.save().await;
    }

    pub fn into_cache(self) -> UrlCache {
        self.cache
    }

    /// Build the search result for one evidence reference. Never fails; when
    /// no page text is available `page_result` falls back to the snippet.
    pub async fn enrich(&mut self, evidence: &EvidenceRef) -> Enrichment {
        let (content, source) = if evidence.page_url.is_empty() {
            (String::new(), ContentSource::NoUrl)
        } else {
            self.page_content(&evidence.page_url).await
        };

        let page_result = if content.is_empty() {
            evidence.page_snippet.clone()
        } else {
            content
        };

        Enrichment {
            result: SearchResult {
                page_name: evidence.page_name.clone(),
                page_url: evidence.page_url.clone(),
                page_snippet: evidence.page_snippet.clone(),
                page_result,
                page_last_modified: String::new(),
            },
            source,
        }
    }

    async fn page_content(&mut self, url: &str) -> (String, ContentSource) {
        if let Some(cached) = self.cache.get(url) {
            debug!(url, "Cache hit");
            return (cached.to_string(), ContentSource::CacheHit);
        }

        let outcome = self.fetcher.fetch(url).await;
        let sent = outcome.as_ref().map_or_else(FetchError::was_sent, |_| true);
        let (content, source) = match outcome {
            Ok(content) => (content, ContentSource::Fetched),
            Err(e) => {
                warn!(url, "Error fetching: {}", e);
                // Cached empty so the URL is not retried
                (String::new(), ContentSource::FetchFailed(e))
            }
        };
        self.cache.put(url, content.clone());

        if sent && !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        (content, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeFetcher;

    fn no_delay() -> FetchConfig {
        FetchConfig {
            request_delay: Duration::ZERO,
            ..FetchConfig::default()
        }
    }

    fn evidence(url: &str) -> EvidenceRef {
        EvidenceRef {
            page_name: "Page".to_string(),
            page_url: url.to_string(),
            page_snippet: "short snippet".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_url_uses_snippet_without_fetch() {
        let fetcher = FakeFetcher::default();
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, UrlCache::in_memory(), &no_delay());

        let out = enricher.enrich(&evidence("")).await;
        assert!(matches!(out.source, ContentSource::NoUrl));
        assert_eq!(out.result.page_result, "short snippet");
        assert_eq!(out.result.page_last_modified, "");
        assert!(calls.lock().unwrap().is_empty());
        assert!(enricher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let fetcher = FakeFetcher::default().with_page("https://w/Rust", "Full article.");
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, UrlCache::in_memory(), &no_delay());

        let first = enricher.enrich(&evidence("https://w/Rust")).await;
        let second = enricher.enrich(&evidence("https://w/Rust")).await;

        assert!(matches!(first.source, ContentSource::Fetched));
        assert!(matches!(second.source, ContentSource::CacheHit));
        assert_eq!(first.result, second.result);
        assert_eq!(second.result.page_result, "Full article.");
        assert_eq!(second.result.page_snippet, "short snippet");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_cached_and_falls_back_to_snippet() {
        let fetcher = FakeFetcher::default();
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, UrlCache::in_memory(), &no_delay());

        let first = enricher.enrich(&evidence("https://w/Gone")).await;
        assert!(matches!(
            first.source,
            ContentSource::FetchFailed(FetchError::Status(404))
        ));
        assert_eq!(first.result.page_result, "short snippet");
        assert_eq!(enricher.cache().get("https://w/Gone"), Some(""));

        let second = enricher.enrich(&evidence("https://w/Gone")).await;
        assert!(matches!(second.source, ContentSource::CacheHit));
        assert_eq!(second.result, first.result);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_extraction_poisons_cache() {
        let fetcher = FakeFetcher::default().with_page("https://w/Stub", "");
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, UrlCache::in_memory(), &no_delay());

        let out = enricher.enrich(&evidence("https://w/Stub")).await;
        assert!(matches!(out.source, ContentSource::FetchFailed(FetchError::Empty)));
        assert_eq!(out.result.page_result, "short snippet");

        enricher.enrich(&evidence("https://w/Stub")).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preloaded_cache_skips_network() {
        let mut cache = UrlCache::in_memory();
        cache.put("https://w/Known", "From an earlier run.".to_string());
        let fetcher = FakeFetcher::default().with_page("https://w/Known", "fresh");
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, cache, &no_delay());

        let out = enricher.enrich(&evidence("https://w/Known")).await;
        assert_eq!(out.result.page_result, "From an earlier run.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delay_applies_only_to_network_fetches() {
        let config = FetchConfig {
            request_delay: Duration::from_millis(50),
            ..FetchConfig::default()
        };
        let mut cache = UrlCache::in_memory();
        cache.put("https://w/Cached", "cached".to_string());
        let fetcher = FakeFetcher::default().with_page("https://w/New", "new");
        let mut enricher = Enricher::new(fetcher, cache, &config);

        let start = std::time::Instant::now();
        enricher.enrich(&evidence("https://w/Cached")).await;
        enricher.enrich(&evidence("")).await;
        assert!(start.elapsed() < Duration::from_millis(50));

        let start = std::time::Instant::now();
        enricher.enrich(&evidence("https://w/New")).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_unbuildable_url_skips_delay_but_is_cached() {
        let config = FetchConfig {
            request_delay: Duration::from_millis(50),
            ..FetchConfig::default()
        };
        let fetcher = FakeFetcher::default();
        let calls = fetcher.call_log();
        let mut enricher = Enricher::new(fetcher, UrlCache::in_memory(), &config);

        let start = std::time::Instant::now();
        let out = enricher.enrich(&evidence("not a url")).await;
        assert!(start.elapsed() < Duration::from_millis(50));
        assert!(matches!(out.source, ContentSource::FetchFailed(FetchError::Request(_))));
        assert_eq!(out.result.page_result, "short snippet");
        assert_eq!(enricher.cache().get("not a url"), Some(""));

        let again = enricher.enrich(&evidence("not a url")).await;
        assert!(matches!(again.source, ContentSource::CacheHit));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
