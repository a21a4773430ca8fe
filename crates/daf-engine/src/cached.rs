//! Response caching in front of a [`RequestHandler`].

use daf_cache::{CacheError, SharedLruCache};
use daf_sefaria::RequestMaker;

use crate::error::ApiError;
use crate::handler::RequestHandler;
use crate::response::PageResponse;

/// Size of a page as served: the length of its JSON.
fn response_weight(page: &PageResponse) -> usize {
    serde_json::to_string(page).map_or(usize::MAX, |json| json.len())
}

/// Serves repeated requests from a weighted LRU cache. Pages rendered from
/// an incomplete link graph are served but never cached.
#[derive(Debug)]
pub struct CachedRequestHandler<R> {
    inner: RequestHandler<R>,
    cache: SharedLruCache<PageResponse>,
}

impl<R: RequestMaker> CachedRequestHandler<R> {
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `max_weight` is zero.
    pub fn new(inner: RequestHandler<R>, max_weight: usize) -> Result<Self, CacheError> {
        Ok(Self { inner, cache: SharedLruCache::new(max_weight, response_weight)? })
    }

    #[must_use]
    pub const fn inner(&self) -> &RequestHandler<R> {
        &self.inner
    }

    /// Number of cached pages.
    #[must_use]
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    /// # Errors
    ///
    /// See [`RequestHandler::render`].
    pub async fn handle_request(&self, book_name: &str, page: &str) -> Result<PageResponse, ApiError> {
        let key = format!("{book_name}/{page}");
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(%key, "cache hit");
            return Ok(cached);
        }

        let rendered = self.inner.render(book_name, page).await?;
        if rendered.complete {
            if let Err(e) = self.cache.put(key, rendered.page.clone()) {
                tracing::warn!(%e, "response not cached");
            }
        } else {
            tracing::info!(%key, "incomplete link graph, not caching");
        }
        Ok(rendered.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daf_sefaria::{MemoryRequestMaker, TextLink};
    use pretty_assertions::assert_eq;

    fn texts_requested(handler: &CachedRequestHandler<MemoryRequestMaker>) -> usize {
        handler
            .inner()
            .maker()
            .requested()
            .iter()
            .filter(|endpoint| endpoint.starts_with("/texts/"))
            .count()
    }

    #[tokio::test]
    async fn complete_pages_are_served_from_cache() {
        let maker = MemoryRequestMaker::new().with_text("Genesis 1", vec!["בראשית"], vec!["In the beginning"]);
        let handler = CachedRequestHandler::new(RequestHandler::new(maker).unwrap(), 1 << 20).unwrap();

        let first = handler.handle_request("Genesis", "1").await.unwrap();
        let second = handler.handle_request("Genesis", "1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(texts_requested(&handler), 1);
        assert_eq!(handler.cached_pages(), 1);
    }

    #[tokio::test]
    async fn incomplete_pages_are_not_cached() {
        let maker = MemoryRequestMaker::new()
            .with_text("Genesis 1", vec!["בראשית"], vec!["In the beginning"])
            .with_links("Genesis 1", vec![TextLink::new("Rashi", "Rashi on Genesis 1:1:1", "Genesis 1:1")])
            .failing("Rashi on Genesis 1:1:1");
        let handler = CachedRequestHandler::new(RequestHandler::new(maker).unwrap(), 1 << 20).unwrap();

        handler.handle_request("Genesis", "1").await.unwrap();
        handler.handle_request("Genesis", "1").await.unwrap();
        assert_eq!(texts_requested(&handler), 2);
        assert_eq!(handler.cached_pages(), 0);
    }

    #[tokio::test]
    async fn pages_heavier_than_the_cache_are_still_served() {
        let maker = MemoryRequestMaker::new().with_text("Genesis 1", vec!["בראשית"], vec!["In the beginning"]);
        let handler = CachedRequestHandler::new(RequestHandler::new(maker).unwrap(), 10).unwrap();

        let page = handler.handle_request("Genesis", "1").await.unwrap();
        assert_eq!(page.sections.len(), 1);
        assert_eq!(handler.cached_pages(), 0);
    }
}
