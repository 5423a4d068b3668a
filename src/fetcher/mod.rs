//! Bulk result fetcher
//!
//! Drains a scroll over the search backend into a [`ResultSet`]. The fetch
//! is an explicit state machine:
//!
//! ```text
//! Init ──search──▶ Fetching ──page, total reached──▶ Done
//!                   │    ▲
//!                   │    └──page, more expected──┘ (scroll)
//!                   └──any error──▶ Failed
//! ```
//!
//! `Done` and `Failed` are terminal. Completion is decided by comparing the
//! number of records collected with the total reported by the backend; a
//! page budget and mismatch checks keep an inconsistent backend from looping
//! forever.

use tracing::{debug, info, warn};

use crate::backend::{ScrollRequest, SearchBackend, SearchPage, SearchRequest, TermFilter};
use crate::config::BackendConfig;
use crate::error::{FetchError, IndexSheetError, Result};
use crate::export::ProgressTracker;
use crate::model::{HOST_FIELD, QuerySpec, Record, ResultSet};

/// Lifecycle of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing sent yet
    Init,
    /// Scroll open, pages arriving
    Fetching,
    /// All records collected
    Done,
    /// A call failed or the backend stopped converging
    Failed,
}

impl FetchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Done | FetchState::Failed)
    }
}

/// Scroll cursor held between pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    pub scroll_id: String,
    pub live: bool,
}

impl CursorState {
    fn live(scroll_id: String) -> Self {
        Self {
            scroll_id,
            live: true,
        }
    }
}

/// Pagination settings for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Scroll lease sent with every request
    pub scroll: String,
    /// Hits per page
    pub page_size: u32,
    /// Pages allowed before the fetch gives up
    pub max_pages: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

impl From<&BackendConfig> for FetchOptions {
    fn from(config: &BackendConfig) -> Self {
        Self {
            scroll: config.scroll.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }
}

/// Fetches every record matching a [`QuerySpec`]
pub struct BulkFetcher<'a, B: SearchBackend + ?Sized> {
    backend: &'a B,
    options: FetchOptions,
    progress: Option<&'a ProgressTracker>,
    state: FetchState,
    cursor: Option<CursorState>,
    pages: u64,
    total: Option<u64>,
}

impl<'a, B: SearchBackend + ?Sized> BulkFetcher<'a, B> {
    /// Create a fetcher over `backend`
    pub fn new(backend: &'a B, options: FetchOptions) -> Self {
        Self {
            backend,
            options,
            progress: None,
            state: FetchState::Init,
            cursor: None,
            pages: 0,
            total: None,
        }
    }

    /// Report progress to `tracker` after every page
    pub fn with_progress(mut self, tracker: &'a ProgressTracker) -> Self {
        self.progress = Some(tracker);
        self
    }

    /// Current state
    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Pages received so far
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Total reported by the most recent page
    pub fn reported_total(&self) -> Option<u64> {
        self.total
    }

    /// Fetch all records matching `spec`
    ///
    /// Returns the records in arrival order, one per matched document. On
    /// error nothing is returned. The scroll is released on the backend
    /// whatever the outcome.
    ///
    /// # Arguments
    /// * `spec` - Index, fields and optional host filter
    ///
    /// # Returns
    /// * `Result<ResultSet>` - Exactly `total` records, or the first error
    pub async fn fetch(&mut self, spec: &QuerySpec) -> Result<ResultSet> {
        if self.state != FetchState::Init {
            return Err(IndexSheetError::Generic(format!(
                "fetcher cannot be reused (state {:?})",
                self.state
            )));
        }

        let outcome = self.drain(spec).await;
        self.release_cursor().await;

        match outcome {
            Ok(results) => {
                self.transition(FetchState::Done);
                info!(
                    "Fetched {} records from '{}' in {} page(s)",
                    results.len(),
                    spec.index,
                    self.pages
                );
                Ok(results)
            }
            Err(e) => {
                self.transition(FetchState::Failed);
                Err(e)
            }
        }
    }

    async fn drain(&mut self, spec: &QuerySpec) -> Result<ResultSet> {
        let request = SearchRequest {
            index: spec.index.clone(),
            fields: spec.fields.as_slice().to_vec(),
            filter: spec
                .host_filter
                .as_ref()
                .map(|host| TermFilter::new(HOST_FIELD, host.clone())),
            scroll: self.options.scroll.clone(),
            size: self.options.page_size,
        };

        self.transition(FetchState::Fetching);
        let mut page = self.backend.search(&request).await?;
        let mut results = ResultSet::new();

        loop {
            self.pages += 1;
            let total = page.total;
            let hits = page.hits.len();
            self.total = Some(total);
            self.cursor = page.scroll_id.take().map(CursorState::live);

            Self::append_page(&mut results, page, spec);
            let fetched = results.len() as u64;
            debug!(
                "Page {}: {} hits, {}/{} records",
                self.pages, hits, fetched, total
            );

            if let Some(tracker) = self.progress {
                tracker.set_total(total);
                tracker.update(fetched);
            }

            if fetched == total {
                return Ok(results);
            }
            if fetched > total || hits == 0 {
                return Err(FetchError::TotalMismatch { fetched, total }.into());
            }
            if self.pages >= self.options.max_pages {
                return Err(FetchError::PageBudgetExceeded {
                    pages: self.pages,
                    fetched,
                    total,
                }
                .into());
            }

            let scroll_id = match &self.cursor {
                Some(cursor) => cursor.scroll_id.clone(),
                None => return Err(FetchError::MissingCursor { fetched, total }.into()),
            };

            page = self
                .backend
                .scroll(&ScrollRequest {
                    scroll_id,
                    scroll: self.options.scroll.clone(),
                })
                .await?;
        }
    }

    /// Convert every hit of a page into a record, never dropping a hit
    fn append_page(results: &mut ResultSet, page: SearchPage, spec: &QuerySpec) {
        results.reserve(page.hits.len());
        for hit in page.hits {
            let record = match &hit.fields {
                Some(fields) => Record::project(&spec.fields, fields),
                None => {
                    debug!("Hit {:?} returned no fields", hit.id);
                    Record::empty(&spec.fields)
                }
            };
            results.push(record);
        }
    }

    /// Release the scroll on the backend, best-effort
    async fn release_cursor(&mut self) {
        let Some(mut cursor) = self.cursor.take() else {
            return;
        };
        if !cursor.live {
            return;
        }

        if let Err(e) = self.backend.clear_scroll(&cursor.scroll_id).await {
            warn!("Failed to release scroll: {}", e);
        }
        cursor.live = false;
    }

    fn transition(&mut self, next: FetchState) {
        debug!("Fetch state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::Hit;
    use crate::model::FieldList;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// In-memory backend serving documents in fixed-size pages
    pub(crate) struct FakeBackend {
        docs: Vec<Option<Map<String, Value>>>,
        page_size: usize,
        /// Overrides the reported total
        reported_total: Option<u64>,
        /// Page number (1-based) that fails
        fail_on_page: Option<usize>,
        /// Stop sending scroll ids
        omit_scroll_id: bool,
        /// Reject scroll releases
        fail_clear: bool,
        pub(crate) searches: Mutex<Vec<SearchRequest>>,
        pub(crate) scrolls: Mutex<Vec<ScrollRequest>>,
        pub(crate) cleared: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        pub(crate) fn new(docs: Vec<Option<Value>>, page_size: usize) -> Self {
            Self {
                docs: docs
                    .into_iter()
                    .map(|d| d.and_then(|v| v.as_object().cloned()))
                    .collect(),
                page_size,
                reported_total: None,
                fail_on_page: None,
                omit_scroll_id: false,
                fail_clear: false,
                searches: Mutex::new(Vec::new()),
                scrolls: Mutex::new(Vec::new()),
                cleared: Mutex::new(Vec::new()),
            }
        }

        /// `n` documents with host/url fields
        pub(crate) fn with_docs(n: usize, page_size: usize) -> Self {
            let docs = (0..n)
                .map(|i| {
                    Some(json!({
                        "host": [format!("host{i}.example.com")],
                        "url": [format!("https://host{i}.example.com/page")]
                    }))
                })
                .collect();
            Self::new(docs, page_size)
        }

        fn reporting_total(mut self, total: u64) -> Self {
            self.reported_total = Some(total);
            self
        }

        fn failing_on_page(mut self, page: usize) -> Self {
            self.fail_on_page = Some(page);
            self
        }

        fn without_scroll_id(mut self) -> Self {
            self.omit_scroll_id = true;
            self
        }

        fn failing_clear(mut self) -> Self {
            self.fail_clear = true;
            self
        }

        fn page(&self, number: usize) -> Result<SearchPage> {
            if self.fail_on_page == Some(number) {
                return Err(FetchError::Backend {
                    status: 404,
                    reason: "search_context_missing_exception".to_string(),
                }
                .into());
            }

            let start = ((number - 1) * self.page_size).min(self.docs.len());
            let end = (start + self.page_size).min(self.docs.len());
            Ok(SearchPage {
                hits: self.docs[start..end]
                    .iter()
                    .enumerate()
                    .map(|(i, fields)| Hit {
                        id: Some((start + i).to_string()),
                        fields: fields.clone(),
                    })
                    .collect(),
                total: self.reported_total.unwrap_or(self.docs.len() as u64),
                scroll_id: (!self.omit_scroll_id).then(|| format!("scroll-{number}")),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
            self.searches.lock().unwrap().push(request.clone());
            self.page(1)
        }

        async fn scroll(&self, request: &ScrollRequest) -> Result<SearchPage> {
            let mut scrolls = self.scrolls.lock().unwrap();
            scrolls.push(request.clone());
            let number = scrolls.len() + 1;
            drop(scrolls);
            self.page(number)
        }

        async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
            self.cleared.lock().unwrap().push(scroll_id.to_string());
            if self.fail_clear {
                return Err(FetchError::Transport("connection reset".to_string()).into());
            }
            Ok(())
        }
    }

    fn spec() -> QuerySpec {
        QuerySpec::new("crawl", FieldList::parse("host,url").unwrap())
    }

    fn fetch_error(err: IndexSheetError) -> FetchError {
        match err {
            IndexSheetError::Fetch(e) => e,
            other => panic!("expected a fetch error, got {other:?}"),
        }
    }

    fn options(page_size: u32) -> FetchOptions {
        FetchOptions {
            page_size,
            ..FetchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_collects_reported_total() {
        for (docs, page_size) in [(0, 3), (1, 3), (3, 3), (7, 3), (10, 1), (5, 100)] {
            let backend = FakeBackend::with_docs(docs, page_size);
            let mut fetcher = BulkFetcher::new(&backend, options(page_size as u32));

            let results = fetcher.fetch(&spec()).await.unwrap();

            assert_eq!(results.len(), docs, "docs={docs} page_size={page_size}");
            assert_eq!(fetcher.state(), FetchState::Done);
            assert_eq!(fetcher.reported_total(), Some(docs as u64));
            let expected_pages = if docs == 0 { 1 } else { docs.div_ceil(page_size) };
            assert_eq!(fetcher.pages(), expected_pages as u64);
        }
    }

    #[tokio::test]
    async fn test_fetch_preserves_arrival_order() {
        let backend = FakeBackend::with_docs(5, 2);
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let results = fetcher.fetch(&spec()).await.unwrap();
        let hosts: Vec<&str> = results.iter().map(|r| r.get("host").unwrap()).collect();
        assert_eq!(
            hosts,
            vec![
                "host0.example.com",
                "host1.example.com",
                "host2.example.com",
                "host3.example.com",
                "host4.example.com"
            ]
        );
    }

    #[tokio::test]
    async fn test_scroll_requests_use_latest_cursor() {
        let backend = FakeBackend::with_docs(5, 2);
        let mut fetcher = BulkFetcher::new(&backend, options(2));
        fetcher.fetch(&spec()).await.unwrap();

        let scrolls = backend.scrolls.lock().unwrap();
        let ids: Vec<&str> = scrolls.iter().map(|s| s.scroll_id.as_str()).collect();
        assert_eq!(ids, vec!["scroll-1", "scroll-2"]);
        assert!(scrolls.iter().all(|s| s.scroll == "1s"));
        assert_eq!(*backend.cleared.lock().unwrap(), ["scroll-3"]);
    }

    #[tokio::test]
    async fn test_hits_without_fields_are_kept() {
        let backend = FakeBackend::new(
            vec![
                Some(json!({"host": ["a.gov"]})),
                None,
                Some(json!({"url": ["https://c.gov/"]})),
            ],
            2,
        );
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let results = fetcher.fetch(&spec()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].get("host"), Some("a.gov"));
        assert_eq!(results[0].get("url"), None);
        assert!(results[1].has_field("host") && results[1].has_field("url"));
        assert_eq!(results[1].get("host"), None);
        assert_eq!(results[2].get("url"), Some("https://c.gov/"));
    }

    #[tokio::test]
    async fn test_search_request_carries_projection_and_filter() {
        let backend = FakeBackend::with_docs(1, 10);
        let mut fetcher = BulkFetcher::new(&backend, options(10));
        let spec = spec().with_host_filter(Some("example.com".to_string()));

        fetcher.fetch(&spec).await.unwrap();

        let searches = backend.searches.lock().unwrap();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].index, "crawl");
        assert_eq!(searches[0].fields, vec!["host", "url"]);
        assert_eq!(
            searches[0].filter,
            Some(TermFilter::new("host", "example.com"))
        );
        assert_eq!(searches[0].size, 10);
    }

    #[tokio::test]
    async fn test_error_on_first_page() {
        let backend = FakeBackend::with_docs(4, 2).failing_on_page(1);
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert!(matches!(fetch_error(err), FetchError::Backend { .. }));
        assert_eq!(fetcher.state(), FetchState::Failed);
        assert!(backend.scrolls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_on_later_page_returns_nothing() {
        let backend = FakeBackend::with_docs(6, 2).failing_on_page(2);
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_FETCH);
        assert_eq!(fetcher.state(), FetchState::Failed);
        // no further calls after the failure
        assert_eq!(backend.scrolls.lock().unwrap().len(), 1);
        // the cursor from page 1 is still released
        assert_eq!(*backend.cleared.lock().unwrap(), ["scroll-1"]);
    }

    #[tokio::test]
    async fn test_early_exhaustion_is_a_mismatch() {
        let backend = FakeBackend::with_docs(3, 2).reporting_total(5);
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert_eq!(
            fetch_error(err),
            FetchError::TotalMismatch {
                fetched: 3,
                total: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_overshoot_is_a_mismatch() {
        let backend = FakeBackend::with_docs(3, 2).reporting_total(1);
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert_eq!(
            fetch_error(err),
            FetchError::TotalMismatch {
                fetched: 2,
                total: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_page_budget() {
        let backend = FakeBackend::with_docs(10, 1);
        let mut fetcher = BulkFetcher::new(
            &backend,
            FetchOptions {
                page_size: 1,
                max_pages: 4,
                ..FetchOptions::default()
            },
        );

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert_eq!(
            fetch_error(err),
            FetchError::PageBudgetExceeded {
                pages: 4,
                fetched: 4,
                total: 10,
            }
        );
        assert_eq!(fetcher.state(), FetchState::Failed);
    }

    #[tokio::test]
    async fn test_missing_cursor() {
        let backend = FakeBackend::with_docs(4, 2).without_scroll_id();
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = fetcher.fetch(&spec()).await.unwrap_err();
        assert_eq!(
            fetch_error(err),
            FetchError::MissingCursor {
                fetched: 2,
                total: 4,
            }
        );
        assert!(backend.cleared.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_release_keeps_result() {
        let backend = FakeBackend::with_docs(3, 2).failing_clear();
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let results = assert_ok!(fetcher.fetch(&spec()).await);
        assert_eq!(results.len(), 3);
        assert_eq!(fetcher.state(), FetchState::Done);
        assert_eq!(*backend.cleared.lock().unwrap(), ["scroll-2"]);
    }

    #[tokio::test]
    async fn test_failed_release_keeps_original_error() {
        let backend = FakeBackend::with_docs(4, 2)
            .failing_on_page(2)
            .failing_clear();
        let mut fetcher = BulkFetcher::new(&backend, options(2));

        let err = assert_err!(fetcher.fetch(&spec()).await);
        assert!(matches!(
            fetch_error(err),
            FetchError::Backend { status: 404, .. }
        ));
        assert_eq!(fetcher.state(), FetchState::Failed);
    }

    #[tokio::test]
    async fn test_fetcher_is_single_use() {
        let backend = FakeBackend::with_docs(1, 1);
        let mut fetcher = BulkFetcher::new(&backend, options(1));
        assert_ok!(fetcher.fetch(&spec()).await);

        assert_err!(fetcher.fetch(&spec()).await);
        assert_eq!(fetcher.state(), FetchState::Done);
        assert_eq!(backend.searches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_is_reported() {
        let backend = FakeBackend::with_docs(5, 2);
        let tracker = ProgressTracker::new(None, false);
        let mut fetcher = BulkFetcher::new(&backend, options(2)).with_progress(&tracker);

        fetcher.fetch(&spec()).await.unwrap();
        assert_eq!(tracker.processed(), 5);
        assert_eq!(tracker.total(), Some(5));
    }

    #[test]
    fn test_terminal_states() {
        assert!(FetchState::Done.is_terminal());
        assert!(FetchState::Failed.is_terminal());
        assert!(!FetchState::Init.is_terminal());
        assert!(!FetchState::Fetching.is_terminal());
    }
}
