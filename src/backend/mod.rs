//! Search backend boundary
//!
//! The fetcher talks to the search engine only through [`SearchBackend`]:
//! - `search` opens a scroll over an index with a field projection
//! - `scroll` fetches the next page for a scroll id
//! - `clear_scroll` releases the scroll context on the server
//!
//! [`ElasticBackend`] implements the trait over the Elasticsearch HTTP API.

pub mod elastic;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

pub use elastic::ElasticBackend;

/// Equality predicate evaluated by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFilter {
    pub field: String,
    pub value: String,
}

impl TermFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Initial request opening a scroll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Index to search
    pub index: String,
    /// Fields to return for each hit
    pub fields: Vec<String>,
    /// Optional backend-side filter
    pub filter: Option<TermFilter>,
    /// Scroll lease, e.g. `1s`
    pub scroll: String,
    /// Hits per page
    pub size: u32,
}

/// Follow-up request for the next page of a scroll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub scroll_id: String,
    pub scroll: String,
}

/// One matched document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit {
    /// Document id, when the backend reports one
    pub id: Option<String>,
    /// Returned fields; `None` when the backend sent none for this hit
    pub fields: Option<Map<String, Value>>,
}

/// One page of a scroll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<Hit>,
    /// Total number of matches reported by the backend
    pub total: u64,
    /// Cursor for the next page
    pub scroll_id: Option<String>,
}

/// Paginated search engine access
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the initial search and open a scroll
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Fetch the next page of an open scroll
    async fn scroll(&self, request: &ScrollRequest) -> Result<SearchPage>;

    /// Release a scroll context
    async fn clear_scroll(&self, scroll_id: &str) -> Result<()>;
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        (**self).search(request).await
    }

    async fn scroll(&self, request: &ScrollRequest) -> Result<SearchPage> {
        (**self).scroll(request).await
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        (**self).clear_scroll(scroll_id).await
    }
}
