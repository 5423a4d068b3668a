//! Elasticsearch HTTP backend
//!
//! Speaks the scroll API:
//! - `POST /{index}/_search?scroll=1s` opens the scroll
//! - `POST /_search/scroll` fetches the next page
//! - `DELETE /_search/scroll` releases it

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{BackendErrorInfo, ConfigError, FetchError, Result};

use super::{Hit, ScrollRequest, SearchBackend, SearchPage, SearchRequest, TermFilter};

/// Search backend over the Elasticsearch REST API
pub struct ElasticBackend {
    client: Client,
    base_url: Url,
}

/// Raw search/scroll response body
#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    #[serde(rename = "_shards")]
    shards: Option<RawShards>,
    hits: RawHits,
}

#[derive(Debug, Deserialize)]
struct RawShards {
    #[serde(default)]
    failed: u64,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: RawTotal,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// Total hit count: a bare number on old servers, `{"value": n}` on newer ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTotal {
    Count(u64),
    Object { value: u64 },
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: Option<String>,
    fields: Option<Map<String, Value>>,
}

impl RawTotal {
    fn value(&self) -> u64 {
        match self {
            RawTotal::Count(n) => *n,
            RawTotal::Object { value } => *value,
        }
    }
}

impl From<RawSearchResponse> for SearchPage {
    fn from(raw: RawSearchResponse) -> Self {
        SearchPage {
            total: raw.hits.total.value(),
            scroll_id: raw.scroll_id,
            hits: raw
                .hits
                .hits
                .into_iter()
                .map(|h| Hit {
                    id: h.id,
                    fields: h.fields,
                })
                .collect(),
        }
    }
}

impl ElasticBackend {
    /// Create a backend for the configured server
    ///
    /// # Arguments
    /// * `config` - Backend configuration (URL and request timeout)
    ///
    /// # Returns
    /// * `Result<Self>` - Backend or a configuration error for a bad URL
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Self::parse_base_url(&config.url)?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(FetchError::from)?;

        debug!("Search backend at {}", base_url);
        Ok(Self { client, base_url })
    }

    fn parse_base_url(url: &str) -> Result<Url> {
        let invalid = || ConfigError::InvalidValue {
            field: "backend.url".to_string(),
            value: url.to_string(),
        };

        let parsed = Url::parse(url).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(invalid().into());
        }
        Ok(parsed)
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidValue {
                field: "backend.url".to_string(),
                value: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn non-success responses into backend errors
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let info = BackendErrorInfo::from_body(&body);
        let reason = info.summary(status.canonical_reason().unwrap_or("unknown error"));
        Err(FetchError::Backend {
            status: status.as_u16(),
            reason,
        }
        .into())
    }

    async fn read_page(response: Response) -> Result<SearchPage> {
        let response = Self::check_status(response).await?;
        let body = response.text().await.map_err(FetchError::from)?;
        let page = parse_search_response(&body)?;
        debug!(
            "Received page with {} hits (total {})",
            page.hits.len(),
            page.total
        );
        Ok(page)
    }
}

/// Decode a search or scroll response body
pub(crate) fn parse_search_response(body: &str) -> Result<SearchPage> {
    let raw: RawSearchResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if let Some(shards) = &raw.shards {
        if shards.failed > 0 {
            warn!(
                "{} shard(s) failed to answer, results may be incomplete",
                shards.failed
            );
        }
    }

    Ok(raw.into())
}

/// JSON body of the initial search
pub(crate) fn build_search_body(request: &SearchRequest) -> Value {
    json!({
        "size": request.size,
        "_source": false,
        "fields": request.fields,
        "track_total_hits": true,
        "query": build_query(request.filter.as_ref()),
    })
}

fn build_query(filter: Option<&TermFilter>) -> Value {
    match filter {
        Some(f) => {
            let mut clause = Map::new();
            clause.insert(f.field.clone(), Value::String(f.value.clone()));
            json!({
                "bool": {
                    "filter": [ { "match_phrase": clause } ]
                }
            })
        }
        None => json!({ "match_all": {} }),
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let url = self.endpoint(&[request.index.as_str(), "_search"])?;
        debug!("POST {} (scroll={})", url, request.scroll);

        let response = self
            .client
            .post(url)
            .query(&[("scroll", request.scroll.as_str())])
            .json(&build_search_body(request))
            .send()
            .await
            .map_err(FetchError::from)?;

        Self::read_page(response).await
    }

    async fn scroll(&self, request: &ScrollRequest) -> Result<SearchPage> {
        let url = self.endpoint(&["_search", "scroll"])?;

        let response = self
            .client
            .post(url)
            .json(&json!({
                "scroll": request.scroll,
                "scroll_id": request.scroll_id,
            }))
            .send()
            .await
            .map_err(FetchError::from)?;

        Self::read_page(response).await
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        let url = self.endpoint(&["_search", "scroll"])?;

        let response = self
            .client
            .delete(url)
            .json(&json!({ "scroll_id": [scroll_id] }))
            .send()
            .await
            .map_err(FetchError::from)?;

        Self::check_status(response).await?;
        Ok(())
    }
}
