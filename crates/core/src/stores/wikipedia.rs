use crate::models::{ArticleSummary, GeoHit, LatLng};
use crate::traits::WikiLookup;
use crate::LookupError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_REST_URL: &str = "https://en.wikipedia.org/api/rest_v1";
pub const DEFAULT_USER_AGENT: &str =
    concat!("place-wiki/", env!("CARGO_PKG_VERSION"), " (https://crates.io/crates/place-wiki-core)");

/// The action API rejects `gsradius` above this.
pub const MAX_GEOSEARCH_RADIUS_M: u32 = 10_000;

const BACKEND: &str = "wikipedia";

#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    pub api_url: String,
    pub rest_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct WikipediaClient {
    client: Arc<Client>,
    api_url: Url,
    rest_url: Url,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_url: Url::parse(&config.api_url)?,
            rest_url: Url::parse(config.rest_url.trim_end_matches('/'))?,
        })
    }

    fn summary_url(&self, title: &str) -> Result<Url, LookupError> {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Request(format!("rest url cannot be a base: {}", self.rest_url)))?
            .extend(["page", "summary"])
            .push(&title.replace(' ', "_"));
        Ok(url)
    }

    fn action_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("action", "query")
                .append_pair("format", "json")
                .append_pair("formatversion", "2");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    async fn get_action(&self, params: &[(&str, &str)]) -> Result<Value, LookupError> {
        let url = self.action_url(params);
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "action api request failed");
            return Err(LookupError::BackendResponse {
                backend: BACKEND.to_string(),
                details: response.status().to_string(),
            });
        }

        let body: Value = response.json().await?;
        check_api_error(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl WikiLookup for WikipediaClient {
    async fn fetch_summary(&self, title: &str) -> Result<Option<ArticleSummary>, LookupError> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        let url = self.summary_url(title.trim())?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            if response.status() != StatusCode::NOT_FOUND {
                warn!(title, status = %response.status(), "summary request failed");
            }
            return Ok(None);
        }

        let summary: ArticleSummary = response.json().await?;
        debug!(title, resolved = %summary.title, "summary fetched");
        Ok(Some(summary))
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let limit = limit.to_string();
        let body = self
            .get_action(&[
                ("list", "search"),
                ("srsearch", query.trim()),
                ("srlimit", &limit),
            ])
            .await?;

        let titles = parse_search_titles(&body);
        debug!(query, hits = titles.len(), "full-text search");
        Ok(titles)
    }

    async fn search_near_match(&self, query: &str) -> Result<Option<String>, LookupError> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let body = self
            .get_action(&[
                ("list", "search"),
                ("srsearch", query.trim()),
                ("srwhat", "nearmatch"),
                ("srlimit", "1"),
            ])
            .await?;

        Ok(parse_search_titles(&body).into_iter().next())
    }

    async fn geo_search(
        &self,
        at: LatLng,
        radius_meters: u32,
        limit: usize,
    ) -> Result<Vec<GeoHit>, LookupError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let coord = format!("{}|{}", at.lat, at.lng);
        let radius = radius_meters.clamp(10, MAX_GEOSEARCH_RADIUS_M).to_string();
        let limit = limit.to_string();
        let body = self
            .get_action(&[
                ("list", "geosearch"),
                ("gscoord", &coord),
                ("gsradius", &radius),
                ("gslimit", &limit),
            ])
            .await?;

        let hits = parse_geo_hits(&body);
        debug!(lat = at.lat, lng = at.lng, hits = hits.len(), "geosearch");
        Ok(hits)
    }

    async fn normalize_title(&self, title: &str) -> Result<Option<String>, LookupError> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        let body = self
            .get_action(&[("titles", title.trim()), ("redirects", "1")])
            .await?;
        Ok(parse_normalized_title(&body))
    }

    async fn fetch_coordinates(&self, title: &str) -> Result<Option<LatLng>, LookupError> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        let body = self
            .get_action(&[
                ("prop", "coordinates"),
                ("titles", title.trim()),
                ("redirects", "1"),
            ])
            .await?;
        Ok(parse_coordinates(&body))
    }
}

fn check_api_error(body: &Value) -> Result<(), LookupError> {
    match body.pointer("/error") {
        Some(error) => {
            let code = error
                .pointer("/code")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let info = error
                .pointer("/info")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Err(LookupError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("{code}: {info}"),
            })
        }
        None => Ok(()),
    }
}

fn parse_search_titles(body: &Value) -> Vec<String> {
    body.pointer("/query/search")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.pointer("/title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_geo_hits(body: &Value) -> Vec<GeoHit> {
    body.pointer("/query/geosearch")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let title = hit.pointer("/title").and_then(Value::as_str)?;
                    let dist_meters = hit.pointer("/dist").and_then(Value::as_f64).unwrap_or(0.0);
                    Some(GeoHit {
                        title: title.to_string(),
                        dist_meters,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_page(body: &Value) -> Option<&Value> {
    let page = body.pointer("/query/pages/0")?;
    let flagged = |flag: &str| page.pointer(flag).and_then(Value::as_bool).unwrap_or(false);
    if flagged("/missing") || flagged("/invalid") {
        return None;
    }
    Some(page)
}

fn parse_normalized_title(body: &Value) -> Option<String> {
    first_page(body)?
        .pointer("/title")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_coordinates(body: &Value) -> Option<LatLng> {
    let coordinate = first_page(body)?.pointer("/coordinates/0")?;
    let lat = coordinate.pointer("/lat").and_then(Value::as_f64)?;
    let lon = coordinate.pointer("/lon").and_then(Value::as_f64)?;
    Some(LatLng::new(lat, lon))
}
