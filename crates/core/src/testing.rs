use crate::models::{ArticleSummary, GeoHit, LatLng};
use crate::traits::WikiLookup;
use crate::LookupError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory encyclopedia that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeWiki {
    summaries: HashMap<String, ArticleSummary>,
    redirects: HashMap<String, String>,
    searches: HashMap<String, Vec<String>>,
    near_matches: HashMap<String, String>,
    geo_hits: Vec<GeoHit>,
    coordinates: HashMap<String, LatLng>,
    slow_titles: HashMap<String, Duration>,
    geo_failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeWiki {
    pub fn with_summary(mut self, summary: ArticleSummary) -> Self {
        self.summaries.insert(summary.title.clone(), summary);
        self
    }

    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_search(mut self, query: &str, titles: &[&str]) -> Self {
        self.searches.insert(
            query.to_string(),
            titles.iter().map(|title| title.to_string()).collect(),
        );
        self
    }

    pub fn with_near_match(mut self, query: &str, title: &str) -> Self {
        self.near_matches.insert(query.to_string(), title.to_string());
        self
    }

    pub fn with_geo_hits(mut self, titles: &[&str]) -> Self {
        self.geo_hits = titles
            .iter()
            .enumerate()
            .map(|(index, title)| GeoHit {
                title: title.to_string(),
                dist_meters: 100.0 * (index as f64 + 1.0),
            })
            .collect();
        self
    }

    pub fn with_coordinates(mut self, title: &str, at: LatLng) -> Self {
        self.coordinates.insert(title.to_string(), at);
        self
    }

    pub fn with_slow_summary(mut self, title: &str, delay: Duration) -> Self {
        self.slow_titles.insert(title.to_string(), delay);
        self
    }

    pub fn with_geo_failure(mut self, message: &str) -> Self {
        self.geo_failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl WikiLookup for FakeWiki {
    async fn fetch_summary(&self, title: &str) -> Result<Option<ArticleSummary>, LookupError> {
        self.record(format!("summary:{title}"));
        if let Some(delay) = self.slow_titles.get(title) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.summaries.get(title).cloned())
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError> {
        self.record(format!("search:{query}"));
        Ok(self
            .searches
            .get(query)
            .map(|titles| titles.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn search_near_match(&self, query: &str) -> Result<Option<String>, LookupError> {
        self.record(format!("nearmatch:{query}"));
        Ok(self.near_matches.get(query).cloned())
    }

    async fn geo_search(
        &self,
        _at: LatLng,
        _radius_meters: u32,
        limit: usize,
    ) -> Result<Vec<GeoHit>, LookupError> {
        self.record("geo".to_string());
        if let Some(message) = &self.geo_failure {
            return Err(LookupError::Request(message.clone()));
        }
        Ok(self.geo_hits.iter().take(limit).cloned().collect())
    }

    async fn normalize_title(&self, title: &str) -> Result<Option<String>, LookupError> {
        if let Some(target) = self.redirects.get(title) {
            return Ok(Some(target.clone()));
        }
        Ok(self.summaries.contains_key(title).then(|| title.to_string()))
    }

    async fn fetch_coordinates(&self, title: &str) -> Result<Option<LatLng>, LookupError> {
        self.record(format!("coords:{title}"));
        Ok(self.coordinates.get(title).copied())
    }
}
