use crate::models::{ArticleSummary, GeoHit, LatLng};
use crate::LookupError;
use async_trait::async_trait;

/// Read-only operations against the encyclopedia service.
///
/// "Not found" is `Ok(None)` or an empty list; `Err` is reserved for transport
/// or protocol failures.
#[async_trait]
pub trait WikiLookup: Send + Sync {
    async fn fetch_summary(&self, title: &str) -> Result<Option<ArticleSummary>, LookupError>;

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError>;

    async fn search_near_match(&self, query: &str) -> Result<Option<String>, LookupError>;

    /// Hits ordered by distance ascending.
    async fn geo_search(
        &self,
        at: LatLng,
        radius_meters: u32,
        limit: usize,
    ) -> Result<Vec<GeoHit>, LookupError>;

    /// Canonical title after redirects, or `None` if the page does not exist.
    async fn normalize_title(&self, title: &str) -> Result<Option<String>, LookupError>;

    async fn fetch_coordinates(&self, title: &str) -> Result<Option<LatLng>, LookupError>;

    /// Normalizes first; falls back to the raw title when normalization finds nothing.
    async fn fetch_canonical_summary(
        &self,
        title: &str,
    ) -> Result<Option<ArticleSummary>, LookupError> {
        match self.normalize_title(title).await? {
            Some(canonical) => self.fetch_summary(&canonical).await,
            None => self.fetch_summary(title).await,
        }
    }
}
