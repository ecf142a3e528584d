use crate::badge::BadgeTag;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

const WIKI_PAGE_BASE: &str = "https://en.wikipedia.org/wiki";

pub const DEFAULT_POOL_CAP: usize = 51;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminHierarchy {
    pub city: String,
    pub county: String,
    pub state: String,
    pub state_code: String,
    pub country: String,
    pub country_code: String,
}

/// A place picked in the autocomplete widget. One per selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedPlace {
    pub name: String,
    #[serde(alias = "address")]
    pub formatted_address: String,
    pub location: Option<LatLng>,
    pub admin: AdminHierarchy,
    pub types: Vec<String>,
}

impl SelectedPlace {
    /// City from the admin hierarchy, else the display name.
    pub fn city_or_name(&self) -> &str {
        let city = self.admin.city.trim();
        if city.is_empty() {
            self.name.trim()
        } else {
            city
        }
    }

    /// Country from the admin hierarchy, else the last segment of the formatted address.
    pub fn country_hint(&self) -> String {
        let country = self.admin.country.trim();
        if !country.is_empty() {
            return country.to_string();
        }

        self.formatted_address
            .rsplit(',')
            .next()
            .map(|segment| segment.trim().to_string())
            .unwrap_or_default()
    }

    /// `"{city} {state} {country}"` with empty parts dropped.
    pub fn composite_query(&self) -> String {
        let country = self.country_hint();
        [self.city_or_name(), self.admin.state.trim(), country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Thumbnail {
    pub source: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PageLinks {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentUrls {
    pub desktop: Option<PageLinks>,
    pub mobile: Option<PageLinks>,
}

/// Page summary as returned by the REST summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ArticleSummary {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default, rename = "type")]
    pub page_type: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
}

impl ArticleSummary {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_coordinate(mut self, at: LatLng) -> Self {
        self.coordinates = Some(Coordinates {
            lat: at.lat,
            lon: at.lng,
        });
        self
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn is_disambiguation(&self) -> bool {
        self.page_type.as_deref() == Some("disambiguation")
    }

    pub fn coordinate(&self) -> Option<LatLng> {
        self.coordinates
            .map(|coordinates| LatLng::new(coordinates.lat, coordinates.lon))
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()
            .and_then(|thumbnail| thumbnail.source.as_deref())
    }

    pub fn page_url(&self) -> Option<String> {
        let desktop = self
            .content_urls
            .as_ref()
            .and_then(|urls| urls.desktop.as_ref())
            .and_then(|links| links.page.clone());
        if desktop.is_some() {
            return desktop;
        }

        let mut url = Url::parse(WIKI_PAGE_BASE).ok()?;
        url.path_segments_mut()
            .ok()?
            .push(&self.title.replace(' ', "_"));
        Some(url.to_string())
    }

    pub fn blurb(&self) -> &str {
        self.extract
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .or_else(|| {
                self.description
                    .as_deref()
                    .filter(|text| !text.trim().is_empty())
            })
            .unwrap_or("No summary available.")
    }
}

/// One hit of a proximity search, ordered by distance by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoHit {
    pub title: String,
    pub dist_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub badge: Option<BadgeTag>,
    pub distance_km: Option<f64>,
    pub is_primary: bool,
}

impl PoolEntry {
    pub fn new(summary: ArticleSummary, badge: Option<BadgeTag>, distance_km: f64) -> Self {
        Self {
            summary,
            badge,
            distance_km: distance_km.is_finite().then_some(distance_km),
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }

    pub fn display_tag(&self) -> Option<&str> {
        self.badge
            .map(BadgeTag::label)
            .or(self.summary.description.as_deref())
    }
}

/// Ordered, title-unique, capped list of entries built for one selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pool {
    entries: Vec<PoolEntry>,
    #[serde(skip)]
    seen: HashSet<String>,
    #[serde(skip, default = "default_pool_cap")]
    cap: usize,
}

fn default_pool_cap() -> usize {
    DEFAULT_POOL_CAP
}

impl Pool {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.cap
    }

    pub fn has_seen(&self, title: &str) -> bool {
        self.seen.contains(title)
    }

    /// Appends unless full, already present, or a second primary.
    pub fn push(&mut self, entry: PoolEntry) -> bool {
        if self.is_full() {
            return false;
        }
        if self.entries.iter().any(|existing| existing.title() == entry.title()) {
            return false;
        }
        if entry.is_primary && self.primary().is_some() {
            return false;
        }

        self.seen.insert(entry.title().to_string());
        self.entries.push(entry);
        true
    }

    pub fn primary(&self) -> Option<&PoolEntry> {
        self.entries.iter().find(|entry| entry.is_primary)
    }

    /// Entries with the primary, if any, moved to position 0.
    pub fn into_ranked(mut self) -> Vec<PoolEntry> {
        if let Some(position) = self.entries.iter().position(|entry| entry.is_primary) {
            let primary = self.entries.remove(position);
            self.entries.insert(0, primary);
        }
        self.entries.truncate(self.cap);
        self.entries
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::with_cap(DEFAULT_POOL_CAP)
    }
}
