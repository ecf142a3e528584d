use crate::badge::BadgeTag;
use crate::classifier::{is_sub_place_of, Classifier};
use crate::geo::resolve_distance;
use crate::models::{ArticleSummary, LatLng, PoolEntry, SelectedPlace};
use crate::trace::{tracing_hook, RejectReason, Stage, TraceEvent, TraceHook};
use crate::traits::WikiLookup;
use crate::LookupError;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct AcceptancePolicy {
    pub max_distance_km: f64,
    /// Accept unbadged candidates whose title merely looks like a place name.
    pub accept_place_shaped_titles: bool,
    /// Reject `"X, <city>"` titles where X is neither the city nor the selected place.
    pub reject_sub_place_titles: bool,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            max_distance_km: 150.0,
            accept_place_shaped_titles: false,
            reject_sub_place_titles: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    pub search_limit: usize,
    pub geo_radius_m: u32,
    pub geo_limit: usize,
    pub policy: AcceptancePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_limit: 10,
            geo_radius_m: 25_000,
            geo_limit: 25,
            policy: AcceptancePolicy::default(),
        }
    }
}

/// Where primary candidates come from, in priority order. Each source only
/// touches the network when it is expanded.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    Bare(String),
    NearMatch(String),
    Formatted(String),
    Search { query: String, limit: usize },
    Nearby { at: LatLng, radius_m: u32, limit: usize },
}

impl CandidateSource {
    pub fn label(&self) -> &'static str {
        match self {
            CandidateSource::Bare(_) => "bare",
            CandidateSource::NearMatch(_) => "near-match",
            CandidateSource::Formatted(_) => "formatted",
            CandidateSource::Search { .. } => "search",
            CandidateSource::Nearby { .. } => "nearby",
        }
    }

    async fn titles<L>(&self, lookup: &L) -> Result<Vec<String>, LookupError>
    where
        L: WikiLookup + ?Sized,
    {
        match self {
            CandidateSource::Bare(title) | CandidateSource::Formatted(title) => {
                Ok(vec![title.clone()])
            }
            CandidateSource::NearMatch(query) => {
                Ok(lookup.search_near_match(query).await?.into_iter().collect())
            }
            CandidateSource::Search { query, limit } => lookup.search_titles(query, *limit).await,
            CandidateSource::Nearby {
                at,
                radius_m,
                limit,
            } => Ok(lookup
                .geo_search(*at, *radius_m, *limit)
                .await?
                .into_iter()
                .map(|hit| hit.title)
                .collect()),
        }
    }
}

/// `"{city}, {state}"` or `"{city} ({state})"` for the selected place.
fn is_formatted_city_title(place: &SelectedPlace, title: &str) -> bool {
    let base = place.city_or_name();
    let state = place.admin.state.trim();
    if base.is_empty() || state.is_empty() {
        return false;
    }
    title == format!("{base}, {state}") || title == format!("{base} ({state})")
}

/// Builds the ordered candidate sources for a place without any I/O.
pub fn candidate_sources(place: &SelectedPlace, config: &ResolverConfig) -> Vec<CandidateSource> {
    let mut sources = Vec::new();
    let mut queued = HashSet::new();
    let mut queue_title =
        |sources: &mut Vec<CandidateSource>, title: String, make: fn(String) -> CandidateSource| {
            if !title.is_empty() && queued.insert(title.clone()) {
                sources.push(make(title));
            }
        };

    let city = place.admin.city.trim();
    let name = place.name.trim();
    for bare in [city, name] {
        queue_title(&mut sources, bare.to_string(), CandidateSource::Bare);
        if let Some((prefix, _)) = bare.split_once(',') {
            queue_title(&mut sources, prefix.trim().to_string(), CandidateSource::Bare);
        }
    }

    let composite = place.composite_query();
    if !composite.is_empty() {
        sources.push(CandidateSource::NearMatch(composite.clone()));
    }

    let base = place.city_or_name();
    let state = place.admin.state.trim();
    let state_code = place.admin.state_code.trim();
    let country = place.country_hint();
    if !base.is_empty() {
        let formatted = [
            (!state.is_empty()).then(|| format!("{base}, {state}")),
            (!state.is_empty()).then(|| format!("{base} ({state})")),
            (!state_code.is_empty()).then(|| format!("{base}, {state_code}")),
            (!country.is_empty()).then(|| format!("{base}, {country}")),
            Some(format!("City of {base}")),
            Some(name.to_string()),
        ];
        for title in formatted.into_iter().flatten() {
            queue_title(&mut sources, title, CandidateSource::Formatted);
        }
    }

    let search_name = if name.is_empty() { base } else { name };
    if !search_name.is_empty() {
        for query in [
            format!("{search_name} city"),
            format!("{search_name} municipality"),
            composite,
        ] {
            if !query.is_empty() {
                sources.push(CandidateSource::Search {
                    query,
                    limit: config.search_limit,
                });
            }
        }
    }

    if let Some(at) = place.location {
        sources.push(CandidateSource::Nearby {
            at,
            radius_m: config.geo_radius_m,
            limit: config.geo_limit,
        });
    }

    sources
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept {
        badge: Option<BadgeTag>,
        distance_km: f64,
    },
    Reject(RejectReason),
}

/// Finds the single article that is the selected place itself.
pub struct PrimaryResolver<L> {
    lookup: Arc<L>,
    classifier: Arc<Classifier>,
    config: ResolverConfig,
    trace: TraceHook,
}

impl<L> PrimaryResolver<L>
where
    L: WikiLookup,
{
    pub fn new(lookup: Arc<L>, classifier: Arc<Classifier>, config: ResolverConfig) -> Self {
        Self {
            lookup,
            classifier,
            config,
            trace: tracing_hook(),
        }
    }

    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = trace;
        self
    }

    /// First accepted candidate, tagged as primary, or `None` when every source is exhausted.
    pub async fn resolve_primary(
        &self,
        place: &SelectedPlace,
    ) -> Result<Option<PoolEntry>, LookupError> {
        let mut tried = HashSet::new();

        for source in candidate_sources(place, &self.config) {
            for title in source.titles(self.lookup.as_ref()).await? {
                if !tried.insert(title.clone()) {
                    continue;
                }
                (self.trace)(&TraceEvent::CandidateTried {
                    stage: Stage::Primary,
                    source: source.label(),
                    title: title.clone(),
                });

                let Some(summary) = self.lookup.fetch_canonical_summary(&title).await? else {
                    self.reject(title, RejectReason::Missing);
                    continue;
                };
                // A redirect may land on a page another candidate already produced.
                if summary.title != title && !tried.insert(summary.title.clone()) {
                    continue;
                }

                match self.evaluate(place, &summary).await? {
                    Verdict::Accept { badge, distance_km } => {
                        let entry = PoolEntry::new(summary, badge, distance_km).primary();
                        (self.trace)(&TraceEvent::CandidateAccepted {
                            stage: Stage::Primary,
                            title: entry.title().to_string(),
                            badge,
                            distance_km: entry.distance_km,
                        });
                        return Ok(Some(entry));
                    }
                    Verdict::Reject(reason) => self.reject(summary.title, reason),
                }
            }
        }

        Ok(None)
    }

    /// The acceptance predicate for a primary candidate.
    pub async fn evaluate(
        &self,
        place: &SelectedPlace,
        summary: &ArticleSummary,
    ) -> Result<Verdict, LookupError> {
        let policy = &self.config.policy;

        if summary.is_disambiguation() {
            return Ok(Verdict::Reject(RejectReason::Disambiguation));
        }

        let badge = self.classifier.detect_badge(summary);
        if badge.is_some_and(BadgeTag::is_admin) {
            return Ok(Verdict::Reject(RejectReason::Admin));
        }
        if self.classifier.is_government_body(&summary.title) {
            return Ok(Verdict::Reject(RejectReason::GovernmentBody));
        }

        let city = place.admin.city.trim();
        if !city.is_empty() && summary.title == city {
            let distance_km = self.distance(place, summary).await?;
            return Ok(Verdict::Accept { badge, distance_km });
        }

        if is_formatted_city_title(place, &summary.title) && self.classifier.is_place_or_poi(summary) {
            let distance_km = self.distance(place, summary).await?;
            return Ok(self.within_range(badge, distance_km));
        }

        if policy.reject_sub_place_titles && is_sub_place_of(&summary.title, city, &place.name) {
            return Ok(Verdict::Reject(RejectReason::SubPlace));
        }

        let badge_ok = match badge {
            Some(BadgeTag::Place | BadgeTag::Neighborhood) => true,
            None => {
                policy.accept_place_shaped_titles
                    && self.classifier.looks_like_place_name(&summary.title)
            }
            Some(_) => false,
        };
        if !badge_ok {
            return Ok(Verdict::Reject(RejectReason::Badge(badge)));
        }

        let distance_km = self.distance(place, summary).await?;
        Ok(self.within_range(badge, distance_km))
    }

    fn within_range(&self, badge: Option<BadgeTag>, distance_km: f64) -> Verdict {
        let limit_km = self.config.policy.max_distance_km;
        if distance_km.is_finite() && distance_km > limit_km {
            return Verdict::Reject(RejectReason::TooFar {
                distance_km,
                limit_km,
            });
        }
        Verdict::Accept { badge, distance_km }
    }

    async fn distance(
        &self,
        place: &SelectedPlace,
        summary: &ArticleSummary,
    ) -> Result<f64, LookupError> {
        resolve_distance(self.lookup.as_ref(), summary, place.location).await
    }

    fn reject(&self, title: String, reason: RejectReason) {
        (self.trace)(&TraceEvent::CandidateRejected {
            stage: Stage::Primary,
            title,
            reason,
        });
    }
}
