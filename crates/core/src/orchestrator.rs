use crate::classifier::{Classifier, ClassifierConfig};
use crate::geo::resolve_distance;
use crate::models::{LatLng, Pool, PoolEntry, SelectedPlace, DEFAULT_POOL_CAP};
use crate::resolver::{PrimaryResolver, ResolverConfig};
use crate::scoring::{rank_by_score, ScoredCandidate};
use crate::trace::{tracing_hook, RejectReason, Stage, TraceEvent, TraceHook};
use crate::traits::WikiLookup;
use crate::LookupError;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_KEYWORD_TOPICS: [&str; 14] = [
    "museum",
    "park",
    "historic district",
    "university",
    "airport",
    "stadium",
    "lake",
    "dam",
    "waterfall",
    "bridge",
    "mill",
    "theater",
    "zoo",
    "trail",
];

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_entries: usize,
    pub nearby_radius_km: f64,
    pub nearby_raw_limit: usize,
    pub nearby_scored_cap: usize,
    pub keyword_radius_km: f64,
    pub keyword_limit: usize,
    pub keyword_topics: Vec<String>,
    /// Skip the keyword stage once the pool is already full.
    pub gate_keyword_fallback: bool,
    /// Admin enclosures are added only while the pool is smaller than this.
    pub admin_fallback_threshold: usize,
    /// Remote lookups in flight at once within a batch.
    pub concurrency: usize,
    pub resolver: ResolverConfig,
    pub classifier: ClassifierConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_POOL_CAP,
            nearby_radius_km: 35.0,
            nearby_raw_limit: 100,
            nearby_scored_cap: 60,
            keyword_radius_km: 60.0,
            keyword_limit: 6,
            keyword_topics: DEFAULT_KEYWORD_TOPICS
                .iter()
                .map(|topic| topic.to_string())
                .collect(),
            gate_keyword_fallback: true,
            admin_fallback_threshold: 2,
            concurrency: 4,
            resolver: ResolverConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Builds the ranked article pool for one selected place.
pub struct PoolBuilder<L> {
    lookup: Arc<L>,
    classifier: Arc<Classifier>,
    resolver: PrimaryResolver<L>,
    config: PoolConfig,
    trace: TraceHook,
}

impl<L> PoolBuilder<L>
where
    L: WikiLookup,
{
    pub fn new(lookup: L) -> Result<Self, LookupError> {
        Self::with_config(lookup, PoolConfig::default())
    }

    pub fn with_config(lookup: L, config: PoolConfig) -> Result<Self, LookupError> {
        let lookup = Arc::new(lookup);
        let classifier = Arc::new(Classifier::new(config.classifier)?);
        let resolver = PrimaryResolver::new(
            Arc::clone(&lookup),
            Arc::clone(&classifier),
            config.resolver,
        );

        Ok(Self {
            lookup,
            classifier,
            resolver,
            config,
            trace: tracing_hook(),
        })
    }

    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.resolver = self.resolver.with_trace(Arc::clone(&trace));
        self.trace = trace;
        self
    }

    pub fn resolver(&self) -> &PrimaryResolver<L> {
        &self.resolver
    }

    pub fn lookup(&self) -> &L {
        self.lookup.as_ref()
    }

    pub(crate) fn trace(&self, event: TraceEvent) {
        (self.trace)(&event);
    }

    /// Primary first, then ranked nearby POIs, keyword matches and, for
    /// sparse pools, the enclosing county/state/country.
    pub async fn build_pool(&self, place: &SelectedPlace) -> Result<Vec<PoolEntry>, LookupError> {
        let mut pool = Pool::with_cap(self.config.max_entries);
        let mut rejected = HashSet::new();

        let before = pool.len();
        if let Some(primary) = self.resolver.resolve_primary(place).await? {
            pool.push(primary);
        }
        self.stage_finished(Stage::Primary, before, &pool);

        let before = pool.len();
        self.add_nearby(place, &mut pool, &mut rejected).await?;
        self.stage_finished(Stage::Nearby, before, &pool);

        if !(self.config.gate_keyword_fallback && pool.is_full()) {
            let before = pool.len();
            self.add_keyword_matches(place, &mut pool, &mut rejected).await?;
            self.stage_finished(Stage::Keyword, before, &pool);
        }

        if pool.len() < self.config.admin_fallback_threshold {
            let before = pool.len();
            self.add_admin_enclosures(place, &mut pool).await?;
            self.stage_finished(Stage::AdminFallback, before, &pool);
        }

        Ok(pool.into_ranked())
    }

    async fn add_nearby(
        &self,
        place: &SelectedPlace,
        pool: &mut Pool,
        rejected: &mut HashSet<String>,
    ) -> Result<(), LookupError> {
        let Some(origin) = place.location else {
            return Ok(());
        };

        let radius_m = (self.config.nearby_radius_km * 1_000.0).round() as u32;
        let hits = self
            .lookup
            .geo_search(origin, radius_m, self.config.nearby_raw_limit)
            .await?;
        let titles = fresh_titles(hits.into_iter().map(|hit| hit.title), pool, rejected);

        let mut scored = Vec::new();
        {
            let mut classified = stream::iter(titles)
                .map(|title| self.classify(Stage::Nearby, title, origin, self.config.nearby_radius_km))
                .buffered(self.config.concurrency.max(1));

            while let Some(outcome) = classified.next().await {
                match outcome? {
                    Ok(entry) => scored.push(ScoredCandidate::new(entry)),
                    Err(title) => {
                        rejected.insert(title);
                    }
                }
                if scored.len() >= self.config.nearby_scored_cap {
                    break;
                }
            }
        }

        for candidate in rank_by_score(scored) {
            if pool.is_full() {
                break;
            }
            pool.push(candidate.entry);
        }
        Ok(())
    }

    async fn add_keyword_matches(
        &self,
        place: &SelectedPlace,
        pool: &mut Pool,
        rejected: &mut HashSet<String>,
    ) -> Result<(), LookupError> {
        let composite = place.composite_query();
        if composite.is_empty() {
            return Ok(());
        }
        let Some(origin) = place.location else {
            // Every hit would fail the geofence.
            return Ok(());
        };

        for topic in &self.config.keyword_topics {
            if self.config.gate_keyword_fallback && pool.is_full() {
                break;
            }

            let query = format!("{composite} {topic}");
            let hits = self
                .lookup
                .search_titles(&query, self.config.keyword_limit)
                .await?;
            let titles = fresh_titles(hits, pool, rejected);

            let outcomes = stream::iter(titles)
                .map(|title| {
                    self.classify(Stage::Keyword, title, origin, self.config.keyword_radius_km)
                })
                .buffered(self.config.concurrency.max(1))
                .collect::<Vec<_>>()
                .await;

            for outcome in outcomes {
                match outcome? {
                    Ok(entry) => {
                        pool.push(entry);
                    }
                    Err(title) => {
                        rejected.insert(title);
                    }
                }
            }
        }
        Ok(())
    }

    async fn add_admin_enclosures(
        &self,
        place: &SelectedPlace,
        pool: &mut Pool,
    ) -> Result<(), LookupError> {
        let county = place.admin.county.trim();
        let state = place.admin.state.trim();
        let country = place.country_hint();

        let mut titles = Vec::new();
        if !county.is_empty() && !state.is_empty() {
            titles.push(format!("{county}, {state}"));
        }
        titles.push(state.to_string());
        titles.push(country);

        for title in titles.into_iter().filter(|title| !title.is_empty()) {
            if pool.is_full() {
                break;
            }
            self.trace(TraceEvent::CandidateTried {
                stage: Stage::AdminFallback,
                source: "admin",
                title: title.clone(),
            });

            let Some(summary) = self.lookup.fetch_canonical_summary(&title).await? else {
                self.reject(Stage::AdminFallback, title, RejectReason::Missing);
                continue;
            };

            let badge = self.classifier.detect_badge(&summary);
            if !badge.is_some_and(|badge| badge.is_admin()) {
                self.reject(Stage::AdminFallback, summary.title, RejectReason::Badge(badge));
                continue;
            }

            let distance_km = resolve_distance(self.lookup.as_ref(), &summary, place.location).await?;
            let entry = PoolEntry::new(summary, badge, distance_km);
            self.accept(Stage::AdminFallback, &entry);
            pool.push(entry);
        }
        Ok(())
    }

    /// `Ok(Ok(entry))` for an accepted POI, `Ok(Err(title))` for a rejected one.
    async fn classify(
        &self,
        stage: Stage,
        title: String,
        origin: LatLng,
        geofence_km: f64,
    ) -> Result<Result<PoolEntry, String>, LookupError> {
        self.trace(TraceEvent::CandidateTried {
            stage,
            source: "poi",
            title: title.clone(),
        });

        let Some(summary) = self.lookup.fetch_canonical_summary(&title).await? else {
            self.reject(stage, title.clone(), RejectReason::Missing);
            return Ok(Err(title));
        };

        if !self.classifier.is_place_or_poi(&summary) {
            self.reject(stage, summary.title, RejectReason::NotPlaceOrPoi);
            return Ok(Err(title));
        }
        let badge = self.classifier.detect_badge(&summary);
        if badge.is_some_and(|badge| badge.is_admin()) {
            self.reject(stage, summary.title, RejectReason::Admin);
            return Ok(Err(title));
        }

        let distance_km = resolve_distance(self.lookup.as_ref(), &summary, Some(origin)).await?;
        if !distance_km.is_finite() || distance_km > geofence_km {
            self.reject(
                stage,
                summary.title,
                RejectReason::TooFar {
                    distance_km,
                    limit_km: geofence_km,
                },
            );
            return Ok(Err(title));
        }

        let entry = PoolEntry::new(summary, badge, distance_km);
        self.accept(stage, &entry);
        Ok(Ok(entry))
    }

    fn accept(&self, stage: Stage, entry: &PoolEntry) {
        self.trace(TraceEvent::CandidateAccepted {
            stage,
            title: entry.title().to_string(),
            badge: entry.badge,
            distance_km: entry.distance_km,
        });
    }

    fn reject(&self, stage: Stage, title: String, reason: RejectReason) {
        self.trace(TraceEvent::CandidateRejected {
            stage,
            title,
            reason,
        });
    }

    fn stage_finished(&self, stage: Stage, before: usize, pool: &Pool) {
        self.trace(TraceEvent::StageFinished {
            stage,
            added: pool.len() - before,
            pool_len: pool.len(),
        });
    }
}

/// Drops titles already in the pool, already rejected, or repeated in `titles`.
fn fresh_titles(
    titles: impl IntoIterator<Item = String>,
    pool: &Pool,
    rejected: &HashSet<String>,
) -> Vec<String> {
    let mut queued = HashSet::new();
    titles
        .into_iter()
        .filter(|title| !pool.has_seen(title) && !rejected.contains(title))
        .filter(|title| queued.insert(title.clone()))
        .collect()
}
