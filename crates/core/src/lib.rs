pub mod badge;
pub mod classifier;
pub mod error;
pub mod geo;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod scoring;
pub mod session;
pub mod stores;
pub mod trace;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use badge::BadgeTag;
pub use classifier::{is_sub_place_of, Classifier, ClassifierConfig};
pub use error::{LookupError, Result};
pub use geo::{distance_km, haversine_km, resolve_distance};
pub use models::{
    AdminHierarchy, ArticleSummary, GeoHit, LatLng, Pool, PoolEntry, SelectedPlace,
    DEFAULT_POOL_CAP,
};
pub use orchestrator::{PoolBuilder, PoolConfig, DEFAULT_KEYWORD_TOPICS};
pub use resolver::{
    candidate_sources, AcceptancePolicy, CandidateSource, PrimaryResolver, ResolverConfig, Verdict,
};
pub use scoring::{rank_by_score, score_item, ScoredCandidate, PROXIMITY_CAP_KM};
pub use session::{LatestSelection, SelectionTicket};
pub use stores::{WikipediaClient, WikipediaConfig};
pub use trace::{silent_hook, tracing_hook, RejectReason, Stage, TraceEvent, TraceHook};
pub use traits::WikiLookup;
