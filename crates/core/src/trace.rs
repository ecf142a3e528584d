use crate::badge::BadgeTag;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Primary,
    Nearby,
    Keyword,
    AdminFallback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Primary => "primary",
            Stage::Nearby => "nearby",
            Stage::Keyword => "keyword",
            Stage::AdminFallback => "admin-fallback",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    Missing,
    Disambiguation,
    Admin,
    GovernmentBody,
    SubPlace,
    Badge(Option<BadgeTag>),
    NotPlaceOrPoi,
    TooFar { distance_km: f64, limit_km: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Missing => f.write_str("no such page"),
            RejectReason::Disambiguation => f.write_str("disambiguation page"),
            RejectReason::Admin => f.write_str("administrative area"),
            RejectReason::GovernmentBody => f.write_str("government body"),
            RejectReason::SubPlace => f.write_str("sub-place of the city"),
            RejectReason::Badge(Some(badge)) => write!(f, "badge {badge} not accepted"),
            RejectReason::Badge(None) => f.write_str("unclassified"),
            RejectReason::NotPlaceOrPoi => f.write_str("not a place or point of interest"),
            RejectReason::TooFar {
                distance_km,
                limit_km,
            } => write!(f, "{distance_km:.1} km exceeds {limit_km:.0} km"),
        }
    }
}

/// Checkpoints reported while resolving a place.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    CandidateTried {
        stage: Stage,
        source: &'static str,
        title: String,
    },
    CandidateRejected {
        stage: Stage,
        title: String,
        reason: RejectReason,
    },
    CandidateAccepted {
        stage: Stage,
        title: String,
        badge: Option<BadgeTag>,
        distance_km: Option<f64>,
    },
    StageFinished {
        stage: Stage,
        added: usize,
        pool_len: usize,
    },
    Superseded {
        ticket: u64,
    },
}

pub type TraceHook = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// Forwards every event to `tracing` at debug level.
pub fn tracing_hook() -> TraceHook {
    Arc::new(|event: &TraceEvent| match event {
        TraceEvent::CandidateTried {
            stage,
            source,
            title,
        } => tracing::debug!(%stage, source, title = %title, "candidate tried"),
        TraceEvent::CandidateRejected {
            stage,
            title,
            reason,
        } => tracing::debug!(%stage, title = %title, %reason, "candidate rejected"),
        TraceEvent::CandidateAccepted {
            stage,
            title,
            badge,
            distance_km,
        } => tracing::debug!(
            %stage,
            title = %title,
            badge = ?badge,
            distance_km = ?distance_km,
            "candidate accepted"
        ),
        TraceEvent::StageFinished {
            stage,
            added,
            pool_len,
        } => tracing::debug!(%stage, added, pool_len, "stage finished"),
        TraceEvent::Superseded { ticket } => {
            tracing::debug!(ticket, "selection superseded by a newer one")
        }
    })
}

pub fn silent_hook() -> TraceHook {
    Arc::new(|_: &TraceEvent| {})
}
