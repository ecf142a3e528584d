use crate::badge::BadgeTag;
use crate::models::PoolEntry;

/// Distance (km) at which the proximity bonus reaches zero.
pub const PROXIMITY_CAP_KM: f64 = 6.0;

/// `base(badge) + max(0, cap - distance)`; unbadged items weigh like `Place`.
pub fn score_item(badge: Option<BadgeTag>, distance_km: f64) -> f64 {
    let base = badge.unwrap_or(BadgeTag::Place).base_weight();
    base + (PROXIMITY_CAP_KM - distance_km).max(0.0)
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub entry: PoolEntry,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(entry: PoolEntry) -> Self {
        let distance = entry.distance_km.unwrap_or(f64::INFINITY);
        let score = score_item(entry.badge, distance);
        Self { entry, score }
    }
}

/// Highest score first; equal scores keep discovery order.
pub fn rank_by_score(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|left, right| right.score.total_cmp(&left.score));
    candidates
}
