use crate::models::{PoolEntry, SelectedPlace};
use crate::orchestrator::PoolBuilder;
use crate::trace::TraceEvent;
use crate::traits::WikiLookup;
use crate::LookupError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks the most recent selection so stale pool builds are discarded.
#[derive(Debug, Clone, Default)]
pub struct LatestSelection {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct SelectionTicket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl SelectionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

impl LatestSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new selection, superseding every earlier ticket.
    pub fn begin(&self) -> SelectionTicket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionTicket {
            id,
            generation: Arc::clone(&self.generation),
        }
    }

    /// Builds the pool for `place`. Returns `Ok(None)` when a newer selection
    /// began while this one was in flight, whatever the build produced.
    pub async fn run<L>(
        &self,
        builder: &PoolBuilder<L>,
        place: &SelectedPlace,
    ) -> Result<Option<Vec<PoolEntry>>, LookupError>
    where
        L: WikiLookup,
    {
        let ticket = self.begin();
        let outcome = builder.build_pool(place).await;

        if !ticket.is_current() {
            builder.trace(TraceEvent::Superseded { ticket: ticket.id() });
            return Ok(None);
        }
        outcome.map(Some)
    }
}
