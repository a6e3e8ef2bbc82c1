//! Record identifiers.

use chrono::Utc;

pub type RecordId = u64;

/// Hands out strictly increasing ids.
///
/// Ids track the wall clock in milliseconds so they stay comparable with ids
/// already stored, but two ids minted in the same tick still differ.
#[derive(Debug, Clone)]
pub struct IdSource {
    last: RecordId,
    clock: fn() -> RecordId,
}

fn wall_clock_millis() -> RecordId {
    Utc::now().timestamp_millis().max(0) as RecordId
}

impl IdSource {
    /// Seeds the source past every id in `existing`.
    pub fn seeded(existing: impl IntoIterator<Item = RecordId>) -> Self {
        Self::with_clock(existing, wall_clock_millis)
    }

    pub fn with_clock(existing: impl IntoIterator<Item = RecordId>, clock: fn() -> RecordId) -> Self {
        let last = existing.into_iter().max().unwrap_or(0);
        Self { last, clock }
    }

    pub fn next_id(&mut self) -> RecordId {
        let id = (self.clock)().max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
