//! Stable event ordering for deterministic processing.

use crate::domain::event::{EventContext, LedgerEvent};

/// Ordering key for ledger events.
///
/// Events are causally ordered by block height, then by log index within a
/// block. The store remembers the last applied key so replays of an
/// already-applied event are recognized and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventOrderingKey {
    pub block_number: u64,
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn from_context(context: &EventContext) -> Self {
        EventOrderingKey {
            block_number: context.block_number,
            log_index: context.log_index,
        }
    }

    /// Returns true if `a` must be applied before `b`.
    pub fn should_come_before(a: &EventContext, b: &EventContext) -> bool {
        Self::from_context(a) < Self::from_context(b)
    }
}

/// Sort a batch of events into causal order.
pub fn sort_events_deterministic(events: &mut [LedgerEvent]) {
    events.sort_by_key(|e| EventOrderingKey::from_context(&e.context));
}
