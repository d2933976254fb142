use thiserror::Error;

use crate::math::MathError;

/// Fatal failures while applying an event to the ledger.
///
/// Anything recoverable (negative balance after a delta, an out-of-order
/// index observation, a missing price) is *not* represented here; those
/// branches clamp/skip/zero and leave an audit trail through `tracing`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("{kind} {id} not found; it must exist before this event")]
    MissingEntity { kind: &'static str, id: String },
    #[error("{context}: amount must be positive, got {amount}")]
    NonPositiveAmount { context: &'static str, amount: String },
}

impl LedgerError {
    pub fn missing(kind: &'static str, id: impl ToString) -> Self {
        LedgerError::MissingEntity {
            kind,
            id: id.to_string(),
        }
    }
}
