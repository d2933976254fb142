//! Position records: one account's stake in one market on one side.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::event::EventContext;
use crate::domain::{Address, EventCounters, PositionSide, TxHash};

/// Identity of a position.
///
/// `index` is the owning account's lifetime position count at open time, so
/// a re-opened (account, market, side) tuple gets a fresh id and the closed
/// record stays untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId {
    pub account: Address,
    pub market: Address,
    pub side: PositionSide,
    pub index: u32,
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.account, self.market, self.side, self.index
        )
    }
}

impl PositionId {
    /// True if this id belongs to the given (account, market, side) tuple,
    /// regardless of its numeric suffix.
    pub fn matches(&self, account: &Address, market: &Address, side: PositionSide) -> bool {
        self.side == side && &self.account == account && &self.market == market
    }
}

/// Where in the chain a position opened or closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStamp {
    pub block_number: u64,
    pub timestamp: i64,
    pub tx_hash: TxHash,
}

impl EventStamp {
    pub fn from_context(context: &EventContext) -> Self {
        EventStamp {
            block_number: context.block_number,
            timestamp: context.timestamp,
            tx_hash: context.tx_hash.clone(),
        }
    }
}

/// An open or closed position.
///
/// Borrower positions split their balance into stable and variable debt
/// sub-accumulators; `balance` is always their sum. Lender positions carry
/// the `is_collateral` flag instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub balance: U256,
    pub stable_debt: U256,
    pub variable_debt: U256,
    pub is_collateral: bool,
    pub counters: EventCounters,
    pub opened_at: EventStamp,
    pub closed_at: Option<EventStamp>,
}

impl Position {
    /// A zero-balance position opened by this event.
    pub fn opened(id: PositionId, context: &EventContext) -> Self {
        Position {
            // Lender balances count as collateral until toggled off.
            is_collateral: id.side == PositionSide::Lender,
            id,
            balance: U256::zero(),
            stable_debt: U256::zero(),
            variable_debt: U256::zero(),
            counters: EventCounters::default(),
            opened_at: EventStamp::from_context(context),
            closed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    pub fn side(&self) -> PositionSide {
        self.id.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EventContext {
        EventContext {
            block_number: 42,
            timestamp: 1_700_000_000,
            tx_hash: TxHash::new("0xdead"),
            log_index: 1,
            nonce: 7,
        }
    }

    fn acct() -> Address {
        Address::unchecked("0x1111111111111111111111111111111111111111")
    }

    fn mkt() -> Address {
        Address::unchecked("0x2222222222222222222222222222222222222222")
    }

    #[test]
    fn id_matches_ignores_suffix() {
        let id = PositionId {
            account: acct(),
            market: mkt(),
            side: PositionSide::Lender,
            index: 3,
        };
        assert!(id.matches(&acct(), &mkt(), PositionSide::Lender));
        assert!(!id.matches(&acct(), &mkt(), PositionSide::Borrower));
    }

    #[test]
    fn lender_opens_as_collateral_borrower_does_not() {
        let lender = Position::opened(
            PositionId {
                account: acct(),
                market: mkt(),
                side: PositionSide::Lender,
                index: 0,
            },
            &ctx(),
        );
        assert!(lender.is_collateral);
        assert!(lender.is_open());

        let borrower = Position::opened(
            PositionId {
                account: acct(),
                market: mkt(),
                side: PositionSide::Borrower,
                index: 0,
            },
            &ctx(),
        );
        assert!(!borrower.is_collateral);
        assert!(borrower.stable_debt.is_zero());
        assert!(borrower.variable_debt.is_zero());
    }

    #[test]
    fn id_display_is_stable() {
        let id = PositionId {
            account: acct(),
            market: mkt(),
            side: PositionSide::Borrower,
            index: 2,
        };
        assert_eq!(
            id.to_string(),
            format!("{}-{}-BORROWER-2", acct(), mkt())
        );
    }
}
