//! The protocol-level aggregate record.

use serde::{Deserialize, Serialize};

use crate::domain::market::{RevenueTotals, VolumeTotals};
use crate::domain::{Address, EventCounters, Usd};

/// Protocol-wide totals.
///
/// Constructed exactly once when the ledger is built and owned by the store
/// from then on; components receive it by reference instead of re-deriving
/// it from a well-known id on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: Address,
    pub name: String,
    pub slug: String,
    pub network: String,

    pub market_ids: Vec<Address>,
    pub total_pool_count: u32,
    pub cumulative_unique_accounts: u32,

    pub total_value_locked_usd: Usd,
    pub total_deposit_balance_usd: Usd,
    pub total_borrow_balance_usd: Usd,

    pub volume: VolumeTotals,
    pub revenue: RevenueTotals,
    pub counters: EventCounters,

    pub open_position_count: u32,
    pub cumulative_position_count: u32,
}

impl Protocol {
    pub fn new(id: Address, name: String, slug: String, network: String) -> Self {
        Protocol {
            id,
            name,
            slug,
            network,
            market_ids: Vec::new(),
            total_pool_count: 0,
            cumulative_unique_accounts: 0,
            total_value_locked_usd: Usd::ZERO,
            total_deposit_balance_usd: Usd::ZERO,
            total_borrow_balance_usd: Usd::ZERO,
            volume: VolumeTotals::default(),
            revenue: RevenueTotals::default(),
            counters: EventCounters::default(),
            open_position_count: 0,
            cumulative_position_count: 0,
        }
    }
}
