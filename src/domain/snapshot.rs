//! Time-bucketed snapshot records.
//!
//! Source entities only carry cumulative totals; snapshots pin those totals
//! to hourly/daily buckets and expose the delta accrued strictly within the
//! bucket. The delta is derived by diffing against the previous bucket's
//! cumulative value rather than by resetting counters at period boundaries,
//! since a boundary is only recognizable retroactively.

use serde::{Deserialize, Serialize};

use crate::domain::market::MarketRates;
use crate::domain::{Address, Usd};

pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The bucket index a timestamp falls into.
pub fn bucket_id(timestamp: i64, bucket_seconds: i64) -> i64 {
    timestamp / bucket_seconds
}

/// One tracked metric inside a snapshot: the cumulative value as of this
/// bucket plus the baseline it started from (the previous bucket's
/// cumulative, zero for the first bucket ever).
///
/// Deltas telescope: summed across all buckets they equal the final
/// cumulative value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingMetric {
    baseline: Usd,
    pub cumulative: Usd,
}

impl RollingMetric {
    /// Open a new bucket's metric from the previous bucket's cumulative.
    pub fn rolled_from(previous_cumulative: Usd) -> Self {
        RollingMetric {
            baseline: previous_cumulative,
            cumulative: previous_cumulative,
        }
    }

    /// Mirror the source entity's cumulative value after an event applied.
    pub fn track(&mut self, cumulative: Usd) {
        self.cumulative = cumulative;
    }

    /// The amount accrued strictly within this bucket.
    pub fn delta(&self) -> Usd {
        self.cumulative - self.baseline
    }
}

/// USD metrics shared by the market and financials snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    pub deposit: RollingMetric,
    pub withdraw: RollingMetric,
    pub borrow: RollingMetric,
    pub repay: RollingMetric,
    pub liquidate: RollingMetric,
    pub supply_side_revenue: RollingMetric,
    pub protocol_side_revenue: RollingMetric,
    pub total_revenue: RollingMetric,
}

impl SnapshotMetrics {
    /// Open a new bucket's metrics, inheriting every cumulative value from
    /// the previous bucket (or zeros when there is none).
    pub fn rolled_from(previous: Option<&SnapshotMetrics>) -> Self {
        match previous {
            Some(prev) => SnapshotMetrics {
                deposit: RollingMetric::rolled_from(prev.deposit.cumulative),
                withdraw: RollingMetric::rolled_from(prev.withdraw.cumulative),
                borrow: RollingMetric::rolled_from(prev.borrow.cumulative),
                repay: RollingMetric::rolled_from(prev.repay.cumulative),
                liquidate: RollingMetric::rolled_from(prev.liquidate.cumulative),
                supply_side_revenue: RollingMetric::rolled_from(
                    prev.supply_side_revenue.cumulative,
                ),
                protocol_side_revenue: RollingMetric::rolled_from(
                    prev.protocol_side_revenue.cumulative,
                ),
                total_revenue: RollingMetric::rolled_from(prev.total_revenue.cumulative),
            },
            None => SnapshotMetrics::default(),
        }
    }
}

/// Daily snapshot of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDailySnapshot {
    pub market: Address,
    pub day: i64,
    pub block_number: u64,
    pub timestamp: i64,
    pub metrics: SnapshotMetrics,
    pub total_value_locked_usd: Usd,
    pub total_deposit_balance_usd: Usd,
    pub total_borrow_balance_usd: Usd,
    pub rates: MarketRates,
}

/// Hourly snapshot of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHourlySnapshot {
    pub market: Address,
    pub hour: i64,
    pub block_number: u64,
    pub timestamp: i64,
    pub metrics: SnapshotMetrics,
    pub total_value_locked_usd: Usd,
    pub total_deposit_balance_usd: Usd,
    pub total_borrow_balance_usd: Usd,
    pub rates: MarketRates,
}

/// Daily protocol-wide financials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialsDailySnapshot {
    pub day: i64,
    pub block_number: u64,
    pub timestamp: i64,
    pub metrics: SnapshotMetrics,
    pub total_value_locked_usd: Usd,
    pub total_deposit_balance_usd: Usd,
    pub total_borrow_balance_usd: Usd,
}

/// Per-event-type transaction tallies within one usage bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub transaction_count: u32,
    pub deposit_count: u32,
    pub withdraw_count: u32,
    pub borrow_count: u32,
    pub repay_count: u32,
    pub liquidation_count: u32,
}

/// Daily account-activity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDailySnapshot {
    pub day: i64,
    pub block_number: u64,
    pub timestamp: i64,
    pub active_accounts: u32,
    pub cumulative_unique_accounts: u32,
    pub total_pool_count: u32,
    pub counts: UsageCounts,
}

/// Hourly account-activity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageHourlySnapshot {
    pub hour: i64,
    pub block_number: u64,
    pub timestamp: i64,
    pub active_accounts: u32,
    pub cumulative_unique_accounts: u32,
    pub counts: UsageCounts,
}
