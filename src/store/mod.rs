//! In-memory entity store.
//!
//! Satisfies the load-by-id / upsert contract the core requires from its
//! persistence collaborator. Processing is single-threaded and sequential,
//! so plain maps mutated in place are sufficient; a durable backend can
//! stand in behind the same surface, provided it applies each event's
//! writes as one atomic unit.

use std::collections::{HashMap, HashSet};

use crate::domain::{
    Account, Address, EventOrderingKey, FinancialsDailySnapshot, Market, MarketDailySnapshot,
    MarketHourlySnapshot, Position, PositionId, Protocol, Reserve, UsageDailySnapshot,
    UsageHourlySnapshot,
};
use crate::error::LedgerError;

/// Granularity of an account-activity mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityPeriod {
    Daily,
    Hourly,
}

/// All entity state owned by one ledger instance.
pub struct LedgerStore {
    pub(crate) protocol: Protocol,
    pub(crate) markets: HashMap<Address, Market>,
    pub(crate) reserves: HashMap<Address, Reserve>,
    pub(crate) accounts: HashMap<Address, Account>,
    pub(crate) positions: HashMap<PositionId, Position>,

    pub(crate) market_daily: HashMap<(Address, i64), MarketDailySnapshot>,
    pub(crate) market_hourly: HashMap<(Address, i64), MarketHourlySnapshot>,
    pub(crate) financials_daily: HashMap<i64, FinancialsDailySnapshot>,
    pub(crate) usage_daily: HashMap<i64, UsageDailySnapshot>,
    pub(crate) usage_hourly: HashMap<i64, UsageHourlySnapshot>,

    // Most recent bucket per series, for diff-against-previous rolls.
    pub(crate) latest_market_daily: HashMap<Address, i64>,
    pub(crate) latest_market_hourly: HashMap<Address, i64>,
    pub(crate) latest_financials_day: Option<i64>,

    // Dedup marks for active-account tallies.
    pub(crate) activity_marks: HashSet<(ActivityPeriod, i64, Address)>,

    pub(crate) last_applied: Option<EventOrderingKey>,
}

impl LedgerStore {
    pub fn new(protocol: Protocol) -> Self {
        LedgerStore {
            protocol,
            markets: HashMap::new(),
            reserves: HashMap::new(),
            accounts: HashMap::new(),
            positions: HashMap::new(),
            market_daily: HashMap::new(),
            market_hourly: HashMap::new(),
            financials_daily: HashMap::new(),
            usage_daily: HashMap::new(),
            usage_hourly: HashMap::new(),
            latest_market_daily: HashMap::new(),
            latest_market_hourly: HashMap::new(),
            latest_financials_day: None,
            activity_marks: HashSet::new(),
            last_applied: None,
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn market(&self, id: &Address) -> Option<&Market> {
        self.markets.get(id)
    }

    /// A market that must already exist for the current event to proceed.
    pub(crate) fn expect_market_mut(&mut self, id: &Address) -> Result<&mut Market, LedgerError> {
        self.markets
            .get_mut(id)
            .ok_or_else(|| LedgerError::missing("market", id))
    }

    pub fn reserve(&self, market: &Address) -> Option<&Reserve> {
        self.reserves.get(market)
    }

    pub(crate) fn expect_reserve_mut(
        &mut self,
        market: &Address,
    ) -> Result<&mut Reserve, LedgerError> {
        self.reserves
            .get_mut(market)
            .ok_or_else(|| LedgerError::missing("reserve", market))
    }

    pub fn account(&self, id: &Address) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn position(&self, id: &PositionId) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn market_daily_snapshot(&self, market: &Address, day: i64) -> Option<&MarketDailySnapshot> {
        self.market_daily.get(&(market.clone(), day))
    }

    pub fn market_hourly_snapshot(
        &self,
        market: &Address,
        hour: i64,
    ) -> Option<&MarketHourlySnapshot> {
        self.market_hourly.get(&(market.clone(), hour))
    }

    pub fn financials_daily_snapshot(&self, day: i64) -> Option<&FinancialsDailySnapshot> {
        self.financials_daily.get(&day)
    }

    pub fn usage_daily_snapshot(&self, day: i64) -> Option<&UsageDailySnapshot> {
        self.usage_daily.get(&day)
    }

    pub fn usage_hourly_snapshot(&self, hour: i64) -> Option<&UsageHourlySnapshot> {
        self.usage_hourly.get(&hour)
    }

    /// The ordering key of the last event applied, if any.
    pub fn last_applied(&self) -> Option<EventOrderingKey> {
        self.last_applied
    }

    /// Record an account as active in a bucket. Returns true the first time
    /// the (period, bucket, account) triple is seen.
    pub(crate) fn mark_active(
        &mut self,
        period: ActivityPeriod,
        bucket: i64,
        account: &Address,
    ) -> bool {
        self.activity_marks
            .insert((period, bucket, account.clone()))
    }
}
