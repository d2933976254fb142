//! Domain types for the lending ledger.
//!
//! This module provides:
//! - USD decimal handling via the Usd wrapper
//! - Primitives: Address, TxHash, PositionSide, EventType
//! - Entity records: Reserve, Position, Account, Market, Protocol
//! - Time-bucketed snapshot records and the rolling-metric helper
//! - Stable event ordering for deterministic processing

pub mod account;
pub mod decimal;
pub mod event;
pub mod market;
pub mod ordering;
pub mod position;
pub mod primitives;
pub mod protocol;
pub mod reserve;
pub mod snapshot;

pub use account::Account;
pub use decimal::Usd;
pub use event::{EventContext, EventKind, LedgerEvent};
pub use market::{Market, RewardEmission};
pub use ordering::EventOrderingKey;
pub use position::{EventStamp, Position, PositionId};
pub use primitives::{
    Address, AddressParseError, EventCounters, EventType, InterestRateMode, PositionSide, TxHash,
};
pub use protocol::Protocol;
pub use reserve::Reserve;
pub use snapshot::{
    bucket_id, FinancialsDailySnapshot, MarketDailySnapshot, MarketHourlySnapshot, RollingMetric,
    UsageDailySnapshot, UsageHourlySnapshot, SECONDS_PER_DAY, SECONDS_PER_HOUR,
};
