//! Pure computation engines for the deterministic ledger logic.

pub mod accrual;
pub mod positions;
pub mod revenue;
pub mod snapshots;

pub use accrual::{accrue, AccrualOutcome, PrincipalChange};
pub use positions::{
    apply_balance_delta, find_open_position, get_or_create_account, open_or_get_position,
    record_event, set_collateral, BalanceDelta,
};
pub use revenue::{
    book_protocol_side_revenue, book_supply_side_revenue, split_by_reserve_factor,
    RevenueAttributor,
};
pub use snapshots::{record_usage, upsert_financials_snapshot, upsert_market_snapshots};
