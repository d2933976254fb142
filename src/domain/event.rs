//! Decoded ledger events as delivered by the ingestion collaborator.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::{Address, InterestRateMode, TxHash, Usd};

/// Chain coordinates shared by every event.
///
/// The reader guarantees `(block_number, log_index)` is monotonically
/// non-decreasing across deliveries; everything downstream assumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub block_number: u64,
    /// Block timestamp in seconds since the Unix epoch.
    pub timestamp: i64,
    pub tx_hash: TxHash,
    pub log_index: u32,
    pub nonce: u64,
}

/// One decoded on-chain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub context: EventContext,
    pub kind: EventKind,
}

/// The event-specific payload.
///
/// Markets are identified by their underlying asset address throughout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A reserve was listed: the market, reserve, and token records begin
    /// here.
    MarketListed {
        market: Address,
        output_token: Address,
        stable_debt_token: Address,
        variable_debt_token: Address,
    },
    /// Risk parameters changed. All three figures arrive in basis points
    /// (the liquidation bonus as a 5-digit figure over 10000).
    CollateralConfigChanged {
        market: Address,
        maximum_ltv_bps: U256,
        liquidation_threshold_bps: U256,
        liquidation_bonus_bps: U256,
    },
    ReserveFactorChanged {
        market: Address,
        factor_bps: U256,
    },
    ReserveActivated {
        market: Address,
    },
    ReserveDeactivated {
        market: Address,
    },
    BorrowingEnabled {
        market: Address,
    },
    BorrowingDisabled {
        market: Address,
    },
    /// An account toggled a lender balance as collateral.
    CollateralToggled {
        market: Address,
        account: Address,
        enabled: bool,
    },
    /// The pool recomputed a reserve's rates and liquidity index. Rates are
    /// ray-scaled annual figures.
    ReserveDataUpdated {
        market: Address,
        liquidity_index: U256,
        liquidity_rate: U256,
        stable_borrow_rate: U256,
        variable_borrow_rate: U256,
    },
    Deposit {
        market: Address,
        account: Address,
        amount: U256,
    },
    Withdraw {
        market: Address,
        account: Address,
        amount: U256,
    },
    Borrow {
        market: Address,
        account: Address,
        amount: U256,
        rate_mode: InterestRateMode,
    },
    Repay {
        market: Address,
        account: Address,
        amount: U256,
        rate_mode: InterestRateMode,
    },
    /// A liquidation seizing collateral from `liquidatee` in
    /// `collateral_market` to cover `debt_covered` in `debt_market`.
    Liquidate {
        collateral_market: Address,
        debt_market: Address,
        liquidatee: Address,
        liquidator: Address,
        amount_seized: U256,
        debt_covered: U256,
    },
    /// A receipt-token transfer between accounts. Depending on protocol
    /// version the amount is scaled or unscaled; see
    /// `ProtocolConfig::transfer_amounts_scaled_at`.
    Transfer {
        market: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Reward emission vector update for one reward token.
    RewardEmissionsUpdated {
        market: Address,
        reward_token: Address,
        amount_per_day: U256,
        usd_per_day: Usd,
    },
}

impl LedgerEvent {
    pub fn new(context: EventContext, kind: EventKind) -> Self {
        LedgerEvent { context, kind }
    }
}
