//! Market records: one per listed underlying asset.

use std::collections::BTreeMap;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::event::EventContext;
use crate::domain::{Address, EventCounters, EventStamp, Usd};

/// Cumulative USD volume by event type. Only ever added to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTotals {
    pub deposit_usd: Usd,
    pub withdraw_usd: Usd,
    pub borrow_usd: Usd,
    pub repay_usd: Usd,
    pub liquidate_usd: Usd,
}

/// Cumulative revenue split between suppliers and the protocol.
///
/// Signed because liquidation profit folds in unclamped and a bad-debt
/// liquidation realizes a loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub supply_side_usd: Usd,
    pub protocol_side_usd: Usd,
    pub total_usd: Usd,
}

/// Current per-market annual interest rates, stored as decimal fractions
/// (the ray-scaled on-chain rate dropped to wad and normalized).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRates {
    pub lender_rate: Usd,
    pub stable_borrow_rate: Usd,
    pub variable_borrow_rate: Usd,
}

/// Daily emission of one reward token. Keyed by reward token address in the
/// market's ordered map, so snapshot diffs iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEmission {
    pub amount_per_day: U256,
    pub usd_per_day: Usd,
}

/// One lending market, created at listing and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// The underlying asset address doubles as the market id.
    pub id: Address,
    pub name: String,
    pub output_token: Address,
    pub stable_debt_token: Address,
    pub variable_debt_token: Address,
    pub created_at: EventStamp,

    pub is_active: bool,
    pub can_borrow_from: bool,
    pub can_use_as_collateral: bool,

    /// Risk parameters, as percentages.
    pub maximum_ltv: Usd,
    pub liquidation_threshold: Usd,
    pub liquidation_penalty: Usd,
    /// Fraction of interest diverted to the protocol, in [0, 1].
    pub reserve_factor: Usd,

    pub input_token_price_usd: Usd,
    pub rates: MarketRates,

    pub total_deposit_balance_usd: Usd,
    pub total_borrow_balance_usd: Usd,
    pub total_value_locked_usd: Usd,
    /// Outstanding debt in base units, split by rate mode.
    pub total_stable_debt: U256,
    pub total_variable_debt: U256,

    pub volume: VolumeTotals,
    pub revenue: RevenueTotals,
    pub counters: EventCounters,

    pub position_count: u32,
    pub open_position_count: u32,
    pub closed_position_count: u32,
    pub lending_position_count: u32,
    pub borrowing_position_count: u32,

    pub reward_emissions: BTreeMap<Address, RewardEmission>,
}

impl Market {
    /// A freshly listed market; risk parameters and flags arrive through
    /// later configuration events.
    pub fn listed(
        id: Address,
        name: String,
        output_token: Address,
        stable_debt_token: Address,
        variable_debt_token: Address,
        context: &EventContext,
    ) -> Self {
        Market {
            id,
            name,
            output_token,
            stable_debt_token,
            variable_debt_token,
            created_at: EventStamp::from_context(context),
            is_active: false,
            can_borrow_from: false,
            can_use_as_collateral: false,
            maximum_ltv: Usd::ZERO,
            liquidation_threshold: Usd::ZERO,
            liquidation_penalty: Usd::ZERO,
            reserve_factor: Usd::ZERO,
            input_token_price_usd: Usd::ZERO,
            rates: MarketRates::default(),
            total_deposit_balance_usd: Usd::ZERO,
            total_borrow_balance_usd: Usd::ZERO,
            total_value_locked_usd: Usd::ZERO,
            total_stable_debt: U256::zero(),
            total_variable_debt: U256::zero(),
            volume: VolumeTotals::default(),
            revenue: RevenueTotals::default(),
            counters: EventCounters::default(),
            position_count: 0,
            open_position_count: 0,
            closed_position_count: 0,
            lending_position_count: 0,
            borrowing_position_count: 0,
            reward_emissions: BTreeMap::new(),
        }
    }

    /// Upsert one reward token's emission figures.
    pub fn set_reward_emission(&mut self, token: Address, emission: RewardEmission) {
        self.reward_emissions.insert(token, emission);
    }
}
