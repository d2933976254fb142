//! Reserve accounting state for a rebasing receipt token.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::Address;
use crate::math;

/// Index-based accounting for one reserve.
///
/// `scaled_supply` is stored independent of the rebasing index; multiplying
/// by the current `liquidity_index` yields `total_supply`. For a
/// non-decreasing index the re-derived total never shrinks except through
/// explicit principal burns applied in scaled space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub market: Address,
    /// Ray-scaled, monotonically non-decreasing under normal delivery.
    pub liquidity_index: U256,
    /// Index-free receipt-token supply.
    pub scaled_supply: U256,
    /// `ray_mul(scaled_supply, liquidity_index)`, kept re-derived.
    pub total_supply: U256,
    /// Receipt tokens minted to the protocol treasury.
    pub accrued_to_treasury: U256,
}

impl Reserve {
    /// A freshly listed reserve: index starts at 1.0 ray, supply at zero.
    pub fn listed(market: Address) -> Self {
        Reserve {
            market,
            liquidity_index: math::ray(),
            scaled_supply: U256::zero(),
            total_supply: U256::zero(),
            accrued_to_treasury: U256::zero(),
        }
    }
}
