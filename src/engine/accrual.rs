//! Interest accrual for index-based rebasing reserves.

use primitive_types::U256;
use tracing::warn;

use crate::domain::Reserve;
use crate::error::LedgerError;
use crate::math;

/// Principal change accompanying an index observation, in scaled units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalChange {
    None,
    Mint(U256),
    Burn(U256),
}

/// Result of one accrual observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Interest accrued since the last observation, in base units.
    pub accrued: U256,
    /// The new index was below the stored one; revenue attribution for
    /// this event must be skipped.
    pub out_of_order: bool,
}

/// Observe a new liquidity index and fold in a principal change.
///
/// The accrued amount is computed against the *pre-mutation* scaled supply,
/// so principal entering or leaving in the same event is never counted as
/// interest. An index below the stored one means out-of-order delivery:
/// the observation is logged and revenue skipped, but the index is still
/// stored. State is never rolled back under at-least-once delivery; a
/// later re-observation converges.
pub fn accrue(
    reserve: &mut Reserve,
    new_index: U256,
    principal: PrincipalChange,
) -> Result<AccrualOutcome, LedgerError> {
    let out_of_order = new_index < reserve.liquidity_index;
    let accrued = if out_of_order {
        warn!(
            market = %reserve.market,
            stored_index = %reserve.liquidity_index,
            observed_index = %new_index,
            "liquidity index regressed; skipping revenue for this event"
        );
        U256::zero()
    } else {
        math::ray_mul(reserve.scaled_supply, new_index)?
            - math::ray_mul(reserve.scaled_supply, reserve.liquidity_index)?
    };

    match principal {
        PrincipalChange::None => {}
        PrincipalChange::Mint(amount) => {
            reserve.scaled_supply = reserve
                .scaled_supply
                .checked_add(amount)
                .ok_or(crate::math::MathError::Overflow("scaled_supply mint"))?;
        }
        PrincipalChange::Burn(amount) => {
            if amount > reserve.scaled_supply {
                warn!(
                    market = %reserve.market,
                    scaled_supply = %reserve.scaled_supply,
                    burn = %amount,
                    "burn exceeds scaled supply; clamping to zero"
                );
                reserve.scaled_supply = U256::zero();
            } else {
                reserve.scaled_supply -= amount;
            }
        }
    }

    reserve.liquidity_index = new_index;
    reserve.total_supply = math::ray_mul(reserve.scaled_supply, new_index)?;

    Ok(AccrualOutcome {
        accrued,
        out_of_order,
    })
}
