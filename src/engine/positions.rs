//! The position ledger: single source of truth for open positions and
//! their balances.
//!
//! Lifecycle is OPEN → CLOSED with no re-entry. A closed position is
//! immutable history; the next transaction on the same (account, market,
//! side) tuple allocates a fresh id suffix from the account's lifetime
//! position count.

use primitive_types::U256;
use tracing::warn;

use crate::domain::{
    Account, Address, EventContext, EventStamp, EventType, InterestRateMode, Position, PositionId,
    PositionSide,
};
use crate::store::LedgerStore;

/// A signed balance mutation in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDelta {
    Increase(U256),
    Decrease(U256),
}

/// The open position for (account, market, side), if one exists.
///
/// At most one may be open per tuple at any time; the open/close
/// transitions below preserve that invariant.
pub fn find_open_position<'a>(
    store: &'a LedgerStore,
    account: &Address,
    market: &Address,
    side: PositionSide,
) -> Option<&'a Position> {
    store
        .accounts
        .get(account)?
        .open_positions
        .iter()
        .find(|id| id.matches(account, market, side))
        .and_then(|id| store.positions.get(id))
}

/// Ensure the account record exists. Returns true when it was created,
/// which also bumps the protocol's unique-account tally.
pub fn get_or_create_account(store: &mut LedgerStore, id: &Address) -> bool {
    if store.accounts.contains_key(id) {
        return false;
    }
    store.accounts.insert(id.clone(), Account::new(id.clone()));
    store.protocol.cumulative_unique_accounts += 1;
    true
}

/// Return the open position id for the tuple, opening a fresh position if
/// none exists. Idempotent while a position stays open.
pub fn open_or_get_position(
    store: &mut LedgerStore,
    context: &EventContext,
    account: &Address,
    market: &Address,
    side: PositionSide,
) -> PositionId {
    if let Some(position) = find_open_position(store, account, market, side) {
        return position.id.clone();
    }

    get_or_create_account(store, account);
    let account_record = store
        .accounts
        .get_mut(account)
        .expect("account created above");

    let id = PositionId {
        account: account.clone(),
        market: market.clone(),
        side,
        index: account_record.position_count,
    };
    account_record.position_count += 1;
    account_record.open_position_count += 1;
    account_record.open_positions.push(id.clone());

    if let Some(market_record) = store.markets.get_mut(market) {
        market_record.position_count += 1;
        market_record.open_position_count += 1;
        match side {
            PositionSide::Lender => market_record.lending_position_count += 1,
            PositionSide::Borrower => market_record.borrowing_position_count += 1,
        }
    }
    store.protocol.cumulative_position_count += 1;
    store.protocol.open_position_count += 1;

    store
        .positions
        .insert(id.clone(), Position::opened(id.clone(), context));
    id
}

/// Apply a balance mutation and run the close transition when the balance
/// lands exactly on zero.
///
/// A decrease past zero is a reconciliation error between the event stream
/// and protocol-side rounding: it is logged and the balance clamps to zero
/// (which also closes the position) instead of going negative.
pub fn apply_balance_delta(
    store: &mut LedgerStore,
    context: &EventContext,
    id: &PositionId,
    delta: BalanceDelta,
    rate_mode: Option<InterestRateMode>,
) {
    let Some(position) = store.positions.get_mut(id) else {
        warn!(position = %id, "balance delta for unknown position; skipping");
        return;
    };
    if !position.is_open() {
        warn!(position = %id, "balance delta for closed position; skipping");
        return;
    }

    match position.side() {
        PositionSide::Borrower => apply_debt_delta(position, delta, rate_mode),
        PositionSide::Lender => match delta {
            BalanceDelta::Increase(amount) => {
                position.balance = position.balance.saturating_add(amount);
            }
            BalanceDelta::Decrease(amount) => {
                if amount > position.balance {
                    warn!(
                        position = %id,
                        balance = %position.balance,
                        decrease = %amount,
                        tx = %context.tx_hash,
                        "balance would go negative; clamping to zero"
                    );
                    position.balance = U256::zero();
                } else {
                    position.balance -= amount;
                }
            }
        },
    }

    if position.balance.is_zero() {
        close_position(store, context, id);
    }
}

/// Debt mutations route through the stable/variable sub-accumulators; the
/// position balance is always their sum.
fn apply_debt_delta(position: &mut Position, delta: BalanceDelta, rate_mode: Option<InterestRateMode>) {
    match delta {
        BalanceDelta::Increase(amount) => match rate_mode {
            Some(InterestRateMode::Stable) => {
                position.stable_debt = position.stable_debt.saturating_add(amount);
            }
            Some(InterestRateMode::Variable) | None => {
                position.variable_debt = position.variable_debt.saturating_add(amount);
            }
        },
        BalanceDelta::Decrease(amount) => {
            let (first, second) = match rate_mode {
                Some(InterestRateMode::Stable) => {
                    (&mut position.stable_debt, &mut position.variable_debt)
                }
                // Liquidations arrive without a rate mode; variable debt is
                // repaid first, mirroring pool behavior.
                Some(InterestRateMode::Variable) | None => {
                    (&mut position.variable_debt, &mut position.stable_debt)
                }
            };
            let from_first = amount.min(*first);
            *first -= from_first;
            let remainder = amount - from_first;
            if !remainder.is_zero() {
                let from_second = remainder.min(*second);
                *second -= from_second;
                if remainder > from_second {
                    warn!(
                        position = %position.id,
                        excess = %(remainder - from_second),
                        "debt repayment exceeds outstanding debt; clamping"
                    );
                }
            }
        }
    }
    position.balance = position.stable_debt.saturating_add(position.variable_debt);
}

/// OPEN → CLOSED. Terminal: the id moves off the account's open list and
/// every open counter steps down while the closed counters step up.
fn close_position(store: &mut LedgerStore, context: &EventContext, id: &PositionId) {
    let Some(position) = store.positions.get_mut(id) else {
        return;
    };
    position.closed_at = Some(EventStamp::from_context(context));

    if let Some(account) = store.accounts.get_mut(&id.account) {
        account.open_positions.retain(|open_id| open_id != id);
        account.open_position_count = account.open_position_count.saturating_sub(1);
        account.closed_position_count += 1;
    }
    if let Some(market) = store.markets.get_mut(&id.market) {
        market.open_position_count = market.open_position_count.saturating_sub(1);
        market.closed_position_count += 1;
    }
    store.protocol.open_position_count = store.protocol.open_position_count.saturating_sub(1);
}

/// Bump the matching per-type counter on position, account, and market.
/// The three tallies are denormalized copies and must stay in lock-step.
pub fn record_event(store: &mut LedgerStore, id: &PositionId, event_type: EventType) {
    if let Some(position) = store.positions.get_mut(id) {
        position.counters.increment(event_type);
    }
    if let Some(account) = store.accounts.get_mut(&id.account) {
        account.counters.increment(event_type);
    }
    if let Some(market) = store.markets.get_mut(&id.market) {
        market.counters.increment(event_type);
    }
}

/// Toggle the collateral flag on the open lender position, if any.
/// Naturally idempotent: toggling with no open position is a logged no-op.
pub fn set_collateral(
    store: &mut LedgerStore,
    account: &Address,
    market: &Address,
    enabled: bool,
) {
    let id = match find_open_position(store, account, market, PositionSide::Lender) {
        Some(position) => position.id.clone(),
        None => {
            warn!(
                account = %account,
                market = %market,
                "collateral toggle with no open lender position; ignoring"
            );
            return;
        }
    };
    if let Some(position) = store.positions.get_mut(&id) {
        position.is_collateral = enabled;
    }
}
