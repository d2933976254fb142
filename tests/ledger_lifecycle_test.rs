use std::sync::Arc;

use lendledger::{
    Address, EventContext, EventKind, InterestRateMode, Ledger, LedgerEvent, MockOracle,
    PositionId, PositionSide, ProtocolConfig, TxHash, Usd,
};
use primitive_types::U256;
use rust_decimal_macros::dec;

fn addr(n: u8) -> Address {
    Address::unchecked(format!("0x{:040x}", n))
}

fn market_id() -> Address {
    addr(0x10)
}

fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

fn ctx(block: u64, log_index: u32) -> EventContext {
    EventContext {
        block_number: block,
        timestamp: 1_700_000_000 + block as i64,
        tx_hash: TxHash::new(format!("0x{block:x}")),
        log_index,
        nonce: block,
    }
}

fn event(block: u64, log_index: u32, kind: EventKind) -> LedgerEvent {
    LedgerEvent::new(ctx(block, log_index), kind)
}

fn setup() -> Ledger {
    let oracle = MockOracle::new()
        .with_decimals(market_id(), 18)
        .with_price(market_id(), Usd::new(dec!(1)))
        .with_name(addr(0x11), "Interest Bearing Test");
    let oracle = Arc::new(oracle);
    let config = ProtocolConfig {
        protocol_id: addr(0xaa),
        name: "Test Lending".to_string(),
        slug: "test-lending".to_string(),
        network: "mainnet".to_string(),
        treasury_addresses: vec![addr(0xfe)],
        scaled_transfer_activation_block: None,
    };
    let mut ledger = Ledger::new(config, oracle.clone(), oracle).unwrap();
    ledger
        .process(&event(
            1,
            0,
            EventKind::MarketListed {
                market: market_id(),
                output_token: addr(0x11),
                stable_debt_token: addr(0x12),
                variable_debt_token: addr(0x13),
            },
        ))
        .unwrap();
    ledger
}

fn deposit(block: u64, account: Address, amount: u64) -> LedgerEvent {
    event(
        block,
        0,
        EventKind::Deposit {
            market: market_id(),
            account,
            amount: tokens(amount),
        },
    )
}

fn withdraw(block: u64, account: Address, amount: u64) -> LedgerEvent {
    event(
        block,
        0,
        EventKind::Withdraw {
            market: market_id(),
            account,
            amount: tokens(amount),
        },
    )
}

fn position_id(account: Address, side: PositionSide, index: u32) -> PositionId {
    PositionId {
        account,
        market: market_id(),
        side,
        index,
    }
}

#[test]
fn test_open_close_reopen_allocates_new_position() {
    let mut ledger = setup();
    let alice = addr(1);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    assert_eq!(ledger.store().position(&p0).unwrap().balance, tokens(100));
    assert_eq!(ledger.store().account(&alice).unwrap().open_position_count, 1);

    ledger.process(&withdraw(11, alice.clone(), 100)).unwrap();
    let closed = ledger.store().position(&p0).unwrap();
    assert!(closed.balance.is_zero());
    assert!(closed.closed_at.is_some());
    let account = ledger.store().account(&alice).unwrap();
    assert_eq!(account.closed_position_count, 1);
    assert_eq!(account.open_position_count, 0);

    ledger.process(&deposit(12, alice.clone(), 50)).unwrap();
    let p1 = position_id(alice.clone(), PositionSide::Lender, 1);
    let reopened = ledger.store().position(&p1).unwrap();
    assert_eq!(reopened.balance, tokens(50));
    assert!(reopened.closed_at.is_none());

    // The closed record is immutable history.
    let p0_after = ledger.store().position(&p0).unwrap();
    assert!(p0_after.balance.is_zero());
    assert!(p0_after.closed_at.is_some());

    let account = ledger.store().account(&alice).unwrap();
    assert_eq!(account.open_position_count, 1);
    assert_eq!(account.closed_position_count, 1);
    assert_eq!(account.position_count, 2);
    assert!(account.open_list_consistent());
}

#[test]
fn test_at_most_one_open_position_per_tuple() {
    let mut ledger = setup();
    let alice = addr(1);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    ledger.process(&deposit(11, alice.clone(), 40)).unwrap();
    ledger
        .process(&event(
            12,
            0,
            EventKind::Borrow {
                market: market_id(),
                account: alice.clone(),
                amount: tokens(30),
                rate_mode: InterestRateMode::Variable,
            },
        ))
        .unwrap();

    // Both deposits landed on the same lender position.
    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    assert_eq!(ledger.store().position(&p0).unwrap().balance, tokens(140));

    for side in [PositionSide::Lender, PositionSide::Borrower] {
        let open = ledger
            .store()
            .positions()
            .filter(|p| p.id.matches(&alice, &market_id(), side) && p.is_open())
            .count();
        assert!(open <= 1, "more than one open position for {side:?}");
    }
}

#[test]
fn test_balance_never_negative_on_overdraw() {
    let mut ledger = setup();
    let alice = addr(1);

    ledger.process(&deposit(10, alice.clone(), 50)).unwrap();
    // Protocol-side rounding can overshoot; the ledger clamps instead of
    // going negative.
    ledger.process(&withdraw(11, alice.clone(), 80)).unwrap();

    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    let position = ledger.store().position(&p0).unwrap();
    assert!(position.balance.is_zero());
    assert!(position.closed_at.is_some());
}

#[test]
fn test_replayed_event_applies_once() {
    let mut ledger = setup();
    let alice = addr(1);

    let deposit_event = deposit(10, alice.clone(), 100);
    ledger.process(&deposit_event).unwrap();
    ledger.process(&deposit_event).unwrap();

    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    assert_eq!(ledger.store().position(&p0).unwrap().balance, tokens(100));
    assert_eq!(
        ledger.store().market(&market_id()).unwrap().volume.deposit_usd,
        Usd::new(dec!(100))
    );
}

#[test]
fn test_counters_lock_step_across_position_account_market() {
    let mut ledger = setup();
    let alice = addr(1);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    ledger.process(&deposit(11, alice.clone(), 20)).unwrap();
    ledger.process(&withdraw(12, alice.clone(), 30)).unwrap();

    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    let position = ledger.store().position(&p0).unwrap().counters;
    let account = ledger.store().account(&alice).unwrap().counters;
    let market = ledger.store().market(&market_id()).unwrap().counters;
    assert_eq!(position, account);
    assert_eq!(account, market);
    assert_eq!(position.deposit_count, 2);
    assert_eq!(position.withdraw_count, 1);
}

#[test]
fn test_collateral_toggle_flips_open_lender_position() {
    let mut ledger = setup();
    let alice = addr(1);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    let p0 = position_id(alice.clone(), PositionSide::Lender, 0);
    assert!(ledger.store().position(&p0).unwrap().is_collateral);

    ledger
        .process(&event(
            11,
            0,
            EventKind::CollateralToggled {
                market: market_id(),
                account: alice.clone(),
                enabled: false,
            },
        ))
        .unwrap();
    assert!(!ledger.store().position(&p0).unwrap().is_collateral);
}

#[test]
fn test_transfer_moves_balance_between_accounts() {
    let mut ledger = setup();
    let alice = addr(1);
    let bob = addr(2);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    ledger
        .process(&event(
            11,
            0,
            EventKind::Transfer {
                market: market_id(),
                from: alice.clone(),
                to: bob.clone(),
                amount: tokens(40),
            },
        ))
        .unwrap();

    let alice_pos = position_id(alice.clone(), PositionSide::Lender, 0);
    let bob_pos = position_id(bob.clone(), PositionSide::Lender, 0);
    assert_eq!(ledger.store().position(&alice_pos).unwrap().balance, tokens(60));
    assert_eq!(ledger.store().position(&bob_pos).unwrap().balance, tokens(40));

    let alice_counters = ledger.store().account(&alice).unwrap().counters;
    let bob_counters = ledger.store().account(&bob).unwrap().counters;
    assert_eq!(alice_counters.transferred_count, 1);
    assert_eq!(bob_counters.received_count, 1);
}

#[test]
fn test_treasury_transfer_tracks_fee_mint_without_positions() {
    let mut ledger = setup();
    let alice = addr(1);
    let treasury = addr(0xfe);

    ledger.process(&deposit(10, alice.clone(), 100)).unwrap();
    ledger
        .process(&event(
            11,
            0,
            EventKind::Transfer {
                market: market_id(),
                from: alice.clone(),
                to: treasury.clone(),
                amount: tokens(5),
            },
        ))
        .unwrap();

    // No position bookkeeping for a treasury leg; the reserve tracks it.
    let alice_pos = position_id(alice.clone(), PositionSide::Lender, 0);
    assert_eq!(ledger.store().position(&alice_pos).unwrap().balance, tokens(100));
    assert!(ledger.store().account(&treasury).is_none());
    assert_eq!(
        ledger.store().reserve(&market_id()).unwrap().accrued_to_treasury,
        tokens(5)
    );
}

#[test]
fn test_withdraw_without_position_is_logged_noop_on_positions() {
    let mut ledger = setup();
    let stranger = addr(7);

    // No prior deposit: the position ledger skips, volume still books.
    ledger.process(&withdraw(10, stranger.clone(), 10)).unwrap();
    assert!(ledger.store().account(&stranger).is_none() || {
        let account = ledger.store().account(&stranger).unwrap();
        account.open_position_count == 0
    });
    assert_eq!(
        ledger.store().market(&market_id()).unwrap().volume.withdraw_usd,
        Usd::new(dec!(10))
    );
}
