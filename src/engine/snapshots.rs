//! Rolling hourly/daily snapshot maintenance.
//!
//! Entities carry cumulative totals only. Each bucket's snapshot opens by
//! inheriting the previous bucket's cumulative values as its baseline, then
//! mirrors the entity's totals after every event in the bucket; the bucket
//! delta is always `cumulative - baseline`. Summed over all buckets the
//! deltas telescope back to the entity's final cumulative value.

use crate::domain::market::{RevenueTotals, VolumeTotals};
use crate::domain::snapshot::{SnapshotMetrics, UsageCounts};
use crate::domain::{
    bucket_id, Address, EventContext, EventType, FinancialsDailySnapshot, MarketDailySnapshot,
    MarketHourlySnapshot, UsageDailySnapshot, UsageHourlySnapshot, SECONDS_PER_DAY,
    SECONDS_PER_HOUR,
};
use crate::store::{ActivityPeriod, LedgerStore};

/// Mirror an entity's cumulative totals into a snapshot's metric set.
fn sync_metrics(metrics: &mut SnapshotMetrics, volume: &VolumeTotals, revenue: &RevenueTotals) {
    metrics.deposit.track(volume.deposit_usd);
    metrics.withdraw.track(volume.withdraw_usd);
    metrics.borrow.track(volume.borrow_usd);
    metrics.repay.track(volume.repay_usd);
    metrics.liquidate.track(volume.liquidate_usd);
    metrics.supply_side_revenue.track(revenue.supply_side_usd);
    metrics.protocol_side_revenue.track(revenue.protocol_side_usd);
    metrics.total_revenue.track(revenue.total_usd);
}

/// Upsert the daily and hourly snapshots of a market after an event
/// mutated it. Must run after the market's cumulative fields are current.
pub fn upsert_market_snapshots(store: &mut LedgerStore, context: &EventContext, market_id: &Address) {
    let Some(market) = store.markets.get(market_id) else {
        return;
    };
    let volume = market.volume;
    let revenue = market.revenue;
    let rates = market.rates;
    let tvl = market.total_value_locked_usd;
    let deposit_balance = market.total_deposit_balance_usd;
    let borrow_balance = market.total_borrow_balance_usd;

    let day = bucket_id(context.timestamp, SECONDS_PER_DAY);
    let daily_key = (market_id.clone(), day);
    if !store.market_daily.contains_key(&daily_key) {
        let previous = store
            .latest_market_daily
            .get(market_id)
            .and_then(|prev_day| store.market_daily.get(&(market_id.clone(), *prev_day)))
            .map(|snapshot| snapshot.metrics);
        store.market_daily.insert(
            daily_key.clone(),
            MarketDailySnapshot {
                market: market_id.clone(),
                day,
                block_number: context.block_number,
                timestamp: context.timestamp,
                metrics: SnapshotMetrics::rolled_from(previous.as_ref()),
                total_value_locked_usd: tvl,
                total_deposit_balance_usd: deposit_balance,
                total_borrow_balance_usd: borrow_balance,
                rates,
            },
        );
    }
    let daily = store
        .market_daily
        .get_mut(&daily_key)
        .expect("daily snapshot inserted above");
    daily.block_number = context.block_number;
    daily.timestamp = context.timestamp;
    daily.total_value_locked_usd = tvl;
    daily.total_deposit_balance_usd = deposit_balance;
    daily.total_borrow_balance_usd = borrow_balance;
    daily.rates = rates;
    sync_metrics(&mut daily.metrics, &volume, &revenue);
    store.latest_market_daily.insert(market_id.clone(), day);

    let hour = bucket_id(context.timestamp, SECONDS_PER_HOUR);
    let hourly_key = (market_id.clone(), hour);
    if !store.market_hourly.contains_key(&hourly_key) {
        let previous = store
            .latest_market_hourly
            .get(market_id)
            .and_then(|prev_hour| store.market_hourly.get(&(market_id.clone(), *prev_hour)))
            .map(|snapshot| snapshot.metrics);
        store.market_hourly.insert(
            hourly_key.clone(),
            MarketHourlySnapshot {
                market: market_id.clone(),
                hour,
                block_number: context.block_number,
                timestamp: context.timestamp,
                metrics: SnapshotMetrics::rolled_from(previous.as_ref()),
                total_value_locked_usd: tvl,
                total_deposit_balance_usd: deposit_balance,
                total_borrow_balance_usd: borrow_balance,
                rates,
            },
        );
    }
    let hourly = store
        .market_hourly
        .get_mut(&hourly_key)
        .expect("hourly snapshot inserted above");
    hourly.block_number = context.block_number;
    hourly.timestamp = context.timestamp;
    hourly.total_value_locked_usd = tvl;
    hourly.total_deposit_balance_usd = deposit_balance;
    hourly.total_borrow_balance_usd = borrow_balance;
    hourly.rates = rates;
    sync_metrics(&mut hourly.metrics, &volume, &revenue);
    store.latest_market_hourly.insert(market_id.clone(), hour);
}

/// Upsert the protocol-wide daily financials snapshot.
pub fn upsert_financials_snapshot(store: &mut LedgerStore, context: &EventContext) {
    let volume = store.protocol.volume;
    let revenue = store.protocol.revenue;
    let tvl = store.protocol.total_value_locked_usd;
    let deposit_balance = store.protocol.total_deposit_balance_usd;
    let borrow_balance = store.protocol.total_borrow_balance_usd;

    let day = bucket_id(context.timestamp, SECONDS_PER_DAY);
    if !store.financials_daily.contains_key(&day) {
        let previous = store
            .latest_financials_day
            .and_then(|prev_day| store.financials_daily.get(&prev_day))
            .map(|snapshot| snapshot.metrics);
        store.financials_daily.insert(
            day,
            FinancialsDailySnapshot {
                day,
                block_number: context.block_number,
                timestamp: context.timestamp,
                metrics: SnapshotMetrics::rolled_from(previous.as_ref()),
                total_value_locked_usd: tvl,
                total_deposit_balance_usd: deposit_balance,
                total_borrow_balance_usd: borrow_balance,
            },
        );
    }
    let snapshot = store
        .financials_daily
        .get_mut(&day)
        .expect("financials snapshot inserted above");
    snapshot.block_number = context.block_number;
    snapshot.timestamp = context.timestamp;
    snapshot.total_value_locked_usd = tvl;
    snapshot.total_deposit_balance_usd = deposit_balance;
    snapshot.total_borrow_balance_usd = borrow_balance;
    sync_metrics(&mut snapshot.metrics, &volume, &revenue);
    store.latest_financials_day = Some(day);
}

fn bump_usage_counts(counts: &mut UsageCounts, event_type: EventType) {
    counts.transaction_count += 1;
    match event_type {
        EventType::Deposit => counts.deposit_count += 1,
        EventType::Withdraw => counts.withdraw_count += 1,
        EventType::Borrow => counts.borrow_count += 1,
        EventType::Repay => counts.repay_count += 1,
        EventType::Liquidation => counts.liquidation_count += 1,
        // Receipt-token transfers do not count as protocol usage.
        EventType::Transferred | EventType::Received => {}
    }
}

/// Record account activity in the daily and hourly usage buckets.
pub fn record_usage(
    store: &mut LedgerStore,
    context: &EventContext,
    account: &Address,
    event_type: EventType,
) {
    let unique_accounts = store.protocol.cumulative_unique_accounts;
    let pool_count = store.protocol.total_pool_count;

    let day = bucket_id(context.timestamp, SECONDS_PER_DAY);
    let newly_active_today = store.mark_active(ActivityPeriod::Daily, day, account);
    let daily = store
        .usage_daily
        .entry(day)
        .or_insert_with(|| UsageDailySnapshot {
            day,
            block_number: context.block_number,
            timestamp: context.timestamp,
            active_accounts: 0,
            cumulative_unique_accounts: unique_accounts,
            total_pool_count: pool_count,
            counts: UsageCounts::default(),
        });
    if newly_active_today {
        daily.active_accounts += 1;
    }
    daily.block_number = context.block_number;
    daily.timestamp = context.timestamp;
    daily.cumulative_unique_accounts = unique_accounts;
    daily.total_pool_count = pool_count;
    bump_usage_counts(&mut daily.counts, event_type);

    let hour = bucket_id(context.timestamp, SECONDS_PER_HOUR);
    let newly_active_this_hour = store.mark_active(ActivityPeriod::Hourly, hour, account);
    let hourly = store
        .usage_hourly
        .entry(hour)
        .or_insert_with(|| UsageHourlySnapshot {
            hour,
            block_number: context.block_number,
            timestamp: context.timestamp,
            active_accounts: 0,
            cumulative_unique_accounts: unique_accounts,
            counts: UsageCounts::default(),
        });
    if newly_active_this_hour {
        hourly.active_accounts += 1;
    }
    hourly.block_number = context.block_number;
    hourly.timestamp = context.timestamp;
    hourly.cumulative_unique_accounts = unique_accounts;
    bump_usage_counts(&mut hourly.counts, event_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Market, Protocol, TxHash, Usd};
    use rust_decimal_macros::dec;

    fn addr(n: u8) -> Address {
        Address::unchecked(format!("0x{}", hex::encode([n; 20])))
    }

    fn ctx(timestamp: i64) -> EventContext {
        EventContext {
            block_number: timestamp as u64,
            timestamp,
            tx_hash: TxHash::new("0x01"),
            log_index: 0,
            nonce: 0,
        }
    }

    fn store_with_market() -> (LedgerStore, Address) {
        let mut store = LedgerStore::new(Protocol::new(
            addr(0xaa),
            "Test".into(),
            "test".into(),
            "mainnet".into(),
        ));
        let market_id = addr(1);
        store.markets.insert(
            market_id.clone(),
            Market::listed(market_id.clone(), "M".into(), addr(2), addr(3), addr(4), &ctx(0)),
        );
        (store, market_id)
    }

    #[test]
    fn second_event_in_bucket_mutates_in_place() {
        let (mut store, market_id) = store_with_market();

        store.markets.get_mut(&market_id).unwrap().volume.deposit_usd = Usd::new(dec!(100));
        upsert_market_snapshots(&mut store, &ctx(1_000), &market_id);
        store.markets.get_mut(&market_id).unwrap().volume.deposit_usd = Usd::new(dec!(160));
        upsert_market_snapshots(&mut store, &ctx(2_000), &market_id);

        let snapshot = store.market_daily_snapshot(&market_id, 0).unwrap();
        assert_eq!(snapshot.metrics.deposit.delta(), Usd::new(dec!(160)));
        assert_eq!(snapshot.timestamp, 2_000);
    }

    #[test]
    fn new_bucket_rolls_baseline_from_previous() {
        let (mut store, market_id) = store_with_market();

        store.markets.get_mut(&market_id).unwrap().volume.deposit_usd = Usd::new(dec!(100));
        upsert_market_snapshots(&mut store, &ctx(1_000), &market_id);

        // Next day: 50 more.
        store.markets.get_mut(&market_id).unwrap().volume.deposit_usd = Usd::new(dec!(150));
        upsert_market_snapshots(&mut store, &ctx(SECONDS_PER_DAY + 1_000), &market_id);

        let day0 = store.market_daily_snapshot(&market_id, 0).unwrap();
        let day1 = store.market_daily_snapshot(&market_id, 1).unwrap();
        assert_eq!(day0.metrics.deposit.delta(), Usd::new(dec!(100)));
        assert_eq!(day1.metrics.deposit.delta(), Usd::new(dec!(50)));
        assert_eq!(day1.metrics.deposit.cumulative, Usd::new(dec!(150)));
    }

    #[test]
    fn usage_active_accounts_dedup_within_bucket() {
        let (mut store, _) = store_with_market();
        let user = addr(9);

        record_usage(&mut store, &ctx(100), &user, EventType::Deposit);
        record_usage(&mut store, &ctx(200), &user, EventType::Withdraw);
        record_usage(&mut store, &ctx(300), &addr(8), EventType::Deposit);

        let daily = store.usage_daily_snapshot(0).unwrap();
        assert_eq!(daily.active_accounts, 2);
        assert_eq!(daily.counts.transaction_count, 3);
        assert_eq!(daily.counts.deposit_count, 2);
        assert_eq!(daily.counts.withdraw_count, 1);

        let hourly = store.usage_hourly_snapshot(0).unwrap();
        assert_eq!(hourly.active_accounts, 2);
    }

    #[test]
    fn hourly_and_daily_buckets_advance_independently() {
        let (mut store, market_id) = store_with_market();

        store.markets.get_mut(&market_id).unwrap().volume.borrow_usd = Usd::new(dec!(10));
        upsert_market_snapshots(&mut store, &ctx(0), &market_id);
        store.markets.get_mut(&market_id).unwrap().volume.borrow_usd = Usd::new(dec!(30));
        upsert_market_snapshots(&mut store, &ctx(SECONDS_PER_HOUR + 5), &market_id);

        // Same day, two different hours.
        let day = store.market_daily_snapshot(&market_id, 0).unwrap();
        assert_eq!(day.metrics.borrow.delta(), Usd::new(dec!(30)));
        let hour0 = store.market_hourly_snapshot(&market_id, 0).unwrap();
        let hour1 = store.market_hourly_snapshot(&market_id, 1).unwrap();
        assert_eq!(hour0.metrics.borrow.delta(), Usd::new(dec!(10)));
        assert_eq!(hour1.metrics.borrow.delta(), Usd::new(dec!(20)));
    }
}
