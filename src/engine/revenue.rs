//! Revenue attribution: accrued interest and fees into supply-side vs
//! protocol-side USD totals.

use primitive_types::U256;
use tracing::warn;

use crate::domain::{Address, Market, Protocol, Usd};
use crate::error::LedgerError;
use crate::math;
use crate::oracle::{PriceSource, TokenMetadataSource};

/// Wrapper-token price resolution tolerates nested wrapping up to this
/// depth; deeper chains indicate a metadata cycle.
const MAX_UNDERLYING_DEPTH: usize = 8;

/// Resolves token amounts to USD and books revenue.
pub struct RevenueAttributor<'a> {
    prices: &'a dyn PriceSource,
    tokens: &'a dyn TokenMetadataSource,
}

impl<'a> RevenueAttributor<'a> {
    pub fn new(prices: &'a dyn PriceSource, tokens: &'a dyn TokenMetadataSource) -> Self {
        RevenueAttributor { prices, tokens }
    }

    /// USD value of `amount` of `token` at `block`.
    ///
    /// Receipt/wrapped tokens resolve recursively through their underlying
    /// asset before pricing. A failed price lookup yields zero (missing
    /// prices are expected transiently around listing time) with a logged
    /// warning so the zero stays distinguishable from a real zero amount.
    pub fn amount_in_usd(
        &self,
        token: &Address,
        amount: U256,
        block: u64,
    ) -> Result<Usd, LedgerError> {
        let mut priced_token = token.clone();
        let mut depth = 0;
        while let Some(underlying) = self.tokens.underlying_of(&priced_token) {
            depth += 1;
            if depth > MAX_UNDERLYING_DEPTH {
                warn!(
                    token = %token,
                    "underlying-asset chain exceeds depth limit; pricing as zero"
                );
                return Ok(Usd::ZERO);
            }
            priced_token = underlying;
        }

        let decimals = match self.tokens.decimals_of(&priced_token) {
            Ok(decimals) => decimals,
            Err(err) => {
                warn!(token = %priced_token, %err, "decimals unavailable; pricing as zero");
                return Ok(Usd::ZERO);
            }
        };
        let price = match self.prices.usd_price(&priced_token, block) {
            Ok(price) => price,
            Err(err) => {
                warn!(
                    token = %priced_token,
                    block,
                    %err,
                    "price unavailable; recording zero USD"
                );
                return Ok(Usd::ZERO);
            }
        };

        let quantity = math::to_decimal(amount, decimals)?;
        Ok(Usd::new(quantity) * price)
    }

    /// Book interest accrued by a reserve, split by the market's reserve
    /// factor into protocol-side and supply-side revenue.
    pub fn book_accrual(
        &self,
        market: &mut Market,
        protocol: &mut Protocol,
        accrued: U256,
        block: u64,
    ) -> Result<(), LedgerError> {
        let total = self.amount_in_usd(&market.id, accrued, block)?;
        let (supply_side, protocol_side) = split_by_reserve_factor(total, market.reserve_factor);
        book_supply_side_revenue(market, protocol, supply_side);
        book_protocol_side_revenue(market, protocol, protocol_side);
        Ok(())
    }
}

/// `protocol_side = total × reserve_factor`, the rest to suppliers.
pub fn split_by_reserve_factor(total: Usd, reserve_factor: Usd) -> (Usd, Usd) {
    let protocol_side = total * reserve_factor;
    (total - protocol_side, protocol_side)
}

/// Add to the supply-side and total revenue counters at both scopes.
///
/// Revenue only ever grows, with one exception: liquidation profit passes
/// through here signed, and a bad-debt liquidation books a negative amount.
pub fn book_supply_side_revenue(market: &mut Market, protocol: &mut Protocol, amount: Usd) {
    market.revenue.supply_side_usd += amount;
    market.revenue.total_usd += amount;
    protocol.revenue.supply_side_usd += amount;
    protocol.revenue.total_usd += amount;
}

/// Symmetric to `book_supply_side_revenue` for the protocol's cut.
pub fn book_protocol_side_revenue(market: &mut Market, protocol: &mut Protocol, amount: Usd) {
    market.revenue.protocol_side_usd += amount;
    market.revenue.total_usd += amount;
    protocol.revenue.protocol_side_usd += amount;
    protocol.revenue.total_usd += amount;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventContext, TxHash};
    use crate::oracle::MockOracle;
    use rust_decimal_macros::dec;

    fn addr(n: u8) -> Address {
        Address::unchecked(format!("0x{}", hex::encode([n; 20])))
    }

    fn ctx() -> EventContext {
        EventContext {
            block_number: 1,
            timestamp: 1_700_000_000,
            tx_hash: TxHash::new("0x01"),
            log_index: 0,
            nonce: 0,
        }
    }

    fn market() -> Market {
        Market::listed(addr(1), "M".into(), addr(2), addr(3), addr(4), &ctx())
    }

    fn protocol() -> Protocol {
        Protocol::new(addr(0xaa), "Test".into(), "test".into(), "mainnet".into())
    }

    #[test]
    fn amount_in_usd_multiplies_normalized_amount() {
        let oracle = MockOracle::new()
            .with_decimals(addr(1), 6)
            .with_price(addr(1), Usd::new(dec!(2)));
        let attributor = RevenueAttributor::new(&oracle, &oracle);

        let usd = attributor
            .amount_in_usd(&addr(1), U256::from(1_500_000u64), 0)
            .unwrap();
        assert_eq!(usd, Usd::new(dec!(3)));
    }

    #[test]
    fn amount_in_usd_resolves_through_nested_wrappers() {
        // addr(3) wraps addr(2) wraps addr(1); only addr(1) has a price.
        let oracle = MockOracle::new()
            .with_decimals(addr(1), 18)
            .with_price(addr(1), Usd::new(dec!(10)))
            .with_underlying(addr(2), addr(1))
            .with_underlying(addr(3), addr(2));
        let attributor = RevenueAttributor::new(&oracle, &oracle);

        let usd = attributor
            .amount_in_usd(&addr(3), U256::exp10(18), 0)
            .unwrap();
        assert_eq!(usd, Usd::new(dec!(10)));
    }

    #[test]
    fn missing_price_degrades_to_zero() {
        let oracle = MockOracle::new().with_decimals(addr(1), 18);
        let attributor = RevenueAttributor::new(&oracle, &oracle);
        let usd = attributor
            .amount_in_usd(&addr(1), U256::exp10(18), 0)
            .unwrap();
        assert_eq!(usd, Usd::ZERO);
    }

    #[test]
    fn underlying_cycle_degrades_to_zero() {
        let oracle = MockOracle::new()
            .with_underlying(addr(1), addr(2))
            .with_underlying(addr(2), addr(1));
        let attributor = RevenueAttributor::new(&oracle, &oracle);
        let usd = attributor.amount_in_usd(&addr(1), U256::one(), 0).unwrap();
        assert_eq!(usd, Usd::ZERO);
    }

    #[test]
    fn reserve_factor_splits_revenue() {
        let (supply, protocol_cut) =
            split_by_reserve_factor(Usd::new(dec!(100)), Usd::new(dec!(0.1)));
        assert_eq!(protocol_cut, Usd::new(dec!(10)));
        assert_eq!(supply, Usd::new(dec!(90)));
    }

    #[test]
    fn booking_updates_both_scopes() {
        let mut market = market();
        let mut protocol = protocol();
        book_supply_side_revenue(&mut market, &mut protocol, Usd::new(dec!(90)));
        book_protocol_side_revenue(&mut market, &mut protocol, Usd::new(dec!(10)));

        assert_eq!(market.revenue.supply_side_usd, Usd::new(dec!(90)));
        assert_eq!(market.revenue.protocol_side_usd, Usd::new(dec!(10)));
        assert_eq!(market.revenue.total_usd, Usd::new(dec!(100)));
        assert_eq!(protocol.revenue.total_usd, Usd::new(dec!(100)));
    }

    #[test]
    fn negative_liquidation_profit_books_unclamped() {
        let mut market = market();
        let mut protocol = protocol();
        book_supply_side_revenue(&mut market, &mut protocol, Usd::new(dec!(-10)));
        assert_eq!(market.revenue.supply_side_usd, Usd::new(dec!(-10)));
        assert_eq!(protocol.revenue.total_usd, Usd::new(dec!(-10)));
    }
}
