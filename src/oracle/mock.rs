//! Mock oracle for testing without contract calls.

use std::collections::HashMap;

use super::{OracleError, PriceSource, TokenMetadataSource};
use crate::domain::{Address, Usd};

/// Mock price and metadata source backed by fixed tables.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    prices: HashMap<Address, Usd>,
    decimals: HashMap<Address, u32>,
    names: HashMap<Address, String>,
    symbols: HashMap<Address, String>,
    underlying: HashMap<Address, Address>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price returned for a token (any block).
    pub fn with_price(mut self, token: Address, price: Usd) -> Self {
        self.prices.insert(token, price);
        self
    }

    pub fn with_decimals(mut self, token: Address, decimals: u32) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    pub fn with_name(mut self, token: Address, name: &str) -> Self {
        self.names.insert(token, name.to_string());
        self
    }

    pub fn with_symbol(mut self, token: Address, symbol: &str) -> Self {
        self.symbols.insert(token, symbol.to_string());
        self
    }

    /// Declare `token` a wrapper that redeems into `underlying`.
    pub fn with_underlying(mut self, token: Address, underlying: Address) -> Self {
        self.underlying.insert(token, underlying);
        self
    }
}

impl PriceSource for MockOracle {
    fn usd_price(&self, token: &Address, block: u64) -> Result<Usd, OracleError> {
        self.prices
            .get(token)
            .copied()
            .ok_or_else(|| OracleError::PriceUnavailable {
                token: token.to_string(),
                block,
            })
    }
}

impl TokenMetadataSource for MockOracle {
    fn decimals_of(&self, token: &Address) -> Result<u32, OracleError> {
        self.decimals
            .get(token)
            .copied()
            .ok_or_else(|| OracleError::MetadataUnavailable {
                token: token.to_string(),
                field: "decimals",
            })
    }

    fn name_of(&self, token: &Address) -> Result<String, OracleError> {
        self.names
            .get(token)
            .cloned()
            .ok_or_else(|| OracleError::MetadataUnavailable {
                token: token.to_string(),
                field: "name",
            })
    }

    fn symbol_of(&self, token: &Address) -> Result<String, OracleError> {
        self.symbols
            .get(token)
            .cloned()
            .ok_or_else(|| OracleError::MetadataUnavailable {
                token: token.to_string(),
                field: "symbol",
            })
    }

    fn underlying_of(&self, token: &Address) -> Option<Address> {
        self.underlying.get(token).cloned()
    }
}
