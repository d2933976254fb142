//! Collaborator traits for price and token-metadata lookups.
//!
//! The surrounding indexer host owns the actual contract calls; the core
//! consumes these narrow traits and decides per call site how to degrade
//! when a lookup fails (a missing price zeroes the USD amount with a logged
//! warning, missing name/symbol fall back to caller-chosen defaults).

use std::fmt;

use thiserror::Error;

use crate::domain::{Address, Usd};

pub mod mock;

pub use mock::MockOracle;

/// USD price lookups.
pub trait PriceSource: fmt::Debug {
    /// Current USD price of one whole token at the given block.
    fn usd_price(&self, token: &Address, block: u64) -> Result<Usd, OracleError>;
}

/// Token metadata lookups, mirroring `try_`-style contract reads: a revert
/// surfaces as an error the caller replaces with its own fallback, never as
/// a silently swallowed exception.
pub trait TokenMetadataSource: fmt::Debug {
    fn decimals_of(&self, token: &Address) -> Result<u32, OracleError>;

    fn name_of(&self, token: &Address) -> Result<String, OracleError>;

    fn symbol_of(&self, token: &Address) -> Result<String, OracleError>;

    /// The asset a wrapped/receipt token redeems into, if any.
    fn underlying_of(&self, token: &Address) -> Option<Address>;
}

/// Error type for oracle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("no price for token {token} at block {block}")]
    PriceUnavailable { token: String, block: u64 },
    #[error("{field} lookup reverted for token {token}")]
    MetadataUnavailable { token: String, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_error_display() {
        let err = OracleError::PriceUnavailable {
            token: "0xabc".to_string(),
            block: 123,
        };
        assert_eq!(err.to_string(), "no price for token 0xabc at block 123");

        let err = OracleError::MetadataUnavailable {
            token: "0xabc".to_string(),
            field: "decimals",
        };
        assert_eq!(err.to_string(), "decimals lookup reverted for token 0xabc");
    }
}
