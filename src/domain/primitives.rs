//! Domain primitives: Address, TxHash, PositionSide, EventType.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 20-byte EVM address, stored as a normalized lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("address must be 20 bytes of hex: {0}")]
    BadLength(String),
    #[error("address contains non-hex characters: {0}")]
    BadHex(String),
}

impl Address {
    /// Parse and normalize a `0x`-prefixed hex address.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let stripped = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError::MissingPrefix(raw.to_string()))?;
        let bytes =
            hex::decode(stripped).map_err(|_| AddressParseError::BadHex(raw.to_string()))?;
        if bytes.len() != 20 {
            return Err(AddressParseError::BadLength(raw.to_string()));
        }
        Ok(Address(format!("0x{}", hex::encode(bytes))))
    }

    /// Wrap an already-normalized identifier without validation.
    ///
    /// Used for well-known ids (protocol slugs in tests, zero address).
    pub fn unchecked(raw: impl Into<String>) -> Self {
        Address(raw.into().to_lowercase())
    }

    /// The zero address, used by mint/burn transfer legs.
    pub fn zero() -> Self {
        Address(format!("0x{}", "00".repeat(20)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transaction hash (hex string), kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        TxHash(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a market a position sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    /// Supplier of liquidity (holds receipt tokens).
    Lender,
    /// Holder of debt.
    Borrower,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Lender => write!(f, "LENDER"),
            PositionSide::Borrower => write!(f, "BORROWER"),
        }
    }
}

/// Interest accrual mode for borrower-side balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterestRateMode {
    Stable,
    Variable,
}

/// Ledger event classes that carry per-entity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    Liquidation,
    Transferred,
    Received,
}

/// Per-event-type counters, kept in lock-step on position, account, and
/// market (denormalized copies of the same tallies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    pub deposit_count: u32,
    pub withdraw_count: u32,
    pub borrow_count: u32,
    pub repay_count: u32,
    pub liquidation_count: u32,
    pub transferred_count: u32,
    pub received_count: u32,
}

impl EventCounters {
    pub fn increment(&mut self, event_type: EventType) {
        match event_type {
            EventType::Deposit => self.deposit_count += 1,
            EventType::Withdraw => self.withdraw_count += 1,
            EventType::Borrow => self.borrow_count += 1,
            EventType::Repay => self.repay_count += 1,
            EventType::Liquidation => self.liquidation_count += 1,
            EventType::Transferred => self.transferred_count += 1,
            EventType::Received => self.received_count += 1,
        }
    }
}
