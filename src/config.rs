//! Protocol deployment configuration.
//!
//! Protocol-version heuristics (treasury-address comparisons, the upgrade
//! block after which transfer events carry scaled amounts) live here as
//! named predicates rather than inlined conditionals in the handlers.

use crate::domain::Address;
use thiserror::Error;

/// Static facts about one protocol deployment, constructed by the embedder
/// and injected at ledger construction.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Well-known id of the protocol aggregate (usually the pool address).
    pub protocol_id: Address,
    pub name: String,
    pub slug: String,
    pub network: String,
    /// Treasury/collector addresses whose receipt-token transfers are fee
    /// mints, not user activity.
    pub treasury_addresses: Vec<Address>,
    /// Block from which receipt-token transfer events carry scaled amounts
    /// instead of base-unit amounts. `None` means they never do.
    pub scaled_transfer_activation_block: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ProtocolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        if self.slug.is_empty() {
            return Err(ConfigError::MissingField("slug"));
        }
        if self.network.is_empty() {
            return Err(ConfigError::MissingField("network"));
        }
        Ok(())
    }

    /// True if `address` is a protocol treasury/collector.
    pub fn is_treasury(&self, address: &Address) -> bool {
        self.treasury_addresses.contains(address)
    }

    /// True if transfer events at `block` carry scaled (index-free)
    /// amounts.
    pub fn transfer_amounts_scaled_at(&self, block: u64) -> bool {
        match self.scaled_transfer_activation_block {
            Some(activation) => block >= activation,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProtocolConfig {
        ProtocolConfig {
            protocol_id: Address::unchecked("0x0000000000000000000000000000000000000aaa"),
            name: "Test Lending".to_string(),
            slug: "test-lending".to_string(),
            network: "mainnet".to_string(),
            treasury_addresses: vec![Address::unchecked(
                "0x00000000000000000000000000000000000000fe",
            )],
            scaled_transfer_activation_block: Some(1_000),
        }
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut bad = config();
        bad.slug = String::new();
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::MissingField("slug"))
        ));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn treasury_predicate() {
        let config = config();
        assert!(config.is_treasury(&Address::unchecked(
            "0x00000000000000000000000000000000000000fe"
        )));
        assert!(!config.is_treasury(&Address::zero()));
    }

    #[test]
    fn scaled_transfer_predicate_respects_activation_block() {
        let config = config();
        assert!(!config.transfer_amounts_scaled_at(999));
        assert!(config.transfer_amounts_scaled_at(1_000));
        assert!(config.transfer_amounts_scaled_at(2_000));

        let never = ProtocolConfig {
            scaled_transfer_activation_block: None,
            ..config
        };
        assert!(!never.transfer_amounts_scaled_at(u64::MAX));
    }
}
