pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod math;
pub mod oracle;
pub mod orchestration;
pub mod store;

pub use config::{ConfigError, ProtocolConfig};
pub use domain::{
    Account, Address, EventContext, EventKind, EventOrderingKey, InterestRateMode, LedgerEvent,
    Market, Position, PositionId, PositionSide, Protocol, Reserve, TxHash, Usd,
};
pub use error::LedgerError;
pub use math::MathError;
pub use oracle::{MockOracle, OracleError, PriceSource, TokenMetadataSource};
pub use orchestration::Ledger;
pub use store::LedgerStore;
