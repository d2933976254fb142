//! Event orchestration: one entry point applying each decoded event to the
//! store in the component order the ledger requires.

pub mod ledger;

pub use ledger::Ledger;
