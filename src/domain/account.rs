//! Account records: one per wallet address.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, EventCounters, PositionId};

/// A wallet that has touched the protocol.
///
/// `open_positions` must hold exactly the ids of positions with no close
/// stamp, and `open_position_count` must equal its length at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Address,
    /// Lifetime number of positions ever opened; also the next id suffix.
    pub position_count: u32,
    pub open_position_count: u32,
    pub closed_position_count: u32,
    pub open_positions: Vec<PositionId>,
    pub counters: EventCounters,
}

impl Account {
    pub fn new(id: Address) -> Self {
        Account {
            id,
            position_count: 0,
            open_position_count: 0,
            closed_position_count: 0,
            open_positions: Vec::new(),
            counters: EventCounters::default(),
        }
    }

    /// Membership/count agreement between the open list and its counter.
    pub fn open_list_consistent(&self) -> bool {
        self.open_positions.len() == self.open_position_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_consistent() {
        let account = Account::new(Address::zero());
        assert!(account.open_list_consistent());
        assert_eq!(account.position_count, 0);
    }
}
