//! FIFO matchmaking queue for `play`.
//!
//! A queued bid names the amount deposited and the range of stakes the
//! player accepts. Two bids pair when each amount lies in the other's
//! range; the game's stake is the smaller amount. The queue holds at most
//! `MAX_QUEUE_LEN` bids, which also bounds the matching scan.

use soroban_sdk::{contracttype, Address, Vec};

use crate::DmnkError;

pub const MAX_QUEUE_LEN: u32 = 50;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueuedBid {
    /// Pays the bid and receives payouts.
    pub player: Address,
    /// Signs moves once the bid is matched.
    pub operator: Address,
    pub amount: i128,
    pub min_bid: i128,
    pub max_bid: i128,
}

impl QueuedBid {
    pub fn accepts(&self, amount: i128) -> bool {
        self.min_bid <= amount && amount <= self.max_bid
    }

    pub fn compatible_with(&self, other: &QueuedBid) -> bool {
        !self.shares_address_with(other) && self.accepts(other.amount) && other.accepts(self.amount)
    }

    fn shares_address_with(&self, other: &QueuedBid) -> bool {
        let mine = [&self.player, &self.operator];
        mine.contains(&&other.player) || mine.contains(&&other.operator)
    }
}

pub fn validate_bid(amount: i128, min_bid: i128, max_bid: i128) -> Result<(), DmnkError> {
    if min_bid < 0 || min_bid > max_bid {
        return Err(DmnkError::InvalidBidRange);
    }
    if amount < min_bid || amount > max_bid {
        return Err(DmnkError::InvalidBid);
    }
    Ok(())
}

pub fn position_of(queue: &Vec<QueuedBid>, player: &Address) -> Option<u32> {
    queue.iter().position(|b| b.player == *player).map(|i| i as u32)
}

/// Index of the oldest queued bid that pairs with `bid`.
pub fn find_match(queue: &Vec<QueuedBid>, bid: &QueuedBid) -> Option<u32> {
    queue.iter().position(|b| b.compatible_with(bid)).map(|i| i as u32)
}
