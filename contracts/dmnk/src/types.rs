use soroban_sdk::{contracttype, Address};

use crate::DmnkError;

/// Largest board (in cells) a single game entry may hold.
pub const MAX_BOARD_CELLS: u32 = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
//  Lifecycle
// ═══════════════════════════════════════════════════════════════════════════════

/// Game lifecycle.
///
/// ```text
/// Created ──join(initiator)──▶ Waiting ──join(follower)──▶ Running
///    │                            │                          │
///    └──────cancel_game───────────┴──▶ Aborted               ├──▶ Completed (k-run)
///                                                            └──▶ Exhausted (board full)
/// ```
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GameStatus {
    Created = 0,
    Waiting = 1,
    Running = 2,
    Completed = 3,
    Aborted = 4,
    Exhausted = 5,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Completed | GameStatus::Aborted | GameStatus::Exhausted
        )
    }

    /// Transition table. Anything not listed is illegal, including
    /// self-loops and every edge leaving a terminal state.
    pub fn can_transition_to(self, next: GameStatus) -> bool {
        matches!(
            (self, next),
            (GameStatus::Created, GameStatus::Waiting)
                | (GameStatus::Created, GameStatus::Aborted)
                | (GameStatus::Waiting, GameStatus::Running)
                | (GameStatus::Waiting, GameStatus::Aborted)
                | (GameStatus::Running, GameStatus::Completed)
                | (GameStatus::Running, GameStatus::Exhausted)
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Settings & board coordinates
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GameSettings {
    pub m: u32,
    pub n: u32,
    pub k: u32,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), DmnkError> {
        if self.m == 0 || self.n == 0 {
            return Err(DmnkError::InvalidBoardSize);
        }
        let cells = self
            .m
            .checked_mul(self.n)
            .ok_or(DmnkError::InvalidBoardSize)?;
        if cells > MAX_BOARD_CELLS {
            return Err(DmnkError::InvalidBoardSize);
        }
        if self.k == 0 || self.k > self.m || self.k > self.n {
            return Err(DmnkError::InvalidWinLength);
        }
        Ok(())
    }
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Move {
    pub x: u32,
    pub y: u32,
    pub player: Address,
}

/// Player slots. `follower` stays `None` until the second player joins.
///
/// `initiator` and `follower` fund the bids and receive payouts; the
/// matching `*_operator` addresses sign the moves. They are the same
/// address unless the player named a separate operator in `play`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Players {
    pub initiator: Address,
    pub follower: Option<Address>,
    pub initiator_operator: Address,
    pub follower_operator: Option<Address>,
}
