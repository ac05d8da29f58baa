//! Per-match state and its transitions.
//!
//! Every method validates completely before touching `self`, so a rejected
//! call leaves the game exactly as it was. Token movements are left to the
//! contract layer, which settles escrow in the same invocation.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::board::{Board, CellState, Mark};
use crate::types::{Cell, GameSettings, GameStatus, Move, Players};
use crate::win;
use crate::DmnkError;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub settings: GameSettings,
    pub board: Board,
    pub initiator: Address,
    pub follower: Option<Address>,
    /// Address that signs the initiator's moves.
    pub initiator_operator: Address,
    pub follower_operator: Option<Address>,
    pub initiator_joined: bool,
    /// Stake each player locks; fixed by the initiator's join.
    pub bid: i128,
    /// Escrow currently held for this game.
    pub locked: i128,
    pub moves: Vec<Move>,
    pub status: GameStatus,
    /// Funding address of the winning side.
    pub winner: Option<Address>,
}

/// Result of an accepted move.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MoveOutcome {
    Continue,
    Won,
    Exhausted,
}

impl Game {
    pub fn new(
        env: &Env,
        initiator: Address,
        settings: GameSettings,
        gouged: &Vec<Cell>,
    ) -> Result<Game, DmnkError> {
        settings.validate()?;
        let board = Board::new(env, settings.m, settings.n, gouged)?;
        Ok(Game {
            settings,
            board,
            initiator_operator: initiator.clone(),
            initiator,
            follower: None,
            follower_operator: None,
            initiator_joined: false,
            bid: 0,
            locked: 0,
            moves: Vec::new(env),
            status: GameStatus::Created,
            winner: None,
        })
    }

    pub fn players(&self) -> Players {
        Players {
            initiator: self.initiator.clone(),
            follower: self.follower.clone(),
            initiator_operator: self.initiator_operator.clone(),
            follower_operator: self.follower_operator.clone(),
        }
    }

    /// Players with a bid in escrow, initiator first.
    pub fn joined_players(&self, env: &Env) -> Vec<Address> {
        let mut joined = Vec::new(env);
        if self.initiator_joined {
            joined.push_back(self.initiator.clone());
        }
        if let Some(follower) = &self.follower {
            joined.push_back(follower.clone());
        }
        joined
    }

    /// Operator expected to sign the next move. The initiator moves on
    /// even move counts, the follower on odd ones.
    pub fn current_player(&self) -> Address {
        match (&self.follower_operator, self.moves.len() % 2) {
            (Some(operator), 1) => operator.clone(),
            _ => self.initiator_operator.clone(),
        }
    }

    fn mark_of(&self, operator: &Address) -> Result<Mark, DmnkError> {
        if *operator == self.initiator_operator {
            Ok(Mark::Initiator)
        } else if self.follower_operator.as_ref() == Some(operator) {
            Ok(Mark::Follower)
        } else {
            Err(DmnkError::NotAPlayer)
        }
    }

    fn funding_of(&self, mark: Mark) -> Option<Address> {
        match mark {
            Mark::Initiator => Some(self.initiator.clone()),
            Mark::Follower => self.follower.clone(),
        }
    }

    fn require_not_ended(&self) -> Result<(), DmnkError> {
        if self.status.is_terminal() {
            return Err(DmnkError::GameAlreadyEnded);
        }
        Ok(())
    }

    fn advance(&mut self, next: GameStatus) -> Result<(), DmnkError> {
        if !self.status.can_transition_to(next) {
            return Err(DmnkError::InvalidStatus);
        }
        self.status = next;
        Ok(())
    }

    /// Seat `player` and lock `bid` in the game's books. The player also
    /// signs its own moves.
    pub fn join(&mut self, player: &Address, bid: i128) -> Result<(), DmnkError> {
        self.join_with_operator(player, player, bid)
    }

    /// Seat `player` as the funding address and `operator` as the address
    /// that signs its moves.
    ///
    /// The initiator joins first (`Created → Waiting`) and fixes the bid;
    /// the second player must use addresses distinct from the initiator's
    /// and match the bid (`Waiting → Running`).
    pub fn join_with_operator(
        &mut self,
        player: &Address,
        operator: &Address,
        bid: i128,
    ) -> Result<(), DmnkError> {
        self.require_not_ended()?;
        if bid < 0 {
            return Err(DmnkError::InvalidBid);
        }

        match self.status {
            GameStatus::Created => {
                if *player != self.initiator {
                    return Err(DmnkError::InitiatorMustJoinFirst);
                }
                self.advance(GameStatus::Waiting)?;
                self.initiator_operator = operator.clone();
                self.initiator_joined = true;
                self.bid = bid;
                self.locked = bid;
            }
            GameStatus::Waiting => {
                let own = [&self.initiator, &self.initiator_operator];
                if own.contains(&player) || own.contains(&operator) {
                    return Err(DmnkError::SelfPlayNotAllowed);
                }
                if bid != self.bid {
                    return Err(DmnkError::BidMismatch);
                }
                let locked = self.locked.checked_add(bid).ok_or(DmnkError::InvalidBid)?;
                self.advance(GameStatus::Running)?;
                self.follower = Some(player.clone());
                self.follower_operator = Some(operator.clone());
                self.locked = locked;
            }
            _ => return Err(DmnkError::InvalidStatus),
        }
        Ok(())
    }

    /// Abort a game that has not started. Only the initiator may cancel.
    pub fn cancel(&mut self, caller: &Address) -> Result<(), DmnkError> {
        self.require_not_ended()?;
        if !self.status.can_transition_to(GameStatus::Aborted) {
            return Err(DmnkError::InvalidStatus);
        }
        if *caller != self.initiator {
            return Err(DmnkError::NotInitiator);
        }
        self.advance(GameStatus::Aborted)
    }

    /// Place the mark of the side `operator` plays for at `(x, y)` and
    /// evaluate the result.
    pub fn append_move(&mut self, operator: &Address, x: u32, y: u32) -> Result<MoveOutcome, DmnkError> {
        self.require_not_ended()?;
        if self.status != GameStatus::Running {
            return Err(DmnkError::InvalidStatus);
        }
        let mark = self.mark_of(operator)?;
        if *operator != self.current_player() {
            return Err(DmnkError::NotYourTurn);
        }
        if !self.board.is_free(x, y) {
            return Err(match self.board.cell(x, y) {
                None => DmnkError::OutOfBounds,
                Some(CellState::Gouged) => DmnkError::CellGouged,
                Some(_) => DmnkError::CellOccupied,
            });
        }

        self.board.place(x, y, mark);
        self.moves.push_back(Move {
            x,
            y,
            player: operator.clone(),
        });

        if win::is_winning_move(&self.board, x, y, mark, self.settings.k) {
            let winner = self.funding_of(mark).ok_or(DmnkError::NotAPlayer)?;
            self.advance(GameStatus::Completed)?;
            self.winner = Some(winner);
            return Ok(MoveOutcome::Won);
        }
        if self.moves.len() >= self.board.playable_cells() {
            self.advance(GameStatus::Exhausted)?;
            return Ok(MoveOutcome::Exhausted);
        }
        Ok(MoveOutcome::Continue)
    }
}
