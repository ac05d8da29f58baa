//! Fixed-shape m×n grid, one byte per cell.
//!
//! Cell `(x, y)` lives at byte `y * m + x`, with `0 <= x < m` and
//! `0 <= y < n`.

use soroban_sdk::{contracttype, Bytes, Env, Vec};

use crate::types::{Cell, MAX_BOARD_CELLS};
use crate::DmnkError;

const CELL_EMPTY: u8 = 0;
const CELL_GOUGED: u8 = 1;
const CELL_INITIATOR: u8 = 2;
const CELL_FOLLOWER: u8 = 3;

/// Owner of a placed mark.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mark {
    Initiator,
    Follower,
}

impl Mark {
    fn code(self) -> u8 {
        match self {
            Mark::Initiator => CELL_INITIATOR,
            Mark::Follower => CELL_FOLLOWER,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CellState {
    Empty,
    Gouged,
    Marked(Mark),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    pub m: u32,
    pub n: u32,
    pub gouged: u32,
    pub cells: Bytes,
}

impl Board {
    /// Build an empty board with the given cells blocked.
    ///
    /// Rejects empty or oversized dimensions, gouged cells outside the
    /// board, duplicates, and lists that would leave nothing to play on.
    pub fn new(env: &Env, m: u32, n: u32, gouged: &Vec<Cell>) -> Result<Board, DmnkError> {
        let total = m.checked_mul(n).ok_or(DmnkError::InvalidBoardSize)?;
        if total == 0 || total > MAX_BOARD_CELLS {
            return Err(DmnkError::InvalidBoardSize);
        }
        let mut cells = Bytes::new(env);
        for _ in 0..total {
            cells.push_back(CELL_EMPTY);
        }

        let mut board = Board {
            m,
            n,
            gouged: 0,
            cells,
        };

        for cell in gouged.iter() {
            let idx = board
                .index(cell.x, cell.y)
                .ok_or(DmnkError::InvalidGougedCell)?;
            if board.cells.get(idx) != Some(CELL_EMPTY) {
                return Err(DmnkError::InvalidGougedCell);
            }
            board.cells.set(idx, CELL_GOUGED);
            board.gouged += 1;
        }

        if board.gouged >= total {
            return Err(DmnkError::BoardFullyGouged);
        }
        Ok(board)
    }

    pub fn is_valid_coordinate(&self, x: u32, y: u32) -> bool {
        x < self.m && y < self.n
    }

    pub fn is_free(&self, x: u32, y: u32) -> bool {
        self.cell(x, y) == Some(CellState::Empty)
    }

    /// `None` when `(x, y)` is off the board.
    pub fn cell(&self, x: u32, y: u32) -> Option<CellState> {
        let idx = self.index(x, y)?;
        match self.cells.get(idx)? {
            CELL_EMPTY => Some(CellState::Empty),
            CELL_GOUGED => Some(CellState::Gouged),
            CELL_INITIATOR => Some(CellState::Marked(Mark::Initiator)),
            CELL_FOLLOWER => Some(CellState::Marked(Mark::Follower)),
            _ => None,
        }
    }

    pub fn mark_at(&self, x: u32, y: u32) -> Option<Mark> {
        match self.cell(x, y)? {
            CellState::Marked(mark) => Some(mark),
            _ => None,
        }
    }

    /// Record a mark. The caller checks `is_free` first.
    pub fn place(&mut self, x: u32, y: u32, mark: Mark) {
        if let Some(idx) = self.index(x, y) {
            self.cells.set(idx, mark.code());
        }
    }

    /// Cells that can ever hold a mark.
    pub fn playable_cells(&self) -> u32 {
        self.m * self.n - self.gouged
    }

    fn index(&self, x: u32, y: u32) -> Option<u32> {
        if self.is_valid_coordinate(x, y) {
            Some(y * self.m + x)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::vec;

    #[test]
    fn empty_board_is_all_free() {
        let env = Env::default();
        let board = Board::new(&env, 4, 3, &Vec::new(&env)).unwrap();
        assert_eq!(board.cells.len(), 12);
        assert_eq!(board.playable_cells(), 12);
        for x in 0..4 {
            for y in 0..3 {
                assert!(board.is_free(x, y));
            }
        }
        assert!(!board.is_valid_coordinate(4, 0));
        assert!(!board.is_valid_coordinate(0, 3));
        assert!(!board.is_free(4, 0));
        assert_eq!(board.cell(0, 3), None);
    }

    #[test]
    fn gouged_cells_are_blocked() {
        let env = Env::default();
        let gouged = vec![&env, Cell { x: 1, y: 1 }, Cell { x: 2, y: 0 }];
        let board = Board::new(&env, 3, 3, &gouged).unwrap();
        assert_eq!(board.playable_cells(), 7);
        assert_eq!(board.cell(1, 1), Some(CellState::Gouged));
        assert_eq!(board.cell(2, 0), Some(CellState::Gouged));
        assert!(!board.is_free(1, 1));
        assert_eq!(board.mark_at(1, 1), None);
    }

    #[test]
    fn gouged_out_of_bounds_rejected() {
        let env = Env::default();
        let gouged = vec![&env, Cell { x: 3, y: 0 }];
        assert_eq!(
            Board::new(&env, 3, 3, &gouged),
            Err(DmnkError::InvalidGougedCell)
        );
    }

    #[test]
    fn gouged_duplicate_rejected() {
        let env = Env::default();
        let gouged = vec![&env, Cell { x: 0, y: 2 }, Cell { x: 0, y: 2 }];
        assert_eq!(
            Board::new(&env, 3, 3, &gouged),
            Err(DmnkError::InvalidGougedCell)
        );
    }

    #[test]
    fn bad_dimensions_rejected_without_overflow() {
        let env = Env::default();
        let none = Vec::new(&env);
        assert_eq!(Board::new(&env, 0, 5, &none), Err(DmnkError::InvalidBoardSize));
        assert_eq!(Board::new(&env, 33, 32, &none), Err(DmnkError::InvalidBoardSize));
        assert_eq!(
            Board::new(&env, u32::MAX, 2, &none),
            Err(DmnkError::InvalidBoardSize)
        );
    }

    #[test]
    fn fully_gouged_board_rejected() {
        let env = Env::default();
        let gouged = vec![&env, Cell { x: 0, y: 0 }];
        assert_eq!(
            Board::new(&env, 1, 1, &gouged),
            Err(DmnkError::BoardFullyGouged)
        );
    }

    #[test]
    fn place_records_owner() {
        let env = Env::default();
        let mut board = Board::new(&env, 2, 2, &Vec::new(&env)).unwrap();
        board.place(1, 0, Mark::Initiator);
        board.place(0, 1, Mark::Follower);
        assert_eq!(board.mark_at(1, 0), Some(Mark::Initiator));
        assert_eq!(board.mark_at(0, 1), Some(Mark::Follower));
        assert_eq!(board.mark_at(0, 0), None);
        assert!(!board.is_free(1, 0));
        assert!(board.is_free(1, 1));
        // x and y are not interchangeable
        assert_eq!(board.cell(0, 1), Some(CellState::Marked(Mark::Follower)));
        assert_eq!(board.cell(1, 0), Some(CellState::Marked(Mark::Initiator)));
    }
}
