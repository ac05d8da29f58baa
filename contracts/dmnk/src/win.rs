//! k-in-a-row detection around the most recent mark.

use crate::board::{Board, Mark};

/// Horizontal, vertical, diagonal, anti-diagonal.
const AXES: [(i64, i64); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Whether the mark just placed at `(x, y)` completes a run of `k`.
///
/// Runs are counted along each axis in both senses from the new mark.
/// Empty, gouged and off-board cells end a run.
pub fn is_winning_move(board: &Board, x: u32, y: u32, mark: Mark, k: u32) -> bool {
    if board.mark_at(x, y) != Some(mark) {
        return false;
    }
    AXES.iter().any(|&(dx, dy)| {
        let needed = k.saturating_sub(1);
        let forward = run_length(board, x, y, dx, dy, mark, needed);
        let backward = run_length(board, x, y, -dx, -dy, mark, needed - forward);
        1 + forward + backward >= k
    })
}

/// Count same-owner marks stepping from `(x, y)` by `(dx, dy)`, excluding
/// the origin, stopping after `limit`.
fn run_length(board: &Board, x: u32, y: u32, dx: i64, dy: i64, mark: Mark, limit: u32) -> u32 {
    let mut count = 0;
    let mut cx = x as i64 + dx;
    let mut cy = y as i64 + dy;
    while count < limit {
        if cx < 0 || cy < 0 {
            break;
        }
        if board.mark_at(cx as u32, cy as u32) != Some(mark) {
            break;
        }
        count += 1;
        cx += dx;
        cy += dy;
    }
    count
}
