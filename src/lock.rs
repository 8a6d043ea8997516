//! Commit a piece to the board, clear full rows, score them.

use crate::active::ActivePiece;
use crate::board::{Board, ClearedRow};

/// Flat per-row score; clearing several rows at once earns no bonus.
pub const POINTS_PER_LINE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockOutcome {
    pub lines_cleared: u32,
    pub score_delta: u32,
    /// Bottom to top, captured before the rows were erased.
    pub cleared: Vec<ClearedRow>,
}

/// Writes `piece` into `board` and removes every row it completed.
pub fn lock(board: &mut Board, piece: &ActivePiece) -> LockOutcome {
    board.place(piece.shape(), piece.x(), piece.y(), piece.color());
    let cleared = board.clear_full_rows();
    let lines_cleared = cleared.len() as u32;
    LockOutcome {
        lines_cleared,
        score_delta: lines_cleared * POINTS_PER_LINE,
        cleared,
    }
}
