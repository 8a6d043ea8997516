//! The falling piece and its moves against the board.

use crate::board::{Board, is_valid_placement};
use crate::piece::{ColorId, NextPiece, PieceKind, Shape};

/// Current piece. `(x, y)` is the top-left of the shape's bounding box in board cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    shape: Shape,
    x: i32,
    y: i32,
}

impl ActivePiece {
    /// Top-centre spawn: `x = width/2 - shape_width/2`, `y = 0`.
    pub fn spawn(next: NextPiece, board_width: usize) -> Self {
        let x = (board_width / 2) as i32 - (next.shape.width() / 2) as i32;
        Self {
            kind: next.kind,
            shape: next.shape,
            x,
            y: 0,
        }
    }

    pub fn at(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            x,
            y,
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub fn color(&self) -> ColorId {
        self.kind.color()
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Absolute board coordinates of every occupied sub-cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.cells().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn fits(&self, board: &Board) -> bool {
        is_valid_placement(board, &self.shape, self.x, self.y)
    }

    /// Pure query: would the piece fit after shifting by `(dx, dy)`?
    pub fn can_move(&self, board: &Board, dx: i32, dy: i32) -> bool {
        is_valid_placement(board, &self.shape, self.x + dx, self.y + dy)
    }

    pub fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if !self.can_move(board, dx, dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    /// Clockwise rotation in place. No kicks: if the rotated shape does not fit at
    /// the current origin the piece is left exactly as it was.
    pub fn try_rotate(&mut self, board: &Board) -> bool {
        let rotated = self.shape.rotated_cw();
        if !is_valid_placement(board, &rotated, self.x, self.y) {
            return false;
        }
        self.shape = rotated;
        true
    }
}
