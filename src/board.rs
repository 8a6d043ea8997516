//! Board: fixed grid of locked cells, placement checks, and row clearing.

use crate::piece::{ColorId, Shape};
use std::collections::VecDeque;

/// Single cell: either empty or holding the colour of the piece that filled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ColorId),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// A row removed by a clear pass, captured before it was erased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedRow {
    /// Index of the row on the board before the clear pass.
    pub row: usize,
    /// `(column, colour)` for every cell, left to right.
    pub cells: Vec<(usize, ColorId)>,
}

/// W×H grid. y=0 is the top (spawn) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x]; rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    /// Dimensions are validated by `GameConfig`; a zero here is a caller bug.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must be at least 1x1");
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Returns false (and does nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.rows.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| c.is_filled()))
    }

    pub fn has_full_row(&self) -> bool {
        (0..self.height).any(|y| self.is_row_full(y))
    }

    pub fn is_valid_placement(&self, shape: &Shape, x: i32, y: i32) -> bool {
        is_valid_placement(self, shape, x, y)
    }

    /// Writes `color` under every occupied sub-cell. Sub-cells above the board are
    /// skipped; the caller has already checked the placement.
    pub fn place(&mut self, shape: &Shape, x: i32, y: i32, color: ColorId) {
        for (dx, dy) in shape.cells() {
            let (cx, cy) = (x + dx, y + dy);
            if cy < 0 {
                continue;
            }
            self.set(cx, cy, Cell::Filled(color));
        }
    }

    /// Removes every full row in one pass and prepends one empty row per removal.
    /// Returned rows are ordered bottom to top.
    pub fn clear_full_rows(&mut self) -> Vec<ClearedRow> {
        let cleared: Vec<ClearedRow> = (0..self.height)
            .rev()
            .filter(|&y| self.is_row_full(y))
            .map(|y| ClearedRow {
                row: y,
                cells: self.rows[y]
                    .iter()
                    .enumerate()
                    .filter_map(|(x, cell)| match cell {
                        Cell::Filled(color) => Some((x, *color)),
                        Cell::Empty => None,
                    })
                    .collect(),
            })
            .collect();

        if cleared.is_empty() {
            return cleared;
        }
        self.rows.retain(|row| !row.iter().all(|c| c.is_filled()));
        for _ in 0..cleared.len() {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        cleared
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }
}

/// Collision check for `shape` with its top-left origin at `(x, y)`.
///
/// Invalid if any occupied sub-cell lands outside `[0, width)` horizontally, at or
/// below `height`, or on a filled cell. Sub-cells above the board (negative row) are
/// never checked against occupancy, but still must be inside the column range.
pub fn is_valid_placement(board: &Board, shape: &Shape, x: i32, y: i32) -> bool {
    let (w, h) = (board.width as i32, board.height as i32);
    shape.cells().all(|(dx, dy)| {
        let (cx, cy) = (x + dx, y + dy);
        if cx < 0 || cx >= w || cy >= h {
            return false;
        }
        cy < 0 || board.get(cx, cy) == Some(Cell::Empty)
    })
}
