//! Piece catalog: the seven shapes, their colours, and where new pieces come from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Colour tag stored in board cells: index into the theme's piece palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(pub u8);

/// Tetromino kinds (I, O, T, L, J, S, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::L, Self::J, Self::S, Self::Z];

    /// Spawn orientation, top row first.
    fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[1, 1, 1], &[0, 1, 0]],
            Self::L => &[&[1, 1, 1], &[1, 0, 0]],
            Self::J => &[&[1, 1, 1], &[0, 0, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
        }
    }

    pub fn shape(self) -> Shape {
        Shape::from_rows(self.rows())
    }

    /// Palette slot 0..7 (cyan, yellow, magenta, orange, blue, green, red).
    pub fn color(self) -> ColorId {
        let index = match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::L => 3,
            Self::J => 4,
            Self::S => 5,
            Self::Z => 6,
        };
        ColorId(index)
    }
}

/// Immutable occupancy matrix. Rotation builds a new matrix rather than indexing
/// a table of orientations, so non-square shapes swap width and height.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    height: usize,
    width: usize,
    /// Row-major, `height * width` entries.
    filled: Vec<bool>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let filled = rows
            .iter()
            .flat_map(|row| {
                debug_assert_eq!(row.len(), width, "ragged shape row");
                row.iter().map(|&v| v != 0)
            })
            .collect();
        Self {
            height,
            width,
            filled,
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

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.filled[row * self.width + col]
    }

    /// Offsets `(dx, dy)` of every occupied sub-cell relative to the top-left origin.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.filled
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
    }

    /// 90° clockwise: reverse the row order, then transpose.
    /// `new[r][c] = old[height - 1 - c][r]`.
    pub fn rotated_cw(&self) -> Self {
        let (old_h, old_w) = (self.height, self.width);
        let mut filled = Vec::with_capacity(self.filled.len());
        for r in 0..old_w {
            for c in 0..old_h {
                filled.push(self.filled[(old_h - 1 - c) * old_w + r]);
            }
        }
        Self {
            height: old_w,
            width: old_h,
            filled,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = (0..self.height)
            .map(|r| {
                (0..self.width)
                    .map(|c| if self.is_filled(r, c) { '#' } else { '.' })
                    .collect()
            })
            .collect();
        write!(f, "Shape[{}]", rows.join("/"))
    }
}

/// The piece waiting in the preview slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPiece {
    pub kind: PieceKind,
    pub shape: Shape,
}

impl NextPiece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
        }
    }

    pub fn color(&self) -> ColorId {
        self.kind.color()
    }
}

/// Where new pieces come from.
pub trait PieceSource: fmt::Debug {
    fn next_kind(&mut self) -> PieceKind;

    fn random_piece(&mut self) -> NextPiece {
        NextPiece::new(self.next_kind())
    }
}

/// Uniform i.i.d. choice among the seven kinds; no bag.
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: StdRng,
}

impl UniformSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl PieceSource for UniformSource {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

/// Cycles through a fixed list of kinds, forever.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    kinds: Vec<PieceKind>,
    pos: usize,
}

impl FixedSequence {
    /// Falls back to a lone `O` if `kinds` is empty.
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        let mut kinds = kinds.into();
        if kinds.is_empty() {
            kinds.push(PieceKind::O);
        }
        Self { kinds, pos: 0 }
    }
}

impl PieceSource for FixedSequence {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.pos % self.kinds.len()];
        self.pos = (self.pos + 1) % self.kinds.len();
        kind
    }
}
