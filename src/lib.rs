//! Blockfall: classic falling-block puzzle game in the terminal.
//!
//! The game core (`board`, `piece`, `active`, `lock`, `repeat`, `game`) is pure and
//! clock-free: the front end feeds it commands and elapsed time and drains its events.

pub mod active;
pub mod app;
pub mod audio;
pub mod board;
pub mod config;
pub mod effects;
pub mod game;
pub mod input;
pub mod lock;
pub mod piece;
pub mod repeat;
pub mod theme;
pub mod ui;

pub use active::ActivePiece;
pub use board::{Board, Cell, ClearedRow, is_valid_placement};
pub use config::{ConfigError, GameConfig};
pub use game::{Command, GameEvent, GameState, Phase};
pub use lock::{LockOutcome, POINTS_PER_LINE, lock};
pub use piece::{ColorId, FixedSequence, NextPiece, PieceKind, PieceSource, Shape, UniformSource};
pub use repeat::{Direction, HeldKeys, KeyRepeat, RepeatState};
