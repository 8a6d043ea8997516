//! Game state: board, active and next piece, score, and the fall/lock state machine.
//!
//! Everything here is driven synchronously by the caller: discrete inputs go through
//! [`GameState::press`], elapsed frame time through [`GameState::tick`]. Effects and
//! audio learn about locks and clears by draining [`GameState::take_events`].

use crate::active::ActivePiece;
use crate::board::{Board, ClearedRow};
use crate::config::{ConfigError, GameConfig};
use crate::lock::lock;
use crate::piece::{NextPiece, PieceSource, UniformSource};
use crate::repeat::{Direction, HeldKeys, KeyRepeat};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Falling,
    /// Grounded; the lock countdown is running.
    Locking,
    /// A freshly spawned piece overlapped the stack. Only a restart leaves this.
    GameOver,
}

/// Discrete player inputs. Left, right and soft drop also arm auto-repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Restart,
}

/// Fire-and-forget notifications for audio and effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Locked,
    /// One per cleared row, carrying the colours it held before it was erased.
    RowCleared(ClearedRow),
    LinesCleared(u32),
}

#[derive(Debug)]
pub struct GameState {
    board: Board,
    active: ActivePiece,
    next: NextPiece,
    source: Box<dyn PieceSource>,
    score: u32,
    lines: u32,
    phase: Phase,
    fall_interval: Duration,
    lock_delay: Duration,
    fall_elapsed: Duration,
    lock_elapsed: Duration,
    repeat: KeyRepeat,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Uniform random pieces, seeded from `config.seed` if set.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, Box::new(UniformSource::new(config.seed)))
    }

    pub fn with_source(
        config: &GameConfig,
        mut source: Box<dyn PieceSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.width as usize, config.height as usize);
        let first = source.random_piece();
        let next = source.random_piece();
        let active = ActivePiece::spawn(first, board.width());
        let phase = if active.fits(&board) {
            Phase::Falling
        } else {
            Phase::GameOver
        };
        Ok(Self {
            board,
            active,
            next,
            source,
            score: 0,
            lines: 0,
            phase,
            fall_interval: config.fall_interval,
            lock_delay: config.lock_delay,
            fall_elapsed: Duration::ZERO,
            lock_elapsed: Duration::ZERO,
            repeat: KeyRepeat::new(config.repeat_delay, config.repeat_interval),
            events: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setting up positions.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> &ActivePiece {
        &self.active
    }

    pub fn next(&self) -> &NextPiece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Rows cleared since the last reset.
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn lock_elapsed(&self) -> Duration {
        self.lock_elapsed
    }

    pub fn repeat(&self) -> &KeyRepeat {
        &self.repeat
    }

    /// Can the active piece still descend?
    pub fn is_grounded(&self) -> bool {
        !self.active.can_move(&self.board, 0, 1)
    }

    /// Fresh board, score and timers; promotes a new preview and spawns.
    pub fn reset(&mut self) {
        self.board.clear();
        self.score = 0;
        self.lines = 0;
        self.fall_elapsed = Duration::ZERO;
        self.lock_elapsed = Duration::ZERO;
        self.repeat.clear();
        self.events.clear();
        self.next = self.source.random_piece();
        self.spawn_next();
    }

    /// Shift the active piece. A successful move restarts the lock countdown but
    /// leaves the phase alone; the next tick decides whether it is still grounded.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.is_game_over() || !self.active.try_move(&self.board, dx, dy) {
            return false;
        }
        self.lock_elapsed = Duration::ZERO;
        true
    }

    /// Clockwise rotation without kicks.
    pub fn try_rotate(&mut self) -> bool {
        if self.is_game_over() || !self.active.try_rotate(&self.board) {
            return false;
        }
        self.lock_elapsed = Duration::ZERO;
        true
    }

    /// Fall as far as possible and lock immediately.
    pub fn hard_drop(&mut self) {
        if self.is_game_over() {
            return;
        }
        while self.try_move(0, 1) {}
        self.lock_active();
    }

    /// Key-down for one command. After game over only `Restart` does anything.
    pub fn press(&mut self, command: Command) {
        match command {
            Command::Restart => self.reset(),
            _ if self.is_game_over() => {}
            Command::MoveLeft => {
                self.try_move(-1, 0);
                self.repeat.arm(Direction::Left);
            }
            Command::MoveRight => {
                self.try_move(1, 0);
                self.repeat.arm(Direction::Right);
            }
            Command::SoftDrop => {
                if self.try_move(0, 1) {
                    self.repeat.arm(Direction::Down);
                }
            }
            Command::Rotate => {
                self.try_rotate();
            }
            Command::HardDrop => self.hard_drop(),
        }
    }

    /// Advance the clock by `dt`: auto-repeat first, then gravity or the lock countdown.
    pub fn tick(&mut self, dt: Duration, keys: &impl HeldKeys) {
        if self.is_game_over() {
            return;
        }
        if let Some(key) = self.repeat.advance(dt, keys) {
            self.repeat_move(key);
        }

        self.fall_elapsed += dt;
        match self.phase {
            Phase::Falling => {
                if self.fall_elapsed >= self.fall_interval {
                    self.fall_elapsed = Duration::ZERO;
                    if self.is_grounded() {
                        self.start_locking();
                    } else {
                        self.try_move(0, 1);
                    }
                }
            }
            Phase::Locking => {
                if self.is_grounded() {
                    self.lock_elapsed += dt;
                    if self.lock_elapsed >= self.lock_delay {
                        self.lock_active();
                    }
                } else {
                    self.phase = Phase::Falling;
                    self.lock_elapsed = Duration::ZERO;
                }
            }
            Phase::GameOver => {}
        }
    }

    /// Events since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn repeat_move(&mut self, key: Direction) {
        let (dx, dy) = key.offset();
        let moved = self.try_move(dx, dy);
        // A blocked down-repeat grounds the piece exactly like a gravity tick would.
        if !moved && key == Direction::Down && self.phase == Phase::Falling {
            self.start_locking();
        }
    }

    fn start_locking(&mut self) {
        self.phase = Phase::Locking;
        self.lock_elapsed = Duration::ZERO;
    }

    fn lock_active(&mut self) {
        let outcome = lock(&mut self.board, &self.active);
        self.events.push(GameEvent::Locked);
        let lines = outcome.lines_cleared;
        self.events
            .extend(outcome.cleared.into_iter().map(GameEvent::RowCleared));
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
        }
        self.score = self.score.saturating_add(outcome.score_delta);
        self.lines = self.lines.saturating_add(lines);
        self.spawn_next();
    }

    /// Promote the preview, refill it, and check the spawn.
    fn spawn_next(&mut self) {
        let incoming = std::mem::replace(&mut self.next, self.source.random_piece());
        self.active = ActivePiece::spawn(incoming, self.board.width());
        self.lock_elapsed = Duration::ZERO;
        self.phase = if self.active.fits(&self.board) {
            Phase::Falling
        } else {
            Phase::GameOver
        };
    }
}
