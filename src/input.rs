//! Key bindings (normal and vim-style) and held-key tracking for auto-repeat.

use crate::game::Command;
use crate::repeat::{Direction, HeldKeys};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// A held key with no press, repeat or release for this long is considered released.
pub const STALE_AFTER: Duration = Duration::from_millis(1000);

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Restart,
    Pause,
    Quit,
    None,
}

impl Action {
    /// The game command this action drives; `None` for app-level actions.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::MoveLeft => Some(Command::MoveLeft),
            Self::MoveRight => Some(Command::MoveRight),
            Self::SoftDrop => Some(Command::SoftDrop),
            Self::HardDrop => Some(Command::HardDrop),
            Self::Rotate => Some(Command::Rotate),
            Self::Restart => Some(Command::Restart),
            Self::Pause | Self::Quit | Self::None => None,
        }
    }

    /// Repeatable directional actions.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::MoveLeft => Some(Direction::Left),
            Self::MoveRight => Some(Direction::Right),
            Self::SoftDrop => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') if no_mod => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') if no_mod => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') if no_mod => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') if no_mod => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') if no_mod => Action::SoftDrop,
        KeyCode::Char(' ') if no_mod => Action::HardDrop,
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') if no_mod => Action::Restart,
        _ => Action::None,
    }
}

/// Which directional keys are down, built from terminal key events.
///
/// With release reporting (kitty keyboard protocol), a key is held from its press until its
/// release; OS auto-repeat presses only refresh it. Without release reporting nothing is ever
/// reported held, every OS auto-repeat press is dispatched, and the terminal's own repeat
/// drives movement.
#[derive(Debug, Clone)]
pub struct HeldTracker {
    release_events: bool,
    stale_after: Duration,
    /// Last press or repeat seen per direction; `None` when up.
    seen: [Option<Instant>; 3],
}

impl HeldTracker {
    pub fn new(release_events: bool) -> Self {
        Self {
            release_events,
            stale_after: STALE_AFTER,
            seen: [None; 3],
        }
    }

    #[inline]
    pub fn reports_releases(&self) -> bool {
        self.release_events
    }

    fn slot(direction: Direction) -> usize {
        match direction {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Down => 2,
        }
    }

    /// Record a key-down. Returns `true` when the press should be dispatched to the game,
    /// `false` for an auto-repeat press of a key that is already held.
    pub fn press(&mut self, direction: Direction, now: Instant) -> bool {
        if !self.release_events {
            return true;
        }
        let slot = &mut self.seen[Self::slot(direction)];
        let fresh = slot.is_none();
        *slot = Some(now);
        fresh
    }

    /// Terminal-level repeat event for a held key.
    pub fn refresh(&mut self, direction: Direction, now: Instant) {
        if self.release_events {
            self.seen[Self::slot(direction)] = Some(now);
        }
    }

    pub fn release(&mut self, direction: Direction) {
        self.seen[Self::slot(direction)] = None;
    }

    /// Drop keys whose release event never arrived.
    pub fn expire(&mut self, now: Instant) {
        for slot in &mut self.seen {
            if slot.is_some_and(|t| now.saturating_duration_since(t) >= self.stale_after) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.seen = [None; 3];
    }
}

impl HeldKeys for HeldTracker {
    fn is_held(&self, direction: Direction) -> bool {
        self.release_events && self.seen[Self::slot(direction)].is_some()
    }
}
