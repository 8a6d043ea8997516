//! Held-key auto-repeat: an immediate move on key-down, then a delay, then a fixed
//! repeat interval for as long as the key stays held.

use std::time::Duration;

/// Logical directional keys that auto-repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Down];

    /// `(dx, dy)` in board cells.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }
}

/// "Is this key still down?" as seen by the input collaborator.
pub trait HeldKeys {
    fn is_held(&self, direction: Direction) -> bool;
}

/// Nothing is ever held.
impl HeldKeys for () {
    fn is_held(&self, _direction: Direction) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatState {
    Idle,
    /// Key is down; waiting out the repeat delay.
    Pending { key: Direction, held: Duration },
    /// Past the delay; fires every interval.
    Repeating { key: Direction, since_fire: Duration },
}

#[derive(Debug, Clone)]
pub struct KeyRepeat {
    state: RepeatState,
    delay: Duration,
    interval: Duration,
}

impl KeyRepeat {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            state: RepeatState::Idle,
            delay,
            interval,
        }
    }

    #[inline]
    pub fn state(&self) -> RepeatState {
        self.state
    }

    pub fn key(&self) -> Option<Direction> {
        match self.state {
            RepeatState::Idle => None,
            RepeatState::Pending { key, .. } | RepeatState::Repeating { key, .. } => Some(key),
        }
    }

    /// Start tracking `key` after its immediate move. Replaces any other key.
    pub fn arm(&mut self, key: Direction) {
        self.state = RepeatState::Pending {
            key,
            held: Duration::ZERO,
        };
    }

    pub fn clear(&mut self) {
        self.state = RepeatState::Idle;
    }

    /// Advance by `dt`. Returns the key to move once this tick, if any.
    pub fn advance(&mut self, dt: Duration, keys: &impl HeldKeys) -> Option<Direction> {
        let key = self.key()?;
        if !keys.is_held(key) {
            self.state = RepeatState::Idle;
            return None;
        }
        match self.state {
            RepeatState::Idle => None,
            RepeatState::Pending { key, held } => {
                let held = held + dt;
                self.state = if held >= self.delay {
                    RepeatState::Repeating {
                        key,
                        since_fire: Duration::ZERO,
                    }
                } else {
                    RepeatState::Pending { key, held }
                };
                None
            }
            RepeatState::Repeating { key, since_fire } => {
                let since_fire = since_fire + dt;
                if since_fire >= self.interval {
                    self.state = RepeatState::Repeating {
                        key,
                        since_fire: Duration::ZERO,
                    };
                    Some(key)
                } else {
                    self.state = RepeatState::Repeating { key, since_fire };
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Holding(Option<Direction>);

    impl HeldKeys for Holding {
        fn is_held(&self, direction: Direction) -> bool {
            self.0 == Some(direction)
        }
    }

    const MS: Duration = Duration::from_millis(1);

    fn repeat() -> KeyRepeat {
        KeyRepeat::new(100 * MS, 50 * MS)
    }

    #[test]
    fn idle_never_fires() {
        let mut r = repeat();
        assert_eq!(r.advance(500 * MS, &Holding(Some(Direction::Left))), None);
        assert_eq!(r.state(), RepeatState::Idle);
    }

    #[test]
    fn waits_out_delay_then_fires_each_interval() {
        let mut r = repeat();
        let held = Holding(Some(Direction::Left));
        r.arm(Direction::Left);

        assert_eq!(r.advance(60 * MS, &held), None);
        assert!(matches!(r.state(), RepeatState::Pending { .. }));
        // Crossing the delay switches to repeating without firing.
        assert_eq!(r.advance(40 * MS, &held), None);
        assert!(matches!(r.state(), RepeatState::Repeating { .. }));

        assert_eq!(r.advance(30 * MS, &held), None);
        assert_eq!(r.advance(20 * MS, &held), Some(Direction::Left));
        assert_eq!(r.advance(49 * MS, &held), None);
        assert_eq!(r.advance(MS, &held), Some(Direction::Left));
    }

    #[test]
    fn release_clears_immediately() {
        let mut r = repeat();
        r.arm(Direction::Right);
        r.advance(200 * MS, &Holding(Some(Direction::Right)));
        assert_eq!(r.advance(100 * MS, &Holding(None)), None);
        assert_eq!(r.state(), RepeatState::Idle);
        assert_eq!(r.advance(100 * MS, &Holding(Some(Direction::Right))), None);
    }

    #[test]
    fn newest_key_replaces_older() {
        let mut r = repeat();
        r.arm(Direction::Left);
        r.advance(200 * MS, &Holding(Some(Direction::Left)));
        r.arm(Direction::Down);
        assert_eq!(r.key(), Some(Direction::Down));
        assert!(matches!(
            r.state(),
            RepeatState::Pending { key: Direction::Down, held } if held == Duration::ZERO
        ));
    }

    #[test]
    fn unit_never_holds() {
        assert!(Direction::ALL.iter().all(|&d| !HeldKeys::is_held(&(), d)));
    }
}
