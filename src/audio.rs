//! Sound notifications. The only backend is the terminal bell.

use clap::ValueEnum;
use crossterm::{execute, style::Print};
use std::io::Write;

/// Receives gameplay sound cues. Fire-and-forget: failures are swallowed.
pub trait Audio {
    fn on_lock(&mut self);
    fn on_lines_cleared(&mut self, lines: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BellMode {
    Off,
    /// Ring when rows clear.
    #[default]
    Clears,
    /// Ring on every lock and clear.
    All,
}

/// Rings BEL on `out`.
#[derive(Debug)]
pub struct Bell<W: Write> {
    out: W,
    on_lock: bool,
}

impl<W: Write> Bell<W> {
    pub fn new(out: W, on_lock: bool) -> Self {
        Self { out, on_lock }
    }

    fn ring(&mut self) {
        let _ = execute!(self.out, Print('\u{7}'));
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Audio for Bell<W> {
    fn on_lock(&mut self) {
        if self.on_lock {
            self.ring();
        }
    }

    fn on_lines_cleared(&mut self, lines: u32) {
        if lines > 0 {
            self.ring();
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mute;

impl Audio for Mute {
    fn on_lock(&mut self) {}
    fn on_lines_cleared(&mut self, _lines: u32) {}
}

/// Build the audio backend for `mode`, ringing on stdout.
pub fn for_mode(mode: BellMode) -> Box<dyn Audio> {
    match mode {
        BellMode::Off => Box::new(Mute),
        BellMode::Clears => Box::new(Bell::new(std::io::stdout(), false)),
        BellMode::All => Box::new(Bell::new(std::io::stdout(), true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_mode_rings_only_on_clears() {
        let mut bell = Bell::new(Vec::new(), false);
        bell.on_lock();
        bell.on_lines_cleared(0);
        assert!(bell.out.is_empty());
        bell.on_lines_cleared(2);
        assert_eq!(bell.into_inner(), b"\x07");
    }

    #[test]
    fn all_mode_rings_on_lock_too() {
        let mut bell = Bell::new(Vec::new(), true);
        bell.on_lock();
        bell.on_lines_cleared(1);
        assert_eq!(bell.into_inner(), b"\x07\x07");
    }
}
