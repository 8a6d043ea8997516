//! Line-clear visuals: a particle burst per cleared cell and a tachyonfx flash over the rows.

use crate::board::ClearedRow;
use crate::piece::ColorId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;
use std::collections::HashSet;
use std::f32::consts::TAU;
use std::time::{Duration, Instant};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

pub const PARTICLES_PER_CELL: usize = 20;
pub const PARTICLE_LIFETIME: Duration = Duration::from_secs(1);
/// Burst speed in board cells per second: 200 px/s over 30 px cells.
pub const PARTICLE_SPEED: f32 = 200.0 / 30.0;

/// Duration of the white flash over cleared rows.
const FLASH_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Board-cell coordinates; fractional.
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Seconds left.
    pub life: f32,
    pub color: ColorId,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when expired.
    pub fn alpha(&self) -> f32 {
        (self.life / PARTICLE_LIFETIME.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct Particles {
    rng: StdRng,
    live: Vec<Particle>,
}

impl Default for Particles {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl Particles {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            live: Vec::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Spawn a burst from the centre of every cell in `row`.
    pub fn burst(&mut self, row: &ClearedRow) {
        let y = row.row as f32 + 0.5;
        for &(col, color) in &row.cells {
            let x = col as f32 + 0.5;
            for _ in 0..PARTICLES_PER_CELL {
                let angle = self.rng.gen_range(0.0..TAU);
                let speed = self.rng.gen_range(0.5f32..1.0) * PARTICLE_SPEED;
                self.live.push(Particle {
                    x,
                    y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    life: PARTICLE_LIFETIME.as_secs_f32(),
                    color,
                });
            }
        }
    }

    pub fn update(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        for p in &mut self.live {
            p.x += p.vx * secs;
            p.y += p.vy * secs;
            p.life -= secs;
        }
        self.live.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// White flash fading out over the screen rows of the last clear.
#[derive(Default)]
pub struct RowFlash {
    rows: Vec<usize>,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl RowFlash {
    /// Restart the flash for `rows` (board row indices).
    pub fn start(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.rows = rows.into_iter().collect();
        self.effect = None;
        self.last_process = None;
    }

    pub fn is_active(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.effect = None;
        self.last_process = None;
    }

    /// Build the effect on first use, then advance it by wall time since the last frame.
    pub fn render(&mut self, frame: &mut Frame, board_rect: Rect, now: Instant) {
        if self.rows.is_empty() {
            return;
        }
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.last_process = Some(now);

        let effect = self.effect.get_or_insert_with(|| {
            let screen_rows: HashSet<u16> = self
                .rows
                .iter()
                .map(|&r| board_rect.y.saturating_add(r as u16))
                .collect();
            let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
                screen_rows.contains(&pos.y)
            }));
            fx::fade_from(Color::White, Color::White, (FLASH_MS, Interpolation::Linear))
                .with_filter(filter)
                .with_area(board_rect)
        });
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));

        if effect.done() {
            self.clear();
        }
    }
}
