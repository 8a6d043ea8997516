//! App: terminal init, main loop, tick and key handling.

use crate::audio::{self, Audio, BellMode};
use crate::config::GameConfig;
use crate::effects::{Particles, RowFlash};
use crate::game::{Command, GameEvent, GameState};
use crate::input::{Action, HeldTracker, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Render budget per frame (~60 fps).
const FRAME: Duration = Duration::from_millis(16);

/// Front-end switches that never reach the game core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppOptions {
    pub effects: bool,
    pub bell: BellMode,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            effects: true,
            bell: BellMode::Clears,
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    options: AppOptions,
    state: GameState,
    audio: Box<dyn Audio>,
    held: HeldTracker,
    particles: Particles,
    flash: RowFlash,
    paused: bool,
    last_tick: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, options: AppOptions) -> Result<Self> {
        let state = GameState::new(&config).context("invalid game configuration")?;
        let audio = audio::for_mode(options.bell);
        Ok(Self::from_parts(config, theme, options, state, audio))
    }

    fn from_parts(
        config: GameConfig,
        theme: Theme,
        options: AppOptions,
        state: GameState,
        audio: Box<dyn Audio>,
    ) -> Self {
        Self {
            config,
            theme,
            options,
            state,
            audio,
            held: HeldTracker::new(false),
            particles: Particles::default(),
            flash: RowFlash::default(),
            paused: false,
            last_tick: Instant::now(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
                supports_keyboard_enhancement,
            },
        };

        let release_events = supports_keyboard_enhancement().unwrap_or(false);
        if !release_events {
            eprintln!(
                "warning: terminal does not report key releases; held keys use the terminal's own repeat"
            );
        }
        self.held = HeldTracker::new(release_events);

        // Shrink the board to the terminal before the first frame.
        let (cols, rows) = size().context("querying terminal size")?;
        let (w, h) = ui::fit_board(cols, rows, self.config.width, self.config.height);
        if (w, h) != (self.config.width, self.config.height) {
            self.config.width = w;
            self.config.height = h;
            self.state = GameState::new(&self.config)?;
        }

        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
        if release_events {
            let _ = execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            );
        }

        let mut terminal =
            DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        self.last_tick = Instant::now();
        let result = self.run_loop(&mut terminal);

        // Restore
        if release_events {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let effects = self.options.effects;
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.state,
                    View {
                        theme: &self.theme,
                        paused: self.paused,
                        particles: effects.then_some(&self.particles),
                        flash: if effects { Some(&mut self.flash) } else { None },
                        now,
                    },
                )
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if self.handle_key(key, Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            let dt = now.saturating_duration_since(self.last_tick);
            self.last_tick = now;
            self.advance(dt, now);
        }
    }

    /// Apply one key event. Returns `true` when the player asked to quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let action = key_to_action(key);
        match key.kind {
            KeyEventKind::Release => {
                if let Some(direction) = action.direction() {
                    self.held.release(direction);
                }
                return false;
            }
            KeyEventKind::Repeat => {
                if let Some(direction) = action.direction() {
                    self.held.refresh(direction, now);
                }
                return false;
            }
            KeyEventKind::Press => {}
        }

        match action {
            Action::Quit => return true,
            Action::Pause => {
                if !self.state.is_game_over() {
                    self.paused = !self.paused;
                    self.held.clear();
                }
            }
            _ if self.paused => {}
            action => {
                // OS auto-repeat of a key we already track as held.
                if let Some(direction) = action.direction() {
                    if !self.held.press(direction, now) {
                        return false;
                    }
                }
                if let Some(command) = action.command() {
                    self.state.press(command);
                    if command == Command::Restart {
                        self.particles.clear();
                        self.flash.clear();
                    }
                }
            }
        }
        self.dispatch_events();
        false
    }

    fn advance(&mut self, dt: Duration, now: Instant) {
        self.held.expire(now);
        if !self.paused {
            self.state.tick(dt, &self.held);
            self.particles.update(dt);
        }
        self.dispatch_events();
    }

    /// Forward core events to audio and effects.
    fn dispatch_events(&mut self) {
        let mut cleared_rows = Vec::new();
        for event in self.state.take_events() {
            match event {
                GameEvent::Locked => self.audio.on_lock(),
                GameEvent::RowCleared(row) => {
                    if self.options.effects {
                        self.particles.burst(&row);
                        cleared_rows.push(row.row);
                    }
                }
                GameEvent::LinesCleared(n) => self.audio.on_lines_cleared(n),
            }
        }
        if !cleared_rows.is_empty() {
            self.flash.start(cleared_rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::piece::{ColorId, FixedSequence, PieceKind};
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Audio for Recorder {
        fn on_lock(&mut self) {
            self.0.borrow_mut().push("lock".into());
        }
        fn on_lines_cleared(&mut self, lines: u32) {
            self.0.borrow_mut().push(format!("clear {lines}"));
        }
    }

    fn app(kinds: &[PieceKind]) -> (App, Recorder) {
        let config = GameConfig::default();
        let state =
            GameState::with_source(&config, Box::new(FixedSequence::new(kinds))).unwrap();
        let recorder = Recorder::default();
        let app = App::from_parts(
            config,
            Theme::arcade(),
            AppOptions::default(),
            state,
            Box::new(recorder.clone()),
        );
        (app, recorder)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let (mut app, _) = app(&[PieceKind::O]);
        let now = Instant::now();
        assert!(!app.handle_key(press(KeyCode::Left), now));
        assert!(app.handle_key(press(KeyCode::Char('q')), now));
        assert!(app.handle_key(press(KeyCode::Esc), now));
    }

    #[test]
    fn pause_freezes_gravity_and_input() {
        let (mut app, _) = app(&[PieceKind::O]);
        let now = Instant::now();
        app.handle_key(press(KeyCode::Char('p')), now);
        assert!(app.is_paused());

        app.advance(Duration::from_secs(5), now);
        app.handle_key(press(KeyCode::Left), now);
        assert_eq!((app.state().active().x(), app.state().active().y()), (4, 0));

        app.handle_key(press(KeyCode::Char('p')), now);
        assert!(!app.is_paused());
        app.advance(Duration::from_millis(500), now);
        assert_eq!(app.state().active().y(), 1);
    }

    #[test]
    fn lock_and_clear_reach_audio_and_effects() {
        let (mut app, recorder) = app(&[PieceKind::O]);
        for x in (0..10).filter(|x| !(4..6).contains(x)) {
            app.state.board_mut().set(x, 19, Cell::Filled(ColorId(3)));
        }
        app.handle_key(press(KeyCode::Char(' ')), Instant::now());

        assert_eq!(*recorder.0.borrow(), ["lock", "clear 1"]);
        assert_eq!(app.particles.len(), 10 * crate::effects::PARTICLES_PER_CELL);
        assert!(app.flash.is_active());
        assert_eq!(app.state().score(), 100);
    }

    #[test]
    fn restart_drops_leftover_effects() {
        let (mut app, _) = app(&[PieceKind::O]);
        for x in (0..10).filter(|x| !(4..6).contains(x)) {
            app.state.board_mut().set(x, 19, Cell::Filled(ColorId(3)));
        }
        let now = Instant::now();
        app.handle_key(press(KeyCode::Char(' ')), now);
        app.handle_key(press(KeyCode::Enter), now);
        assert!(app.particles.is_empty());
        assert!(!app.flash.is_active());
        assert_eq!(app.state().score(), 0);
    }

    #[test]
    fn held_key_repeat_presses_are_not_redispatched() {
        let (mut app, _) = app(&[PieceKind::O]);
        app.held = HeldTracker::new(true);
        let now = Instant::now();
        app.handle_key(press(KeyCode::Left), now);
        app.handle_key(press(KeyCode::Left), now + Duration::from_millis(30));
        assert_eq!(app.state().active().x(), 3);

        let release =
            KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        app.handle_key(release, now + Duration::from_millis(40));
        app.handle_key(press(KeyCode::Left), now + Duration::from_millis(50));
        assert_eq!(app.state().active().x(), 2);
    }

    #[test]
    fn held_key_auto_repeats_through_the_core() {
        let (mut app, _) = app(&[PieceKind::O]);
        app.held = HeldTracker::new(true);
        let now = Instant::now();
        app.handle_key(press(KeyCode::Right), now);
        assert_eq!(app.state().active().x(), 5);
        // 100 ms repeat delay, then one step per 50 ms.
        app.advance(Duration::from_millis(100), now);
        app.advance(Duration::from_millis(50), now);
        app.advance(Duration::from_millis(50), now);
        assert_eq!(app.state().active().x(), 7);
    }
}
