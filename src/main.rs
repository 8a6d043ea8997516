//! Blockfall: classic falling-block puzzle game in the terminal.

use anyhow::Result;
use blockfall::app::{App, AppOptions};
use blockfall::audio::BellMode;
use blockfall::config::{
    DEFAULT_FALL_MS, DEFAULT_HEIGHT, DEFAULT_LOCK_DELAY_MS, DEFAULT_REPEAT_DELAY_MS,
    DEFAULT_REPEAT_INTERVAL_MS, DEFAULT_WIDTH, GameConfig,
};
use blockfall::theme::{Palette, Theme};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.game_config();
    config.validate()?;

    let theme = match Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(e) => {
            eprintln!("warning: could not load theme ({e}); using default colours");
            let mut theme = Theme::default();
            theme.apply_palette(args.palette);
            theme
        }
    };

    let options = AppOptions {
        effects: !args.no_effects,
        bell: args.bell,
    };
    let mut app = App::new(config, theme, options)?;
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Complete rows to clear them; 100 points per row.",
    long_about = "Blockfall is a terminal falling-block puzzle.\n\n\
        Steer the falling piece, rotate it, and lock it into the stack. Every completed row \
        is cleared for 100 points. The game ends when a new piece has no room to spawn.\n\n\
        CONTROLS:\n  Left/Right, h/l  Move        Up, k       Rotate\n  Down, j          Soft drop   Space       Hard drop\n  Enter, r         Restart     p           Pause\n  q, Esc           Quit\n\n\
        Hold a movement key to keep the piece moving. Use --theme to load a btop-style theme."
)]
struct Args {
    /// Board width in columns.
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS")]
    width: u16,

    /// Board height in rows.
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS")]
    height: u16,

    /// Gravity interval in ms: the piece drops one row this often.
    #[arg(long, default_value_t = DEFAULT_FALL_MS, value_name = "MS")]
    fall_ms: u64,

    /// Lock delay in ms: how long a grounded piece can still be moved before it locks.
    #[arg(long, default_value_t = DEFAULT_LOCK_DELAY_MS, value_name = "MS")]
    lock_delay_ms: u64,

    /// Delay in ms before a held movement key starts repeating.
    #[arg(long, default_value_t = DEFAULT_REPEAT_DELAY_MS, value_name = "MS")]
    repeat_delay_ms: u64,

    /// Interval in ms between repeats while a movement key is held.
    #[arg(long, default_value_t = DEFAULT_REPEAT_INTERVAL_MS, value_name = "MS")]
    repeat_interval_ms: u64,

    /// Seed for the piece generator (random if not set).
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Terminal bell: off, on row clears, or on every lock and clear.
    #[arg(long, value_enum, default_value_t = BellMode::Clears)]
    bell: BellMode,

    /// Disable line-clear particles and row flash.
    #[arg(long)]
    no_effects: bool,

    /// Path to theme file (btop-style theme[key]="value").
    #[arg(short, long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, value_enum, default_value_t = Palette::Normal)]
    palette: Palette,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            fall_interval: Duration::from_millis(self.fall_ms),
            lock_delay: Duration::from_millis(self.lock_delay_ms),
            repeat_delay: Duration::from_millis(self.repeat_delay_ms),
            repeat_interval: Duration::from_millis(self.repeat_interval_ms),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_game_defaults() {
        let args = Args::parse_from(["blockfall"]);
        assert_eq!(args.game_config(), GameConfig::default());
        assert_eq!(args.bell, BellMode::Clears);
        assert!(!args.no_effects);
    }

    #[test]
    fn flags_reach_the_config() {
        let args = Args::parse_from([
            "blockfall",
            "--width",
            "8",
            "--fall-ms",
            "250",
            "--seed",
            "9",
            "--bell",
            "all",
            "--palette",
            "colorblind",
        ]);
        let config = args.game_config();
        assert_eq!(config.width, 8);
        assert_eq!(config.fall_interval, Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
        assert_eq!(args.bell, BellMode::All);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
