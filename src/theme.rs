//! Theme loading: btop-style `theme[key]="value"` files and hex → ratatui Color.

use crate::piece::ColorId;
use clap::ValueEnum;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme keys for the seven piece colours, in `ColorId` order.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_o", "piece_t", "piece_l", "piece_j", "piece_s", "piece_z",
];

/// Classic arcade colours: cyan, yellow, magenta, orange, blue, green, red.
const ARCADE: [Color; 7] = [
    Color::Rgb(0, 255, 255),
    Color::Rgb(255, 255, 0),
    Color::Rgb(255, 0, 255),
    Color::Rgb(255, 165, 0),
    Color::Rgb(0, 0, 255),
    Color::Rgb(0, 255, 0),
    Color::Rgb(255, 0, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Piece colours indexed by `ColorId`.
    pub pieces: [Color; 7],
    /// Board background.
    pub bg: Color,
    /// Empty-cell grid dots and borders.
    pub grid: Color,
    /// Score, lines, hints.
    pub text: Color,
    /// Titles and labels.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::arcade()
    }
}

impl Theme {
    pub fn arcade() -> Self {
        Self {
            pieces: ARCADE,
            bg: Color::Rgb(0, 0, 0),
            grid: Color::Rgb(40, 40, 40),
            text: Color::Rgb(255, 255, 255),
            title: Color::Rgb(255, 255, 0),
        }
    }

    /// Load from a btop-style file; `None` means built-in colours.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))?
            }
            None => Self::arcade(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Palettes only replace piece colours; background and text come from the theme.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                ];
            }
            Palette::Colorblind => {
                // Paul Tol's bright scheme plus grey; no red/green pair carries meaning alone.
                self.pieces = [
                    Color::Rgb(0x33, 0xBB, 0xEE),
                    Color::Rgb(0xCC, 0xBB, 0x44),
                    Color::Rgb(0xAA, 0x33, 0x77),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xBB, 0xBB, 0xBB),
                ];
            }
        }
    }

    /// Missing keys keep the built-in colour; malformed values are an error.
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::arcade();
        for (slot, key) in theme.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        for (key, slot) in [
            ("bg", &mut theme.bg),
            ("grid", &mut theme.grid),
            ("text", &mut theme.text),
            ("title", &mut theme.title),
        ] {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        Ok(theme)
    }

    #[inline]
    pub fn piece_color(&self, id: ColorId) -> Color {
        self.pieces[id.0 as usize % self.pieces.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_long_and_short() {
        assert_eq!(parse_hex("#FFA500").unwrap(), Color::Rgb(255, 165, 0));
        assert_eq!(parse_hex("#fff").unwrap(), Color::Rgb(255, 255, 255));
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn parse_theme_lines() {
        let map = parse_theme_file(
            "# comment\ntheme[bg]=\"#101010\"\ntheme[piece_t] = '#800080'\nnonsense\n",
        );
        assert_eq!(map.get("bg").map(String::as_str), Some("#101010"));
        assert_eq!(map.get("piece_t").map(String::as_str), Some("#800080"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn theme_file_overrides_only_given_keys() {
        let map = parse_theme_file("theme[piece_z]=\"#AA0000\"\ntheme[text]=\"#CCCCCC\"");
        let theme = Theme::from_map(&map).unwrap();
        assert_eq!(theme.piece_color(ColorId(6)), Color::Rgb(0xAA, 0, 0));
        assert_eq!(theme.text, Color::Rgb(0xCC, 0xCC, 0xCC));
        assert_eq!(theme.piece_color(ColorId(0)), ARCADE[0]);
    }

    #[test]
    fn bad_value_in_theme_file_is_an_error() {
        let map = parse_theme_file("theme[bg]=\"#nothex\"");
        assert!(Theme::from_map(&map).is_err());
    }

    #[test]
    fn palette_replaces_piece_colours_only() {
        let mut theme = Theme::arcade();
        theme.apply_palette(Palette::Colorblind);
        assert_ne!(theme.pieces, ARCADE);
        assert_eq!(theme.bg, Theme::arcade().bg);
    }
}
