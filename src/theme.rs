//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Tiles 2..=4096 get their own colour; anything larger uses `super_tile`.
pub const TILE_COLOURS: usize = 12;

const CLASSIC_TILES: [Color; TILE_COLOURS] = [
    Color::Rgb(0xEE, 0xE4, 0xDA), // 2
    Color::Rgb(0xED, 0xE0, 0xC8), // 4
    Color::Rgb(0xF2, 0xB1, 0x79), // 8
    Color::Rgb(0xF5, 0x95, 0x63), // 16
    Color::Rgb(0xF6, 0x7C, 0x5F), // 32
    Color::Rgb(0xF6, 0x5E, 0x3B), // 64
    Color::Rgb(0xED, 0xCF, 0x72), // 128
    Color::Rgb(0xED, 0xCC, 0x61), // 256
    Color::Rgb(0xED, 0xC8, 0x50), // 512
    Color::Rgb(0xED, 0xC5, 0x3F), // 1024
    Color::Rgb(0xED, 0xC2, 0x2E), // 2048
    Color::Rgb(0xC6, 0x78, 0xDD), // 4096
];

const HIGH_CONTRAST_TILES: [Color; TILE_COLOURS] = [
    Color::Rgb(0xFF, 0xFF, 0xFF),
    Color::Rgb(0xFF, 0xFF, 0x00),
    Color::Rgb(0xFF, 0x88, 0x00),
    Color::Rgb(0xFF, 0x00, 0x00),
    Color::Rgb(0xFF, 0x00, 0xFF),
    Color::Rgb(0x88, 0x00, 0xFF),
    Color::Rgb(0x00, 0x88, 0xFF),
    Color::Rgb(0x00, 0xFF, 0xFF),
    Color::Rgb(0x00, 0xFF, 0x00),
    Color::Rgb(0x88, 0xFF, 0x00),
    Color::Rgb(0xFF, 0xD7, 0x00),
    Color::Rgb(0xFF, 0xFF, 0xFF),
];

// Okabe-Ito / Tol-style hues, ordered so neighbouring values stay distinguishable.
const COLORBLIND_TILES: [Color; TILE_COLOURS] = [
    Color::Rgb(0xDD, 0xDD, 0xDD),
    Color::Rgb(0xBB, 0xBB, 0x00),
    Color::Rgb(0xEE, 0x77, 0x33),
    Color::Rgb(0x00, 0x77, 0xBB),
    Color::Rgb(0xEE, 0x33, 0x77),
    Color::Rgb(0x00, 0x99, 0x88),
    Color::Rgb(0xCC, 0x33, 0x11),
    Color::Rgb(0x33, 0xBB, 0xEE),
    Color::Rgb(0xE6, 0x9F, 0x00),
    Color::Rgb(0x56, 0xB4, 0xE9),
    Color::Rgb(0xF0, 0xE4, 0x42),
    Color::Rgb(0xCC, 0x79, 0xA7),
];

/// Tile palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours indexed by log2(value) - 1.
    pub tiles: [Color; TILE_COLOURS],
    /// Tiles above 4096.
    pub super_tile: Color,
    /// Empty cell.
    pub empty: Color,
    /// Board background / gaps.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, best).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints, disabled undo).
    pub inactive_fg: Color,
    /// Digits on light tiles (2, 4).
    pub dark_text: Color,
    /// Digits on everything else.
    pub light_text: Color,
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
        Self::onedark_default()
    }
}

impl Theme {
    /// Classic 2048 tiles on One Dark UI colours.
    pub fn onedark_default() -> Self {
        Self {
            tiles: CLASSIC_TILES,
            super_tile: Color::Rgb(0x3C, 0x3A, 0x32),
            empty: Color::Rgb(0x3F, 0x44, 0x4F),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            dark_text: Color::Rgb(0x77, 0x6E, 0x65),
            light_text: Color::Rgb(0xF9, 0xF6, 0xF2),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = HIGH_CONTRAST_TILES;
                self.super_tile = Color::Rgb(0xFF, 0xFF, 0xFF);
                self.dark_text = Color::Rgb(0x00, 0x00, 0x00);
                self.light_text = Color::Rgb(0x00, 0x00, 0x00);
            }
            crate::Palette::Colorblind => {
                self.tiles = COLORBLIND_TILES;
                self.dark_text = Color::Rgb(0x22, 0x22, 0x22);
                self.light_text = Color::Rgb(0x22, 0x22, 0x22);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut tiles = defaults.tiles;
        for (i, slot) in tiles.iter_mut().enumerate() {
            if let Some(c) = get(&format!("tile_{}", 2u32 << i)) {
                *slot = c;
            }
        }
        Self {
            tiles,
            super_tile: get("tile_super").unwrap_or(defaults.super_tile),
            empty: get("tile_empty")
                .or_else(|| get("div_line"))
                .unwrap_or(defaults.empty),
            bg: get("meter_bg")
                .or_else(|| get("main_bg"))
                .unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
            dark_text: get("tile_text_dark").unwrap_or(defaults.dark_text),
            light_text: get("tile_text_light").unwrap_or(defaults.light_text),
        }
    }

    /// Background colour for a tile value (0 = empty).
    pub fn tile_color(&self, value: u64) -> Color {
        match tile_index(value) {
            None => self.empty,
            Some(i) if i < TILE_COLOURS => self.tiles[i],
            Some(_) => self.super_tile,
        }
    }

    /// Digit colour for a tile value.
    #[inline]
    pub fn tile_text(&self, value: u64) -> Color {
        if value <= 4 {
            self.dark_text
        } else {
            self.light_text
        }
    }
}

/// log2(value) - 1 for tiles, `None` for empty cells.
fn tile_index(value: u64) -> Option<usize> {
    (value >= 2).then(|| value.trailing_zeros() as usize - 1)
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

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 if s.is_ascii() => (
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
