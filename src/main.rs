//! twenty48tui: the 2048 sliding-tile puzzle in the terminal.

mod app;
mod highscores;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::path::{Path, PathBuf};
use twenty48tui::BoardSize;

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board_size: BoardSize,
    /// Max undo steps kept; `None` = unbounded.
    pub undo_limit: Option<usize>,
    pub seed: Option<u64>,
    pub no_animation: bool,
    /// Read and write the best-score file.
    pub highscores: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        board_size: BoardSize::new(args.size as usize)?,
        undo_limit: (args.undo_limit > 0).then_some(args.undo_limit),
        seed: args.seed,
        no_animation: args.no_animation,
        highscores: !args.no_highscores,
    };
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when one is given.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// 2048 sliding-tile puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "twenty48tui",
    version,
    about = "2048 in the terminal. Slide tiles, merge equal neighbours, reach 2048.",
    long_about = "twenty48tui is the 2048 sliding-tile puzzle for the terminal.\n\n\
        Every move slides all tiles as far as they go; two equal tiles that collide merge \
        into one and their sum is added to your score. A new 2 or 4 appears after each move. \
        Reach a 2048 tile to win; the game ends when no move can change the board.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd   Move     U / Backspace   Undo\n  \
        N / R                  New game 3-6             Board size\n  \
        [ / ]                  Smaller / larger board   Q / Esc   Quit\n\n\
        Use --theme to load a btop-style theme (tile_2 .. tile_4096, tile_empty, meter_bg, ...)."
)]
pub struct Args {
    /// Board side length (3 to 6).
    #[arg(short, long, default_value = "4", value_name = "N", value_parser = clap::value_parser!(u8).range(3..=6))]
    pub size: u8,

    /// RNG seed for reproducible games. Random if not set.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Max moves that can be undone (0 = unlimited).
    #[arg(long, default_value = "0", value_name = "N")]
    pub undo_limit: usize,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses classic tiles on One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the spawn fade-in.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not load or save best scores.
    #[arg(long)]
    pub no_highscores: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["twenty48tui"]).unwrap();
        assert_eq!(args.size, 4);
        assert_eq!(args.undo_limit, 0);
        assert_eq!(args.palette, Palette::Normal);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_size() {
        assert!(Args::try_parse_from(["twenty48tui", "--size", "7"]).is_err());
        assert!(Args::try_parse_from(["twenty48tui", "-s", "2"]).is_err());
        let args = Args::try_parse_from(["twenty48tui", "-s", "6", "--palette", "colourblind"])
            .unwrap();
        assert_eq!(args.size, 6);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
