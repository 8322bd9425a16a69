//! Persist best scores per board size to disk (XDG config or ~/.config/twenty48tui).

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use twenty48tui::engine::BoardSize;

const FILENAME: &str = "highscores";

/// Best score for each board size (3×3 ..= 6×6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScores([u64; BoardSize::MAX - BoardSize::MIN + 1]);

impl BestScores {
    fn slot(size: BoardSize) -> usize {
        size.get() - BoardSize::MIN
    }

    pub fn get(&self, size: BoardSize) -> u64 {
        self.0[Self::slot(size)]
    }

    /// Record `score` for `size`; returns true when it beats the previous best.
    pub fn record(&mut self, size: BoardSize, score: u64) -> bool {
        let best = &mut self.0[Self::slot(size)];
        if score > *best {
            *best = score;
            true
        } else {
            false
        }
    }

    /// Parse `<size> <score>` lines; unknown sizes and bad lines are skipped.
    fn parse(content: &str) -> Self {
        let mut scores = Self::default();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(size), Some(score), None) = (parts.next(), parts.next(), parts.next()) else {
                continue;
            };
            let size = size.parse::<usize>().ok().and_then(|n| BoardSize::new(n).ok());
            if let (Some(size), Ok(score)) = (size, score.parse::<u64>()) {
                scores.record(size, score);
            }
        }
        scores
    }

    fn render(&self) -> String {
        BoardSize::ALL
            .iter()
            .map(|&size| format!("{} {}\n", size.get(), self.get(size)))
            .collect()
    }
}

/// Returns the path to the high scores file (config dir / twenty48tui / highscores).
fn config_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("twenty48tui").join(FILENAME)
}

/// Load best scores from disk; all zero on missing/unreadable file.
pub fn load_best_scores() -> BestScores {
    fs::read_to_string(config_path())
        .map(|content| BestScores::parse(&content))
        .unwrap_or_default()
}

/// Save best scores to disk. Creates config directory if needed.
pub fn save_best_scores(scores: &BestScores) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, scores.render())?;
    Ok(())
}
