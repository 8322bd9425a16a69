//! Game session: current grid, cumulative score, terminal status and undo history.

use crate::engine::{self, BoardSize, Direction, GameStatus, Grid};
use log::{debug, info};
use rand::Rng;
use std::collections::VecDeque;

/// Grid and score as they were before an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    grid: Grid,
    score: u64,
}

/// Mutable state of one game, driven by player input.
#[derive(Debug)]
pub struct Session<R> {
    rng: R,
    size: BoardSize,
    grid: Grid,
    score: u64,
    status: GameStatus,
    history: VecDeque<Snapshot>,
    /// Max snapshots kept; `None` = unbounded.
    undo_limit: Option<usize>,
    /// Score gained by the last accepted move (for the "+N" indicator).
    last_gain: u64,
    /// Cell of the tile spawned by the last accepted move.
    last_spawn: Option<(usize, usize)>,
}

impl<R: Rng> Session<R> {
    pub fn new(size: BoardSize, mut rng: R, undo_limit: Option<usize>) -> Self {
        let grid = engine::initialize(size, &mut rng);
        info!("new {} game", size);
        Self {
            rng,
            size,
            grid,
            score: 0,
            status: GameStatus::InProgress,
            history: VecDeque::new(),
            undo_limit: undo_limit.filter(|&n| n > 0),
            last_gain: 0,
            last_spawn: None,
        }
    }

    /// Apply a move. Returns false when the game is over or nothing slid.
    pub fn handle_move(&mut self, direction: Direction) -> bool {
        if self.status.is_over() {
            return false;
        }
        let outcome = self.grid.apply_move(direction, &mut self.rng);
        if !outcome.changed {
            return false;
        }

        let previous = std::mem::replace(&mut self.grid, outcome.grid);
        self.push_snapshot(Snapshot {
            grid: previous,
            score: self.score,
        });
        self.score = self.score.saturating_add(outcome.score);
        self.last_gain = outcome.score;
        self.last_spawn = outcome.spawned;
        self.status = self.grid.status();
        debug!(
            "move {}: +{} (score {}, undo depth {})",
            direction,
            outcome.score,
            self.score,
            self.history.len()
        );
        if self.status.is_over() {
            info!(
                "game over ({:?}) on {}: score {}, highest tile {}",
                self.status,
                self.size,
                self.score,
                self.grid.highest_tile()
            );
        }
        true
    }

    fn push_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(limit) = self.undo_limit {
            while self.history.len() >= limit {
                self.history.pop_front();
            }
        }
        self.history.push_back(snapshot);
    }

    /// Restore the grid and score from before the last accepted move. No-op on empty history.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_back() else {
            return false;
        };
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.status = GameStatus::InProgress;
        self.last_gain = 0;
        self.last_spawn = None;
        debug!("undo: score {}, undo depth {}", self.score, self.history.len());
        true
    }

    /// Start over on the current board size.
    pub fn reset(&mut self) {
        self.grid = engine::initialize(self.size, &mut self.rng);
        self.score = 0;
        self.status = GameStatus::InProgress;
        self.history.clear();
        self.last_gain = 0;
        self.last_spawn = None;
        info!("new {} game", self.size);
    }

    /// Switch board size; always starts a new game.
    pub fn set_board_size(&mut self, size: BoardSize) {
        if size != self.size {
            info!("board size {} -> {}", self.size, size);
        }
        self.size = size;
        self.reset();
    }

    #[cfg(test)]
    fn load(&mut self, grid: Grid, score: u64) {
        self.size = grid.size();
        self.status = grid.status();
        self.grid = grid;
        self.score = score;
        self.history.clear();
    }
}

impl<R> Session<R> {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn board_size(&self) -> BoardSize {
        self.size
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn undo_limit(&self) -> Option<usize> {
        self.undo_limit
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn last_gain(&self) -> u64 {
        self.last_gain
    }

    pub fn last_spawn(&self) -> Option<(usize, usize)> {
        self.last_spawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session(seed: u64, limit: Option<usize>) -> Session<StdRng> {
        Session::new(BoardSize::default(), StdRng::seed_from_u64(seed), limit)
    }

    fn grid(rows: &[&[u64]]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    /// Make some move that changes the board; panics if none exists.
    fn any_move(s: &mut Session<StdRng>) -> Direction {
        Direction::ALL
            .into_iter()
            .find(|&d| s.handle_move(d))
            .expect("no legal move")
    }

    #[test]
    fn test_new_session_is_fresh() {
        let s = session(1, None);
        assert_eq!(s.score(), 0);
        assert_eq!(s.status(), GameStatus::InProgress);
        assert_eq!(s.undo_depth(), 0);
        assert!(!s.can_undo());
        assert_eq!(s.grid().count_empty(), 14);
    }

    #[test]
    fn test_accepted_move_records_history_and_score() {
        let mut s = session(2, None);
        s.load(
            grid(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]),
            10,
        );
        assert!(s.handle_move(Direction::Left));
        assert_eq!(s.score(), 14);
        assert_eq!(s.last_gain(), 4);
        assert_eq!(s.undo_depth(), 1);
        let (r, c) = s.last_spawn().unwrap();
        assert!(s.grid().get(r, c).unwrap() >= 2);
    }

    #[test]
    fn test_noop_move_is_rejected() {
        let mut s = session(3, None);
        s.load(
            grid(&[&[2, 0, 0, 0], &[4, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]),
            0,
        );
        let before = s.grid().clone();
        assert!(!s.handle_move(Direction::Left));
        assert!(!s.handle_move(Direction::Up));
        assert_eq!(*s.grid(), before);
        assert_eq!(s.undo_depth(), 0);
    }

    #[test]
    fn test_undo_restores_exact_state() {
        let mut s = session(4, None);
        let grid0 = s.grid().clone();
        any_move(&mut s);
        let grid1 = s.grid().clone();
        let score1 = s.score();
        any_move(&mut s);
        assert_eq!(s.undo_depth(), 2);

        assert!(s.undo());
        assert_eq!(*s.grid(), grid1);
        assert_eq!(s.score(), score1);
        assert!(s.undo());
        assert_eq!(*s.grid(), grid0);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut s = session(5, None);
        let before = s.grid().clone();
        assert!(!s.undo());
        assert_eq!(*s.grid(), before);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_history_is_independent_of_live_grid() {
        let mut s = session(6, None);
        let start = s.grid().clone();
        for _ in 0..5 {
            any_move(&mut s);
        }
        for _ in 0..5 {
            assert!(s.undo());
        }
        assert_eq!(*s.grid(), start);
    }

    #[test]
    fn test_undo_limit_drops_oldest() {
        let mut s = session(7, Some(2));
        for _ in 0..4 {
            any_move(&mut s);
        }
        assert_eq!(s.undo_depth(), 2);
        assert!(s.undo());
        assert!(s.undo());
        assert!(!s.undo());
        assert_eq!(s.undo_limit(), Some(2));
    }

    #[test]
    fn test_zero_undo_limit_is_unbounded() {
        let s = session(8, Some(0));
        assert_eq!(s.undo_limit(), None);
    }

    #[test]
    fn test_game_over_blocks_moves_until_undo() {
        let mut s = session(9, None);
        s.load(
            grid(&[
                &[1024, 1024, 2, 4],
                &[4, 2, 4, 2],
                &[2, 4, 2, 4],
                &[4, 2, 4, 2],
            ]),
            100,
        );
        assert!(s.handle_move(Direction::Left));
        assert_eq!(s.status(), GameStatus::Won);
        assert_eq!(s.score(), 100 + 2048);
        let won = s.grid().clone();
        assert!(!s.handle_move(Direction::Right));
        assert_eq!(*s.grid(), won);

        assert!(s.undo());
        assert_eq!(s.status(), GameStatus::InProgress);
        assert_eq!(s.score(), 100);
        assert!(s.handle_move(Direction::Left));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = session(10, None);
        any_move(&mut s);
        any_move(&mut s);
        s.reset();
        assert_eq!(s.score(), 0);
        assert_eq!(s.undo_depth(), 0);
        assert_eq!(s.status(), GameStatus::InProgress);
        assert_eq!(s.grid().count_empty(), 14);
        assert_eq!(s.last_spawn(), None);
    }

    #[test]
    fn test_set_board_size_resets() {
        let mut s = session(11, None);
        any_move(&mut s);
        let six = BoardSize::new(6).unwrap();
        s.set_board_size(six);
        assert_eq!(s.board_size(), six);
        assert_eq!(s.grid().size(), six);
        assert_eq!(s.grid().count_empty(), 34);
        assert_eq!(s.score(), 0);
        assert!(!s.can_undo());
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = session(12, None);
        let mut b = session(12, None);
        for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            assert_eq!(a.handle_move(dir), b.handle_move(dir));
            assert_eq!(a.grid(), b.grid());
            assert_eq!(a.score(), b.score());
        }
    }
}
