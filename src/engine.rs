//! Move engine: grid, slide/merge, rotation-composed moves, tile spawning and game-over rules.
//!
//! Every operation here is pure apart from the random draw in tile placement, which takes an
//! injected RNG. Moves never touch the grid they are called on; they return a fresh one.

use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Reaching this tile wins (and ends) the game.
pub const WIN_TILE: u64 = 2048;
/// Tiles placed on a fresh board.
pub const INITIAL_TILES: usize = 2;
/// Chance that a spawned tile is a 4 rather than a 2.
const FOUR_PROBABILITY: f64 = 0.1;
/// Upper bound on the tile sum of a grid built from outside data.
///
/// Merges conserve the tile sum, so no tile, merge or move score on such a grid can exceed it.
/// Spawns add at most 4 per move, far from `u64::MAX`.
pub const MAX_TILE_SUM: u64 = 1 << 56;

/// Contract violations when building a grid or board size from untrusted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("unsupported board size {0} (expected {min}..={max})", min = BoardSize::MIN, max = BoardSize::MAX)]
    UnsupportedSize(usize),
    #[error("expected {expected} rows, found {found}")]
    WrongRowCount { expected: usize, found: usize },
    #[error("row {row}: expected {expected} cells, found {found}")]
    WrongRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile {value} at ({row}, {col}): must be 0 or a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: u64 },
    #[error("tile sum exceeds {max}", max = MAX_TILE_SUM)]
    TileSumTooLarge,
}

/// Side length of a square board, always in `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardSize(u8);

impl BoardSize {
    pub const MIN: usize = 3;
    pub const MAX: usize = 6;
    pub const ALL: [Self; 4] = [Self(3), Self(4), Self(5), Self(6)];

    pub fn new(n: usize) -> Result<Self, GridError> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(GridError::UnsupportedSize(n))
        }
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn cells(self) -> usize {
        self.get() * self.get()
    }

    /// Next larger size, wrapping 6 -> 3.
    pub fn next(self) -> Self {
        if self.get() >= Self::MAX {
            Self(Self::MIN as u8)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Next smaller size, wrapping 3 -> 6.
    pub fn prev(self) -> Self {
        if self.get() <= Self::MIN {
            Self(Self::MAX as u8)
        } else {
            Self(self.0 - 1)
        }
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<usize> for BoardSize {
    type Error = GridError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.0, self.0)
    }
}

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Clockwise quarter turns that map this direction onto `Left`.
    fn quarter_turns(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Down => 1,
            Self::Right => 2,
            Self::Up => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(s)
    }
}

/// Result of [`Grid::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    /// Sum of the values of all tiles created by merges.
    pub score: u64,
    /// Whether sliding changed the grid (the spawned tile is not counted).
    pub changed: bool,
    /// Cell (row, col) of the tile spawned after a changing move.
    pub spawned: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    NoMoves,
}

impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        self != Self::InProgress
    }
}

/// Square board of tile values stored row-major. 0 is an empty cell.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: BoardSize,
    cells: Vec<u64>,
}

impl Grid {
    /// All-empty grid.
    pub fn empty(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![0; size.cells()],
        }
    }

    /// Build a grid from rows, rejecting bad dimensions, bad tile values and a tile sum above
    /// [`MAX_TILE_SUM`].
    pub fn from_rows<R: AsRef<[u64]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = BoardSize::new(rows.len())?;
        let n = size.get();
        let mut cells = Vec::with_capacity(size.cells());
        let mut sum: u64 = 0;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(GridError::WrongRowLength {
                    row: r,
                    expected: n,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value != 0 && (value < 2 || !value.is_power_of_two()) {
                    return Err(GridError::InvalidTile { row: r, col: c, value });
                }
                sum = sum
                    .checked_add(value)
                    .filter(|&s| s <= MAX_TILE_SUM)
                    .ok_or(GridError::TileSumTooLarge)?;
            }
            cells.extend_from_slice(row);
        }
        Ok(Self { size, cells })
    }

    /// Like [`Grid::from_rows`] but for a board size already chosen by the caller.
    pub fn from_rows_sized<R: AsRef<[u64]>>(
        size: BoardSize,
        rows: &[R],
    ) -> Result<Self, GridError> {
        if rows.len() != size.get() {
            return Err(GridError::WrongRowCount {
                expected: size.get(),
                found: rows.len(),
            });
        }
        Self::from_rows(rows)
    }

    #[inline]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Tile at (row, col); `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        let n = self.size.get();
        if row < n && col < n {
            Some(self.cells[row * n + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[u64] {
        let n = self.size.get();
        &self.cells[row * n..(row + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks_exact(self.size.get())
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        self.rows().map(<[u64]>::to_vec).collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn highest_tile(&self) -> u64 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn has_won(&self) -> bool {
        self.cells.contains(&WIN_TILE)
    }

    /// Put a 2 (90%) or 4 (10%) on a uniformly chosen empty cell. Returns false on a full grid.
    pub fn place_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.spawn_tile(rng).is_some()
    }

    /// By-value form of [`Grid::place_random_tile`].
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.place_random_tile(rng);
        self
    }

    fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize)> {
        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (v == 0).then_some(i))
            .collect();
        if empty.is_empty() {
            return None;
        }
        let idx = empty[rng.gen_range(0..empty.len())];
        self.cells[idx] = if rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
        let n = self.size.get();
        Some((idx / n, idx % n))
    }

    /// Slide and merge in `dir` without spawning. Returns the new grid and the merge score.
    ///
    /// Every direction goes through the same path: rotate so `dir` becomes left, reduce each
    /// row, rotate back.
    pub fn shift(&self, dir: Direction) -> (Self, u64) {
        let turns = dir.quarter_turns();
        let mut grid = self.clone();
        for _ in 0..turns {
            grid = rotate_clockwise(&grid);
        }

        let mut score = 0;
        let mut cells = Vec::with_capacity(grid.cells.len());
        for row in grid.rows() {
            let (slid, gained) = slide_row(row);
            score += gained;
            cells.extend(slid);
        }
        grid.cells = cells;

        for _ in 0..(4 - turns) % 4 {
            grid = rotate_clockwise(&grid);
        }
        (grid, score)
    }

    /// Full move: shift, then spawn one tile if anything moved.
    pub fn apply_move<R: Rng + ?Sized>(&self, dir: Direction, rng: &mut R) -> MoveOutcome {
        let (mut grid, score) = self.shift(dir);
        let changed = grid != *self;
        let spawned = if changed { grid.spawn_tile(rng) } else { None };
        MoveOutcome {
            grid,
            score,
            changed,
            spawned,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.has_won() {
            GameStatus::Won
        } else if is_game_over(self) {
            GameStatus::NoMoves
        } else {
            GameStatus::InProgress
        }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size.get())
            .field("rows", &self.to_rows())
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (c, &v) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" ")?;
                }
                if v == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", v)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Fresh board with [`INITIAL_TILES`] random tiles.
pub fn initialize<R: Rng + ?Sized>(size: BoardSize, rng: &mut R) -> Grid {
    let mut grid = Grid::empty(size);
    for _ in 0..INITIAL_TILES {
        grid.place_random_tile(rng);
    }
    grid
}

/// Slide one row toward index 0 and merge equal neighbours once.
///
/// A merged tile cannot merge again in the same slide: `[2, 2, 2, 0]` becomes `[4, 2, 0, 0]`.
/// Returns the new row (same length) and the sum of merged tile values.
pub fn slide_row(row: &[u64]) -> (Vec<u64>, u64) {
    let mut tiles: Vec<u64> = row.iter().copied().filter(|&v| v != 0).collect();
    let mut score = 0;
    let mut i = 0;
    while i + 1 < tiles.len() {
        if tiles[i] == tiles[i + 1] {
            tiles[i] *= 2;
            score += tiles[i];
            tiles.remove(i + 1);
        }
        i += 1;
    }
    tiles.resize(row.len(), 0);
    (tiles, score)
}

/// Rotate 90° clockwise: cell (r, c) moves to (c, n - 1 - r).
pub fn rotate_clockwise(grid: &Grid) -> Grid {
    let n = grid.size.get();
    let mut out = Grid::empty(grid.size);
    for r in 0..n {
        for c in 0..n {
            out.cells[c * n + (n - 1 - r)] = grid.cells[r * n + c];
        }
    }
    out
}

/// True when the board holds [`WIN_TILE`] or no slide can change it.
pub fn is_game_over(grid: &Grid) -> bool {
    if grid.has_won() {
        return true;
    }
    if grid.cells.contains(&0) {
        return false;
    }
    let n = grid.size.get();
    for r in 0..n {
        for c in 0..n {
            let v = grid.cells[r * n + c];
            if c + 1 < n && v == grid.cells[r * n + c + 1] {
                return false;
            }
            if r + 1 < n && v == grid.cells[(r + 1) * n + c] {
                return false;
            }
        }
    }
    true
}
