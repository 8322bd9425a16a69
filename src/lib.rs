//! 2048 rules engine and game session, independent of any front-end.
//!
//! - [`engine`]: grid, slide/merge, rotation-composed moves, tile spawning, game-over rules.
//!   Pure apart from tile placement, which takes an injected RNG.
//! - [`session`]: current grid, score, terminal status and undo history for one game.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use twenty48tui::engine::{BoardSize, Direction, Grid};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let grid = Grid::from_rows(&[[2u64, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let outcome = grid.apply_move(Direction::Left, &mut rng);
//! assert_eq!(outcome.score, 4);
//! assert!(outcome.changed);
//! assert_eq!(outcome.grid.size(), BoardSize::default());
//! ```

pub mod engine;
pub mod session;

pub use engine::{BoardSize, Direction, GameStatus, Grid, GridError, MoveOutcome};
pub use session::Session;
