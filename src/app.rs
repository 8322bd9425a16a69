//! App: terminal init, main loop and key handling.

use anyhow::Result;
use crate::GameConfig;
use crate::highscores::{self, BestScores};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use twenty48tui::engine::BoardSize;
use twenty48tui::session::Session;

/// Redraw cadence while idle or animating (~60 FPS).
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    NewGame,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::NewGame,
            Self::NewGame => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::NewGame => Self::Resume,
            Self::Exit => Self::NewGame,
        }
    }
}

/// Spawn fade-in: which cell, and the TachyonFX effect once the UI has created it.
#[derive(Default)]
pub struct SpawnAnimation {
    pub cell: Option<(usize, usize)>,
    pub effect: Option<Effect>,
    /// Last time we processed the effect (for delta).
    pub process_time: Option<Instant>,
}

impl SpawnAnimation {
    fn start(&mut self, cell: Option<(usize, usize)>) {
        self.cell = cell;
        self.effect = None;
        self.process_time = None;
    }

    fn clear(&mut self) {
        self.start(None);
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: Session<StdRng>,
    screen: Screen,
    quit_selected: QuitOption,
    best: BestScores,
    /// Current game has set a new best for its board size.
    new_best_this_game: bool,
    /// Best scores changed since the last save.
    best_dirty: bool,
    spawn_animation: SpawnAnimation,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            "starting: size {}, seed {:?}, undo limit {:?}",
            config.board_size, config.seed, config.undo_limit
        );
        let session = Session::new(config.board_size, rng, config.undo_limit);
        let best = if config.highscores {
            highscores::load_best_scores()
        } else {
            BestScores::default()
        };
        Self {
            config,
            theme,
            session,
            screen: Screen::Playing,
            quit_selected: QuitOption::Resume,
            best,
            new_best_this_game: false,
            best_dirty: false,
            spawn_animation: SpawnAnimation::default(),
        }
    }

    fn new_game(&mut self) {
        self.save_best();
        self.session.reset();
        self.new_best_this_game = false;
        self.spawn_animation.clear();
        self.screen = Screen::Playing;
    }

    fn change_size(&mut self, size: BoardSize) {
        self.save_best();
        self.session.set_board_size(size);
        self.new_best_this_game = false;
        self.spawn_animation.clear();
    }

    fn save_best(&mut self) {
        if !self.config.highscores || !self.best_dirty {
            return;
        }
        match highscores::save_best_scores(&self.best) {
            Ok(()) => self.best_dirty = false,
            Err(e) => warn!("could not save best scores: {e:#}"),
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Move(direction) => {
                if !self.session.handle_move(direction) {
                    return;
                }
                if !self.config.no_animation {
                    self.spawn_animation.start(self.session.last_spawn());
                }
                let size = self.session.board_size();
                if self.best.record(size, self.session.score()) {
                    if !self.new_best_this_game {
                        info!("new best on {}: {}", size, self.session.score());
                    }
                    self.new_best_this_game = true;
                    self.best_dirty = true;
                }
                if self.session.is_over() {
                    self.save_best();
                }
            }
            Action::Undo => {
                if self.session.undo() {
                    self.spawn_animation.clear();
                }
            }
            Action::NewGame => self.new_game(),
            Action::SetSize(size) => self.change_size(size),
            Action::SizeUp => self.change_size(self.session.board_size().next()),
            Action::SizeDown => self.change_size(self.session.board_size().prev()),
            Action::Quit => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            Action::Confirm | Action::Exit | Action::None => {}
        }
    }

    /// Quit menu input; returns true when the app should exit.
    fn apply_quit_menu_action(&mut self, action: Action) -> bool {
        use twenty48tui::engine::Direction;
        match action {
            Action::Move(Direction::Down | Direction::Right) => {
                self.quit_selected = self.quit_selected.next();
            }
            Action::Move(Direction::Up | Direction::Left) => {
                self.quit_selected = self.quit_selected.prev();
            }
            Action::Confirm => match self.quit_selected {
                QuitOption::Resume => self.screen = Screen::Playing,
                QuitOption::NewGame => self.new_game(),
                QuitOption::Exit => return true,
            },
            Action::Quit => self.screen = Screen::Playing,
            _ => {}
        }
        false
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        self.save_best();
        info!(
            "exit: score {} on {}, highest tile {}",
            self.session.score(),
            self.session.board_size(),
            self.session.grid().highest_tile()
        );

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    self.best.get(self.session.board_size()),
                    self.new_best_this_game,
                    &mut self.spawn_animation,
                    now,
                    (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                );
            })?;

            if self
                .spawn_animation
                .effect
                .as_ref()
                .is_some_and(Effect::done)
            {
                self.spawn_animation.clear();
            }

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = key_to_action(key);
                if action == Action::Exit {
                    return Ok(());
                }
                match self.screen {
                    Screen::Playing => self.apply_action(action),
                    Screen::QuitMenu => {
                        if self.apply_quit_menu_action(action) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
