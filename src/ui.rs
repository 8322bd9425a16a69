//! Layout and drawing: tile board, sidebar, game over, quit menu, spawn fade-in.

use crate::app::{QuitOption, Screen, SpawnAnimation};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, EffectRenderer, Interpolation, fx};
use twenty48tui::engine::GameStatus;
use twenty48tui::session::Session;

const SIDEBAR_WIDTH: u16 = 24;
/// Stats (8) + gap (1) + keys (10).
const SIDEBAR_HEIGHT: u16 = 19;

/// Duration of the spawned-tile fade-in (TachyonFX) in ms.
const SPAWN_FADE_MS: u32 = 180;

/// Tile size in terminal cells plus the gap around each tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileLayout {
    width: u16,
    height: u16,
    gap_x: u16,
    gap_y: u16,
}

impl TileLayout {
    const fn new(width: u16, height: u16, gap_x: u16, gap_y: u16) -> Self {
        Self {
            width,
            height,
            gap_x,
            gap_y,
        }
    }
}

/// Largest first; the smallest is used even when nothing fits.
const TILE_LAYOUTS: [TileLayout; 5] = [
    TileLayout::new(10, 5, 2, 1),
    TileLayout::new(8, 3, 1, 1),
    TileLayout::new(6, 3, 1, 1),
    TileLayout::new(6, 1, 1, 1),
    TileLayout::new(5, 1, 1, 0),
];

/// Board size in terminal cells (border + gaps + tiles) for an n×n grid.
fn board_pixel_size(n: u16, tile: TileLayout) -> (u16, u16) {
    let w = n * tile.width + (n + 1) * tile.gap_x + 2;
    let h = n * tile.height + (n + 1) * tile.gap_y + 2;
    (w, h)
}

/// Biggest tile layout whose board + sidebar fits in `area`.
fn tile_layout_for(area: Rect, n: u16) -> TileLayout {
    TILE_LAYOUTS
        .iter()
        .copied()
        .find(|&tile| {
            let (w, h) = board_pixel_size(n, tile);
            w + SIDEBAR_WIDTH <= area.width && h <= area.height
        })
        .unwrap_or(TILE_LAYOUTS[TILE_LAYOUTS.len() - 1])
}

/// Where the tiles of the current board landed on screen.
#[derive(Debug, Clone, Copy)]
struct BoardGeometry {
    outer: Rect,
    inner: Rect,
    tile: TileLayout,
}

impl BoardGeometry {
    /// Screen rect of tile (row, col), clipped to the board.
    fn tile_rect(&self, row: usize, col: usize) -> Rect {
        let t = self.tile;
        Rect {
            x: self.inner.x + t.gap_x + col as u16 * (t.width + t.gap_x),
            y: self.inner.y + t.gap_y + row as u16 * (t.height + t.gap_y),
            width: t.width,
            height: t.height,
        }
        .intersection(self.inner)
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Short label that fits `width` columns: 131072 becomes "128k" on narrow tiles.
fn tile_label(value: u64, width: u16) -> String {
    let full = value.to_string();
    if full.len() <= width as usize {
        full
    } else {
        format!("{}k", value / 1024)
    }
}

/// Draw the current screen. When a tile was just spawned (and animation is on), runs the
/// TachyonFX fade-in on it and updates `spawn.effect` / `spawn.process_time`.
pub fn draw<R>(
    frame: &mut Frame,
    screen: Screen,
    session: &Session<R>,
    theme: &Theme,
    best: u64,
    new_best: bool,
    spawn: &mut SpawnAnimation,
    now: Instant,
    quit_selected: Option<QuitOption>,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());

    let geometry = draw_game(frame, session, theme, best, area);
    if let Some(cell) = spawn.cell {
        apply_spawn_effect(frame, theme, geometry, cell, spawn, now);
    }
    if session.is_over() {
        draw_game_over(frame, session, theme, new_best, geometry.outer);
    }
    if screen == Screen::QuitMenu {
        if let Some(opt) = quit_selected {
            draw_quit_menu(frame, theme, opt);
        }
    }
}

/// Board + sidebar, centered in `area`.
fn draw_game<R>(
    frame: &mut Frame,
    session: &Session<R>,
    theme: &Theme,
    best: u64,
    area: Rect,
) -> BoardGeometry {
    let n = session.board_size().get() as u16;
    let tile = tile_layout_for(area, n);
    let (bw, bh) = board_pixel_size(n, tile);
    let total_w = bw + SIDEBAR_WIDTH;
    let total_h = bh.max(SIDEBAR_HEIGHT);

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    let board_area = Rect {
        height: bh.min(inner[0].height),
        ..inner[0]
    };
    let geometry = draw_board(frame, session, theme, board_area, tile);
    draw_sidebar(frame, session, theme, best, inner[1]);
    geometry
}

fn draw_board<R>(
    frame: &mut Frame,
    session: &Session<R>,
    theme: &Theme,
    area: Rect,
    tile: TileLayout,
) -> BoardGeometry {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(" 2048 ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let geometry = BoardGeometry {
        outer: area,
        inner,
        tile,
    };
    let buf = frame.buffer_mut();
    for (r, row) in session.grid().rows().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            let rect = geometry.tile_rect(r, c);
            if rect.is_empty() {
                continue;
            }
            buf.set_style(rect, Style::default().bg(theme.tile_color(value)));
            if value == 0 {
                continue;
            }
            let label = tile_label(value, rect.width);
            let lx = rect.x + rect.width.saturating_sub(label.len() as u16) / 2;
            let ly = rect.y + rect.height / 2;
            let style = Style::default()
                .fg(theme.tile_text(value))
                .bg(theme.tile_color(value))
                .add_modifier(Modifier::BOLD);
            buf.set_stringn(lx, ly, &label, rect.width as usize, style);
        }
    }
    geometry
}

fn draw_sidebar<R>(frame: &mut Frame, session: &Session<R>, theme: &Theme, best: u64, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Stats (border + score, gain, best, board, highest, undo)
            Constraint::Length(1),  // gap
            Constraint::Length(10), // Keys
        ])
        .split(area);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());

    let gain = if session.last_gain() > 0 {
        Span::styled(
            format!(" +{}", session.last_gain()),
            Style::default()
                .fg(theme.tile_color(2048))
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::from("")
    };
    let undo = match session.undo_limit() {
        Some(limit) => format!("{}/{}", session.undo_depth(), limit),
        None => session.undo_depth().to_string(),
    };
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(session.score().to_string(), fg_style),
            gain,
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(best.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Board: ", title_style),
            Span::styled(session.board_size().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Highest: ", title_style),
            Span::styled(session.grid().highest_tile().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Undo: ", title_style),
            Span::styled(
                undo,
                if session.can_undo() {
                    fg_style
                } else {
                    dim_style
                },
            ),
        ]),
    ];
    Paragraph::new(stats_lines).render(stats_inner, frame.buffer_mut());

    let keys_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let keys_inner = keys_block.inner(chunks[2]);
    keys_block.render(chunks[2], frame.buffer_mut());
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{k:<8}"), Style::default().fg(theme.tile_color(8))),
            Span::styled(what, dim_style),
        ])
    };
    let keys_lines = vec![
        Line::from(Span::styled("Keys", title_style)),
        key("←↑→↓", "slide"),
        key("hjkl", "slide (vim)"),
        key("wasd", "slide"),
        key("u", "undo"),
        key("n", "new game"),
        key("3-6 [ ]", "board size"),
        key("q", "quit"),
    ];
    Paragraph::new(keys_lines).render(keys_inner, frame.buffer_mut());
}

/// Fade the freshly spawned tile in from the empty-cell colour.
fn apply_spawn_effect(
    frame: &mut Frame,
    theme: &Theme,
    geometry: BoardGeometry,
    (row, col): (usize, usize),
    spawn: &mut SpawnAnimation,
    now: Instant,
) {
    let rect = geometry.tile_rect(row, col);
    let delta = spawn
        .process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    spawn.process_time = Some(now);

    let effect = spawn.effect.get_or_insert_with(|| {
        fx::fade_from(
            theme.empty,
            theme.empty,
            (SPAWN_FADE_MS, Interpolation::Linear),
        )
        .with_area(rect)
    });
    frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
}

fn draw_game_over<R>(
    frame: &mut Frame,
    session: &Session<R>,
    theme: &Theme,
    new_best: bool,
    board: Rect,
) {
    let (title, title_style) = match session.status() {
        GameStatus::Won => (
            " You win! ",
            Style::default().fg(Color::Black).bg(theme.tile_color(2048)),
        ),
        _ => (
            " No more moves! ",
            Style::default().fg(Color::White).bg(Color::Red),
        ),
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, title_style.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_best {
        lines.push(Line::from(Span::styled(
            " New best! ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " U: Undo   N: New game ",
        Style::default().fg(theme.main_fg),
    )));
    lines.push(Line::from(Span::styled(
        " Q: Quit ",
        Style::default().fg(theme.main_fg),
    )));

    let popup = centered(board, 28, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .style(Style::default().bg(theme.bg))
        .title(" Quit? ");

    Clear.render(quit_rect, frame.buffer_mut());
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::NewGame, " New game "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use twenty48tui::engine::{BoardSize, Direction as Move};

    fn render(session: &Session<StdRng>, screen: Screen, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut spawn = SpawnAnimation::default();
        terminal
            .draw(|f| {
                draw(
                    f,
                    screen,
                    session,
                    &Theme::default(),
                    1234,
                    false,
                    &mut spawn,
                    Instant::now(),
                    Some(QuitOption::Resume),
                );
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_tile_layout_shrinks_to_fit() {
        let big = Rect::new(0, 0, 200, 60);
        assert_eq!(tile_layout_for(big, 4), TILE_LAYOUTS[0]);
        let small = Rect::new(0, 0, 80, 24);
        let tile = tile_layout_for(small, 6);
        let (w, h) = board_pixel_size(6, tile);
        assert!(w + SIDEBAR_WIDTH <= 80 && h <= 24, "{:?}", tile);
        let tiny = Rect::new(0, 0, 10, 5);
        assert_eq!(tile_layout_for(tiny, 6), TILE_LAYOUTS[4]);
    }

    #[test]
    fn test_tile_rects_do_not_overlap() {
        let tile = TILE_LAYOUTS[1];
        let (w, h) = board_pixel_size(4, tile);
        let outer = Rect::new(0, 0, w, h);
        let geometry = BoardGeometry {
            outer,
            inner: Rect::new(1, 1, w - 2, h - 2),
            tile,
        };
        let a = geometry.tile_rect(0, 0);
        let b = geometry.tile_rect(0, 1);
        let c = geometry.tile_rect(1, 0);
        assert_eq!(a.width, tile.width);
        assert!(!a.intersects(b));
        assert!(!a.intersects(c));
        let last = geometry.tile_rect(3, 3);
        assert_eq!(last.right() + tile.gap_x, w - 1);
        assert_eq!(last.bottom() + tile.gap_y, h - 1);
    }

    #[test]
    fn test_tile_label_compacts() {
        assert_eq!(tile_label(2048, 8), "2048");
        assert_eq!(tile_label(131_072, 5), "128k");
    }

    #[test]
    fn test_draw_shows_tiles_and_stats() {
        let session = Session::new(BoardSize::default(), StdRng::seed_from_u64(1), None);
        let screen = render(&session, Screen::Playing, 100, 30);
        assert!(screen.contains("Score: 0"));
        assert!(screen.contains("Best: 1234"));
        assert!(screen.contains("4×4"));
        assert!(screen.contains('2') || screen.contains('4'));
        assert!(!screen.contains("Quit?"));
    }

    #[test]
    fn test_draw_quit_menu() {
        let session = Session::new(BoardSize::default(), StdRng::seed_from_u64(2), None);
        let screen = render(&session, Screen::QuitMenu, 80, 24);
        assert!(screen.contains("Quit?"));
        assert!(screen.contains("Resume"));
    }

    #[test]
    fn test_draw_game_over_banner() {
        let mut session = Session::new(
            BoardSize::new(3).unwrap(),
            StdRng::seed_from_u64(3),
            None,
        );
        let mut guard = 0;
        while !session.is_over() && guard < 10_000 {
            for dir in [Move::Left, Move::Down, Move::Right, Move::Up] {
                session.handle_move(dir);
            }
            guard += 1;
        }
        assert!(session.is_over());
        let screen = render(&session, Screen::Playing, 80, 24);
        assert!(screen.contains("No more moves!") || screen.contains("You win!"));
        assert!(screen.contains("U: Undo   N: New game"));
        assert!(screen.contains("Q: Quit"));
        assert!(!screen.contains('—'));
    }
}
