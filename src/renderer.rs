use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;

use crate::app::{App, BoardView, Screen};
use crate::config::{
    BoardConfig, GLYPH_FOOD, GLYPH_GRID, GLYPH_SNAKE_BODY, GLYPH_SNAKE_HEAD, Theme,
};
use crate::persistence::Storage;
use crate::snake::Position;
use crate::timer::Scheduler;
use crate::ui::hud::{HUD_HEIGHT, HudInfo, render_hud};
use crate::ui::menu::{
    render_confirm_menu, render_game_over_menu, render_help_menu, render_key_remap_menu,
    render_pause_menu, render_start_menu, render_too_small_menu,
};

/// Terminal columns used per board cell so cells look square.
const COLUMNS_PER_CELL: u16 = 2;

/// Renders the full game frame from immutable state.
pub fn render<S: Storage, T: Scheduler>(frame: &mut Frame<'_>, app: &App<S, T>, theme: &Theme) {
    let area = frame.area();
    let session = app.session();
    let hint = app.controls_hint();
    let play_area = render_hud(
        frame,
        area,
        &HudInfo {
            score: session.score,
            high_score: app.high_score(),
            elapsed_seconds: session.elapsed_seconds,
            best_time: app.best_time(),
            speed_level: session.speed_level,
            mode: app.state().mode(),
            controls_hint: &hint,
        },
        theme,
    );

    let view = app.board_view();
    let fits = board_fits(area, view.board);
    if fits {
        let board_area = board_rect(play_area, &view);
        let block = Block::bordered()
            .title(" NEON SNAKE ")
            .border_style(Style::new().fg(theme.border_fg))
            .style(Style::new().bg(theme.play_bg));
        let inner = block.inner(board_area);
        frame.render_widget(block, board_area);

        render_grid(frame, inner, &view, theme);
        render_food(frame, inner, &view, theme);
        render_snake(frame, inner, &view, theme);
    }

    // Dialogs still open over the notice so they can be answered.
    let screen = match app.screen() {
        Some(screen @ (Screen::Confirm | Screen::KeyRemap | Screen::Help)) => screen,
        _ if !fits => {
            let mode = app.state().mode();
            render_too_small_menu(
                frame,
                play_area,
                mode,
                required_size(view.board),
                (area.width, area.height),
                theme,
            );
            return;
        }
        Some(screen) => screen,
        None => return,
    };

    match screen {
        Screen::Start => render_start_menu(
            frame,
            play_area,
            app.high_score(),
            app.state().mode(),
            session.speed_level,
            theme,
        ),
        Screen::Pause => render_pause_menu(frame, play_area, session.score, theme),
        Screen::GameOver => {
            if let Some(summary) = app.last_result() {
                render_game_over_menu(frame, play_area, summary, app.high_score(), theme);
            }
        }
        Screen::Confirm => {
            if let Some(action) = app.pending_confirmation() {
                render_confirm_menu(frame, play_area, action, theme);
            }
        }
        Screen::KeyRemap => render_key_remap_menu(
            frame,
            play_area,
            app.remap_bindings(),
            app.remap_cursor(),
            app.capturing(),
            theme,
        ),
        Screen::Help => render_help_menu(frame, play_area, &hint, theme),
    }
}

/// Terminal size (columns, rows) the whole frame needs to show `board`
/// without clipping.
#[must_use]
pub fn required_size(board: BoardConfig) -> (u16, u16) {
    let grid = board.grid;
    (
        grid.width.saturating_mul(COLUMNS_PER_CELL).saturating_add(2),
        grid.height.saturating_add(2).saturating_add(HUD_HEIGHT),
    )
}

/// Returns true when a terminal of `area`'s size shows `board` in full.
#[must_use]
pub fn board_fits(area: Rect, board: BoardConfig) -> bool {
    let (width, height) = required_size(board);
    area.width >= width && area.height >= height
}

fn board_rect(area: Rect, view: &BoardView) -> Rect {
    let grid = view.board.grid;
    let width = grid.width.saturating_mul(COLUMNS_PER_CELL).saturating_add(2);
    let height = grid.height.saturating_add(2);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [board] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    board
}

fn render_grid(frame: &mut Frame<'_>, inner: Rect, view: &BoardView, theme: &Theme) {
    let style = Style::new().fg(theme.grid).bg(theme.play_bg);
    let buffer = frame.buffer_mut();

    for y in 0..i32::from(view.board.grid.height) {
        for x in 0..i32::from(view.board.grid.width) {
            if let Some((column, row)) = cell_to_terminal(inner, Position { x, y }) {
                buffer.set_string(column, row, GLYPH_GRID, style);
            }
        }
    }
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, view: &BoardView, theme: &Theme) {
    let Some((x, y)) = cell_to_terminal(inner, view.food) else {
        return;
    };

    let style = Style::new()
        .fg(theme.food)
        .bg(theme.play_bg)
        .add_modifier(Modifier::BOLD);
    frame.buffer_mut().set_string(x, y, GLYPH_FOOD, style);
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, view: &BoardView, theme: &Theme) {
    let head_style = Style::new()
        .fg(theme.snake_head)
        .bg(theme.play_bg)
        .add_modifier(Modifier::BOLD);
    let body_style = Style::new()
        .fg(theme.snake_body)
        .bg(theme.play_bg)
        .add_modifier(Modifier::DIM);

    let buffer = frame.buffer_mut();
    // Tail first so the head is painted last.
    for cell in view.cells.iter().rev() {
        let Some((x, y)) = cell_to_terminal(inner, cell.position) else {
            continue;
        };

        let (glyph, style) = if cell.is_head {
            (GLYPH_SNAKE_HEAD, head_style)
        } else {
            (GLYPH_SNAKE_BODY, body_style)
        };
        for offset in 0..COLUMNS_PER_CELL {
            buffer.set_string(x + offset, y, glyph, style);
        }
    }
}

fn cell_to_terminal(inner: Rect, position: Position) -> Option<(u16, u16)> {
    let x_offset = u16::try_from(position.x).ok()?.checked_mul(COLUMNS_PER_CELL)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(COLUMNS_PER_CELL) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use crate::app::{App, AppOptions};
    use crate::config::{DifficultyMode, GLYPH_SNAKE_HEAD, THEME_NEON};
    use crate::input::Direction;
    use crate::persistence::MemoryStorage;
    use crate::snake::{Position, Snake};
    use crate::timer::ManualTimer;

    use super::{board_fits, cell_to_terminal, render, required_size};

    #[test]
    fn cells_map_to_two_columns() {
        let inner = Rect::new(1, 1, 40, 20);

        assert_eq!(cell_to_terminal(inner, Position { x: 0, y: 0 }), Some((1, 1)));
        assert_eq!(cell_to_terminal(inner, Position { x: 3, y: 2 }), Some((7, 3)));
        assert_eq!(cell_to_terminal(inner, Position { x: 20, y: 0 }), None);
        assert_eq!(cell_to_terminal(inner, Position { x: -1, y: 0 }), None);
    }

    fn draw_to_string(app: &App<MemoryStorage, ManualTimer>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
        terminal
            .draw(|frame| render(frame, app, &THEME_NEON))
            .expect("draw should succeed");

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn frame_shows_start_menu_then_board() {
        let mut app = App::new(
            MemoryStorage::new(),
            ManualTimer::new(),
            ManualTimer::new(),
            AppOptions {
                seed: Some(1),
                mode: Some(DifficultyMode::Easy),
                ..AppOptions::default()
            },
        );

        let start = draw_to_string(&app, 80, 30);
        assert!(start.contains("Enter"));
        assert!(start.contains("SCORE"));

        app.new_game();
        let playing = draw_to_string(&app, 80, 30);
        assert!(playing.contains(GLYPH_SNAKE_HEAD));
        assert!(!playing.contains("Enter"));
    }

    #[test]
    fn board_size_includes_border_and_hud() {
        assert_eq!(required_size(DifficultyMode::Hard.board()), (62, 34));
        assert!(!board_fits(Rect::new(0, 0, 80, 24), DifficultyMode::Hard.board()));
        assert!(board_fits(Rect::new(0, 0, 62, 34), DifficultyMode::Hard.board()));
        assert!(board_fits(Rect::new(0, 0, 80, 24), DifficultyMode::Medium.board()));
    }

    #[test]
    fn oversized_board_is_replaced_by_resize_notice() {
        let mut app = App::new(
            MemoryStorage::new(),
            ManualTimer::new(),
            ManualTimer::new(),
            AppOptions {
                seed: Some(1),
                mode: Some(DifficultyMode::Hard),
                ..AppOptions::default()
            },
        );
        app.new_game();
        app.state_mut().snake = Snake::new(Position { x: 15, y: 27 }, 3, Direction::Down);
        app.pause();

        let small = draw_to_string(&app, 80, 24);
        assert!(small.contains("TERMINAL TOO SMALL"));
        assert!(small.contains("HARD needs 62×34"));
        assert!(!small.contains(GLYPH_SNAKE_HEAD));

        let large = draw_to_string(&app, 80, 34);
        assert!(!large.contains("TERMINAL TOO SMALL"));
        assert!(large.contains(GLYPH_SNAKE_HEAD));
    }

    #[test]
    fn dialogs_stay_visible_over_the_resize_notice() {
        let mut app = App::new(
            MemoryStorage::new(),
            ManualTimer::new(),
            ManualTimer::new(),
            AppOptions {
                seed: Some(1),
                mode: Some(DifficultyMode::Hard),
                ..AppOptions::default()
            },
        );
        app.new_game();
        app.handle_key("r");

        let frame = draw_to_string(&app, 80, 24);
        assert!(frame.contains("ARE YOU SURE?"));
        assert!(!frame.contains("TERMINAL TOO SMALL"));
    }
}
