use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{EndReason, GameOverSummary};
use crate::config::{DifficultyMode, Theme};
use crate::confirm::DestructiveAction;
use crate::game::DeathReason;
use crate::input::{BindableAction, KeyBindings, display_key};
use crate::session::format_time;
use crate::ui::hud::format_score;

const POPUP_WIDTH: u16 = 40;
const REMAP_LABEL_WIDTH: usize = 10;

/// Draws the start screen as a centered popup.
pub fn render_start_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    high_score: u32,
    mode: DifficultyMode,
    speed_level: u32,
    theme: &Theme,
) {
    let lines = vec![
        title_line("NEON SNAKE", theme),
        Line::from(""),
        Line::from(format!("High score: {}", format_score(high_score))),
        Line::from(format!(
            "Board: {} · Speed: {speed_level}",
            mode.as_str().to_uppercase()
        )),
        Line::from(""),
        Line::from("[Enter]/[Space] Start"),
        Line::from("[Q] Quit"),
    ];
    render_popup(frame, area, " start ", lines, theme);
}

/// Draws the pause screen as a centered popup.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect, score: u32, theme: &Theme) {
    let lines = vec![
        title_line("PAUSED", theme),
        Line::from(""),
        Line::from(format!("Score: {}", format_score(score))),
        Line::from(""),
        Line::from("[Enter]/[Esc] Resume"),
        Line::from("[R] Restart · [Q] Quit"),
    ];
    render_popup(frame, area, " pause ", lines, theme);
}

/// Draws the game-over screen as a centered popup.
pub fn render_game_over_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    summary: GameOverSummary,
    high_score: u32,
    theme: &Theme,
) {
    let cause = match summary.reason {
        EndReason::Collision(DeathReason::WallCollision) => "Cause: hit the wall",
        EndReason::Collision(DeathReason::SelfCollision) => "Cause: hit yourself",
        EndReason::BoardFilled => "The board is full!",
    };

    let lines = vec![
        title_line("GAME OVER", theme),
        Line::from(""),
        Line::from(format!("Final score: {}", format_score(summary.score))),
        Line::from(format!("High score: {}", format_score(high_score))),
        Line::from(format!(
            "Length: {} · Time: {}",
            summary.length,
            format_time(summary.elapsed_seconds)
        )),
        Line::from(cause),
        Line::from(if summary.new_high_score {
            "New high score!"
        } else {
            ""
        }),
        Line::from(""),
        Line::from("[Enter]/[Space] Play Again"),
        Line::from("[Q] Quit"),
    ];
    render_popup(frame, area, " game over ", lines, theme);
}

/// Draws the yes/no confirmation for a destructive action.
pub fn render_confirm_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    action: DestructiveAction,
    theme: &Theme,
) {
    let question = match action {
        DestructiveAction::Reboot => "Restart and lose this game?".to_owned(),
        DestructiveAction::ChangeMode(mode) => {
            format!("Switch to {} and lose this game?", mode.as_str().to_uppercase())
        }
    };

    let lines = vec![
        title_line("ARE YOU SURE?", theme),
        Line::from(""),
        Line::from(question),
        Line::from(""),
        Line::from("[Y]/[Enter] Yes · [N]/[Esc] No"),
    ];
    render_popup(frame, area, " confirm ", lines, theme);
}

/// Draws the key remap dialog listing the draft bindings.
pub fn render_key_remap_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    bindings: &KeyBindings,
    cursor: usize,
    capturing: Option<BindableAction>,
    theme: &Theme,
) {
    let selected = Style::default()
        .fg(theme.hud_value)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![title_line("CONTROLS", theme), Line::from("")];
    for (index, (action, key)) in bindings.iter().enumerate() {
        let marker = if index == cursor { "▶ " } else { "  " };
        let text = format!(
            "{marker}{}{}",
            pad_to_width(action.label(), REMAP_LABEL_WIDTH),
            display_key(key)
        );
        lines.push(if index == cursor {
            Line::styled(text, selected)
        } else {
            Line::from(text)
        });
    }

    lines.push(Line::from(""));
    lines.push(match capturing {
        Some(action) => Line::styled(
            format!("Press a key for {}", action.label().to_uppercase()),
            selected,
        ),
        None => Line::from("[Enter] Rebind · [S] Save · [Esc] Cancel"),
    });
    render_popup(frame, area, " key remap ", lines, theme);
}

/// Draws the help screen.
pub fn render_help_menu(frame: &mut Frame<'_>, area: Rect, controls_hint: &str, theme: &Theme) {
    let lines = vec![
        title_line("HOW TO PLAY", theme),
        Line::from(""),
        Line::from("Eat the food to grow."),
        Line::from("Each bite scores 10 × speed level."),
        Line::from("Walls and your own body are fatal."),
        Line::from(""),
        Line::from(controls_hint.to_owned()),
        Line::from("Speed: 1-5 · Restart: R"),
        Line::from("Board: F5 Easy · F6 Medium · F7 Hard"),
        Line::from(""),
        Line::from("[Esc]/[Enter] Close"),
    ];
    render_popup(frame, area, " help ", lines, theme);
}

/// Draws the notice shown instead of a board the terminal cannot hold.
pub fn render_too_small_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    mode: DifficultyMode,
    needed: (u16, u16),
    available: (u16, u16),
    theme: &Theme,
) {
    let lines = vec![
        title_line("TERMINAL TOO SMALL", theme),
        Line::from(""),
        Line::from(format!(
            "{} needs {}×{}",
            mode.as_str().to_uppercase(),
            needed.0,
            needed.1
        )),
        Line::from(format!("This terminal is {}×{}", available.0, available.1)),
        Line::from(""),
        Line::from("Enlarge it or pick a smaller board"),
        Line::from("F5 Easy · F6 Medium · [Q] Quit"),
    ];
    render_popup(frame, area, " resize ", lines, theme);
}

fn title_line(text: &str, theme: &Theme) -> Line<'static> {
    Line::styled(
        text.to_owned(),
        Style::default()
            .fg(theme.menu_title)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_popup(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &'static str,
    lines: Vec<Line<'static>>,
    theme: &Theme,
) {
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_popup(area, POPUP_WIDTH, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.play_bg))
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(theme.border_fg)),
            ),
        popup,
    );
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let [mid] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(mid);

    center
}

/// Pads `text` with spaces to `width` display columns.
fn pad_to_width(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(padding))
}
