use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::{DifficultyMode, Theme};
use crate::session::format_time;

const HUD_MARGIN_X: u16 = 2;
/// Rows taken by the HUD above the play area.
pub const HUD_HEIGHT: u16 = 2;
const FUNCTION_KEYS_HINT: &str = "F1 Help · F2 Keys · F5/F6/F7 Easy/Medium/Hard";

/// Values displayed by the HUD rows.
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    pub score: u32,
    pub high_score: u32,
    pub elapsed_seconds: u64,
    pub best_time: u64,
    pub speed_level: u32,
    pub mode: DifficultyMode,
    pub controls_hint: &'a str,
}

/// Renders the two HUD rows and returns the remaining play area below them.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: &HudInfo<'_>, theme: &Theme) -> Rect {
    let [stats_area, hint_area, play_area] = Layout::vertical([
        Constraint::Length(HUD_HEIGHT / 2),
        Constraint::Length(HUD_HEIGHT / 2),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(stats_line(info, theme)).alignment(Alignment::Center),
        inset_horizontal(stats_area, HUD_MARGIN_X),
    );

    frame.render_widget(
        Paragraph::new(Line::from(format!(
            "{} · {FUNCTION_KEYS_HINT}",
            info.controls_hint
        )))
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.menu_footer)),
        inset_horizontal(hint_area, HUD_MARGIN_X),
    );

    play_area
}

fn stats_line(info: &HudInfo<'_>, theme: &Theme) -> Line<'static> {
    let label = Style::default().fg(theme.hud_label);
    let value = Style::default()
        .fg(theme.hud_value)
        .add_modifier(Modifier::BOLD);

    let fields = [
        ("SCORE", format_score(info.score)),
        ("HI", format_score(info.high_score)),
        ("TIME", format_time(info.elapsed_seconds)),
        ("BEST", format_time(info.best_time)),
        ("SPEED", info.speed_level.to_string()),
        ("MODE", info.mode.as_str().to_uppercase()),
    ];

    let mut spans = Vec::with_capacity(fields.len() * 3);
    for (index, (name, text)) in fields.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(format!("{name} "), label));
        spans.push(Span::styled(text, value));
    }

    Line::from(spans)
}

/// Scores are shown zero-padded to four digits.
#[must_use]
pub fn format_score(score: u32) -> String {
    format!("{score:04}")
}

fn inset_horizontal(area: Rect, margin: u16) -> Rect {
    let total_margin = margin.saturating_mul(2);
    Rect {
        x: area.x.saturating_add(margin),
        y: area.y,
        width: area.width.saturating_sub(total_margin),
        height: area.height,
    }
}
