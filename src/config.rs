use std::fmt;
use std::time::Duration;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Board geometry derived from a difficulty preset.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BoardConfig {
    pub grid: GridSize,
    /// Edge length of one cell in canvas units.
    pub cell_size: u16,
}

impl BoardConfig {
    /// Returns the square board edge in canvas units.
    #[must_use]
    pub fn pixel_size(self) -> (u32, u32) {
        (
            u32::from(self.grid.width) * u32::from(self.cell_size),
            u32::from(self.grid.height) * u32::from(self.cell_size),
        )
    }
}

/// Named board-size presets.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMode {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyMode {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Returns the board this preset plays on.
    #[must_use]
    pub fn board(self) -> BoardConfig {
        let cells = match self {
            Self::Easy => 15,
            Self::Medium => 20,
            Self::Hard => 30,
        };

        BoardConfig {
            grid: GridSize {
                width: cells,
                height: cells,
            },
            cell_size: CELL_SIZE,
        }
    }

    /// Returns the persisted identifier of the preset.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parses a persisted identifier; unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == raw)
    }
}

impl fmt::Display for DifficultyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge length of one board cell in canvas units, shared by every preset.
pub const CELL_SIZE: u16 = 20;

/// Number of segments a fresh snake starts with.
pub const INITIAL_SNAKE_LENGTH: usize = 3;

pub const MIN_SPEED_LEVEL: u32 = 1;
pub const MAX_SPEED_LEVEL: u32 = 5;
pub const DEFAULT_SPEED_LEVEL: u32 = 1;

/// Score per food item is this value times the active speed level.
pub const POINTS_PER_SPEED_LEVEL: u32 = 10;

/// Period of the elapsed-time counter.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Returns true when `level` is a selectable speed level.
#[must_use]
pub fn is_valid_speed_level(level: u32) -> bool {
    (MIN_SPEED_LEVEL..=MAX_SPEED_LEVEL).contains(&level)
}

/// Movement tick period for a speed level: level 1 is 150 ms, level 5 is 50 ms.
///
/// Levels outside the selectable range are clamped first.
#[must_use]
pub fn tick_interval_for_speed(level: u32) -> Duration {
    let level = level.clamp(MIN_SPEED_LEVEL, MAX_SPEED_LEVEL);
    Duration::from_millis(175 - 25 * u64::from(level))
}

/// Colour palette applied to all visual elements.
#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub grid: Color,
    pub play_bg: Color,
    pub border_fg: Color,
    pub hud_value: Color,
    pub hud_label: Color,
    pub menu_title: Color,
    pub menu_footer: Color,
}

pub const THEME_NEON: Theme = Theme {
    name: "Neon",
    snake_head: Color::Rgb(0, 242, 255),
    snake_body: Color::Rgb(0, 84, 92),
    food: Color::Rgb(255, 0, 85),
    grid: Color::Rgb(38, 38, 46),
    play_bg: Color::Rgb(8, 8, 14),
    border_fg: Color::Rgb(0, 242, 255),
    hud_value: Color::Rgb(0, 242, 255),
    hud_label: Color::Gray,
    menu_title: Color::Rgb(255, 0, 85),
    menu_footer: Color::DarkGray,
};

pub const GLYPH_FOOD: &str = "●";
pub const GLYPH_SNAKE_HEAD: &str = "█";
pub const GLYPH_SNAKE_BODY: &str = "▓";
pub const GLYPH_GRID: &str = "·";

#[cfg(test)]
mod tests {
    use super::{DifficultyMode, is_valid_speed_level, tick_interval_for_speed};
    use std::time::Duration;

    #[test]
    fn tick_interval_follows_speed_formula() {
        assert_eq!(tick_interval_for_speed(1), Duration::from_millis(150));
        assert_eq!(tick_interval_for_speed(3), Duration::from_millis(100));
        assert_eq!(tick_interval_for_speed(5), Duration::from_millis(50));
    }

    #[test]
    fn tick_interval_clamps_out_of_range_levels() {
        assert_eq!(tick_interval_for_speed(0), Duration::from_millis(150));
        assert_eq!(tick_interval_for_speed(9), Duration::from_millis(50));
    }

    #[test]
    fn speed_level_range_is_one_to_five() {
        assert!(!is_valid_speed_level(0));
        assert!(is_valid_speed_level(1));
        assert!(is_valid_speed_level(5));
        assert!(!is_valid_speed_level(6));
    }

    #[test]
    fn presets_have_expected_board_sizes() {
        assert_eq!(DifficultyMode::Easy.board().grid.width, 15);
        assert_eq!(DifficultyMode::Medium.board().grid.height, 20);
        assert_eq!(DifficultyMode::Hard.board().grid.total_cells(), 900);
        assert_eq!(DifficultyMode::Medium.board().pixel_size(), (400, 400));
    }

    #[test]
    fn mode_identifiers_parse_back() {
        for mode in DifficultyMode::ALL {
            assert_eq!(DifficultyMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(DifficultyMode::parse("nightmare"), None);
    }
}
