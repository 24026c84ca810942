use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::snake::{Position, Snake};

/// Uniform draws tried before falling back to a scan of the free cells.
pub const MAX_SAMPLE_ATTEMPTS: usize = 1024;

/// Food entity currently active on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Food {
    pub position: Position,
}

impl Food {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Spawns food in an unoccupied cell, or `None` when the snake fills the board.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize, snake: &Snake) -> Option<Self> {
        spawn_position(rng, bounds, snake).map(Self::new)
    }
}

/// Picks a free cell uniformly at random.
///
/// Draws whole-board cells until one is free; after [`MAX_SAMPLE_ATTEMPTS`]
/// misses it picks uniformly among the remaining free cells instead, which
/// also detects a saturated board.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Option<Position> {
    if bounds.total_cells() == 0 {
        return None;
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let candidate = Position {
            x: rng.gen_range(0..i32::from(bounds.width)),
            y: rng.gen_range(0..i32::from(bounds.height)),
        };
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    let mut candidates = Vec::new();
    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}
