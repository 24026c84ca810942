use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{BoardConfig, DifficultyMode, GridSize, INITIAL_SNAKE_LENGTH};
use crate::food::Food;
use crate::input::Direction;
use crate::snake::{Position, Snake};

/// Reason the last session ended on a collision.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StepOutcome {
    Moved,
    /// The head landed on the food; the snake grew and new food was placed.
    Ate,
    Died(DeathReason),
    /// The snake grew into the last free cell, leaving nowhere for food.
    BoardFilled,
}

/// Self-collision policy.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CollisionRules {
    /// When set, moving into the current tail cell is legal on a tick
    /// without growth. Off by default: the tail is checked before it moves.
    pub tail_vacates: bool,
}

/// Board, snake and food for one session, plus the food RNG.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub food: Food,
    mode: DifficultyMode,
    rules: CollisionRules,
    rng: StdRng,
}

impl GameState {
    /// Creates a fresh board: a straight snake facing right from the centre.
    #[must_use]
    pub fn new(mode: DifficultyMode, rules: CollisionRules, mut rng: StdRng) -> Self {
        let bounds = mode.board().grid;
        let snake = Snake::new(start_position(bounds), INITIAL_SNAKE_LENGTH, Direction::Right);
        let food = Food::spawn(&mut rng, bounds, &snake)
            .expect("preset boards are larger than the initial snake");

        Self {
            snake,
            food,
            mode,
            rules,
            rng,
        }
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(mode: DifficultyMode, seed: u64) -> Self {
        Self::new(mode, CollisionRules::default(), StdRng::seed_from_u64(seed))
    }

    /// Replaces the board with a fresh one for `mode`, keeping the RNG stream.
    pub fn reset(&mut self, mode: DifficultyMode) {
        let bounds = mode.board().grid;
        self.mode = mode;
        self.snake = Snake::new(start_position(bounds), INITIAL_SNAKE_LENGTH, Direction::Right);
        self.food = Food::spawn(&mut self.rng, bounds, &self.snake)
            .expect("preset boards are larger than the initial snake");
    }

    /// Installs a restored board as-is.
    pub fn restore(&mut self, mode: DifficultyMode, snake: Snake, food: Food) {
        self.mode = mode;
        self.snake = snake;
        self.food = food;
    }

    #[must_use]
    pub fn mode(&self) -> DifficultyMode {
        self.mode
    }

    #[must_use]
    pub fn board(&self) -> BoardConfig {
        self.mode.board()
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.mode.board().grid
    }

    /// Advances the snake one cell.
    ///
    /// Collisions leave the snake untouched. The self-collision test runs
    /// against the body as it was before the move, tail included, unless
    /// [`CollisionRules::tail_vacates`] is set.
    pub fn advance(&mut self) -> StepOutcome {
        let direction = self.snake.commit_direction();
        let next_head = self.snake.head().shifted(direction);
        let bounds = self.bounds();

        if !next_head.is_within_bounds(bounds) {
            return StepOutcome::Died(DeathReason::WallCollision);
        }

        let ate = next_head == self.food.position;
        let hit_body = if self.rules.tail_vacates && !ate {
            self.snake.occupies_ahead_of_tail(next_head)
        } else {
            self.snake.occupies(next_head)
        };
        if hit_body {
            return StepOutcome::Died(DeathReason::SelfCollision);
        }

        self.snake.advance(next_head, ate);
        if !ate {
            return StepOutcome::Moved;
        }

        match Food::spawn(&mut self.rng, bounds, &self.snake) {
            Some(food) => {
                self.food = food;
                StepOutcome::Ate
            }
            None => StepOutcome::BoardFilled,
        }
    }
}

fn start_position(bounds: GridSize) -> Position {
    Position {
        x: i32::from(bounds.width / 2),
        y: i32::from(bounds.height / 2),
    }
}
