use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::input::{Direction, direction_change_is_valid};

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns true when `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    /// Returns the neighbouring cell one step along `direction`.
    #[must_use]
    pub fn shifted(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self {
                x: self.x,
                y: self.y - 1,
            },
            Direction::Down => Self {
                x: self.x,
                y: self.y + 1,
            },
            Direction::Left => Self {
                x: self.x - 1,
                y: self.y,
            },
            Direction::Right => Self {
                x: self.x + 1,
                y: self.y,
            },
        }
    }
}

/// Snake body (head first), committed direction and the pending turn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    pending_direction: Option<Direction>,
}

impl Snake {
    /// Creates a straight snake of `length` cells whose head is at `head`,
    /// trailing away from `direction`.
    #[must_use]
    pub fn new(head: Position, length: usize, direction: Direction) -> Self {
        let trail = direction.opposite();
        let mut body = VecDeque::with_capacity(length.max(1));
        let mut cell = head;
        for _ in 0..length.max(1) {
            body.push_back(cell);
            cell = cell.shifted(trail);
        }

        Self {
            body,
            direction,
            pending_direction: None,
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// Returns `None` for an empty segment list.
    #[must_use]
    pub fn from_segments(
        segments: Vec<Position>,
        direction: Direction,
        pending_direction: Option<Direction>,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }

        Some(Self {
            body: VecDeque::from(segments),
            direction,
            pending_direction,
        })
    }

    /// Buffers a turn for the next tick.
    ///
    /// Reversals are judged against the committed direction, never against
    /// the pending one, and a later accepted request overwrites an earlier
    /// one. Returns whether the request was accepted.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.direction, direction) {
            return false;
        }

        self.pending_direction = Some(direction);
        true
    }

    /// Promotes the pending turn (if any) to the committed direction.
    pub fn commit_direction(&mut self) -> Direction {
        if let Some(next) = self.pending_direction.take() {
            self.direction = next;
        }
        self.direction
    }

    /// Returns the head position one step along the committed direction.
    #[must_use]
    pub fn next_head_position(&self) -> Position {
        self.head().shifted(self.direction)
    }

    /// Pushes `head` to the front and drops the tail unless `grow` is set.
    pub fn advance(&mut self, head: Position, grow: bool) {
        self.body.push_front(head);
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the current tail position.
    #[must_use]
    pub fn tail(&self) -> Position {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns true if any segment except the tail occupies `position`.
    #[must_use]
    pub fn occupies_ahead_of_tail(&self, position: Position) -> bool {
        let ahead = self.body.len().saturating_sub(1);
        self.body.iter().take(ahead).any(|segment| *segment == position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the committed movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the buffered turn for the next tick.
    #[must_use]
    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    /// Returns true when the body is a chain of distinct, edge-adjacent
    /// cells and neither the committed nor the pending direction leads the
    /// head back into its neck.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let chained = self
            .body
            .iter()
            .zip(self.body.iter().skip(1))
            .all(|(front, back)| front.is_adjacent(*back));

        let mut seen = HashSet::with_capacity(self.body.len());
        let distinct = self.body.iter().all(|cell| seen.insert(*cell));

        let turn_valid = self
            .pending_direction
            .is_none_or(|next| direction_change_is_valid(self.direction, next));
        let clear_of_neck = self
            .body
            .get(1)
            .is_none_or(|neck| self.head().shifted(self.direction) != *neck);

        chained && distinct && turn_valid && clear_of_neck
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::input::Direction;

    use super::{Position, Snake};

    #[test]
    fn new_snake_trails_behind_the_head() {
        let snake = Snake::new(Position { x: 10, y: 10 }, 3, Direction::Right);

        let cells: Vec<Position> = snake.segments().copied().collect();
        assert_eq!(
            cells,
            vec![
                Position { x: 10, y: 10 },
                Position { x: 9, y: 10 },
                Position { x: 8, y: 10 },
            ]
        );
        assert_eq!(snake.tail(), Position { x: 8, y: 10 });
    }

    #[test]
    fn snake_moves_one_cell_per_advance() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Right);

        let next = snake.next_head_position();
        snake.advance(next, false);

        assert_eq!(snake.head(), Position { x: 6, y: 5 });
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn growth_keeps_previous_tail() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Right);

        let next = snake.next_head_position();
        snake.advance(next, true);

        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Position { x: 3, y: 5 });
    }

    #[test]
    fn reversal_request_is_rejected() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Up);

        assert!(!snake.request_direction(Direction::Down));
        assert_eq!(snake.pending_direction(), None);
        assert_eq!(snake.commit_direction(), Direction::Up);
    }

    #[test]
    fn reversal_is_judged_against_committed_direction() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Right);

        // Up is accepted, then Left is still the reverse of the committed Right.
        assert!(snake.request_direction(Direction::Up));
        assert!(!snake.request_direction(Direction::Left));
        assert_eq!(snake.pending_direction(), Some(Direction::Up));
    }

    #[test]
    fn later_accepted_request_overwrites_pending() {
        let mut snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Right);

        snake.request_direction(Direction::Up);
        snake.request_direction(Direction::Down);

        assert_eq!(snake.commit_direction(), Direction::Down);
        assert_eq!(snake.pending_direction(), None);
    }

    #[test]
    fn tail_exclusion_only_skips_the_last_segment() {
        let snake = Snake::new(Position { x: 5, y: 5 }, 3, Direction::Right);

        assert!(snake.occupies(Position { x: 3, y: 5 }));
        assert!(!snake.occupies_ahead_of_tail(Position { x: 3, y: 5 }));
        assert!(snake.occupies_ahead_of_tail(Position { x: 4, y: 5 }));
    }

    #[test]
    fn empty_segments_are_rejected() {
        assert!(Snake::from_segments(Vec::new(), Direction::Up, None).is_none());
    }

    #[test]
    fn well_formed_body_is_one_chain_of_distinct_cells() {
        let straight = Snake::new(Position { x: 5, y: 5 }, 4, Direction::Up);
        assert!(straight.is_well_formed());

        let gap = Snake::from_segments(
            vec![Position { x: 5, y: 5 }, Position { x: 3, y: 5 }],
            Direction::Right,
            None,
        )
        .expect("non-empty");
        assert!(!gap.is_well_formed());

        let doubled = Snake::from_segments(
            vec![
                Position { x: 5, y: 5 },
                Position { x: 4, y: 5 },
                Position { x: 5, y: 5 },
            ],
            Direction::Right,
            None,
        )
        .expect("non-empty");
        assert!(!doubled.is_well_formed());
    }

    #[test]
    fn heading_into_the_neck_is_not_well_formed() {
        let cells = vec![
            Position { x: 5, y: 5 },
            Position { x: 4, y: 5 },
            Position { x: 3, y: 5 },
        ];

        let backwards =
            Snake::from_segments(cells.clone(), Direction::Left, None).expect("non-empty");
        assert!(!backwards.is_well_formed());

        let reversing_turn = Snake::from_segments(cells.clone(), Direction::Up, Some(Direction::Down))
            .expect("non-empty");
        assert!(!reversing_turn.is_well_formed());

        let turning = Snake::from_segments(cells, Direction::Right, Some(Direction::Down))
            .expect("non-empty");
        assert!(turning.is_well_formed());
    }
}
