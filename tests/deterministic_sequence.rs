use neon_snake::app::{App, AppOptions, EndReason, Screen};
use neon_snake::config::DifficultyMode;
use neon_snake::food::Food;
use neon_snake::game::{DeathReason, StepOutcome};
use neon_snake::input::Direction;
use neon_snake::persistence::{MemoryStorage, Storage, keys};
use neon_snake::snake::{Position, Snake};
use neon_snake::timer::ManualTimer;

fn medium_app(seed: u64) -> App<MemoryStorage, ManualTimer> {
    App::new(
        MemoryStorage::new(),
        ManualTimer::new(),
        ManualTimer::new(),
        AppOptions {
            seed: Some(seed),
            mode: Some(DifficultyMode::Medium),
            ..AppOptions::default()
        },
    )
}

#[test]
fn stepwise_food_collection_and_wall_collision() {
    let mut app = medium_app(42);
    app.set_speed(3);
    app.new_game();
    app.state_mut().food = Food::new(Position { x: 11, y: 10 });

    assert_eq!(app.step(), Some(StepOutcome::Ate));
    assert_eq!(app.session().score, 30);
    assert_eq!(app.state().snake.len(), 4);
    assert_eq!(app.state().snake.head(), Position { x: 11, y: 10 });

    app.handle_key("ArrowUp");
    app.state_mut().food = Food::new(Position { x: 0, y: 19 });
    assert_eq!(app.step(), Some(StepOutcome::Moved));
    assert_eq!(app.state().snake.head(), Position { x: 11, y: 9 });

    for _ in 0..9 {
        app.state_mut().food = Food::new(Position { x: 0, y: 19 });
        assert_eq!(app.step(), Some(StepOutcome::Moved));
    }
    assert_eq!(app.state().snake.head(), Position { x: 11, y: 0 });

    assert_eq!(
        app.step(),
        Some(StepOutcome::Died(DeathReason::WallCollision))
    );
    assert!(!app.session().active);
    assert_eq!(app.screen(), Some(Screen::GameOver));
    assert_eq!(app.last_result().map(|summary| summary.score), Some(30));
}

#[test]
fn right_wall_on_twenty_wide_board_ends_session() {
    let mut app = medium_app(1);
    app.set_speed(2);
    app.new_game();
    app.state_mut().snake = Snake::new(Position { x: 19, y: 10 }, 3, Direction::Right);
    app.state_mut().food = Food::new(Position { x: 0, y: 0 });

    let outcome = app.step();

    assert_eq!(outcome, Some(StepOutcome::Died(DeathReason::WallCollision)));
    let summary = app.last_result().expect("game over summary");
    assert_eq!(
        summary.reason,
        EndReason::Collision(DeathReason::WallCollision)
    );
    assert_eq!(summary.score, 0);
    assert_eq!(
        app.persistence()
            .storage()
            .get(keys::ACTIVE_STATE)
            .expect("memory get"),
        None
    );
}

#[test]
fn length_grows_exactly_when_food_is_eaten() {
    let mut app = medium_app(2024);
    app.new_game();

    // Staircase to the right: always reaches a wall eventually.
    let turns = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Right,
    ];
    let mut games = 0;
    for tick in 0..2_000usize {
        if !app.session().active {
            games += 1;
            app.new_game();
        }

        if tick % 5 == 0 {
            app.state_mut()
                .snake
                .request_direction(turns[(tick / 5) % turns.len()]);
        }

        let length_before = app.state().snake.len();
        let food_before = app.state().food.position;
        let next_head = {
            let snake = &app.state().snake;
            let direction = snake.pending_direction().unwrap_or(snake.direction());
            snake.head().shifted(direction)
        };

        match app.step() {
            Some(StepOutcome::Ate) => {
                assert_eq!(next_head, food_before);
                assert_eq!(app.state().snake.len(), length_before + 1);
            }
            Some(StepOutcome::Moved) => {
                assert_ne!(next_head, food_before);
                assert_eq!(app.state().snake.len(), length_before);
            }
            Some(_) => assert_eq!(app.state().snake.len(), length_before),
            None => panic!("running session should always step"),
        }

        let food = app.state().food.position;
        assert!(!app.state().snake.occupies(food) || !app.session().active);
    }

    assert!(games > 0, "the walk should hit something at least once");
}
