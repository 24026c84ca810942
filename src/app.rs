use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::{
    BoardConfig, CLOCK_PERIOD, DEFAULT_SPEED_LEVEL, DifficultyMode, tick_interval_for_speed,
};
use crate::confirm::{ConfirmationGate, DestructiveAction, GateDecision};
use crate::game::{CollisionRules, DeathReason, GameState, StepOutcome};
use crate::input::{Action, BindableAction, ESCAPE_KEY, InputMapper, KeyBindings, controls_hint};
use crate::persistence::{Persistence, Snapshot, Storage};
use crate::session::Session;
use crate::snake::Position;
use crate::timer::Scheduler;

pub const HELP_KEY: &str = "F1";
pub const REMAP_KEY: &str = "F2";
pub const QUIT_KEY: &str = "q";
const ENTER_KEY: &str = "Enter";
const SPACE_KEY: &str = " ";

/// Overlay screens. At most one is visible at a time.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Screen {
    Start,
    Pause,
    GameOver,
    Confirm,
    KeyRemap,
    Help,
}

/// Why the last session ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EndReason {
    Collision(DeathReason),
    BoardFilled,
}

/// Final numbers of a finished session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GameOverSummary {
    pub score: u32,
    pub elapsed_seconds: u64,
    pub length: usize,
    pub reason: EndReason,
    pub new_high_score: bool,
}

/// Start-up options resolved from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppOptions {
    pub rules: CollisionRules,
    pub seed: Option<u64>,
    /// Overrides and persists the saved board mode.
    pub mode: Option<DifficultyMode>,
    /// Overrides and persists the saved speed level.
    pub speed_level: Option<u32>,
}

/// One board cell as the renderer sees it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CellView {
    pub position: Position,
    pub is_head: bool,
}

/// Read-only picture of the board for one redraw.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BoardView {
    pub board: BoardConfig,
    pub cells: Vec<CellView>,
    pub food: Position,
}

/// Owns the game state and routes every timer tick and key press.
///
/// `movement` drives [`App::step`] and `clock` drives [`App::tick_clock`];
/// the caller fires them, the app only starts and stops them.
#[derive(Debug)]
pub struct App<S: Storage, T: Scheduler> {
    state: GameState,
    session: Session,
    persistence: Persistence<S>,
    movement: T,
    clock: T,
    input: InputMapper,
    gate: ConfirmationGate,
    screen: Option<Screen>,
    overlay_return: Option<Option<Screen>>,
    remap_cursor: usize,
    high_score: u32,
    beat_high_score: bool,
    best_time: u64,
    last_result: Option<GameOverSummary>,
    redraw: bool,
}

impl<S: Storage, T: Scheduler> App<S, T> {
    /// Loads preferences from `storage` and resumes a saved game if there is one.
    pub fn new(storage: S, movement: T, clock: T, options: AppOptions) -> Self {
        let mut persistence = Persistence::new(storage);

        let mode = match options.mode {
            Some(mode) => {
                persistence.set_mode(mode);
                mode
            }
            None => persistence.mode().unwrap_or_default(),
        };
        let speed_level = match options.speed_level {
            Some(level) => {
                persistence.set_speed_level(level);
                level
            }
            None => persistence.speed_level().unwrap_or(DEFAULT_SPEED_LEVEL),
        };

        let rng = options
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let input = InputMapper::new(persistence.key_bindings());

        let mut app = Self {
            state: GameState::new(mode, options.rules, rng),
            session: Session::idle(speed_level),
            high_score: persistence.high_score(),
            beat_high_score: false,
            best_time: persistence.best_time(),
            persistence,
            movement,
            clock,
            input,
            gate: ConfirmationGate::new(),
            screen: Some(Screen::Start),
            overlay_return: None,
            remap_cursor: 0,
            last_result: None,
            redraw: true,
        };

        app.restore_saved_game();
        app
    }

    /// Resumes the persisted game, always in the paused state.
    fn restore_saved_game(&mut self) -> bool {
        let Some(snapshot) = self.persistence.load_snapshot() else {
            return false;
        };

        let Some(mut session) = snapshot.restore_into(&mut self.state) else {
            debug!("discarding snapshot that does not fit its board");
            self.persistence.clear_snapshot();
            return false;
        };

        session.paused = true;
        self.session = session;
        self.beat_high_score = session.score > 0 && session.score >= self.high_score;
        self.screen = Some(Screen::Pause);
        self.persist();
        self.clock.start(CLOCK_PERIOD);
        info!(
            score = session.score,
            length = self.state.snake.len(),
            mode = %self.state.mode(),
            "restored saved game"
        );
        true
    }

    /// Starts a new game on the current board mode.
    pub fn new_game(&mut self) {
        self.start_game(self.state.mode());
    }

    fn start_game(&mut self, mode: DifficultyMode) {
        self.state.reset(mode);
        self.session = Session::started(self.session.speed_level);
        self.beat_high_score = false;
        self.last_result = None;
        self.overlay_return = None;
        self.screen = None;
        self.movement.start(tick_interval_for_speed(self.session.speed_level));
        self.clock.start(CLOCK_PERIOD);
        self.persist();
        self.redraw = true;
        info!(mode = %mode, speed = self.session.speed_level, "game started");
    }

    /// Runs one movement tick. No-op unless the session is active and running.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if !self.session.is_running() {
            return None;
        }

        let outcome = self.state.advance();
        match outcome {
            StepOutcome::Moved => {}
            StepOutcome::Ate => self.award_food(),
            StepOutcome::Died(reason) => {
                self.game_over(EndReason::Collision(reason));
                return Some(outcome);
            }
            StepOutcome::BoardFilled => {
                self.award_food();
                self.game_over(EndReason::BoardFilled);
                return Some(outcome);
            }
        }

        self.persist();
        self.redraw = true;
        Some(outcome)
    }

    fn award_food(&mut self) {
        let score = self.session.award_food();
        if score > self.high_score {
            if !self.beat_high_score {
                info!(previous = self.high_score, "new high score");
            }
            self.high_score = score;
            self.beat_high_score = true;
            self.persistence.set_high_score(score);
        }
    }

    /// Runs one elapsed-time tick. No-op unless the session is running.
    pub fn tick_clock(&mut self) -> bool {
        if !self.session.is_running() {
            return false;
        }

        self.session.elapsed_seconds += 1;
        if self.session.elapsed_seconds > self.best_time {
            self.best_time = self.session.elapsed_seconds;
            self.persistence.set_best_time(self.best_time);
        }

        self.persist();
        self.redraw = true;
        true
    }

    fn game_over(&mut self, reason: EndReason) {
        self.session.active = false;
        self.session.paused = false;
        self.movement.stop();
        self.clock.stop();
        self.persistence.clear_snapshot();

        let summary = GameOverSummary {
            score: self.session.score,
            elapsed_seconds: self.session.elapsed_seconds,
            length: self.state.snake.len(),
            reason,
            new_high_score: self.beat_high_score,
        };
        self.last_result = Some(summary);
        self.screen = Some(Screen::GameOver);
        self.redraw = true;
        info!(
            score = summary.score,
            length = summary.length,
            seconds = summary.elapsed_seconds,
            reason = ?reason,
            "game over"
        );
    }

    /// Toggles pause on an active session.
    pub fn toggle_pause(&mut self) {
        if !self.session.active || self.gate.is_pending() {
            return;
        }

        self.session.paused = !self.session.paused;
        self.persist();
        if self.session.paused {
            self.movement.stop();
            self.screen = Some(Screen::Pause);
        } else {
            self.resume_movement();
            self.screen = None;
        }
        self.redraw = true;
        debug!(paused = self.session.paused, "pause toggled");
    }

    /// Pauses a running session; anything else is left alone.
    pub fn pause(&mut self) {
        if self.session.is_running() {
            self.toggle_pause();
        }
    }

    fn resume_movement(&mut self) {
        self.movement
            .start(tick_interval_for_speed(self.session.speed_level));
    }

    /// Selects a speed level; levels outside 1..=5 are ignored.
    pub fn set_speed(&mut self, level: u32) {
        if !self.session.set_speed_level(level) {
            return;
        }

        self.persistence.set_speed_level(level);
        if self.session.is_running() {
            self.resume_movement();
        }
        self.persist();
        self.redraw = true;
        debug!(level, "speed changed");
    }

    /// Requests a restart, asking first when a game would be lost.
    pub fn request_reboot(&mut self) {
        self.guard(DestructiveAction::Reboot);
    }

    /// Requests a board mode change, asking first when a game would be lost.
    pub fn select_mode(&mut self, mode: DifficultyMode) {
        self.guard(DestructiveAction::ChangeMode(mode));
    }

    fn guard(&mut self, action: DestructiveAction) {
        if self.gate.is_pending() {
            return;
        }

        let decision = self.gate.guard(
            action,
            self.session.active,
            self.screen == Some(Screen::GameOver),
            self.session.paused,
        );

        match decision {
            GateDecision::RunNow => self.run_destructive(action, false),
            GateDecision::AwaitConfirmation => {
                self.session.paused = true;
                self.movement.stop();
                self.overlay_return = None;
                self.screen = Some(Screen::Confirm);
                self.persist();
                self.redraw = true;
            }
        }
    }

    fn run_destructive(&mut self, action: DestructiveAction, confirmed: bool) {
        match action {
            DestructiveAction::Reboot => self.new_game(),
            DestructiveAction::ChangeMode(mode) => {
                self.persistence.set_mode(mode);
                info!(mode = %mode, "board mode changed");
                if confirmed {
                    self.start_game(mode);
                } else {
                    self.show_mode_preview(mode);
                }
            }
        }
    }

    fn show_mode_preview(&mut self, mode: DifficultyMode) {
        self.state.reset(mode);
        self.session = Session::idle(self.session.speed_level);
        self.movement.stop();
        self.clock.stop();
        self.last_result = None;
        self.overlay_return = None;
        self.screen = Some(Screen::Start);
        self.persist();
        self.redraw = true;
    }

    /// Answers "yes" on the confirmation screen.
    pub fn confirm(&mut self) {
        if let Some(action) = self.gate.confirm() {
            debug!(?action, "confirmed");
            self.run_destructive(action, true);
        }
    }

    /// Answers "no" on the confirmation screen, restoring the pause state.
    pub fn decline(&mut self) {
        let Some(was_paused) = self.gate.decline() else {
            return;
        };

        self.session.paused = was_paused;
        self.persist();
        if was_paused {
            self.screen = Some(Screen::Pause);
        } else {
            self.resume_movement();
            self.screen = None;
        }
        self.redraw = true;
        debug!(was_paused, "confirmation declined");
    }

    /// Shows the help screen.
    pub fn open_help(&mut self) {
        self.open_overlay(Screen::Help);
    }

    /// Opens the key remap dialog on a copy of the live bindings.
    pub fn open_key_remap(&mut self) {
        if self.open_overlay(Screen::KeyRemap) {
            self.input.open_draft();
            self.remap_cursor = 0;
        }
    }

    fn open_overlay(&mut self, screen: Screen) -> bool {
        if matches!(
            self.screen,
            Some(Screen::Confirm | Screen::KeyRemap | Screen::Help)
        ) {
            return false;
        }

        self.pause();
        self.overlay_return = Some(self.screen);
        self.screen = Some(screen);
        self.redraw = true;
        true
    }

    /// Closes help or the remap dialog, returning to the previous screen.
    pub fn close_overlay(&mut self) {
        if let Some(previous) = self.overlay_return.take() {
            self.screen = previous;
            self.redraw = true;
        }
    }

    /// Arms capture of the next key as `action`'s new binding.
    pub fn begin_rebind(&mut self, action: BindableAction) {
        self.input.begin_capture(action);
        self.redraw = true;
    }

    /// Commits and persists the edited bindings, then closes the dialog.
    pub fn save_key_remap(&mut self) {
        if let Some(bindings) = self.input.commit_draft() {
            self.persistence.set_key_bindings(bindings);
            debug!("key bindings saved");
        }
        self.close_overlay();
    }

    /// Drops the edited bindings and closes the dialog.
    pub fn cancel_key_remap(&mut self) {
        self.input.discard_draft();
        self.close_overlay();
    }

    /// Routes one raw key press.
    pub fn handle_key(&mut self, raw_key: &str) {
        self.redraw = true;

        if self.input.is_capturing() {
            if let Some(Action::BindingCaptured(action)) = self.input.resolve(raw_key) {
                debug!(?action, key = raw_key, "binding captured");
            }
            return;
        }

        match self.screen {
            Some(Screen::Confirm) => {
                match raw_key {
                    ENTER_KEY | "y" | "Y" => self.confirm(),
                    ESCAPE_KEY | "n" | "N" => self.decline(),
                    _ => {}
                }
                return;
            }
            Some(Screen::KeyRemap) => {
                self.handle_remap_key(raw_key);
                return;
            }
            Some(Screen::Help) => {
                if matches!(raw_key, ESCAPE_KEY | ENTER_KEY | HELP_KEY) {
                    self.close_overlay();
                }
                return;
            }
            _ => {}
        }

        match raw_key {
            HELP_KEY => return self.open_help(),
            REMAP_KEY => return self.open_key_remap(),
            "F5" => return self.select_mode(DifficultyMode::Easy),
            "F6" => return self.select_mode(DifficultyMode::Medium),
            "F7" => return self.select_mode(DifficultyMode::Hard),
            ENTER_KEY if self.screen == Some(Screen::Pause) => return self.toggle_pause(),
            ENTER_KEY | SPACE_KEY
                if matches!(self.screen, Some(Screen::Start | Screen::GameOver)) =>
            {
                return self.new_game();
            }
            _ => {}
        }

        match self.input.resolve(raw_key) {
            Some(Action::TogglePause) => self.toggle_pause(),
            Some(Action::Reboot) => self.request_reboot(),
            Some(Action::SelectSpeed(level)) => self.set_speed(level),
            Some(Action::Direction(direction)) => {
                if self.session.is_running() {
                    self.state.snake.request_direction(direction);
                }
            }
            Some(Action::BindingCaptured(_)) | None => {}
        }
    }

    fn handle_remap_key(&mut self, raw_key: &str) {
        let count = BindableAction::ALL.len();
        match raw_key {
            "ArrowUp" => self.remap_cursor = (self.remap_cursor + count - 1) % count,
            "ArrowDown" => self.remap_cursor = (self.remap_cursor + 1) % count,
            ENTER_KEY => self.begin_rebind(BindableAction::ALL[self.remap_cursor]),
            "s" | "S" => self.save_key_remap(),
            ESCAPE_KEY | REMAP_KEY => self.cancel_key_remap(),
            _ => {}
        }
    }

    /// Returns true when `raw_key` should quit the program.
    #[must_use]
    pub fn is_quit_key(&self, raw_key: &str) -> bool {
        raw_key == QUIT_KEY
            && !self.input.is_capturing()
            && self.screen != Some(Screen::KeyRemap)
            && !self.input.bindings().is_bound(QUIT_KEY)
    }

    /// Writes the snapshot for an active session, or clears it otherwise.
    fn persist(&mut self) {
        if self.session.active {
            let snapshot = Snapshot::capture(&self.state, &self.session);
            self.persistence.save_snapshot(&snapshot);
        } else {
            self.persistence.clear_snapshot();
        }
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns and clears the redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Read-only board picture for the renderer.
    #[must_use]
    pub fn board_view(&self) -> BoardView {
        let cells = self
            .state
            .snake
            .segments()
            .enumerate()
            .map(|(index, position)| CellView {
                position: *position,
                is_head: index == 0,
            })
            .collect();

        BoardView {
            board: self.state.board(),
            cells,
            food: self.state.food.position,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable model access for scripted scenarios.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn best_time(&self) -> u64 {
        self.best_time
    }

    #[must_use]
    pub fn last_result(&self) -> Option<GameOverSummary> {
        self.last_result
    }

    #[must_use]
    pub fn pending_confirmation(&self) -> Option<DestructiveAction> {
        self.gate.pending_action()
    }

    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        self.input.bindings()
    }

    /// Bindings shown in the remap dialog: the draft while editing.
    #[must_use]
    pub fn remap_bindings(&self) -> &KeyBindings {
        self.input.draft().unwrap_or_else(|| self.input.bindings())
    }

    #[must_use]
    pub fn capturing(&self) -> Option<BindableAction> {
        self.input.capturing()
    }

    #[must_use]
    pub fn remap_cursor(&self) -> usize {
        self.remap_cursor
    }

    #[must_use]
    pub fn controls_hint(&self) -> String {
        controls_hint(self.input.bindings())
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn movement_timer(&self) -> &T {
        &self.movement
    }

    pub fn movement_timer_mut(&mut self) -> &mut T {
        &mut self.movement
    }

    pub fn clock_timer(&self) -> &T {
        &self.clock
    }

    pub fn clock_timer_mut(&mut self) -> &mut T {
        &mut self.clock
    }
}
