use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DifficultyMode, INITIAL_SNAKE_LENGTH, is_valid_speed_level};
use crate::food::Food;
use crate::game::GameState;
use crate::input::{Direction, KeyBindings};
use crate::session::Session;
use crate::snake::{Position, Snake};

const APP_DIR_NAME: &str = "neon-snake";
const STORAGE_FILE_NAME: &str = "storage.json";
const STAGING_SUFFIX: &str = ".tmp";
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Storage keys, shared with the browser build's local-storage layout.
pub mod keys {
    pub const ACTIVE_STATE: &str = "snake-active-state";
    pub const HIGH_SCORE: &str = "snake-high-score";
    pub const BEST_TIME: &str = "snake-best-time";
    pub const SPEED: &str = "snake-speed";
    pub const MODE: &str = "snake-mode";
    pub const KEY_BINDINGS: &str = "snake-keys";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed durable store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store, used by tests and when no data directory is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file holding every key; rewritten on each change.
///
/// Each rewrite goes to a sibling `.tmp` file that is then renamed over the
/// store, so an interrupted write never leaves a torn store behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. A file that exists but cannot be
    /// read or parsed is an error so the caller can decide to start over.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, entries })
    }

    /// Opens the store at `path`, setting an unreadable file aside as
    /// `<path>.corrupt` and starting empty instead.
    pub fn open_or_quarantine(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let error = match Self::open(&path) {
            Ok(storage) => return storage,
            Err(error) => error,
        };

        let quarantine = sibling_path(&path, CORRUPT_SUFFIX);
        match fs::rename(&path, &quarantine) {
            Ok(()) => warn!(
                %error,
                moved_to = %quarantine.display(),
                "storage unreadable, set aside and starting fresh"
            ),
            Err(rename_error) => warn!(
                %error,
                %rename_error,
                path = %path.display(),
                "storage unreadable and could not be set aside, starting fresh"
            ),
        }
        Self::empty(path)
    }

    /// An empty store that will overwrite whatever is at `path` on first write.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let staging = sibling_path(&self.path, STAGING_SUFFIX);
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Returns the platform-correct storage file path inside `base`, or inside
/// the local data directory when `base` is `None`.
#[must_use]
pub fn storage_path(base: Option<&Path>) -> PathBuf {
    let mut path = match base {
        Some(dir) => dir.to_path_buf(),
        None => {
            let mut dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push(APP_DIR_NAME);
            dir
        }
    };
    path.push(STORAGE_FILE_NAME);
    path
}

/// Serialized in-progress game. Its presence means a game can be resumed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub snake: Vec<Position>,
    pub food: Food,
    pub direction: Direction,
    #[serde(default)]
    pub next_direction: Option<Direction>,
    pub score: u32,
    #[serde(default)]
    pub game_time: u64,
    pub is_paused: bool,
    pub speed_level: u32,
    #[serde(default)]
    pub difficulty_mode: DifficultyMode,
}

impl Snapshot {
    /// Captures the model and session as they are now.
    #[must_use]
    pub fn capture(state: &GameState, session: &Session) -> Self {
        Self {
            snake: state.snake.segments().copied().collect(),
            food: state.food,
            direction: state.snake.direction(),
            next_direction: state.snake.pending_direction(),
            score: session.score,
            game_time: session.elapsed_seconds,
            is_paused: session.paused,
            speed_level: session.speed_level,
            difficulty_mode: state.mode(),
        }
    }

    /// Installs the saved board into `state` and returns the saved session.
    ///
    /// Returns `None` without touching `state` when the snapshot does not
    /// describe a playable board: cells off the board, a body shorter than
    /// the starting snake or not a single chain, a heading or buffered turn
    /// into the neck, food under the snake, or a speed out of range.
    pub fn restore_into(self, state: &mut GameState) -> Option<Session> {
        let bounds = self.difficulty_mode.board().grid;
        let on_board = self.snake.iter().all(|cell| cell.is_within_bounds(bounds));
        if !on_board
            || !self.food.position.is_within_bounds(bounds)
            || !is_valid_speed_level(self.speed_level)
        {
            return None;
        }

        let snake = Snake::from_segments(self.snake, self.direction, self.next_direction)?;
        if snake.len() < INITIAL_SNAKE_LENGTH
            || !snake.is_well_formed()
            || snake.occupies(self.food.position)
        {
            return None;
        }

        state.restore(self.difficulty_mode, snake, self.food);
        Some(Session {
            score: self.score,
            elapsed_seconds: self.game_time,
            speed_level: self.speed_level,
            active: true,
            paused: self.is_paused,
        })
    }
}

/// Typed access to everything the game persists.
///
/// Storage failures never reach the game: reads fall back to defaults and
/// writes are logged and dropped.
#[derive(Debug)]
pub struct Persistence<S: Storage> {
    storage: S,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Loads the saved game. Unparseable snapshots are removed and reported
    /// as absent.
    pub fn load_snapshot(&mut self) -> Option<Snapshot> {
        let raw = self.read(keys::ACTIVE_STATE)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                debug!(%error, "discarding malformed snapshot");
                self.clear_snapshot();
                None
            }
        }
    }

    pub fn save_snapshot(&mut self, snapshot: &Snapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.write(keys::ACTIVE_STATE, &json),
            Err(error) => warn!(%error, "failed to serialize snapshot"),
        }
    }

    pub fn clear_snapshot(&mut self) {
        if let Err(error) = self.storage.remove(keys::ACTIVE_STATE) {
            warn!(%error, "failed to clear snapshot");
        }
    }

    pub fn high_score(&self) -> u32 {
        self.read_parsed(keys::HIGH_SCORE).unwrap_or(0)
    }

    pub fn set_high_score(&mut self, score: u32) {
        self.write(keys::HIGH_SCORE, &score.to_string());
    }

    pub fn best_time(&self) -> u64 {
        self.read_parsed(keys::BEST_TIME).unwrap_or(0)
    }

    pub fn set_best_time(&mut self, seconds: u64) {
        self.write(keys::BEST_TIME, &seconds.to_string());
    }

    /// Saved speed preference, if present and in range.
    pub fn speed_level(&self) -> Option<u32> {
        self.read_parsed(keys::SPEED)
            .filter(|level| is_valid_speed_level(*level))
    }

    pub fn set_speed_level(&mut self, level: u32) {
        self.write(keys::SPEED, &level.to_string());
    }

    pub fn mode(&self) -> Option<DifficultyMode> {
        self.read(keys::MODE)
            .and_then(|raw| DifficultyMode::parse(&raw))
    }

    pub fn set_mode(&mut self, mode: DifficultyMode) {
        self.write(keys::MODE, mode.as_str());
    }

    /// Saved key bindings, completed with defaults; defaults when unreadable.
    pub fn key_bindings(&self) -> KeyBindings {
        self.read(keys::KEY_BINDINGS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn set_key_bindings(&mut self, bindings: &KeyBindings) {
        match serde_json::to_string(bindings) {
            Ok(json) => self.write(keys::KEY_BINDINGS, &json),
            Err(error) => warn!(%error, "failed to serialize key bindings"),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, key, "storage read failed");
                None
            }
        }
    }

    fn read_parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.read(key)?.trim().parse().ok()
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(error) = self.storage.set(key, value) {
            warn!(%error, key, "storage write failed");
        }
    }
}
