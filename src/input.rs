use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent};
use serde::{Deserialize, Serialize};

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Logical actions a key can be bound to.
///
/// Serialized names match the persisted key-binding map (`lvl1`..`lvl5` for
/// the speed shortcuts).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindableAction {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Reboot,
    Lvl1,
    Lvl2,
    Lvl3,
    Lvl4,
    Lvl5,
}

impl BindableAction {
    pub const ALL: [Self; 11] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Pause,
        Self::Reboot,
        Self::Lvl1,
        Self::Lvl2,
        Self::Lvl3,
        Self::Lvl4,
        Self::Lvl5,
    ];

    /// Returns the movement direction for the four direction actions.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns the speed level for the five speed-select actions.
    #[must_use]
    pub fn speed_level(self) -> Option<u32> {
        match self {
            Self::Lvl1 => Some(1),
            Self::Lvl2 => Some(2),
            Self::Lvl3 => Some(3),
            Self::Lvl4 => Some(4),
            Self::Lvl5 => Some(5),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Pause => "Pause",
            Self::Reboot => "Reboot",
            Self::Lvl1 => "Speed 1",
            Self::Lvl2 => "Speed 2",
            Self::Lvl3 => "Speed 3",
            Self::Lvl4 => "Speed 4",
            Self::Lvl5 => "Speed 5",
        }
    }

    fn default_key(self) -> &'static str {
        match self {
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Pause => "p",
            Self::Reboot => "r",
            Self::Lvl1 => "1",
            Self::Lvl2 => "2",
            Self::Lvl3 => "3",
            Self::Lvl4 => "4",
            Self::Lvl5 => "5",
        }
    }
}

impl fmt::Display for BindableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Total mapping from every [`BindableAction`] to a raw key identifier.
///
/// Deserializing a partial map fills the missing actions with their defaults,
/// so the mapping stays total no matter what was persisted.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<BindableAction, String>", into = "BTreeMap<BindableAction, String>")]
pub struct KeyBindings {
    keys: BTreeMap<BindableAction, String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            keys: BindableAction::ALL
                .into_iter()
                .map(|action| (action, action.default_key().to_owned()))
                .collect(),
        }
    }
}

impl From<BTreeMap<BindableAction, String>> for KeyBindings {
    fn from(overrides: BTreeMap<BindableAction, String>) -> Self {
        let mut bindings = Self::default();
        bindings.keys.extend(overrides);
        bindings
    }
}

impl From<KeyBindings> for BTreeMap<BindableAction, String> {
    fn from(bindings: KeyBindings) -> Self {
        bindings.keys
    }
}

impl KeyBindings {
    /// Returns the raw key bound to `action`.
    #[must_use]
    pub fn key(&self, action: BindableAction) -> &str {
        self.keys
            .get(&action)
            .map_or_else(|| action.default_key(), String::as_str)
    }

    /// Rebinds `action` to `raw_key`. Duplicate bindings are allowed.
    pub fn bind(&mut self, action: BindableAction, raw_key: impl Into<String>) {
        self.keys.insert(action, raw_key.into());
    }

    /// Iterates actions in their canonical order with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (BindableAction, &str)> {
        BindableAction::ALL
            .into_iter()
            .map(move |action| (action, self.key(action)))
    }

    /// Returns true when any action is bound to `raw_key`.
    #[must_use]
    pub fn is_bound(&self, raw_key: &str) -> bool {
        self.iter().any(|(_, key)| key == raw_key)
    }
}

/// Logical intents produced from raw key input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Direction(Direction),
    TogglePause,
    Reboot,
    SelectSpeed(u32),
    /// A capture request consumed the key and rebound this action.
    BindingCaptured(BindableAction),
}

/// Raw key that toggles pause regardless of the bindings.
pub const ESCAPE_KEY: &str = "Escape";

/// Translates raw key identifiers into [`Action`]s.
///
/// While a capture is pending the next key is stored verbatim as the new
/// binding of the chosen action (in the remap draft) and nothing else
/// happens with it.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    bindings: KeyBindings,
    draft: Option<KeyBindings>,
    capturing: Option<BindableAction>,
}

impl InputMapper {
    #[must_use]
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            draft: None,
            capturing: None,
        }
    }

    /// Live bindings used in normal play mode.
    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Bindings being edited in the remap dialog, if it is open.
    #[must_use]
    pub fn draft(&self) -> Option<&KeyBindings> {
        self.draft.as_ref()
    }

    /// Action waiting for its new key, if any.
    #[must_use]
    pub fn capturing(&self) -> Option<BindableAction> {
        self.capturing
    }

    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capturing.is_some()
    }

    /// Starts editing a copy of the live bindings.
    pub fn open_draft(&mut self) {
        self.draft = Some(self.bindings.clone());
        self.capturing = None;
    }

    /// Arms capture mode: the next resolved key becomes `action`'s binding.
    pub fn begin_capture(&mut self, action: BindableAction) {
        if self.draft.is_none() {
            self.draft = Some(self.bindings.clone());
        }
        self.capturing = Some(action);
    }

    /// Replaces the live bindings with the draft and returns them.
    pub fn commit_draft(&mut self) -> Option<&KeyBindings> {
        self.capturing = None;
        let draft = self.draft.take()?;
        self.bindings = draft;
        Some(&self.bindings)
    }

    /// Drops the draft without touching the live bindings.
    pub fn discard_draft(&mut self) {
        self.draft = None;
        self.capturing = None;
    }

    /// Resolves one raw key.
    pub fn resolve(&mut self, raw_key: &str) -> Option<Action> {
        if let Some(action) = self.capturing.take() {
            self.draft
                .get_or_insert_with(|| self.bindings.clone())
                .bind(action, raw_key);
            return Some(Action::BindingCaptured(action));
        }

        let bindings = &self.bindings;
        if raw_key == ESCAPE_KEY || raw_key == bindings.key(BindableAction::Pause) {
            return Some(Action::TogglePause);
        }

        if raw_key.to_lowercase() == bindings.key(BindableAction::Reboot).to_lowercase() {
            return Some(Action::Reboot);
        }

        bindings.iter().find_map(|(action, key)| {
            if key != raw_key {
                return None;
            }
            action
                .speed_level()
                .map(Action::SelectSpeed)
                .or_else(|| action.direction().map(Action::Direction))
        })
    }
}

/// Converts a terminal key event into a browser-style raw key identifier.
#[must_use]
pub fn raw_key(event: &KeyEvent) -> Option<String> {
    let name = match event.code {
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Esc => ESCAPE_KEY,
        KeyCode::Enter => "Enter",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::F(number) => return Some(format!("F{number}")),
        KeyCode::Char(c) => return Some(c.to_string()),
        _ => return None,
    };

    Some(name.to_owned())
}

/// Returns a short human label for a raw key identifier.
#[must_use]
pub fn display_key(raw_key: &str) -> String {
    if raw_key == " " {
        return "Space".to_owned();
    }

    match raw_key.strip_prefix("Arrow") {
        Some(rest) => rest.to_owned(),
        None => raw_key.to_uppercase(),
    }
}

/// Builds the one-line controls hint from the live bindings.
#[must_use]
pub fn controls_hint(bindings: &KeyBindings) -> String {
    let movement = [
        BindableAction::Up,
        BindableAction::Down,
        BindableAction::Left,
        BindableAction::Right,
    ]
    .map(|action| display_key(bindings.key(action)))
    .join("/");

    format!(
        "Move: {movement} | Pause: {}",
        display_key(bindings.key(BindableAction::Pause))
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{
        Action, BindableAction, Direction, InputMapper, KeyBindings, controls_hint,
        direction_change_is_valid, display_key, raw_key,
    };

    #[test]
    fn opposite_direction_is_correct() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn direction_change_rejects_reverse() {
        assert!(!direction_change_is_valid(Direction::Up, Direction::Down));
        assert!(!direction_change_is_valid(Direction::Right, Direction::Left));
        assert!(direction_change_is_valid(Direction::Up, Direction::Left));
        assert!(direction_change_is_valid(Direction::Up, Direction::Up));
    }

    #[test]
    fn default_bindings_resolve_to_actions() {
        let mut mapper = InputMapper::default();

        assert_eq!(
            mapper.resolve("ArrowUp"),
            Some(Action::Direction(Direction::Up))
        );
        assert_eq!(mapper.resolve("p"), Some(Action::TogglePause));
        assert_eq!(mapper.resolve("Escape"), Some(Action::TogglePause));
        assert_eq!(mapper.resolve("r"), Some(Action::Reboot));
        assert_eq!(mapper.resolve("R"), Some(Action::Reboot));
        assert_eq!(mapper.resolve("3"), Some(Action::SelectSpeed(3)));
        assert_eq!(mapper.resolve("x"), None);
    }

    #[test]
    fn capture_consumes_exactly_one_key() {
        let mut mapper = InputMapper::default();
        mapper.open_draft();
        mapper.begin_capture(BindableAction::Up);

        assert_eq!(
            mapper.resolve("w"),
            Some(Action::BindingCaptured(BindableAction::Up))
        );
        assert!(!mapper.is_capturing());

        // The draft is not live until committed.
        assert_eq!(mapper.resolve("w"), None);
        mapper.commit_draft();
        assert_eq!(
            mapper.resolve("w"),
            Some(Action::Direction(Direction::Up))
        );
    }

    #[test]
    fn capture_accepts_keys_already_bound_elsewhere() {
        let mut mapper = InputMapper::default();
        mapper.begin_capture(BindableAction::Left);
        mapper.resolve("p");
        mapper.commit_draft();

        assert_eq!(mapper.bindings().key(BindableAction::Left), "p");
        assert_eq!(mapper.bindings().key(BindableAction::Pause), "p");
        // Pause wins the lookup order for a duplicated key.
        assert_eq!(mapper.resolve("p"), Some(Action::TogglePause));
    }

    #[test]
    fn discarded_draft_leaves_bindings_untouched() {
        let mut mapper = InputMapper::default();
        mapper.begin_capture(BindableAction::Pause);
        mapper.resolve(" ");
        mapper.discard_draft();

        assert_eq!(mapper.bindings(), &KeyBindings::default());
    }

    #[test]
    fn partial_binding_map_is_completed_with_defaults() {
        let json = r#"{"up":"w","lvl5":"0"}"#;
        let bindings: KeyBindings = serde_json::from_str(json).expect("bindings should parse");

        assert_eq!(bindings.key(BindableAction::Up), "w");
        assert_eq!(bindings.key(BindableAction::Lvl5), "0");
        assert_eq!(bindings.key(BindableAction::Down), "ArrowDown");
        assert_eq!(bindings.iter().count(), BindableAction::ALL.len());
    }

    #[test]
    fn bindings_serialize_with_persisted_action_names() {
        let json = serde_json::to_string(&KeyBindings::default()).expect("serialize");
        let map: BTreeMap<String, String> = serde_json::from_str(&json).expect("plain map");

        assert_eq!(map.get("lvl1").map(String::as_str), Some("1"));
        assert_eq!(map.get("reboot").map(String::as_str), Some("r"));
        assert_eq!(map.len(), 11);
    }

    #[test]
    fn terminal_keys_map_to_browser_identifiers() {
        let arrow = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let function = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);

        assert_eq!(raw_key(&arrow).as_deref(), Some("ArrowLeft"));
        assert_eq!(raw_key(&space).as_deref(), Some(" "));
        assert_eq!(raw_key(&function).as_deref(), Some("F2"));
    }

    #[test]
    fn controls_hint_uses_short_key_labels() {
        let mut bindings = KeyBindings::default();
        assert_eq!(
            controls_hint(&bindings),
            "Move: Up/Down/Left/Right | Pause: P"
        );

        bindings.bind(BindableAction::Pause, " ");
        bindings.bind(BindableAction::Up, "w");
        assert_eq!(
            controls_hint(&bindings),
            "Move: W/Down/Left/Right | Pause: Space"
        );
        assert_eq!(display_key("Enter"), "ENTER");
    }
}
