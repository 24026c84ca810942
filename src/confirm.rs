use crate::config::DifficultyMode;

/// Actions that throw away an in-progress game.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DestructiveAction {
    Reboot,
    ChangeMode(DifficultyMode),
}

/// What the gate decided for a guarded action.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GateDecision {
    /// Nothing to lose; run the action now.
    RunNow,
    /// The action waits for a yes/no answer.
    AwaitConfirmation,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct PendingConfirmation {
    action: DestructiveAction,
    was_paused: bool,
}

/// Holds a destructive action until the player confirms or declines it.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationGate {
    pending: Option<PendingConfirmation>,
}

impl ConfirmationGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `action` may run immediately.
    ///
    /// Only an active session that is not already on the game-over screen
    /// needs confirmation. `was_paused` is remembered so declining restores it.
    pub fn guard(
        &mut self,
        action: DestructiveAction,
        session_active: bool,
        game_over_shown: bool,
        was_paused: bool,
    ) -> GateDecision {
        if !session_active || game_over_shown {
            self.pending = None;
            return GateDecision::RunNow;
        }

        self.pending = Some(PendingConfirmation { action, was_paused });
        GateDecision::AwaitConfirmation
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_action(&self) -> Option<DestructiveAction> {
        self.pending.map(|pending| pending.action)
    }

    /// "Yes": releases the deferred action.
    pub fn confirm(&mut self) -> Option<DestructiveAction> {
        self.pending.take().map(|pending| pending.action)
    }

    /// "No": drops the action and returns the pause state to restore.
    pub fn decline(&mut self) -> Option<bool> {
        self.pending.take().map(|pending| pending.was_paused)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DifficultyMode;

    use super::{ConfirmationGate, DestructiveAction, GateDecision};

    #[test]
    fn inactive_session_runs_immediately() {
        let mut gate = ConfirmationGate::new();

        let decision = gate.guard(DestructiveAction::Reboot, false, false, false);

        assert_eq!(decision, GateDecision::RunNow);
        assert!(!gate.is_pending());
    }

    #[test]
    fn game_over_screen_runs_immediately() {
        let mut gate = ConfirmationGate::new();

        let decision = gate.guard(
            DestructiveAction::ChangeMode(DifficultyMode::Hard),
            true,
            true,
            false,
        );

        assert_eq!(decision, GateDecision::RunNow);
    }

    #[test]
    fn active_session_defers_until_confirmed() {
        let mut gate = ConfirmationGate::new();
        let action = DestructiveAction::ChangeMode(DifficultyMode::Easy);

        assert_eq!(
            gate.guard(action, true, false, false),
            GateDecision::AwaitConfirmation
        );
        assert_eq!(gate.pending_action(), Some(action));
        assert_eq!(gate.confirm(), Some(action));
        assert!(!gate.is_pending());
    }

    #[test]
    fn decline_reports_prior_pause_state() {
        let mut gate = ConfirmationGate::new();

        gate.guard(DestructiveAction::Reboot, true, false, true);

        assert_eq!(gate.decline(), Some(true));
        assert_eq!(gate.decline(), None);
    }
}
