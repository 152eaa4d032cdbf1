use crate::state::round::RoundId;

/// Phase of the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round exists yet; only observable between process start and the
    /// bootstrap round.
    Idle,
    /// A round is open and owns every incoming buzz.
    RoundActive(RoundId),
}

/// Tracks which round is current.
///
/// Exactly one round is current at any moment once the controller has
/// bootstrapped; a reset supersedes the active round rather than closing it,
/// so there is no terminal phase.
#[derive(Debug, Clone)]
pub struct RoundMachine {
    phase: RoundPhase,
}

impl Default for RoundMachine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Idle,
        }
    }
}

impl RoundMachine {
    /// Create a machine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Identifier of the active round, if any.
    pub fn current_round(&self) -> Option<RoundId> {
        match self.phase {
            RoundPhase::Idle => None,
            RoundPhase::RoundActive(id) => Some(id),
        }
    }

    /// Enter [`RoundPhase::RoundActive`] for a freshly created round.
    ///
    /// Valid from any phase: the bootstrap round leaves idle, and a reset
    /// while a round is active supersedes it.
    pub fn begin_round(&mut self, id: RoundId) -> RoundPhase {
        self.phase = RoundPhase::RoundActive(id);
        self.phase
    }
}
