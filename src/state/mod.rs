//! Runtime state owned by the round controller.

pub mod round;
pub mod round_machine;

pub use round::{RoundId, TEAM_MAX, TEAM_MIN, TeamId};
pub use round_machine::{RoundMachine, RoundPhase};
