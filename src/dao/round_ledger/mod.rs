//! The round ledger capability: durable rounds and buzzes with uniqueness
//! enforcement and time-ordered retrieval.

#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::storage::{StorageError, StorageResult};
use crate::state::{RoundId, TeamId};

/// Failure modes of [`RoundLedger::record_buzz`].
#[derive(Debug, Error)]
pub enum BuzzWriteError {
    /// The team already buzzed in this round; the write was fully rejected.
    #[error("team {team} already buzzed in round {round}")]
    Duplicate {
        /// Round the rejected buzz targeted.
        round: RoundId,
        /// Team that had already buzzed.
        team: TeamId,
    },
    /// The backend could not commit the write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Abstraction over the durable store of rounds and buzzes.
///
/// Implementations own uniqueness enforcement: a second buzz for the same
/// `(round, team)` pair is rejected atomically with the insert, and a
/// successful [`RoundLedger::record_buzz`] is durable before its future
/// resolves.
pub trait RoundLedger: Send + Sync {
    /// Insert a new round stamped with the current time and return its id.
    fn create_round(&self) -> BoxFuture<'static, StorageResult<RoundId>>;

    /// Insert a buzz for `(round, team)` stamped with the current
    /// high-resolution time.
    fn record_buzz(
        &self,
        round: RoundId,
        team: TeamId,
    ) -> BoxFuture<'static, Result<(), BuzzWriteError>>;

    /// Teams that buzzed in the round, ascending by arrival time.
    ///
    /// Empty for a round with no buzzes. Reflects every write committed
    /// before the call, including writes from the same task moments earlier.
    fn ranking(&self, round: RoundId) -> BoxFuture<'static, StorageResult<Vec<TeamId>>>;
}
