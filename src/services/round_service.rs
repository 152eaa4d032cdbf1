use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dao::round_ledger::{BuzzWriteError, RoundLedger},
    dto::LinkCommand,
    error::ServiceError,
    state::{RoundId, RoundMachine, TeamId},
};

/// What the control loop should do after a command is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Broadcast the given ranking as an `ORDER:` line.
    Broadcast(Vec<TeamId>),
    /// Nothing to transmit.
    Ignored,
}

/// Applies inbound commands to the ledger and decides what to broadcast.
///
/// Single source of truth for which round is current. Ledger records are
/// reached exclusively through [`RoundLedger`] writes; the controller holds
/// only the current round's identifier.
pub struct RoundController {
    ledger: Arc<dyn RoundLedger>,
    machine: RoundMachine,
}

impl RoundController {
    /// Bootstrap a controller: create the startup round and enter it.
    pub async fn start(ledger: Arc<dyn RoundLedger>) -> Result<Self, ServiceError> {
        let mut machine = RoundMachine::new();
        let round = ledger.create_round().await?;
        machine.begin_round(round);
        info!(%round, "startup round created");

        Ok(Self { ledger, machine })
    }

    /// Identifier of the round new buzzes are attributed to.
    pub fn current_round(&self) -> Option<RoundId> {
        self.machine.current_round()
    }

    /// Apply one inbound command, returning what to transmit.
    pub async fn apply(&mut self, command: LinkCommand) -> Result<EventOutcome, ServiceError> {
        match command {
            LinkCommand::Reset => self.apply_reset().await,
            LinkCommand::Buzz(team) => self.apply_buzz(team).await,
        }
    }

    async fn apply_reset(&mut self) -> Result<EventOutcome, ServiceError> {
        let round = self.ledger.create_round().await?;
        self.machine.begin_round(round);
        info!(%round, "new round");

        // The empty ranking tells the board to clear its indicators.
        Ok(EventOutcome::Broadcast(Vec::new()))
    }

    async fn apply_buzz(&mut self, team: TeamId) -> Result<EventOutcome, ServiceError> {
        let Some(round) = self.machine.current_round() else {
            warn!(%team, "buzz arrived before any round exists; dropping");
            return Ok(EventOutcome::Ignored);
        };

        let duplicate = match self.ledger.record_buzz(round, team).await {
            Ok(()) => false,
            Err(BuzzWriteError::Duplicate { .. }) => true,
            Err(BuzzWriteError::Storage(source)) => return Err(source.into()),
        };

        // A duplicate still refreshes the board with the unchanged ranking.
        let ranking = self.ledger.ranking(round).await?;
        let order = display_ranking(&ranking);
        if duplicate {
            info!(%round, %team, %order, "duplicate buzz");
        } else {
            info!(%round, %team, %order, "new buzz");
        }

        Ok(EventOutcome::Broadcast(ranking))
    }
}

/// Comma-joined ranking for status events.
fn display_ranking(ranking: &[TeamId]) -> String {
    ranking
        .iter()
        .map(|team| team.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
