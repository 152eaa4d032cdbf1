use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use rusqlite::{Connection, OpenFlags, ffi, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Mutex;

use crate::dao::round_ledger::{BuzzWriteError, RoundLedger};
use crate::dao::storage::{StorageError, StorageResult};
use crate::state::{RoundId, TeamId};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Round ledger backed by a local SQLite database.
///
/// WAL journaling with `synchronous = FULL` keeps every committed buzz on
/// disk before the write call returns. The `UNIQUE (round_id, team)`
/// constraint rejects duplicates atomically with the insert, so the
/// one-buzz-per-team invariant holds without an extra read-check.
pub struct SqliteRoundLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRoundLedger {
    /// Open or create the ledger database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StorageError::unavailable("opening ledger database", source))?;

        Self::from_connection(conn)
    }

    /// Create an in-memory ledger for tests.
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|source| StorageError::unavailable("opening in-memory ledger", source))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|source| StorageError::unavailable("initializing ledger schema", source))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl RoundLedger for SqliteRoundLedger {
    fn create_round(&self) -> BoxFuture<'static, StorageResult<RoundId>> {
        let conn = Arc::clone(&self.conn);
        Box::pin(async move {
            let started_at = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .map_err(|source| StorageError::unavailable("formatting round timestamp", source))?;

            let conn = conn.lock().await;
            conn.execute(
                "INSERT INTO rounds (started_at) VALUES (?1)",
                params![started_at],
            )
            .map_err(|source| StorageError::unavailable("inserting round", source))?;

            Ok(RoundId::new(conn.last_insert_rowid()))
        })
    }

    fn record_buzz(
        &self,
        round: RoundId,
        team: TeamId,
    ) -> BoxFuture<'static, Result<(), BuzzWriteError>> {
        let conn = Arc::clone(&self.conn);
        Box::pin(async move {
            let timestamp = unix_seconds(OffsetDateTime::now_utc());

            let conn = conn.lock().await;
            conn.execute(
                "INSERT INTO buzzes (round_id, team, timestamp) VALUES (?1, ?2, ?3)",
                params![round.get(), team.get(), timestamp],
            )
            .map_err(|source| classify_buzz_error(source, round, team))?;

            Ok(())
        })
    }

    fn ranking(&self, round: RoundId) -> BoxFuture<'static, StorageResult<Vec<TeamId>>> {
        let conn = Arc::clone(&self.conn);
        Box::pin(async move {
            let conn = conn.lock().await;
            let mut stmt = conn
                .prepare(
                    "SELECT team FROM buzzes WHERE round_id = ?1 ORDER BY timestamp ASC, id ASC",
                )
                .map_err(|source| StorageError::unavailable("preparing ranking query", source))?;

            let raw_teams = stmt
                .query_map(params![round.get()], |row| row.get::<_, u8>(0))
                .map_err(|source| StorageError::unavailable("querying ranking", source))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| StorageError::unavailable("reading ranking rows", source))?;

            raw_teams
                .into_iter()
                .map(|raw| {
                    TeamId::new(raw).ok_or_else(|| StorageError::Corrupted {
                        message: format!("team {raw} outside valid range in round {round}"),
                    })
                })
                .collect()
        })
    }
}

/// Fractional seconds since the Unix epoch, sub-microsecond resolution.
fn unix_seconds(now: OffsetDateTime) -> f64 {
    now.unix_timestamp_nanos() as f64 / 1e9
}

/// Map a failed buzz insert to a duplicate rejection or a backend failure.
fn classify_buzz_error(source: rusqlite::Error, round: RoundId, team: TeamId) -> BuzzWriteError {
    match &source {
        rusqlite::Error::SqliteFailure(error, _)
            if error.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            BuzzWriteError::Duplicate { round, team }
        }
        _ => BuzzWriteError::Storage(StorageError::unavailable("inserting buzz", source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(raw: u8) -> TeamId {
        TeamId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn round_ids_are_monotonic() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let first = ledger.create_round().await.unwrap();
        let second = ledger.create_round().await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn ranking_is_empty_for_fresh_round() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let round = ledger.create_round().await.unwrap();
        assert!(ledger.ranking(round).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ranking_follows_arrival_order() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let round = ledger.create_round().await.unwrap();

        ledger.record_buzz(round, team(3)).await.unwrap();
        ledger.record_buzz(round, team(1)).await.unwrap();
        ledger.record_buzz(round, team(4)).await.unwrap();

        assert_eq!(
            ledger.ranking(round).await.unwrap(),
            vec![team(3), team(1), team(4)]
        );
    }

    #[tokio::test]
    async fn second_buzz_from_same_team_is_rejected() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let round = ledger.create_round().await.unwrap();

        ledger.record_buzz(round, team(2)).await.unwrap();
        let err = ledger.record_buzz(round, team(2)).await.unwrap_err();
        assert!(matches!(
            err,
            BuzzWriteError::Duplicate { round: r, team: t } if r == round && t == team(2)
        ));

        // The rejected write must leave the ranking untouched.
        assert_eq!(ledger.ranking(round).await.unwrap(), vec![team(2)]);
    }

    #[tokio::test]
    async fn rounds_are_isolated() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let first = ledger.create_round().await.unwrap();
        ledger.record_buzz(first, team(3)).await.unwrap();
        ledger.record_buzz(first, team(1)).await.unwrap();

        let second = ledger.create_round().await.unwrap();
        assert_ne!(second, first);
        assert!(ledger.ranking(second).await.unwrap().is_empty());

        // Same team may buzz again in the new round, and history survives.
        ledger.record_buzz(second, team(3)).await.unwrap();
        assert_eq!(
            ledger.ranking(first).await.unwrap(),
            vec![team(3), team(1)]
        );
        assert_eq!(ledger.ranking(second).await.unwrap(), vec![team(3)]);
    }

    #[tokio::test]
    async fn back_to_back_buzzes_keep_submission_order() {
        let ledger = SqliteRoundLedger::in_memory().unwrap();
        let round = ledger.create_round().await.unwrap();

        // Even when arrivals land within the same timestamp granule the
        // row-id tie-break preserves submission order.
        for raw in [2u8, 4, 1, 3] {
            ledger.record_buzz(round, team(raw)).await.unwrap();
        }

        assert_eq!(
            ledger.ranking(round).await.unwrap(),
            vec![team(2), team(4), team(1), team(3)]
        );
    }

    #[tokio::test]
    async fn buzzes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buzzer_game.db");

        let round = {
            let ledger = SqliteRoundLedger::open(&path).unwrap();
            let round = ledger.create_round().await.unwrap();
            ledger.record_buzz(round, team(4)).await.unwrap();
            ledger.record_buzz(round, team(2)).await.unwrap();
            round
        };

        let reopened = SqliteRoundLedger::open(&path).unwrap();
        assert_eq!(
            reopened.ranking(round).await.unwrap(),
            vec![team(4), team(2)]
        );

        // New rounds keep advancing past the persisted ones.
        let next = reopened.create_round().await.unwrap();
        assert!(next > round);
    }
}
