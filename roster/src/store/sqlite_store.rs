//! SqliteStore
//! -----------
//! SQLite-backed [`ResultStore`] for venues without a spreadsheet backend.
//!
//!  - `participants` holds the roster; `eligible` keeps the raw JSON value so
//!    string and boolean flags survive a round trip untouched
//!  - `results` is append-only, ordered by an autoincrement sequence
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, error, instrument, warn};

use super::ResultStore;
use crate::error::StoreError;
use crate::model::{DrawResult, EligibleFlag, Participant, ParticipantId};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. The caller is responsible for [`SqliteStore::migrate`].
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and ensure the schema exists.
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                team TEXT NOT NULL,
                eligible_json TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                time TEXT NOT NULL,
                prize_id TEXT NOT NULL,
                prize_name TEXT NOT NULL,
                participant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                team TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace roster rows, keyed by normalized id.
    pub async fn seed_participants(&self, participants: &[Participant]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for p in participants {
            let eligible_json = serde_json::to_string(&p.eligible)?;

            sqlx::query(
                r#"
                INSERT INTO participants (id, name, team, eligible_json)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    team = excluded.team,
                    eligible_json = excluded.eligible_json;
            "#,
            )
            .bind(p.id.normalized())
            .bind(&p.name)
            .bind(&p.team)
            .bind(eligible_json)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(count = participants.len(), "participants seeded");
        Ok(())
    }

    async fn load_results(&self) -> Result<Vec<DrawResult>, StoreError> {
        let rows = sqlx::query(
            "SELECT time, prize_id, prize_name, participant_id, name, team FROM results ORDER BY seq DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DrawResult {
                time: row.get("time"),
                prize_id: row.get("prize_id"),
                prize_name: row.get("prize_name"),
                participant_id: ParticipantId::Text(row.get("participant_id")),
                name: row.get("name"),
                team: row.get("team"),
            })
            .collect())
    }

    async fn insert_result(&self, result: &DrawResult) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO results (time, prize_id, prize_name, participant_id, name, team)
            VALUES (?, ?, ?, ?, ?, ?);
        "#,
        )
        .bind(&result.time)
        .bind(&result.prize_id)
        .bind(&result.prize_name)
        .bind(result.participant_id.normalized())
        .bind(&result.name)
        .bind(&result.team)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query("SELECT id, name, team, eligible_json FROM participants ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| error!(error = %e, "fetch participants failed"))?;

        let mut participants = Vec::with_capacity(rows.len());

        for row in rows {
            let eligible_json: String = row.get("eligible_json");
            let eligible: EligibleFlag = serde_json::from_str(&eligible_json)?;

            participants.push(Participant {
                id: ParticipantId::Text(row.get("id")),
                name: row.get("name"),
                team: row.get("team"),
                eligible,
            });
        }

        Ok(participants)
    }

    async fn fetch_results(&self) -> Vec<DrawResult> {
        match self.load_results().await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "fetch results failed; continuing with none");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, result), fields(participant_id = %result.participant_id))]
    async fn append_result(&self, result: &DrawResult) -> bool {
        match self.insert_result(result).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "save result failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn reset_results(&self) -> bool {
        match sqlx::query("DELETE FROM results").execute(&self.pool).await {
            Ok(done) => {
                debug!(removed = done.rows_affected(), "results reset");
                true
            }
            Err(e) => {
                warn!(error = %e, "reset results failed");
                false
            }
        }
    }
}
