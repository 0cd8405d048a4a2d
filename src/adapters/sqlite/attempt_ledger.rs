//! SQLite implementation of the attempt ledger.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{format_datetime, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Attempt, AttemptOutcome, NewAttempt, SeedMode, WindowFilter, WindowSpan};
use crate::domain::ports::{AttemptLedger, AttemptRecorder};

const SCORED: &str = "outcome IN ('success', 'fail')";

pub struct SqliteAttemptLedger {
    pool: SqlitePool,
}

impl SqliteAttemptLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent attempts of any outcome, newest first.
    pub async fn recent(&self, limit: u32) -> DomainResult<Vec<Attempt>> {
        let rows: Vec<AttemptRow> = sqlx::query_as("SELECT * FROM attempts ORDER BY id DESC LIMIT ?")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Attempt::try_from).collect()
    }
}

fn push_conditions(builder: &mut QueryBuilder<'_, Sqlite>, filter: &WindowFilter) {
    builder.push(" WHERE ").push(SCORED);
    if let Some(mode) = filter.seed_mode {
        builder.push(" AND seed_mode = ").push_bind(mode.as_str());
    }
    if let WindowSpan::Since(since) = filter.span {
        builder.push(" AND recorded_at >= ").push_bind(format_datetime(&since));
    }
}

#[async_trait]
impl AttemptLedger for SqliteAttemptLedger {
    async fn window(&self, filter: &WindowFilter) -> DomainResult<Vec<Attempt>> {
        let mut builder = QueryBuilder::<Sqlite>::new("");
        match filter.span {
            WindowSpan::LastN(n) => {
                builder.push("SELECT * FROM (SELECT * FROM attempts");
                push_conditions(&mut builder, filter);
                let limit = i64::try_from(n).unwrap_or(i64::MAX);
                builder.push(" ORDER BY id DESC LIMIT ").push_bind(limit);
                builder.push(") ORDER BY id ASC");
            }
            WindowSpan::Since(_) | WindowSpan::All => {
                builder.push("SELECT * FROM attempts");
                push_conditions(&mut builder, filter);
                builder.push(" ORDER BY id ASC");
            }
        }

        let rows: Vec<AttemptRow> = builder.build_query_as::<AttemptRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Attempt::try_from).collect()
    }
}

#[async_trait]
impl AttemptRecorder for SqliteAttemptLedger {
    async fn record(&self, attempt: &NewAttempt) -> DomainResult<i64> {
        let result = sqlx::query(
            r#"INSERT INTO attempts (target_key, outcome, seed_mode, standing_height, seed, recorded_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(attempt.target_key.as_str())
        .bind(attempt.outcome.as_str())
        .bind(attempt.seed_mode.as_str())
        .bind(attempt.standing_height)
        .bind(attempt.seed)
        .bind(format_datetime(&attempt.recorded_at))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: i64,
    target_key: String,
    outcome: String,
    seed_mode: String,
    standing_height: Option<i32>,
    seed: Option<i64>,
    recorded_at: String,
}

impl TryFrom<AttemptRow> for Attempt {
    type Error = DomainError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        let outcome = AttemptOutcome::from_str(&row.outcome)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid outcome: {}", row.outcome)))?;
        let seed_mode = SeedMode::from_str(&row.seed_mode)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid seed mode: {}", row.seed_mode)))?;

        Ok(Attempt {
            id: row.id,
            target_key: row.target_key,
            outcome,
            seed_mode,
            standing_height: row.standing_height,
            seed: row.seed,
            recorded_at: parse_datetime(&row.recorded_at)?,
        })
    }
}
