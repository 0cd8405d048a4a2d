//! SQLite implementation of the PracticeStateRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;

use super::{format_datetime, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    LockList, PracticeState, SeedRotationState, SelectionMode, StreakState, TargetKey,
};
use crate::domain::ports::PracticeStateRepository;

pub struct SqlitePracticeStateRepository {
    pool: SqlitePool,
}

impl SqlitePracticeStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn stored_key(column: &str, raw: Option<String>) -> Option<TargetKey> {
    let raw = raw?;
    match TargetKey::parse(&raw) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(column, value = %raw, error = %err, "dropping unparsable stored target key");
            None
        }
    }
}

fn to_u32(column: &str, value: i64) -> DomainResult<u32> {
    u32::try_from(value).map_err(|_| DomainError::SerializationError(format!("{column} out of range: {value}")))
}

#[async_trait]
impl PracticeStateRepository for SqlitePracticeStateRepository {
    async fn load(&self, session_key: &str) -> DomainResult<Option<PracticeState>> {
        let row: Option<PracticeSessionRow> = sqlx::query_as("SELECT * FROM practice_sessions WHERE session_key = ?")
            .bind(session_key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let locks: Vec<(String,)> = sqlx::query_as(
            "SELECT target_key FROM practice_lock_targets WHERE session_key = ? ORDER BY position",
        )
        .bind(session_key)
        .fetch_all(&self.pool)
        .await?;

        let cursors: Vec<(String, i64)> =
            sqlx::query_as("SELECT target_key, cursor FROM practice_seed_cursors WHERE session_key = ?")
                .bind(session_key)
                .fetch_all(&self.pool)
                .await?;

        let mut seeds = SeedRotationState {
            cursors: Default::default(),
            selected_seed: row.selected_seed,
            last_seen_attempt_id: row.last_seen_attempt_id,
        };
        for (raw, cursor) in cursors {
            if let Some(key) = stored_key("practice_seed_cursors.target_key", Some(raw)) {
                seeds.cursors.insert(key, usize::try_from(cursor).unwrap_or(0));
            }
        }

        let streak = StreakState {
            current_target_key: stored_key("current_target_key", row.current_target_key),
            current_selection_mode: row.current_selection_mode.as_deref().and_then(SelectionMode::from_str),
            streak_count: to_u32("streak_count", row.streak_count)?,
            lock_active: row.lock_active,
            min_streak_to_swap: to_u32("min_streak_to_swap", row.min_streak_to_swap)?,
            lock_anchor_attempt_id: row.lock_anchor_attempt_id,
            pending_skip_key: stored_key("pending_skip_key", row.pending_skip_key),
        };

        Ok(Some(PracticeState {
            session_key: row.session_key,
            streak,
            lock_list: LockList::from_raw(locks.into_iter().map(|(k,)| k)),
            full_random_override: row.full_random_override,
            leniency_threshold: row.leniency_threshold,
            seeds,
            updated_at: parse_datetime(&row.updated_at)?,
        }))
    }

    async fn save(&self, state: &PracticeState) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO practice_sessions (
                   session_key, current_target_key, current_selection_mode, streak_count, lock_active,
                   min_streak_to_swap, lock_anchor_attempt_id, pending_skip_key, full_random_override,
                   leniency_threshold, selected_seed, last_seen_attempt_id, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(session_key) DO UPDATE SET
                   current_target_key = excluded.current_target_key,
                   current_selection_mode = excluded.current_selection_mode,
                   streak_count = excluded.streak_count,
                   lock_active = excluded.lock_active,
                   min_streak_to_swap = excluded.min_streak_to_swap,
                   lock_anchor_attempt_id = excluded.lock_anchor_attempt_id,
                   pending_skip_key = excluded.pending_skip_key,
                   full_random_override = excluded.full_random_override,
                   leniency_threshold = excluded.leniency_threshold,
                   selected_seed = excluded.selected_seed,
                   last_seen_attempt_id = excluded.last_seen_attempt_id,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&state.session_key)
        .bind(state.streak.current_target_key.as_ref().map(TargetKey::as_str))
        .bind(state.streak.current_selection_mode.map(|m| m.as_str()))
        .bind(i64::from(state.streak.streak_count))
        .bind(state.streak.lock_active)
        .bind(i64::from(state.streak.min_streak_to_swap))
        .bind(state.streak.lock_anchor_attempt_id)
        .bind(state.streak.pending_skip_key.as_ref().map(TargetKey::as_str))
        .bind(state.full_random_override)
        .bind(state.leniency_threshold)
        .bind(state.seeds.selected_seed)
        .bind(state.seeds.last_seen_attempt_id)
        .bind(format_datetime(&state.updated_at))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM practice_lock_targets WHERE session_key = ?")
            .bind(&state.session_key)
            .execute(&mut *tx)
            .await?;
        for (position, key) in state.lock_list.raw().iter().enumerate() {
            sqlx::query("INSERT INTO practice_lock_targets (session_key, position, target_key) VALUES (?, ?, ?)")
                .bind(&state.session_key)
                .bind(i64::try_from(position).unwrap_or(i64::MAX))
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM practice_seed_cursors WHERE session_key = ?")
            .bind(&state.session_key)
            .execute(&mut *tx)
            .await?;
        for (key, cursor) in &state.seeds.cursors {
            sqlx::query("INSERT INTO practice_seed_cursors (session_key, target_key, cursor) VALUES (?, ?, ?)")
                .bind(&state.session_key)
                .bind(key.as_str())
                .bind(i64::try_from(*cursor).unwrap_or(0))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PracticeSessionRow {
    session_key: String,
    current_target_key: Option<String>,
    current_selection_mode: Option<String>,
    streak_count: i64,
    lock_active: bool,
    min_streak_to_swap: i64,
    lock_anchor_attempt_id: Option<i64>,
    pending_skip_key: Option<String>,
    full_random_override: bool,
    leniency_threshold: Option<f64>,
    selected_seed: Option<i64>,
    last_seen_attempt_id: Option<i64>,
    updated_at: String,
}
