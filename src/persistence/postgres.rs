//! PostgreSQL implementation of the activity log.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::StoredActivity;
use crate::config::ServiceConfig;
use crate::domain::ActivityEvent;
use crate::error::ServiceError;

/// PostgreSQL-backed activity log using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresActivityLog {
    pool: PgPool,
}

impl PostgresActivityLog {
    /// Creates an activity log over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from configuration and applies the embedded
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Persistence`] if the database is unreachable
    /// or a migration fails.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ServiceError::Persistence(format!("migration failed: {e}")))?;

        Ok(Self::new(pool))
    }

    /// Appends an activity to the log.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Persistence`] on database or encoding failure.
    pub async fn save_activity(&self, activity: &ActivityEvent) -> Result<i64, ServiceError> {
        let payload = serde_json::to_value(activity)
            .map_err(|e| ServiceError::Persistence(format!("encoding activity: {e}")))?;

        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO event_activity (event_id, activity_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(*activity.event_id().as_uuid())
        .bind(activity.activity_type_str())
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Loads the activity of one event in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Persistence`] on database failure.
    pub async fn load_activity(&self, event_id: Uuid) -> Result<Vec<StoredActivity>, ServiceError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, event_id, activity_type, payload, created_at FROM event_activity \
             WHERE event_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, event_id, activity_type, payload, created_at)| StoredActivity {
                    id,
                    event_id,
                    activity_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes activity older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Persistence`] on database failure.
    pub async fn delete_older_than(&self, days: u64) -> Result<u64, ServiceError> {
        let cutoff = i64::try_from(days)
            .ok()
            .and_then(TimeDelta::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query("DELETE FROM event_activity WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
