//! Durable append-only alert log.
//!
//! `insert` is the system of record: the pub/sub leg is best effort and a
//! reconnecting subscriber recovers missed alerts by querying `recent`.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{queries, DbPool};
use crate::error::StoreError;
use crate::models::{Alert, NewAlert};
use crate::plate::NormalizedPlate;

/// Postgres foreign key violation (alerts.target_plate -> vehicles.plate).
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Appends an alert to the durable log and returns it with its assigned
    /// id and timestamp. Fails with [`StoreError::UnknownPlate`] when the
    /// target plate has no registered vehicle.
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError>;

    /// The `limit` most recent alerts for a plate, newest first. Restartable:
    /// no cursor state is retained between calls.
    async fn recent(&self, plate: &NormalizedPlate, limit: i64) -> Result<Vec<Alert>, StoreError>;

    /// Deletes all but the `keep` most recently created alerts for a plate.
    /// Returns the number of rows removed.
    async fn prune(&self, plate: &NormalizedPlate, keep: i64) -> Result<u64, StoreError>;
}

pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let stored = Alert {
            id: Uuid::new_v4(),
            target_plate: alert.target_plate,
            sender_name: alert.sender_name,
            message: alert.message,
            icon: alert.icon,
            created_at: Utc::now(),
        };

        sqlx::query(queries::INSERT_ALERT)
            .bind(stored.id)
            .bind(stored.target_plate.as_str())
            .bind(&stored.sender_name)
            .bind(&stored.message)
            .bind(stored.icon.as_wire())
            .bind(stored.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.code().as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) {
                        return StoreError::UnknownPlate(stored.target_plate.to_string());
                    }
                }
                StoreError::Database(e)
            })?;

        Ok(stored)
    }

    async fn recent(&self, plate: &NormalizedPlate, limit: i64) -> Result<Vec<Alert>, StoreError> {
        let alerts = sqlx::query_as::<_, Alert>(queries::SELECT_RECENT_ALERTS)
            .bind(plate.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(alerts)
    }

    async fn prune(&self, plate: &NormalizedPlate, keep: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(queries::DELETE_ALERTS_BEYOND_KEEP)
            .bind(plate.as_str())
            .bind(keep)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
