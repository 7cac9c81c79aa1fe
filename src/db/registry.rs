//! Vehicle registry boundary.
//!
//! The registry is an external collaborator: senders consult it before
//! inserting or publishing to a plate, so an alert to an unregistered plate
//! is rejected without touching the log.

use async_trait::async_trait;

use super::{queries, DbPool};
use crate::error::StoreError;
use crate::plate::NormalizedPlate;

#[async_trait]
pub trait VehicleRegistry: Send + Sync {
    async fn exists(&self, plate: &NormalizedPlate) -> Result<bool, StoreError>;
}

pub struct PgVehicleRegistry {
    pool: DbPool,
}

impl PgVehicleRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRegistry for PgVehicleRegistry {
    async fn exists(&self, plate: &NormalizedPlate) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(queries::SELECT_VEHICLE_EXISTS)
            .bind(plate.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
