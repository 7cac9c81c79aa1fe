use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub mod memory;
pub mod queries;
pub mod registry;
pub mod store;

pub use memory::{MemoryAlertStore, MemoryVehicleRegistry};
pub use registry::{PgVehicleRegistry, VehicleRegistry};
pub use store::{AlertStore, PgAlertStore};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}
