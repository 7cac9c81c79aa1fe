//! plateping: ephemeral, targeted notices for vehicle owners, addressed by
//! license plate, plus navigation back to a marked parking spot.
//!
//! Two cores:
//!
//! - **Alert delivery**: per-plate pub/sub channels over MQTT with a durable
//!   Postgres log. The channel is best effort and at-least-once; the store
//!   is the system of record and a reconnecting subscriber backfills from
//!   it, deduplicated by alert id.
//! - **Navigation**: continuous position and heading fusion feeding pure
//!   great-circle math, producing the live distance and arrow rotation to a
//!   saved parking spot.

pub mod channel;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod geo;
pub mod models;
pub mod notify;
pub mod parking;
pub mod plate;
pub mod processor;
pub mod sender;
