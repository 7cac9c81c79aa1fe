//! Error taxonomy for the alert and navigation cores.
//!
//! Everything here is local and recoverable; the worst case is degraded
//! functionality (no live alerts, or no compass), never a dead process.

use thiserror::Error;

use crate::plate::PlateError;

/// Failures of the durable alert log.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target plate has no registered vehicle.
    #[error("target plate {0} is not registered")]
    UnknownPlate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures of the best-effort pub/sub leg.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("mqtt client error: {0}")]
    Mqtt(String),

    #[error("failed to encode alert payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures surfaced to a sender. Validation errors are rejected locally
/// before any network call; transport errors mean the durable insert failed
/// and the user must resend (no automatic retry).
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    InvalidPlate(#[from] PlateError),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("target plate {0} is not registered")]
    UnknownPlate(String),

    #[error("could not record alert: {0}")]
    Transport(StoreError),
}

impl From<StoreError> for SendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownPlate(plate) => SendError::UnknownPlate(plate),
            other => SendError::Transport(other),
        }
    }
}

/// Sensor collaborators report failure once, up front; navigation then
/// degrades to "distance unknown" instead of crashing.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{0} permission denied")]
    PermissionDenied(&'static str),

    #[error("{0} hardware unavailable")]
    Unavailable(&'static str),
}
