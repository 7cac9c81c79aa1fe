use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the owner left the car. At most one live record per vehicle; a new
/// mark overwrites the previous one (last write wins, no conflict
/// resolution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingRecord {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
    /// Reference to a photo of the spot (base64 or storage key); opaque to
    /// the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}
