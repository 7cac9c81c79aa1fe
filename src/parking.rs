//! Parking spot session: mark, clear, photo, share.
//!
//! Device-local, single writer. Concurrent marks from two devices of the
//! same account simply overwrite each other, last write wins.

use chrono::Utc;

use crate::geo::{GeoPoint, PositionFix};
use crate::models::ParkingRecord;

/// GPS accuracy beyond which a mark needs explicit confirmation.
pub const ACCURACY_WARN_METERS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    Marked(ParkingRecord),
    /// The fix is usable but weak; call again with `force` to save anyway.
    PoorAccuracy { accuracy_meters: f64 },
}

/// At most one live parking record. A new mark overwrites the previous one;
/// `clear` is idempotent.
#[derive(Debug, Default)]
pub struct ParkingSession {
    record: Option<ParkingRecord>,
}

impl ParkingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Option<&ParkingRecord> {
        self.record.as_ref()
    }

    /// Saves the current position as the parking spot. A photo already
    /// attached to the previous record carries over, matching how a photo
    /// taken before re-marking stays with the spot.
    pub fn mark(&mut self, fix: PositionFix, force: bool) -> MarkOutcome {
        if fix.accuracy_meters > ACCURACY_WARN_METERS && !force {
            return MarkOutcome::PoorAccuracy {
                accuracy_meters: fix.accuracy_meters,
            };
        }
        let record = ParkingRecord {
            lat: fix.point.lat,
            lng: fix.point.lng,
            timestamp: Utc::now(),
            photo: self.record.take().and_then(|r| r.photo),
        };
        self.record = Some(record.clone());
        MarkOutcome::Marked(record)
    }

    /// Attaches a photo to the live record, if any.
    pub fn attach_photo(&mut self, photo: String) {
        if let Some(record) = self.record.as_mut() {
            record.photo = Some(photo);
        }
    }

    /// Forgets the spot. Safe to call when nothing is marked.
    pub fn clear(&mut self) {
        self.record = None;
    }

    pub fn target(&self) -> Option<GeoPoint> {
        self.record
            .as_ref()
            .map(|r| GeoPoint::new(r.lat, r.lng))
    }

    /// Google Maps walking directions to the spot, optionally from a known
    /// origin.
    pub fn directions_url(&self, origin: Option<GeoPoint>) -> Option<String> {
        let record = self.record.as_ref()?;
        let origin = origin
            .map(|o| format!("&origin={},{}", o.lat, o.lng))
            .unwrap_or_default();
        Some(format!(
            "https://www.google.com/maps/dir/?api=1{origin}&destination={},{}&travelmode=walking",
            record.lat, record.lng
        ))
    }

    /// Shareable pin link for the spot.
    pub fn share_url(&self) -> Option<String> {
        let record = self.record.as_ref()?;
        Some(format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            record.lat, record.lng
        ))
    }
}
