pub mod alert;
pub mod parking;

pub use alert::{icon_for_message, Alert, AlertIcon, CannedAlert, NewAlert, PRECONFIGURED_ALERTS};
pub use parking::ParkingRecord;
