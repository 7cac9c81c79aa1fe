//! Plate normalization.
//!
//! Every producer and consumer of plate-keyed data (channel topics, store
//! queries, registry lookups) goes through this module. A plate that is
//! normalized differently at any boundary routes to the wrong topic and the
//! alert silently vanishes, so normalization lives in exactly one place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum length of a plate after normalization (Mercosul and older
/// Brazilian formats are both 7 characters).
pub const MIN_PLATE_LEN: usize = 7;

/// Strips everything except ASCII letters and digits and uppercases the rest.
///
/// Pure, total and deterministic: `normalize("abc-1d23") == "ABC1D23"`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlateError {
    #[error("plate '{0}' is too short after normalization (minimum {MIN_PLATE_LEN} characters)")]
    TooShort(String),
}

/// A license plate in canonical form: uppercase alphanumeric, length >= 7.
///
/// The only way to obtain one is [`NormalizedPlate::parse`], which applies
/// [`normalize`] and validates the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPlate(String);

impl NormalizedPlate {
    pub fn parse(raw: &str) -> Result<Self, PlateError> {
        let normalized = normalize(raw);
        if normalized.len() < MIN_PLATE_LEN {
            return Err(PlateError::TooShort(normalized));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NormalizedPlate {
    type Error = PlateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NormalizedPlate> for String {
    fn from(plate: NormalizedPlate) -> Self {
        plate.0
    }
}
