//! Fuel kind type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown fuel kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel kind: {0}")]
pub struct InvalidFuelKind(String);

/// A fuel kind understood by the upstream price feed.
///
/// The serialized form is the feed's own identifier, so a `FuelKind` can be
/// passed straight through as a query parameter.
///
/// # Examples
///
/// ```
/// use station_server::domain::FuelKind;
///
/// let diesel = FuelKind::parse("gasolio").unwrap();
/// assert_eq!(diesel, FuelKind::Diesel);
/// assert_eq!(diesel.as_str(), "gasolio");
///
/// assert!(FuelKind::parse("kerosene").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FuelKind {
    #[default]
    #[serde(rename = "gasolio")]
    Diesel,
    #[serde(rename = "benzina")]
    Petrol,
    #[serde(rename = "gpl")]
    Lpg,
    #[serde(rename = "metano")]
    Methane,
}

impl FuelKind {
    /// Parse a fuel kind from its wire identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidFuelKind> {
        match s {
            "gasolio" => Ok(FuelKind::Diesel),
            "benzina" => Ok(FuelKind::Petrol),
            "gpl" => Ok(FuelKind::Lpg),
            "metano" => Ok(FuelKind::Methane),
            other => Err(InvalidFuelKind(other.to_string())),
        }
    }

    /// Returns the wire identifier for this fuel kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelKind::Diesel => "gasolio",
            FuelKind::Petrol => "benzina",
            FuelKind::Lpg => "gpl",
            FuelKind::Methane => "metano",
        }
    }
}

impl fmt::Display for FuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
