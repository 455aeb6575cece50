//! Domain types for the fuel station finder.
//!
//! This module contains the core value types shared by the selection
//! pipeline, the collaborator clients, and the web layer. Raw upstream
//! records ([`StationCandidate`]) are all-optional; everything else is
//! validated at construction time.

mod candidate;
mod error;
mod fuel;
mod location;
mod point;
mod station;

pub use candidate::StationCandidate;
pub use error::DomainError;
pub use fuel::{FuelKind, InvalidFuelKind};
pub use location::LocationSample;
pub use point::GeoPoint;
pub use station::{FuelStation, StationId};
