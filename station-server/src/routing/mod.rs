//! Directions API client.
//!
//! This module provides road distance and travel time between the user and
//! candidate stations, as an optional enhancement over air distance. Key
//! characteristics:
//! - per-destination failures are isolated: one unroutable station never
//!   poisons the rest of a batch
//! - the matrix endpoint answers many destinations per request and is
//!   preferred whenever a batch holds two or more

mod client;
mod error;
mod types;

pub use client::{RoutingClient, RoutingConfig};
pub use error::RoutingError;
pub use types::{
    DirectionsResponse, DistanceMatrixResponse, LegDto, MatrixElementDto, MatrixRowDto,
    QuantityDto, RouteDto, RouteLeg,
};
