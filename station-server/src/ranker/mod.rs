//! Station selection and ranking.
//!
//! This module implements the core algorithm: given a location sample, raw
//! candidates from the price feed, and a policy, produce the filtered,
//! sorted, bounded list of stations to display. Directional selection
//! (corridor + forward cone around the travel heading) degrades
//! automatically to plain radius selection when no usable heading exists.

mod config;
mod corridor;
mod pipeline;

pub use config::{DistanceSource, InvalidPolicy, Policy, SearchMode, SortCriterion};
pub use corridor::filter_along_heading;
pub use pipeline::{
    DIRECTION_UNAVAILABLE_NOTICE, HeadingResolution, RankOutcome, UsedMode, refresh_air_distances,
    resolve_heading, run, sort_stations,
};
