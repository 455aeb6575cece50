//! Search policy configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::FuelKind;

/// How many candidates to request upstream per result slot, so corridor
/// filtering has headroom to discard.
const FETCH_OVERSAMPLE: usize = 2;

/// Error returned when a policy fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid policy: {reason}")]
pub struct InvalidPolicy {
    reason: &'static str,
}

/// How candidates are selected around the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Keep only stations ahead along the travel heading, falling back to
    /// omnidirectional selection when no usable heading exists.
    AlongHeading,
    /// Radius-only selection, no directional filtering.
    Omnidirectional,
}

/// Sort criterion for the ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    /// Cheapest first; stations with no price for the active fuel sort last.
    Price,
    /// Nearest first, by effective distance (route if known, else air).
    Distance,
}

/// Which distance feeds sorting and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    /// Straight-line distance only; no routing requests are made.
    AirOnly,
    /// Enhance with road distances from the routing collaborator, falling
    /// back to air distance per station until (or unless) they arrive.
    PreferRoute,
}

/// Tunable parameters for station selection and ranking.
///
/// One `Policy` is shared by every surface rendering the same session; it is
/// passed into the pipeline explicitly on each run and persisted by
/// [`crate::settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Fuel kind to fetch prices for.
    pub fuel: FuelKind,

    /// Search radius in km. Also sent upstream as the fetch constraint.
    pub search_radius_km: f64,

    /// Maximum number of stations in the ranked list.
    pub max_results: usize,

    /// Half-width of the lateral corridor around the heading, km.
    pub corridor_half_width_km: f64,

    /// Half-angle of the forward cone around the heading, degrees.
    pub forward_cone_half_angle_deg: f64,

    /// Minimum forward projection in km. Rejects stations behind the user
    /// or close enough to be effectively alongside.
    pub min_forward_km: f64,

    /// Maximum reported heading accuracy (degrees) for a heading to be
    /// trusted.
    pub heading_accuracy_max_deg: f64,

    /// Selection mode.
    pub mode: SearchMode,

    /// Sort criterion for the final list.
    pub sort: SortCriterion,

    /// Distance source preference.
    pub distance_source: DistanceSource,

    /// Seconds between periodic fetch cycles.
    pub update_interval_secs: u64,
}

impl Policy {
    /// Check the numeric parameters.
    ///
    /// Distances and angles must be positive and finite; the update interval
    /// must be at least one second.
    pub fn validate(&self) -> Result<(), InvalidPolicy> {
        fn positive(value: f64, reason: &'static str) -> Result<(), InvalidPolicy> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(InvalidPolicy { reason })
            }
        }

        positive(self.search_radius_km, "search radius must be positive")?;
        positive(
            self.corridor_half_width_km,
            "corridor half-width must be positive",
        )?;
        positive(
            self.forward_cone_half_angle_deg,
            "forward cone half-angle must be positive",
        )?;
        positive(self.min_forward_km, "minimum forward distance must be positive")?;
        positive(
            self.heading_accuracy_max_deg,
            "heading accuracy threshold must be positive",
        )?;

        if self.update_interval_secs == 0 {
            return Err(InvalidPolicy {
                reason: "update interval must be at least one second",
            });
        }

        Ok(())
    }

    /// Returns the periodic refresh interval as a `Duration`.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// How many candidates to request from the price feed.
    ///
    /// More than the result cap, so the directional filter has something
    /// left after discarding off-corridor stations.
    pub fn fetch_limit(&self) -> usize {
        self.max_results.saturating_mul(FETCH_OVERSAMPLE).max(1)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fuel: FuelKind::Diesel,
            search_radius_km: 10.0,
            max_results: 5,
            corridor_half_width_km: 3.0,
            forward_cone_half_angle_deg: 70.0,
            min_forward_km: 0.5,
            heading_accuracy_max_deg: 45.0,
            mode: SearchMode::AlongHeading,
            sort: SortCriterion::Price,
            distance_source: DistanceSource::AirOnly,
            update_interval_secs: 60,
        }
    }
}
