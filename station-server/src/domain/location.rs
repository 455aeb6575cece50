//! Location samples from the platform location collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A single location fix, optionally carrying a compass heading.
///
/// Headings arrive with an accuracy estimate and are only trusted when the
/// reported accuracy is within the policy threshold; see
/// [`reliable_heading`](LocationSample::reliable_heading).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Position of the fix.
    pub point: GeoPoint,

    /// Compass heading in degrees clockwise from north, in `[0, 360)`.
    #[serde(default)]
    pub heading_deg: Option<f64>,

    /// Estimated heading accuracy in degrees.
    #[serde(default)]
    pub heading_accuracy_deg: Option<f64>,

    /// Ground speed in metres per second.
    #[serde(default)]
    pub speed_mps: Option<f64>,

    /// When the fix was produced.
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    /// Create a sample with no heading information.
    pub fn at(point: GeoPoint, timestamp: DateTime<Utc>) -> Self {
        Self {
            point,
            heading_deg: None,
            heading_accuracy_deg: None,
            speed_mps: None,
            timestamp,
        }
    }

    /// Attach a heading with the given accuracy estimate.
    ///
    /// The heading is normalized into `[0, 360)`.
    pub fn with_heading(mut self, heading_deg: f64, accuracy_deg: f64) -> Self {
        self.heading_deg = Some(heading_deg.rem_euclid(360.0));
        self.heading_accuracy_deg = Some(accuracy_deg);
        self
    }

    /// Returns the heading iff it is present and its reported accuracy is
    /// within `max_accuracy_deg`.
    ///
    /// A heading with no accuracy estimate is never trusted.
    pub fn reliable_heading(&self, max_accuracy_deg: f64) -> Option<f64> {
        let heading = self.heading_deg?;
        let accuracy = self.heading_accuracy_deg?;
        (accuracy <= max_accuracy_deg).then_some(heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocationSample {
        LocationSample::at(GeoPoint::new(45.0, 9.0), Utc::now())
    }

    #[test]
    fn heading_within_threshold_is_reliable() {
        let s = sample().with_heading(90.0, 10.0);
        assert_eq!(s.reliable_heading(45.0), Some(90.0));
    }

    #[test]
    fn heading_beyond_threshold_is_rejected() {
        let s = sample().with_heading(90.0, 60.0);
        assert_eq!(s.reliable_heading(45.0), None);
    }

    #[test]
    fn heading_at_threshold_is_reliable() {
        let s = sample().with_heading(180.0, 45.0);
        assert_eq!(s.reliable_heading(45.0), Some(180.0));
    }

    #[test]
    fn missing_heading_is_never_reliable() {
        assert_eq!(sample().reliable_heading(45.0), None);
    }

    #[test]
    fn missing_accuracy_is_never_reliable() {
        let mut s = sample();
        s.heading_deg = Some(90.0);
        assert_eq!(s.reliable_heading(45.0), None);
    }

    #[test]
    fn heading_is_normalized() {
        let s = sample().with_heading(370.0, 5.0);
        assert_eq!(s.heading_deg, Some(10.0));

        let s = sample().with_heading(-90.0, 5.0);
        assert_eq!(s.heading_deg, Some(270.0));
    }
}
