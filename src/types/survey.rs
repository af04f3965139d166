//! Survey points and computed trajectory stations

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A raw survey or plan measurement as supplied by collaborators.
///
/// Inclination and azimuth are in degrees. `measured_field_nt` is the total
/// magnetic field reported by the tool, when available, and only feeds the
/// advisory interference check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSurveyPoint {
    pub md: f64,
    pub inc: f64,
    pub azi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_field_nt: Option<f64>,
}

impl RawSurveyPoint {
    pub const fn new(md: f64, inc: f64, azi: f64) -> Self {
        Self {
            md,
            inc,
            azi,
            measured_field_nt: None,
        }
    }

    /// True when every numeric field is usable.
    pub fn is_finite(&self) -> bool {
        self.md.is_finite() && self.inc.is_finite() && self.azi.is_finite()
    }
}

/// A point on the realized or planned bore path.
///
/// Positions use the canonical local frame: `east`, `north`, and `tvd`
/// (true vertical depth, positive down). `dls` is degrees per 100 ft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    pub md: f64,
    pub inc: f64,
    pub azi: f64,
    pub tvd: f64,
    pub north: f64,
    pub east: f64,
    pub dls: f64,
    pub closure_distance: f64,
    pub closure_azimuth: f64,
    /// Minimum-curvature ratio factor of the segment ending here (diagnostic)
    pub ratio_factor: f64,
}

impl SurveyStation {
    /// Tie-in station at the origin of the local frame.
    pub const fn tie_in(md: f64, inc: f64, azi: f64) -> Self {
        Self {
            md,
            inc,
            azi,
            tvd: 0.0,
            north: 0.0,
            east: 0.0,
            dls: 0.0,
            closure_distance: 0.0,
            closure_azimuth: 0.0,
            ratio_factor: 1.0,
        }
    }

    /// Surface origin pointing straight down.
    pub const fn origin() -> Self {
        Self::tie_in(0.0, 0.0, 0.0)
    }

    /// Position as (east, north, depth).
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.east, self.north, self.tvd)
    }
}

impl Default for SurveyStation {
    fn default() -> Self {
        Self::origin()
    }
}

/// As-built rod record: cumulative length is built up from `length_ft`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodRecord {
    pub length_ft: f64,
    /// Degrees, positive nose-down
    pub pitch: f64,
    pub azimuth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_point_deserializes_without_field_strength() {
        let p: RawSurveyPoint = serde_json::from_str(r#"{"md": 30.0, "inc": 92.5, "azi": 45.0}"#).unwrap();
        assert_eq!(p, RawSurveyPoint::new(30.0, 92.5, 45.0));
        assert!(p.is_finite());
    }

    #[test]
    fn test_nan_point_is_not_finite() {
        assert!(!RawSurveyPoint::new(10.0, f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_station_position_frame() {
        let mut s = SurveyStation::origin();
        s.east = 1.0;
        s.north = 2.0;
        s.tvd = 3.0;
        assert_eq!(s.position(), Point3::new(1.0, 2.0, 3.0));
    }
}
