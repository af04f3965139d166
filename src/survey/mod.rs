//! Angle correction for raw survey readings
//!
//! Converts magnetic tool azimuths into a true or grid north reference and
//! moves between the two angle conventions used on a job:
//! - Pitch: signed, 0 = horizontal, positive nose-down
//! - Inclination: 0 = straight down, 90 = horizontal
//!
//! Magnetic interference is an advisory signal only. It never changes an
//! azimuth and never blocks a calculation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SurveyConfig;
use crate::types::RawSurveyPoint;

// ============================================================================
// Azimuth References
// ============================================================================

/// Map any real degree value into `[0, 360)`.
pub fn normalize_azimuth(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Signed shortest rotation from `from` to `to`, in `[-180, 180]`.
pub fn azimuth_delta(from: f64, to: f64) -> f64 {
    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    }
    if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// True azimuth from a magnetic reading.
///
/// Formula: true = normalize(raw + declination)
///
/// Declination is positive East.
pub fn true_azimuth(raw: f64, declination: f64) -> f64 {
    normalize_azimuth(raw + declination)
}

/// Grid azimuth from a magnetic reading.
///
/// Formula: grid = normalize(raw + declination − convergence + interference_offset)
pub fn grid_azimuth(raw: f64, declination: f64, convergence: f64, interference_offset: f64) -> f64 {
    normalize_azimuth(raw + declination - convergence + interference_offset)
}

// ============================================================================
// Magnetic Interference
// ============================================================================

/// Interference severity (0-1) with the default 5% tolerance.
pub fn interference_severity(measured_field: f64, expected_field: f64) -> f64 {
    interference_severity_with(measured_field, expected_field, 0.05)
}

/// Interference severity for a given fractional tolerance.
///
/// Zero while the field deviation stays under `tolerance × expected`, then
/// rising linearly to 1 at twice that deviation:
///
/// severity = min(1, (|Δ| − threshold) / threshold)
pub fn interference_severity_with(measured_field: f64, expected_field: f64, tolerance: f64) -> f64 {
    let threshold = (expected_field * tolerance).abs();
    let delta = (measured_field - expected_field).abs();

    if !delta.is_finite() || threshold <= 0.0 {
        return 0.0;
    }
    if delta < threshold {
        return 0.0;
    }
    ((delta - threshold) / threshold).min(1.0)
}

// ============================================================================
// Pitch / Inclination
// ============================================================================

/// Inclination from a signed pitch (positive nose-down).
pub fn pitch_to_inclination(pitch: f64) -> f64 {
    90.0 - pitch
}

/// Pitch (positive nose-down) from an inclination.
pub fn inclination_to_pitch(inclination: f64) -> f64 {
    90.0 - inclination
}

// ============================================================================
// Correction Pre-step
// ============================================================================

/// Reference corrections applied to every raw point before integration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectionParams {
    pub declination_deg: f64,
    pub grid_convergence_deg: f64,
    pub interference_offset_deg: f64,
    /// Reference to grid north instead of true north
    pub use_grid: bool,
}

impl CorrectionParams {
    pub fn from_config(cfg: &SurveyConfig) -> Self {
        Self {
            declination_deg: cfg.declination_deg,
            grid_convergence_deg: cfg.grid_convergence_deg,
            interference_offset_deg: cfg.interference_offset_deg,
            use_grid: cfg.apply_grid_correction,
        }
    }

    /// No-op when every correction is zero.
    pub fn is_identity(&self) -> bool {
        self.declination_deg == 0.0
            && self.interference_offset_deg == 0.0
            && (!self.use_grid || self.grid_convergence_deg == 0.0)
    }

    pub fn correct_azimuth(&self, raw: f64) -> f64 {
        if self.use_grid {
            grid_azimuth(
                raw,
                self.declination_deg,
                self.grid_convergence_deg,
                self.interference_offset_deg,
            )
        } else {
            true_azimuth(raw + self.interference_offset_deg, self.declination_deg)
        }
    }

    /// Correct the azimuth of every point. Depth, inclination and field are untouched.
    pub fn apply(&self, points: &[RawSurveyPoint]) -> Vec<RawSurveyPoint> {
        debug!(
            points = points.len(),
            declination = self.declination_deg,
            grid = self.use_grid,
            "Applying azimuth correction"
        );
        points
            .iter()
            .map(|p| RawSurveyPoint {
                azi: self.correct_azimuth(p.azi),
                ..*p
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_true_azimuth_declination_sign() {
        assert!((true_azimuth(10.0, 5.0) - 15.0).abs() < EPS);
        assert!((true_azimuth(10.0, -5.0) - 5.0).abs() < EPS);
        assert!((true_azimuth(355.0, 10.0) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_negative_and_large() {
        assert!((normalize_azimuth(-90.0) - 270.0).abs() < EPS);
        assert!((normalize_azimuth(725.0) - 5.0).abs() < EPS);
        assert_eq!(normalize_azimuth(360.0), 0.0);
        let tiny = normalize_azimuth(-1e-15);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_grid_azimuth() {
        // 100 + 5 - 2 + 1 = 104
        assert!((grid_azimuth(100.0, 5.0, 2.0, 1.0) - 104.0).abs() < EPS);
        assert!((grid_azimuth(1.0, 0.0, 3.0, 0.0) - 358.0).abs() < EPS);
    }

    #[test]
    fn test_azimuth_delta_takes_short_way() {
        assert!((azimuth_delta(350.0, 10.0) - 20.0).abs() < EPS);
        assert!((azimuth_delta(10.0, 350.0) + 20.0).abs() < EPS);
    }

    #[test]
    fn test_interference_within_tolerance_is_zero() {
        assert_eq!(interference_severity(50_000.0, 50_000.0), 0.0);
        assert_eq!(interference_severity(52_000.0, 50_000.0), 0.0);
    }

    #[test]
    fn test_interference_scales_and_saturates() {
        // threshold 2500, delta 3750 -> 0.5
        assert!((interference_severity(53_750.0, 50_000.0) - 0.5).abs() < EPS);
        assert_eq!(interference_severity(60_000.0, 50_000.0), 1.0);
        assert_eq!(interference_severity(40_000.0, 50_000.0), 1.0);
    }

    #[test]
    fn test_pitch_inclination_inverse() {
        assert_eq!(pitch_to_inclination(0.0), 90.0);
        assert_eq!(pitch_to_inclination(12.0), 78.0);
        assert_eq!(inclination_to_pitch(pitch_to_inclination(-7.5)), -7.5);
    }

    #[test]
    fn test_correction_applies_grid_when_requested() {
        let params = CorrectionParams {
            declination_deg: 5.0,
            grid_convergence_deg: 2.0,
            interference_offset_deg: 0.0,
            use_grid: true,
        };
        let corrected = params.apply(&[RawSurveyPoint::new(10.0, 90.0, 100.0)]);
        assert!((corrected[0].azi - 103.0).abs() < EPS);
        assert_eq!(corrected[0].md, 10.0);
        assert_eq!(corrected[0].inc, 90.0);
    }

    #[test]
    fn test_default_params_are_identity() {
        let params = CorrectionParams::from_config(&SurveyConfig::default());
        assert!(params.is_identity());
        assert!((params.correct_azimuth(45.0) - 45.0).abs() < EPS);
    }
}
