//! Trajectory reconstruction with the Minimum Curvature Method
//!
//! Integrates ordered (md, inclination, azimuth) readings into 3D stations
//! in the East / North / Depth frame. Each pair of readings is joined by the
//! circular arc tangent to both, which is the industry standard for both
//! oilfield and HDD surveys.
//!
//! Malformed readings (non-finite values, non-increasing md) are dropped
//! and counted rather than failing the whole calculation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::defaults::{DLS_COURSE_LENGTH_FT, STRAIGHT_DOGLEG_RAD};
use crate::survey::{azimuth_delta, normalize_azimuth, pitch_to_inclination};
use crate::types::{RawSurveyPoint, RodRecord, SurveyStation};

// ============================================================================
// Minimum Curvature Primitives
// ============================================================================

/// Dogleg angle β between two survey directions (all angles in radians).
///
/// Formula: β = acos(cos i1 · cos i2 + sin i1 · sin i2 · cos(a2 − a1))
///
/// The cosine is clamped to [-1, 1] so rounding noise never yields NaN.
pub fn dogleg_angle(i1: f64, i2: f64, a1: f64, a2: f64) -> f64 {
    // cos² + sin² can land one ulp under 1
    if i1 == i2 && a1 == a2 {
        return 0.0;
    }
    let cos_beta = i1.cos() * i2.cos() + i1.sin() * i2.sin() * (a2 - a1).cos();
    cos_beta.clamp(-1.0, 1.0).acos()
}

/// Ratio factor RF = (2/β) · tan(β/2), exactly 1 for a straight course.
pub fn ratio_factor(beta: f64) -> f64 {
    if beta < STRAIGHT_DOGLEG_RAD {
        1.0
    } else {
        (2.0 / beta) * (beta / 2.0).tan()
    }
}

/// Advance one minimum-curvature course from `prev` to a reading at `md`.
///
/// `inc` and `azi` are degrees. DLS is degrees per 100 ft of course length.
pub fn next_station(prev: &SurveyStation, md: f64, inc: f64, azi: f64) -> SurveyStation {
    let delta_md = md - prev.md;

    let i1 = prev.inc.to_radians();
    let a1 = prev.azi.to_radians();
    let i2 = inc.to_radians();
    let a2 = azi.to_radians();

    let beta = dogleg_angle(i1, i2, a1, a2);
    let rf = ratio_factor(beta);
    let half = delta_md / 2.0;

    let north = prev.north + half * (i1.sin() * a1.cos() + i2.sin() * a2.cos()) * rf;
    let east = prev.east + half * (i1.sin() * a1.sin() + i2.sin() * a2.sin()) * rf;
    let tvd = prev.tvd + half * (i1.cos() + i2.cos()) * rf;

    let dls = if delta_md > 0.0 {
        beta.to_degrees() / delta_md * DLS_COURSE_LENGTH_FT
    } else {
        0.0
    };

    SurveyStation {
        md,
        inc,
        azi,
        tvd,
        north,
        east,
        dls,
        closure_distance: north.hypot(east),
        closure_azimuth: normalize_azimuth(east.atan2(north).to_degrees()),
        ratio_factor: rf,
    }
}

// ============================================================================
// Trajectory
// ============================================================================

/// An immutable, computed bore path.
///
/// Always holds at least the tie-in station, and `md` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    stations: Vec<SurveyStation>,
    skipped_points: usize,
}

impl Trajectory {
    /// Integrate raw readings from the surface origin.
    ///
    /// A leading reading at md 0 supplies the tie-in angles instead of
    /// becoming a separate course.
    pub fn from_points(points: &[RawSurveyPoint]) -> Self {
        let first_valid = points.iter().position(RawSurveyPoint::is_finite);
        match first_valid {
            Some(idx) if points[idx].md == 0.0 => {
                let p = &points[idx];
                let tie_in = SurveyStation::tie_in(0.0, p.inc, normalize_azimuth(p.azi));
                let mut trajectory = Self::with_tie_in(tie_in, &points[idx + 1..]);
                trajectory.skipped_points += idx;
                trajectory
            }
            _ => Self::with_tie_in(SurveyStation::origin(), points),
        }
    }

    /// Integrate raw readings from an explicit tie-in station.
    pub fn with_tie_in(tie_in: SurveyStation, points: &[RawSurveyPoint]) -> Self {
        let mut stations = Vec::with_capacity(points.len() + 1);
        stations.push(tie_in);
        let mut skipped = 0;

        for point in points {
            let last = stations[stations.len() - 1];
            if !point.is_finite() {
                warn!(md = point.md, inc = point.inc, azi = point.azi, "Skipping non-finite survey point");
                skipped += 1;
                continue;
            }
            if point.md <= last.md {
                warn!(md = point.md, last_md = last.md, "Skipping non-increasing survey point");
                skipped += 1;
                continue;
            }
            stations.push(next_station(&last, point.md, point.inc, normalize_azimuth(point.azi)));
        }

        debug!(stations = stations.len(), skipped, "Trajectory computed");
        Self {
            stations,
            skipped_points: skipped,
        }
    }

    pub fn stations(&self) -> &[SurveyStation] {
        &self.stations
    }

    pub fn into_stations(self) -> Vec<SurveyStation> {
        self.stations
    }

    /// Readings dropped as malformed.
    pub fn skipped_points(&self) -> usize {
        self.skipped_points
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Never true; a trajectory always carries its tie-in.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn tie_in(&self) -> &SurveyStation {
        &self.stations[0]
    }

    pub fn last(&self) -> &SurveyStation {
        &self.stations[self.stations.len() - 1]
    }

    /// Course length from tie-in to the last station.
    pub fn measured_length(&self) -> f64 {
        self.last().md - self.tie_in().md
    }

    /// Sum of dogleg angles over all courses (degrees).
    pub fn total_curvature_deg(&self) -> f64 {
        self.stations
            .windows(2)
            .map(|w| w[1].dls * (w[1].md - w[0].md) / DLS_COURSE_LENGTH_FT)
            .sum()
    }

    /// Horizontal displacement of each station projected onto a section azimuth.
    pub fn vertical_section(&self, section_azimuth_deg: f64) -> Vec<f64> {
        let (sin_a, cos_a) = section_azimuth_deg.to_radians().sin_cos();
        self.stations
            .iter()
            .map(|s| s.north * cos_a + s.east * sin_a)
            .collect()
    }

    /// Interpolated station at an arbitrary measured depth.
    ///
    /// Depths outside the path clamp to the boundary station. Inside, the
    /// inclination and the shortest-path azimuth change are interpolated
    /// linearly over the bracketing course and one minimum-curvature step
    /// is run from the lower station.
    pub fn point_at_md(&self, md: f64) -> SurveyStation {
        let first = self.tie_in();
        let last = self.last();
        if md.is_nan() || md <= first.md {
            return *first;
        }
        if md >= last.md {
            return *last;
        }

        // First station with md >= target; always in 1..len here
        let upper = self.stations.partition_point(|s| s.md < md);
        let next = &self.stations[upper];
        if next.md == md {
            return *next;
        }
        let prev = &self.stations[upper - 1];

        let ratio = (md - prev.md) / (next.md - prev.md);
        let inc = prev.inc + (next.inc - prev.inc) * ratio;
        let azi = normalize_azimuth(prev.azi + azimuth_delta(prev.azi, next.azi) * ratio);

        next_station(prev, md, inc, azi)
    }
}

// ============================================================================
// As-Built Rod Logs
// ============================================================================

/// Convert an as-built rod log into raw survey readings.
///
/// Rod lengths accumulate into md and pitch becomes inclination. A reading
/// at md 0 is prepended using `entry_pitch` when given, otherwise the first
/// rod's angles.
pub fn stations_from_pitch_log(rods: &[RodRecord], entry_pitch: Option<f64>) -> Vec<RawSurveyPoint> {
    let mut points = Vec::with_capacity(rods.len() + 1);
    let Some(first) = rods.first() else {
        return points;
    };

    let tie_pitch = entry_pitch.unwrap_or(first.pitch);
    points.push(RawSurveyPoint::new(0.0, pitch_to_inclination(tie_pitch), first.azimuth));

    let mut md = 0.0;
    for rod in rods {
        md += rod.length_ft;
        points.push(RawSurveyPoint::new(md, pitch_to_inclination(rod.pitch), rod.azimuth));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn pts(raw: &[(f64, f64, f64)]) -> Vec<RawSurveyPoint> {
        raw.iter().map(|&(md, inc, azi)| RawSurveyPoint::new(md, inc, azi)).collect()
    }

    #[test]
    fn test_vertical_hole() {
        let traj = Trajectory::from_points(&pts(&[(0.0, 0.0, 0.0), (100.0, 0.0, 0.0)]));
        assert_eq!(traj.len(), 2);
        let s = traj.last();
        assert!((s.tvd - 100.0).abs() < EPS);
        assert!(s.north.abs() < EPS);
        assert!(s.east.abs() < EPS);
        assert_eq!(s.dls, 0.0);
        assert_eq!(s.ratio_factor, 1.0);
    }

    #[test]
    fn test_straight_inclined_course_is_trig_projection() {
        let traj = Trajectory::from_points(&pts(&[(0.0, 60.0, 45.0), (200.0, 60.0, 45.0)]));
        let s = traj.last();
        let horiz = 200.0 * 60f64.to_radians().sin();
        assert!((s.tvd - 200.0 * 60f64.to_radians().cos()).abs() < 1e-9);
        assert!((s.north - horiz * 45f64.to_radians().cos()).abs() < 1e-9);
        assert!((s.east - horiz * 45f64.to_radians().sin()).abs() < 1e-9);
        assert!((s.closure_distance - horiz).abs() < 1e-9);
        assert!((s.closure_azimuth - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_section_dls() {
        // 0 -> 30 degrees over 100 ft is 30 deg/100ft
        let traj = Trajectory::from_points(&pts(&[(0.0, 0.0, 90.0), (100.0, 30.0, 90.0)]));
        let s = traj.last();
        assert!((s.dls - 30.0).abs() < 1e-9);
        assert!(s.ratio_factor > 1.0);
        assert!(s.east > 0.0);
        assert!(s.north.abs() < 1e-9);
        assert!((traj.total_curvature_deg() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_monotonic_and_nan_points_are_skipped() {
        let traj = Trajectory::from_points(&pts(&[
            (0.0, 90.0, 0.0),
            (50.0, 90.0, 0.0),
            (40.0, 90.0, 0.0),
            (60.0, f64::NAN, 0.0),
            (50.0, 90.0, 0.0),
            (100.0, 90.0, 0.0),
        ]));
        let mds: Vec<f64> = traj.stations().iter().map(|s| s.md).collect();
        assert_eq!(mds, vec![0.0, 50.0, 100.0]);
        assert_eq!(traj.skipped_points(), 3);
    }

    #[test]
    fn test_empty_input_returns_tie_in_only() {
        let traj = Trajectory::from_points(&[]);
        assert_eq!(traj.len(), 1);
        assert_eq!(*traj.tie_in(), SurveyStation::origin());
        assert!(!traj.is_empty());
    }

    #[test]
    fn test_explicit_tie_in() {
        let tie = SurveyStation::tie_in(0.0, 90.0, 0.0);
        let traj = Trajectory::with_tie_in(tie, &pts(&[(100.0, 90.0, 0.0)]));
        assert!((traj.last().north - 100.0).abs() < 1e-9);
        assert!(traj.last().tvd.abs() < 1e-9);
    }

    #[test]
    fn test_point_at_md_clamps_and_interpolates() {
        let traj = Trajectory::from_points(&pts(&[(0.0, 90.0, 0.0), (100.0, 90.0, 0.0)]));
        assert_eq!(traj.point_at_md(-5.0), *traj.tie_in());
        assert_eq!(traj.point_at_md(500.0), *traj.last());
        let mid = traj.point_at_md(40.0);
        assert!((mid.north - 40.0).abs() < 1e-9);
        assert!((mid.md - 40.0).abs() < EPS);
    }

    #[test]
    fn test_point_at_md_wraps_azimuth() {
        let traj = Trajectory::from_points(&pts(&[(0.0, 90.0, 350.0), (100.0, 90.0, 10.0)]));
        let mid = traj.point_at_md(50.0);
        assert!(mid.azi < 1e-9 || (mid.azi - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_section_projection() {
        let traj = Trajectory::from_points(&pts(&[(0.0, 90.0, 90.0), (100.0, 90.0, 90.0)]));
        let vs = traj.vertical_section(90.0);
        assert!((vs[1] - 100.0).abs() < 1e-9);
        let vs_north = traj.vertical_section(0.0);
        assert!(vs_north[1].abs() < 1e-9);
    }

    #[test]
    fn test_pitch_log_conversion() {
        let rods = [
            RodRecord { length_ft: 10.0, pitch: 12.0, azimuth: 0.0 },
            RodRecord { length_ft: 10.0, pitch: 10.0, azimuth: 0.0 },
        ];
        let points = stations_from_pitch_log(&rods, Some(14.0));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].md, 0.0);
        assert_eq!(points[0].inc, 76.0);
        assert_eq!(points[2].md, 20.0);
        assert_eq!(points[2].inc, 80.0);

        // Diving pitch drives the bore downward
        let traj = Trajectory::from_points(&points);
        assert!(traj.last().tvd > 0.0);
        assert!(traj.last().north > 0.0);
    }
}
