//! Utility clearance checks
//!
//! Every station is tested against every obstacle. Stations are points;
//! obstacles are line segments, with point obstacles stretched into a short
//! vertical segment rising toward the surface. Clearance is measured
//! surface-to-surface: center distance minus borehole and obstacle radii.
//!
//! Per-pair results are ranked most dangerous first.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CollisionConfig;
use crate::error::{require_non_negative, EngineError};
use crate::types::{Obstacle, ObstacleCategory, ProximityLevel, SurveyStation};

/// Classification of a single station/obstacle pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HitKind {
    /// Clearance at or below zero
    Collision,
    /// Clearance inside the safety buffer
    Warning,
}

/// A station/obstacle pair closer than the obstacle's threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionHit {
    pub obstacle_id: String,
    pub obstacle_name: String,
    pub category: ObstacleCategory,
    pub station_md: f64,
    pub center_distance_ft: f64,
    pub min_distance_ft: f64,
    pub threshold_ft: f64,
    pub kind: HitKind,
}

/// Closest station/obstacle pair over the whole path, hit or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestApproach {
    pub obstacle_id: String,
    pub station_md: f64,
    pub center_distance_ft: f64,
    pub min_distance_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollisionReport {
    /// Sorted by increasing `min_distance_ft`
    pub hits: Vec<CollisionHit>,
    pub nearest: Option<NearestApproach>,
    pub level: ProximityLevel,
    /// One line per obstacle, worst station only
    pub alerts: Vec<String>,
}

impl CollisionReport {
    pub fn has_collision(&self) -> bool {
        self.level == ProximityLevel::Critical
    }

    pub fn collisions(&self) -> impl Iterator<Item = &CollisionHit> {
        self.hits.iter().filter(|h| h.kind == HitKind::Collision)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CollisionHit> {
        self.hits.iter().filter(|h| h.kind == HitKind::Warning)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Euclidean distance from `p` to the segment `a`–`b`.
///
/// The projection parameter is clamped to [0, 1]; a zero-length segment
/// degenerates to point distance.
pub fn point_to_segment_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab: Vector3<f64> = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).norm()
}

/// Segment used for distance math. Point obstacles rise `point_extent_ft` toward the surface.
pub fn obstacle_segment(obstacle: &Obstacle, point_extent_ft: f64) -> (Point3<f64>, Point3<f64>) {
    let start = obstacle.start.to_point();
    let end = match obstacle.end {
        Some(end) => end.to_point(),
        None => start - Vector3::z() * point_extent_ft,
    };
    (start, end)
}

fn validate_obstacle(obstacle: &Obstacle) -> Result<(), EngineError> {
    if !obstacle.start.is_finite() || !obstacle.end.map_or(true, |e| e.is_finite()) {
        return Err(EngineError::invalid(
            "obstacle coordinate",
            f64::NAN,
            "obstacle coordinates must be finite",
        ));
    }
    if let Some(d) = obstacle.diameter_inches {
        require_non_negative("obstacle diameter", d)?;
    }
    if let Some(b) = obstacle.safety_buffer_feet {
        require_non_negative("obstacle safety buffer", b)?;
    }
    Ok(())
}

// ============================================================================
// Detection
// ============================================================================

/// Check a path against obstacles using the global collision config.
pub fn check_collisions(
    stations: &[SurveyStation],
    obstacles: &[Obstacle],
) -> Result<CollisionReport, EngineError> {
    check_collisions_with(stations, obstacles, &crate::config::get().collision)
}

/// Check a path against obstacles.
///
/// A pair is a collision when clearance ≤ 0 and a warning when
/// 0 < clearance < threshold, where threshold is the obstacle's safety
/// buffer or the configured default warning distance.
pub fn check_collisions_with(
    stations: &[SurveyStation],
    obstacles: &[Obstacle],
    cfg: &CollisionConfig,
) -> Result<CollisionReport, EngineError> {
    for obstacle in obstacles {
        validate_obstacle(obstacle)?;
    }
    if stations.is_empty() || obstacles.is_empty() {
        return Ok(CollisionReport::default());
    }

    let mut hits = Vec::new();
    let mut nearest: Option<NearestApproach> = None;

    for obstacle in obstacles {
        let (a, b) = obstacle_segment(obstacle, cfg.point_obstacle_extent_ft);
        let effective_radius = cfg.borehole_radius_ft + obstacle.radius_ft();
        let threshold = obstacle.safety_buffer_feet.unwrap_or(cfg.default_warning_ft);

        for station in stations {
            let center = point_to_segment_distance(&station.position(), &a, &b);
            let min_distance = center - effective_radius;

            if nearest.as_ref().map_or(true, |n| min_distance < n.min_distance_ft) {
                nearest = Some(NearestApproach {
                    obstacle_id: obstacle.id.clone(),
                    station_md: station.md,
                    center_distance_ft: center,
                    min_distance_ft: min_distance,
                });
            }

            let kind = if min_distance <= 0.0 {
                HitKind::Collision
            } else if min_distance < threshold {
                HitKind::Warning
            } else {
                continue;
            };

            hits.push(CollisionHit {
                obstacle_id: obstacle.id.clone(),
                obstacle_name: obstacle.label().to_string(),
                category: obstacle.category,
                station_md: station.md,
                center_distance_ft: center,
                min_distance_ft: min_distance,
                threshold_ft: threshold,
                kind,
            });
        }
    }

    hits.sort_by(|x, y| x.min_distance_ft.total_cmp(&y.min_distance_ft));

    let level = if hits.iter().any(|h| h.kind == HitKind::Collision) {
        ProximityLevel::Critical
    } else if hits.is_empty() {
        ProximityLevel::Safe
    } else {
        ProximityLevel::Warning
    };

    let alerts = build_alerts(&hits);
    debug!(
        stations = stations.len(),
        obstacles = obstacles.len(),
        hits = hits.len(),
        level = %level,
        "Collision check complete"
    );

    Ok(CollisionReport {
        hits,
        nearest,
        level,
        alerts,
    })
}

/// Worst hit per obstacle, in ranked order.
fn build_alerts(hits: &[CollisionHit]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    hits.iter()
        .filter(|h| seen.insert(h.obstacle_id.as_str()))
        .map(|h| match h.kind {
            HitKind::Collision => format!(
                "CRITICAL: Collision with {} ({}) at MD {:.1}' (clearance {:.2}')",
                h.obstacle_name, h.category, h.station_md, h.min_distance_ft
            ),
            HitKind::Warning => format!(
                "WARNING: Proximity to {} ({}) at MD {:.1}' (clearance {:.2}' < {:.1}')",
                h.obstacle_name, h.category, h.station_md, h.min_distance_ft, h.threshold_ft
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn station_at(md: f64, east: f64, north: f64, tvd: f64) -> SurveyStation {
        SurveyStation {
            md,
            east,
            north,
            tvd,
            ..SurveyStation::origin()
        }
    }

    fn manhole() -> Obstacle {
        Obstacle::point("mh-1", Coordinate::new(10.0, 10.0, 10.0))
            .with_diameter(12.0)
            .with_safety_buffer(5.0)
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 0.0, 0.0);
        assert!((point_to_segment_distance(&Point3::new(5.0, 3.0, 0.0), &a, &b) - 3.0).abs() < 1e-12);
        assert!((point_to_segment_distance(&Point3::new(-4.0, 3.0, 0.0), &a, &b) - 5.0).abs() < 1e-12);
        assert!((point_to_segment_distance(&Point3::new(13.0, 4.0, 0.0), &a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_segment_is_point_distance() {
        let a = Point3::new(1.0, 1.0, 1.0);
        assert!((point_to_segment_distance(&Point3::new(4.0, 5.0, 1.0), &a, &a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_station_on_point_obstacle_is_collision() {
        let report = check_collisions_with(
            &[station_at(10.0, 10.0, 10.0, 10.0)],
            &[manhole()],
            &CollisionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.level, ProximityLevel::Critical);
        assert_eq!(report.hits[0].kind, HitKind::Collision);
        assert!(report.hits[0].min_distance_ft <= 0.0);
    }

    #[test]
    fn test_two_feet_below_is_warning() {
        let report = check_collisions_with(
            &[station_at(12.0, 10.0, 10.0, 12.0)],
            &[manhole()],
            &CollisionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.level, ProximityLevel::Warning);
        let hit = &report.hits[0];
        assert_eq!(hit.kind, HitKind::Warning);
        assert!(hit.min_distance_ft > 0.0 && hit.min_distance_ft < 5.0);
        assert_eq!(report.alerts.len(), 1);
    }

    #[test]
    fn test_hits_sorted_and_far_pairs_ignored() {
        let gas = Obstacle::line("gas", Coordinate::new(0.0, 50.0, 6.0), Coordinate::new(100.0, 50.0, 6.0))
            .with_diameter(4.0);
        let stations = [
            station_at(0.0, 20.0, 0.0, 6.0),
            station_at(10.0, 20.0, 44.0, 6.0),
            station_at(20.0, 20.0, 49.0, 6.0),
        ];
        let report = check_collisions_with(&stations, &[gas], &CollisionConfig::default()).unwrap();
        // station at north 0 is 50 ft away: beyond the 10 ft default
        assert_eq!(report.hits.len(), 2);
        assert!(report.hits[0].min_distance_ft <= report.hits[1].min_distance_ft);
        assert_eq!(report.hits[0].station_md, 20.0);
        assert_eq!(report.nearest.as_ref().map(|n| n.station_md), Some(20.0));
    }

    #[test]
    fn test_no_obstacles_is_safe_and_empty() {
        let report =
            check_collisions_with(&[SurveyStation::origin()], &[], &CollisionConfig::default()).unwrap();
        assert_eq!(report.level, ProximityLevel::Safe);
        assert!(report.hits.is_empty());
        assert!(report.nearest.is_none());
    }

    #[test]
    fn test_nearest_reported_even_when_safe() {
        let far = Obstacle::point("far", Coordinate::new(0.0, 0.0, 100.0));
        let report = check_collisions_with(&[SurveyStation::origin()], &[far], &CollisionConfig::default()).unwrap();
        assert_eq!(report.level, ProximityLevel::Safe);
        assert!(report.nearest.is_some());
    }

    #[test]
    fn test_negative_diameter_rejected() {
        let bad = manhole().with_diameter(-1.0);
        let result = check_collisions_with(&[SurveyStation::origin()], &[bad], &CollisionConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
    }
}
