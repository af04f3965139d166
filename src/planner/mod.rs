//! Rod-by-rod bore planning
//!
//! Greedy angle-seeking: every rod aims the head at the remaining target
//! offset and steers toward that pitch by at most the steering limit.
//! Pitch is degrees below horizontal (positive nose-down), so the aim angle
//! `atan2(remaining depth, remaining distance)` compares directly.
//!
//! A plan stops when the target distance is reached or the rod cap is hit.
//! Capped plans return the partial steps with `target_reached = false`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::defaults::BEND_RADIUS_NUMERATOR;
use crate::config::{EngineConfig, PlannerConfig};
use crate::error::{require_non_negative, require_positive, EngineError};
use crate::hydraulics::{max_allowable_pressure, select_layer, SoilModel};
use crate::loads::{detailed_pullback_with, SoilClassification};
use crate::survey::pitch_to_inclination;
use crate::trajectory::Trajectory;
use crate::types::{
    PipeSpec, RawSurveyPoint, RodPlan, RodPlanInput, RodPlanStep, SoilLayer, SteeringAction, SurveyStation,
};

// ============================================================================
// Curve Geometry
// ============================================================================

/// Minimum bend radius (ft) for a curvature limit in deg/100 ft.
///
/// Formula: R = 18000 / (π · DLS)
///
/// A zero limit means the path cannot bend at all, so the radius is infinite.
pub fn min_bend_radius(max_dls_deg_per_100ft: f64) -> f64 {
    if max_dls_deg_per_100ft == 0.0 {
        return f64::INFINITY;
    }
    BEND_RADIUS_NUMERATOR / (std::f64::consts::PI * max_dls_deg_per_100ft)
}

/// Horizontal distance consumed by the entry curve: R · sin α.
pub fn setback_distance(radius_ft: f64, entry_angle_deg: f64) -> f64 {
    radius_ft * entry_angle_deg.to_radians().sin()
}

/// Depth gained while curving from the entry angle to level: R · (1 − cos α).
pub fn curve_depth(radius_ft: f64, entry_angle_deg: f64) -> f64 {
    radius_ft * (1.0 - entry_angle_deg.to_radians().cos())
}

// ============================================================================
// Planner
// ============================================================================

fn validate_input(input: &RodPlanInput) -> Result<(), EngineError> {
    require_positive("rod length", input.rod_length_ft)?;
    require_positive("target distance", input.target_distance_ft)?;
    require_non_negative("max steer per rod", input.max_steer_deg_per_rod)?;
    if !input.target_depth_ft.is_finite() {
        return Err(EngineError::invalid("target depth", input.target_depth_ft, "must be a finite number"));
    }
    if !input.azimuth_deg.is_finite() {
        return Err(EngineError::invalid("azimuth", input.azimuth_deg, "must be a finite number"));
    }
    if !(input.entry_angle_deg.is_finite() && input.entry_angle_deg.abs() < 90.0) {
        return Err(EngineError::invalid(
            "entry angle",
            input.entry_angle_deg,
            "must be strictly between -90 and 90 degrees",
        ));
    }
    Ok(())
}

/// Plan rods with the global planner config.
pub fn plan_rods(input: &RodPlanInput) -> Result<RodPlan, EngineError> {
    plan_rods_with(input, &crate::config::get().planner)
}

/// Plan rods from the entry point toward `(target_distance, target_depth)`.
pub fn plan_rods_with(input: &RodPlanInput, cfg: &PlannerConfig) -> Result<RodPlan, EngineError> {
    validate_input(input)?;

    let rod = input.rod_length_ft;
    let mut pitch = input.entry_angle_deg;
    let mut depth = 0.0_f64;
    let mut distance = 0.0_f64;
    let mut steps = Vec::new();

    let mut rod_number = 0_u32;
    while distance < input.target_distance_ft && rod_number < cfg.max_rods {
        rod_number += 1;

        let remaining_depth = input.target_depth_ft - depth;
        let remaining_distance = input.target_distance_ft - distance;
        let aim = remaining_depth.atan2(remaining_distance).to_degrees();
        let error = aim - pitch;

        let action = if error.abs() <= cfg.hold_tolerance_deg {
            if pitch.abs() <= cfg.hold_tolerance_deg {
                SteeringAction::Push
            } else {
                SteeringAction::Hold
            }
        } else {
            let delta = error.clamp(-input.max_steer_deg_per_rod, input.max_steer_deg_per_rod);
            pitch += delta;
            if delta > 0.0 {
                SteeringAction::SteerDown
            } else if delta < 0.0 {
                SteeringAction::SteerUp
            } else {
                // zero steering limit
                SteeringAction::Hold
            }
        };

        let (sin_p, cos_p) = pitch.to_radians().sin_cos();
        depth += rod * sin_p;
        distance += rod * cos_p;

        steps.push(RodPlanStep {
            rod_number,
            md: f64::from(rod_number) * rod,
            pitch,
            depth,
            distance,
            action,
            pullback_lbf: None,
            max_pressure_psi: None,
        });
    }

    let target_reached = distance >= input.target_distance_ft;
    if !target_reached {
        warn!(
            rods = rod_number,
            distance_ft = distance,
            target_ft = input.target_distance_ft,
            "Rod cap reached before target distance"
        );
    }

    let plan = RodPlan {
        total_length_ft: f64::from(rod_number) * rod,
        final_depth_error_ft: depth - input.target_depth_ft,
        target_reached,
        steps,
    };
    debug!(
        rods = plan.rod_count(),
        reached = plan.target_reached,
        depth_error_ft = plan.final_depth_error_ft,
        "Rod plan generated"
    );
    Ok(plan)
}

// ============================================================================
// Enrichment
// ============================================================================

/// Pipe and ground used to annotate a plan with loads and pressure limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanContext {
    pub pipe: PipeSpec,
    #[serde(default)]
    pub soil_layers: Vec<SoilLayer>,
    pub safety_factor: f64,
}

/// Minimum-curvature stations for a plan, tied in at the entry angle.
pub fn plan_trajectory(plan: &RodPlan, input: &RodPlanInput) -> Trajectory {
    let tie_in = SurveyStation::tie_in(0.0, pitch_to_inclination(input.entry_angle_deg), input.azimuth_deg);
    let points: Vec<RawSurveyPoint> = plan
        .steps
        .iter()
        .map(|s| RawSurveyPoint::new(s.md, pitch_to_inclination(s.pitch), input.azimuth_deg))
        .collect();
    Trajectory::with_tie_in(tie_in, &points)
}

/// Fill each step's pullback and max allowable pressure.
///
/// Pullback for rod `n` is the force to pull pipe through the path drilled
/// so far (stations 0..=n). Pressure is the fracture limit at the rod's
/// depth for the layer covering it.
pub fn enrich_plan(
    plan: &RodPlan,
    input: &RodPlanInput,
    ctx: &PlanContext,
    model: &dyn SoilModel,
    cfg: &EngineConfig,
) -> Result<RodPlan, EngineError> {
    let trajectory = plan_trajectory(plan, input);
    let stations = trajectory.stations();
    let soil = if ctx.soil_layers.is_empty() {
        SoilClassification::default()
    } else {
        SoilClassification::Layers(&ctx.soil_layers)
    };

    let mut enriched = plan.clone();
    for (i, step) in enriched.steps.iter_mut().enumerate() {
        let prefix = &stations[..(i + 2).min(stations.len())];
        let pull = detailed_pullback_with(
            prefix,
            ctx.pipe.diameter_inches,
            ctx.pipe.material,
            soil,
            ctx.safety_factor,
            &cfg.loads,
        )?;

        let depth = step.depth.max(0.0);
        let (layer, _) = select_layer(&ctx.soil_layers, depth)?;
        let props = model.properties(&layer, depth);

        step.pullback_lbf = Some(pull.peak_tension_lbf);
        step.max_pressure_psi = Some(max_allowable_pressure(depth, &props));
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydraulics::HeuristicSoilModel;
    use crate::types::{PipeMaterial, SoilType};

    fn input() -> RodPlanInput {
        RodPlanInput {
            entry_angle_deg: 12.0,
            target_depth_ft: 15.0,
            target_distance_ft: 300.0,
            rod_length_ft: 10.0,
            max_steer_deg_per_rod: 2.0,
            azimuth_deg: 90.0,
        }
    }

    #[test]
    fn test_bend_geometry() {
        assert!(min_bend_radius(0.0).is_infinite());
        let r = min_bend_radius(10.0);
        assert!((r - 18000.0 / (std::f64::consts::PI * 10.0)).abs() < 1e-9);
        assert!((setback_distance(100.0, 30.0) - 50.0).abs() < 1e-9);
        assert!((curve_depth(100.0, 60.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_reaches_target_distance() {
        let plan = plan_rods_with(&input(), &PlannerConfig::default()).unwrap();
        assert!(plan.target_reached);
        let last = plan.last_step().unwrap();
        assert!(last.distance >= 300.0);
        assert!(plan.final_depth_error_ft.abs() < 2.0);
        assert_eq!(plan.total_length_ft, plan.rod_count() as f64 * 10.0);
    }

    #[test]
    fn test_steps_are_numbered_and_steer_limited() {
        let plan = plan_rods_with(&input(), &PlannerConfig::default()).unwrap();
        let mut prev_pitch = 12.0;
        for (i, step) in plan.steps.iter().enumerate() {
            assert_eq!(step.rod_number as usize, i + 1);
            assert!((step.pitch - prev_pitch).abs() <= 2.0 + 1e-12);
            prev_pitch = step.pitch;
        }
        // 12 deg down is steeper than the 2.9 deg aim line
        assert_eq!(plan.steps[0].action, SteeringAction::SteerUp);
    }

    #[test]
    fn test_level_target_pushes() {
        let level = RodPlanInput {
            entry_angle_deg: 0.0,
            target_depth_ft: 0.0,
            ..input()
        };
        let plan = plan_rods_with(&level, &PlannerConfig::default()).unwrap();
        assert!(plan.steps.iter().all(|s| s.action == SteeringAction::Push));
        assert_eq!(plan.rod_count(), 30);
    }

    #[test]
    fn test_rod_cap_returns_partial_plan() {
        let cfg = PlannerConfig {
            max_rods: 5,
            ..PlannerConfig::default()
        };
        let plan = plan_rods_with(&input(), &cfg).unwrap();
        assert_eq!(plan.rod_count(), 5);
        assert!(!plan.target_reached);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let bad_rod = RodPlanInput {
            rod_length_ft: 0.0,
            ..input()
        };
        assert!(plan_rods_with(&bad_rod, &PlannerConfig::default()).is_err());

        let vertical = RodPlanInput {
            entry_angle_deg: 90.0,
            ..input()
        };
        assert!(plan_rods_with(&vertical, &PlannerConfig::default()).is_err());
    }

    #[test]
    fn test_enriched_plan_pullback_grows() {
        let plan = plan_rods_with(&input(), &PlannerConfig::default()).unwrap();
        let ctx = PlanContext {
            pipe: PipeSpec::new(6.0, PipeMaterial::Hdpe),
            soil_layers: vec![SoilLayer::new(0.0, 50.0, SoilType::Clay).with_hardness(4.0)],
            safety_factor: 1.5,
        };
        let enriched = enrich_plan(
            &plan,
            &input(),
            &ctx,
            &HeuristicSoilModel::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(enriched.rod_count(), plan.rod_count());
        let pulls: Vec<f64> = enriched.steps.iter().map(|s| s.pullback_lbf.unwrap()).collect();
        assert!(pulls[0] > 0.0);
        assert!(pulls.windows(2).all(|w| w[1] >= w[0]));
        assert!(enriched.steps.iter().all(|s| s.max_pressure_psi.is_some()));
    }

    #[test]
    fn test_plan_trajectory_matches_rods() {
        let plan = plan_rods_with(&input(), &PlannerConfig::default()).unwrap();
        let trajectory = plan_trajectory(&plan, &input());
        assert_eq!(trajectory.len(), plan.rod_count() + 1);
        assert_eq!(trajectory.skipped_points(), 0);
        assert!((trajectory.tie_in().inc - 78.0).abs() < 1e-12);
    }
}
