//! Rod planning inputs and outputs

use serde::{Deserialize, Serialize};

/// Steering action taken on a rod.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SteeringAction {
    /// Keep the current non-level pitch
    Hold,
    /// Level pitch, push straight
    Push,
    SteerUp,
    SteerDown,
}

impl std::fmt::Display for SteeringAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SteeringAction::Hold => write!(f, "Hold"),
            SteeringAction::Push => write!(f, "Push"),
            SteeringAction::SteerUp => write!(f, "Steer Up"),
            SteeringAction::SteerDown => write!(f, "Steer Down"),
        }
    }
}

/// Planner request. Angles in degrees, pitch positive nose-down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodPlanInput {
    /// Entry pitch below horizontal
    pub entry_angle_deg: f64,
    pub target_depth_ft: f64,
    pub target_distance_ft: f64,
    pub rod_length_ft: f64,
    /// Maximum pitch change per rod
    pub max_steer_deg_per_rod: f64,
    #[serde(default)]
    pub azimuth_deg: f64,
}

/// One rod of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodPlanStep {
    pub rod_number: u32,
    /// Cumulative length along the bore
    pub md: f64,
    pub pitch: f64,
    pub depth: f64,
    pub distance: f64,
    pub action: SteeringAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pullback_lbf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pressure_psi: Option<f64>,
}

/// Planner output. A plan cut off by the rod cap keeps its partial steps
/// and reports `target_reached = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodPlan {
    pub steps: Vec<RodPlanStep>,
    pub target_reached: bool,
    /// Final depth minus target depth (positive = too deep)
    pub final_depth_error_ft: f64,
    pub total_length_ft: f64,
}

impl RodPlan {
    pub fn rod_count(&self) -> usize {
        self.steps.len()
    }

    pub fn last_step(&self) -> Option<&RodPlanStep> {
        self.steps.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(SteeringAction::SteerUp.to_string(), "Steer Up");
        assert_eq!(SteeringAction::Push.to_string(), "Push");
    }

    #[test]
    fn test_step_omits_unenriched_fields() {
        let step = RodPlanStep {
            rod_number: 1,
            md: 10.0,
            pitch: 12.0,
            depth: 2.0,
            distance: 9.8,
            action: SteeringAction::Hold,
            pullback_lbf: None,
            max_pressure_psi: None,
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("pullbackLbf"));
        assert!(json.contains("\"rodNumber\":1"));
    }
}
