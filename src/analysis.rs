//! Whole-bore analysis
//!
//! Runs the engines in order for one bore:
//!
//! ```text
//! raw points → azimuth correction → minimum curvature → ┬→ clearance
//!                                                        ├→ pullback
//!                                                        └→ pressure profile
//! ```
//!
//! Every stage is a pure function of the input and the config held by the
//! [`BoreAnalysis`]. Fallbacks taken along the way are listed as caveats in
//! the report instead of failing the run.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collision::{check_collisions_with, CollisionReport};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::hydraulics::{pressure_profile, CirculationSetup, HeuristicSoilModel, PressurePoint, SoilModel};
use crate::loads::{detailed_pullback_with, PullbackResult, SoilClassification};
use crate::survey::{interference_severity_with, CorrectionParams};
use crate::trajectory::Trajectory;
use crate::types::{FluidProperties, Obstacle, PipeSpec, RawSurveyPoint, RiskLevel, SoilLayer, SurveyStation};

/// Everything needed to analyse one bore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoreAnalysisInput {
    pub survey: Vec<RawSurveyPoint>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub soil_layers: Vec<SoilLayer>,
    pub pipe: PipeSpec,
    #[serde(default)]
    pub fluid: FluidProperties,
    /// Reamed hole diameter; defaults to pipe diameter × configured ratio
    #[serde(default)]
    pub hole_diameter_in: Option<f64>,
    #[serde(default)]
    pub pump_rate_gpm: f64,
    /// Defaults to the configured loads safety factor
    #[serde(default)]
    pub safety_factor: Option<f64>,
    /// Local reference field for interference screening (nT)
    #[serde(default)]
    pub expected_field_nt: Option<f64>,
}

/// Survey point whose magnetic field reading deviates from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterferenceFlag {
    pub md: f64,
    pub measured_field_nt: f64,
    /// 0 (clean) to 1 (azimuth unreliable)
    pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoreReport {
    pub stations: Vec<SurveyStation>,
    pub skipped_points: usize,
    pub total_length_ft: f64,
    pub max_dls: f64,
    pub collisions: CollisionReport,
    pub pullback: PullbackResult,
    pub pressure_profile: Vec<PressurePoint>,
    /// Worst frac-out risk along the path
    pub frac_out_risk: RiskLevel,
    /// Station with the smallest pressure margin
    pub critical_pressure_point: Option<PressurePoint>,
    pub interference: Vec<InterferenceFlag>,
    pub caveats: Vec<String>,
}

/// Bore analysis runner with a fixed config and soil model.
pub struct BoreAnalysis<M = HeuristicSoilModel> {
    config: EngineConfig,
    model: M,
}

impl BoreAnalysis {
    pub fn new(config: EngineConfig) -> Self {
        let model = HeuristicSoilModel::new(config.soil.clone());
        Self { config, model }
    }

    /// Runner over the process-wide config.
    pub fn from_global() -> Self {
        Self::new(crate::config::get().clone())
    }
}

impl<M: SoilModel> BoreAnalysis<M> {
    pub const fn with_model(config: EngineConfig, model: M) -> Self {
        Self { config, model }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, input: &BoreAnalysisInput) -> Result<BoreReport, EngineError> {
        let cfg = &self.config;
        let mut caveats = Vec::new();

        // 1. Correction and trajectory
        let corrected = CorrectionParams::from_config(&cfg.survey).apply(&input.survey);
        let trajectory = Trajectory::from_points(&corrected);
        if trajectory.skipped_points() > 0 {
            caveats.push(format!(
                "{} survey point(s) skipped (non-finite values or non-increasing md)",
                trajectory.skipped_points()
            ));
        }
        if trajectory.len() < 2 {
            caveats.push("Trajectory has only the tie-in station".to_string());
        }
        let stations = trajectory.stations();

        // 2. Clearance
        let collisions = check_collisions_with(stations, &input.obstacles, &cfg.collision)?;

        // 3. Pullback
        let safety_factor = input.safety_factor.unwrap_or(cfg.loads.safety_factor);
        let soil = if input.soil_layers.is_empty() {
            caveats.push("No soil layers given; clay assumed for friction and fracture limits".to_string());
            SoilClassification::default()
        } else {
            SoilClassification::Layers(&input.soil_layers)
        };
        let pullback = detailed_pullback_with(
            stations,
            input.pipe.diameter_inches,
            input.pipe.material,
            soil,
            safety_factor,
            &cfg.loads,
        )?;

        // 4. Frac-out along the path
        let pipe_d = input.pipe.diameter_inches;
        let hole_d = input
            .hole_diameter_in
            .unwrap_or(pipe_d * cfg.hydraulics.hole_to_pipe_ratio);
        let setup = CirculationSetup {
            fluid: input.fluid,
            hole_diameter_in: hole_d,
            pipe_diameter_in: pipe_d,
            pump_rate_gpm: input.pump_rate_gpm,
        };
        let profile = pressure_profile(stations, &setup, &input.soil_layers, &self.model, &cfg.hydraulics)?;

        let fallback_count = profile.iter().filter(|p| p.layer_fallback).count();
        if fallback_count > 0 && !input.soil_layers.is_empty() {
            caveats.push(format!(
                "{fallback_count} station(s) below or between soil layers; fracture limits there are best-effort"
            ));
        }
        let frac_out_risk = profile.iter().map(|p| p.risk).max().unwrap_or_default();
        let critical_pressure_point = profile
            .iter()
            .min_by(|a, b| a.safety_margin_psi.total_cmp(&b.safety_margin_psi))
            .copied();

        // 5. Interference screening (advisory)
        let interference = input
            .expected_field_nt
            .map(|expected| screen_interference(&input.survey, expected, cfg.survey.interference_tolerance))
            .unwrap_or_default();
        if !interference.is_empty() {
            caveats.push(format!(
                "{} station(s) show magnetic interference; azimuths there may be unreliable",
                interference.len()
            ));
        }

        let report = BoreReport {
            skipped_points: trajectory.skipped_points(),
            total_length_ft: trajectory.measured_length(),
            max_dls: stations.iter().map(|s| s.dls).fold(0.0, f64::max),
            stations: stations.to_vec(),
            collisions,
            pullback,
            pressure_profile: profile,
            frac_out_risk,
            critical_pressure_point,
            interference,
            caveats,
        };

        info!(
            stations = report.stations.len(),
            hits = report.collisions.hits.len(),
            peak_pull_lbf = report.pullback.peak_tension_lbf,
            risk = %report.frac_out_risk,
            "Bore analysis complete"
        );
        Ok(report)
    }
}

fn screen_interference(points: &[RawSurveyPoint], expected_nt: f64, tolerance: f64) -> Vec<InterferenceFlag> {
    points
        .iter()
        .filter_map(|p| {
            let measured = p.measured_field_nt?;
            let severity = interference_severity_with(measured, expected_nt, tolerance);
            (severity > 0.0).then_some(InterferenceFlag {
                md: p.md,
                measured_field_nt: measured,
                severity,
            })
        })
        .collect()
}
