//! Pullback load estimation (ASTM F1962 style simplifications)
//!
//! Key calculations:
//! - Pipe weight in air and net buoyant weight in drilling fluid
//! - Straight-pull estimate from length alone
//! - Detailed pull along a trajectory with a capstan multiplier at every bend
//!
//! The pipe is pulled from the exit side back to the rig, so tension builds
//! from zero at the last station and is carried back toward the entry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::defaults::{CUBIC_INCHES_PER_GALLON, DLS_COURSE_LENGTH_FT, INCHES_PER_FOOT};
use crate::config::LoadsConfig;
use crate::error::{require_positive, EngineError};
use crate::types::{PipeMaterial, SoilLayer, SoilType, SurveyStation};

// ============================================================================
// Pipe Properties
// ============================================================================

/// Per-foot pipe properties in drilling fluid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeProperties {
    pub wall_thickness_in: f64,
    /// Weight in air (lb/ft)
    pub weight_air_lb_ft: f64,
    /// Weight of displaced fluid (lb/ft)
    pub displaced_fluid_lb_ft: f64,
    /// Net weight (lb/ft); negative means the empty pipe floats
    pub net_weight_lb_ft: f64,
}

/// Pipe weight and buoyancy from diameter and material.
///
/// Formula:
/// - W_air = π/4 · (OD² − ID²) · 12 · ρ_pipe
/// - W_fluid = (π/4 · OD² · 12 / 231) · ρ_fluid
/// - W_net = W_air − W_fluid
///
/// Where:
/// - OD = nominal diameter (in), ID = OD − 2 · wall
/// - ρ_pipe = material density (lb/in³)
/// - ρ_fluid = fluid density (ppg)
pub fn pipe_properties(diameter_in: f64, material: PipeMaterial, fluid_density_ppg: f64) -> PipeProperties {
    let wall = diameter_in * material.wall_ratio();
    let od = diameter_in;
    let id = od - 2.0 * wall;

    let quarter_pi = std::f64::consts::FRAC_PI_4;
    let material_area = quarter_pi * (od.powi(2) - id.powi(2));
    let weight_air = material_area * INCHES_PER_FOOT * material.density_lb_in3();

    let displaced_gal = quarter_pi * od.powi(2) * INCHES_PER_FOOT / CUBIC_INCHES_PER_GALLON;
    let displaced_fluid = displaced_gal * fluid_density_ppg;

    PipeProperties {
        wall_thickness_in: wall,
        weight_air_lb_ft: weight_air,
        displaced_fluid_lb_ft: displaced_fluid,
        net_weight_lb_ft: weight_air - displaced_fluid,
    }
}

// ============================================================================
// Friction Selection
// ============================================================================

/// Soil along the bore, as a single label or a geotechnical layer list.
#[derive(Debug, Clone, Copy)]
pub enum SoilClassification<'a> {
    Single(SoilType),
    Layers(&'a [SoilLayer]),
}

impl Default for SoilClassification<'_> {
    fn default() -> Self {
        Self::Single(SoilType::Clay)
    }
}

/// Friction coefficient for the soil along the bore.
///
/// A layer list uses the largest coefficient present, never below clay.
/// One hard layer therefore governs the whole pull.
pub fn friction_coefficient(soil: SoilClassification<'_>, cfg: &LoadsConfig) -> f64 {
    match soil {
        SoilClassification::Single(t) => cfg.friction.for_soil(t),
        SoilClassification::Layers(layers) => layers
            .iter()
            .map(|l| cfg.friction.for_soil(l.soil_type))
            .fold(cfg.friction.clay, f64::max),
    }
}

// ============================================================================
// Pullback
// ============================================================================

/// Tension after wrapping a bend: T_out = T_in · e^(μ·θ), θ in radians.
pub fn capstan_load(tension_in: f64, friction_coefficient: f64, angle_rad: f64) -> f64 {
    tension_in * (friction_coefficient * angle_rad).exp()
}

/// Detailed pullback result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullbackResult {
    /// Tension at the rig with the safety factor applied (lbf)
    pub peak_tension_lbf: f64,
    pub friction_coefficient: f64,
    pub net_weight_lb_ft: f64,
    /// Product of every capstan factor along the path
    pub capstan_multiplier: f64,
    /// Factored tension at each station, entry first (lbf)
    pub tension_profile: Vec<f64>,
}

impl PullbackResult {
    fn zero(stations: usize, mu: f64, net_weight: f64) -> Self {
        Self {
            peak_tension_lbf: 0.0,
            friction_coefficient: mu,
            net_weight_lb_ft: net_weight,
            capstan_multiplier: 1.0,
            tension_profile: vec![0.0; stations],
        }
    }
}

/// Pullback along a trajectory using the global loads config.
pub fn detailed_pullback(
    stations: &[SurveyStation],
    diameter_in: f64,
    material: PipeMaterial,
    soil: SoilClassification<'_>,
    safety_factor: f64,
) -> Result<PullbackResult, EngineError> {
    detailed_pullback_with(stations, diameter_in, material, soil, safety_factor, &crate::config::get().loads)
}

/// Pullback along a trajectory.
///
/// Walking from the last station back to the first, each course adds
/// `len · (|W_net| · μ + drag · D)` and then, if it bends, multiplies the
/// running tension by e^(μ·θ) with θ = DLS/100 · len (deg → rad).
/// Fewer than two stations or zero length gives zero force.
pub fn detailed_pullback_with(
    stations: &[SurveyStation],
    diameter_in: f64,
    material: PipeMaterial,
    soil: SoilClassification<'_>,
    safety_factor: f64,
    cfg: &LoadsConfig,
) -> Result<PullbackResult, EngineError> {
    require_positive("pipe diameter", diameter_in)?;
    require_positive("safety factor", safety_factor)?;

    let mu = friction_coefficient(soil, cfg);
    let props = pipe_properties(diameter_in, material, cfg.fluid_density_ppg);
    if stations.len() < 2 {
        return Ok(PullbackResult::zero(stations.len(), mu, props.net_weight_lb_ft));
    }

    let normal_per_ft = props.net_weight_lb_ft.abs();
    let drag_per_ft = diameter_in * cfg.fluid_drag_lb_per_ft_per_in;

    let mut tension = 0.0;
    let mut multiplier = 1.0;
    let mut profile = vec![0.0; stations.len()];

    for i in (1..stations.len()).rev() {
        let curr = &stations[i];
        let len = curr.md - stations[i - 1].md;
        if len <= 0.0 {
            profile[i - 1] = tension * safety_factor;
            continue;
        }

        tension += len * (normal_per_ft * mu + drag_per_ft);

        let bend_rad = (curr.dls / DLS_COURSE_LENGTH_FT * len).to_radians();
        if bend_rad > 0.0 {
            let factor = capstan_load(1.0, mu, bend_rad);
            tension *= factor;
            multiplier *= factor;
        }
        profile[i - 1] = tension * safety_factor;
    }

    let peak = tension * safety_factor;
    debug!(
        stations = stations.len(),
        mu,
        capstan = multiplier,
        peak_lbf = peak,
        "Pullback computed"
    );

    Ok(PullbackResult {
        peak_tension_lbf: peak,
        friction_coefficient: mu,
        net_weight_lb_ft: props.net_weight_lb_ft,
        capstan_multiplier: multiplier,
        tension_profile: profile,
    })
}

/// Straight-pull estimate from length alone.
///
/// Formula: T = (L · |W_net| · μ + L · drag · D) · SF
pub fn simplified_pullback(
    length_ft: f64,
    diameter_in: f64,
    material: PipeMaterial,
    soil: SoilClassification<'_>,
    safety_factor: f64,
    cfg: &LoadsConfig,
) -> Result<f64, EngineError> {
    require_positive("pipe diameter", diameter_in)?;
    require_positive("safety factor", safety_factor)?;
    if length_ft <= 0.0 {
        return Ok(0.0);
    }

    let mu = friction_coefficient(soil, cfg);
    let props = pipe_properties(diameter_in, material, cfg.fluid_density_ppg);
    let friction_drag = length_ft * props.net_weight_lb_ft.abs() * mu;
    let fluid_drag = length_ft * diameter_in * cfg.fluid_drag_lb_per_ft_per_in;

    Ok((friction_drag + fluid_drag) * safety_factor)
}
