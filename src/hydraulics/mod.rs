//! Annular hydraulics and frac-out risk
//!
//! Compares the borehole pressure needed to circulate returns against the
//! pressure the surrounding soil can hold before it fractures:
//! - Required: hydrostatic head + Bingham-plastic annular friction loss
//! - Allowable: Delft cavity-expansion limit for the active soil layer
//!
//! Soil layer lookup falls back to the first layer (or a default clay) when
//! no layer covers the query depth. Results flag that case as best-effort.

pub mod soil;

pub use soil::{pore_pressure, HeuristicSoilModel, SoilModel, SoilProperties};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::defaults::{GALLONS_PER_CUBIC_FOOT, SQUARE_INCHES_PER_SQUARE_FOOT};
use crate::config::HydraulicsConfig;
use crate::error::{require_non_negative, EngineError};
use crate::types::{BoreholeGeometry, FluidProperties, RiskLevel, SoilLayer, SoilType, SurveyStation};

// ============================================================================
// Required Pressure
// ============================================================================

fn check_annulus(geo: &BoreholeGeometry) -> Result<(), EngineError> {
    require_non_negative("pipe diameter", geo.pipe_diameter_in)?;
    if !geo.hole_diameter_in.is_finite() || geo.hole_diameter_in <= geo.pipe_diameter_in {
        return Err(EngineError::DegenerateAnnulus {
            hole_diameter_in: geo.hole_diameter_in,
            pipe_diameter_in: geo.pipe_diameter_in,
        });
    }
    Ok(())
}

/// Mean annular velocity (ft/min).
///
/// Formula: V = (Q / 7.48) / (A / 144)
///
/// Where:
/// - Q = pump rate (gpm)
/// - A = annulus area π/4 · (Dh² − Dp²) (in²)
pub fn annular_velocity(geo: &BoreholeGeometry, pump_rate_gpm: f64) -> Result<f64, EngineError> {
    check_annulus(geo)?;
    require_non_negative("pump rate", pump_rate_gpm)?;
    let flow_ft3_min = pump_rate_gpm / GALLONS_PER_CUBIC_FOOT;
    let area_ft2 = geo.annular_area_sq_in() / SQUARE_INCHES_PER_SQUARE_FOOT;
    Ok(flow_ft3_min / area_ft2)
}

/// Annular pressure loss (psi), Bingham-plastic laminar approximation.
///
/// Formula: APL = (PV · V / (k_v · Δ²) + YP / (k_y · Δ)) · L
///
/// Where:
/// - PV = plastic viscosity (cP), YP = yield point (lb/100ft²)
/// - V = annular velocity (ft/min)
/// - Δ = Dh − Dp clearance (in)
/// - k_v, k_y = empirical divisors (1000, 200 by default)
/// - L = drilled length (ft)
pub fn annular_pressure_loss(
    fluid: &FluidProperties,
    geo: &BoreholeGeometry,
    pump_rate_gpm: f64,
    cfg: &HydraulicsConfig,
) -> Result<f64, EngineError> {
    let velocity = annular_velocity(geo, pump_rate_gpm)?;
    let clearance = geo.clearance_in();
    let viscous = fluid.plastic_viscosity_cp * velocity / (cfg.viscous_loss_divisor * clearance.powi(2));
    let yield_term = fluid.yield_point_lb_100ft2 / (cfg.yield_loss_divisor * clearance);
    Ok((viscous + yield_term) * geo.length_ft.max(0.0))
}

/// Hydrostatic head of the mud column (psi): 0.052 · ppg · ft.
pub fn hydrostatic_pressure(density_ppg: f64, depth_ft: f64, cfg: &HydraulicsConfig) -> f64 {
    cfg.hydrostatic_constant * density_ppg * depth_ft.max(0.0)
}

/// Hydrostatic head plus annular friction loss (psi).
pub fn required_pressure(
    fluid: &FluidProperties,
    geo: &BoreholeGeometry,
    pump_rate_gpm: f64,
    cfg: &HydraulicsConfig,
) -> Result<f64, EngineError> {
    let apl = annular_pressure_loss(fluid, geo, pump_rate_gpm, cfg)?;
    Ok(hydrostatic_pressure(fluid.density_ppg, geo.depth_ft, cfg) + apl)
}

/// Equivalent circulating density (ppg).
///
/// Formula: ECD = MW + APL / (0.052 · TVD)
///
/// Returns the mud weight unchanged at or above the surface.
pub fn calculate_ecd(mud_weight_ppg: f64, annular_loss_psi: f64, tvd_ft: f64, cfg: &HydraulicsConfig) -> f64 {
    if tvd_ft <= 0.0 {
        return mud_weight_ppg;
    }
    mud_weight_ppg + annular_loss_psi / (cfg.hydrostatic_constant * tvd_ft)
}

// ============================================================================
// Allowable Pressure (Delft)
// ============================================================================

/// Maximum allowable borehole pressure (psi), Delft cavity expansion.
///
/// Formula: P_max = u + σ'r · (1 + sin φ) + c · cos φ + P_visc
///
/// Where:
/// - u = pore pressure
/// - σ'v = max(γ · d / 144 − u, 0), effective vertical stress
/// - σ'r = K0 · σ'v with K0 = 1 − sin φ (frictional) or 1.0 (cohesive)
/// - c = cohesion, φ = friction angle
/// - P_visc = shear modulus × viscous strain
pub fn max_allowable_pressure(depth_ft: f64, soil: &SoilProperties) -> f64 {
    let depth = depth_ft.max(0.0);
    let (sin_phi, cos_phi) = soil.friction_angle_deg.to_radians().sin_cos();

    let total_vertical = soil.unit_weight_pcf * depth / SQUARE_INCHES_PER_SQUARE_FOOT;
    let effective_vertical = (total_vertical - soil.pore_pressure_psi).max(0.0);

    let k0 = if soil.soil_type.is_cohesive() {
        1.0
    } else {
        1.0 - sin_phi
    };
    let effective_radial = k0 * effective_vertical;

    soil.pore_pressure_psi
        + effective_radial * (1.0 + sin_phi)
        + soil.cohesion_psi * cos_phi
        + soil.viscous_resistance_psi
}

// ============================================================================
// Risk
// ============================================================================

/// CRITICAL below zero margin, HIGH inside the buffer, LOW otherwise.
pub fn classify_risk(safety_margin_psi: f64, buffer_psi: f64) -> RiskLevel {
    if safety_margin_psi < 0.0 {
        RiskLevel::Critical
    } else if safety_margin_psi < buffer_psi {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

/// Layer governing a query depth, and whether a fallback was used.
///
/// First layer containing the depth; otherwise the first layer; otherwise
/// a default clay layer.
pub fn select_layer(layers: &[SoilLayer], depth_ft: f64) -> Result<(SoilLayer, bool), EngineError> {
    if let Some(bad) = layers.iter().find(|l| !l.is_well_formed()) {
        return Err(EngineError::invalid(
            "soil layer start depth",
            bad.start_depth,
            "layer start depth must be finite and above its end depth",
        ));
    }

    if let Some(layer) = layers.iter().find(|l| l.contains(depth_ft)) {
        return Ok((layer.clone(), false));
    }
    let fallback = layers.first().cloned().unwrap_or_else(SoilLayer::default_clay);
    warn!(
        depth_ft,
        soil = %fallback.soil_type,
        "No soil layer covers depth, using fallback layer"
    );
    Ok((fallback, true))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FracOutAnalysis {
    pub hydrostatic_psi: f64,
    pub annular_loss_psi: f64,
    pub required_pressure_psi: f64,
    pub max_allowable_psi: f64,
    /// Allowable minus required
    pub safety_margin_psi: f64,
    pub risk: RiskLevel,
    pub ecd_ppg: f64,
    pub active_soil: SoilType,
    /// True when no layer covered the depth and a fallback was used
    pub layer_fallback: bool,
    pub soil: SoilProperties,
}

/// Frac-out analysis with the global config and heuristic soil model.
pub fn analyze_frac_out(
    fluid: &FluidProperties,
    geo: &BoreholeGeometry,
    layers: &[SoilLayer],
    pump_rate_gpm: f64,
) -> Result<FracOutAnalysis, EngineError> {
    let cfg = crate::config::get();
    let model = HeuristicSoilModel::new(cfg.soil.clone());
    analyze_frac_out_with(fluid, geo, layers, pump_rate_gpm, &model, &cfg.hydraulics)
}

/// Frac-out analysis at one point of the bore.
pub fn analyze_frac_out_with(
    fluid: &FluidProperties,
    geo: &BoreholeGeometry,
    layers: &[SoilLayer],
    pump_rate_gpm: f64,
    model: &dyn SoilModel,
    cfg: &HydraulicsConfig,
) -> Result<FracOutAnalysis, EngineError> {
    let depth = geo.depth_ft.max(0.0);
    let (layer, layer_fallback) = select_layer(layers, depth)?;
    let soil = model.properties(&layer, depth);

    let hydrostatic = hydrostatic_pressure(fluid.density_ppg, depth, cfg);
    let apl = annular_pressure_loss(fluid, geo, pump_rate_gpm, cfg)?;
    let required = hydrostatic + apl;
    let max_allowable = max_allowable_pressure(depth, &soil);
    let margin = max_allowable - required;
    let risk = classify_risk(margin, cfg.risk_buffer_psi);

    debug!(
        depth_ft = depth,
        required_psi = required,
        max_psi = max_allowable,
        risk = %risk,
        "Frac-out analysis"
    );

    Ok(FracOutAnalysis {
        hydrostatic_psi: hydrostatic,
        annular_loss_psi: apl,
        required_pressure_psi: required,
        max_allowable_psi: max_allowable,
        safety_margin_psi: margin,
        risk,
        ecd_ppg: calculate_ecd(fluid.density_ppg, apl, depth, cfg),
        active_soil: layer.soil_type,
        layer_fallback,
        soil,
    })
}

// ============================================================================
// Depth Profile
// ============================================================================

/// Pressure state at one station, for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressurePoint {
    pub md: f64,
    pub tvd: f64,
    pub hydrostatic_psi: f64,
    pub required_psi: f64,
    pub max_allowable_psi: f64,
    pub safety_margin_psi: f64,
    pub risk: RiskLevel,
    pub layer_fallback: bool,
}

/// Borehole and circulation setup shared by every station of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CirculationSetup {
    pub fluid: FluidProperties,
    pub hole_diameter_in: f64,
    pub pipe_diameter_in: f64,
    pub pump_rate_gpm: f64,
}

/// Frac-out state at every station, drilled length taken from md.
pub fn pressure_profile(
    stations: &[SurveyStation],
    setup: &CirculationSetup,
    layers: &[SoilLayer],
    model: &dyn SoilModel,
    cfg: &HydraulicsConfig,
) -> Result<Vec<PressurePoint>, EngineError> {
    stations
        .iter()
        .map(|s| {
            let geo = BoreholeGeometry {
                hole_diameter_in: setup.hole_diameter_in,
                pipe_diameter_in: setup.pipe_diameter_in,
                length_ft: s.md,
                depth_ft: s.tvd,
            };
            let a = analyze_frac_out_with(&setup.fluid, &geo, layers, setup.pump_rate_gpm, model, cfg)?;
            Ok(PressurePoint {
                md: s.md,
                tvd: s.tvd,
                hydrostatic_psi: a.hydrostatic_psi,
                required_psi: a.required_pressure_psi,
                max_allowable_psi: a.max_allowable_psi,
                safety_margin_psi: a.safety_margin_psi,
                risk: a.risk,
                layer_fallback: a.layer_fallback,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoilConfig;

    fn geometry(length: f64, depth: f64) -> BoreholeGeometry {
        BoreholeGeometry {
            hole_diameter_in: 12.0,
            pipe_diameter_in: 8.0,
            length_ft: length,
            depth_ft: depth,
        }
    }

    #[test]
    fn test_annular_velocity() {
        // area = 20π in², 100 gpm
        let v = annular_velocity(&geometry(0.0, 0.0), 100.0).unwrap();
        let expected = (100.0 / 7.48) / (20.0 * std::f64::consts::PI / 144.0);
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_annulus_rejected() {
        let geo = BoreholeGeometry {
            hole_diameter_in: 8.0,
            pipe_diameter_in: 8.0,
            length_ft: 100.0,
            depth_ft: 10.0,
        };
        let err = annular_pressure_loss(&FluidProperties::default(), &geo, 100.0, &HydraulicsConfig::default());
        assert!(matches!(err, Err(EngineError::DegenerateAnnulus { .. })));
    }

    #[test]
    fn test_apl_is_linear_in_length() {
        let cfg = HydraulicsConfig::default();
        let fluid = FluidProperties::default();
        let short = annular_pressure_loss(&fluid, &geometry(100.0, 10.0), 50.0, &cfg).unwrap();
        let long = annular_pressure_loss(&fluid, &geometry(300.0, 10.0), 50.0, &cfg).unwrap();
        assert!((long - 3.0 * short).abs() < 1e-9);
        // no flow still pays the yield term
        let still = annular_pressure_loss(&fluid, &geometry(100.0, 10.0), 0.0, &cfg).unwrap();
        assert!((still - 20.0 / (200.0 * 4.0) * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_hydrostatic_and_ecd() {
        let cfg = HydraulicsConfig::default();
        assert!((hydrostatic_pressure(9.0, 100.0, &cfg) - 46.8).abs() < 1e-9);
        assert_eq!(calculate_ecd(9.0, 50.0, 0.0, &cfg), 9.0);
        assert!((calculate_ecd(9.0, 5.2, 100.0, &cfg) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cohesive_delft_limit() {
        let props = HeuristicSoilModel::new(SoilConfig::default())
            .properties(&SoilLayer::new(0.0, 50.0, SoilType::Clay).with_hardness(5.0), 20.0);
        let p = max_allowable_pressure(20.0, &props);
        let u = 0.433 * 20.0;
        let sv = 110.0 * 20.0 / 144.0;
        let expected = u + (sv - u) + 10.0 + 1000.0 * 0.001;
        assert!((p - expected).abs() < 1e-9);
    }

    #[test]
    fn test_clay_hardness_raises_limit() {
        let model = HeuristicSoilModel::default();
        let at = |h: f64| {
            let props = model.properties(&SoilLayer::new(0.0, 50.0, SoilType::Clay).with_hardness(h), 15.0);
            max_allowable_pressure(15.0, &props)
        };
        assert!(at(4.0) > at(3.0));
        assert!(at(8.0) > at(4.0));
    }

    #[test]
    fn test_risk_classification() {
        assert_eq!(classify_risk(-0.1, 10.0), RiskLevel::Critical);
        assert_eq!(classify_risk(5.0, 10.0), RiskLevel::High);
        assert_eq!(classify_risk(10.0, 10.0), RiskLevel::Low);
    }

    #[test]
    fn test_layer_fallback() {
        let layers = [SoilLayer::new(0.0, 10.0, SoilType::Sand)];
        let (layer, fallback) = select_layer(&layers, 25.0).unwrap();
        assert_eq!(layer.soil_type, SoilType::Sand);
        assert!(fallback);

        let (layer, fallback) = select_layer(&[], 5.0).unwrap();
        assert_eq!(layer.soil_type, SoilType::Clay);
        assert!(fallback);

        let (_, fallback) = select_layer(&layers, 5.0).unwrap();
        assert!(!fallback);
    }

    #[test]
    fn test_inverted_layer_rejected() {
        let layers = [SoilLayer::new(20.0, 10.0, SoilType::Clay)];
        assert!(select_layer(&layers, 15.0).is_err());
    }

    #[test]
    fn test_long_shallow_bore_is_critical() {
        let analysis = analyze_frac_out_with(
            &FluidProperties::default(),
            &geometry(2000.0, 5.0),
            &[SoilLayer::new(0.0, 30.0, SoilType::Clay).with_hardness(2.0)],
            150.0,
            &HeuristicSoilModel::default(),
            &HydraulicsConfig::default(),
        )
        .unwrap();
        assert_eq!(analysis.risk, RiskLevel::Critical);
        assert!(analysis.safety_margin_psi < 0.0);
        assert!(!analysis.layer_fallback);
        assert!(analysis.ecd_ppg > 9.0);
    }

    #[test]
    fn test_pressure_profile_follows_stations() {
        let stations = [
            SurveyStation::origin(),
            SurveyStation {
                md: 100.0,
                tvd: 10.0,
                ..SurveyStation::origin()
            },
        ];
        let setup = CirculationSetup {
            fluid: FluidProperties::default(),
            hole_diameter_in: 12.0,
            pipe_diameter_in: 8.0,
            pump_rate_gpm: 80.0,
        };
        let profile = pressure_profile(
            &stations,
            &setup,
            &[],
            &HeuristicSoilModel::default(),
            &HydraulicsConfig::default(),
        )
        .unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].required_psi, 0.0);
        assert!(profile[1].required_psi > profile[0].required_psi);
        assert!(profile.iter().all(|p| p.layer_fallback));
    }
}
