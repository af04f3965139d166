//! Soil property heuristics
//!
//! Hardness scores and rock strengths from field logs are mapped onto the
//! strength parameters the cavity-expansion model needs. These are empirical
//! lookup tables, not physical laws, so they sit behind the [`SoilModel`]
//! trait and can be recalibrated or replaced without touching the pressure
//! math.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    CLAY_MODULUS_FACTOR, ROCK_FRICTION_ANGLE_DEG, ROCK_MODULUS_FACTOR, SAND_COHESION_PSI,
    SAND_MODULUS_BASE_PSI, SAND_MODULUS_PER_FT,
};
use crate::config::SoilConfig;
use crate::types::{SoilLayer, SoilType};

/// Strength and stress state of the soil at a query depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilProperties {
    pub soil_type: SoilType,
    /// Undrained shear strength / cohesion (psi)
    pub cohesion_psi: f64,
    /// Internal friction angle (deg)
    pub friction_angle_deg: f64,
    pub shear_modulus_psi: f64,
    /// Groundwater pressure at depth (psi)
    pub pore_pressure_psi: f64,
    pub unit_weight_pcf: f64,
    /// Small stiffness contribution added to the fracture limit (psi)
    pub viscous_resistance_psi: f64,
}

/// Strategy mapping a soil layer to engineering properties.
pub trait SoilModel {
    fn properties(&self, layer: &SoilLayer, depth_ft: f64) -> SoilProperties;
}

/// Default hardness-driven lookup.
///
/// - Clay: cohesion scales with hardness, zero friction angle
/// - Silt: half the clay cohesion, zero friction angle
/// - Sand: friction angle scales with hardness (capped), negligible cohesion
/// - Gravel: friction angle at the cap, no cohesion
/// - Rock: cohesion from unconfined strength
#[derive(Debug, Clone, Default)]
pub struct HeuristicSoilModel {
    cfg: SoilConfig,
}

impl HeuristicSoilModel {
    pub const fn new(cfg: SoilConfig) -> Self {
        Self { cfg }
    }

    /// Model calibrated from the global config.
    pub fn from_global() -> Self {
        Self::new(crate::config::get().soil.clone())
    }

    pub const fn config(&self) -> &SoilConfig {
        &self.cfg
    }

    fn sand_friction_angle(&self, hardness: f64) -> f64 {
        let c = &self.cfg;
        (c.sand_base_friction_deg + c.sand_friction_per_hardness_deg * hardness).min(c.max_friction_angle_deg)
    }
}

/// Hydrostatic pore pressure below the water table.
pub fn pore_pressure(depth_ft: f64, cfg: &SoilConfig) -> f64 {
    cfg.water_gradient_psi_per_ft * (depth_ft - cfg.water_table_depth_ft).max(0.0)
}

impl SoilModel for HeuristicSoilModel {
    fn properties(&self, layer: &SoilLayer, depth_ft: f64) -> SoilProperties {
        let c = &self.cfg;
        let depth = depth_ft.max(0.0);
        let sand_modulus = SAND_MODULUS_BASE_PSI + SAND_MODULUS_PER_FT * depth;

        let (cohesion, phi, modulus) = match layer.soil_type {
            SoilType::Clay => {
                let su = layer.hardness.unwrap_or(c.default_clay_hardness) * c.clay_cohesion_per_hardness_psi;
                (su, 0.0, CLAY_MODULUS_FACTOR * su)
            }
            SoilType::Silt => {
                let su = 0.5 * layer.hardness.unwrap_or(c.default_clay_hardness) * c.clay_cohesion_per_hardness_psi;
                (su, 0.0, CLAY_MODULUS_FACTOR * su)
            }
            SoilType::Sand => {
                let phi = self.sand_friction_angle(layer.hardness.unwrap_or(c.default_sand_hardness));
                (SAND_COHESION_PSI, phi, sand_modulus)
            }
            SoilType::Gravel => (0.0, c.max_friction_angle_deg, 1.5 * sand_modulus),
            SoilType::Rock => {
                let su = layer
                    .rock_strength_psi
                    .map_or(c.default_rock_cohesion_psi, |s| s / c.rock_strength_divisor);
                (su, ROCK_FRICTION_ANGLE_DEG, ROCK_MODULUS_FACTOR * su)
            }
        };

        let shear_modulus = layer.shear_modulus.unwrap_or(modulus);

        SoilProperties {
            soil_type: layer.soil_type,
            cohesion_psi: cohesion,
            friction_angle_deg: phi,
            shear_modulus_psi: shear_modulus,
            pore_pressure_psi: pore_pressure(depth, c),
            unit_weight_pcf: c.unit_weight_pcf,
            viscous_resistance_psi: shear_modulus * c.viscous_strain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clay_cohesion_scales_with_hardness() {
        let model = HeuristicSoilModel::default();
        let soft = model.properties(&SoilLayer::new(0.0, 20.0, SoilType::Clay).with_hardness(2.0), 10.0);
        let stiff = model.properties(&SoilLayer::new(0.0, 20.0, SoilType::Clay).with_hardness(6.0), 10.0);
        assert_eq!(soft.cohesion_psi, 4.0);
        assert_eq!(stiff.cohesion_psi, 12.0);
        assert_eq!(stiff.friction_angle_deg, 0.0);
        assert_eq!(stiff.shear_modulus_psi, 1200.0);
    }

    #[test]
    fn test_clay_default_hardness() {
        let props = HeuristicSoilModel::default().properties(&SoilLayer::default_clay(), 0.0);
        assert_eq!(props.cohesion_psi, 6.0);
        assert_eq!(props.pore_pressure_psi, 0.0);
    }

    #[test]
    fn test_sand_friction_angle_capped() {
        let model = HeuristicSoilModel::default();
        let loose = model.properties(&SoilLayer::new(0.0, 20.0, SoilType::Sand).with_hardness(2.0), 10.0);
        let dense = model.properties(&SoilLayer::new(0.0, 20.0, SoilType::Sand).with_hardness(30.0), 10.0);
        assert_eq!(loose.friction_angle_deg, 30.0);
        assert_eq!(dense.friction_angle_deg, 40.0);
        assert_eq!(loose.shear_modulus_psi, 1100.0);
    }

    #[test]
    fn test_rock_strength_and_override() {
        let model = HeuristicSoilModel::default();
        let rock = model.properties(&SoilLayer::new(0.0, 50.0, SoilType::Rock).with_rock_strength(8000.0), 20.0);
        assert_eq!(rock.cohesion_psi, 800.0);
        assert_eq!(rock.shear_modulus_psi, 400_000.0);

        let measured = model.properties(&SoilLayer::new(0.0, 50.0, SoilType::Rock).with_shear_modulus(1000.0), 20.0);
        assert_eq!(measured.cohesion_psi, 500.0);
        assert_eq!(measured.shear_modulus_psi, 1000.0);
        assert!((measured.viscous_resistance_psi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pore_pressure_respects_water_table() {
        let cfg = SoilConfig {
            water_table_depth_ft: 5.0,
            ..SoilConfig::default()
        };
        assert_eq!(pore_pressure(3.0, &cfg), 0.0);
        assert!((pore_pressure(15.0, &cfg) - 4.33).abs() < 1e-9);
    }
}
