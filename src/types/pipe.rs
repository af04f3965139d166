//! Product pipe, drilling fluid and borehole geometry

use serde::{Deserialize, Serialize};

/// Product pipe material.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PipeMaterial {
    #[default]
    #[serde(rename = "HDPE", alias = "hdpe")]
    Hdpe,
    #[serde(rename = "PVC", alias = "pvc")]
    Pvc,
    #[serde(alias = "steel")]
    Steel,
    #[serde(rename = "Ductile Iron", alias = "ductile_iron")]
    DuctileIron,
}

impl PipeMaterial {
    /// Material density (lb/in³).
    pub const fn density_lb_in3(self) -> f64 {
        match self {
            PipeMaterial::Hdpe => 0.034,
            PipeMaterial::Pvc => 0.05,
            PipeMaterial::Steel => 0.284,
            PipeMaterial::DuctileIron => 0.26,
        }
    }

    /// Wall thickness as a fraction of outside diameter.
    ///
    /// HDPE is DR 11, PVC is DR 18, steel is a thin wall.
    pub const fn wall_ratio(self) -> f64 {
        match self {
            PipeMaterial::Hdpe => 1.0 / 11.0,
            PipeMaterial::Pvc => 1.0 / 18.0,
            PipeMaterial::Steel => 0.05,
            PipeMaterial::DuctileIron => 1.0 / 15.0,
        }
    }
}

impl std::fmt::Display for PipeMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipeMaterial::Hdpe => write!(f, "HDPE"),
            PipeMaterial::Pvc => write!(f, "PVC"),
            PipeMaterial::Steel => write!(f, "Steel"),
            PipeMaterial::DuctileIron => write!(f, "Ductile Iron"),
        }
    }
}

impl std::str::FromStr for PipeMaterial {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "hdpe" => Ok(PipeMaterial::Hdpe),
            "pvc" => Ok(PipeMaterial::Pvc),
            "steel" => Ok(PipeMaterial::Steel),
            "ductile iron" | "di" => Ok(PipeMaterial::DuctileIron),
            other => Err(format!("unknown pipe material '{other}'")),
        }
    }
}

/// Product pipe being installed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeSpec {
    pub diameter_inches: f64,
    #[serde(default)]
    pub material: PipeMaterial,
}

impl PipeSpec {
    pub const fn new(diameter_inches: f64, material: PipeMaterial) -> Self {
        Self {
            diameter_inches,
            material,
        }
    }
}

/// Bingham-plastic drilling fluid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidProperties {
    pub density_ppg: f64,
    pub plastic_viscosity_cp: f64,
    #[serde(rename = "yieldPointLb100ft2")]
    pub yield_point_lb_100ft2: f64,
}

impl Default for FluidProperties {
    /// Typical bentonite mud
    fn default() -> Self {
        Self {
            density_ppg: 9.0,
            plastic_viscosity_cp: 15.0,
            yield_point_lb_100ft2: 20.0,
        }
    }
}

/// Borehole state at the point of a hydraulics query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoreholeGeometry {
    pub hole_diameter_in: f64,
    pub pipe_diameter_in: f64,
    /// Length drilled so far (ft)
    pub length_ft: f64,
    /// Vertical depth at the query point (ft)
    pub depth_ft: f64,
}

impl BoreholeGeometry {
    /// Radial gap between hole and pipe diameters (in).
    pub fn clearance_in(&self) -> f64 {
        self.hole_diameter_in - self.pipe_diameter_in
    }

    /// Annulus cross-section (in²).
    pub fn annular_area_sq_in(&self) -> f64 {
        std::f64::consts::FRAC_PI_4 * (self.hole_diameter_in.powi(2) - self.pipe_diameter_in.powi(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_parsing() {
        assert_eq!("Ductile-Iron".parse::<PipeMaterial>(), Ok(PipeMaterial::DuctileIron));
        assert_eq!("hdpe".parse::<PipeMaterial>(), Ok(PipeMaterial::Hdpe));
        assert!("copper".parse::<PipeMaterial>().is_err());
    }

    #[test]
    fn test_material_serde_names() {
        let spec: PipeSpec = serde_json::from_str(r#"{"diameterInches": 8, "material": "Ductile Iron"}"#).unwrap();
        assert_eq!(spec.material, PipeMaterial::DuctileIron);
        let fluid: FluidProperties =
            serde_json::from_str(r#"{"densityPpg": 9.5, "plasticViscosityCp": 12, "yieldPointLb100ft2": 18}"#)
                .unwrap();
        assert_eq!(fluid.yield_point_lb_100ft2, 18.0);
    }

    #[test]
    fn test_annulus_geometry() {
        let geo = BoreholeGeometry {
            hole_diameter_in: 12.0,
            pipe_diameter_in: 8.0,
            length_ft: 100.0,
            depth_ft: 10.0,
        };
        assert_eq!(geo.clearance_in(), 4.0);
        let expected = std::f64::consts::FRAC_PI_4 * (144.0 - 64.0);
        assert!((geo.annular_area_sq_in() - expected).abs() < 1e-9);
    }
}
