//! Soil strata from geotechnical reports

use serde::{Deserialize, Serialize};

/// Soil classification of a stratum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SoilType {
    #[default]
    Clay,
    Silt,
    Sand,
    Gravel,
    Rock,
}

impl SoilType {
    /// Cohesive soils carry load through cohesion rather than friction.
    pub const fn is_cohesive(self) -> bool {
        matches!(self, SoilType::Clay | SoilType::Silt)
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoilType::Clay => write!(f, "Clay"),
            SoilType::Silt => write!(f, "Silt"),
            SoilType::Sand => write!(f, "Sand"),
            SoilType::Gravel => write!(f, "Gravel"),
            SoilType::Rock => write!(f, "Rock"),
        }
    }
}

impl std::str::FromStr for SoilType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clay" => Ok(SoilType::Clay),
            "silt" => Ok(SoilType::Silt),
            "sand" => Ok(SoilType::Sand),
            "gravel" => Ok(SoilType::Gravel),
            "rock" => Ok(SoilType::Rock),
            other => Err(format!("unknown soil type '{other}'")),
        }
    }
}

/// A depth-bounded stratum. Depths in feet, `start_depth < end_depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilLayer {
    pub start_depth: f64,
    pub end_depth: f64,
    pub soil_type: SoilType,
    /// Field hardness score, roughly 1 (soft) to 10 (hard)
    #[serde(default)]
    pub hardness: Option<f64>,
    #[serde(default)]
    pub rock_strength_psi: Option<f64>,
    /// psi
    #[serde(default)]
    pub shear_modulus: Option<f64>,
    #[serde(default)]
    pub poisson_ratio: Option<f64>,
}

impl SoilLayer {
    pub fn new(start_depth: f64, end_depth: f64, soil_type: SoilType) -> Self {
        Self {
            start_depth,
            end_depth,
            soil_type,
            hardness: None,
            rock_strength_psi: None,
            shear_modulus: None,
            poisson_ratio: None,
        }
    }

    pub fn with_hardness(mut self, hardness: f64) -> Self {
        self.hardness = Some(hardness);
        self
    }

    pub fn with_rock_strength(mut self, psi: f64) -> Self {
        self.rock_strength_psi = Some(psi);
        self
    }

    pub fn with_shear_modulus(mut self, psi: f64) -> Self {
        self.shear_modulus = Some(psi);
        self
    }

    /// Layer used when no geotechnical data covers the query depth.
    pub fn default_clay() -> Self {
        Self::new(0.0, 100.0, SoilType::Clay)
    }

    /// Inclusive depth range check.
    pub fn contains(&self, depth_ft: f64) -> bool {
        depth_ft >= self.start_depth && depth_ft <= self.end_depth
    }

    /// Depth range is finite and non-empty.
    pub fn is_well_formed(&self) -> bool {
        self.start_depth.is_finite() && self.end_depth.is_finite() && self.start_depth < self.end_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_soil_type_case_insensitive() {
        assert_eq!("SAND".parse::<SoilType>(), Ok(SoilType::Sand));
        assert_eq!(" rock ".parse::<SoilType>(), Ok(SoilType::Rock));
        assert!("peat".parse::<SoilType>().is_err());
    }

    #[test]
    fn test_layer_contains_is_inclusive() {
        let layer = SoilLayer::new(5.0, 15.0, SoilType::Sand);
        assert!(layer.contains(5.0));
        assert!(layer.contains(15.0));
        assert!(!layer.contains(15.1));
    }

    #[test]
    fn test_inverted_layer_is_malformed() {
        assert!(!SoilLayer::new(20.0, 10.0, SoilType::Clay).is_well_formed());
        assert!(SoilLayer::default_clay().is_well_formed());
    }

    #[test]
    fn test_deserialize_layer_record() {
        let json = r#"{"startDepth": 0, "endDepth": 12, "soilType": "Clay", "hardness": 4}"#;
        let layer: SoilLayer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.hardness, Some(4.0));
        assert!(layer.soil_type.is_cohesive());
    }
}
