//! Engine Configuration - empirical constants as operator-tunable TOML values
//!
//! Every constant the engines use is a field in this module. Each struct
//! implements `Default` with the field-proven values, so a missing config
//! file reproduces the built-in behavior exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::SoilType;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the engineering core.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$BORE_CONFIG` env var
/// 2. `./bore_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Azimuth reference corrections
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Obstacle proximity thresholds
    #[serde(default)]
    pub collision: CollisionConfig,

    /// Pullback estimation constants
    #[serde(default)]
    pub loads: LoadsConfig,

    /// Annular pressure constants
    #[serde(default)]
    pub hydraulics: HydraulicsConfig,

    /// Soil property heuristics
    #[serde(default)]
    pub soil: SoilConfig,

    /// Rod planner limits
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BORE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "bore_config.toml";

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BORE_CONFIG` environment variable
    /// 2. `./bore_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from BORE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from BORE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "BORE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./bore_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./bore_config.toml, using defaults");
                }
            }
        }

        info!("No bore_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Engine config saved");
        Ok(())
    }

    /// Validate all sections for internal consistency.
    ///
    /// Rules:
    /// - Values used as divisors must be > 0
    /// - Friction coefficients must follow the cohesive < granular < rock ordering
    /// - No NaN or Inf anywhere
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.loads.friction;
        Self::check_escalation(f.clay, f.sand, "loads.friction.clay/sand", &mut errors);
        Self::check_escalation(f.sand, f.rock, "loads.friction.sand/rock", &mut errors);

        if self.hydraulics.risk_buffer_psi < 0.0 {
            errors.push(format!(
                "hydraulics.risk_buffer_psi = {:.2} cannot be negative",
                self.hydraulics.risk_buffer_psi
            ));
        }
        if self.planner.max_rods == 0 {
            errors.push("planner.max_rods must be at least 1".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if let Ok(ref s) = toml::to_string(self) {
            if s.contains("nan") || s.contains("inf") {
                errors.push(
                    "Config contains NaN or Inf values, all constants must be finite numbers"
                        .to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(lower: f64, upper: f64, name: &str, errors: &mut Vec<String>) {
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got {lower}, {upper})"
            ));
            return;
        }
        if upper < lower {
            errors.push(format!("{name}: {upper:.3} must be >= {lower:.3}"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Survey
// ============================================================================

/// Azimuth reference corrections applied before trajectory integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Magnetic declination, degrees, positive East
    #[serde(default)]
    pub declination_deg: f64,

    /// Grid convergence, degrees
    #[serde(default)]
    pub grid_convergence_deg: f64,

    /// Known local interference offset, degrees
    #[serde(default)]
    pub interference_offset_deg: f64,

    /// Use grid north instead of true north
    #[serde(default)]
    pub apply_grid_correction: bool,

    /// Fractional field deviation tolerated before interference is flagged
    #[serde(default = "default_interference_tolerance")]
    pub interference_tolerance: f64,
}

fn default_interference_tolerance() -> f64 { 0.05 }

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            declination_deg: 0.0,
            grid_convergence_deg: 0.0,
            interference_offset_deg: 0.0,
            apply_grid_correction: false,
            interference_tolerance: default_interference_tolerance(),
        }
    }
}

// ============================================================================
// Collision
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Nominal borehole radius (ft)
    #[serde(default = "default_borehole_radius")]
    pub borehole_radius_ft: f64,

    /// Warning distance when an obstacle has no safety buffer (ft)
    #[serde(default = "default_warning_ft")]
    pub default_warning_ft: f64,

    /// Vertical extent given to point obstacles (ft, rising toward surface)
    #[serde(default = "default_point_extent")]
    pub point_obstacle_extent_ft: f64,
}

fn default_borehole_radius() -> f64 { 0.5 }
fn default_warning_ft() -> f64 { 10.0 }
fn default_point_extent() -> f64 { 1.0 }

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            borehole_radius_ft: default_borehole_radius(),
            default_warning_ft: default_warning_ft(),
            point_obstacle_extent_ft: default_point_extent(),
        }
    }
}

// ============================================================================
// Loads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadsConfig {
    /// Drilling fluid density used for buoyancy (ppg)
    #[serde(default = "default_load_fluid_density")]
    pub fluid_density_ppg: f64,

    /// Hydrokinetic drag per foot per inch of pipe diameter (lb)
    #[serde(default = "default_fluid_drag")]
    pub fluid_drag_lb_per_ft_per_in: f64,

    /// Default multiplier on computed tension
    #[serde(default = "default_safety_factor")]
    pub safety_factor: f64,

    #[serde(default)]
    pub friction: FrictionTable,
}

fn default_load_fluid_density() -> f64 { 9.0 }
fn default_fluid_drag() -> f64 { 0.5 }
fn default_safety_factor() -> f64 { 1.5 }

impl Default for LoadsConfig {
    fn default() -> Self {
        Self {
            fluid_density_ppg: default_load_fluid_density(),
            fluid_drag_lb_per_ft_per_in: default_fluid_drag(),
            safety_factor: default_safety_factor(),
            friction: FrictionTable::default(),
        }
    }
}

/// Pipe-to-borehole friction coefficient per soil type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionTable {
    #[serde(default = "default_friction_clay")]
    pub clay: f64,
    #[serde(default = "default_friction_silt")]
    pub silt: f64,
    #[serde(default = "default_friction_sand")]
    pub sand: f64,
    #[serde(default = "default_friction_gravel")]
    pub gravel: f64,
    #[serde(default = "default_friction_rock")]
    pub rock: f64,
}

fn default_friction_clay() -> f64 { 0.30 }
fn default_friction_silt() -> f64 { 0.35 }
fn default_friction_sand() -> f64 { 0.50 }
fn default_friction_gravel() -> f64 { 0.55 }
fn default_friction_rock() -> f64 { 0.60 }

impl Default for FrictionTable {
    fn default() -> Self {
        Self {
            clay: default_friction_clay(),
            silt: default_friction_silt(),
            sand: default_friction_sand(),
            gravel: default_friction_gravel(),
            rock: default_friction_rock(),
        }
    }
}

impl FrictionTable {
    pub const fn for_soil(&self, soil: SoilType) -> f64 {
        match soil {
            SoilType::Clay => self.clay,
            SoilType::Silt => self.silt,
            SoilType::Sand => self.sand,
            SoilType::Gravel => self.gravel,
            SoilType::Rock => self.rock,
        }
    }
}

// ============================================================================
// Hydraulics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicsConfig {
    /// psi per ft per ppg
    #[serde(default = "default_hydrostatic_constant")]
    pub hydrostatic_constant: f64,

    /// Margin below which a positive safety margin is still HIGH risk (psi)
    #[serde(default = "default_risk_buffer")]
    pub risk_buffer_psi: f64,

    /// Bingham viscous-term divisor
    #[serde(default = "default_viscous_divisor")]
    pub viscous_loss_divisor: f64,

    /// Bingham yield-term divisor
    #[serde(default = "default_yield_divisor")]
    pub yield_loss_divisor: f64,

    /// Reamed hole diameter as a multiple of pipe diameter when not given
    #[serde(default = "default_hole_to_pipe_ratio")]
    pub hole_to_pipe_ratio: f64,
}

fn default_hydrostatic_constant() -> f64 { 0.052 }
fn default_risk_buffer() -> f64 { 10.0 }
fn default_viscous_divisor() -> f64 { 1000.0 }
fn default_yield_divisor() -> f64 { 200.0 }
fn default_hole_to_pipe_ratio() -> f64 { 1.5 }

impl Default for HydraulicsConfig {
    fn default() -> Self {
        Self {
            hydrostatic_constant: default_hydrostatic_constant(),
            risk_buffer_psi: default_risk_buffer(),
            viscous_loss_divisor: default_viscous_divisor(),
            yield_loss_divisor: default_yield_divisor(),
            hole_to_pipe_ratio: default_hole_to_pipe_ratio(),
        }
    }
}

// ============================================================================
// Soil
// ============================================================================

/// Calibration of the hardness-to-strength lookup used by the heuristic soil model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilConfig {
    /// Bulk unit weight of overburden (pcf)
    #[serde(default = "default_unit_weight")]
    pub unit_weight_pcf: f64,

    /// Pore pressure gradient below the water table (psi/ft)
    #[serde(default = "default_water_gradient")]
    pub water_gradient_psi_per_ft: f64,

    #[serde(default)]
    pub water_table_depth_ft: f64,

    /// Clay cohesion per hardness point (psi)
    #[serde(default = "default_clay_cohesion_per_hardness")]
    pub clay_cohesion_per_hardness_psi: f64,

    #[serde(default = "default_clay_hardness")]
    pub default_clay_hardness: f64,

    #[serde(default = "default_sand_base_friction")]
    pub sand_base_friction_deg: f64,

    #[serde(default = "default_sand_friction_per_hardness")]
    pub sand_friction_per_hardness_deg: f64,

    #[serde(default = "default_sand_hardness")]
    pub default_sand_hardness: f64,

    /// Friction angle cap for granular soils (deg)
    #[serde(default = "default_max_friction_angle")]
    pub max_friction_angle_deg: f64,

    /// Rock cohesion = strength / divisor
    #[serde(default = "default_rock_strength_divisor")]
    pub rock_strength_divisor: f64,

    #[serde(default = "default_rock_cohesion")]
    pub default_rock_cohesion_psi: f64,

    /// Strain applied to the shear modulus for the viscous resistance term
    #[serde(default = "default_viscous_strain")]
    pub viscous_strain: f64,
}

fn default_unit_weight() -> f64 { 110.0 }
fn default_water_gradient() -> f64 { 0.433 }
fn default_clay_cohesion_per_hardness() -> f64 { 2.0 }
fn default_clay_hardness() -> f64 { 3.0 }
fn default_sand_base_friction() -> f64 { 28.0 }
fn default_sand_friction_per_hardness() -> f64 { 1.0 }
fn default_sand_hardness() -> f64 { 5.0 }
fn default_max_friction_angle() -> f64 { 40.0 }
fn default_rock_strength_divisor() -> f64 { 10.0 }
fn default_rock_cohesion() -> f64 { 500.0 }
fn default_viscous_strain() -> f64 { 0.001 }

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            unit_weight_pcf: default_unit_weight(),
            water_gradient_psi_per_ft: default_water_gradient(),
            water_table_depth_ft: 0.0,
            clay_cohesion_per_hardness_psi: default_clay_cohesion_per_hardness(),
            default_clay_hardness: default_clay_hardness(),
            sand_base_friction_deg: default_sand_base_friction(),
            sand_friction_per_hardness_deg: default_sand_friction_per_hardness(),
            default_sand_hardness: default_sand_hardness(),
            max_friction_angle_deg: default_max_friction_angle(),
            rock_strength_divisor: default_rock_strength_divisor(),
            default_rock_cohesion_psi: default_rock_cohesion(),
            viscous_strain: default_viscous_strain(),
        }
    }
}

// ============================================================================
// Planner
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Pitch error below which the rod is held (deg)
    #[serde(default = "default_hold_tolerance")]
    pub hold_tolerance_deg: f64,

    /// Rod cap guaranteeing termination
    #[serde(default = "default_max_rods")]
    pub max_rods: u32,
}

fn default_hold_tolerance() -> f64 { 0.1 }
fn default_max_rods() -> u32 { 1000 }

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            hold_tolerance_deg: default_hold_tolerance(),
            max_rods: default_max_rods(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: EngineConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.collision.borehole_radius_ft, 0.5);
        assert_eq!(config.loads.friction.rock, 0.60);
        assert_eq!(config.planner.max_rods, 1000);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[loads]
safety_factor = 2.0

[loads.friction]
sand = 0.45
"#;
        let config = EngineConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.loads.safety_factor, 2.0);
        assert_eq!(config.loads.friction.sand, 0.45);
        assert_eq!(config.loads.friction.clay, 0.30);
        assert_eq!(config.loads.fluid_density_ppg, 9.0);
    }

    #[test]
    fn test_validation_catches_inverted_friction() {
        let mut config = EngineConfig::default();
        config.loads.friction.clay = 0.7;
        let result = config.validate();
        assert!(result.is_err(), "Clay friction above sand should fail validation");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("clay/sand")));
        }
    }

    #[test]
    fn test_validation_catches_nan() {
        let mut config = EngineConfig::default();
        config.soil.unit_weight_pcf = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rod_cap_rejected() {
        let mut config = EngineConfig::default();
        config.planner.max_rods = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = EngineConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        assert!(toml_str.contains("[loads.friction]"), "Missing friction section");
        assert!(toml_str.contains("[planner]"), "Missing planner section");
        let roundtripped: EngineConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_friction_lookup_by_soil() {
        let table = FrictionTable::default();
        assert_eq!(table.for_soil(SoilType::Clay), 0.30);
        assert_eq!(table.for_soil(SoilType::Gravel), 0.55);
    }
}
