//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::EngineConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for EngineConfig.
///
/// Maintained by hand against the struct hierarchy in engine_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [survey]
        "survey",
        "survey.declination_deg",
        "survey.grid_convergence_deg",
        "survey.interference_offset_deg",
        "survey.apply_grid_correction",
        "survey.interference_tolerance",
        // [collision]
        "collision",
        "collision.borehole_radius_ft",
        "collision.default_warning_ft",
        "collision.point_obstacle_extent_ft",
        // [loads]
        "loads",
        "loads.fluid_density_ppg",
        "loads.fluid_drag_lb_per_ft_per_in",
        "loads.safety_factor",
        // [loads.friction]
        "loads.friction",
        "loads.friction.clay",
        "loads.friction.silt",
        "loads.friction.sand",
        "loads.friction.gravel",
        "loads.friction.rock",
        // [hydraulics]
        "hydraulics",
        "hydraulics.hydrostatic_constant",
        "hydraulics.risk_buffer_psi",
        "hydraulics.viscous_loss_divisor",
        "hydraulics.yield_loss_divisor",
        "hydraulics.hole_to_pipe_ratio",
        // [soil]
        "soil",
        "soil.unit_weight_pcf",
        "soil.water_gradient_psi_per_ft",
        "soil.water_table_depth_ft",
        "soil.clay_cohesion_per_hardness_psi",
        "soil.default_clay_hardness",
        "soil.sand_base_friction_deg",
        "soil.sand_friction_per_hardness_deg",
        "soil.default_sand_hardness",
        "soil.max_friction_angle_deg",
        "soil.rock_strength_divisor",
        "soil.default_rock_cohesion_psi",
        "soil.viscous_strain",
        // [planner]
        "planner",
        "planner.hold_tolerance_deg",
        "planner.max_rods",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails on unknown keys; parse errors surface later from serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

fn require_positive(value: f64, name: &str, errors: &mut Vec<String>) {
    if value <= 0.0 {
        errors.push(format!("{name} = {value:.4} must be > 0 (used as divisor or scale)"));
    }
}

fn require_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
    if value < 0.0 {
        errors.push(format!("{name} = {value:.4} cannot be negative"));
    }
}

fn suspicious(field: &str, message: String) -> ValidationWarning {
    ValidationWarning {
        field: field.to_string(),
        message,
        suggestion: None,
    }
}

/// Validate physical ranges on a parsed EngineConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// be rejected, warnings are suspicious but usable.
pub fn validate_physical_ranges(config: &EngineConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let s = &config.survey;
    if !(s.interference_tolerance > 0.0 && s.interference_tolerance < 1.0) {
        errors.push(format!(
            "survey.interference_tolerance = {:.3} must be between 0 and 1",
            s.interference_tolerance
        ));
    }
    if s.declination_deg.abs() > 30.0 {
        warnings.push(suspicious(
            "survey.declination_deg",
            format!(
                "declination_deg = {:.1} is outside the range seen in the contiguous US (±30°)",
                s.declination_deg
            ),
        ));
    }

    let c = &config.collision;
    require_positive(c.borehole_radius_ft, "collision.borehole_radius_ft", &mut errors);
    require_non_negative(c.default_warning_ft, "collision.default_warning_ft", &mut errors);
    require_non_negative(c.point_obstacle_extent_ft, "collision.point_obstacle_extent_ft", &mut errors);

    let l = &config.loads;
    // Drilling fluids: 6-20 ppg covers water through heavy weighted mud
    if l.fluid_density_ppg < 6.0 || l.fluid_density_ppg > 20.0 {
        errors.push(format!(
            "loads.fluid_density_ppg = {:.1} is outside physical range (6-20 ppg)",
            l.fluid_density_ppg
        ));
    }
    require_positive(l.safety_factor, "loads.safety_factor", &mut errors);
    require_non_negative(l.fluid_drag_lb_per_ft_per_in, "loads.fluid_drag_lb_per_ft_per_in", &mut errors);
    if l.safety_factor > 0.0 && !(1.0..=3.0).contains(&l.safety_factor) {
        warnings.push(suspicious(
            "loads.safety_factor",
            format!(
                "safety_factor = {:.2} is outside typical range (1.0-3.0)",
                l.safety_factor
            ),
        ));
    }
    for (name, mu) in [
        ("loads.friction.clay", l.friction.clay),
        ("loads.friction.silt", l.friction.silt),
        ("loads.friction.sand", l.friction.sand),
        ("loads.friction.gravel", l.friction.gravel),
        ("loads.friction.rock", l.friction.rock),
    ] {
        if !(mu > 0.0 && mu <= 1.5) {
            errors.push(format!("{name} = {mu:.3} is outside physical range (0-1.5)"));
        }
    }

    let h = &config.hydraulics;
    require_positive(h.hydrostatic_constant, "hydraulics.hydrostatic_constant", &mut errors);
    require_positive(h.viscous_loss_divisor, "hydraulics.viscous_loss_divisor", &mut errors);
    require_positive(h.yield_loss_divisor, "hydraulics.yield_loss_divisor", &mut errors);
    if h.hole_to_pipe_ratio <= 1.0 {
        errors.push(format!(
            "hydraulics.hole_to_pipe_ratio = {:.2} must be > 1 (hole must be larger than pipe)",
            h.hole_to_pipe_ratio
        ));
    }

    let soil = &config.soil;
    // Soil bulk unit weight: 60-170 pcf spans organic soils to dense rock
    if soil.unit_weight_pcf < 60.0 || soil.unit_weight_pcf > 170.0 {
        errors.push(format!(
            "soil.unit_weight_pcf = {:.1} is outside physical range (60-170 pcf)",
            soil.unit_weight_pcf
        ));
    }
    require_non_negative(soil.water_gradient_psi_per_ft, "soil.water_gradient_psi_per_ft", &mut errors);
    require_non_negative(soil.water_table_depth_ft, "soil.water_table_depth_ft", &mut errors);
    require_positive(soil.rock_strength_divisor, "soil.rock_strength_divisor", &mut errors);
    require_non_negative(soil.viscous_strain, "soil.viscous_strain", &mut errors);
    if !(0.0..90.0).contains(&soil.max_friction_angle_deg) {
        errors.push(format!(
            "soil.max_friction_angle_deg = {:.1} must be in [0, 90)",
            soil.max_friction_angle_deg
        ));
    }
    if (soil.water_gradient_psi_per_ft - 0.433).abs() > 0.05 {
        warnings.push(suspicious(
            "soil.water_gradient_psi_per_ft",
            format!(
                "water_gradient_psi_per_ft = {:.3} differs from fresh water (0.433 psi/ft)",
                soil.water_gradient_psi_per_ft
            ),
        ));
    }

    let p = &config.planner;
    require_non_negative(p.hold_tolerance_deg, "planner.hold_tolerance_deg", &mut errors);
    if p.max_rods > 10_000 {
        warnings.push(suspicious(
            "planner.max_rods",
            format!("max_rods = {} is unusually high for a single bore", p.max_rods),
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
