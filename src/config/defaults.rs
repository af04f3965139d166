//! Industry constants shared across engines.
//!
//! Unit conversions and empirical factors that are not worth exposing as
//! configuration. Grouped by subsystem for easy discovery.

// ============================================================================
// Trajectory
// ============================================================================

/// Dogleg (radians) below which the ratio factor is taken as exactly 1.
pub const STRAIGHT_DOGLEG_RAD: f64 = 1e-4;

/// Length basis for dogleg severity (degrees per 100 ft).
pub const DLS_COURSE_LENGTH_FT: f64 = 100.0;

// ============================================================================
// Unit Conversions
// ============================================================================

/// Cubic inches per US gallon.
pub const CUBIC_INCHES_PER_GALLON: f64 = 231.0;

/// US gallons per cubic foot.
pub const GALLONS_PER_CUBIC_FOOT: f64 = 7.48;

pub const SQUARE_INCHES_PER_SQUARE_FOOT: f64 = 144.0;

pub const INCHES_PER_FOOT: f64 = 12.0;

// ============================================================================
// Hydraulics
// ============================================================================

/// Friction angle assumed for rock in the cavity-expansion model (deg).
pub const ROCK_FRICTION_ANGLE_DEG: f64 = 35.0;

/// Residual cohesion used for clean sand (psi).
pub const SAND_COHESION_PSI: f64 = 0.1;

/// Shear modulus scale for clay: G = factor × cohesion.
pub const CLAY_MODULUS_FACTOR: f64 = 100.0;

/// Shear modulus scale for rock: G = factor × cohesion.
pub const ROCK_MODULUS_FACTOR: f64 = 500.0;

/// Sand shear modulus at the surface (psi) and gain per foot of depth.
pub const SAND_MODULUS_BASE_PSI: f64 = 1000.0;
pub const SAND_MODULUS_PER_FT: f64 = 10.0;

// ============================================================================
// Planner
// ============================================================================

/// Converts a DLS limit (deg/100ft) into a bend radius: R = 18000 / (π · DLS).
pub const BEND_RADIUS_NUMERATOR: f64 = 18_000.0;
