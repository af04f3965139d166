//! Engine error taxonomy
//!
//! Only configuration errors and invalid input shapes surface here. Recoverable
//! conditions (skipped survey points, soil-layer fallback, planner rod cap) are
//! reported in result fields instead.

use thiserror::Error;

/// Errors returned by the calculation engines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Hole diameter does not exceed pipe diameter, so the annulus has no
    /// cross-section and friction loss would be infinite.
    #[error(
        "degenerate annulus: hole diameter {hole_diameter_in:.2} in must exceed pipe diameter {pipe_diameter_in:.2} in"
    )]
    DegenerateAnnulus {
        hole_diameter_in: f64,
        pipe_diameter_in: f64,
    },

    /// A required collection was empty.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A parameter is outside its physical domain.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl EngineError {
    pub(crate) const fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid(name, value, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(EngineError::invalid(name, value, "must be greater than zero"));
    }
    Ok(value)
}

/// Reject non-finite or negative values.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid(name, value, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid(name, value, "cannot be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("x", 2.0), Ok(2.0));
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn test_require_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("buffer", 0.0), Ok(0.0));
        assert!(require_non_negative("buffer", -0.1).is_err());
        assert!(require_non_negative("buffer", f64::INFINITY).is_err());
    }

    #[test]
    fn test_degenerate_annulus_message() {
        let e = EngineError::DegenerateAnnulus {
            hole_diameter_in: 6.0,
            pipe_diameter_in: 6.0,
        };
        assert!(e.to_string().contains("degenerate annulus"));
    }
}
