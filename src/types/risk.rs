//! Risk classifications shared by the hydraulics and collision engines

use serde::{Deserialize, Serialize};

/// Frac-out risk from comparing allowable and required annular pressure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low = 0,
    High = 1,
    Critical = 2,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Overall proximity state of a bore against all obstacles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProximityLevel {
    #[default]
    Safe = 0,
    Warning = 1,
    Critical = 2,
}

impl std::fmt::Display for ProximityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProximityLevel::Safe => write!(f, "SAFE"),
            ProximityLevel::Warning => write!(f, "WARNING"),
            ProximityLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Low);
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(ProximityLevel::Warning.to_string(), "WARNING");
    }
}
