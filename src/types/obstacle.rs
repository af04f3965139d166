//! Buried obstacle records (utilities, structures)

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Utility / hazard category as labelled by the locate ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleCategory {
    Gas,
    Water,
    Electric,
    Sewer,
    Fiber,
    Telecom,
    Abandoned,
    Structure,
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ObstacleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObstacleCategory::Gas => write!(f, "gas"),
            ObstacleCategory::Water => write!(f, "water"),
            ObstacleCategory::Electric => write!(f, "electric"),
            ObstacleCategory::Sewer => write!(f, "sewer"),
            ObstacleCategory::Fiber => write!(f, "fiber"),
            ObstacleCategory::Telecom => write!(f, "telecom"),
            ObstacleCategory::Abandoned => write!(f, "abandoned"),
            ObstacleCategory::Structure => write!(f, "structure"),
            ObstacleCategory::Other => write!(f, "other"),
        }
    }
}

/// Coordinate in the local frame: `x` = east, `y` = north, `z` = depth (ft, positive down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_point(self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A buried hazard. Without `end` the obstacle is a point (manhole, sonde).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: ObstacleCategory,
    pub start: Coordinate,
    #[serde(default)]
    pub end: Option<Coordinate>,
    /// Nominal outside diameter in inches
    #[serde(default)]
    pub diameter_inches: Option<f64>,
    /// Required minimum clearance in feet
    #[serde(default)]
    pub safety_buffer_feet: Option<f64>,
}

impl Obstacle {
    /// Point obstacle with no diameter or buffer set.
    pub fn point(id: impl Into<String>, start: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category: ObstacleCategory::Other,
            start,
            end: None,
            diameter_inches: None,
            safety_buffer_feet: None,
        }
    }

    /// Line obstacle (pipe or cable run) between two coordinates.
    pub fn line(id: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            end: Some(end),
            ..Self::point(id, start)
        }
    }

    pub fn with_diameter(mut self, inches: f64) -> Self {
        self.diameter_inches = Some(inches);
        self
    }

    pub fn with_safety_buffer(mut self, feet: f64) -> Self {
        self.safety_buffer_feet = Some(feet);
        self
    }

    pub fn with_category(mut self, category: ObstacleCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Radius in feet (diameter given in inches).
    pub fn radius_ft(&self) -> f64 {
        self.diameter_inches.unwrap_or(0.0) / 24.0
    }

    /// Label used in alerts: the name, or the id when no name was recorded.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_collaborator_record() {
        let json = r#"{
            "id": "gas-1",
            "name": "4in gas main",
            "category": "gas",
            "start": {"x": 0.0, "y": 50.0, "z": 6.0},
            "end": {"x": 100.0, "y": 50.0, "z": 6.0},
            "diameterInches": 4.0,
            "safetyBufferFeet": 3.0
        }"#;
        let obs: Obstacle = serde_json::from_str(json).unwrap();
        assert_eq!(obs.category, ObstacleCategory::Gas);
        assert_eq!(obs.end, Some(Coordinate::new(100.0, 50.0, 6.0)));
        assert!((obs.radius_ft() - 4.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_category_maps_to_other() {
        let json = r#"{"id": "x", "category": "steam", "start": {"x": 0, "y": 0, "z": 0}}"#;
        let obs: Obstacle = serde_json::from_str(json).unwrap();
        assert_eq!(obs.category, ObstacleCategory::Other);
        assert_eq!(obs.label(), "x");
        assert_eq!(obs.radius_ft(), 0.0);
    }
}
