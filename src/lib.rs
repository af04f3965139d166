//! Borepath: Directional Drilling Engineering Core
//!
//! Stateless calculation engines for planning and checking horizontal
//! directional drilling (HDD) bores.
//!
//! ## Architecture
//!
//! - **Angle Corrector**: Declination / grid convergence, pitch ↔ inclination
//! - **Trajectory Engine**: Minimum Curvature Method stations and interpolation
//! - **Collision Detector**: Station-to-utility clearance ranking
//! - **Load Engine**: Pullback force with capstan correction at bends
//! - **Hydraulics Engine**: Annular pressure vs. Delft frac-out limit
//! - **Rod Planner**: Greedy rod-by-rod steering toward a target
//!
//! All engines are pure functions over immutable inputs. Tunable constants
//! live in [`config::EngineConfig`].

pub mod config;
pub mod error;
pub mod types;

// Engines
pub mod survey;
pub mod trajectory;
pub mod collision;
pub mod loads;
pub mod hydraulics;
pub mod planner;

// Collaborator surfaces
pub mod import;
pub mod analysis;

// Re-export configuration
pub use config::{ConfigError, EngineConfig};

// Re-export errors
pub use error::EngineError;
pub use import::ImportError;

// Re-export commonly used types
pub use types::{
    BoreholeGeometry, Coordinate, FluidProperties, Obstacle, ObstacleCategory, PipeMaterial, PipeSpec,
    ProximityLevel, RawSurveyPoint, RiskLevel, RodPlan, RodPlanInput, RodPlanStep, RodRecord, SoilLayer,
    SoilType, SteeringAction, SurveyStation,
};

// Re-export engine entry points
pub use collision::{check_collisions, CollisionHit, CollisionReport, HitKind};
pub use hydraulics::{analyze_frac_out, FracOutAnalysis, HeuristicSoilModel, SoilModel};
pub use loads::{detailed_pullback, simplified_pullback, PullbackResult, SoilClassification};
pub use planner::{enrich_plan, plan_rods, PlanContext};
pub use survey::{grid_azimuth, true_azimuth, CorrectionParams};
pub use trajectory::Trajectory;

// Re-export the pipeline facade
pub use analysis::{BoreAnalysis, BoreAnalysisInput, BoreReport};
