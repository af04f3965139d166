//! Command-line front end for the borepath engines.
//!
//! Results are written to stdout as JSON; logs go to stderr.
//!
//! Usage:
//!   bore-calc trajectory --survey shot_log.csv
//!   bore-calc analyze --input bore.json [--survey as_built.xml]
//!   bore-calc plan --entry-angle 12 --target-depth 15 --target-distance 300 --rod-length 10 --max-steer 2

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use borepath::analysis::{BoreAnalysis, BoreAnalysisInput};
use borepath::config::{self, EngineConfig};
use borepath::hydraulics::HeuristicSoilModel;
use borepath::import::import_file;
use borepath::planner::{enrich_plan, plan_rods_with, PlanContext};
use borepath::survey::CorrectionParams;
use borepath::trajectory::Trajectory;
use borepath::types::{PipeMaterial, PipeSpec, RodPlanInput, SoilLayer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "bore-calc")]
#[command(about = "HDD bore trajectory, clearance, pullback and frac-out calculator")]
#[command(version)]
struct CliArgs {
    /// Engine config file (TOML). Falls back to ./bore_config.toml, then defaults.
    #[arg(long, env = "BORE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Pretty-print the JSON result
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute minimum-curvature stations from a survey file (CSV or WITSML)
    Trajectory {
        #[arg(long)]
        survey: PathBuf,

        /// Skip declination / grid correction
        #[arg(long)]
        raw: bool,
    },

    /// Run the full clearance, pullback and frac-out analysis
    Analyze {
        /// Bore description (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Replace the survey in the input with points from this file
        #[arg(long)]
        survey: Option<PathBuf>,
    },

    /// Generate a rod-by-rod plan toward a target
    Plan {
        /// Entry pitch below horizontal (deg)
        #[arg(long, allow_hyphen_values = true)]
        entry_angle: f64,
        #[arg(long, allow_hyphen_values = true)]
        target_depth: f64,
        #[arg(long)]
        target_distance: f64,
        #[arg(long, default_value = "10")]
        rod_length: f64,
        /// Maximum pitch change per rod (deg)
        #[arg(long, default_value = "2")]
        max_steer: f64,
        #[arg(long, default_value = "0")]
        azimuth: f64,

        /// Pipe diameter (in); enables pullback and pressure annotation
        #[arg(long)]
        pipe_diameter: Option<f64>,
        #[arg(long, default_value = "HDPE")]
        material: PipeMaterial,
        /// Soil layers (JSON array)
        #[arg(long)]
        soil_layers: Option<PathBuf>,
    },
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let cfg = match path {
        Some(p) => EngineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load engine config from {}", p.display()))?,
        None => EngineConfig::load(),
    };
    config::init(cfg.clone());
    Ok(cfg)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);
    let cfg = load_config(args.config.as_deref())?;

    match args.command {
        Command::Trajectory { survey, raw } => {
            let points = import_file(&survey).with_context(|| format!("Failed to import {}", survey.display()))?;
            let points = if raw {
                points
            } else {
                CorrectionParams::from_config(&cfg.survey).apply(&points)
            };
            let trajectory = Trajectory::from_points(&points);
            info!(
                stations = trajectory.len(),
                skipped = trajectory.skipped_points(),
                length_ft = trajectory.measured_length(),
                "Trajectory computed"
            );
            print_json(&trajectory, args.pretty)
        }

        Command::Analyze { input, survey } => {
            let mut bore: BoreAnalysisInput = read_json(&input)?;
            if let Some(path) = survey {
                bore.survey = import_file(&path).with_context(|| format!("Failed to import {}", path.display()))?;
            }
            let report = BoreAnalysis::new(cfg).run(&bore).context("Bore analysis failed")?;
            print_json(&report, args.pretty)
        }

        Command::Plan {
            entry_angle,
            target_depth,
            target_distance,
            rod_length,
            max_steer,
            azimuth,
            pipe_diameter,
            material,
            soil_layers,
        } => {
            let request = RodPlanInput {
                entry_angle_deg: entry_angle,
                target_depth_ft: target_depth,
                target_distance_ft: target_distance,
                rod_length_ft: rod_length,
                max_steer_deg_per_rod: max_steer,
                azimuth_deg: azimuth,
            };
            let mut plan = plan_rods_with(&request, &cfg.planner).context("Rod planning failed")?;

            if let Some(diameter) = pipe_diameter {
                let layers: Vec<SoilLayer> = match soil_layers {
                    Some(path) => read_json(&path)?,
                    None => Vec::new(),
                };
                let ctx = PlanContext {
                    pipe: PipeSpec::new(diameter, material),
                    soil_layers: layers,
                    safety_factor: cfg.loads.safety_factor,
                };
                let model = HeuristicSoilModel::new(cfg.soil.clone());
                plan = enrich_plan(&plan, &request, &ctx, &model, &cfg).context("Plan enrichment failed")?;
            }
            print_json(&plan, args.pretty)
        }
    }
}
