//! Shared data model for the bore engineering core
//!
//! Every entity here is created fresh from caller-supplied inputs at the start
//! of a calculation and discarded when results are returned:
//! - Survey: raw `{md, inc, azi}` points and computed stations
//! - Obstacle: buried utilities as points or line segments
//! - Soil: depth-bounded strata with strength indicators
//! - Pipe: product pipe, drilling fluid and borehole geometry
//! - Plan: rod-by-rod steering plan

mod survey;
mod obstacle;
mod soil;
mod pipe;
mod plan;
mod risk;

pub use survey::*;
pub use obstacle::*;
pub use soil::*;
pub use pipe::*;
pub use plan::*;
pub use risk::*;
