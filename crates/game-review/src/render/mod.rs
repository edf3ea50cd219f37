//! Presenting a finished [`GameAnalysis`].
//!
//! - [`TableRenderer`] - move table and per-side counts on a terminal
//! - [`ChartRenderer`] - evaluation-over-time chart as a PNG file
//! - [`InteractiveRenderer`] - step through the game move by move

mod chart;
mod interactive;
mod table;

use chess_analysis::GameAnalysis;
use thiserror::Error;

pub use chart::{ChartRenderer, ChartTemplate};
pub use interactive::{BoardView, InteractiveRenderer, ReplayAction, ReplayState};
pub use table::TableRenderer;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
    #[error("Failed to rasterize chart: {0}")]
    Raster(String),
}

/// Presents an analysis to the user.
pub trait ReportRenderer {
    fn render(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError>;
}
