//! Game Review - grade every move of a chess game with a UCI engine.
//!
//! The binary reads a PGN, replays it through [`chess_analysis::GameAnalyzer`]
//! and presents the result as a console table, a PNG chart, or an
//! interactive terminal replay.
//!
//! # Modules
//!
//! - [`config`] - `review.toml` loading and command-line overrides
//! - [`input`] - PGN from a file or pasted on stdin
//! - [`output`] - per-game artifact directories
//! - [`render`] - table, chart and interactive renderers

pub mod config;
pub mod input;
pub mod output;
pub mod render;
