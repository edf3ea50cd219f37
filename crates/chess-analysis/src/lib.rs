//! Chess game review with UCI engine integration.
//!
//! This crate replays a game move by move against an analysis engine and
//! classifies each move's quality.
//!
//! # Overview
//!
//! - [`Evaluation`] - Position evaluation (centipawn or mate score), White-relative
//! - [`MoveQuality`] - Classification of move quality (Blunder through Best)
//! - [`EngineClient`] - Blocking request/response interface to an engine
//! - [`AnalysisEngine`] - Wrapper for UCI analysis engines like Stockfish
//! - [`GameAnalyzer`] - Analyzes complete games with move quality classification
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{AnalysisConfig, AnalysisEngine, EngineOptions, GameAnalyzer};
//!
//! let game = chess_core::parse_pgn(&text, 0)?;
//! let engine = AnalysisEngine::new(&EngineOptions::default())?;
//! let mut analyzer = GameAnalyzer::new(engine, AnalysisConfig::default());
//! let analysis = analyzer.analyze(&game)?;
//! println!("White accuracy: {:.1}%", analysis.white_stats.accuracy_percent);
//! ```

pub mod analyzer;
pub mod commentary;
pub mod engine;
pub mod evaluation;
pub mod quality;

pub use analyzer::{AnalysisConfig, AnalyzerError, GameAnalyzer};
pub use engine::{AnalysisEngine, CandidateLine, EngineClient, EngineError, EngineOptions};
pub use evaluation::{Evaluation, MATE_SCORE};
pub use quality::{GameAnalysis, MoveAnalysis, MoveQuality, PlayerStats, Thresholds};
