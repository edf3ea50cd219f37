//! Game analysis with move quality classification.
//!
//! This module provides the [`GameAnalyzer`], which replays a game ply by
//! ply, asks the engine for the best candidates before each move and for an
//! evaluation after it, and labels the played move.

use thiserror::Error;
use tracing::{debug, info};

use chess_core::{Game, GameError, Position};
use uci::Score;

use crate::engine::{CandidateLine, EngineClient, EngineError};
use crate::evaluation::Evaluation;
use crate::quality::{GameAnalysis, MoveAnalysis, MoveQuality, Thresholds, MAX_CP_LOSS};

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error from the analysis engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// Invalid game data was provided.
    #[error("Invalid game data: {0}")]
    InvalidGame(#[from] GameError),
}

/// Configuration for game analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Search depth for every engine request.
    pub depth: u32,
    /// Number of candidate moves requested before each ply.
    pub candidates: usize,
    pub thresholds: Thresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 16,
            candidates: 5,
            thresholds: Thresholds::default(),
        }
    }
}

/// Analyzes chess games to classify move quality.
///
/// The analyzer owns its engine session for its whole lifetime; dropping the
/// analyzer releases the engine.
pub struct GameAnalyzer<E> {
    engine: E,
    config: AnalysisConfig,
}

impl<E: EngineClient> GameAnalyzer<E> {
    /// Bind an engine to the configured search depth.
    pub fn new(mut engine: E, config: AnalysisConfig) -> Self {
        engine.set_depth(config.depth);
        Self { engine, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Analyzes a complete chess game.
    ///
    /// # Errors
    ///
    /// Any engine failure or illegal move aborts the run; no partial analysis
    /// is returned.
    pub fn analyze(&mut self, game: &Game) -> Result<GameAnalysis, AnalyzerError> {
        self.analyze_with_progress(game, |_, _| {})
    }

    /// Like [`analyze`](Self::analyze), calling `progress(current, total)`
    /// before each ply (1-based).
    pub fn analyze_with_progress<F>(
        &mut self,
        game: &Game,
        mut progress: F,
    ) -> Result<GameAnalysis, AnalyzerError>
    where
        F: FnMut(usize, usize),
    {
        self.engine.new_game()?;

        let total = game.len();
        let mut position = game.start_position()?;
        let mut last_eval = Evaluation::default();
        let mut moves = Vec::with_capacity(total);

        for (ply, played) in game.moves().iter().enumerate() {
            progress(ply + 1, total);
            info!("Move {}/{}", ply + 1, total);

            let side = position.side_to_move();
            let fen_before = position.fen();
            let candidates = self
                .engine
                .top_candidates(&fen_before, self.config.candidates)?;
            let best = candidates.first().ok_or_else(|| {
                EngineError::InvalidResponse(format!("No candidate moves for {}", fen_before))
            })?;
            let best_eval = Evaluation::from_score(best.score, side);
            let best_san = position.san_of(&best.uci).map_err(|_| {
                EngineError::InvalidResponse(format!("Illegal best move {}", best.uci))
            })?;
            let (excellent, great) = self.near_best(&candidates, best_eval, &position);

            let next = position.apply(&played.uci)?;
            let eval_after = self.evaluate_after(&next)?;

            let delta = eval_after.for_side(side) - last_eval.for_side(side);
            let loss = -delta;
            let quality = if played.uci == best.uci {
                MoveQuality::Best
            } else if let Some(error) = self.config.thresholds.classify_loss(loss) {
                error
            } else if excellent.contains(&played.uci.as_str()) {
                MoveQuality::Excellent
            } else if great.contains(&played.uci.as_str()) {
                MoveQuality::Great
            } else {
                MoveQuality::Good
            };

            debug!(
                ply,
                san = %played.san,
                best = %best_san,
                delta,
                quality = %quality,
                "classified move"
            );

            moves.push(MoveAnalysis {
                ply,
                move_number: position.fullmove_number(),
                side,
                san: played.san.clone(),
                uci: played.uci.clone(),
                quality,
                eval_before: last_eval,
                eval_after,
                delta,
                cp_loss: loss.clamp(0, MAX_CP_LOSS),
                best_move: best.uci.clone(),
                best_san,
                best_eval,
                fen_before,
                fen_after: next.fen(),
            });

            last_eval = eval_after;
            position = next;
        }

        Ok(GameAnalysis::new(
            game.headers().clone(),
            self.config.depth,
            moves,
        ))
    }

    /// Split candidates into those within the excellent and great margins of
    /// the best one, measured from the mover's point of view. Mating lines
    /// count as excellent.
    fn near_best<'a>(
        &self,
        candidates: &'a [CandidateLine],
        best_eval: Evaluation,
        position: &Position,
    ) -> (Vec<&'a str>, Vec<&'a str>) {
        let side = position.side_to_move();
        let best_cp = best_eval.for_side(side);
        let thresholds = &self.config.thresholds;

        let mut excellent = Vec::new();
        let mut great = Vec::new();
        for candidate in candidates {
            if matches!(candidate.score, Score::Mate(_)) {
                excellent.push(candidate.uci.as_str());
                continue;
            }
            let diff = best_cp - Evaluation::from_score(candidate.score, side).for_side(side);
            if diff < thresholds.excellent {
                excellent.push(candidate.uci.as_str());
            } else if diff < thresholds.great {
                great.push(candidate.uci.as_str());
            }
        }
        (excellent, great)
    }

    /// Evaluation after a move. Checkmate and stalemate are scored from the
    /// board without asking the engine.
    fn evaluate_after(&mut self, position: &Position) -> Result<Evaluation, AnalyzerError> {
        let to_move = position.side_to_move();
        if position.is_checkmate() {
            return Ok(Evaluation::checkmate(to_move.opposite()));
        }
        if position.is_stalemate() {
            return Ok(Evaluation::Centipawns(0));
        }
        let score = self.engine.evaluate(&position.fen())?;
        Ok(Evaluation::from_score(score, to_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine that rates every position equal and prefers the first legal move.
    struct FlatEngine {
        depth: u32,
        new_games: u32,
    }

    impl EngineClient for FlatEngine {
        fn set_depth(&mut self, depth: u32) {
            self.depth = depth;
        }

        fn new_game(&mut self) -> Result<(), EngineError> {
            self.new_games += 1;
            Ok(())
        }

        fn evaluate(&mut self, _fen: &str) -> Result<Score, EngineError> {
            Ok(Score::Cp(0))
        }

        fn top_candidates(
            &mut self,
            fen: &str,
            _n: usize,
        ) -> Result<Vec<CandidateLine>, EngineError> {
            let position = Position::from_fen(fen)
                .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
            Ok(position
                .legal_moves()
                .into_iter()
                .take(1)
                .map(|uci| CandidateLine {
                    rank: 1,
                    uci,
                    score: Score::Cp(0),
                    depth: self.depth,
                })
                .collect())
        }
    }

    #[test]
    fn test_analysis_config_default() {
        let config = AnalysisConfig::default();
        assert_eq!(config.depth, 16);
        assert_eq!(config.candidates, 5);
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn test_new_binds_depth() {
        let config = AnalysisConfig {
            depth: 9,
            ..Default::default()
        };
        let analyzer = GameAnalyzer::new(
            FlatEngine {
                depth: 0,
                new_games: 0,
            },
            config,
        );
        assert_eq!(analyzer.engine().depth, 9);
    }

    #[test]
    fn test_new_game_sent_per_analysis() {
        let game = chess_core::parse_pgn("1. e4 *", 0).unwrap();
        let mut analyzer = GameAnalyzer::new(
            FlatEngine {
                depth: 0,
                new_games: 0,
            },
            AnalysisConfig::default(),
        );
        analyzer.analyze(&game).unwrap();
        analyzer.analyze(&game).unwrap();
        assert_eq!(analyzer.into_engine().new_games, 2);
    }

    #[test]
    fn test_progress_reports_each_ply() {
        let game = chess_core::parse_pgn("1. e4 e5 2. Nf3 *", 0).unwrap();
        let mut analyzer = GameAnalyzer::new(
            FlatEngine {
                depth: 0,
                new_games: 0,
            },
            AnalysisConfig::default(),
        );
        let mut seen = Vec::new();
        analyzer
            .analyze_with_progress(&game, |current, total| seen.push((current, total)))
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_analyzer_error_display() {
        let engine_err = AnalyzerError::Engine(EngineError::Unavailable("stockfish".to_string()));
        let display = format!("{}", engine_err);
        assert!(display.contains("Engine error"));
        assert!(display.contains("stockfish"));

        let invalid_err = AnalyzerError::InvalidGame(GameError::IllegalMove {
            ply: 3,
            san: "Ke3".to_string(),
        });
        let display = format!("{}", invalid_err);
        assert!(display.contains("Invalid game data"));
        assert!(display.contains("Ke3"));
    }
}
