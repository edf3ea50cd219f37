//! Move quality classification and game analysis.

use std::fmt;

use chess_core::{Color, GameHeaders};
use serde::{Deserialize, Serialize};

use crate::Evaluation;

/// Upper bound for a single move's centipawn loss when averaging, so one
/// missed mate does not swamp the rest of the game.
pub const MAX_CP_LOSS: i32 = 1000;

/// Classification of move quality, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveQuality {
    /// Blunder (major centipawn loss)
    Blunder,
    /// Mistake (significant centipawn loss)
    Mistake,
    /// Inaccuracy (noticeable centipawn loss)
    Inaccuracy,
    /// Sound move outside the engine's closest alternatives
    Good,
    /// Within the great margin of the engine's best move
    Great,
    /// Within the excellent margin of the engine's best move, or a mating line
    Excellent,
    /// The engine's top choice
    Best,
}

impl MoveQuality {
    /// Every label, worst first.
    pub const ALL: [MoveQuality; 7] = [
        MoveQuality::Blunder,
        MoveQuality::Mistake,
        MoveQuality::Inaccuracy,
        MoveQuality::Good,
        MoveQuality::Great,
        MoveQuality::Excellent,
        MoveQuality::Best,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MoveQuality::Blunder => "Blunder",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Inaccuracy => "Inaccuracy",
            MoveQuality::Good => "Good",
            MoveQuality::Great => "Great",
            MoveQuality::Excellent => "Excellent",
            MoveQuality::Best => "Best",
        }
    }

    /// PGN-style suffix (`??`, `?`, `?!`, `!`), empty for unremarkable moves.
    pub const fn annotation(self) -> &'static str {
        match self {
            MoveQuality::Blunder => "??",
            MoveQuality::Mistake => "?",
            MoveQuality::Inaccuracy => "?!",
            MoveQuality::Great => "!",
            MoveQuality::Good | MoveQuality::Excellent | MoveQuality::Best => "",
        }
    }

    /// Blunders, mistakes and inaccuracies.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            MoveQuality::Blunder | MoveQuality::Mistake | MoveQuality::Inaccuracy
        )
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Centipawn thresholds used by the classifier.
///
/// Loss thresholds are exclusive: a loss of exactly `blunder` is a mistake.
/// Candidate margins are exclusive too: a candidate `excellent` centipawns
/// behind the best move is only great.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub blunder: i32,
    pub mistake: i32,
    pub inaccuracy: i32,
    pub excellent: i32,
    pub great: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            blunder: 300,
            mistake: 100,
            inaccuracy: 50,
            excellent: 10,
            great: 25,
        }
    }
}

impl Thresholds {
    /// Label for a centipawn loss, if it crosses any error threshold.
    pub fn classify_loss(&self, loss: i32) -> Option<MoveQuality> {
        if loss > self.blunder {
            Some(MoveQuality::Blunder)
        } else if loss > self.mistake {
            Some(MoveQuality::Mistake)
        } else if loss > self.inaccuracy {
            Some(MoveQuality::Inaccuracy)
        } else {
            None
        }
    }
}

/// Analysis result for a single move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveAnalysis {
    /// 0-based ply index
    pub ply: usize,
    /// Full-move number the move was played on
    pub move_number: u32,
    /// Side that played the move
    pub side: Color,
    /// The move that was played (SAN)
    pub san: String,
    /// The move that was played (UCI)
    pub uci: String,
    /// Quality classification
    pub quality: MoveQuality,
    /// Evaluation before the move (White's point of view)
    pub eval_before: Evaluation,
    /// Evaluation after the move (White's point of view)
    pub eval_after: Evaluation,
    /// `after - before` from the mover's point of view; negative is a loss
    pub delta: i32,
    /// Centipawn loss, clamped to `0..=MAX_CP_LOSS`
    pub cp_loss: i32,
    /// The engine's top candidate (UCI)
    pub best_move: String,
    /// The engine's top candidate (SAN)
    pub best_san: String,
    /// Evaluation of the top candidate (White's point of view)
    pub best_eval: Evaluation,
    pub fen_before: String,
    pub fen_after: String,
}

impl MoveAnalysis {
    /// Move number and SAN, e.g. `12. Nf3` or `12... Nf6`.
    pub fn notation(&self) -> String {
        match self.side {
            Color::White => format!("{}. {}", self.move_number, self.san),
            Color::Black => format!("{}... {}", self.move_number, self.san),
        }
    }

    pub fn is_best(&self) -> bool {
        self.quality == MoveQuality::Best
    }
}

/// Statistics for a player's performance in a game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    /// Total moves analyzed
    pub total_moves: u32,
    /// Number of best moves
    pub best_moves: u32,
    /// Number of excellent moves
    pub excellent_moves: u32,
    /// Number of great moves
    pub great_moves: u32,
    /// Number of good moves
    pub good_moves: u32,
    /// Number of inaccuracies
    pub inaccuracies: u32,
    /// Number of mistakes
    pub mistakes: u32,
    /// Number of blunders
    pub blunders: u32,
    /// Average centipawn loss
    pub avg_cp_loss: f64,
    /// Accuracy percentage (0-100)
    pub accuracy_percent: f64,
}

impl PlayerStats {
    /// Tally the given moves. Callers pass one side's moves only.
    pub fn from_moves<'a, I>(moves: I) -> Self
    where
        I: IntoIterator<Item = &'a MoveAnalysis>,
    {
        let mut stats = PlayerStats::default();
        let mut total_loss: i64 = 0;

        for m in moves {
            stats.total_moves += 1;
            *stats.bucket_mut(m.quality) += 1;
            total_loss += i64::from(m.cp_loss);
        }

        if stats.total_moves > 0 {
            stats.avg_cp_loss = total_loss as f64 / f64::from(stats.total_moves);
            stats.accuracy_percent = 100.0 * (1.0 / (1.0 + stats.avg_cp_loss / 100.0)).sqrt();
        }
        stats
    }

    /// Number of moves with the given label.
    pub fn count(&self, quality: MoveQuality) -> u32 {
        match quality {
            MoveQuality::Blunder => self.blunders,
            MoveQuality::Mistake => self.mistakes,
            MoveQuality::Inaccuracy => self.inaccuracies,
            MoveQuality::Good => self.good_moves,
            MoveQuality::Great => self.great_moves,
            MoveQuality::Excellent => self.excellent_moves,
            MoveQuality::Best => self.best_moves,
        }
    }

    fn bucket_mut(&mut self, quality: MoveQuality) -> &mut u32 {
        match quality {
            MoveQuality::Blunder => &mut self.blunders,
            MoveQuality::Mistake => &mut self.mistakes,
            MoveQuality::Inaccuracy => &mut self.inaccuracies,
            MoveQuality::Good => &mut self.good_moves,
            MoveQuality::Great => &mut self.great_moves,
            MoveQuality::Excellent => &mut self.excellent_moves,
            MoveQuality::Best => &mut self.best_moves,
        }
    }
}

/// Complete analysis of a chess game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameAnalysis {
    /// Headers of the analyzed game
    pub headers: GameHeaders,
    /// Search depth used
    pub depth: u32,
    /// Analysis of each move, in ply order
    pub moves: Vec<MoveAnalysis>,
    /// Statistics for white
    pub white_stats: PlayerStats,
    /// Statistics for black
    pub black_stats: PlayerStats,
}

impl GameAnalysis {
    /// Assemble an analysis and derive per-side statistics from the moves.
    pub fn new(headers: GameHeaders, depth: u32, moves: Vec<MoveAnalysis>) -> Self {
        let white_stats = PlayerStats::from_moves(moves.iter().filter(|m| m.side == Color::White));
        let black_stats = PlayerStats::from_moves(moves.iter().filter(|m| m.side == Color::Black));
        Self {
            headers,
            depth,
            moves,
            white_stats,
            black_stats,
        }
    }

    pub fn stats(&self, side: Color) -> &PlayerStats {
        match side {
            Color::White => &self.white_stats,
            Color::Black => &self.black_stats,
        }
    }

    /// Moves with the given label, in ply order.
    pub fn critical_moves(&self, quality: MoveQuality) -> Vec<&MoveAnalysis> {
        self.moves.iter().filter(|m| m.quality == quality).collect()
    }

    /// White-relative evaluation at every ply boundary: the evaluation before
    /// the first move followed by the evaluation after each move.
    pub fn evaluation_series(&self) -> Vec<Evaluation> {
        let start = self
            .moves
            .first()
            .map(|m| m.eval_before)
            .unwrap_or_default();
        std::iter::once(start)
            .chain(self.moves.iter().map(|m| m.eval_after))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysed(ply: usize, quality: MoveQuality, cp_loss: i32) -> MoveAnalysis {
        MoveAnalysis {
            ply,
            move_number: (ply / 2 + 1) as u32,
            side: Color::from_ply(ply),
            san: "e4".to_string(),
            uci: "e2e4".to_string(),
            quality,
            eval_before: Evaluation::Centipawns(0),
            eval_after: Evaluation::Centipawns(ply as i32 * 10),
            delta: -cp_loss,
            cp_loss,
            best_move: "e2e4".to_string(),
            best_san: "e4".to_string(),
            best_eval: Evaluation::Centipawns(0),
            fen_before: String::new(),
            fen_after: String::new(),
        }
    }

    #[test]
    fn quality_orders_by_severity() {
        assert!(MoveQuality::Blunder < MoveQuality::Mistake);
        assert!(MoveQuality::Inaccuracy < MoveQuality::Good);
        assert!(MoveQuality::Excellent < MoveQuality::Best);
        let mut sorted = MoveQuality::ALL;
        sorted.sort();
        assert_eq!(sorted, MoveQuality::ALL);
    }

    #[test]
    fn annotations() {
        assert_eq!(MoveQuality::Blunder.annotation(), "??");
        assert_eq!(MoveQuality::Mistake.annotation(), "?");
        assert_eq!(MoveQuality::Inaccuracy.annotation(), "?!");
        assert_eq!(MoveQuality::Great.annotation(), "!");
        assert_eq!(MoveQuality::Best.annotation(), "");
    }

    #[test]
    fn loss_thresholds_are_exclusive() {
        let t = Thresholds::default();
        assert_eq!(t.classify_loss(310), Some(MoveQuality::Blunder));
        assert_eq!(t.classify_loss(300), Some(MoveQuality::Mistake));
        assert_eq!(t.classify_loss(101), Some(MoveQuality::Mistake));
        assert_eq!(t.classify_loss(100), Some(MoveQuality::Inaccuracy));
        assert_eq!(t.classify_loss(51), Some(MoveQuality::Inaccuracy));
        assert_eq!(t.classify_loss(50), None);
        assert_eq!(t.classify_loss(-200), None);
    }

    #[test]
    fn thresholds_deserialize_partial() {
        let t: Thresholds = toml::from_str("blunder = 250").unwrap();
        assert_eq!(t.blunder, 250);
        assert_eq!(t.mistake, 100);
        assert_eq!(t.great, 25);
    }

    #[test]
    fn player_stats_counts_and_accuracy() {
        let moves = vec![
            analysed(0, MoveQuality::Best, 0),
            analysed(2, MoveQuality::Blunder, 400),
            analysed(4, MoveQuality::Good, 20),
        ];
        let stats = PlayerStats::from_moves(&moves);

        assert_eq!(stats.total_moves, 3);
        assert_eq!(stats.count(MoveQuality::Best), 1);
        assert_eq!(stats.count(MoveQuality::Blunder), 1);
        assert_eq!(stats.count(MoveQuality::Good), 1);
        assert_eq!(stats.count(MoveQuality::Mistake), 0);
        assert!((stats.avg_cp_loss - 140.0).abs() < 1e-9);
        assert!(stats.accuracy_percent > 0.0 && stats.accuracy_percent < 100.0);
    }

    #[test]
    fn perfect_play_is_full_accuracy() {
        let moves = vec![analysed(0, MoveQuality::Best, 0)];
        let stats = PlayerStats::from_moves(&moves);
        assert!((stats.accuracy_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_stats() {
        let stats = PlayerStats::from_moves(std::iter::empty::<&MoveAnalysis>());
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn game_analysis_splits_sides() {
        let moves = vec![
            analysed(0, MoveQuality::Best, 0),
            analysed(1, MoveQuality::Mistake, 150),
            analysed(2, MoveQuality::Great, 5),
        ];
        let analysis = GameAnalysis::new(GameHeaders::default(), 12, moves);

        assert_eq!(analysis.stats(Color::White).total_moves, 2);
        assert_eq!(analysis.stats(Color::Black).mistakes, 1);
        assert_eq!(analysis.critical_moves(MoveQuality::Mistake).len(), 1);
        assert_eq!(analysis.evaluation_series().len(), 4);
    }

    #[test]
    fn notation() {
        assert_eq!(analysed(0, MoveQuality::Best, 0).notation(), "1. e4");
        assert_eq!(analysed(23, MoveQuality::Best, 0).notation(), "12... e4");
    }
}
