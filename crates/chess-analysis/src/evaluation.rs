//! Chess position evaluation types.

use std::fmt;

use chess_core::Color;
use uci::Score;

/// Centipawn value assigned to a mate in zero. A mate in N maps to
/// `MATE_SCORE - N`, so shorter mates rank higher.
pub const MATE_SCORE: i32 = 10_000;

/// Represents a chess position evaluation.
///
/// Stored evaluations are always from White's point of view; use
/// [`Evaluation::for_side`] to read one from either player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn evaluation (positive = white advantage)
    Centipawns(i32),
    /// Forced mate for `winner` in `moves` moves (0 = already checkmated)
    Mate { winner: Color, moves: u32 },
}

impl Evaluation {
    /// Convert an engine score, reported from the side to move, into a
    /// White-relative evaluation.
    ///
    /// `mate 0` and negative mate distances mean the side to move is being
    /// mated.
    pub fn from_score(score: Score, side_to_move: Color) -> Self {
        match score {
            Score::Cp(cp) => Evaluation::Centipawns(cp * side_to_move.sign()),
            Score::Mate(n) if n > 0 => Evaluation::Mate {
                winner: side_to_move,
                moves: n.unsigned_abs(),
            },
            Score::Mate(n) => Evaluation::Mate {
                winner: side_to_move.opposite(),
                moves: n.unsigned_abs(),
            },
        }
    }

    /// Evaluation of a checkmated position, won by `winner`.
    pub const fn checkmate(winner: Color) -> Self {
        Evaluation::Mate { winner, moves: 0 }
    }

    /// Signed centipawns from `side`'s point of view. Mates map to
    /// `±(MATE_SCORE - moves)`.
    pub fn for_side(self, side: Color) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp * side.sign(),
            Evaluation::Mate { winner, moves } => {
                let magnitude = MATE_SCORE - moves.min(MATE_SCORE as u32 - 1) as i32;
                if winner == side {
                    magnitude
                } else {
                    -magnitude
                }
            }
        }
    }

    /// White-relative value in pawns, with mates clamped to `±limit`.
    pub fn pawns_clamped(self, limit: f64) -> f64 {
        match self {
            Evaluation::Centipawns(cp) => (cp as f64 / 100.0).clamp(-limit, limit),
            Evaluation::Mate { winner, .. } => limit * winner.sign() as f64,
        }
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::Centipawns(0)
    }
}

impl fmt::Display for Evaluation {
    /// `+0.35`, `-1.20`, `+M3` (White mates in 3), `-M2` (Black mates in 2).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let sign = if *cp < 0 { '-' } else { '+' };
                write!(f, "{}{:.2}", sign, cp.unsigned_abs() as f64 / 100.0)
            }
            Evaluation::Mate { winner, moves } => {
                let sign = match winner {
                    Color::White => '+',
                    Color::Black => '-',
                };
                write!(f, "{}M{}", sign, moves)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_score_flips_for_black_to_move() {
        assert_eq!(
            Evaluation::from_score(Score::Cp(40), Color::White),
            Evaluation::Centipawns(40)
        );
        assert_eq!(
            Evaluation::from_score(Score::Cp(40), Color::Black),
            Evaluation::Centipawns(-40)
        );
    }

    #[test]
    fn from_score_mate_winner() {
        assert_eq!(
            Evaluation::from_score(Score::Mate(3), Color::Black),
            Evaluation::Mate {
                winner: Color::Black,
                moves: 3
            }
        );
        assert_eq!(
            Evaluation::from_score(Score::Mate(-2), Color::Black),
            Evaluation::Mate {
                winner: Color::White,
                moves: 2
            }
        );
        // Side to move is already mated.
        assert_eq!(
            Evaluation::from_score(Score::Mate(0), Color::White),
            Evaluation::checkmate(Color::Black)
        );
    }

    #[test]
    fn for_side_is_antisymmetric() {
        let eval = Evaluation::Centipawns(125);
        assert_eq!(eval.for_side(Color::White), 125);
        assert_eq!(eval.for_side(Color::Black), -125);

        let mate = Evaluation::Mate {
            winner: Color::White,
            moves: 4,
        };
        assert_eq!(mate.for_side(Color::White), MATE_SCORE - 4);
        assert_eq!(mate.for_side(Color::Black), -(MATE_SCORE - 4));
    }

    #[test]
    fn shorter_mates_score_higher() {
        let quick = Evaluation::Mate {
            winner: Color::Black,
            moves: 1,
        };
        let slow = Evaluation::Mate {
            winner: Color::Black,
            moves: 7,
        };
        assert!(quick.for_side(Color::Black) > slow.for_side(Color::Black));
        assert!(slow.for_side(Color::Black) > 5000);
    }

    #[test]
    fn pawns_clamped() {
        assert_eq!(Evaluation::Centipawns(250).pawns_clamped(10.0), 2.5);
        assert_eq!(Evaluation::Centipawns(-4000).pawns_clamped(10.0), -10.0);
        assert_eq!(Evaluation::checkmate(Color::Black).pawns_clamped(10.0), -10.0);
    }

    #[test]
    fn display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Evaluation::Centipawns(0).to_string(), "+0.00");
        assert_eq!(
            Evaluation::Mate {
                winner: Color::Black,
                moves: 2
            }
            .to_string(),
            "-M2"
        );
    }
}
