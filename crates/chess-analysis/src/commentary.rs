//! One-line commentary for analysed moves.
//!
//! Gains and losses are always stated from the mover's point of view;
//! evaluations are printed White-relative, as everywhere else.

use chess_core::Color;

use crate::quality::{MoveAnalysis, MoveQuality};
use crate::Evaluation;

/// Describe a move, e.g. `Mistake: lost 1.5 pawns; best was Nf3 (+0.40).`
pub fn describe(m: &MoveAnalysis) -> String {
    if m.quality == MoveQuality::Best {
        return format!("Best move ({}).", m.eval_after);
    }

    let best = format!("best was {} ({})", m.best_san, m.best_eval);
    if let Some(swing) = mate_swing(m) {
        return format!("{}: {}; {}.", m.quality, swing, best);
    }

    if m.quality.is_error() {
        format!(
            "{}: lost {:.1} pawns; {}.",
            m.quality,
            f64::from(m.cp_loss) / 100.0,
            best
        )
    } else if m.delta > 0 {
        format!(
            "{}: gained {:.1} pawns; {}.",
            m.quality,
            f64::from(m.delta) / 100.0,
            best
        )
    } else {
        format!("{}: {}.", m.quality, best)
    }
}

/// Phrase for moves that create or throw away a forced mate.
fn mate_swing(m: &MoveAnalysis) -> Option<&'static str> {
    let mated = |eval: Evaluation, side: Color| {
        matches!(eval, Evaluation::Mate { winner, .. } if winner != side)
    };
    let mating = |eval: Evaluation, side: Color| {
        matches!(eval, Evaluation::Mate { winner, .. } if winner == side)
    };

    if mated(m.eval_after, m.side) && !mated(m.eval_before, m.side) {
        Some("allows a forced mate")
    } else if mating(m.eval_before, m.side) && !mating(m.eval_after, m.side) {
        Some("lets a forced mate slip")
    } else {
        None
    }
}
