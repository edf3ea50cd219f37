//! Console report: move table, per-side counts and critical positions.

use std::io::Write;

use chess_analysis::{commentary, GameAnalysis, MoveAnalysis, MoveQuality};
use chess_core::Color;
use crossterm::style::{Color as TermColor, Stylize};

use super::{RenderError, ReportRenderer};

const MOVE_WIDTH: usize = 6;
const CELL_WIDTH: usize = 24;
const TYPE_WIDTH: usize = 12;
const COUNT_WIDTH: usize = 12;

/// Writes the review as plain-text tables, optionally with ANSI colours.
pub struct TableRenderer<W> {
    out: W,
    color: bool,
    verbose: bool,
    player: Option<Color>,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: true,
            verbose: false,
            player: None,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Adds per-move commentary after the tables.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Highlights one side's column.
    pub fn player(mut self, player: Option<Color>) -> Self {
        self.player = player;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: String, color: Option<TermColor>) -> String {
        match color {
            Some(color) if self.color => text.with(color).to_string(),
            _ => text,
        }
    }

    fn column_title(&self, side: Color, width: usize) -> String {
        let name = match side {
            Color::White => "WHITE",
            Color::Black => "BLACK",
        };
        if self.player == Some(side) {
            let padded = format!("{:<width$}", format!("{} (you)", name), width = width);
            if self.color {
                padded.bold().to_string()
            } else {
                padded
            }
        } else {
            format!("{:<width$}", name, width = width)
        }
    }

    fn move_cell(&self, m: &MoveAnalysis) -> String {
        let text = format!("{}{} ({})", m.san, m.quality.annotation(), m.quality);
        self.paint(
            format!("{:<width$}", text, width = CELL_WIDTH),
            quality_color(m.quality),
        )
    }

    fn write_moves(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        writeln!(
            self.out,
            "{:<mw$}{}{}",
            "Move",
            self.column_title(Color::White, CELL_WIDTH),
            self.column_title(Color::Black, CELL_WIDTH).trim_end(),
            mw = MOVE_WIDTH
        )?;
        writeln!(
            self.out,
            "{:<mw$}{:<cw$}{}",
            "----",
            "-".repeat(CELL_WIDTH - 2),
            "-".repeat(CELL_WIDTH - 2),
            mw = MOVE_WIDTH,
            cw = CELL_WIDTH
        )?;

        let mut rows = move_rows(&analysis.moves);
        let result = analysis.headers.result.as_str();
        if !result.is_empty() && result != "*" {
            match rows.last_mut() {
                Some(row) if row.black.is_none() && row.white.is_some() => {
                    row.result = Some(Color::Black)
                }
                _ => rows.push(MoveRow {
                    number: None,
                    white: None,
                    black: None,
                    result: Some(Color::White),
                }),
            }
        }

        for row in rows {
            let number = row
                .number
                .map(|n| format!("{}.", n))
                .unwrap_or_default();
            let white = match (row.white, row.result) {
                (Some(m), _) => self.move_cell(m),
                (None, Some(Color::White)) => format!("{:<width$}", result, width = CELL_WIDTH),
                (None, _) if row.black.is_some() => {
                    format!("{:<width$}", "...", width = CELL_WIDTH)
                }
                (None, _) => " ".repeat(CELL_WIDTH),
            };
            let black = match (row.black, row.result) {
                (Some(m), _) => self.move_cell(m),
                (None, Some(Color::Black)) => result.to_string(),
                (None, _) => String::new(),
            };
            let line = format!("{:<mw$}{}{}", number, white, black, mw = MOVE_WIDTH);
            writeln!(self.out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    fn write_counts(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        writeln!(
            self.out,
            "{:<tw$}{}{}",
            "TYPE",
            self.column_title(Color::White, COUNT_WIDTH),
            self.column_title(Color::Black, COUNT_WIDTH).trim_end(),
            tw = TYPE_WIDTH
        )?;

        for quality in MoveQuality::ALL.iter().rev().copied() {
            let label = self.paint(
                format!("{:<width$}", quality.label(), width = TYPE_WIDTH),
                quality_color(quality),
            );
            writeln!(
                self.out,
                "{}{:<cw$}{}",
                label,
                analysis.white_stats.count(quality),
                analysis.black_stats.count(quality),
                cw = COUNT_WIDTH
            )?;
        }

        writeln!(
            self.out,
            "{:<tw$}{:<cw$}{}",
            "Accuracy",
            format!("{:.1}%", analysis.white_stats.accuracy_percent),
            format!("{:.1}%", analysis.black_stats.accuracy_percent),
            tw = TYPE_WIDTH,
            cw = COUNT_WIDTH
        )?;
        writeln!(
            self.out,
            "{:<tw$}{:<cw$}{:.1}",
            "ACPL",
            format!("{:.1}", analysis.white_stats.avg_cp_loss),
            analysis.black_stats.avg_cp_loss,
            tw = TYPE_WIDTH,
            cw = COUNT_WIDTH
        )?;
        Ok(())
    }

    fn write_critical(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        for (quality, title) in [
            (MoveQuality::Blunder, "Blunders"),
            (MoveQuality::Mistake, "Mistakes"),
            (MoveQuality::Inaccuracy, "Inaccuracies"),
        ] {
            let moves = analysis.critical_moves(quality);
            if moves.is_empty() {
                continue;
            }
            writeln!(self.out)?;
            let heading = self.paint(format!("{}:", title), quality_color(quality));
            writeln!(self.out, "{}", heading)?;
            for m in moves {
                writeln!(self.out, "  {:<14} {}", m.notation(), m.fen_after)?;
            }
        }
        Ok(())
    }

    fn write_commentary(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        writeln!(self.out)?;
        writeln!(self.out, "Commentary:")?;
        for m in &analysis.moves {
            writeln!(self.out, "  {:<14} {}", m.notation(), commentary::describe(m))?;
        }
        Ok(())
    }
}

impl<W: Write> ReportRenderer for TableRenderer<W> {
    fn render(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        writeln!(self.out, "{}", analysis.headers.summary())?;
        writeln!(self.out, "Engine depth {}", analysis.depth)?;
        writeln!(self.out)?;

        self.write_moves(analysis)?;
        writeln!(self.out)?;
        self.write_counts(analysis)?;
        self.write_critical(analysis)?;
        if self.verbose {
            self.write_commentary(analysis)?;
        }

        self.out.flush()?;
        Ok(())
    }
}

struct MoveRow<'a> {
    number: Option<u32>,
    white: Option<&'a MoveAnalysis>,
    black: Option<&'a MoveAnalysis>,
    /// Column that shows the game result
    result: Option<Color>,
}

/// Pair up moves by move number. A game starting with Black to move gets
/// an empty White cell in its first row.
fn move_rows(moves: &[MoveAnalysis]) -> Vec<MoveRow<'_>> {
    let mut rows: Vec<MoveRow<'_>> = Vec::new();
    for m in moves {
        if m.side == Color::Black {
            if let Some(row) = rows.last_mut() {
                if row.black.is_none() && row.number == Some(m.move_number) {
                    row.black = Some(m);
                    continue;
                }
            }
        }
        rows.push(MoveRow {
            number: Some(m.move_number),
            white: (m.side == Color::White).then_some(m),
            black: (m.side == Color::Black).then_some(m),
            result: None,
        });
    }
    rows
}

fn quality_color(quality: MoveQuality) -> Option<TermColor> {
    match quality {
        MoveQuality::Blunder => Some(TermColor::Red),
        MoveQuality::Mistake => Some(TermColor::DarkYellow),
        MoveQuality::Inaccuracy => Some(TermColor::Yellow),
        MoveQuality::Good => None,
        MoveQuality::Great => Some(TermColor::Blue),
        MoveQuality::Excellent => Some(TermColor::Green),
        MoveQuality::Best => Some(TermColor::Cyan),
    }
}
