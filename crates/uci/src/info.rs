//! UCI info line parsing.

use crate::UciError;

/// Score in centipawns or mate distance, from the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = side to move
    /// gets mated, zero = side to move is already checkmated).
    Mate(i32),
}

/// Whether a reported score is exact or only a search bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBound {
    #[default]
    Exact,
    Lower,
    Upper,
}

/// Search information from engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Selective search depth.
    pub seldepth: Option<u32>,
    /// Index of this line when `MultiPV` is above one (1-based).
    pub multipv: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// `lowerbound` / `upperbound` qualifier of the score.
    pub bound: ScoreBound,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Nodes per second.
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Principal variation (best line found).
    pub pv: Vec<String>,
    /// Current move being searched.
    pub currmove: Option<String>,
    /// Hash table usage (per mille).
    pub hashfull: Option<u32>,
    /// Arbitrary string info.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parse UCI info line.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&"info") {
            return Err(UciError::ParseError(format!("Not an info line: {}", line)));
        }

        let mut info = EngineInfo::default();
        let mut i = 1; // Skip "info"

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    i += 1;
                    info.depth = parse_number(&parts, i, "depth")?;
                }
                "seldepth" => {
                    i += 1;
                    info.seldepth = parse_number(&parts, i, "seldepth")?;
                }
                "multipv" => {
                    i += 1;
                    info.multipv = parse_number(&parts, i, "multipv")?;
                }
                "score" => {
                    i += 1;
                    let kind = parts.get(i).copied();
                    i += 1;
                    let value: Option<i32> = parse_number(&parts, i, "score")?;
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => {
                            return Err(UciError::ParseError(format!(
                                "Malformed score in: {}",
                                line
                            )))
                        }
                    };
                    match parts.get(i + 1) {
                        Some(&"lowerbound") => {
                            info.bound = ScoreBound::Lower;
                            i += 1;
                        }
                        Some(&"upperbound") => {
                            info.bound = ScoreBound::Upper;
                            i += 1;
                        }
                        _ => {}
                    }
                }
                "nodes" => {
                    i += 1;
                    info.nodes = parse_number(&parts, i, "nodes")?;
                }
                "nps" => {
                    i += 1;
                    info.nps = parse_number(&parts, i, "nps")?;
                }
                "time" => {
                    i += 1;
                    info.time = parse_number(&parts, i, "time")?;
                }
                "hashfull" => {
                    i += 1;
                    info.hashfull = parse_number(&parts, i, "hashfull")?;
                }
                "currmove" => {
                    i += 1;
                    info.currmove = parts.get(i).map(|s| s.to_string());
                }
                "pv" => {
                    i += 1;
                    // Collect all remaining moves until another keyword or end
                    while i < parts.len() && !is_info_keyword(parts[i]) {
                        info.pv.push(parts[i].to_string());
                        i += 1;
                    }
                    continue; // Don't increment i again
                }
                "string" => {
                    // String consumes rest of line
                    info.string = Some(parts[i + 1..].join(" "));
                    break;
                }
                _ => {}
            }
            i += 1;
        }

        Ok(info)
    }

    /// Whether this line carries a usable scored variation: exact score and a
    /// non-empty principal variation.
    pub fn is_scored_line(&self) -> bool {
        self.score.is_some() && self.bound == ScoreBound::Exact && !self.pv.is_empty()
    }
}

fn parse_number<T: std::str::FromStr>(
    parts: &[&str],
    i: usize,
    field: &str,
) -> Result<Option<T>, UciError> {
    match parts.get(i) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| UciError::ParseError(format!("Invalid {} value: {}", field, raw))),
        None => Ok(None),
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "string"
    )
}
