//! Parsed games.

use crate::{GameError, Position};

/// Metadata from the PGN tag section. Missing tags are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeaders {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub white_elo: String,
    pub black_elo: String,
    pub time_control: String,
    pub termination: String,
    /// Starting position when the game does not begin from the initial setup.
    pub fen: String,
}

impl GameHeaders {
    /// One-line summary: date, time control, players with ratings, result
    /// and termination. Empty fields are left out.
    pub fn summary(&self) -> String {
        let player = |name: &str, elo: &str| match (name.is_empty(), elo.is_empty()) {
            (true, _) => "?".to_string(),
            (false, true) => name.to_string(),
            (false, false) => format!("{} ({})", name, elo),
        };

        let mut parts = Vec::new();
        if !self.date.is_empty() {
            parts.push(self.date.clone());
        }
        if !self.time_control.is_empty() {
            parts.push(format!("TC {}", self.time_control));
        }
        parts.push(format!(
            "{} vs {}",
            player(&self.white, &self.white_elo),
            player(&self.black, &self.black_elo)
        ));
        if !self.result.is_empty() {
            parts.push(self.result.clone());
        }
        if !self.termination.is_empty() {
            parts.push(self.termination.clone());
        }
        parts.join(" | ")
    }
}

/// A mainline move in both notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub san: String,
    pub uci: String,
}

/// A game: headers plus the ordered mainline moves. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    headers: GameHeaders,
    moves: Vec<PlayedMove>,
}

impl Game {
    /// Build a game from headers and SAN moves, validating every move.
    pub fn from_san<S: AsRef<str>>(headers: GameHeaders, sans: &[S]) -> Result<Self, GameError> {
        let mut position = Self::initial_position(&headers)?;
        let mut moves = Vec::with_capacity(sans.len());

        for (i, san) in sans.iter().enumerate() {
            let san = san.as_ref();
            let (next, played) = position.apply_san(san).map_err(|_| GameError::IllegalMove {
                ply: i + 1,
                san: san.to_string(),
            })?;
            moves.push(played);
            position = next;
        }

        Ok(Self { headers, moves })
    }

    pub fn headers(&self) -> &GameHeaders {
        &self.headers
    }

    pub fn moves(&self) -> &[PlayedMove] {
        &self.moves
    }

    /// Number of plies.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Position before the first move.
    pub fn start_position(&self) -> Result<Position, GameError> {
        Self::initial_position(&self.headers)
    }

    fn initial_position(headers: &GameHeaders) -> Result<Position, GameError> {
        if headers.fen.is_empty() {
            Ok(Position::startpos())
        } else {
            Position::from_fen(&headers.fen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn from_san_records_uci() {
        let game = Game::from_san(GameHeaders::default(), &["e4", "e5", "Nf3"]).unwrap();
        let uci: Vec<&str> = game.moves().iter().map(|m| m.uci.as_str()).collect();
        assert_eq!(uci, vec!["e2e4", "e7e5", "g1f3"]);
        assert_eq!(game.len(), 3);
    }

    #[test]
    fn from_san_reports_illegal_ply() {
        let err = Game::from_san(GameHeaders::default(), &["e4", "e5", "Ke3"]).unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalMove {
                ply: 3,
                san: "Ke3".to_string()
            }
        );
    }

    #[test]
    fn empty_game() {
        let game = Game::from_san::<&str>(GameHeaders::default(), &[]).unwrap();
        assert!(game.is_empty());
        assert_eq!(game.start_position().unwrap().side_to_move(), Color::White);
    }

    #[test]
    fn custom_start_position() {
        let headers = GameHeaders {
            fen: "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".to_string(),
            ..Default::default()
        };
        let game = Game::from_san(headers, &["e4"]).unwrap();
        assert_eq!(game.moves()[0].uci, "e2e4");
    }

    #[test]
    fn summary_skips_missing_fields() {
        let headers = GameHeaders {
            date: "2024.03.01".to_string(),
            white: "Alice".to_string(),
            white_elo: "1850".to_string(),
            black: "Bob".to_string(),
            result: "1-0".to_string(),
            termination: "Normal".to_string(),
            ..Default::default()
        };
        assert_eq!(
            headers.summary(),
            "2024.03.01 | Alice (1850) vs Bob | 1-0 | Normal"
        );
        assert_eq!(GameHeaders::default().summary(), "? vs ?");
    }
}
