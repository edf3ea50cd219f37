//! Board positions, replayed move by move.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position as _, Square};

use crate::{Color, GameError, PlayedMove};

/// A board snapshot. Applying a move yields a new position; the receiver is
/// never changed.
#[derive(Debug, Clone, Default)]
pub struct Position {
    board: Chess,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let invalid = |reason: String| GameError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        let board: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{}", e)))?;
        Ok(Self { board })
    }

    /// FEN string identifying this position.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.board, EnPassantMode::Legal).to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.turn().into()
    }

    /// Full-move number as written in FEN (starts at 1, increments after Black).
    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmoves().get()
    }

    /// All legal moves in UCI notation.
    pub fn legal_moves(&self) -> Vec<String> {
        self.board
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// SAN (with check suffix) of a UCI move in this position.
    pub fn san_of(&self, uci: &str) -> Result<String, GameError> {
        let m = self.parse_uci(uci)?;
        let mut scratch = self.board.clone();
        Ok(SanPlus::from_move_and_play_unchecked(&mut scratch, m).to_string())
    }

    /// Apply a UCI move, returning the resulting position.
    pub fn apply(&self, uci: &str) -> Result<Position, GameError> {
        let m = self.parse_uci(uci)?;
        Ok(self.play(m))
    }

    /// Apply a SAN move, returning the resulting position together with the
    /// move in both notations.
    pub fn apply_san(&self, san: &str) -> Result<(Position, PlayedMove), GameError> {
        let illegal = || GameError::IllegalMove {
            ply: 0,
            san: san.to_string(),
        };
        let parsed: SanPlus = san.parse().map_err(|_| illegal())?;
        let m = parsed.san.to_move(&self.board).map_err(|_| illegal())?;
        let played = self.describe(&m);
        Ok((self.play(m), played))
    }

    /// Piece on a square such as `"e4"`, as its FEN letter (uppercase for
    /// White). `None` for an empty square or an unknown square name.
    pub fn piece_at(&self, square: &str) -> Option<char> {
        let square: Square = square.parse().ok()?;
        self.board.board().piece_at(square).map(|piece| piece.char())
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.is_stalemate()
    }

    /// Whether the side to move has no legal moves.
    pub fn is_terminal(&self) -> bool {
        self.board.legal_moves().is_empty()
    }

    fn parse_uci(&self, uci: &str) -> Result<Move, GameError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| GameError::InvalidUci(uci.to_string()))?;
        parsed
            .to_move(&self.board)
            .map_err(|_| GameError::InvalidUci(uci.to_string()))
    }

    fn describe(&self, m: &Move) -> PlayedMove {
        let mut scratch = self.board.clone();
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let san = SanPlus::from_move_and_play_unchecked(&mut scratch, m.clone()).to_string();
        PlayedMove { san, uci }
    }

    fn play(&self, m: Move) -> Position {
        let mut board = self.board.clone();
        board.play_unchecked(m);
        Position { board }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn startpos_fen() {
        let pos = Position::startpos();
        assert_eq!(pos.fen(), START_FEN);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn apply_does_not_change_receiver() {
        let pos = Position::startpos();
        let next = pos.apply("e2e4").unwrap();

        assert_eq!(pos.fen(), START_FEN);
        assert_eq!(
            next.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(next.side_to_move(), Color::Black);
    }

    #[test]
    fn piece_at_reads_the_board() {
        let pos = Position::startpos().apply("e2e4").unwrap();
        assert_eq!(pos.piece_at("e1"), Some('K'));
        assert_eq!(pos.piece_at("d8"), Some('q'));
        assert_eq!(pos.piece_at("e4"), Some('P'));
        assert_eq!(pos.piece_at("e2"), None);
        assert_eq!(pos.piece_at("z9"), None);
    }

    #[test]
    fn san_of_uci() {
        let pos = Position::startpos();
        assert_eq!(pos.san_of("g1f3").unwrap(), "Nf3");
        assert_eq!(pos.san_of("e2e4").unwrap(), "e4");
    }

    #[test]
    fn apply_san_reports_both_notations() {
        let pos = Position::startpos();
        let (next, played) = pos.apply_san("Nf3").unwrap();

        assert_eq!(played.san, "Nf3");
        assert_eq!(played.uci, "g1f3");
        assert_eq!(next.side_to_move(), Color::Black);
    }

    #[test]
    fn castling_uses_standard_uci() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let (_, played) = pos.apply_san("O-O").unwrap();
        assert_eq!(played.uci, "e1g1");
        assert_eq!(pos.san_of("e1c1").unwrap(), "O-O-O");
    }

    #[test]
    fn rejects_illegal_moves() {
        let pos = Position::startpos();
        assert!(matches!(
            pos.apply("e2e5"),
            Err(GameError::InvalidUci(_))
        ));
        assert!(matches!(
            pos.apply_san("Ke2"),
            Err(GameError::IllegalMove { .. })
        ));
        assert!(pos.apply("zz").is_err());
    }

    #[test]
    fn detects_checkmate_and_stalemate() {
        // Fool's mate
        let mut pos = Position::startpos();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            pos = pos.apply(uci).unwrap();
        }
        assert!(pos.is_checkmate());
        assert!(pos.is_terminal());
        assert_eq!(pos.san_of("e1f2").ok(), None);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stalemate.is_stalemate());
        assert!(!stalemate.is_checkmate());
    }

    #[test]
    fn invalid_fen_is_rejected() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(GameError::InvalidFen { .. })
        ));
    }

    #[test]
    fn fullmove_number_advances_after_black() {
        let pos = Position::startpos().apply("e2e4").unwrap();
        assert_eq!(pos.fullmove_number(), 1);
        let pos = pos.apply("e7e5").unwrap();
        assert_eq!(pos.fullmove_number(), 2);
    }
}
