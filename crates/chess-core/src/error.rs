use thiserror::Error;

/// Errors raised while loading or replaying a game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The text could not be read as PGN at all.
    #[error("Malformed PGN: {0}")]
    MalformedInput(String),
    /// A move in the movetext is not legal in the position it was played from.
    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove { ply: usize, san: String },
    /// The requested game index is past the end of the file.
    #[error("No game at index {0}")]
    GameNotFound(usize),
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("Invalid UCI move '{0}'")]
    InvalidUci(String),
}
