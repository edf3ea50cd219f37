//! Core types for chess game review.
//!
//! This crate wraps the rules library behind the small surface the review
//! pipeline needs:
//! - [`Color`] for the side to move
//! - [`Position`] for replaying moves and converting between UCI, SAN and FEN
//! - [`Game`] for a parsed PGN game (headers plus mainline moves)
//! - [`parse_pgn`] and [`write_pgn`] for reading and exporting PGN text

mod color;
mod error;
mod game;
mod pgn;
mod position;

pub use color::Color;
pub use error::GameError;
pub use game::{Game, GameHeaders, PlayedMove};
pub use pgn::{parse_pgn, write_pgn};
pub use position::Position;
