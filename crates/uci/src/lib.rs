//! UCI (Universal Chess Interface) protocol library, GUI side.
//!
//! This crate provides the types needed to drive a UCI engine as an
//! analysis backend: formatting the commands a GUI sends and parsing the
//! messages an engine answers with.
//!
//! # Commands sent to the engine
//!
//! - `uci` - Initialize engine, get id and options
//! - `isready` / `readyok` - Synchronization
//! - `setoption name <name> [value <value>]` - Configure the engine
//! - `ucinewgame` - Reset engine state between games
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go depth <d>` - Search to a fixed depth
//! - `quit` - Exit engine

mod command;
mod info;

pub use command::GuiCommand;
pub use info::{EngineInfo, Score, ScoreBound};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum UciError {
    #[error("Empty message")]
    Empty,
    #[error("Unknown message: {0}")]
    UnknownMessage(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification (`id name ...` or `id author ...`).
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Search finished. `mv` is `None` when the engine answers
    /// `bestmove (none)` for a position without legal moves.
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
    /// `option name ...` declaration, kept verbatim.
    Option(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            None => Err(UciError::Empty),
            Some("uciok") => Ok(EngineMessage::UciOk),
            Some("readyok") => Ok(EngineMessage::ReadyOk),
            Some("info") => Ok(EngineMessage::Info(EngineInfo::parse(line)?)),
            Some("bestmove") => {
                let mv = parts
                    .next()
                    .ok_or_else(|| UciError::ParseError("bestmove without a move".to_string()))?;
                let mv = (mv != "(none)" && mv != "0000").then(|| mv.to_string());
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(str::to_string),
                    _ => None,
                };
                Ok(EngineMessage::BestMove { mv, ponder })
            }
            Some("id") => {
                let rest: Vec<&str> = parts.collect();
                match rest.split_first() {
                    Some((&"name", value)) => Ok(EngineMessage::Id {
                        name: Some(value.join(" ")),
                        author: None,
                    }),
                    Some((&"author", value)) => Ok(EngineMessage::Id {
                        name: None,
                        author: Some(value.join(" ")),
                    }),
                    _ => Err(UciError::ParseError(format!("Malformed id line: {}", line))),
                }
            }
            Some("option") => Ok(EngineMessage::Option(line.to_string())),
            Some(_) => Err(UciError::UnknownMessage(line.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handshake_messages() {
        assert_eq!(EngineMessage::parse("uciok").unwrap(), EngineMessage::UciOk);
        assert_eq!(
            EngineMessage::parse("readyok\n").unwrap(),
            EngineMessage::ReadyOk
        );
    }

    #[test]
    fn parse_id_name_with_spaces() {
        let msg = EngineMessage::parse("id name Stockfish 16.1").unwrap();
        assert_eq!(
            msg,
            EngineMessage::Id {
                name: Some("Stockfish 16.1".to_string()),
                author: None
            }
        );
    }

    #[test]
    fn parse_bestmove_with_ponder() {
        let msg = EngineMessage::parse("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(
            msg,
            EngineMessage::BestMove {
                mv: Some("e2e4".to_string()),
                ponder: Some("e7e5".to_string())
            }
        );
    }

    #[test]
    fn parse_bestmove_none() {
        let msg = EngineMessage::parse("bestmove (none)").unwrap();
        assert_eq!(
            msg,
            EngineMessage::BestMove {
                mv: None,
                ponder: None
            }
        );
    }

    #[test]
    fn parse_info_line() {
        match EngineMessage::parse("info depth 3 score cp 20 pv e2e4").unwrap() {
            EngineMessage::Info(info) => {
                assert_eq!(info.depth, Some(3));
                assert_eq!(info.score, Some(Score::Cp(20)));
            }
            other => panic!("Expected info, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_empty_and_unknown() {
        assert_eq!(EngineMessage::parse("   "), Err(UciError::Empty));
        assert!(matches!(
            EngineMessage::parse("Stockfish 16 by the Stockfish developers"),
            Err(UciError::UnknownMessage(_))
        ));
    }
}
