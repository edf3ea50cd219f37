//! Reading PGN input from a file or from pasted text.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use chess_core::{parse_pgn, Game, GameError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to read pasted game: {0}")]
    Stdin(#[source] io::Error),
    #[error("Nothing to review: no PGN text was given")]
    Empty,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Where the reviewed game came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Pasted,
}

/// PGN text together with its origin.
#[derive(Debug, Clone)]
pub struct PgnInput {
    pub source: Source,
    pub text: String,
}

impl PgnInput {
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            source: Source::File(path.to_path_buf()),
            text,
        })
    }

    /// Read pasted text until the first blank line after movetext.
    ///
    /// Blank lines between the tag pairs and the movetext are kept, so a game
    /// copied straight out of a PGN file can be pasted as is.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, InputError> {
        let text = read_pasted(reader).map_err(InputError::Stdin)?;
        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        Ok(Self {
            source: Source::Pasted,
            text,
        })
    }

    /// Parse the `index`-th game (0-based).
    pub fn game(&self, index: usize) -> Result<Game, InputError> {
        Ok(parse_pgn(&self.text, index)?)
    }
}

fn read_pasted<R: BufRead>(reader: R) -> io::Result<String> {
    let mut text = String::new();
    let mut seen_movetext = false;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if seen_movetext {
                break;
            }
        } else if !trimmed.starts_with('[') {
            seen_movetext = true;
        }
        text.push_str(&line);
        text.push('\n');
    }

    Ok(text)
}
