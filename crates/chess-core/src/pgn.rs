//! PGN (Portable Game Notation) reading and writing.
//!
//! Reading goes through the streaming `pgn-reader` visitor: tags are collected
//! into [`GameHeaders`], mainline SAN tokens are collected in order, and
//! variations, comments and NAGs are skipped. Each SAN is then validated by
//! replaying it in [`Game::from_san`].

use std::io::{self, Write};
use std::ops::ControlFlow;

use pgn_reader::{Outcome, RawTag, Reader, SanPlus, Skip, Visitor};

use crate::{Game, GameError, GameHeaders};

/// Column at which exported movetext is wrapped.
const LINE_WIDTH: usize = 80;

struct RawGame {
    headers: GameHeaders,
    sans: Vec<String>,
    outcome: Option<String>,
}

struct MainlineVisitor;

impl Visitor for MainlineVisitor {
    type Tags = GameHeaders;
    type Movetext = RawGame;
    type Output = RawGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameHeaders::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let slot = match key {
            b"Event" => &mut tags.event,
            b"Site" => &mut tags.site,
            b"Date" => &mut tags.date,
            b"Round" => &mut tags.round,
            b"White" => &mut tags.white,
            b"Black" => &mut tags.black,
            b"Result" => &mut tags.result,
            b"WhiteElo" => &mut tags.white_elo,
            b"BlackElo" => &mut tags.black_elo,
            b"TimeControl" => &mut tags.time_control,
            b"Termination" => &mut tags.termination,
            b"FEN" => &mut tags.fen,
            _ => return ControlFlow::Continue(()),
        };
        *slot = String::from_utf8_lossy(value.as_bytes()).into_owned();
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(RawGame {
            headers: tags,
            sans: Vec::new(),
            outcome: None,
        })
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.sans.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, movetext: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        movetext.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext
    }
}

/// Parse the game at `index` (0-based) from PGN text.
///
/// Games before `index` are read and discarded. Missing tags become empty
/// strings; the movetext result marker fills in a missing `Result` tag.
///
/// # Errors
///
/// - [`GameError::MalformedInput`] if the text contains no game or cannot be read
/// - [`GameError::GameNotFound`] if the file holds fewer than `index + 1` games
/// - [`GameError::IllegalMove`] if a mainline move is illegal
pub fn parse_pgn(text: &str, index: usize) -> Result<Game, GameError> {
    let mut reader = Reader::new(text.as_bytes());
    let mut visitor = MainlineVisitor;

    let mut seen = 0;
    let raw = loop {
        let next = reader
            .read_game(&mut visitor)
            .map_err(|e| GameError::MalformedInput(e.to_string()))?;
        match next {
            Some(raw) if seen == index => break raw,
            Some(_) => seen += 1,
            None if seen == 0 && index == 0 => {
                return Err(GameError::MalformedInput("no game found".to_string()))
            }
            None => return Err(GameError::GameNotFound(index)),
        }
    };

    let RawGame {
        mut headers,
        sans,
        outcome,
    } = raw;

    if sans.is_empty() && headers == GameHeaders::default() && outcome.is_none() {
        return Err(GameError::MalformedInput("no tags or moves found".to_string()));
    }
    if headers.result.is_empty() {
        headers.result = outcome.unwrap_or_default();
    }

    Game::from_san(headers, &sans)
}

/// Export a game as PGN: the Seven Tag Roster (plus ratings, time control,
/// termination and FEN when present), a blank line, and numbered SAN
/// movetext wrapped at 80 columns.
pub fn write_pgn<W: Write>(out: &mut W, game: &Game) -> io::Result<()> {
    let headers = game.headers();
    let or_unknown = |value: &str| {
        if value.is_empty() {
            "?".to_string()
        } else {
            value.to_string()
        }
    };
    let result = if headers.result.is_empty() {
        "*".to_string()
    } else {
        headers.result.clone()
    };

    writeln!(out, "[Event \"{}\"]", or_unknown(&headers.event))?;
    writeln!(out, "[Site \"{}\"]", or_unknown(&headers.site))?;
    writeln!(out, "[Date \"{}\"]", or_unknown(&headers.date))?;
    writeln!(out, "[Round \"{}\"]", or_unknown(&headers.round))?;
    writeln!(out, "[White \"{}\"]", or_unknown(&headers.white))?;
    writeln!(out, "[Black \"{}\"]", or_unknown(&headers.black))?;
    writeln!(out, "[Result \"{}\"]", result)?;
    for (name, value) in [
        ("WhiteElo", &headers.white_elo),
        ("BlackElo", &headers.black_elo),
        ("TimeControl", &headers.time_control),
        ("Termination", &headers.termination),
    ] {
        if !value.is_empty() {
            writeln!(out, "[{} \"{}\"]", name, value)?;
        }
    }
    if !headers.fen.is_empty() {
        writeln!(out, "[SetUp \"1\"]")?;
        writeln!(out, "[FEN \"{}\"]", headers.fen)?;
    }
    writeln!(out)?;

    let start = game
        .start_position()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let first_number = start.fullmove_number() as usize;
    let black_first = start.side_to_move() == crate::Color::Black;

    let mut tokens = Vec::with_capacity(game.len() * 3 / 2 + 1);
    for (i, mv) in game.moves().iter().enumerate() {
        let ply = if black_first { i + 1 } else { i };
        let number = first_number + ply / 2;
        if ply % 2 == 0 {
            tokens.push(format!("{}.", number));
        } else if i == 0 {
            tokens.push(format!("{}...", number));
        }
        tokens.push(mv.san.clone());
    }
    tokens.push(result);

    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            writeln!(out, "{}", line)?;
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&token);
    }
    writeln!(out, "{}", line)?;

    Ok(())
}
