//! UCI engine client for position analysis.
//!
//! [`EngineClient`] is the blocking request/response surface the analyzer
//! drives; [`AnalysisEngine`] implements it over a child process speaking UCI.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};
use uci::{EngineInfo, EngineMessage, GuiCommand, Score, UciError};

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 100_000;

/// Default wait for any single line of engine output.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `Drop` waits for the engine to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine process could not be started or its pipes are closed.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    /// No output line arrived within the configured wait.
    #[error("Engine did not respond within {0:?}")]
    Timeout(Duration),
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Unavailable(err.to_string())
    }
}

impl From<UciError> for EngineError {
    fn from(err: UciError) -> Self {
        EngineError::InvalidResponse(err.to_string())
    }
}

/// One ranked line from a multi-PV search. The score is from the side to
/// move, exactly as the engine reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLine {
    /// 1-based rank (`multipv` index)
    pub rank: u32,
    /// First move of the line (UCI)
    pub uci: String,
    pub score: Score,
    pub depth: u32,
}

/// Blocking analysis interface, one request outstanding at a time.
pub trait EngineClient {
    /// Fix the search depth for subsequent requests.
    fn set_depth(&mut self, depth: u32);

    /// Reset engine state before analysing a new game.
    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Score of the position, from the side to move.
    fn evaluate(&mut self, fen: &str) -> Result<Score, EngineError>;

    /// Up to `n` candidate moves, best first. Empty when the side to move
    /// has no legal moves.
    fn top_candidates(&mut self, fen: &str, n: usize) -> Result<Vec<CandidateLine>, EngineError>;
}

/// Settings for spawning an [`AnalysisEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Executable path or name on `PATH`
    pub path: String,
    /// Extra command-line arguments
    pub args: Vec<String>,
    pub depth: u32,
    /// `Threads` UCI option
    pub threads: u32,
    /// `Hash` UCI option, in megabytes
    pub hash_mb: u32,
    /// Wait for each line of output
    pub timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            args: Vec::new(),
            depth: 16,
            threads: 1,
            hash_mb: 16,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Collects `info` lines of one search into ranked candidates.
///
/// Keeps the deepest exact line per `multipv` rank. Bound-only scores and
/// lines without a principal variation are ignored for ranking, but the last
/// exact score is remembered so terminal positions (`score mate 0`, no PV)
/// still yield an evaluation.
#[derive(Debug, Default)]
pub(crate) struct SearchCollector {
    lines: BTreeMap<u32, CandidateLine>,
    last_score: Option<Score>,
}

impl SearchCollector {
    pub(crate) fn observe(&mut self, info: &EngineInfo) {
        if let (Some(score), uci::ScoreBound::Exact) = (info.score, info.bound) {
            self.last_score = Some(score);
        }
        if !info.is_scored_line() {
            return;
        }
        let (Some(score), Some(first)) = (info.score, info.pv.first()) else {
            return;
        };

        let rank = info.multipv.unwrap_or(1);
        let depth = info.depth.unwrap_or(0);
        if matches!(self.lines.get(&rank), Some(existing) if existing.depth > depth) {
            return;
        }
        self.lines.insert(
            rank,
            CandidateLine {
                rank,
                uci: first.clone(),
                score,
                depth,
            },
        );
    }

    /// Ranked candidates from the deepest completed iteration.
    pub(crate) fn candidates(&self) -> Vec<CandidateLine> {
        let Some(max_depth) = self.lines.values().map(|l| l.depth).max() else {
            return Vec::new();
        };
        let mut out: Vec<CandidateLine> = Vec::with_capacity(self.lines.len());
        for line in self.lines.values().filter(|l| l.depth == max_depth) {
            if !out.iter().any(|seen| seen.uci == line.uci) {
                out.push(line.clone());
            }
        }
        out
    }

    /// Score of the top line, falling back to the last exact score seen.
    pub(crate) fn score(&self) -> Option<Score> {
        self.candidates()
            .first()
            .map(|l| l.score)
            .or(self.last_score)
    }
}

/// Wrapper for UCI-compatible analysis engines like Stockfish.
///
/// A helper thread forwards stdout lines over a channel so every read can be
/// bounded by the configured timeout. Dropping the engine sends `quit` and
/// kills the process if it does not exit promptly.
pub struct AnalysisEngine {
    /// The engine process handle.
    process: Child,
    /// Writer for sending commands to the engine.
    stdin: ChildStdin,
    /// Lines read from the engine's stdout.
    lines: Receiver<String>,
    /// The engine's name (reported via UCI id).
    name: String,
    depth: u32,
    timeout: Duration,
    /// Current `MultiPV` setting.
    multipv: usize,
}

impl AnalysisEngine {
    /// Spawn the engine and perform the UCI handshake.
    ///
    /// # Errors
    ///
    /// - `EngineError::Unavailable` if the process cannot be started or exits
    /// - `EngineError::Timeout` if the handshake stalls
    pub fn new(options: &EngineOptions) -> Result<Self, EngineError> {
        let mut process = Command::new(&options.path)
            .args(&options.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Unavailable(format!("{}: {}", options.path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("no stdin pipe".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("no stdout pipe".to_string()))?;

        let (tx, lines) = mpsc::channel();
        thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        let mut engine = Self {
            process,
            stdin,
            lines,
            name: String::new(),
            depth: options.depth,
            timeout: options.timeout,
            multipv: 1,
        };

        engine.init_uci(options)?;
        debug!(engine = %engine.name, "engine ready");

        Ok(engine)
    }

    /// Initialize the UCI protocol with the engine.
    fn init_uci(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.send(&GuiCommand::Uci)?;

        let mut name = String::new();
        for _ in 0..MAX_UCI_LINES {
            match self.read_message()? {
                EngineMessage::Id {
                    name: Some(reported),
                    ..
                } => name = reported,
                EngineMessage::UciOk => {
                    self.name = if name.is_empty() {
                        "Unknown Engine".to_string()
                    } else {
                        name
                    };
                    self.send(&GuiCommand::set_option("Threads", options.threads))?;
                    self.send(&GuiCommand::set_option("Hash", options.hash_mb))?;
                    return self.sync();
                }
                _ => {}
            }
        }
        Err(EngineError::InvalidResponse(
            "Too many lines without uciok".to_string(),
        ))
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Send `isready` and wait for `readyok`.
    fn sync(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::IsReady)?;
        for _ in 0..MAX_UCI_LINES {
            if self.read_message()? == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
        Err(EngineError::InvalidResponse(
            "Too many lines without readyok".to_string(),
        ))
    }

    fn set_multipv(&mut self, n: usize) -> Result<(), EngineError> {
        if self.multipv != n {
            self.send(&GuiCommand::set_option("MultiPV", n))?;
            self.multipv = n;
        }
        Ok(())
    }

    /// Run a fixed-depth search and collect its output until `bestmove`.
    fn search(&mut self, fen: &str) -> Result<SearchCollector, EngineError> {
        self.send(&GuiCommand::position_fen(fen))?;
        self.send(&GuiCommand::Go { depth: self.depth })?;

        let mut collector = SearchCollector::default();
        for _ in 0..MAX_UCI_LINES {
            match self.read_message()? {
                EngineMessage::Info(info) => collector.observe(&info),
                EngineMessage::BestMove { .. } => return Ok(collector),
                _ => {}
            }
        }
        Err(EngineError::InvalidResponse(
            "Too many lines without bestmove".to_string(),
        ))
    }

    /// Send a command to the engine.
    fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        let line = command.to_uci();
        debug!("-> {}", line);
        writeln!(self.stdin, "{}", line)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read the next recognised message, skipping banners and blank lines.
    fn read_message(&mut self) -> Result<EngineMessage, EngineError> {
        loop {
            let line = match self.lines.recv_timeout(self.timeout) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => return Err(EngineError::Timeout(self.timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::Unavailable(
                        "Engine closed unexpectedly".to_string(),
                    ))
                }
            };
            debug!("<- {}", line);
            match EngineMessage::parse(&line) {
                Ok(message) => return Ok(message),
                Err(UciError::Empty) | Err(UciError::UnknownMessage(_)) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl EngineClient for AnalysisEngine {
    fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::UciNewGame)?;
        self.sync()
    }

    fn evaluate(&mut self, fen: &str) -> Result<Score, EngineError> {
        self.set_multipv(1)?;
        self.search(fen)?
            .score()
            .ok_or_else(|| EngineError::InvalidResponse(format!("No score for {}", fen)))
    }

    fn top_candidates(&mut self, fen: &str, n: usize) -> Result<Vec<CandidateLine>, EngineError> {
        self.set_multipv(n.max(1))?;
        let mut candidates = self.search(fen)?.candidates();
        candidates.truncate(n);
        Ok(candidates)
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        // Try to send quit command to gracefully terminate the engine
        let _ = self.send(&GuiCommand::Quit);

        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            match self.process.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        warn!(engine = %self.name, "engine ignored quit, killing it");
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
