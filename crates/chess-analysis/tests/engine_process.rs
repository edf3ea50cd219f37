//! Process-level engine tests against a tiny UCI engine written in `sh`.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use chess_analysis::{AnalysisEngine, EngineClient, EngineError, EngineOptions};
use uci::Score;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Answers the handshake and every `go` with a fixed two-line search.
const FAKE_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name FakeFish 1.0"; echo "option name Hash type spin"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      echo "info depth 1 multipv 1 score cp 20 pv d2d4"
      echo "info depth 2 multipv 1 score cp 31 nodes 400 pv e2e4 e7e5"
      echo "info depth 2 multipv 2 score cp 12 nodes 400 pv d2d4 d7d5"
      echo "bestmove e2e4 ponder e7e5"
      ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Completes the handshake but never finishes a search.
const SILENT_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Exits as soon as it is spoken to.
const CRASHING_ENGINE: &str = "read -r line; exit 1\n";

fn engine_options(dir: &Path, script: &str, timeout: Duration) -> EngineOptions {
    let path = dir.join("engine.sh");
    fs::write(&path, script).unwrap();
    EngineOptions {
        path: "sh".to_string(),
        args: vec![path.to_string_lossy().into_owned()],
        depth: 2,
        threads: 1,
        hash_mb: 1,
        timeout,
    }
}

#[test]
fn handshake_reads_engine_name() {
    let dir = tempfile::tempdir().unwrap();
    let engine =
        AnalysisEngine::new(&engine_options(dir.path(), FAKE_ENGINE, Duration::from_secs(5)))
            .unwrap();

    assert_eq!(engine.name(), "FakeFish 1.0");
    assert_eq!(engine.depth(), 2);
}

#[test]
fn top_candidates_collects_ranked_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine =
        AnalysisEngine::new(&engine_options(dir.path(), FAKE_ENGINE, Duration::from_secs(5)))
            .unwrap();
    engine.new_game().unwrap();

    let candidates = engine.top_candidates(START_FEN, 5).unwrap();
    let moves: Vec<&str> = candidates.iter().map(|c| c.uci.as_str()).collect();
    assert_eq!(moves, vec!["e2e4", "d2d4"]);
    assert_eq!(candidates[0].score, Score::Cp(31));
    assert_eq!(candidates[1].rank, 2);

    let single = engine.top_candidates(START_FEN, 1).unwrap();
    assert_eq!(single.len(), 1);
}

#[test]
fn evaluate_returns_top_line_score() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine =
        AnalysisEngine::new(&engine_options(dir.path(), FAKE_ENGINE, Duration::from_secs(5)))
            .unwrap();

    assert_eq!(engine.evaluate(START_FEN).unwrap(), Score::Cp(31));
}

#[test]
fn stalled_search_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = AnalysisEngine::new(&engine_options(
        dir.path(),
        SILENT_ENGINE,
        Duration::from_millis(200),
    ))
    .unwrap();

    let started = Instant::now();
    let result = engine.evaluate(START_FEN);
    assert!(matches!(result, Err(EngineError::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn crashed_engine_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let result = AnalysisEngine::new(&engine_options(
        dir.path(),
        CRASHING_ENGINE,
        Duration::from_secs(5),
    ));

    assert!(matches!(result, Err(EngineError::Unavailable(_))));
}
