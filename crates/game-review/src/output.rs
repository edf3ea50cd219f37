//! Review artifacts on disk.
//!
//! Each reviewed game gets its own directory under the output root:
//! `<root>/<stem>[-<index>]/` holding `<stem>.png` and `game.pgn`. Files
//! are written to a hidden sibling directory first and renamed into place,
//! so a failed write leaves nothing behind.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chess_analysis::GameAnalysis;
use chess_core::{write_pgn, Game};
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::input::Source;
use crate::render::{ChartRenderer, RenderError, ReportRenderer};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to render chart: {0}")]
    Chart(#[from] RenderError),
}

/// Paths of the files written for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub dir: PathBuf,
    pub chart: PathBuf,
    pub pgn: PathBuf,
}

/// Base name for a game's artifacts: the input file stem, or
/// `pasted-<timestamp>` for pasted text.
pub fn artifact_stem(source: &Source, now: DateTime<Local>) -> String {
    match source {
        Source::File(path) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "game".to_string()),
        Source::Pasted => format!("pasted-{}", now.format("%Y%m%d-%H%M%S")),
    }
}

/// Directory name for a game; games past the first in a file get the index
/// appended.
pub fn artifact_dir(root: &Path, stem: &str, index: usize) -> PathBuf {
    if index == 0 {
        root.join(stem)
    } else {
        root.join(format!("{}-{}", stem, index))
    }
}

/// Write the chart and a copy of the game into `dir`, replacing any earlier
/// review of the same game.
pub fn write_artifacts(
    dir: &Path,
    stem: &str,
    game: &Game,
    analysis: &GameAnalysis,
) -> Result<Artifacts, OutputError> {
    let chart_name = format!("{}.png", stem);
    let staging = staging_dir(dir);

    let result = write_files(&staging, &chart_name, game, analysis)
        .and_then(|()| publish(&staging, dir));
    if result.is_err() {
        let _ = std::fs::remove_dir_all(&staging);
    }
    result?;

    tracing::info!("Wrote review artifacts to {}", dir.display());
    Ok(Artifacts {
        dir: dir.to_path_buf(),
        chart: dir.join(chart_name),
        pgn: dir.join(PGN_NAME),
    })
}

const PGN_NAME: &str = "game.pgn";

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> OutputError {
    let path = path.to_path_buf();
    move |source| OutputError::Write { path, source }
}

fn staging_dir(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.with_file_name(format!(".{}.partial", name))
}

fn write_files(
    staging: &Path,
    chart_name: &str,
    game: &Game,
    analysis: &GameAnalysis,
) -> Result<(), OutputError> {
    if staging.exists() {
        std::fs::remove_dir_all(staging).map_err(io_err(staging))?;
    }
    std::fs::create_dir_all(staging).map_err(io_err(staging))?;

    ChartRenderer::new(staging.join(chart_name)).render(analysis)?;

    let pgn = staging.join(PGN_NAME);
    let file = File::create(&pgn).map_err(io_err(&pgn))?;
    let mut writer = BufWriter::new(file);
    write_pgn(&mut writer, game)
        .and_then(|()| writer.flush())
        .map_err(io_err(&pgn))
}

fn publish(staging: &Path, dir: &Path) -> Result<(), OutputError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(io_err(dir))?;
    }
    std::fs::rename(staging, dir).map_err(io_err(dir))
}
