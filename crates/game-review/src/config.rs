//! Configuration file loading for game review.
//!
//! Settings come from `review.toml` in the working directory (or the file
//! given with `--config`). Every field has a default, so a missing file or a
//! missing section is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_analysis::{AnalysisConfig, EngineOptions, Thresholds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A value is outside its accepted range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Most candidate moves requested per position.
pub const MAX_CANDIDATES: usize = 5;

/// `[engine]` section: how to launch and drive the analysis engine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Engine executable. Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub path: String,
    /// Extra command-line arguments for the engine.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default = "default_threads")]
    pub threads: u32,
    #[serde(default = "default_hash_mb")]
    pub hash_mb: u32,
    /// Seconds to wait for each line of engine output.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Candidate moves requested before each ply.
    #[serde(default = "default_candidates")]
    pub candidates: usize,
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_depth() -> u32 {
    16
}

fn default_threads() -> u32 {
    1
}

fn default_hash_mb() -> u32 {
    16
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_candidates() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
            depth: default_depth(),
            threads: default_threads(),
            hash_mb: default_hash_mb(),
            timeout_secs: default_timeout_secs(),
            candidates: default_candidates(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Directory that receives one artifact directory per reviewed game.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reviews")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Main review configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ReviewConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub engine: Option<String>,
    pub depth: Option<u32>,
    pub threads: Option<u32>,
    pub out: Option<PathBuf>,
}

impl ReviewConfig {
    /// Loads the review configuration.
    ///
    /// With `path`, that file must exist. Without it, [`Self::config_path()`]
    /// is read if present and the defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit file,
    /// [`ConfigError::ReadError`] if the file cannot be read,
    /// [`ConfigError::ParseError`] if it contains invalid TOML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::read(path),
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::read(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the engine settings that would make every analysis fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.depth == 0 {
            return Err(ConfigError::Invalid(
                "engine.depth must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_CANDIDATES).contains(&self.engine.candidates) {
            return Err(ConfigError::Invalid(format!(
                "engine.candidates must be between 1 and {}, got {}",
                MAX_CANDIDATES, self.engine.candidates
            )));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns `review.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("review.toml")
    }

    /// Apply command-line overrides in place.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(engine) = &overrides.engine {
            self.engine.path = engine.clone();
        }
        if let Some(depth) = overrides.depth {
            self.engine.depth = depth;
        }
        if let Some(threads) = overrides.threads {
            self.engine.threads = threads;
        }
        if let Some(out) = &overrides.out {
            self.output.dir = out.clone();
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            path: self.engine.path.clone(),
            args: self.engine.args.clone(),
            depth: self.engine.depth,
            threads: self.engine.threads,
            hash_mb: self.engine.hash_mb,
            timeout: Duration::from_secs(self.engine.timeout_secs),
        }
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            depth: self.engine.depth,
            candidates: self.engine.candidates,
            thresholds: self.thresholds,
        }
    }
}
