use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chess_analysis::{AnalysisEngine, GameAnalyzer};
use chess_core::Color;
use clap::{Args, Parser, Subcommand};
use game_review::config::{Overrides, ReviewConfig};
use game_review::input::PgnInput;
use game_review::output::{artifact_dir, artifact_stem, write_artifacts};
use game_review::render::{InteractiveRenderer, ReportRenderer, TableRenderer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "game-review")]
#[command(about = "Grade every move of a chess game with a UCI engine")]
struct Cli {
    /// Config file (defaults to review.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Engine executable
    #[arg(long, global = true)]
    engine: Option<String>,
    /// Search depth per position
    #[arg(short, long, global = true)]
    depth: Option<u32>,
    /// Engine threads
    #[arg(long, global = true)]
    threads: Option<u32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the move table and per-side counts
    Table(ReviewArgs),
    /// Write the evaluation chart
    Chart(ReviewArgs),
    /// Step through the game in the terminal
    Interactive(ReviewArgs),
}

#[derive(Args, Debug, Clone)]
struct ReviewArgs {
    /// PGN file; pasted text is read from stdin when omitted
    pgn: Option<PathBuf>,
    /// Game to review in a multi-game file (0-based)
    #[arg(short, long, default_value = "0")]
    index: usize,
    /// Your side, highlighted in the report (white or black)
    #[arg(short, long)]
    color: Option<Color>,
    /// Add a comment for every move
    #[arg(short, long)]
    verbose: bool,
    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,
    /// Output directory for review artifacts
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Commands {
    fn args(&self) -> &ReviewArgs {
        match self {
            Commands::Table(args) | Commands::Chart(args) | Commands::Interactive(args) => args,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();
}

fn read_input(args: &ReviewArgs) -> anyhow::Result<PgnInput> {
    match &args.pgn {
        Some(path) => Ok(PgnInput::from_file(path)?),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                eprintln!("Paste a PGN, then press Enter on an empty line:");
            }
            Ok(PgnInput::from_reader(stdin.lock())?)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let args = cli.command.args().clone();

    let mut config =
        ReviewConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply(&Overrides {
        engine: cli.engine,
        depth: cli.depth,
        threads: cli.threads,
        out: args.out.clone(),
    });
    config.validate().context("Invalid command-line options")?;

    let input = read_input(&args)?;
    let game = input
        .game(args.index)
        .with_context(|| format!("Failed to read game {}", args.index))?;
    info!("{} ({} plies)", game.headers().summary(), game.len());

    let analysis = {
        let engine = AnalysisEngine::new(&config.engine_options())
            .with_context(|| format!("Failed to start engine '{}'", config.engine.path))?;
        info!("Analyzing with {} at depth {}", engine.name(), config.engine.depth);
        let mut analyzer = GameAnalyzer::new(engine, config.analysis_config());
        analyzer.analyze(&game).context("Analysis failed")?
    };

    let stem = artifact_stem(&input.source, chrono::Local::now());
    let dir = artifact_dir(&config.output.dir, &stem, args.index);
    let artifacts = write_artifacts(&dir, &stem, &game, &analysis)?;

    match cli.command {
        Commands::Table(_) => {
            let stdout = io::stdout();
            let color = !args.no_color && stdout.is_terminal();
            TableRenderer::new(stdout.lock())
                .with_color(color)
                .verbose(args.verbose)
                .player(args.color)
                .render(&analysis)?;
        }
        Commands::Chart(_) => {
            println!("{}", analysis.headers.summary());
            println!("Chart written to {}", artifacts.chart.display());
            println!("PGN written to {}", artifacts.pgn.display());
        }
        Commands::Interactive(_) => InteractiveRenderer::new().render(&analysis)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
