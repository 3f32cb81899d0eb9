//! Batch driver: solve a game read from standard input.
//!
//! Usage:
//!   simpdiv [OPTIONS] < game.nfg
//!
//! Prints one `NE,...` line per starting point. With `-v`, the starting
//! profile and the answer of every refinement pass are printed too, labelled
//! `start` and by mesh size.

use std::fs;
use std::io::{self, Read};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use simpdiv::games::read_game;
use simpdiv::nash::config::DEFAULT_LEASH_LENGTH;
use simpdiv::nash::start::{pure_start, random_start};
use simpdiv::nash::{MixedProfile, ProfileDisplay, SimpdivConfig, SimpdivSolver, StrategicGame};

/// Compute Nash equilibria using simplicial subdivision.
///
/// Accepts a strategic game on standard input, either as an .nfg file or
/// as JSON. With no options, computes one approximate Nash equilibrium.
#[derive(Parser, Debug)]
#[command(name = "simpdiv")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show equilibria as floating point with DECIMALS digits
    #[arg(short = 'd', value_name = "DECIMALS")]
    decimals: Option<usize>,

    /// Granularity of grid refinement at each step
    #[arg(short = 'g', value_name = "MULT", default_value_t = 2)]
    grid_resize: u32,

    /// Generate random starting points with denominator DENOM
    #[arg(short = 'r', value_name = "DENOM")]
    random_denom: Option<NonZeroU32>,

    /// Number of starting points to generate
    #[arg(short = 'n', value_name = "COUNT", requires = "random_denom")]
    count: Option<u32>,

    /// File containing starting points, one per line
    #[arg(short = 's', value_name = "FILE")]
    start_file: Option<PathBuf>,

    /// Quiet mode (suppresses banner and progress)
    #[arg(short = 'q')]
    quiet: bool,

    /// Verbose mode (shows intermediate output)
    #[arg(short = 'v')]
    verbose: bool,

    /// Seed for random starting points
    #[arg(long)]
    seed: Option<u64>,

    /// Leash length of the pivot path
    #[arg(long, default_value_t = DEFAULT_LEASH_LENGTH)]
    leash: u32,

    /// Cap on label evaluations per refinement pass
    #[arg(long, value_name = "N")]
    max_pivots: Option<u64>,

    /// Wall-clock limit per starting point, in seconds
    #[arg(long, value_name = "SECS")]
    time_limit: Option<f64>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_logging(cli.verbose);

    if !cli.quiet {
        eprintln!("Compute Nash equilibria using simplicial subdivision");
        eprintln!("simpdiv version {}", env!("CARGO_PKG_VERSION"));
        eprintln!();
    }

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error reading game: {}", e);
        return ExitCode::from(1);
    }
    let game = match read_game(&input) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error reading game: {}", e);
            return ExitCode::from(1);
        }
    };

    let mut config = SimpdivConfig::default()
        .with_grid_resize(cli.grid_resize)
        .with_leash_length(cli.leash);
    if let Some(max) = cli.max_pivots {
        config = config.with_max_pivots_per_pass(max);
    }
    if let Some(secs) = cli.time_limit {
        config = config.with_time_limit(secs);
    }
    let solver = match SimpdivSolver::new(game, config) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("Invalid options: {}", e);
            return ExitCode::from(1);
        }
    };

    let display = cli
        .decimals
        .map_or(ProfileDisplay::Rational, ProfileDisplay::Decimal);

    let starts = if let Some(path) = &cli.start_file {
        match read_start_file(path, &solver.game().shape()) {
            Ok(starts) => starts,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        }
    } else if let Some(denom) = cli.random_denom {
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        (0..cli.count.unwrap_or(1))
            .map(|_| random_start(solver.game(), denom, &mut rng))
            .collect()
    } else {
        vec![pure_start(solver.game())]
    };

    let progress = if cli.random_denom.is_some() && cli.start_file.is_none() && !cli.quiet {
        restart_progress(starts.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    for start in &starts {
        if cli.verbose {
            emit(&progress, start.to_line("start", display));
        }
        let result = solver.solve_with_callback(start, |report| {
            if cli.verbose {
                emit(&progress, report.profile.to_line(&report.mesh.to_string(), display));
            }
            true
        });
        match result {
            Ok(result) => emit(&progress, result.profile.to_line("NE", display)),
            Err(e) => log::error!("cannot solve from {}: {}", start, e),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn restart_progress(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} restarts")
    {
        progress.set_style(style);
    }
    progress
}

/// Print a profile line without tearing the progress bar.
fn emit(progress: &ProgressBar, line: String) {
    progress.suspend(|| println!("{}", line));
}

/// Read starting points, warning about and skipping bad lines.
fn read_start_file(path: &Path, shape: &[usize]) -> io::Result<Vec<MixedProfile>> {
    let content = fs::read_to_string(path)?;
    let mut starts = Vec::new();
    for (line, parsed) in MixedProfile::parse_lines(shape, &content) {
        match parsed {
            Ok(start) => starts.push(start),
            Err(e) => log::warn!(
                "{}:{}: skipping starting point: {}",
                path.display(),
                line,
                e
            ),
        }
    }
    Ok(starts)
}
