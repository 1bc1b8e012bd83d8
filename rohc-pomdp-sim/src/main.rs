//! ROHC link simulator CLI.
//!
//! Runs many seeded sessions of the timer compressor, and of the POMDP
//! compressor when a solved policy is supplied, then prints the averaged
//! summaries. Session `i` of every compressor sees the same channel trace, so
//! the averages compare strategies on identical conditions.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rohc_pomdp::{Action, AlphaVectorPolicy, PomdpModel, RohcPomdpError, ScenarioConfig};
use rohc_pomdp_sim::summary::{efficiency_csv, fixed_type_efficiency};
use rohc_pomdp_sim::{
    Compressor, DEFAULT_FO_TO_SO, DEFAULT_IR_TO_SO, DEFAULT_SO_TO_FO, PomdpCompressor,
    SessionSummary, SimConfig, SimError, Simulator, TimerCompressor,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "ROHC link simulator", long_about = None)]
struct CliArgs {
    /// JSON scenario file; defaults to the reference scenario.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Solved alpha-vector policy for the POMDP compressor.
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Number of independent sessions per compressor.
    #[arg(short = 'n', long, default_value_t = 100)]
    sessions: usize,

    /// Packets per session.
    #[arg(short = 'p', long, default_value_t = 100)]
    packets: usize,

    /// Master seed for session seeds. Random if omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of parallel workers. Defaults to number of logical CPUs.
    #[arg(short = 'w', long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Packets sent as IR before the timer compressor switches to SO.
    #[arg(long, default_value_t = DEFAULT_IR_TO_SO)]
    ir_to_so: u32,

    /// SO packets between FO refreshes.
    #[arg(long, default_value_t = DEFAULT_SO_TO_FO)]
    so_to_fo: u32,

    /// FO packets per refresh.
    #[arg(long, default_value_t = DEFAULT_FO_TO_SO)]
    fo_to_so: u32,

    /// Write averaged per-packet efficiency curves to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
}

/// Runs one session per seed with a fresh compressor each, and averages them.
fn run_sessions<C, F>(
    seeds: &[u64],
    config: SimConfig,
    make_compressor: F,
) -> Result<SessionSummary, SimError>
where
    C: Compressor,
    F: Fn() -> Result<C, SimError> + Sync,
{
    let summaries: Vec<SessionSummary> = seeds
        .par_iter()
        .map(|seed| {
            let session = SimConfig { seed: *seed, ..config };
            Simulator::new(session, make_compressor()?).run()
        })
        .collect::<Result<_, _>>()?;

    let mut average = SessionSummary::default();
    for summary in &summaries {
        average.merge(summary);
    }
    average.normalize(summaries.len());
    Ok(average)
}

fn run(args: &CliArgs) -> Result<(), SimError> {
    let scenario = match &args.config {
        Some(path) => ScenarioConfig::from_path(path).map_err(RohcPomdpError::from)?,
        None => ScenarioConfig::default(),
    };
    let parameters = scenario.to_parameters().map_err(RohcPomdpError::from)?;
    let config = SimConfig::new(0, args.packets, parameters);

    let master_seed = args.seed.unwrap_or_else(rand::random);
    let mut seed_rng = StdRng::seed_from_u64(master_seed);
    let seeds: Vec<u64> = (0..args.sessions).map(|_| seed_rng.random()).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers.max(1))
        .build()
        .map_err(|e| SimError::WorkerPool(e.to_string()))?;

    println!(
        "[{}] Simulating {} sessions x {} packets on {} workers (master seed {}).",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        args.sessions,
        args.packets,
        args.workers.max(1),
        master_seed
    );
    let started = Instant::now();

    let mut results: Vec<(&str, SessionSummary)> = Vec::new();
    let timer = pool.install(|| {
        run_sessions(&seeds, config, || {
            Ok(TimerCompressor::new(args.ir_to_so, args.so_to_fo, args.fo_to_so))
        })
    })?;
    results.push(("timer", timer));

    if let Some(path) = &args.policy {
        let model = Arc::new(PomdpModel::build(&parameters));
        let policy = Arc::new(AlphaVectorPolicy::from_path(path)?);
        info!(vectors = policy.vectors().len(), "loaded policy");
        let pomdp = pool.install(|| {
            run_sessions(&seeds, config, || {
                PomdpCompressor::new(Arc::clone(&model), Arc::clone(&policy))
            })
        })?;
        results.push(("pomdp", pomdp));
    }

    for (name, summary) in &results {
        println!("\n[{name}]\n{summary}");
    }

    let good_probability = 1.0 - parameters.channel_probabilities().stationary_bad();
    println!("\nFixed-type references (no context loss):");
    for action in Action::ALL {
        println!(
            " - {action}: {:.4}",
            fixed_type_efficiency(&parameters.packets(), action, good_probability)
        );
    }
    println!("Completed in {:.2?}.", started.elapsed());

    if let Some(path) = &args.csv {
        let curves: Vec<(&str, &SessionSummary)> =
            results.iter().map(|(name, summary)| (*name, summary)).collect();
        fs::write(path, efficiency_csv(&curves)).map_err(|e| SimError::Io {
            path: path.display().to_string(),
            description: e.to_string(),
        })?;
        println!("Wrote efficiency curves to {}.", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
