//! POMDPX model generator CLI.
//!
//! Builds the ROHC link model for one scenario and writes it as a POMDPX
//! document. The scenario comes from flags, optionally seeded from a JSON
//! scenario file; flags given explicitly override the file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rohc_pomdp::constants::DEFAULT_OUTPUT_FILE;
use rohc_pomdp::{RohcPomdpError, ScenarioConfig, generate_pomdpx};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "ROHC POMDP model generator", long_about = None)]
struct CliArgs {
    /// Destination of the POMDPX document.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// JSON scenario file; explicit flags override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// WLSB window capability W.
    #[arg(short, long)]
    window: Option<u32>,

    /// Mean bad-sojourn length L_B, in channel uses.
    #[arg(long)]
    mean_bad_sojourn: Option<f64>,

    /// Average erasure probability EPS.
    #[arg(long)]
    erasure_rate: Option<f64>,

    /// Discount factor gamma.
    #[arg(long)]
    discount: Option<f64>,

    /// IR header length.
    #[arg(long)]
    header_ir: Option<u32>,

    /// FO header length.
    #[arg(long)]
    header_fo: Option<u32>,

    /// SO header length.
    #[arg(long)]
    header_so: Option<u32>,

    /// Payload length.
    #[arg(long)]
    payload: Option<u32>,

    /// Estimator false-alarm probability P_FA.
    #[arg(long)]
    false_alarm: Option<f64>,

    /// Estimator miss-detection probability P_MD.
    #[arg(long)]
    miss_detection: Option<f64>,

    /// Model the channel as directly observed (drops the estimator pair).
    #[arg(long, conflicts_with_all = ["false_alarm", "miss_detection"])]
    fully_observable: bool,
}

impl CliArgs {
    fn scenario(&self) -> Result<ScenarioConfig, RohcPomdpError> {
        let mut scenario = match &self.config {
            Some(path) => ScenarioConfig::from_path(path)?,
            None => ScenarioConfig::default(),
        };

        if let Some(window) = self.window {
            scenario.window = window;
        }
        if let Some(mean_bad_sojourn) = self.mean_bad_sojourn {
            scenario.mean_bad_sojourn = mean_bad_sojourn;
        }
        if let Some(erasure_rate) = self.erasure_rate {
            scenario.erasure_rate = erasure_rate;
        }
        if let Some(discount) = self.discount {
            scenario.discount = discount;
        }
        if let Some(header_ir) = self.header_ir {
            scenario.header_ir = header_ir;
        }
        if let Some(header_fo) = self.header_fo {
            scenario.header_fo = header_fo;
        }
        if let Some(header_so) = self.header_so {
            scenario.header_so = header_so;
        }
        if let Some(payload) = self.payload {
            scenario.payload = payload;
        }
        if self.fully_observable {
            scenario.false_alarm = None;
            scenario.miss_detection = None;
        }
        if self.false_alarm.is_some() {
            scenario.false_alarm = self.false_alarm;
        }
        if self.miss_detection.is_some() {
            scenario.miss_detection = self.miss_detection;
        }
        Ok(scenario)
    }
}

fn run(args: &CliArgs) -> Result<u32, RohcPomdpError> {
    let scenario = args.scenario()?;
    let parameters = scenario.to_parameters()?;
    generate_pomdpx(&args.output, &parameters)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(checksum) => {
            println!("Wrote {} (crc32 {checksum:08x})", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
