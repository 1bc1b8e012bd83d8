//! Core library for the ROHC link simulator.
//!
//! Monte-Carlo counterpart of the `rohc-pomdp` model: a seeded Gilbert-Elliott
//! channel, a noisy channel estimator, the U-mode decompressor context
//! automaton, and pluggable compressor strategies. One [`Simulator::run`] plays
//! a single session and returns its [`SessionSummary`].
//!
//! Each packet goes through the same steps as one model transition: the
//! compressor picks a packet type, the channel advances to the next use, the
//! decompressor processes the packet under that channel state, and the
//! compressor receives an estimator reading of the same channel use.

pub mod channel;
pub mod compressor;
pub mod decompressor;
pub mod summary;

use rohc_pomdp::{
    Action, BeliefError, ChannelState, ModelParameters, ObservabilityMode, PolicyError,
    RohcPomdpError,
};
use thiserror::Error;
use tracing::{debug, trace};

pub use channel::{ChannelEstimator, GilbertElliottChannel};
pub use compressor::{Compressor, PomdpCompressor, TimerCompressor};
pub use decompressor::{ContextState, Decompressor};
pub use summary::SessionSummary;

/// Default packets sent before the timer compressor leaves IR.
pub const DEFAULT_IR_TO_SO: u32 = 3;
/// Default SO packets between FO refreshes of the timer compressor.
pub const DEFAULT_SO_TO_FO: u32 = 16;
/// Default FO packets per refresh of the timer compressor.
pub const DEFAULT_FO_TO_SO: u32 = 2;

/// Configuration for one simulated session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub seed: u64,
    pub num_packets: usize,
    pub parameters: ModelParameters,
}

impl SimConfig {
    pub const fn new(seed: u64, num_packets: usize, parameters: ModelParameters) -> Self {
        Self {
            seed,
            num_packets,
            parameters,
        }
    }

    /// Estimator error rates; a fully observable scenario reads the channel perfectly.
    pub const fn estimator_rates(&self) -> (f64, f64) {
        match self.parameters.mode() {
            ObservabilityMode::FullyObservable => (0.0, 0.0),
            ObservabilityMode::PartiallyObservable {
                false_alarm,
                miss_detection,
            } => (false_alarm, miss_detection),
        }
    }
}

/// Errors that can occur during a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The compressor's policy could not be evaluated.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// The compressor's belief could not be updated.
    #[error("Belief error: {0}")]
    Belief(#[from] BeliefError),

    /// The scenario or model could not be prepared.
    #[error("Model error: {0}")]
    Model(#[from] RohcPomdpError),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    /// A report file could not be written.
    #[error("I/O error writing {path}: {description}")]
    Io { path: String, description: String },
}

/// Orchestrates a single seeded session.
pub struct Simulator<C: Compressor> {
    config: SimConfig,
    channel: GilbertElliottChannel,
    estimator: ChannelEstimator,
    decompressor: Decompressor,
    compressor: C,
    packets: Vec<Action>,
    channel_log: Vec<ChannelState>,
}

impl<C: Compressor> Simulator<C> {
    /// Creates a session for `compressor` under `config`.
    pub fn new(config: SimConfig, compressor: C) -> Self {
        let parameters = config.parameters;
        let (false_alarm, miss_detection) = config.estimator_rates();
        Self {
            channel: GilbertElliottChannel::new(config.seed, parameters.channel_probabilities()),
            estimator: ChannelEstimator::new(
                config.seed.wrapping_add(1),
                false_alarm,
                miss_detection,
            ),
            decompressor: Decompressor::new(parameters.window()),
            compressor,
            packets: Vec::with_capacity(config.num_packets),
            channel_log: Vec::with_capacity(config.num_packets),
            config,
        }
    }

    /// Packet types sent in the last run.
    pub fn packets(&self) -> &[Action] {
        &self.packets
    }

    /// Channel state of every packet in the last run.
    pub fn channel_log(&self) -> &[ChannelState] {
        &self.channel_log
    }

    pub fn decompressor(&self) -> &Decompressor {
        &self.decompressor
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Runs the session from a fresh compressor and decompressor.
    ///
    /// # Errors
    /// - [`SimError::Policy`] - the compressor could not evaluate its policy
    /// - [`SimError::Belief`] - the compressor could not absorb a reading
    pub fn run(&mut self) -> Result<SessionSummary, SimError> {
        self.compressor.reset();
        self.decompressor.reset();
        self.packets.clear();
        self.channel_log.clear();

        for index in 0..self.config.num_packets {
            let action = self.compressor.transmit()?;
            let state = self.channel.step();
            let decoded = self.decompressor.receive(state, action);
            let observation = self.estimator.read(state);
            self.compressor.observe(action, observation)?;
            trace!(
                index,
                %action,
                ?state,
                ?observation,
                decoded,
                context = ?self.decompressor.state(),
                "packet"
            );
            self.packets.push(action);
            self.channel_log.push(state);
        }

        let summary = SessionSummary::from_session(
            &self.packets,
            &self.channel_log,
            self.decompressor.log(),
            &self.config.parameters.packets(),
        );
        debug!(
            compressor = self.compressor.name(),
            seed = self.config.seed,
            efficiency = summary.final_efficiency(),
            "session finished"
        );
        Ok(summary)
    }
}
