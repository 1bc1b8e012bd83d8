//! Validated model parameters and scenario configuration.
//!
//! [`ModelParameters`] is the only way into the model builder: constructing one
//! runs every input check, so a value of this type always describes a model
//! that can be built. [`ScenarioConfig`] is the loose, serializable form read
//! from JSON files and CLI flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::channel::{ChannelParameters, ChannelProbabilities};
use crate::constants::{
    DEFAULT_DISCOUNT, DEFAULT_ERASURE_RATE, DEFAULT_FALSE_ALARM, DEFAULT_HEADER_FO,
    DEFAULT_HEADER_IR, DEFAULT_HEADER_SO, DEFAULT_MEAN_BAD_SOJOURN, DEFAULT_MISS_DETECTION,
    DEFAULT_PAYLOAD, DEFAULT_WINDOW,
};
use crate::error::{ConfigError, ParameterError};
use crate::types::{Action, StateSpace};

/// Header lengths per packet type plus the common payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketLengths {
    pub header_ir: u32,
    pub header_fo: u32,
    pub header_so: u32,
    pub payload: u32,
}

impl PacketLengths {
    /// Header length of `action`.
    pub const fn header(&self, action: Action) -> u32 {
        match action {
            Action::Ir => self.header_ir,
            Action::Fo => self.header_fo,
            Action::So => self.header_so,
        }
    }

    /// Total packet length of `action`, header plus payload.
    pub const fn total(&self, action: Action) -> u64 {
        self.header(action) as u64 + self.payload as u64
    }

    /// Payload share of the packet sent with `action`.
    ///
    /// Only meaningful after [`Self::validate`]; a zero total yields `NaN`.
    pub fn efficiency(&self, action: Action) -> f64 {
        self.payload as f64 / self.total(action) as f64
    }

    /// Rejects packet types whose total length is zero.
    pub fn validate(&self) -> Result<(), ParameterError> {
        match Action::ALL.into_iter().find(|action| self.total(*action) == 0) {
            Some(action) => Err(ParameterError::ZeroLengthPacket { action }),
            None => Ok(()),
        }
    }
}

/// Whether the compressor sees the channel directly or through a noisy estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObservabilityMode {
    /// The joint state is observed; no observation function is emitted.
    FullyObservable,
    /// The channel bit is read through an estimator with the given error rates.
    PartiallyObservable {
        /// Probability of reading bad while the channel is good.
        false_alarm: f64,
        /// Probability of reading good while the channel is bad.
        miss_detection: f64,
    },
}

impl ObservabilityMode {
    /// Chooses the mode from the optional estimator pair.
    ///
    /// Both absent selects [`ObservabilityMode::FullyObservable`]; both present
    /// selects [`ObservabilityMode::PartiallyObservable`].
    ///
    /// # Errors
    /// - [`ParameterError::IncompleteEstimatorPair`] - exactly one of the pair is present
    /// - [`ParameterError::EstimatorProbabilityOutOfRange`] - a rate outside `[0, 1]`
    pub fn from_estimator(
        false_alarm: Option<f64>,
        miss_detection: Option<f64>,
    ) -> Result<Self, ParameterError> {
        match (false_alarm, miss_detection) {
            (None, None) => Ok(ObservabilityMode::FullyObservable),
            (Some(_), None) => Err(ParameterError::IncompleteEstimatorPair {
                missing: "miss-detection probability",
            }),
            (None, Some(_)) => Err(ParameterError::IncompleteEstimatorPair {
                missing: "false-alarm probability",
            }),
            (Some(false_alarm), Some(miss_detection)) => {
                check_unit_interval("P_FA", false_alarm)?;
                check_unit_interval("P_MD", miss_detection)?;
                Ok(ObservabilityMode::PartiallyObservable {
                    false_alarm,
                    miss_detection,
                })
            }
        }
    }

    /// Whether the state variable is directly observed.
    pub const fn is_fully_observable(&self) -> bool {
        matches!(self, ObservabilityMode::FullyObservable)
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParameterError::EstimatorProbabilityOutOfRange { name, value })
    }
}

/// Fully validated inputs of the model builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParameters {
    #[serde(flatten)]
    state_space: StateSpace,
    channel: ChannelParameters,
    channel_probabilities: ChannelProbabilities,
    discount: f64,
    packets: PacketLengths,
    mode: ObservabilityMode,
}

impl ModelParameters {
    /// Validates the inputs and derives the channel chain.
    ///
    /// All checks run here, before any table is constructed.
    ///
    /// # Errors
    /// - [`ParameterError::WindowTooSmall`] - `window == 0`
    /// - any channel derivation error from [`ChannelParameters::derive`]
    /// - [`ParameterError::DiscountOutOfRange`] - discount outside `(0, 1]`
    /// - [`ParameterError::ZeroLengthPacket`] - a packet type with zero total length
    pub fn new(
        window: u32,
        channel: ChannelParameters,
        discount: f64,
        packets: PacketLengths,
        mode: ObservabilityMode,
    ) -> Result<Self, ParameterError> {
        let state_space = StateSpace::new(window)?;
        let channel_probabilities = channel.derive()?;
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(ParameterError::DiscountOutOfRange { discount });
        }
        packets.validate()?;
        // Re-check the rates so a hand-built mode cannot bypass validation.
        if let ObservabilityMode::PartiallyObservable {
            false_alarm,
            miss_detection,
        } = mode
        {
            check_unit_interval("P_FA", false_alarm)?;
            check_unit_interval("P_MD", miss_detection)?;
        }

        Ok(Self {
            state_space,
            channel,
            channel_probabilities,
            discount,
            packets,
            mode,
        })
    }

    /// WLSB window capability `W`.
    pub const fn window(&self) -> u32 {
        self.state_space.window()
    }

    /// Joint state space for the window capability.
    pub const fn state_space(&self) -> StateSpace {
        self.state_space
    }

    /// Physical channel description.
    pub const fn channel(&self) -> ChannelParameters {
        self.channel
    }

    /// Derived channel chain.
    pub const fn channel_probabilities(&self) -> ChannelProbabilities {
        self.channel_probabilities
    }

    /// Discount factor `GAMMA`.
    pub const fn discount(&self) -> f64 {
        self.discount
    }

    /// Packet lengths.
    pub const fn packets(&self) -> PacketLengths {
        self.packets
    }

    /// Observability mode.
    pub const fn mode(&self) -> ObservabilityMode {
        self.mode
    }
}

/// Flat, serializable scenario description as read from a JSON file.
///
/// The estimator pair is optional; omitting both fields selects the fully
/// observable model.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub window: u32,
    pub mean_bad_sojourn: f64,
    pub erasure_rate: f64,
    pub discount: f64,
    pub header_ir: u32,
    pub header_fo: u32,
    pub header_so: u32,
    pub payload: u32,
    pub false_alarm: Option<f64>,
    pub miss_detection: Option<f64>,
}

impl Default for ScenarioConfig {
    /// The reference scenario: `W = 8`, `L_B = 8`, `EPS = 0.2`, headers 80/16/4,
    /// payload 20, estimator error rates 0.1 each.
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            mean_bad_sojourn: DEFAULT_MEAN_BAD_SOJOURN,
            erasure_rate: DEFAULT_ERASURE_RATE,
            discount: DEFAULT_DISCOUNT,
            header_ir: DEFAULT_HEADER_IR,
            header_fo: DEFAULT_HEADER_FO,
            header_so: DEFAULT_HEADER_SO,
            payload: DEFAULT_PAYLOAD,
            false_alarm: Some(DEFAULT_FALSE_ALARM),
            miss_detection: Some(DEFAULT_MISS_DETECTION),
        }
    }
}

impl ScenarioConfig {
    /// Loads a scenario from a JSON file.
    ///
    /// # Errors
    /// - [`ConfigError::Io`] - the file cannot be read
    /// - [`ConfigError::Parse`] - the file is not a valid scenario
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            description: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            description: e.to_string(),
        })
    }

    /// Packet lengths of this scenario.
    pub const fn packets(&self) -> PacketLengths {
        PacketLengths {
            header_ir: self.header_ir,
            header_fo: self.header_fo,
            header_so: self.header_so,
            payload: self.payload,
        }
    }

    /// Validates the scenario into builder parameters.
    pub fn to_parameters(&self) -> Result<ModelParameters, ParameterError> {
        let mode = ObservabilityMode::from_estimator(self.false_alarm, self.miss_detection)?;
        ModelParameters::new(
            self.window,
            ChannelParameters::new(self.mean_bad_sojourn, self.erasure_rate),
            self.discount,
            self.packets(),
            mode,
        )
    }
}
