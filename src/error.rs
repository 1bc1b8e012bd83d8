//! Error types for model construction, serialization, and policy handling.
//!
//! Model construction is a pure function of its inputs, so every failure it can
//! report is a caller input error ([`ParameterError`]). Everything else in the
//! crate (writing documents, reading solver policies, tracking beliefs) has its
//! own error type, and [`RohcPomdpError`] consolidates them for callers that do
//! not care which stage failed. The `thiserror` crate is used for ergonomic
//! error definitions.

use thiserror::Error;

use crate::types::Action;

/// Invalid physical or model parameters, detected before any table is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// The WLSB window capability must allow at least one loss.
    #[error("Window capability must be at least 1, got {window}")]
    WindowTooSmall { window: u32 },

    /// The mean bad-sojourn length must be a positive, finite number of channel uses.
    #[error("Mean bad-sojourn length must be positive and finite, got {mean_bad_sojourn}")]
    MeanBadSojournNotPositive { mean_bad_sojourn: f64 },

    /// The average erasure probability must lie strictly between 0 and 1.
    #[error("Average erasure probability must lie in (0, 1), got {erasure_rate}")]
    ErasureRateOutOfRange { erasure_rate: f64 },

    /// A derived Gilbert-Elliott transition probability fell outside `[0, 1]`.
    #[error("Derived channel probability {name} = {value} is outside [0, 1]")]
    ChannelProbabilityOutOfRange { name: &'static str, value: f64 },

    /// The discount factor must lie in `(0, 1]`.
    #[error("Discount factor must lie in (0, 1], got {discount}")]
    DiscountOutOfRange { discount: f64 },

    /// A channel estimator error rate fell outside `[0, 1]`.
    #[error("Estimator probability {name} must lie in [0, 1], got {value}")]
    EstimatorProbabilityOutOfRange { name: &'static str, value: f64 },

    /// Only one of the false-alarm / miss-detection pair was supplied.
    #[error("Estimator probabilities must be supplied together: {missing} is missing")]
    IncompleteEstimatorPair { missing: &'static str },

    /// A packet whose header and payload are both empty has no defined efficiency.
    #[error("Total packet length for {action} is zero")]
    ZeroLengthPacket { action: Action },
}

/// Errors raised while rendering or persisting a model document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// The XML writer rejected an event.
    #[error("XML writer error: {0}")]
    Xml(String),

    /// The destination could not be written.
    #[error("I/O error writing {path}: {description}")]
    Io { path: String, description: String },
}

/// Errors raised while loading a solver policy file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The policy document is not well-formed XML.
    #[error("Malformed policy document: {0}")]
    Xml(String),

    /// A `Vector` element has no `action` attribute.
    #[error("Alpha vector {vector} has no action attribute")]
    MissingAction { vector: usize },

    /// An `action` attribute does not name one of the three packet types.
    #[error("Alpha vector {vector} has unknown action '{action}'")]
    UnknownAction { vector: usize, action: String },

    /// A vector component is not a number.
    #[error("Alpha vector {vector} has malformed value '{value}'")]
    MalformedValue { vector: usize, value: String },

    /// The policy has no vectors at all.
    #[error("Policy document contains no alpha vectors")]
    Empty,

    /// A vector does not match the dimension of the belief it is evaluated against.
    #[error("Alpha vector {vector} has {actual} values, belief has {expected} states")]
    DimensionMismatch {
        vector: usize,
        expected: usize,
        actual: usize,
    },

    /// The policy file could not be read.
    #[error("I/O error reading {path}: {description}")]
    Io { path: String, description: String },
}

/// Errors raised by belief-state operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeliefError {
    /// Belief has the wrong number of components for the model.
    #[error("Belief has {actual} components, model has {expected} states")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Belief components are not a probability distribution.
    #[error("Belief is not a probability distribution (sum = {sum})")]
    NotADistribution { sum: f64 },

    /// The observation has zero probability under the predicted belief.
    #[error("Observation {observation} is impossible under the predicted belief")]
    ZeroEvidence { observation: &'static str },

    /// The model was built fully observable and carries no observation function.
    #[error("Model is fully observable and has no observation function")]
    ObservationUnavailable,
}

/// Errors raised while loading a scenario configuration file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The scenario file could not be read.
    #[error("I/O error reading {path}: {description}")]
    Io { path: String, description: String },

    /// The scenario file is not valid JSON for a scenario.
    #[error("Invalid scenario file {path}: {description}")]
    Parse { path: String, description: String },
}

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RohcPomdpError {
    /// Invalid model parameters.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    /// Failure while writing the model document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Failure while loading a solver policy.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Failure while tracking a belief.
    #[error("Belief error: {0}")]
    Belief(#[from] BeliefError),

    /// Failure while loading a scenario file.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
