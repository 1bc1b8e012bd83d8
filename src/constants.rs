//! Model-wide constants: POMDPX vocabulary and the reference scenario.
//!
//! The POMDPX names below are the external identifiers downstream solvers
//! expect; every other module refers to them through these constants.

// --- State Space Layout ---

/// Index of `FC_0`; full-context states follow the four lower-tier states.
pub const FULL_CONTEXT_BASE_INDEX: usize = 4;

// --- POMDPX Document ---

/// POMDPX format version written on the root element.
pub const POMDPX_VERSION: &str = "0.1";
/// Problem identifier written on the root element.
pub const POMDPX_PROBLEM_ID: &str = "ROHC";
/// Schema file referenced by `xsi:noNamespaceSchemaLocation`.
pub const POMDPX_SCHEMA_LOCATION: &str = "pomdpx.xsd";
/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// Encoding declared in the XML prolog.
pub const POMDPX_ENCODING: &str = "ISO-8859-1";

/// State variable name before a transition.
pub const STATE_VAR_PREV: &str = "state_0";
/// State variable name after a transition.
pub const STATE_VAR_CURR: &str = "state_1";
/// Observation variable name (estimated channel state).
pub const OBS_VAR: &str = "est_channel";
/// Action variable name (compression packet type).
pub const ACTION_VAR: &str = "type_compression";
/// Reward variable name.
pub const REWARD_VAR: &str = "efficiency";

/// POMDPX wildcard: the entry holds for every value of the slot.
pub const POMDPX_WILDCARD: &str = "*";
/// POMDPX enumeration marker: the table lists one value per value of the slot.
pub const POMDPX_ENUMERATE: &str = "-";
/// Parent of an unconditioned distribution.
pub const POMDPX_NULL_PARENT: &str = "null";
/// Parameter type for explicit tables.
pub const POMDPX_TABLE_TYPE: &str = "TBL";

/// Action value names, in enumeration order.
pub const ACTION_NAME_IR: &str = "IR";
pub const ACTION_NAME_FO: &str = "FO";
pub const ACTION_NAME_SO: &str = "SO";

/// Observation value names, in enumeration order.
pub const OBSERVATION_NAME_BAD: &str = "obad";
pub const OBSERVATION_NAME_GOOD: &str = "ogood";

// --- Numerics ---

/// Tolerance for "sums to one" checks on distributions.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

// --- Reference Scenario ---

/// WLSB window capability of the reference scenario.
pub const DEFAULT_WINDOW: u32 = 8;
/// Mean bad-sojourn length of the reference scenario (channel uses).
pub const DEFAULT_MEAN_BAD_SOJOURN: f64 = 8.0;
/// Average erasure probability of the reference scenario.
pub const DEFAULT_ERASURE_RATE: f64 = 0.2;
/// Discount factor of the reference scenario.
pub const DEFAULT_DISCOUNT: f64 = 0.95;
/// IR header length of the reference scenario.
pub const DEFAULT_HEADER_IR: u32 = 80;
/// FO header length of the reference scenario.
pub const DEFAULT_HEADER_FO: u32 = 16;
/// SO header length of the reference scenario.
pub const DEFAULT_HEADER_SO: u32 = 4;
/// Payload length of the reference scenario.
pub const DEFAULT_PAYLOAD: u32 = 20;
/// Estimator false-alarm probability of the reference scenario.
pub const DEFAULT_FALSE_ALARM: f64 = 0.1;
/// Estimator miss-detection probability of the reference scenario.
pub const DEFAULT_MISS_DETECTION: f64 = 0.1;
/// Output file name used when none is given.
pub const DEFAULT_OUTPUT_FILE: &str = "instance.pomdpx";
