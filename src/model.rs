//! Model assembly.
//!
//! [`PomdpModel::build`] is the model builder: it composes channel derivation,
//! state-space enumeration, the transition, observation, and reward tables,
//! and the descriptive metadata into one immutable model. Construction is a
//! pure function of [`ModelParameters`]; building twice from the same
//! parameters yields identical models.

use tracing::debug;

use crate::channel::ChannelProbabilities;
use crate::observation::ObservationTable;
use crate::params::{ModelParameters, ObservabilityMode};
use crate::reward::RewardTable;
use crate::transition::TransitionTable;
use crate::types::{ChannelState, StateSpace, SystemState};

/// Complete in-memory POMDP description of the ROHC link.
#[derive(Debug, Clone, PartialEq)]
pub struct PomdpModel {
    parameters: ModelParameters,
    description: String,
    state_space: StateSpace,
    initial_belief: Vec<f64>,
    transitions: TransitionTable,
    observations: Option<ObservationTable>,
    rewards: RewardTable,
}

impl PomdpModel {
    /// Builds the model from validated parameters.
    pub fn build(parameters: &ModelParameters) -> Self {
        let channel = parameters.channel_probabilities();
        debug!(
            p_bb = channel.bad_to_bad,
            p_bg = channel.bad_to_good,
            p_gb = channel.good_to_bad,
            p_gg = channel.good_to_good,
            "derived channel chain"
        );

        let state_space = parameters.state_space();
        debug!(states = state_space.len(), "enumerated state space");

        let transitions = TransitionTable::build(&state_space, &channel);
        let observations = match parameters.mode() {
            ObservabilityMode::FullyObservable => None,
            ObservabilityMode::PartiallyObservable {
                false_alarm,
                miss_detection,
            } => Some(ObservationTable::build(
                &state_space,
                false_alarm,
                miss_detection,
            )),
        };
        let rewards = RewardTable::efficiency(&parameters.packets());

        Self {
            parameters: *parameters,
            description: describe(parameters),
            initial_belief: initial_belief(&state_space, parameters.channel().erasure_rate),
            state_space,
            transitions,
            observations,
            rewards,
        }
    }

    /// Parameters the model was built from.
    pub const fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    /// Free-text parameter summary.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Discount factor.
    pub const fn discount(&self) -> f64 {
        self.parameters.discount()
    }

    /// Observability mode.
    pub const fn mode(&self) -> ObservabilityMode {
        self.parameters.mode()
    }

    /// Derived channel chain.
    pub const fn channel(&self) -> ChannelProbabilities {
        self.parameters.channel_probabilities()
    }

    /// Joint state space.
    pub const fn state_space(&self) -> &StateSpace {
        &self.state_space
    }

    /// Initial belief over the state space.
    pub fn initial_belief(&self) -> &[f64] {
        &self.initial_belief
    }

    /// Transition function.
    pub const fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Observation function; `None` in fully observable mode.
    pub const fn observations(&self) -> Option<&ObservationTable> {
        self.observations.as_ref()
    }

    /// Reward function.
    pub const fn rewards(&self) -> &RewardTable {
        &self.rewards
    }
}

/// No context yet; channel bad with probability `EPS`.
fn initial_belief(space: &StateSpace, erasure_rate: f64) -> Vec<f64> {
    let mut belief = vec![0.0; space.len()];
    belief[SystemState::NoContext(ChannelState::Bad).index().as_usize()] = erasure_rate;
    belief[SystemState::NoContext(ChannelState::Good).index().as_usize()] = 1.0 - erasure_rate;
    belief
}

fn describe(parameters: &ModelParameters) -> String {
    let channel = parameters.channel();
    let estimator = match parameters.mode() {
        ObservabilityMode::FullyObservable => "fully observable channel".to_string(),
        ObservabilityMode::PartiallyObservable {
            false_alarm,
            miss_detection,
        } => format!("P_FA = {false_alarm}, P_MD = {miss_detection}"),
    };
    format!(
        "Cross-layer ROHC design problem using estimated channel state. \
         W = {}; L_B = {}, EPS = {}; {}; gamma = {}.",
        parameters.window(),
        channel.mean_bad_sojourn,
        channel.erasure_rate,
        estimator,
        parameters.discount()
    )
}
