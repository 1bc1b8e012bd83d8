//! Compressor strategies.
//!
//! A compressor picks the packet type for every transmission and may learn
//! from the estimator reading that follows it. [`TimerCompressor`] is the
//! classic U-mode timeout scheme; [`PomdpCompressor`] tracks a belief over the
//! link model and follows a solved alpha-vector policy.

use std::sync::Arc;

use rohc_pomdp::{Action, AlphaVectorPolicy, Belief, Observation, PomdpModel};

use crate::SimError;

/// Packet-type decision maker on the sending side.
pub trait Compressor {
    /// Short label used in reports.
    fn name(&self) -> &str;

    /// Returns to the initial state, as when a new flow starts.
    fn reset(&mut self);

    /// Chooses the type of the next packet.
    fn transmit(&mut self) -> Result<Action, SimError>;

    /// Feeds back the estimator reading for the packet just sent as `action`.
    fn observe(&mut self, action: Action, observation: Observation) -> Result<(), SimError>;
}

/// Timeout-driven U-mode compressor.
///
/// Sends IR until `ir_to_so` packets have gone out, then alternates: SO for
/// `so_to_fo` packets, FO for `fo_to_so` packets, and so on.
#[derive(Debug, Clone)]
pub struct TimerCompressor {
    ir_to_so: u32,
    so_to_fo: u32,
    fo_to_so: u32,
    current: Action,
    timer: u32,
}

impl TimerCompressor {
    pub fn new(ir_to_so: u32, so_to_fo: u32, fo_to_so: u32) -> Self {
        Self {
            ir_to_so,
            so_to_fo,
            fo_to_so,
            current: Action::Ir,
            timer: 0,
        }
    }

    fn timeout(&self) -> (u32, Action) {
        match self.current {
            Action::Ir => (self.ir_to_so, Action::So),
            Action::So => (self.so_to_fo, Action::Fo),
            Action::Fo => (self.fo_to_so, Action::So),
        }
    }
}

impl Compressor for TimerCompressor {
    fn name(&self) -> &str {
        "timer"
    }

    fn reset(&mut self) {
        self.current = Action::Ir;
        self.timer = 0;
    }

    fn transmit(&mut self) -> Result<Action, SimError> {
        let sent = self.current;
        self.timer += 1;
        let (limit, next) = self.timeout();
        if self.timer >= limit {
            self.current = next;
            self.timer = 0;
        }
        Ok(sent)
    }

    fn observe(&mut self, _action: Action, _observation: Observation) -> Result<(), SimError> {
        Ok(())
    }
}

/// Belief-tracking compressor acting on a solved policy.
#[derive(Debug, Clone)]
pub struct PomdpCompressor {
    model: Arc<PomdpModel>,
    policy: Arc<AlphaVectorPolicy>,
    belief: Belief,
}

impl PomdpCompressor {
    /// # Errors
    /// - [`SimError::Belief`] - `model` is fully observable, so readings cannot be used
    /// - [`SimError::Policy`] - the policy's vectors do not match the model's state space
    pub fn new(model: Arc<PomdpModel>, policy: Arc<AlphaVectorPolicy>) -> Result<Self, SimError> {
        if model.observations().is_none() {
            return Err(rohc_pomdp::BeliefError::ObservationUnavailable.into());
        }
        let belief = Belief::initial(&model);
        policy.value(&belief)?;
        Ok(Self {
            model,
            policy,
            belief,
        })
    }

    pub fn belief(&self) -> &Belief {
        &self.belief
    }
}

impl Compressor for PomdpCompressor {
    fn name(&self) -> &str {
        "pomdp"
    }

    fn reset(&mut self) {
        self.belief = Belief::initial(&self.model);
    }

    fn transmit(&mut self) -> Result<Action, SimError> {
        Ok(self.policy.best_action(&self.belief)?)
    }

    fn observe(&mut self, action: Action, observation: Observation) -> Result<(), SimError> {
        self.belief = self.belief.update(&self.model, action, observation)?;
        Ok(())
    }
}
