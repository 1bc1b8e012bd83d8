//! Efficiency reward.
//!
//! The only rewarded outcome is landing in `FC_0`: the packet just sent was
//! decodable and the context is fully synchronized. The reward is the payload
//! share of that packet, so cheaper headers earn more.

use crate::params::PacketLengths;
use crate::types::{Action, StateIndex, SystemState};

/// One `(a, s') -> r` fact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardEntry {
    pub action: Action,
    pub next: StateIndex,
    pub value: f64,
}

/// Reward facts; unlisted `(a, s')` pairs are worth zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTable {
    entries: Vec<RewardEntry>,
}

impl RewardTable {
    /// One entry per action for landing in `FC_0`, in IR, FO, SO order.
    pub fn efficiency(packets: &PacketLengths) -> Self {
        let synchronized = SystemState::FullContext(0).index();
        let entries = Action::ALL
            .into_iter()
            .map(|action| RewardEntry {
                action,
                next: synchronized,
                value: packets.efficiency(action),
            })
            .collect();
        Self { entries }
    }

    /// Facts in construction order.
    pub fn entries(&self) -> &[RewardEntry] {
        &self.entries
    }

    /// Reward for taking `action` and landing in `next`.
    pub fn reward(&self, action: Action, next: StateIndex) -> f64 {
        self.entries
            .iter()
            .find(|entry| entry.action == action && entry.next == next)
            .map_or(0.0, |entry| entry.value)
    }

    /// Groups facts by next state, preserving first-appearance order.
    ///
    /// Each group lists `(action, value)` pairs in construction order.
    pub fn by_next_state(&self) -> Vec<(StateIndex, Vec<(Action, f64)>)> {
        let mut groups: Vec<(StateIndex, Vec<(Action, f64)>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(next, _)| *next == entry.next) {
                Some((_, values)) => values.push((entry.action, entry.value)),
                None => groups.push((entry.next, vec![(entry.action, entry.value)])),
            }
        }
        groups
    }
}
