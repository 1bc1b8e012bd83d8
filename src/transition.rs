//! State-transition function of the coupled channel/context model.
//!
//! The relation is assembled from two layers of facts:
//!
//! 1. the baseline layer, keyed by `*`, which holds for every action and
//!    captures the channel-driven half of the dynamics (including the window
//!    cutoff of full context);
//! 2. one layer per action, covering what a good channel use achieves from the
//!    no-context and static-context tiers with that packet type.
//!
//! [`TransitionTable`] keeps the ordered facts for serialization and indexes
//! them by origin. A row for a concrete action is resolved on demand by
//! applying the matching facts of that origin in order, so the baseline layer
//! holds for every action and each action layer sits on top. Each origin has
//! at most five facts, which keeps the table linear in the window.

use tracing::debug;

use crate::channel::ChannelProbabilities;
use crate::constants::PROBABILITY_TOLERANCE;
use crate::types::{Action, ActionPattern, ChannelState, StateIndex, StateSpace, SystemState};

/// One `(s, a, s') -> p` fact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEntry {
    pub from: StateIndex,
    pub action: ActionPattern,
    pub to: StateIndex,
    pub probability: f64,
}

/// Unified transition table: ordered facts plus a per-origin index into them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    entries: Vec<TransitionEntry>,
    /// Positions in `entries` of the facts leaving each origin, in insertion order.
    by_origin: Vec<Vec<usize>>,
}

impl TransitionTable {
    fn new(state_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            by_origin: vec![Vec::new(); state_count],
        }
    }

    /// Builds the full table for `space` under the channel chain `channel`.
    pub fn build(space: &StateSpace, channel: &ChannelProbabilities) -> Self {
        let mut table = Self::new(space.len());
        add_baseline_layer(&mut table, space, channel);
        let baseline_len = table.entries.len();
        for action in Action::ALL {
            add_action_layer(&mut table, action, channel);
        }
        debug!(
            baseline_entries = baseline_len,
            action_entries = table.entries.len() - baseline_len,
            "built transition table"
        );
        table
    }

    /// Records a fact. A later fact for the same `(s, a, s')` replaces the earlier value.
    fn insert(
        &mut self,
        from: SystemState,
        action: ActionPattern,
        to: SystemState,
        probability: f64,
    ) {
        let entry = TransitionEntry {
            from: from.index(),
            action,
            to: to.index(),
            probability,
        };
        debug_assert!(entry.from.as_usize() < self.state_count());
        debug_assert!(entry.to.as_usize() < self.state_count());

        let position = self.entries.len();
        if let Some(facts) = self.by_origin.get_mut(entry.from.as_usize()) {
            facts.push(position);
            self.entries.push(entry);
        }
    }

    /// Number of states the table ranges over.
    pub fn state_count(&self) -> usize {
        self.by_origin.len()
    }

    /// Facts in construction order.
    pub fn entries(&self) -> &[TransitionEntry] {
        &self.entries
    }

    /// `P(to | from, action)`; zero for unlisted transitions.
    pub fn probability(&self, from: StateIndex, action: Action, to: StateIndex) -> f64 {
        self.distribution(from, action)
            .into_iter()
            .find(|(next, _)| *next == to)
            .map_or(0.0, |(_, p)| p)
    }

    /// Listed next states of `(from, action)` with their probabilities, in first-listed order.
    ///
    /// Unlisted next states have probability zero. Empty if `from` is out of range.
    pub fn distribution(&self, from: StateIndex, action: Action) -> Vec<(StateIndex, f64)> {
        let mut row: Vec<(StateIndex, f64)> = Vec::new();
        let Some(positions) = self.by_origin.get(from.as_usize()) else {
            return row;
        };
        let facts = positions
            .iter()
            .filter_map(|position| self.entries.get(*position))
            .filter(|entry| entry.action.matches(action));
        for entry in facts {
            match row.iter_mut().find(|(next, _)| *next == entry.to) {
                Some(slot) => slot.1 = entry.probability,
                None => row.push((entry.to, entry.probability)),
            }
        }
        row
    }

    /// Total outgoing probability of `(from, action)`.
    pub fn row_sum(&self, from: StateIndex, action: Action) -> f64 {
        self.distribution(from, action).iter().map(|(_, p)| p).sum()
    }

    /// Whether every `(s, a)` row sums to one.
    pub fn is_row_stochastic(&self) -> bool {
        (0..self.state_count()).all(|from| {
            Action::ALL.into_iter().all(|action| {
                (self.row_sum(StateIndex::new(from), action) - 1.0).abs() < PROBABILITY_TOLERANCE
            })
        })
    }
}

/// Action-independent dynamics, keyed with the `*` action.
fn add_baseline_layer(
    table: &mut TransitionTable,
    space: &StateSpace,
    channel: &ChannelProbabilities,
) {
    use ChannelState::{Bad, Good};
    use SystemState::{FullContext, NoContext, StaticContext};
    let any = ActionPattern::Any;

    table.insert(NoContext(Bad), any, NoContext(Bad), channel.bad_to_bad);
    table.insert(NoContext(Good), any, NoContext(Bad), channel.good_to_bad);
    table.insert(FullContext(0), any, FullContext(0), channel.good_to_good);
    table.insert(FullContext(0), any, space.degrade(0), channel.good_to_bad);
    table.insert(StaticContext(Bad), any, StaticContext(Bad), channel.bad_to_bad);
    table.insert(StaticContext(Good), any, StaticContext(Bad), channel.good_to_bad);

    for depth in 1..space.window() {
        table.insert(FullContext(depth), any, FullContext(0), channel.bad_to_good);
    }
    // Increments FC_w -> FC_{w+1}, ending with the cutoff FC_{W-1} -> SC_B.
    for depth in 1..space.window() {
        table.insert(
            FullContext(depth),
            any,
            space.degrade(depth),
            channel.bad_to_bad,
        );
    }
}

/// Where a good channel use leads from a lower-tier state when sending `action`.
///
/// Returns `None` for full-context origins, whose dynamics are action independent.
pub fn resynchronization_target(origin: SystemState, action: Action) -> Option<SystemState> {
    let target = match (origin, action) {
        (SystemState::NoContext(_), Action::Ir) => SystemState::FullContext(0),
        (SystemState::NoContext(_), Action::Fo | Action::So) => {
            SystemState::NoContext(ChannelState::Good)
        }
        (SystemState::StaticContext(_), Action::Ir | Action::Fo) => SystemState::FullContext(0),
        (SystemState::StaticContext(_), Action::So) => {
            SystemState::StaticContext(ChannelState::Good)
        }
        (SystemState::FullContext(_), _) => return None,
    };
    Some(target)
}

/// Dynamics specific to `action`, from each lower-tier origin.
fn add_action_layer(table: &mut TransitionTable, action: Action, channel: &ChannelProbabilities) {
    for origin in StateSpace::LOWER_TIERS {
        if let Some(target) = resynchronization_target(origin, action) {
            table.insert(
                origin,
                ActionPattern::Only(action),
                target,
                channel.to_good(origin.channel()),
            );
        }
    }
}
