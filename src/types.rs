//! Core vocabulary of the ROHC link model.
//!
//! The joint state couples the decompressor's context level with the last
//! Gilbert-Elliott channel state. States are addressed positionally by every
//! table, so the index mapping lives here and nowhere else:
//!
//! | index     | state                  |
//! |-----------|------------------------|
//! | 0         | `NC_B`                 |
//! | 1         | `NC_G`                 |
//! | 2         | `SC_B`                 |
//! | 3         | `SC_G`                 |
//! | 4 + w     | `FC_w`, `0 <= w < W`   |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTION_NAME_FO, ACTION_NAME_IR, ACTION_NAME_SO, FULL_CONTEXT_BASE_INDEX, OBSERVATION_NAME_BAD,
    OBSERVATION_NAME_GOOD,
};
use crate::error::ParameterError;

/// Positional index of a joint state. Displays as the POMDPX value name (`s4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StateIndex(usize);

impl StateIndex {
    #[inline]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Index as a `usize` for table addressing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl PartialEq<usize> for StateIndex {
    #[inline]
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

/// Gilbert-Elliott channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    /// Erasure state.
    Bad,
    /// Delivery state.
    Good,
}

impl ChannelState {
    /// Short suffix used in state names (`B` / `G`).
    pub const fn suffix(self) -> &'static str {
        match self {
            ChannelState::Bad => "B",
            ChannelState::Good => "G",
        }
    }
}

/// Joint decompressor-context and channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemState {
    /// No decoding context.
    NoContext(ChannelState),
    /// Static header context only.
    StaticContext(ChannelState),
    /// Full context; the depth counts consecutive bad channel uses since the last good one.
    FullContext(u32),
}

impl SystemState {
    /// Channel state folded into this joint state. Only `FC_0` follows a good channel use.
    pub const fn channel(self) -> ChannelState {
        match self {
            SystemState::NoContext(channel) | SystemState::StaticContext(channel) => channel,
            SystemState::FullContext(0) => ChannelState::Good,
            SystemState::FullContext(_) => ChannelState::Bad,
        }
    }

    /// Positional index, independent of the window capability.
    pub const fn index(self) -> StateIndex {
        let raw = match self {
            SystemState::NoContext(ChannelState::Bad) => 0,
            SystemState::NoContext(ChannelState::Good) => 1,
            SystemState::StaticContext(ChannelState::Bad) => 2,
            SystemState::StaticContext(ChannelState::Good) => 3,
            SystemState::FullContext(depth) => FULL_CONTEXT_BASE_INDEX + depth as usize,
        };
        StateIndex(raw)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemState::NoContext(channel) => write!(f, "NC_{}", channel.suffix()),
            SystemState::StaticContext(channel) => write!(f, "SC_{}", channel.suffix()),
            SystemState::FullContext(depth) => write!(f, "FC_{}", depth),
        }
    }
}

/// The ordered joint state space for a given window capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StateSpace {
    window: u32,
}

impl StateSpace {
    /// No-context and static-context states, in positional order.
    pub const LOWER_TIERS: [SystemState; 4] = [
        SystemState::NoContext(ChannelState::Bad),
        SystemState::NoContext(ChannelState::Good),
        SystemState::StaticContext(ChannelState::Bad),
        SystemState::StaticContext(ChannelState::Good),
    ];

    /// Creates the state space for window capability `window`.
    ///
    /// # Errors
    /// - [`ParameterError::WindowTooSmall`] - `window == 0`; full context needs `FC_0`
    pub fn new(window: u32) -> Result<Self, ParameterError> {
        if window == 0 {
            return Err(ParameterError::WindowTooSmall { window });
        }
        Ok(Self { window })
    }

    /// WLSB window capability `W`.
    pub const fn window(&self) -> u32 {
        self.window
    }

    /// Number of states, `4 + W`.
    pub const fn len(&self) -> usize {
        FULL_CONTEXT_BASE_INDEX + self.window as usize
    }

    /// Always false; the lower tiers are present for every window.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `state` belongs to this space.
    pub const fn contains(&self, state: SystemState) -> bool {
        match state {
            SystemState::FullContext(depth) => depth < self.window,
            _ => true,
        }
    }

    /// Positional index of `state`, or `None` if its depth exceeds the window.
    pub fn index_of(&self, state: SystemState) -> Option<StateIndex> {
        self.contains(state).then(|| state.index())
    }

    /// State at `index`, or `None` past the end of the space.
    pub fn state_at(&self, index: StateIndex) -> Option<SystemState> {
        let raw = index.as_usize();
        if raw < FULL_CONTEXT_BASE_INDEX {
            return Some(Self::LOWER_TIERS[raw]);
        }
        if raw < self.len() {
            return Some(SystemState::FullContext((raw - FULL_CONTEXT_BASE_INDEX) as u32));
        }
        None
    }

    /// All states in positional order.
    pub fn iter(&self) -> impl Iterator<Item = SystemState> + '_ {
        Self::LOWER_TIERS
            .into_iter()
            .chain((0..self.window).map(SystemState::FullContext))
    }

    /// Full-context states with a nonzero loss run, `FC_1 .. FC_{W-1}`.
    pub fn desynchronizing(&self) -> impl Iterator<Item = SystemState> + '_ {
        (1..self.window).map(SystemState::FullContext)
    }

    /// States whose folded channel bit is bad, in the order the observation table lists them.
    pub fn bad_channel_states(&self) -> impl Iterator<Item = SystemState> + '_ {
        [
            SystemState::NoContext(ChannelState::Bad),
            SystemState::StaticContext(ChannelState::Bad),
        ]
        .into_iter()
        .chain(self.desynchronizing())
    }

    /// States whose folded channel bit is good, in the order the observation table lists them.
    pub fn good_channel_states(&self) -> impl Iterator<Item = SystemState> + '_ {
        [
            SystemState::NoContext(ChannelState::Good),
            SystemState::StaticContext(ChannelState::Good),
            SystemState::FullContext(0),
        ]
        .into_iter()
    }

    /// Successor of `FC_depth` after one more bad channel use.
    ///
    /// Full context survives up to `W - 1` consecutive losses; the `W`-th loss
    /// drops the decompressor to static context.
    pub const fn degrade(&self, depth: u32) -> SystemState {
        if depth + 1 < self.window {
            SystemState::FullContext(depth + 1)
        } else {
            SystemState::StaticContext(ChannelState::Bad)
        }
    }
}

/// ROHC packet type chosen by the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Initialization and refresh: carries the full header.
    Ir,
    /// First order: refreshes the dynamic part of the context.
    Fo,
    /// Second order: minimal header.
    So,
}

impl Action {
    /// All actions in POMDPX enumeration order.
    pub const ALL: [Action; 3] = [Action::Ir, Action::Fo, Action::So];

    /// Zero-based index, as used by solver policy files.
    pub const fn index(self) -> usize {
        match self {
            Action::Ir => 0,
            Action::Fo => 1,
            Action::So => 2,
        }
    }

    /// Action for a solver policy index.
    pub const fn from_index(index: usize) -> Option<Action> {
        match index {
            0 => Some(Action::Ir),
            1 => Some(Action::Fo),
            2 => Some(Action::So),
            _ => None,
        }
    }

    /// POMDPX value name.
    pub const fn name(self) -> &'static str {
        match self {
            Action::Ir => ACTION_NAME_IR,
            Action::Fo => ACTION_NAME_FO,
            Action::So => ACTION_NAME_SO,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action slot of a table fact: one specific action or any action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionPattern {
    /// Matches every action.
    Any,
    /// Matches a single action.
    Only(Action),
}

impl ActionPattern {
    /// Whether `action` falls under this pattern.
    pub const fn matches(self, action: Action) -> bool {
        match self {
            ActionPattern::Any => true,
            ActionPattern::Only(only) => only.index() == action.index(),
        }
    }
}

/// Noisy channel-state reading produced by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Observation {
    /// Estimator reports a bad channel.
    Bad,
    /// Estimator reports a good channel.
    Good,
}

impl Observation {
    /// All observations in POMDPX enumeration order.
    pub const ALL: [Observation; 2] = [Observation::Bad, Observation::Good];

    /// POMDPX value name.
    pub const fn name(self) -> &'static str {
        match self {
            Observation::Bad => OBSERVATION_NAME_BAD,
            Observation::Good => OBSERVATION_NAME_GOOD,
        }
    }
}

impl From<ChannelState> for Observation {
    fn from(channel: ChannelState) -> Self {
        match channel {
            ChannelState::Bad => Observation::Bad,
            ChannelState::Good => Observation::Good,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_index_displays_as_pomdpx_name() {
        assert_eq!(StateIndex::new(4).to_string(), "s4");
        assert_eq!(StateIndex::new(11), 11usize);
    }

    #[test]
    fn positional_order_matches_fixed_offsets() {
        let space = StateSpace::new(3).unwrap();
        let names: Vec<String> = space.iter().map(|state| state.to_string()).collect();
        assert_eq!(
            names,
            ["NC_B", "NC_G", "SC_B", "SC_G", "FC_0", "FC_1", "FC_2"]
        );
        for (position, state) in space.iter().enumerate() {
            assert_eq!(state.index(), position);
            assert_eq!(space.state_at(StateIndex::new(position)), Some(state));
        }
        assert_eq!(space.state_at(StateIndex::new(7)), None);
    }

    #[test]
    fn state_count_is_four_plus_window() {
        for window in 1..=16 {
            let space = StateSpace::new(window).unwrap();
            assert_eq!(space.len(), 4 + window as usize);
            assert_eq!(space.iter().count(), space.len());
        }
    }

    #[test]
    fn index_of_rejects_depth_beyond_window() {
        let space = StateSpace::new(2).unwrap();
        assert_eq!(
            space.index_of(SystemState::FullContext(1)),
            Some(StateIndex::new(5))
        );
        assert_eq!(space.index_of(SystemState::FullContext(2)), None);
    }

    #[test]
    fn degrade_increments_then_falls_to_static_context() {
        let space = StateSpace::new(3).unwrap();
        assert_eq!(space.degrade(0), SystemState::FullContext(1));
        assert_eq!(space.degrade(1), SystemState::FullContext(2));
        assert_eq!(
            space.degrade(2),
            SystemState::StaticContext(ChannelState::Bad)
        );
    }

    #[test]
    fn zero_window_has_no_state_space() {
        assert_eq!(
            StateSpace::new(0),
            Err(ParameterError::WindowTooSmall { window: 0 })
        );
    }

    #[test]
    fn degrade_with_unit_window_leaves_full_context_immediately() {
        let space = StateSpace::new(1).unwrap();
        assert_eq!(
            space.degrade(0),
            SystemState::StaticContext(ChannelState::Bad)
        );
    }

    #[test]
    fn channel_partition_covers_every_state_once() {
        let space = StateSpace::new(8).unwrap();
        let mut seen: Vec<StateIndex> = space
            .bad_channel_states()
            .chain(space.good_channel_states())
            .map(SystemState::index)
            .collect();
        seen.sort();
        let expected: Vec<StateIndex> = space.iter().map(SystemState::index).collect();
        assert_eq!(seen, expected);
        assert!(
            space
                .bad_channel_states()
                .all(|state| state.channel() == ChannelState::Bad)
        );
        assert!(
            space
                .good_channel_states()
                .all(|state| state.channel() == ChannelState::Good)
        );
    }

    #[test]
    fn action_indices_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(3), None);
        assert_eq!(Action::Fo.to_string(), "FO");
    }

    #[test]
    fn action_pattern_matching() {
        assert!(ActionPattern::Any.matches(Action::So));
        assert!(ActionPattern::Only(Action::Ir).matches(Action::Ir));
        assert!(!ActionPattern::Only(Action::Ir).matches(Action::Fo));
    }
}
