//! Observation function of the partially observable model.
//!
//! The estimator reads the channel bit folded into the next state. Bad-channel
//! states are misread as good with the miss-detection probability; good-channel
//! states are misread as bad with the false-alarm probability.

use tracing::debug;

use crate::types::{ChannelState, Observation, StateIndex, StateSpace, SystemState};

/// One `(s', o) -> p` fact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationEntry {
    pub state: StateIndex,
    pub observation: Observation,
    pub probability: f64,
}

/// Ordered observation facts plus a per-state `P(o | s')` lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    entries: Vec<ObservationEntry>,
    /// `likelihoods[s'][o]`, observations in `Observation::ALL` order.
    likelihoods: Vec<[f64; 2]>,
}

impl ObservationTable {
    /// Builds the estimator model for `space`.
    ///
    /// Facts are listed as: bad states reading bad, bad states reading good,
    /// good states reading bad, good states reading good.
    pub fn build(space: &StateSpace, false_alarm: f64, miss_detection: f64) -> Self {
        let mut table = Self {
            entries: Vec::with_capacity(2 * space.len()),
            likelihoods: vec![[0.0; 2]; space.len()],
        };

        for (states, observation, probability) in [
            (space.bad_channel_states().collect::<Vec<_>>(), Observation::Bad, 1.0 - miss_detection),
            (space.bad_channel_states().collect(), Observation::Good, miss_detection),
            (space.good_channel_states().collect(), Observation::Bad, false_alarm),
            (space.good_channel_states().collect(), Observation::Good, 1.0 - false_alarm),
        ] {
            for state in states {
                table.insert(state, observation, probability);
            }
        }

        debug!(entries = table.entries.len(), "built observation table");
        table
    }

    fn insert(&mut self, state: SystemState, observation: Observation, probability: f64) {
        let index = state.index();
        if let Some(row) = self.likelihoods.get_mut(index.as_usize()) {
            row[observation_slot(observation)] = probability;
        }
        self.entries.push(ObservationEntry {
            state: index,
            observation,
            probability,
        });
    }

    /// Facts in construction order.
    pub fn entries(&self) -> &[ObservationEntry] {
        &self.entries
    }

    /// `P(observation | state)`; zero for states outside the table.
    pub fn likelihood(&self, state: StateIndex, observation: Observation) -> f64 {
        self.likelihoods
            .get(state.as_usize())
            .map_or(0.0, |row| row[observation_slot(observation)])
    }

    /// Probability of reading `observation` when the true channel is `channel`.
    pub fn channel_likelihood(
        false_alarm: f64,
        miss_detection: f64,
        channel: ChannelState,
        observation: Observation,
    ) -> f64 {
        match (channel, observation) {
            (ChannelState::Bad, Observation::Bad) => 1.0 - miss_detection,
            (ChannelState::Bad, Observation::Good) => miss_detection,
            (ChannelState::Good, Observation::Bad) => false_alarm,
            (ChannelState::Good, Observation::Good) => 1.0 - false_alarm,
        }
    }
}

const fn observation_slot(observation: Observation) -> usize {
    match observation {
        Observation::Bad => 0,
        Observation::Good => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_gets_exactly_two_rows_summing_to_one() {
        let space = StateSpace::new(8).unwrap();
        let table = ObservationTable::build(&space, 0.1, 0.15);
        assert_eq!(table.entries().len(), 2 * space.len());
        for state in space.iter() {
            let rows: Vec<&ObservationEntry> = table
                .entries()
                .iter()
                .filter(|entry| entry.state == state.index())
                .collect();
            assert_eq!(rows.len(), 2, "state {state}");
            let sum: f64 = rows.iter().map(|entry| entry.probability).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn likelihoods_follow_channel_bit() {
        let space = StateSpace::new(4).unwrap();
        let table = ObservationTable::build(&space, 0.1, 0.2);
        for state in space.iter() {
            let expected = ObservationTable::channel_likelihood(
                0.1,
                0.2,
                state.channel(),
                Observation::Bad,
            );
            assert_eq!(table.likelihood(state.index(), Observation::Bad), expected);
        }
        assert_eq!(
            table.likelihood(SystemState::FullContext(0).index(), Observation::Good),
            0.9
        );
        assert_eq!(
            table.likelihood(SystemState::FullContext(3).index(), Observation::Good),
            0.2
        );
    }

    #[test]
    fn entry_order_groups_by_partition_then_observation() {
        let space = StateSpace::new(3).unwrap();
        let table = ObservationTable::build(&space, 0.1, 0.1);
        let rendered: Vec<String> = table
            .entries()
            .iter()
            .map(|entry| format!("{} {}", entry.state, entry.observation.name()))
            .collect();
        assert_eq!(
            rendered,
            [
                "s0 obad", "s2 obad", "s5 obad", "s6 obad", "s0 ogood", "s2 ogood", "s5 ogood",
                "s6 ogood", "s1 obad", "s3 obad", "s4 obad", "s1 ogood", "s3 ogood", "s4 ogood",
            ]
        );
    }

    #[test]
    fn out_of_range_state_has_zero_likelihood() {
        let table = ObservationTable::build(&StateSpace::new(1).unwrap(), 0.1, 0.1);
        assert_eq!(table.likelihood(StateIndex::new(5), Observation::Bad), 0.0);
    }
}
