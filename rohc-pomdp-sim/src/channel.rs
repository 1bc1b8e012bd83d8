//! Simulated Gilbert-Elliott channel and the noisy estimator that watches it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rohc_pomdp::{ChannelProbabilities, ChannelState, Observation};

/// Two-state erasure channel driven by a seeded RNG.
#[derive(Debug, Clone)]
pub struct GilbertElliottChannel {
    rng: StdRng,
    probabilities: ChannelProbabilities,
    state: ChannelState,
}

impl GilbertElliottChannel {
    /// Creates a channel whose initial state is drawn from the stationary distribution.
    ///
    /// # Parameters
    /// - `seed`: Random seed for reproducible erasure patterns
    /// - `probabilities`: Validated chain probabilities
    pub fn new(seed: u64, probabilities: ChannelProbabilities) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = if rng.random_bool(probabilities.stationary_bad()) {
            ChannelState::Bad
        } else {
            ChannelState::Good
        };
        Self {
            rng,
            probabilities,
            state,
        }
    }

    /// State of the most recent channel use.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Advances to the next channel use and returns its state.
    pub fn step(&mut self) -> ChannelState {
        self.state = match self.state {
            ChannelState::Good if self.rng.random_bool(self.probabilities.good_to_bad) => {
                ChannelState::Bad
            }
            ChannelState::Bad if self.rng.random_bool(self.probabilities.bad_to_good) => {
                ChannelState::Good
            }
            unchanged => unchanged,
        };
        self.state
    }
}

/// Channel-state estimator with fixed false-alarm and miss-detection rates.
#[derive(Debug, Clone)]
pub struct ChannelEstimator {
    rng: StdRng,
    false_alarm: f64,
    miss_detection: f64,
}

impl ChannelEstimator {
    /// # Parameters
    /// - `seed`: Random seed for reproducible estimation errors
    /// - `false_alarm`: Probability of reading bad on a good channel
    /// - `miss_detection`: Probability of reading good on a bad channel
    pub fn new(seed: u64, false_alarm: f64, miss_detection: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&false_alarm));
        debug_assert!((0.0..=1.0).contains(&miss_detection));
        Self {
            rng: StdRng::seed_from_u64(seed),
            false_alarm,
            miss_detection,
        }
    }

    /// Noisy reading of `actual`.
    pub fn read(&mut self, actual: ChannelState) -> Observation {
        match actual {
            ChannelState::Good if self.rng.random_bool(self.false_alarm) => Observation::Bad,
            ChannelState::Bad if self.rng.random_bool(self.miss_detection) => Observation::Good,
            ChannelState::Good => Observation::Good,
            ChannelState::Bad => Observation::Bad,
        }
    }
}
