//! Gilbert-Elliott channel parameterization.
//!
//! The channel is described physically by the mean length of a bad burst
//! (`L_B`, in channel uses) and the long-run erasure probability (`EPS`).
//! The two-state chain follows from those:
//!
//! ```text
//! P_BG = 1 / L_B
//! P_GB = P_BG / (1 / EPS - 1)
//! P_BB = 1 - P_BG
//! P_GG = 1 - P_GB
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::types::ChannelState;

/// Physical channel description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameters {
    /// Mean bad-sojourn length `L_B`.
    pub mean_bad_sojourn: f64,
    /// Average erasure probability `EPS`.
    pub erasure_rate: f64,
}

/// Transition probabilities of the two-state channel chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelProbabilities {
    pub bad_to_bad: f64,
    pub bad_to_good: f64,
    pub good_to_bad: f64,
    pub good_to_good: f64,
}

impl ChannelParameters {
    /// Creates a channel description without validating it; see [`Self::derive`].
    pub const fn new(mean_bad_sojourn: f64, erasure_rate: f64) -> Self {
        Self {
            mean_bad_sojourn,
            erasure_rate,
        }
    }

    /// Derives the chain probabilities.
    ///
    /// # Errors
    /// - [`ParameterError::MeanBadSojournNotPositive`] - `L_B <= 0` or not finite
    /// - [`ParameterError::ErasureRateOutOfRange`] - `EPS` outside `(0, 1)`
    /// - [`ParameterError::ChannelProbabilityOutOfRange`] - the pair is individually
    ///   valid but yields a probability outside `[0, 1]` (e.g. `L_B < 1`)
    pub fn derive(&self) -> Result<ChannelProbabilities, ParameterError> {
        let mean_bad_sojourn = self.mean_bad_sojourn;
        let erasure_rate = self.erasure_rate;
        if !mean_bad_sojourn.is_finite() || mean_bad_sojourn <= 0.0 {
            return Err(ParameterError::MeanBadSojournNotPositive { mean_bad_sojourn });
        }
        if !(erasure_rate > 0.0 && erasure_rate < 1.0) {
            return Err(ParameterError::ErasureRateOutOfRange { erasure_rate });
        }

        let bad_to_good = 1.0 / mean_bad_sojourn;
        let good_to_bad = bad_to_good / (1.0 / erasure_rate - 1.0);
        let probabilities = ChannelProbabilities {
            bad_to_bad: 1.0 - bad_to_good,
            bad_to_good,
            good_to_bad,
            good_to_good: 1.0 - good_to_bad,
        };
        probabilities.check_range()?;
        Ok(probabilities)
    }
}

impl ChannelProbabilities {
    fn check_range(&self) -> Result<(), ParameterError> {
        let named = [
            ("P_BB", self.bad_to_bad),
            ("P_BG", self.bad_to_good),
            ("P_GB", self.good_to_bad),
            ("P_GG", self.good_to_good),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParameterError::ChannelProbabilityOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Probability of the next channel use being `to`, given the last one was `from`.
    pub const fn probability(&self, from: ChannelState, to: ChannelState) -> f64 {
        match (from, to) {
            (ChannelState::Bad, ChannelState::Bad) => self.bad_to_bad,
            (ChannelState::Bad, ChannelState::Good) => self.bad_to_good,
            (ChannelState::Good, ChannelState::Bad) => self.good_to_bad,
            (ChannelState::Good, ChannelState::Good) => self.good_to_good,
        }
    }

    /// Probability of a good next channel use from `from`.
    pub const fn to_good(&self, from: ChannelState) -> f64 {
        self.probability(from, ChannelState::Good)
    }

    /// Long-run fraction of bad channel uses, `P_GB / (P_GB + P_BG)`. Equals `EPS`.
    pub fn stationary_bad(&self) -> f64 {
        self.good_to_bad / (self.good_to_bad + self.bad_to_good)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn derive_reference_scenario() {
        let probabilities = ChannelParameters::new(8.0, 0.2).derive().unwrap();
        assert!((probabilities.bad_to_good - 0.125).abs() < EPSILON);
        assert!((probabilities.bad_to_bad - 0.875).abs() < EPSILON);
        assert!((probabilities.good_to_bad - 0.03125).abs() < EPSILON);
        assert!((probabilities.good_to_good - 0.96875).abs() < EPSILON);
    }

    #[test]
    fn rows_are_stochastic() {
        let probabilities = ChannelParameters::new(3.5, 0.35).derive().unwrap();
        for from in [ChannelState::Bad, ChannelState::Good] {
            let sum = probabilities.probability(from, ChannelState::Bad)
                + probabilities.probability(from, ChannelState::Good);
            assert!((sum - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn stationary_bad_equals_erasure_rate() {
        for (mean_bad_sojourn, erasure_rate) in [(8.0, 0.2), (2.0, 0.05), (12.5, 0.4)] {
            let probabilities = ChannelParameters::new(mean_bad_sojourn, erasure_rate)
                .derive()
                .unwrap();
            assert!((probabilities.stationary_bad() - erasure_rate).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_non_positive_mean_bad_sojourn() {
        for mean_bad_sojourn in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = ChannelParameters::new(mean_bad_sojourn, 0.2).derive();
            assert!(matches!(
                result,
                Err(ParameterError::MeanBadSojournNotPositive { .. })
            ));
        }
    }

    #[test]
    fn rejects_erasure_rate_outside_open_unit_interval() {
        for erasure_rate in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
            let result = ChannelParameters::new(8.0, erasure_rate).derive();
            assert!(matches!(
                result,
                Err(ParameterError::ErasureRateOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_bursts_shorter_than_one_use() {
        let result = ChannelParameters::new(0.5, 0.2).derive();
        assert_eq!(
            result,
            Err(ParameterError::ChannelProbabilityOutOfRange {
                name: "P_BB",
                value: -1.0
            })
        );
    }

    #[test]
    fn rejects_good_to_bad_above_one() {
        // EPS = 0.9, L_B = 1 gives P_GB = 9.
        let result = ChannelParameters::new(1.0, 0.9).derive();
        assert!(matches!(
            result,
            Err(ParameterError::ChannelProbabilityOutOfRange { name: "P_GB", .. })
        ));
    }
}
