//! Belief tracking over the joint state space.
//!
//! A compressor never sees the decompressor context; it only sees its own
//! packet choices and the estimator reading. [`Belief`] is the Bayes filter
//! over the model's state space that turns that history into a distribution a
//! solved policy can act on.

use crate::constants::PROBABILITY_TOLERANCE;
use crate::error::BeliefError;
use crate::model::PomdpModel;
use crate::types::{Action, ChannelState, Observation, StateIndex};

/// Probability distribution over the positional state space.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    probabilities: Vec<f64>,
}

impl Belief {
    /// The model's initial belief: no context, channel bad with probability `EPS`.
    pub fn initial(model: &PomdpModel) -> Self {
        Self {
            probabilities: model.initial_belief().to_vec(),
        }
    }

    /// Wraps an explicit distribution.
    ///
    /// # Errors
    /// - [`BeliefError::NotADistribution`] - a negative component, or components not summing to one
    pub fn from_probabilities(probabilities: Vec<f64>) -> Result<Self, BeliefError> {
        let sum: f64 = probabilities.iter().sum();
        let non_negative = probabilities.iter().all(|p| *p >= 0.0);
        if !non_negative || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(BeliefError::NotADistribution { sum });
        }
        Ok(Self { probabilities })
    }

    /// Components in positional state order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of one state; zero outside the space.
    pub fn probability(&self, state: StateIndex) -> f64 {
        self.probabilities
            .get(state.as_usize())
            .copied()
            .unwrap_or(0.0)
    }

    /// One-step prediction `b'(s') = sum_s P(s' | s, a) b(s)`.
    ///
    /// # Errors
    /// - [`BeliefError::DimensionMismatch`] - the belief was not built over `model`'s state space
    pub fn predict(&self, model: &PomdpModel, action: Action) -> Result<Self, BeliefError> {
        self.check_dimension(model)?;
        let transitions = model.transitions();
        let mut predicted = vec![0.0; self.probabilities.len()];
        for (from, weight) in self.probabilities.iter().enumerate() {
            if *weight == 0.0 {
                continue;
            }
            for (next, p) in transitions.distribution(StateIndex::new(from), action) {
                if let Some(slot) = predicted.get_mut(next.as_usize()) {
                    *slot += weight * p;
                }
            }
        }
        Ok(Self {
            probabilities: predicted,
        })
    }

    /// Prediction followed by conditioning on the estimator reading.
    ///
    /// # Errors
    /// - [`BeliefError::ObservationUnavailable`] - `model` is fully observable
    /// - [`BeliefError::DimensionMismatch`] - the belief was not built over `model`'s state space
    /// - [`BeliefError::ZeroEvidence`] - `observation` has zero probability under the prediction
    pub fn update(
        &self,
        model: &PomdpModel,
        action: Action,
        observation: Observation,
    ) -> Result<Self, BeliefError> {
        let observations = model
            .observations()
            .ok_or(BeliefError::ObservationUnavailable)?;
        let mut posterior = self.predict(model, action)?.probabilities;
        for (index, p) in posterior.iter_mut().enumerate() {
            *p *= observations.likelihood(StateIndex::new(index), observation);
        }
        let evidence: f64 = posterior.iter().sum();
        if evidence <= 0.0 {
            return Err(BeliefError::ZeroEvidence {
                observation: observation.name(),
            });
        }
        posterior.iter_mut().for_each(|p| *p /= evidence);
        Ok(Self {
            probabilities: posterior,
        })
    }

    /// Most likely state; the lowest index wins ties.
    pub fn argmax(&self) -> StateIndex {
        let mut best = 0;
        for (index, p) in self.probabilities.iter().enumerate() {
            if *p > self.probabilities[best] {
                best = index;
            }
        }
        StateIndex::new(best)
    }

    /// Total mass on states whose folded channel bit is bad.
    pub fn channel_bad_probability(&self, model: &PomdpModel) -> f64 {
        model
            .state_space()
            .iter()
            .filter(|state| state.channel() == ChannelState::Bad)
            .map(|state| self.probability(state.index()))
            .sum()
    }

    fn check_dimension(&self, model: &PomdpModel) -> Result<(), BeliefError> {
        let expected = model.state_space().len();
        if self.probabilities.len() != expected {
            return Err(BeliefError::DimensionMismatch {
                expected,
                actual: self.probabilities.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ScenarioConfig;
    use crate::types::SystemState;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPSILON: f64 = 1e-9;

    fn reference_model() -> PomdpModel {
        PomdpModel::build(&ScenarioConfig::default().to_parameters().unwrap())
    }

    fn sums_to_one(belief: &Belief) -> bool {
        (belief.probabilities().iter().sum::<f64>() - 1.0).abs() < EPSILON
    }

    #[test]
    fn initial_belief_matches_model() {
        let model = reference_model();
        let belief = Belief::initial(&model);
        assert_eq!(belief.probabilities(), model.initial_belief());
        assert!((belief.channel_bad_probability(&model) - 0.2).abs() < EPSILON);
        assert_eq!(belief.argmax(), 1usize);
    }

    #[test]
    fn from_probabilities_rejects_non_distributions() {
        assert!(matches!(
            Belief::from_probabilities(vec![0.5, 0.2]),
            Err(BeliefError::NotADistribution { .. })
        ));
        assert!(matches!(
            Belief::from_probabilities(vec![1.5, -0.5]),
            Err(BeliefError::NotADistribution { .. })
        ));
        assert!(Belief::from_probabilities(vec![0.25, 0.75]).is_ok());
    }

    #[test]
    fn ir_from_no_context_good_reaches_full_context() {
        let model = reference_model();
        let belief = point_mass(&model, SystemState::NoContext(ChannelState::Good));
        let predicted = belief.predict(&model, Action::Ir).unwrap();
        let full = SystemState::FullContext(0).index();
        let nc_bad = SystemState::NoContext(ChannelState::Bad).index();
        let channel = model.channel();
        assert!((predicted.probability(full) - channel.good_to_good).abs() < EPSILON);
        assert!((predicted.probability(nc_bad) - channel.good_to_bad).abs() < EPSILON);
    }

    #[test]
    fn bad_reading_raises_bad_channel_mass() {
        let model = reference_model();
        let belief = Belief::initial(&model);
        let predicted = belief.predict(&model, Action::Ir).unwrap();
        let after_bad = belief.update(&model, Action::Ir, Observation::Bad).unwrap();
        let after_good = belief.update(&model, Action::Ir, Observation::Good).unwrap();
        let prior = predicted.channel_bad_probability(&model);
        assert!(after_bad.channel_bad_probability(&model) > prior);
        assert!(after_good.channel_bad_probability(&model) < prior);
    }

    fn point_mass(model: &PomdpModel, state: SystemState) -> Belief {
        let mut probabilities = vec![0.0; model.state_space().len()];
        probabilities[state.index().as_usize()] = 1.0;
        Belief::from_probabilities(probabilities).unwrap()
    }

    fn perfect_estimator_model(mean_bad_sojourn: f64) -> PomdpModel {
        let scenario = ScenarioConfig {
            mean_bad_sojourn,
            false_alarm: Some(0.0),
            miss_detection: Some(0.0),
            ..ScenarioConfig::default()
        };
        PomdpModel::build(&scenario.to_parameters().unwrap())
    }

    #[test]
    fn perfect_estimator_reading_pins_channel_bit() {
        let model = perfect_estimator_model(8.0);
        let belief = point_mass(&model, SystemState::FullContext(0));
        let after_good = belief.update(&model, Action::So, Observation::Good).unwrap();
        assert!(after_good.channel_bad_probability(&model) < EPSILON);
        assert_eq!(after_good.argmax(), SystemState::FullContext(0).index());

        let after_bad = belief.update(&model, Action::So, Observation::Bad).unwrap();
        assert!((after_bad.channel_bad_probability(&model) - 1.0).abs() < EPSILON);
        assert_eq!(after_bad.argmax(), SystemState::FullContext(1).index());
    }

    #[test]
    fn impossible_reading_is_zero_evidence() {
        // L_B = 1: a bad channel use is always followed by a good one.
        let model = perfect_estimator_model(1.0);
        let belief = point_mass(&model, SystemState::StaticContext(ChannelState::Bad));
        assert_eq!(
            belief.update(&model, Action::So, Observation::Bad),
            Err(BeliefError::ZeroEvidence { observation: "obad" })
        );
        assert!(belief.update(&model, Action::So, Observation::Good).is_ok());
    }

    #[test]
    fn fully_observable_model_has_no_update() {
        let scenario = ScenarioConfig {
            false_alarm: None,
            miss_detection: None,
            ..ScenarioConfig::default()
        };
        let model = PomdpModel::build(&scenario.to_parameters().unwrap());
        let belief = Belief::initial(&model);
        assert_eq!(
            belief.update(&model, Action::Ir, Observation::Good),
            Err(BeliefError::ObservationUnavailable)
        );
        assert!(belief.predict(&model, Action::Ir).is_ok());
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let model = reference_model();
        let belief = Belief::from_probabilities(vec![0.5, 0.5]).unwrap();
        assert_eq!(
            belief.predict(&model, Action::So),
            Err(BeliefError::DimensionMismatch {
                expected: 12,
                actual: 2
            })
        );
    }

    #[test]
    fn random_walk_stays_a_distribution() {
        let model = reference_model();
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut belief = Belief::initial(&model);
        for _ in 0..500 {
            let action = Action::ALL[rng.random_range(0..Action::ALL.len())];
            let observation = Observation::ALL[rng.random_range(0..Observation::ALL.len())];
            belief = belief.update(&model, action, observation).unwrap();
            assert!(sums_to_one(&belief));
            assert!(belief.probabilities().iter().all(|p| *p >= 0.0));
        }
    }
}
