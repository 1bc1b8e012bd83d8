//! Common test utilities for model builder integration tests.
//!
//! Provides the reference scenario, its fully observable variant, and scratch
//! paths for documents written to disk.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rohc_pomdp::pomdpx::to_bytes;
use rohc_pomdp::{ModelParameters, PomdpModel, ScenarioConfig};

/// Absolute tolerance for probability comparisons.
pub const EPSILON: f64 = 1e-12;

/// Index of `FC_0` in every state space.
pub const FULL_CONTEXT_INDEX: usize = 4;

/// Reference scenario: `W = 8`, `L_B = 8`, `EPS = 0.2`, headers 80/16/4,
/// payload 20, `P_FA = P_MD = 0.1`, `gamma = 0.95`.
pub fn reference_scenario() -> ScenarioConfig {
    ScenarioConfig::default()
}

/// Reference scenario with the estimator pair removed.
pub fn fully_observable_scenario() -> ScenarioConfig {
    ScenarioConfig {
        false_alarm: None,
        miss_detection: None,
        ..ScenarioConfig::default()
    }
}

/// Validated parameters for `scenario`.
pub fn parameters(scenario: &ScenarioConfig) -> ModelParameters {
    scenario
        .to_parameters()
        .expect("test scenario should be valid")
}

/// Built model for `scenario`.
pub fn build(scenario: &ScenarioConfig) -> PomdpModel {
    PomdpModel::build(&parameters(scenario))
}

/// Rendered POMDPX document for `scenario`.
pub fn render(scenario: &ScenarioConfig) -> String {
    let bytes = to_bytes(&build(scenario)).expect("rendering should succeed");
    String::from_utf8(bytes.to_vec()).expect("document should be ASCII")
}

/// Fresh scratch path under the system temp directory.
///
/// # Parameters
/// - `stem`: Human-readable prefix for the file name.
pub fn scratch_path(stem: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "rohc-pomdp-{stem}-{}-{n}.pomdpx",
        std::process::id()
    ))
}
