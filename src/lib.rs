//! `rohc-pomdp`: POMDP models of ROHC header-compression decisions over a lossy link.
//!
//! This library builds the cross-layer model of a ROHC U-mode compressor
//! choosing between IR, FO, and SO packets while the decompressor context
//! drifts with losses on a Gilbert-Elliott channel. The model is written as a
//! POMDPX document for external point-based solvers, and the solved policy can
//! be loaded back to drive a compressor through belief tracking.
//!
//! ## Core Concepts
//!
//! - **[`ModelParameters`]**: Validated inputs. Every parameter check happens
//!   when one is constructed, so model building itself cannot fail.
//! - **[`PomdpModel`]**: The assembled model: state space, initial belief,
//!   transition, observation, and reward tables.
//! - **[`pomdpx`]**: Serialization of a model into a POMDPX document.
//! - **[`Belief`] / [`AlphaVectorPolicy`]**: Online side of the model, used to
//!   act on a solved policy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rohc_pomdp::{ScenarioConfig, generate_pomdpx};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reference scenario: W = 8, L_B = 8, EPS = 0.2, headers 80/16/4, payload 20
//!     let parameters = ScenarioConfig::default().to_parameters()?;
//!
//!     let checksum = generate_pomdpx(Path::new("instance.pomdpx"), &parameters)?;
//!     println!("Wrote instance.pomdpx (crc32 {checksum:08x})");
//!     Ok(())
//! }
//! ```
//!
//! ## State Space
//!
//! States couple the decompressor context (none, static, full) with the last
//! channel state; full context additionally tracks how many consecutive
//! packets were lost, up to the WLSB window. See [`types`] for the index map.

pub mod belief;
pub mod channel;
pub mod constants;
pub mod error;
pub mod model;
pub mod observation;
pub mod params;
pub mod policy;
pub mod pomdpx;
pub mod reward;
pub mod transition;
pub mod types;

pub use belief::Belief;
pub use channel::{ChannelParameters, ChannelProbabilities};
pub use error::{
    BeliefError, ConfigError, ParameterError, PolicyError, RohcPomdpError, SerializationError,
};
pub use model::PomdpModel;
pub use params::{ModelParameters, ObservabilityMode, PacketLengths, ScenarioConfig};
pub use policy::{AlphaVector, AlphaVectorPolicy};
pub use pomdpx::{document_checksum, generate_pomdpx};
pub use types::{
    Action, ActionPattern, ChannelState, Observation, StateIndex, StateSpace, SystemState,
};
