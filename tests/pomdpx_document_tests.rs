//! POMDPX document integration tests.

mod common;

use std::fs;

use common::{build, fully_observable_scenario, parameters, reference_scenario, render, scratch_path};
use rohc_pomdp::pomdpx::{to_bytes, write_to_path};
use rohc_pomdp::{
    ChannelParameters, ModelParameters, ObservabilityMode, RohcPomdpError, ScenarioConfig,
    document_checksum, generate_pomdpx,
};

/// Text between the first `<tag>` and the matching `</tag>`.
fn section<'a>(xml: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open).expect("section present") + open.len();
    let end = xml[start..].find(&close).expect("section closed") + start;
    &xml[start..end]
}

#[test]
fn reference_document_header_and_variables() {
    let xml = render(&reference_scenario());
    assert!(xml.contains("<Discount>0.95</Discount>"));
    assert!(xml.contains("<StateVar vnamePrev=\"state_0\" vnameCurr=\"state_1\">"));
    assert!(xml.contains("<NumValues>12</NumValues>"));
    assert!(xml.contains("<ObsVar vname=\"est_channel\">"));
    assert!(xml.contains("<ValueEnum>obad ogood</ValueEnum>"));
    assert!(xml.contains("<ActionVar vname=\"type_compression\">"));
    assert!(xml.contains("<ValueEnum>IR FO SO</ValueEnum>"));
    assert!(xml.contains("<RewardVar vname=\"efficiency\"/>"));
}

#[test]
fn reference_document_tables() {
    let xml = render(&reference_scenario());

    let transitions = section(&xml, "StateTransitionFunction");
    assert!(transitions.contains("<Parent>state_0 type_compression</Parent>"));
    assert_eq!(transitions.matches("<Entry>").count(), 32);
    assert!(transitions.contains("<Instance>s4 * s5</Instance>"));
    assert!(transitions.contains("<Instance>s1 IR s4</Instance>"));
    assert!(transitions.contains("<Instance>s3 FO s4</Instance>"));

    let observations = section(&xml, "ObsFunction");
    assert!(observations.contains("<Parent>state_1</Parent>"));
    assert_eq!(observations.matches("<Entry>").count(), 24);
    assert!(observations.contains("<Instance>s0 obad</Instance>"));
    assert!(observations.contains("<Instance>s4 ogood</Instance>"));

    let rewards = section(&xml, "RewardFunction");
    assert!(rewards.contains("<Parent>type_compression state_1</Parent>"));
    assert_eq!(rewards.matches("<Entry>").count(), 1);
}

#[test]
fn fully_observable_document_differs_only_in_observability() {
    let partial = render(&reference_scenario());
    let full = render(&fully_observable_scenario());

    assert!(full.contains("fullyObs=\"true\""));
    assert!(!full.contains("<ObsVar"));
    assert!(full.contains("<ObsFunction/>"));
    assert!(full.contains("fully observable channel"));

    for tag in [
        "Discount",
        "InitialStateBelief",
        "StateTransitionFunction",
        "RewardFunction",
    ] {
        assert_eq!(section(&partial, tag), section(&full, tag), "{tag} differs");
    }
}

#[test]
fn repeated_generation_is_byte_identical() {
    let first = scratch_path("repeat-a");
    let second = scratch_path("repeat-b");
    let parameters = parameters(&reference_scenario());

    let first_checksum = generate_pomdpx(&first, &parameters).unwrap();
    let second_checksum = generate_pomdpx(&second, &parameters).unwrap();
    let first_bytes = fs::read(&first).unwrap();
    let second_bytes = fs::read(&second).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first_checksum, second_checksum);
    assert_eq!(first_checksum, document_checksum(&first_bytes));

    fs::remove_file(first).ok();
    fs::remove_file(second).ok();
}

#[test]
fn written_document_matches_in_memory_rendering() {
    let path = scratch_path("in-memory");
    let model = build(&reference_scenario());
    write_to_path(&model, &path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), to_bytes(&model).unwrap().to_vec());
    fs::remove_file(path).ok();
}

#[test]
fn invalid_parameters_write_no_file() {
    let path = scratch_path("invalid");
    let scenario = ScenarioConfig {
        erasure_rate: 1.5,
        ..reference_scenario()
    };
    let result = scenario
        .to_parameters()
        .map_err(RohcPomdpError::from)
        .and_then(|parameters| generate_pomdpx(&path, &parameters));
    assert!(matches!(result, Err(RohcPomdpError::InvalidParameter(_))));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_serialization_error() {
    let path = std::env::temp_dir()
        .join("rohc-pomdp-missing-directory")
        .join("nested")
        .join("instance.pomdpx");
    let parameters = ModelParameters::new(
        4,
        ChannelParameters::new(4.0, 0.1),
        0.9,
        ScenarioConfig::default().packets(),
        ObservabilityMode::FullyObservable,
    )
    .unwrap();
    let result = generate_pomdpx(&path, &parameters);
    assert!(matches!(result, Err(RohcPomdpError::Serialization(_))));
    assert!(!path.exists());
}
