//! POMDPX serialization.
//!
//! Renders a [`PomdpModel`] as a POMDPX document for external solvers. The
//! whole document is produced in memory first; [`write_to_path`] then persists
//! it through a sibling temporary file and a rename, so the destination either
//! holds a complete document or is left untouched.
//!
//! Typed model identifiers are translated to their POMDPX names only here:
//! states become `s{index}`, actions `IR`/`FO`/`SO`, observations
//! `obad`/`ogood`, and the any-action pattern `*`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::{BufMut, Bytes, BytesMut};
use crc::{CRC_32_ISO_HDLC, Crc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, info};

use crate::constants::{
    ACTION_VAR, OBS_VAR, OBSERVATION_NAME_BAD, OBSERVATION_NAME_GOOD, POMDPX_ENCODING,
    POMDPX_ENUMERATE, POMDPX_NULL_PARENT, POMDPX_PROBLEM_ID, POMDPX_SCHEMA_LOCATION,
    POMDPX_TABLE_TYPE, POMDPX_VERSION, POMDPX_WILDCARD, REWARD_VAR, STATE_VAR_CURR,
    STATE_VAR_PREV, XSI_NAMESPACE,
};
use crate::error::{RohcPomdpError, SerializationError};
use crate::model::PomdpModel;
use crate::observation::ObservationTable;
use crate::params::ModelParameters;
use crate::reward::RewardTable;
use crate::transition::TransitionTable;
use crate::types::{Action, ActionPattern, StateIndex};

const INDENT_SIZE: usize = 2;

/// CRC-32 used to fingerprint emitted documents.
const DOCUMENT_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Builds, renders, and persists the model for `parameters` at `destination`.
///
/// # Returns
/// The CRC-32 checksum of the written document.
///
/// # Errors
/// - [`RohcPomdpError::Serialization`] - the document could not be rendered or written
pub fn generate_pomdpx(
    destination: &Path,
    parameters: &ModelParameters,
) -> Result<u32, RohcPomdpError> {
    let model = PomdpModel::build(parameters);
    let checksum = write_to_path(&model, destination)?;
    Ok(checksum)
}

/// Renders `model` as a complete POMDPX document.
///
/// # Errors
/// - [`SerializationError::Xml`] - the XML writer rejected an event
pub fn to_bytes(model: &PomdpModel) -> Result<Bytes, SerializationError> {
    let mut document = DocumentWriter::new();
    document.declaration()?;
    document.root(model)?;
    let bytes = document.finish();
    debug!(bytes = bytes.len(), "rendered POMDPX document");
    Ok(bytes)
}

/// Renders `model` and writes it to `destination`.
///
/// # Returns
/// The CRC-32 checksum of the written document.
///
/// # Errors
/// - [`SerializationError::Xml`] - rendering failed; nothing is written
/// - [`SerializationError::Io`] - the destination or its temporary sibling is unwritable
pub fn write_to_path(model: &PomdpModel, destination: &Path) -> Result<u32, SerializationError> {
    let bytes = to_bytes(model)?;
    persist(destination, |staging| fs::write(staging, &bytes))?;

    let checksum = document_checksum(&bytes);
    info!(
        path = %destination.display(),
        bytes = bytes.len(),
        checksum = format_args!("{checksum:08x}"),
        "wrote POMDPX model"
    );
    Ok(checksum)
}

/// CRC-32/ISO-HDLC of a rendered document, for comparing repeated builds.
pub fn document_checksum(document: &[u8]) -> u32 {
    DOCUMENT_CRC.checksum(document)
}

/// Runs `write` against the staging sibling of `destination`, then renames it into place.
///
/// The staging file is removed on any failure, including a write that stops partway.
fn persist<F>(destination: &Path, write: F) -> Result<(), SerializationError>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let staging = staging_path(destination);
    let result = write(&staging)
        .map_err(|e| io_error(&staging, &e))
        .and_then(|()| fs::rename(&staging, destination).map_err(|e| io_error(destination, &e)));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

fn io_error(path: &Path, error: &io::Error) -> SerializationError {
    SerializationError::Io {
        path: path.display().to_string(),
        description: error.to_string(),
    }
}

fn xml_error<E: std::fmt::Display>(error: E) -> SerializationError {
    SerializationError::Xml(error.to_string())
}

/// Shortest round-trip rendering of a number.
fn format_number(value: f64) -> String {
    format!("{value}")
}

fn format_numbers(values: impl IntoIterator<Item = f64>) -> String {
    values
        .into_iter()
        .map(format_number)
        .collect::<Vec<_>>()
        .join(" ")
}

fn action_pattern_name(pattern: ActionPattern) -> &'static str {
    match pattern {
        ActionPattern::Any => POMDPX_WILDCARD,
        ActionPattern::Only(action) => action.name(),
    }
}

/// Thin element-level layer over the `quick-xml` writer.
struct DocumentWriter {
    writer: Writer<bytes::buf::Writer<BytesMut>>,
}

impl DocumentWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(BytesMut::new().writer(), b' ', INDENT_SIZE),
        }
    }

    fn finish(self) -> Bytes {
        self.writer.into_inner().into_inner().freeze()
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn declaration(&mut self) -> Result<(), SerializationError> {
        self.event(Event::Decl(BytesDecl::new(
            "1.0",
            Some(POMDPX_ENCODING),
            None,
        )))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SerializationError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), SerializationError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SerializationError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Empty(start))
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<(), SerializationError> {
        self.writer
            .create_element(name)
            .write_text_content(BytesText::new(text))
            .map_err(xml_error)?;
        Ok(())
    }

    fn root(&mut self, model: &PomdpModel) -> Result<(), SerializationError> {
        self.open(
            "pomdpx",
            &[
                ("xmlns:xsi", XSI_NAMESPACE),
                ("version", POMDPX_VERSION),
                ("id", POMDPX_PROBLEM_ID),
                ("xsi:noNamespaceSchemaLocation", POMDPX_SCHEMA_LOCATION),
            ],
        )?;
        self.leaf("Description", model.description())?;
        self.leaf("Discount", &format_number(model.discount()))?;
        self.variables(model)?;
        self.initial_belief(model.initial_belief())?;
        self.transition_function(model.transitions())?;
        match model.observations() {
            Some(observations) => self.observation_function(observations)?,
            None => self.empty("ObsFunction", &[])?,
        }
        self.reward_function(model.rewards())?;
        self.close("pomdpx")
    }

    fn variables(&mut self, model: &PomdpModel) -> Result<(), SerializationError> {
        self.open("Variable", &[])?;

        let mut state_attributes = vec![("vnamePrev", STATE_VAR_PREV), ("vnameCurr", STATE_VAR_CURR)];
        if model.mode().is_fully_observable() {
            state_attributes.push(("fullyObs", "true"));
        }
        self.open("StateVar", &state_attributes)?;
        self.leaf("NumValues", &model.state_space().len().to_string())?;
        self.close("StateVar")?;

        if model.observations().is_some() {
            self.open("ObsVar", &[("vname", OBS_VAR)])?;
            self.leaf(
                "ValueEnum",
                &format!("{OBSERVATION_NAME_BAD} {OBSERVATION_NAME_GOOD}"),
            )?;
            self.close("ObsVar")?;
        }

        self.open("ActionVar", &[("vname", ACTION_VAR)])?;
        let actions: Vec<&str> = Action::ALL.iter().map(|action| action.name()).collect();
        self.leaf("ValueEnum", &actions.join(" "))?;
        self.close("ActionVar")?;

        self.empty("RewardVar", &[("vname", REWARD_VAR)])?;
        self.close("Variable")
    }

    fn entry(&mut self, instance: &str, table: &str, values: &str) -> Result<(), SerializationError> {
        self.open("Entry", &[])?;
        self.leaf("Instance", instance)?;
        self.leaf(table, values)?;
        self.close("Entry")
    }

    fn initial_belief(&mut self, belief: &[f64]) -> Result<(), SerializationError> {
        self.open("InitialStateBelief", &[])?;
        self.open("CondProb", &[])?;
        self.leaf("Var", STATE_VAR_PREV)?;
        self.leaf("Parent", POMDPX_NULL_PARENT)?;
        self.open("Parameter", &[("type", POMDPX_TABLE_TYPE)])?;
        self.entry(
            POMDPX_ENUMERATE,
            "ProbTable",
            &format_numbers(belief.iter().copied()),
        )?;
        self.close("Parameter")?;
        self.close("CondProb")?;
        self.close("InitialStateBelief")
    }

    fn transition_function(&mut self, table: &TransitionTable) -> Result<(), SerializationError> {
        self.open("StateTransitionFunction", &[])?;
        self.open("CondProb", &[])?;
        self.leaf("Var", STATE_VAR_CURR)?;
        self.leaf("Parent", &format!("{STATE_VAR_PREV} {ACTION_VAR}"))?;
        self.open("Parameter", &[("type", POMDPX_TABLE_TYPE)])?;
        for entry in table.entries() {
            let instance = format!(
                "{} {} {}",
                entry.from,
                action_pattern_name(entry.action),
                entry.to
            );
            self.entry(&instance, "ProbTable", &format_number(entry.probability))?;
        }
        self.close("Parameter")?;
        self.close("CondProb")?;
        self.close("StateTransitionFunction")
    }

    fn observation_function(&mut self, table: &ObservationTable) -> Result<(), SerializationError> {
        self.open("ObsFunction", &[])?;
        self.open("CondProb", &[])?;
        self.leaf("Var", OBS_VAR)?;
        self.leaf("Parent", STATE_VAR_CURR)?;
        self.open("Parameter", &[("type", POMDPX_TABLE_TYPE)])?;
        for entry in table.entries() {
            let instance = format!("{} {}", entry.state, entry.observation.name());
            self.entry(&instance, "ProbTable", &format_number(entry.probability))?;
        }
        self.close("Parameter")?;
        self.close("CondProb")?;
        self.close("ObsFunction")
    }

    fn reward_function(&mut self, table: &RewardTable) -> Result<(), SerializationError> {
        self.open("RewardFunction", &[])?;
        self.open("Func", &[])?;
        self.leaf("Var", REWARD_VAR)?;
        self.leaf("Parent", &format!("{ACTION_VAR} {STATE_VAR_CURR}"))?;
        self.open("Parameter", &[("type", POMDPX_TABLE_TYPE)])?;
        for (next, values) in table.by_next_state() {
            self.reward_rows(next, &values)?;
        }
        self.close("Parameter")?;
        self.close("Func")?;
        self.close("RewardFunction")
    }

    /// One compact `- s'` row when every action is listed in enumeration order,
    /// otherwise one row per action.
    fn reward_rows(
        &mut self,
        next: StateIndex,
        values: &[(Action, f64)],
    ) -> Result<(), SerializationError> {
        let covers_all_actions = values.len() == Action::ALL.len()
            && values
                .iter()
                .zip(Action::ALL)
                .all(|((action, _), expected)| *action == expected);
        if covers_all_actions {
            let instance = format!("{POMDPX_ENUMERATE} {next}");
            let row = format_numbers(values.iter().map(|(_, value)| *value));
            return self.entry(&instance, "ValueTable", &row);
        }
        for (action, value) in values {
            let instance = format!("{} {next}", action.name());
            self.entry(&instance, "ValueTable", &format_number(*value))?;
        }
        Ok(())
    }
}
