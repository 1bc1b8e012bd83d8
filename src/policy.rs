//! Solved policies as sets of alpha vectors.
//!
//! Point-based solvers export their value function as a list of `Vector`
//! elements, each tagged with the action it recommends. The value of a belief
//! is the best dot product over all vectors, and the policy's action is the
//! tag of the vector that attains it.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::belief::Belief;
use crate::error::PolicyError;
use crate::types::Action;

const VECTOR_ELEMENT: &[u8] = b"Vector";
const ACTION_ATTRIBUTE: &[u8] = b"action";
const OBS_VALUE_ATTRIBUTE: &[u8] = b"obsValue";

/// One hyperplane of the value function.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVector {
    pub action: Action,
    pub obs_value: Option<u32>,
    pub values: Vec<f64>,
}

impl AlphaVector {
    fn dot(&self, belief: &[f64]) -> f64 {
        self.values.iter().zip(belief).map(|(a, b)| a * b).sum()
    }
}

/// Piecewise-linear value function loaded from a solver policy file.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVectorPolicy {
    vectors: Vec<AlphaVector>,
}

impl AlphaVectorPolicy {
    /// Wraps already-parsed vectors.
    ///
    /// # Errors
    /// - [`PolicyError::Empty`] - `vectors` is empty
    pub fn new(vectors: Vec<AlphaVector>) -> Result<Self, PolicyError> {
        if vectors.is_empty() {
            return Err(PolicyError::Empty);
        }
        Ok(Self { vectors })
    }

    /// Reads a policy file from disk.
    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let text = fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            description: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Parses a policy document.
    ///
    /// Every `Vector` element contributes one alpha vector, in document order;
    /// all other elements are ignored.
    ///
    /// # Errors
    /// - [`PolicyError::Xml`] - the document is not well-formed
    /// - [`PolicyError::MissingAction`] / [`PolicyError::UnknownAction`] - bad `action` attribute
    /// - [`PolicyError::MalformedValue`] - a component is not a number
    /// - [`PolicyError::Empty`] - no vectors were found
    pub fn parse(xml: &str) -> Result<Self, PolicyError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut vectors = Vec::new();
        let mut open: Option<(Action, Option<u32>, String)> = None;
        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) if start.name().as_ref() == VECTOR_ELEMENT => {
                    let (action, obs_value) = vector_header(&start, vectors.len())?;
                    open = Some((action, obs_value, String::new()));
                }
                Event::Empty(start) if start.name().as_ref() == VECTOR_ELEMENT => {
                    let (action, obs_value) = vector_header(&start, vectors.len())?;
                    vectors.push(AlphaVector {
                        action,
                        obs_value,
                        values: Vec::new(),
                    });
                }
                Event::Text(text) => {
                    if let Some((_, _, body)) = open.as_mut() {
                        body.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
                Event::End(end) if end.name().as_ref() == VECTOR_ELEMENT => {
                    if let Some((action, obs_value, body)) = open.take() {
                        let values = parse_values(&body, vectors.len())?;
                        vectors.push(AlphaVector {
                            action,
                            obs_value,
                            values,
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Self::new(vectors)
    }

    /// Vectors in document order.
    pub fn vectors(&self) -> &[AlphaVector] {
        &self.vectors
    }

    /// Action of the maximizing vector; the first vector wins ties.
    pub fn best_action(&self, belief: &Belief) -> Result<Action, PolicyError> {
        self.best(belief).map(|(vector, _)| vector.action)
    }

    /// Value of `belief` under the policy.
    pub fn value(&self, belief: &Belief) -> Result<f64, PolicyError> {
        self.best(belief).map(|(_, value)| value)
    }

    fn best(&self, belief: &Belief) -> Result<(&AlphaVector, f64), PolicyError> {
        let probabilities = belief.probabilities();
        let mut best: Option<(&AlphaVector, f64)> = None;
        for (index, vector) in self.vectors.iter().enumerate() {
            if vector.values.len() != probabilities.len() {
                return Err(PolicyError::DimensionMismatch {
                    vector: index,
                    expected: probabilities.len(),
                    actual: vector.values.len(),
                });
            }
            let value = vector.dot(probabilities);
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((vector, value));
            }
        }
        best.ok_or(PolicyError::Empty)
    }
}

fn xml_error<E: std::fmt::Display>(error: E) -> PolicyError {
    PolicyError::Xml(error.to_string())
}

fn vector_header(
    start: &BytesStart<'_>,
    vector: usize,
) -> Result<(Action, Option<u32>), PolicyError> {
    let mut action = None;
    let mut obs_value = None;
    for attribute in start.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        let value = attribute.unescape_value().map_err(xml_error)?;
        match attribute.key.as_ref() {
            ACTION_ATTRIBUTE => {
                let parsed = value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(Action::from_index)
                    .ok_or_else(|| PolicyError::UnknownAction {
                        vector,
                        action: value.to_string(),
                    })?;
                action = Some(parsed);
            }
            OBS_VALUE_ATTRIBUTE => {
                let parsed = value.trim().parse::<u32>().map_err(|_| {
                    PolicyError::MalformedValue {
                        vector,
                        value: value.to_string(),
                    }
                })?;
                obs_value = Some(parsed);
            }
            _ => {}
        }
    }
    let action = action.ok_or(PolicyError::MissingAction { vector })?;
    Ok((action, obs_value))
}

fn parse_values(body: &str, vector: usize) -> Result<Vec<f64>, PolicyError> {
    body.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| PolicyError::MalformedValue {
                vector,
                value: token.to_string(),
            })
        })
        .collect()
}
