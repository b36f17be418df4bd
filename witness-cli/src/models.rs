use crate::config::OutputFormat;
use crate::errors::CliError;
use circuit_engine::signal::SignalKind;
use circuit_engine::{Circuit, CircuitError, FieldElement, Inputs, WitnessReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a circom-style input file: a scalar, or an arbitrarily nested array of them.
///
/// Scalars may be JSON numbers or decimal strings. Arrays flatten into `name[i]`, `name[i][j]`, ...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Scalar(FieldElement),
    Array(Vec<InputValue>),
}

pub type InputFile = BTreeMap<String, InputValue>;

/// Flatten an input file into `name[i]` keys. Two entries that land on the same key, such as
/// `"p": [1]` next to `"p[0]": 2`, are rejected.
pub fn flatten_inputs(file: &InputFile) -> Result<Inputs, CliError> {
    let mut out = Inputs::new();
    for (name, value) in file {
        flatten_into(name.clone(), value, &mut out)?;
    }
    Ok(out)
}

fn flatten_into(name: String, value: &InputValue, out: &mut Inputs) -> Result<(), CliError> {
    match value {
        InputValue::Scalar(v) => {
            if out.contains_key(&name) {
                return Err(CliError::DuplicateInput(name));
            }
            out.insert(name, *v);
        }
        InputValue::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(format!("{name}[{i}]"), item, out)?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SignalEntry {
    pub name: String,
    pub kind: SignalKind,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ViolationEntry {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// What a witness run writes out.
#[derive(Debug, Serialize)]
pub struct WitnessOutput {
    pub circuit: String,
    pub valid: bool,
    pub violations: Vec<ViolationEntry>,

    /// Public statement, outputs first.
    pub public: Vec<String>,
    pub signals: Vec<SignalEntry>,

    /// `[1, public.., private..]`, the column order of the exported constraint matrices.
    pub witness: Vec<String>,
}

impl WitnessOutput {
    pub fn new(circuit: &Circuit, report: &WitnessReport, format: OutputFormat) -> Result<Self, CliError> {
        let violations: Vec<ViolationEntry> = report
            .violations
            .iter()
            .map(|&index| ViolationEntry {
                index,
                label: circuit.constraint(index).and_then(|c| c.label.clone()),
            })
            .collect();

        let public: Vec<String> = report
            .witness
            .public_inputs(circuit)?
            .iter()
            .map(|v| render(v, format))
            .collect::<Result<_, _>>()?;

        let signals: Vec<SignalEntry> = report
            .witness
            .signals()
            .map(|s| -> Result<SignalEntry, CliError> {
                let value = s.value.ok_or_else(|| CircuitError::Unassigned(s.name.clone()))?;
                Ok(SignalEntry { name: s.name.clone(), kind: s.kind, value: render(&value, format)? })
            })
            .collect::<Result<_, _>>()?;

        let witness: Vec<String> = report
            .witness
            .to_vector(circuit)?
            .iter()
            .map(|v| render(v, format))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            circuit: circuit.name().to_string(),
            valid: report.is_valid(),
            violations,
            public,
            signals,
            witness,
        })
    }
}

pub fn render(value: &FieldElement, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Decimal => Ok(value.to_string()),
        OutputFormat::Hex => Ok(value.to_hex()?),
    }
}
