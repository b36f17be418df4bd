//! Witness computation: inputs in, fully assigned and checked signal table out.
//!
//! Evaluation never touches the circuit. Each call works on its own copy of the declaration
//! table, so one circuit can serve any number of concurrent computations.

use crate::circuit::Circuit;
use crate::error::{CircuitError, Result};
use crate::expr::Expr;
use crate::field::FieldElement;
use crate::signal::{Signal, SignalTable};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Values for the circuit's public and private inputs, keyed by signal name.
pub type Inputs = BTreeMap<String, FieldElement>;

/// A complete assignment of values to every signal of a circuit.
#[derive(Clone, Debug)]
pub struct Witness {
    table: SignalTable,
}

impl Witness {
    pub fn value(&self, name: &str) -> Option<FieldElement> {
        self.table.get(name).and_then(|s| s.value)
    }

    pub fn read(&self, name: &str) -> Result<FieldElement> {
        self.table.read(name)
    }

    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.table.iter()
    }

    /// Flat witness vector in [`Circuit::to_matrices`] column order: the constant `1`, the
    /// public statement (outputs, then public inputs), then every other signal.
    pub fn to_vector(&self, circuit: &Circuit) -> Result<Vec<FieldElement>> {
        let mut vector = Vec::with_capacity(circuit.signals().len() + 1);
        vector.push(FieldElement::one());
        for signal in circuit.column_signals() {
            vector.push(self.read(&signal.name)?);
        }
        Ok(vector)
    }

    /// Values of the circuit's public statement, in [`Circuit::public_signals`] order.
    pub fn public_inputs(&self, circuit: &Circuit) -> Result<Vec<FieldElement>> {
        circuit.public_signals().iter().map(|s| self.read(&s.name)).collect()
    }
}

/// A computed witness together with the constraints it breaks, if any.
#[derive(Clone, Debug)]
pub struct WitnessReport {
    pub witness: Witness,
    pub violations: Vec<usize>,
}

impl WitnessReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Compute every signal of `circuit` from `inputs`, then check all constraints.
///
/// Assignment expressions are replayed in declaration order. Constraint violations are reported
/// in the returned report rather than as an error; see [`evaluate`] for the strict variant.
pub fn compute_witness(circuit: &Circuit, inputs: &Inputs) -> Result<WitnessReport> {
    let mut table = circuit.signals().cleared();

    for (name, value) in inputs {
        let kind = table.kind(name).ok_or_else(|| CircuitError::UnknownSignal(name.clone()))?;
        if !kind.is_input() {
            return Err(CircuitError::NotAnInput(name.clone()));
        }
        table.assign(name, *value)?;
    }

    if let Some(missing) = table.iter().find(|s| s.kind.is_input() && s.value.is_none()) {
        return Err(CircuitError::MissingInput(missing.name.clone()));
    }

    for assignment in circuit.assignments() {
        let value = assignment
            .expr
            .evaluate(&table)
            .map_err(|e| Expr::into_circuit_error(e, &assignment.target))?;
        table.assign(&assignment.target, value)?;
    }

    if let Some(unset) = table.iter().find(|s| s.value.is_none()) {
        return Err(CircuitError::Unassigned(unset.name.clone()));
    }

    let violations = circuit.constraints().check_all(|name| table.read(name))?;
    if violations.is_empty() {
        debug!(
            circuit = circuit.name(),
            signals = table.len(),
            constraints = circuit.num_constraints(),
            "witness computed"
        );
    } else {
        warn!(circuit = circuit.name(), ?violations, "witness violates constraints");
    }

    Ok(WitnessReport { witness: Witness { table }, violations })
}

/// Like [`compute_witness`], but a witness that breaks any constraint is an error.
pub fn evaluate(circuit: &Circuit, inputs: &Inputs) -> Result<Witness> {
    let report = compute_witness(circuit, inputs)?;
    if !report.is_valid() {
        return Err(CircuitError::ConstraintViolated(report.violations));
    }
    Ok(report.witness)
}

/// Build an [`Inputs`] map from `(name, value)` pairs.
pub fn inputs<'a>(pairs: impl IntoIterator<Item = (&'a str, FieldElement)>) -> Inputs {
    pairs.into_iter().map(|(name, value)| (name.to_string(), value)).collect()
}
