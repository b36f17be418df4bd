//! Hand-off to arkworks proving backends.
//!
//! [`CircuitSynthesizer`] replays a flattened [`Circuit`] into an `ark_relations` constraint
//! system. Public signals (outputs, then public inputs) become instance variables in
//! [`Circuit::public_signals`] order; every other signal becomes a witness variable.
//!
//! Without a witness the synthesizer only describes the shape, which is what key generation
//! needs. Any value request in that mode fails with `AssignmentMissing`.

use crate::circuit::Circuit;
use crate::constraint::LinearCombination;
use crate::field::FieldElement;
use crate::witness::Witness;
use ark_bn254::Fr;
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination as ArkLinearCombination, SynthesisError,
    Variable,
};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
pub struct CircuitSynthesizer<'a> {
    circuit: &'a Circuit,
    witness: Option<&'a Witness>,
}

impl<'a> CircuitSynthesizer<'a> {
    /// Shape only, for key generation.
    pub fn setup(circuit: &'a Circuit) -> Self {
        Self { circuit, witness: None }
    }

    /// Shape plus values, for proving.
    pub fn with_witness(circuit: &'a Circuit, witness: &'a Witness) -> Self {
        Self { circuit, witness: Some(witness) }
    }

    fn value_of(&self, name: &str) -> Result<Fr, SynthesisError> {
        self.witness
            .and_then(|w| w.value(name))
            .map(FieldElement::into_fr)
            .ok_or(SynthesisError::AssignmentMissing)
    }
}

impl ConstraintSynthesizer<Fr> for CircuitSynthesizer<'_> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let mut variables: HashMap<&str, Variable> = HashMap::with_capacity(self.circuit.signals().len());

        // IMPORTANT: instance allocation order defines the public-input vector a verifier checks.
        for signal in self.circuit.public_signals() {
            let var = cs.new_input_variable(|| self.value_of(&signal.name))?;
            variables.insert(signal.name.as_str(), var);
        }
        for signal in self.circuit.private_signals() {
            let var = cs.new_witness_variable(|| self.value_of(&signal.name))?;
            variables.insert(signal.name.as_str(), var);
        }

        for constraint in self.circuit.constraints().iter() {
            cs.enforce_constraint(
                lower(&constraint.a, &variables)?,
                lower(&constraint.b, &variables)?,
                lower(&constraint.c, &variables)?,
            )?;
        }

        Ok(())
    }
}

/// Translate a named linear combination into arkworks variables; the constant rides on `One`.
fn lower(
    lc: &LinearCombination,
    variables: &HashMap<&str, Variable>,
) -> Result<ArkLinearCombination<Fr>, SynthesisError> {
    let mut out = ArkLinearCombination::<Fr>::zero();
    if !lc.constant_term().is_zero() {
        out = out + (lc.constant_term().into_fr(), Variable::One);
    }
    for (name, coeff) in lc.terms() {
        let var = variables.get(name).copied().ok_or(SynthesisError::Unsatisfiable)?;
        out = out + (coeff.into_fr(), var);
    }
    Ok(out)
}
