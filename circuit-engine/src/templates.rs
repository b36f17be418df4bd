//! Small reusable circuits and gadgets.

use crate::circuit::Circuit;
use crate::constraint::LinearCombination;
use crate::error::Result;
use crate::expr::Expr;
use crate::signal::SignalKind;

/// `c <== a * b` with public `a`, private `b` and output `c`.
pub fn multiplier() -> Result<Circuit> {
    let mut circuit = Circuit::new("multiplier");
    circuit.declare("a", SignalKind::Public)?;
    circuit.declare("b", SignalKind::Private)?;
    circuit.declare("c", SignalKind::Output)?;
    circuit.assign_constrained("c", Expr::signal("a") * "b")?;
    Ok(circuit)
}

/// A single public signal `x` constrained to be a bit.
pub fn binary_check() -> Result<Circuit> {
    let mut circuit = Circuit::new("binary_check");
    circuit.declare("x", SignalKind::Public)?;
    enforce_binary(&mut circuit, "x")?;
    Ok(circuit)
}

/// Add `x * (1 - x) = 0`, labeled `<x>.binary`. Returns the constraint index.
pub fn enforce_binary(circuit: &mut Circuit, signal: &str) -> Result<usize> {
    let x = LinearCombination::signal(signal);
    let one_minus_x = LinearCombination::one() - x.clone();
    circuit.constrain_labeled(format!("{signal}.binary"), x, one_minus_x, LinearCombination::zero())
}
