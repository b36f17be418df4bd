//! Witness engine for fixed-topology arithmetic circuits.
//!
//! This crate contains:
//! - BN254 field arithmetic, a single-assignment signal table and a rank-1 constraint store.
//! - A circuit builder with assignment, constraint and assignment-with-constraint operators,
//!   plus flattening of sub-circuits.
//! - A witness evaluator that replays assignments and reports every violated constraint.
//! - A Poseidon two-to-one hash gate and a Merkle inclusion checker built from it.
//! - A bridge that hands a circuit and witness to arkworks proving backends.

pub mod circuit;
pub mod constants;
pub mod constraint;
pub mod error;
pub mod expr;
pub mod field;
pub mod merkle;
pub mod poseidon;
pub mod signal;
pub mod synthesis;
pub mod templates;
pub mod witness;

pub use circuit::Circuit;
pub use error::{CircuitError, Result};
pub use field::FieldElement;
pub use witness::{compute_witness, evaluate, Inputs, Witness, WitnessReport};
