use crate::field::{FieldElement, FieldError};
use thiserror::Error;

/// Everything that can go wrong while building a circuit or computing a witness.
///
/// `DuplicateSignal`, `UnknownSignal`, `InputAssignment`, `NonQuadratic` and `UnwiredInput` are
/// construction mistakes. `MissingInput`, `UnresolvedDependency`, `DivisionByZero` abort a single
/// witness computation. `ConstraintViolated` is the ordinary "this witness is invalid" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("signal `{0}` is already declared")]
    DuplicateSignal(String),

    #[error("signal `{0}` is not declared")]
    UnknownSignal(String),

    #[error("signal `{0}` is already assigned")]
    AlreadyAssigned(String),

    #[error("signal `{0}` has no value")]
    Unassigned(String),

    #[error("missing value for input signal `{0}`")]
    MissingInput(String),

    #[error("signal `{0}` is not an input")]
    NotAnInput(String),

    #[error("input signal `{0}` cannot be the target of an assignment")]
    InputAssignment(String),

    #[error("assignment to `{signal}` reads `{dependency}` before it is resolved")]
    UnresolvedDependency { signal: String, dependency: String },

    #[error("division by zero while computing `{signal}`")]
    DivisionByZero { signal: String },

    #[error("expression assigned to `{0}` is not of the form A*B")]
    NonQuadratic(String),

    #[error("component input `{0}` is not wired")]
    UnwiredInput(String),

    #[error("constraints violated: {0:?}")]
    ConstraintViolated(Vec<usize>),

    #[error("merkle root mismatch: expected {expected}, computed {computed}")]
    RootMismatch { expected: FieldElement, computed: FieldElement },

    #[error("leaf index {index} out of range for {capacity} leaves")]
    LeafIndexOutOfRange { index: usize, capacity: usize },

    #[error("tree depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },

    #[error("{count} leaves do not fit in a tree of depth {depth}")]
    TooManyLeaves { count: usize, depth: usize },

    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type Result<T, E = CircuitError> = std::result::Result<T, E>;
