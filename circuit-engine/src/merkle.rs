//! Merkle inclusion over the Poseidon two-to-one hash.
//!
//! Each level combines the running hash `h` with a sibling `s` under a direction `d`:
//! `d = 0` hashes `(h, s)`, `d = 1` hashes `(s, h)`. The choice is made arithmetically,
//! `left = h + d*(s - h)` and `right = s - d*(s - h)`, which is `(1-d)*h + d*s` and
//! `d*h + (1-d)*s` with a single multiplication. Both the native checker and the circuit run this
//! same fixed sequence for every input; neither branches on `d`.
//!
//! The checker does not require `d` to be a bit. Whoever declares `d` enforces `d*(1-d) = 0`;
//! [`inclusion_template`] does so for its `path_indices`.

use crate::circuit::Circuit;
use crate::constants::MAX_TREE_DEPTH;
use crate::constraint::LinearCombination;
use crate::error::{CircuitError, Result};
use crate::expr::Expr;
use crate::field::FieldElement;
use crate::poseidon::{hash_two, hasher_template};
use crate::signal::SignalKind;
use crate::templates::enforce_binary;
use crate::witness::Inputs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label of the constraint binding the computed root to the public `root` input.
pub const ROOT_CONSTRAINT: &str = "root";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub sibling: FieldElement,
    pub direction: FieldElement,
}

impl PathStep {
    /// The running hash is the left child.
    pub fn left(sibling: FieldElement) -> Self {
        Self { sibling, direction: FieldElement::zero() }
    }

    /// The running hash is the right child.
    pub fn right(sibling: FieldElement) -> Self {
        Self { sibling, direction: FieldElement::one() }
    }
}

/// Sibling/direction pairs from leaf level up to just below the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    pub steps: Vec<PathStep>,
}

impl MerklePath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

/// One level: blend, then hash.
pub fn hash_step(current: FieldElement, step: &PathStep) -> FieldElement {
    let delta = step.direction * (step.sibling - current);
    hash_two(current + delta, step.sibling - delta)
}

pub fn compute_root(leaf: FieldElement, path: &MerklePath) -> FieldElement {
    path.steps.iter().fold(leaf, hash_step)
}

/// Fails with [`CircuitError::RootMismatch`] unless `path` leads from `leaf` to `root`.
pub fn verify_inclusion(leaf: FieldElement, path: &MerklePath, root: FieldElement) -> Result<()> {
    let computed = compute_root(leaf, path);
    if computed != root {
        return Err(CircuitError::RootMismatch { expected: root, computed });
    }
    Ok(())
}

/// A complete binary tree of fixed depth; missing leaves are zero.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    // levels[0] holds the leaves, levels[depth] the root.
    levels: Vec<Vec<FieldElement>>,
}

impl MerkleTree {
    pub fn new(depth: usize, leaves: &[FieldElement]) -> Result<Self> {
        if depth > MAX_TREE_DEPTH {
            return Err(CircuitError::DepthTooLarge { depth, max: MAX_TREE_DEPTH });
        }
        let capacity = 1usize << depth;
        if leaves.len() > capacity {
            return Err(CircuitError::TooManyLeaves { count: leaves.len(), depth });
        }

        let mut level = leaves.to_vec();
        level.resize(capacity, FieldElement::zero());
        let mut levels = vec![level];
        for _ in 0..depth {
            let below = levels.last().map(Vec::as_slice).unwrap_or_default();
            let above: Vec<FieldElement> = below.chunks(2).map(|pair| hash_two(pair[0], pair[1])).collect();
            levels.push(above);
        }

        Ok(Self { levels })
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn root(&self) -> FieldElement {
        self.levels[self.depth()][0]
    }

    pub fn leaf(&self, index: usize) -> Option<FieldElement> {
        self.levels[0].get(index).copied()
    }

    /// Authentication path for the leaf at `index`.
    pub fn path(&self, index: usize) -> Result<MerklePath> {
        let capacity = self.levels[0].len();
        if index >= capacity {
            return Err(CircuitError::LeafIndexOutOfRange { index, capacity });
        }

        let mut steps = Vec::with_capacity(self.depth());
        let mut idx = index;
        for level in &self.levels[..self.depth()] {
            steps.push(PathStep {
                sibling: level[idx ^ 1],
                direction: FieldElement::from((idx & 1) as u64),
            });
            idx >>= 1;
        }
        Ok(MerklePath { steps })
    }
}

/// Inclusion circuit of fixed `depth`.
///
/// Public `root`; private `leaf`, `path_elements[i]`, `path_indices[i]`. Level `i` adds the
/// binary constraint on `path_indices[i]`, one selector multiplication `selector[i]` and a
/// `hashers[i]` Poseidon component. The last constraint, labeled [`ROOT_CONSTRAINT`], equates the
/// final hash with `root`.
pub fn inclusion_template(depth: usize) -> Result<Circuit> {
    let hasher = hasher_template()?;
    let mut circuit = Circuit::new(format!("merkle_inclusion_{depth}"));
    circuit.declare("root", SignalKind::Public)?;
    circuit.declare("leaf", SignalKind::Private)?;
    let siblings = circuit.declare_array("path_elements", depth, SignalKind::Private)?;
    let directions = circuit.declare_array("path_indices", depth, SignalKind::Private)?;
    for direction in &directions {
        enforce_binary(&mut circuit, direction)?;
    }

    let mut current = LinearCombination::signal("leaf");
    for (i, (sibling, direction)) in siblings.iter().zip(&directions).enumerate() {
        // selector = d * (s - h)
        let selector = format!("selector[{i}]");
        circuit.declare(selector.as_str(), SignalKind::Intermediate)?;
        let diff = LinearCombination::signal(sibling.as_str()) - current.clone();
        circuit.assign_constrained(&selector, Expr::signal(direction.as_str()) * Expr::from(diff))?;

        let left = current + LinearCombination::signal(selector.as_str());
        let right = LinearCombination::signal(sibling.as_str()) - LinearCombination::signal(selector.as_str());
        let prefix = format!("hashers[{i}]");
        circuit.include(&prefix, &hasher, [("left", Expr::from(left)), ("right", Expr::from(right))])?;
        current = LinearCombination::signal(format!("{prefix}.out"));
    }

    circuit.constrain_labeled(ROOT_CONSTRAINT, current, LinearCombination::one(), "root")?;
    debug!(
        depth,
        signals = circuit.signals().len(),
        constraints = circuit.num_constraints(),
        "built merkle inclusion template"
    );
    Ok(circuit)
}

/// Input assignment for [`inclusion_template`].
pub fn inclusion_inputs(leaf: FieldElement, path: &MerklePath, root: FieldElement) -> Inputs {
    let mut inputs = Inputs::new();
    inputs.insert("leaf".to_string(), leaf);
    inputs.insert("root".to_string(), root);
    for (i, step) in path.steps.iter().enumerate() {
        inputs.insert(format!("path_elements[{i}]"), step.sibling);
        inputs.insert(format!("path_indices[{i}]"), step.direction);
    }
    inputs
}
