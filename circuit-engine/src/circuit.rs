//! Circuit declaration: signals, assignment expressions and constraints.
//!
//! A circuit has three ways to relate signals, mirroring the three circom operators:
//! - [`Circuit::assign`] computes a value without constraining it (`<--`).
//! - [`Circuit::constrain`] adds a rank-1 relation without computing anything (`===`).
//! - [`Circuit::assign_constrained`] does both (`<==`) and needs an `A*B` shaped expression.
//!
//! Components are flattened on inclusion: the child's signals, assignments and constraints are
//! copied under a dotted prefix and its inputs are wired to expressions over the parent's signals.
//! Once built, a circuit is never mutated by witness computation.

use crate::constraint::{Constraint, ConstraintStore, LinearCombination};
use crate::error::{CircuitError, Result};
use crate::expr::Expr;
use crate::field::FieldElement;
use crate::signal::{Signal, SignalKind, SignalTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One replayable step of witness computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub target: String,
    pub expr: Expr,
}

/// Structural size of a circuit. This is all a key-generation ceremony gets to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintShape {
    pub num_constraints: usize,
    pub num_public: usize,
    pub num_private: usize,
    pub num_signals: usize,
}

/// Sparse matrix form `(A, B, C)` over the column layout `[1, public.., private..]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct R1csMatrices {
    pub num_instance_variables: usize,
    pub num_witness_variables: usize,
    pub columns: Vec<String>,
    pub a: Vec<Vec<(usize, FieldElement)>>,
    pub b: Vec<Vec<(usize, FieldElement)>>,
    pub c: Vec<Vec<(usize, FieldElement)>>,
}

#[derive(Clone, Debug)]
pub struct Circuit {
    name: String,
    signals: SignalTable,
    assignments: Vec<Assignment>,
    assigned: HashSet<String>,
    constraints: ConstraintStore,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: SignalTable::new(),
            assignments: Vec::new(),
            assigned: HashSet::new(),
            constraints: ConstraintStore::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: SignalKind) -> Result<()> {
        self.signals.declare(name, kind).map(|_| ())
    }

    /// Declare `name[0] .. name[len-1]` and return their names.
    pub fn declare_array(&mut self, name: &str, len: usize, kind: SignalKind) -> Result<Vec<String>> {
        (0..len)
            .map(|i| {
                let item = format!("{name}[{i}]");
                self.declare(item.clone(), kind)?;
                Ok(item)
            })
            .collect()
    }

    /// Compute `target` from `expr` without constraining it.
    pub fn assign(&mut self, target: &str, expr: impl Into<Expr>) -> Result<()> {
        let expr = expr.into();
        let kind = self
            .signals
            .kind(target)
            .ok_or_else(|| CircuitError::UnknownSignal(target.to_string()))?;
        if kind.is_input() {
            return Err(CircuitError::InputAssignment(target.to_string()));
        }
        if self.assigned.contains(target) {
            return Err(CircuitError::AlreadyAssigned(target.to_string()));
        }
        for dep in expr.dependencies() {
            self.ensure_declared(&dep)?;
        }
        self.assigned.insert(target.to_string());
        self.assignments.push(Assignment { target: target.to_string(), expr });
        Ok(())
    }

    /// Enforce `a * b = c`. Returns the constraint index.
    pub fn constrain(
        &mut self,
        a: impl Into<LinearCombination>,
        b: impl Into<LinearCombination>,
        c: impl Into<LinearCombination>,
    ) -> Result<usize> {
        self.push_constraint(Constraint { a: a.into(), b: b.into(), c: c.into(), label: None })
    }

    pub fn constrain_labeled(
        &mut self,
        label: impl Into<String>,
        a: impl Into<LinearCombination>,
        b: impl Into<LinearCombination>,
        c: impl Into<LinearCombination>,
    ) -> Result<usize> {
        self.push_constraint(Constraint {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            label: Some(label.into()),
        })
    }

    /// Enforce `lhs = rhs` as `lhs * 1 = rhs`.
    pub fn constrain_equal(
        &mut self,
        lhs: impl Into<LinearCombination>,
        rhs: impl Into<LinearCombination>,
    ) -> Result<usize> {
        self.constrain(lhs, LinearCombination::one(), rhs)
    }

    /// Compute `target` from `expr` and enforce `A * B = target - L` for `expr = A * B + L`.
    pub fn assign_constrained(&mut self, target: &str, expr: impl Into<Expr>) -> Result<usize> {
        let expr = expr.into();
        let form = expr
            .quadratic_form()
            .ok_or_else(|| CircuitError::NonQuadratic(target.to_string()))?;
        self.assign(target, expr)?;
        self.constrain(form.a, form.b, LinearCombination::signal(target) - form.linear)
    }

    /// Flatten `child` into this circuit under `prefix`.
    ///
    /// Every child input must appear exactly once in `wires`, keyed by its unprefixed name. The
    /// wire expressions are evaluated over this circuit's signals and bound with `<==` semantics.
    /// All checks run before anything is declared, so a failed call leaves the circuit untouched.
    pub fn include<'w>(
        &mut self,
        prefix: &str,
        child: &Circuit,
        wires: impl IntoIterator<Item = (&'w str, Expr)>,
    ) -> Result<()> {
        let namespaced = |name: &str| format!("{prefix}.{name}");

        let mut wires: BTreeMap<&str, Expr> = wires.into_iter().collect();
        for name in wires.keys().copied() {
            match child.signals.kind(name) {
                Some(kind) if kind.is_input() => {}
                Some(_) => return Err(CircuitError::NotAnInput(namespaced(name))),
                None => return Err(CircuitError::UnknownSignal(namespaced(name))),
            }
        }
        let inputs: Vec<&Signal> = child.signals.iter().filter(|s| s.kind.is_input()).collect();
        if let Some(unwired) = inputs.iter().find(|s| !wires.contains_key(s.name.as_str())) {
            return Err(CircuitError::UnwiredInput(namespaced(&unwired.name)));
        }
        for (name, wire) in &wires {
            for dep in wire.dependencies() {
                self.ensure_declared(&dep)?;
            }
            if wire.quadratic_form().is_none() {
                return Err(CircuitError::NonQuadratic(namespaced(*name)));
            }
        }
        if let Some(taken) = child.signals.iter().map(|s| namespaced(&s.name)).find(|n| self.signals.contains(n)) {
            return Err(CircuitError::DuplicateSignal(taken));
        }

        for signal in child.signals.iter() {
            self.declare(namespaced(&signal.name), SignalKind::Intermediate)?;
        }

        for signal in inputs {
            if let Some(wire) = wires.remove(signal.name.as_str()) {
                self.assign_constrained(&namespaced(&signal.name), wire)?;
            }
        }

        for assignment in &child.assignments {
            let target = namespaced(&assignment.target);
            self.assigned.insert(target.clone());
            self.assignments.push(Assignment {
                target,
                expr: rename_expr(&assignment.expr, &namespaced),
            });
        }

        for constraint in child.constraints.iter() {
            self.constraints.push(Constraint {
                a: constraint.a.rename(&namespaced),
                b: constraint.b.rename(&namespaced),
                c: constraint.c.rename(&namespaced),
                label: constraint.label.as_deref().map(|l| namespaced(l)),
            });
        }

        Ok(())
    }

    /// Build-time dependency check.
    ///
    /// Replays the assignment order symbolically: every expression may only read inputs or
    /// signals assigned earlier, and every non-input signal must be assigned somewhere.
    pub fn validate(&self) -> Result<()> {
        let mut resolved: HashSet<&str> = self
            .signals
            .iter()
            .filter(|s| s.kind.is_input())
            .map(|s| s.name.as_str())
            .collect();

        for assignment in &self.assignments {
            for dep in assignment.expr.dependencies() {
                if !resolved.contains(dep.as_str()) {
                    return Err(CircuitError::UnresolvedDependency {
                        signal: assignment.target.clone(),
                        dependency: dep,
                    });
                }
            }
            resolved.insert(assignment.target.as_str());
        }

        match self.signals.iter().find(|s| !resolved.contains(s.name.as_str())) {
            Some(signal) => Err(CircuitError::Unassigned(signal.name.clone())),
            None => Ok(()),
        }
    }

    pub fn signals(&self) -> &SignalTable {
        &self.signals
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    /// Index of the first constraint carrying `label`.
    pub fn constraint_index(&self, label: &str) -> Option<usize> {
        self.constraints.iter().position(|c| c.label.as_deref() == Some(label))
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Public statement order: outputs first, then public inputs, each in declaration order.
    pub fn public_signals(&self) -> Vec<&Signal> {
        let outputs = self.signals.iter().filter(|s| s.kind == SignalKind::Output);
        let inputs = self.signals.iter().filter(|s| s.kind == SignalKind::Public);
        outputs.chain(inputs).collect()
    }

    pub fn private_signals(&self) -> Vec<&Signal> {
        self.signals.iter().filter(|s| !s.kind.is_public()).collect()
    }

    /// Signals in matrix column order after the constant-one column: public statement, then the
    /// rest. [`Circuit::to_matrices`] and [`crate::witness::Witness::to_vector`] both follow it.
    pub fn column_signals(&self) -> Vec<&Signal> {
        let mut columns = self.public_signals();
        columns.extend(self.private_signals());
        columns
    }

    pub fn shape(&self) -> ConstraintShape {
        let num_public = self.signals.iter().filter(|s| s.kind.is_public()).count();
        ConstraintShape {
            num_constraints: self.constraints.len(),
            num_public,
            num_private: self.signals.len() - num_public,
            num_signals: self.signals.len(),
        }
    }

    /// Export the constraint store as sparse matrices for a proving backend.
    pub fn to_matrices(&self) -> R1csMatrices {
        let mut columns = vec!["1".to_string()];
        columns.extend(self.column_signals().iter().map(|s| s.name.clone()));
        let num_instance_variables = 1 + self.public_signals().len();

        let position: BTreeMap<&str, usize> =
            columns.iter().enumerate().map(|(i, name)| (name.as_str(), i)).collect();
        let row = |lc: &LinearCombination| -> Vec<(usize, FieldElement)> {
            let mut out = Vec::new();
            if !lc.constant_term().is_zero() {
                out.push((0, lc.constant_term()));
            }
            for (name, coeff) in lc.terms() {
                // Every referenced signal was checked against the table on insertion.
                if let Some(&col) = position.get(name) {
                    out.push((col, coeff));
                }
            }
            out.sort_by_key(|(col, _)| *col);
            out
        };

        let mut matrices = R1csMatrices {
            num_instance_variables,
            num_witness_variables: columns.len() - num_instance_variables,
            columns: Vec::new(),
            a: Vec::with_capacity(self.constraints.len()),
            b: Vec::with_capacity(self.constraints.len()),
            c: Vec::with_capacity(self.constraints.len()),
        };
        for constraint in self.constraints.iter() {
            matrices.a.push(row(&constraint.a));
            matrices.b.push(row(&constraint.b));
            matrices.c.push(row(&constraint.c));
        }
        matrices.columns = columns;
        matrices
    }

    fn push_constraint(&mut self, constraint: Constraint) -> Result<usize> {
        for name in constraint.signals() {
            self.ensure_declared(name)?;
        }
        Ok(self.constraints.push(constraint))
    }

    fn ensure_declared(&self, name: &str) -> Result<()> {
        if self.signals.contains(name) {
            Ok(())
        } else {
            Err(CircuitError::UnknownSignal(name.to_string()))
        }
    }
}

fn rename_expr(expr: &Expr, f: &impl Fn(&str) -> String) -> Expr {
    let boxed = |e: &Expr| Box::new(rename_expr(e, f));
    match expr {
        Expr::Constant(c) => Expr::Constant(*c),
        Expr::Signal(name) => Expr::Signal(f(name)),
        Expr::Lc(lc) => Expr::Lc(lc.rename(f)),
        Expr::Add(l, r) => Expr::Add(boxed(l), boxed(r)),
        Expr::Sub(l, r) => Expr::Sub(boxed(l), boxed(r)),
        Expr::Mul(l, r) => Expr::Mul(boxed(l), boxed(r)),
        Expr::Div(l, r) => Expr::Div(boxed(l), boxed(r)),
        Expr::Neg(e) => Expr::Neg(boxed(e)),
        Expr::Pow(e, exp) => Expr::Pow(boxed(e), *exp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from(v)
    }

    fn square() -> Circuit {
        let mut c = Circuit::new("square");
        c.declare("in", SignalKind::Private).unwrap();
        c.declare("out", SignalKind::Output).unwrap();
        c.assign_constrained("out", Expr::signal("in") * "in").unwrap();
        c
    }

    #[test]
    fn structural_errors_are_reported_on_build() {
        let mut c = Circuit::new("t");
        c.declare("a", SignalKind::Public).unwrap();
        c.declare("b", SignalKind::Intermediate).unwrap();

        assert_eq!(
            c.declare("a", SignalKind::Private),
            Err(CircuitError::DuplicateSignal("a".into()))
        );
        assert_eq!(c.assign("zz", Expr::signal("a")), Err(CircuitError::UnknownSignal("zz".into())));
        assert_eq!(c.assign("b", Expr::signal("q")), Err(CircuitError::UnknownSignal("q".into())));
        assert_eq!(c.assign("a", Expr::constant(1u64)), Err(CircuitError::InputAssignment("a".into())));
        assert_eq!(
            c.constrain("a", "nope", "b"),
            Err(CircuitError::UnknownSignal("nope".into()))
        );

        c.assign("b", Expr::signal("a") + 1u64).unwrap();
        assert_eq!(c.assign("b", Expr::signal("a")), Err(CircuitError::AlreadyAssigned("b".into())));
    }

    #[test]
    fn assign_constrained_requires_quadratic_form() {
        let mut c = Circuit::new("t");
        c.declare("x", SignalKind::Private).unwrap();
        c.declare("y", SignalKind::Output).unwrap();
        assert_eq!(
            c.assign_constrained("y", Expr::signal("x").pow(3)),
            Err(CircuitError::NonQuadratic("y".into()))
        );
        // A failed `<==` must not leave a dangling assignment behind.
        assert!(c.assignments().is_empty());

        let idx = c.assign_constrained("y", Expr::signal("x") * "x").unwrap();
        let constraint = c.constraint(idx).unwrap();
        assert_eq!(constraint.a, LinearCombination::signal("x"));
        assert_eq!(constraint.c, LinearCombination::signal("y"));
    }

    #[test]
    fn include_flattens_with_namespacing() {
        let child = square();
        let mut parent = Circuit::new("parent");
        parent.declare("x", SignalKind::Public).unwrap();
        parent.declare("y", SignalKind::Output).unwrap();
        parent
            .include("sq", &child, [("in", Expr::signal("x") + 1u64)])
            .unwrap();
        parent.assign_constrained("y", Expr::signal("sq.out")).unwrap();

        assert!(parent.signals().contains("sq.in"));
        assert_eq!(parent.signals().kind("sq.out"), Some(SignalKind::Intermediate));
        // Wire + child constraint + output binding.
        assert_eq!(parent.num_constraints(), 3);
        let targets: Vec<_> = parent.assignments().iter().map(|a| a.target.as_str()).collect();
        assert_eq!(targets, vec!["sq.in", "sq.out", "y"]);
        parent.validate().unwrap();
    }

    #[test]
    fn include_checks_wiring() {
        let child = square();
        let mut parent = Circuit::new("parent");
        parent.declare("x", SignalKind::Public).unwrap();

        let empty: [(&str, Expr); 0] = [];
        assert_eq!(
            parent.include("a", &child, empty),
            Err(CircuitError::UnwiredInput("a.in".into()))
        );
        assert_eq!(
            parent.include("b", &child, [("bogus", Expr::signal("x"))]),
            Err(CircuitError::UnknownSignal("b.bogus".into()))
        );
        assert_eq!(
            parent.include("c", &child, [("out", Expr::signal("x"))]),
            Err(CircuitError::NotAnInput("c.out".into()))
        );
    }

    #[test]
    fn failed_include_leaves_no_trace() {
        let child = square();
        let mut parent = Circuit::new("parent");
        parent.declare("x", SignalKind::Public).unwrap();
        parent.declare("y", SignalKind::Output).unwrap();

        assert_eq!(
            parent.include("k", &child, [("in", Expr::signal("nope"))]),
            Err(CircuitError::UnknownSignal("nope".into()))
        );
        assert_eq!(
            parent.include("k", &child, [("in", Expr::signal("x").pow(3))]),
            Err(CircuitError::NonQuadratic("k.in".into()))
        );
        assert!(!parent.signals().contains("k.in"));
        assert!(!parent.signals().contains("k.out"));
        assert_eq!(parent.num_constraints(), 0);
        assert!(parent.assignments().is_empty());

        // A corrected call still goes through.
        parent.include("k", &child, [("in", Expr::signal("x"))]).unwrap();
        assert_eq!(
            parent.include("k", &child, [("in", Expr::signal("x"))]),
            Err(CircuitError::DuplicateSignal("k.in".into()))
        );
        assert_eq!(parent.signals().len(), 4);
        assert_eq!(parent.num_constraints(), 2);
    }

    #[test]
    fn assign_constrained_accepts_scaled_and_affine_products() {
        let mut c = Circuit::new("t");
        for name in ["a", "b", "d"] {
            c.declare(name, SignalKind::Private).unwrap();
        }
        c.declare("c", SignalKind::Output).unwrap();
        c.declare("e", SignalKind::Output).unwrap();

        let scaled = c.assign_constrained("c", Expr::signal("a") * "b" * 3u64).unwrap();
        assert_eq!(c.constraint(scaled).unwrap().a, LinearCombination::term("a", fe(3)));

        // e <== a*b + d becomes a*b = e - d.
        let affine = c.assign_constrained("e", Expr::signal("a") * "b" + "d").unwrap();
        let constraint = c.constraint(affine).unwrap();
        assert_eq!(constraint.c, LinearCombination::signal("e") - LinearCombination::signal("d"));
        c.validate().unwrap();

        let report = crate::witness::compute_witness(
            &c,
            &crate::witness::inputs([("a", fe(3)), ("b", fe(4)), ("d", fe(5))]),
        )
        .unwrap();
        assert!(report.is_valid());
        assert_eq!(report.witness.value("c"), Some(fe(36)));
        assert_eq!(report.witness.value("e"), Some(fe(17)));
    }

    #[test]
    fn validate_catches_ordering_and_gaps() {
        let mut c = Circuit::new("t");
        c.declare("a", SignalKind::Public).unwrap();
        c.declare("m", SignalKind::Intermediate).unwrap();
        c.declare("n", SignalKind::Intermediate).unwrap();
        c.assign("n", Expr::signal("m") * 2u64).unwrap();
        c.assign("m", Expr::signal("a")).unwrap();
        assert_eq!(
            c.validate(),
            Err(CircuitError::UnresolvedDependency { signal: "n".into(), dependency: "m".into() })
        );

        let mut c = Circuit::new("t");
        c.declare("a", SignalKind::Public).unwrap();
        c.declare("dangling", SignalKind::Output).unwrap();
        assert_eq!(c.validate(), Err(CircuitError::Unassigned("dangling".into())));
    }

    #[test]
    fn shape_and_matrices() {
        let mut c = Circuit::new("t");
        c.declare("a", SignalKind::Public).unwrap();
        c.declare("b", SignalKind::Private).unwrap();
        c.declare("c", SignalKind::Output).unwrap();
        c.assign_constrained("c", Expr::signal("a") * "b").unwrap();
        c.constrain_equal(LinearCombination::signal("a") + fe(2).into(), "c").unwrap();

        let shape = c.shape();
        assert_eq!(shape.num_constraints, 2);
        assert_eq!(shape.num_public, 2);
        assert_eq!(shape.num_private, 1);

        let m = c.to_matrices();
        assert_eq!(m.columns, vec!["1", "c", "a", "b"]);
        assert_eq!(m.num_instance_variables, 3);
        assert_eq!(m.num_witness_variables, 1);
        assert_eq!(m.a[0], vec![(2, fe(1))]);
        assert_eq!(m.b[0], vec![(3, fe(1))]);
        assert_eq!(m.c[0], vec![(1, fe(1))]);
        assert_eq!(m.a[1], vec![(0, fe(2)), (2, fe(1))]);
    }
}
