//! Linear combinations and the rank-1 constraint store.

use crate::error::Result;
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

/// `sum(coeff_i * signal_i) + constant`.
///
/// Coefficients live in a sorted map keyed by signal name; a zero coefficient is never stored, so
/// two equal combinations compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCombination {
    terms: BTreeMap<String, FieldElement>,
    constant: FieldElement,
}

impl LinearCombination {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: FieldElement) -> Self {
        Self { terms: BTreeMap::new(), constant: c }
    }

    pub fn one() -> Self {
        Self::constant(FieldElement::one())
    }

    pub fn signal(name: impl Into<String>) -> Self {
        Self::term(name, FieldElement::one())
    }

    pub fn term(name: impl Into<String>, coeff: FieldElement) -> Self {
        let mut lc = Self::zero();
        lc.add_term(name, coeff);
        lc
    }

    pub fn add_term(&mut self, name: impl Into<String>, coeff: FieldElement) {
        let name = name.into();
        let updated = self.terms.get(&name).copied().unwrap_or_default() + coeff;
        if updated.is_zero() {
            self.terms.remove(&name);
        } else {
            self.terms.insert(name, updated);
        }
    }

    pub fn add_constant(&mut self, c: FieldElement) {
        self.constant += c;
    }

    pub fn coefficient(&self, name: &str) -> FieldElement {
        self.terms.get(name).copied().unwrap_or_default()
    }

    pub fn constant_term(&self) -> FieldElement {
        self.constant
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, FieldElement)> {
        self.terms.iter().map(|(name, coeff)| (name.as_str(), *coeff))
    }

    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// No signal terms, only the constant.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn scale(&self, factor: FieldElement) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self.terms.iter().map(|(name, coeff)| (name.clone(), *coeff * factor)).collect(),
            constant: self.constant * factor,
        }
    }

    /// Rewrite every signal name, e.g. to namespace a component.
    pub fn rename(&self, f: impl Fn(&str) -> String) -> Self {
        let mut out = Self::constant(self.constant);
        for (name, coeff) in &self.terms {
            out.add_term(f(name), *coeff);
        }
        out
    }

    /// Dot product with the values returned by `lookup`.
    pub fn evaluate<F>(&self, mut lookup: F) -> Result<FieldElement>
    where
        F: FnMut(&str) -> Result<FieldElement>,
    {
        let mut acc = self.constant;
        for (name, coeff) in &self.terms {
            acc += *coeff * lookup(name)?;
        }
        Ok(acc)
    }
}

impl From<FieldElement> for LinearCombination {
    fn from(c: FieldElement) -> Self {
        Self::constant(c)
    }
}

impl From<&str> for LinearCombination {
    fn from(name: &str) -> Self {
        Self::signal(name)
    }
}

impl Add for LinearCombination {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (name, coeff) in rhs.terms {
            self.add_term(name, coeff);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearCombination {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for LinearCombination {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-FieldElement::one())
    }
}

impl Mul<FieldElement> for LinearCombination {
    type Output = Self;

    fn mul(self, rhs: FieldElement) -> Self {
        self.scale(rhs)
    }
}

/// `a * b = c`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
    pub label: Option<String>,
}

impl Constraint {
    /// Returns whether `<a,w> * <b,w> == <c,w>`.
    pub fn is_satisfied<F>(&self, mut lookup: F) -> Result<bool>
    where
        F: FnMut(&str) -> Result<FieldElement>,
    {
        let a = self.a.evaluate(&mut lookup)?;
        let b = self.b.evaluate(&mut lookup)?;
        let c = self.c.evaluate(&mut lookup)?;
        Ok(a * b == c)
    }

    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.a.signals().chain(self.b.signals()).chain(self.c.signals())
    }
}

/// Ordered list of constraints. Indices are stable and used in violation reports.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConstraintStore {
    constraints: Vec<Constraint>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, a: LinearCombination, b: LinearCombination, c: LinearCombination) -> usize {
        self.push(Constraint { a, b, c, label: None })
    }

    pub fn add_labeled(
        &mut self,
        label: impl Into<String>,
        a: LinearCombination,
        b: LinearCombination,
        c: LinearCombination,
    ) -> usize {
        self.push(Constraint { a, b, c, label: Some(label.into()) })
    }

    pub fn push(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check every constraint and return the indices of the ones that fail, in order.
    ///
    /// Does not stop at the first failure, so a caller sees every broken relation at once.
    pub fn check_all<F>(&self, mut lookup: F) -> Result<Vec<usize>>
    where
        F: FnMut(&str) -> Result<FieldElement>,
    {
        let mut violated = Vec::new();
        for (idx, constraint) in self.constraints.iter().enumerate() {
            if !constraint.is_satisfied(&mut lookup)? {
                violated.push(idx);
            }
        }
        Ok(violated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircuitError;
    use std::collections::HashMap;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from(v)
    }

    fn lookup_in<'a>(values: &'a HashMap<&'a str, FieldElement>) -> impl FnMut(&str) -> Result<FieldElement> + 'a {
        move |name| values.get(name).copied().ok_or_else(|| CircuitError::Unassigned(name.to_string()))
    }

    #[test]
    fn zero_coefficients_are_dropped() {
        let mut lc = LinearCombination::signal("a");
        lc.add_term("a", -fe(1));
        assert!(lc.is_constant());
        assert_eq!(lc, LinearCombination::zero());

        let diff = LinearCombination::signal("x") - LinearCombination::signal("x");
        assert_eq!(diff, LinearCombination::zero());
    }

    #[test]
    fn evaluate_includes_constant() {
        let values = HashMap::from([("a", fe(3)), ("b", fe(4))]);
        let mut lc = LinearCombination::term("a", fe(2)) + LinearCombination::signal("b");
        lc.add_constant(fe(10));
        assert_eq!(lc.evaluate(lookup_in(&values)).unwrap(), fe(20));
        assert_eq!(lc.scale(fe(3)).evaluate(lookup_in(&values)).unwrap(), fe(60));
    }

    #[test]
    fn rename_namespaces_signals() {
        let lc = LinearCombination::term("in", fe(5)) + LinearCombination::one();
        let renamed = lc.rename(|n| format!("h0.{n}"));
        assert_eq!(renamed.coefficient("h0.in"), fe(5));
        assert_eq!(renamed.coefficient("in"), FieldElement::zero());
        assert_eq!(renamed.constant_term(), fe(1));
    }

    #[test]
    fn check_all_reports_every_violation() {
        let mut store = ConstraintStore::new();
        // a * b = c
        store.add("a".into(), "b".into(), "c".into());
        // a * 1 = 3
        store.add("a".into(), LinearCombination::one(), fe(3).into());
        // b * 1 = 5 (wrong)
        store.add_labeled("b_is_five", "b".into(), LinearCombination::one(), fe(5).into());

        let good = HashMap::from([("a", fe(3)), ("b", fe(4)), ("c", fe(12))]);
        assert_eq!(store.check_all(lookup_in(&good)).unwrap(), vec![2]);

        let bad = HashMap::from([("a", fe(2)), ("b", fe(4)), ("c", fe(12))]);
        assert_eq!(store.check_all(lookup_in(&bad)).unwrap(), vec![0, 1, 2]);
        assert_eq!(store.get(2).unwrap().label.as_deref(), Some("b_is_five"));
    }

    #[test]
    fn check_all_propagates_missing_values() {
        let mut store = ConstraintStore::new();
        store.add("a".into(), "b".into(), "c".into());
        let partial = HashMap::from([("a", fe(1))]);
        assert_eq!(
            store.check_all(lookup_in(&partial)),
            Err(CircuitError::Unassigned("b".into()))
        );
    }
}
