//! Assignment expressions: how an intermediate signal's value is computed from resolved signals.

use crate::constraint::LinearCombination;
use crate::error::{CircuitError, Result};
use crate::field::FieldElement;
use crate::signal::SignalTable;
use std::collections::BTreeSet;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Constant(FieldElement),
    Signal(String),
    Lc(LinearCombination),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Pow(Box<Expr>, u64),
}

/// Why an expression could not be evaluated. The caller attaches the target signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    Unresolved(String),
    Unknown(String),
    DivisionByZero,
}

/// `a * b + linear`, with every part linear in the signals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuadraticForm {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub linear: LinearCombination,
}

impl QuadraticForm {
    fn linear(lc: LinearCombination) -> Self {
        Self { a: lc, b: LinearCombination::one(), linear: LinearCombination::zero() }
    }

    fn scale(self, k: FieldElement) -> Self {
        Self { a: self.a.scale(k), b: self.b, linear: self.linear.scale(k) }
    }

    fn plus(self, lin: LinearCombination) -> Self {
        Self { linear: self.linear + lin, ..self }
    }

    fn negate(self) -> Self {
        Self { a: -self.a, b: self.b, linear: -self.linear }
    }
}

impl Expr {
    pub fn signal(name: impl Into<String>) -> Self {
        Expr::Signal(name.into())
    }

    pub fn constant(c: impl Into<FieldElement>) -> Self {
        Expr::Constant(c.into())
    }

    pub fn pow(self, exp: u64) -> Self {
        Expr::Pow(Box::new(self), exp)
    }

    pub fn evaluate(&self, table: &SignalTable) -> Result<FieldElement, EvalError> {
        let value = match self {
            Expr::Constant(c) => *c,
            Expr::Signal(name) => read(table, name)?,
            Expr::Lc(lc) => {
                let mut acc = lc.constant_term();
                for (name, coeff) in lc.terms() {
                    acc += coeff * read(table, name)?;
                }
                acc
            }
            Expr::Add(l, r) => l.evaluate(table)? + r.evaluate(table)?,
            Expr::Sub(l, r) => l.evaluate(table)? - r.evaluate(table)?,
            Expr::Mul(l, r) => l.evaluate(table)? * r.evaluate(table)?,
            Expr::Div(l, r) => {
                let num = l.evaluate(table)?;
                let den = r.evaluate(table)?;
                num.checked_div(&den).map_err(|_| EvalError::DivisionByZero)?
            }
            Expr::Neg(e) => -e.evaluate(table)?,
            Expr::Pow(e, exp) => e.evaluate(table)?.pow(*exp),
        };
        Ok(value)
    }

    /// Every signal the expression reads.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Signal(name) => {
                out.insert(name.clone());
            }
            Expr::Lc(lc) => out.extend(lc.signals().map(str::to_string)),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                l.collect_dependencies(out);
                r.collect_dependencies(out);
            }
            Expr::Neg(e) | Expr::Pow(e, _) => e.collect_dependencies(out),
        }
    }

    /// The expression as a linear combination, if it is affine in the signals.
    pub fn as_linear(&self) -> Option<LinearCombination> {
        match self {
            Expr::Constant(c) => Some(LinearCombination::constant(*c)),
            Expr::Signal(name) => Some(LinearCombination::signal(name.clone())),
            Expr::Lc(lc) => Some(lc.clone()),
            Expr::Add(l, r) => Some(l.as_linear()? + r.as_linear()?),
            Expr::Sub(l, r) => Some(l.as_linear()? - r.as_linear()?),
            Expr::Neg(e) => Some(-e.as_linear()?),
            Expr::Mul(l, r) => {
                let (l, r) = (l.as_linear()?, r.as_linear()?);
                if l.is_constant() {
                    Some(r.scale(l.constant_term()))
                } else if r.is_constant() {
                    Some(l.scale(r.constant_term()))
                } else {
                    None
                }
            }
            Expr::Div(l, r) => {
                let r = r.as_linear()?;
                if !r.is_constant() {
                    return None;
                }
                let inv = r.constant_term().inverse().ok()?;
                Some(l.as_linear()?.scale(inv))
            }
            Expr::Pow(_, 0) => Some(LinearCombination::one()),
            Expr::Pow(e, 1) => e.as_linear(),
            Expr::Pow(e, exp) => {
                let lc = e.as_linear()?;
                if lc.is_constant() {
                    Some(LinearCombination::constant(lc.constant_term().pow(*exp)))
                } else {
                    None
                }
            }
        }
    }

    /// Split the expression into `A * B + L` with `A`, `B` and `L` linear, the shape a single
    /// rank-1 constraint `A * B = target - L` can carry. Linear expressions come back as
    /// `lc * 1 + 0`.
    pub fn quadratic_form(&self) -> Option<QuadraticForm> {
        if let Some(lc) = self.as_linear() {
            return Some(QuadraticForm::linear(lc));
        }
        match self {
            Expr::Mul(l, r) => match (l.as_linear(), r.as_linear()) {
                (Some(a), Some(b)) => Some(QuadraticForm { a, b, linear: LinearCombination::zero() }),
                (Some(k), None) if k.is_constant() => Some(r.quadratic_form()?.scale(k.constant_term())),
                (None, Some(k)) if k.is_constant() => Some(l.quadratic_form()?.scale(k.constant_term())),
                _ => None,
            },
            Expr::Div(l, r) => {
                let k = r.as_linear()?;
                if !k.is_constant() {
                    return None;
                }
                let inv = k.constant_term().inverse().ok()?;
                Some(l.quadratic_form()?.scale(inv))
            }
            Expr::Add(l, r) => match (l.as_linear(), r.as_linear()) {
                (Some(lin), None) => Some(r.quadratic_form()?.plus(lin)),
                (None, Some(lin)) => Some(l.quadratic_form()?.plus(lin)),
                _ => None,
            },
            Expr::Sub(l, r) => match (l.as_linear(), r.as_linear()) {
                (Some(lin), None) => Some(r.quadratic_form()?.negate().plus(lin)),
                (None, Some(lin)) => Some(l.quadratic_form()?.plus(-lin)),
                _ => None,
            },
            Expr::Pow(e, 2) => {
                let lc = e.as_linear()?;
                Some(QuadraticForm { a: lc.clone(), b: lc, linear: LinearCombination::zero() })
            }
            Expr::Neg(e) => Some(e.quadratic_form()?.negate()),
            _ => None,
        }
    }

    pub(crate) fn into_circuit_error(err: EvalError, target: &str) -> CircuitError {
        match err {
            EvalError::Unresolved(dependency) => {
                CircuitError::UnresolvedDependency { signal: target.to_string(), dependency }
            }
            EvalError::Unknown(name) => CircuitError::UnknownSignal(name),
            EvalError::DivisionByZero => CircuitError::DivisionByZero { signal: target.to_string() },
        }
    }
}

fn read(table: &SignalTable, name: &str) -> Result<FieldElement, EvalError> {
    let signal = table.get(name).ok_or_else(|| EvalError::Unknown(name.to_string()))?;
    signal.value.ok_or_else(|| EvalError::Unresolved(name.to_string()))
}

impl From<FieldElement> for Expr {
    fn from(c: FieldElement) -> Self {
        Expr::Constant(c)
    }
}

impl From<u64> for Expr {
    fn from(c: u64) -> Self {
        Expr::Constant(FieldElement::from(c))
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::Signal(name.to_string())
    }
}

impl From<String> for Expr {
    fn from(name: String) -> Self {
        Expr::Signal(name)
    }
}

impl From<LinearCombination> for Expr {
    fn from(lc: LinearCombination) -> Self {
        Expr::Lc(lc)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<T: Into<Expr>> $trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs.into()))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}
