//! Arithmetic over the BN254 scalar field.
//!
//! Every value is kept canonical in `[0, p)`; negative intermediate results never leak out.
//! Division goes through a checked modular inverse and fails on zero instead of returning 0.

use ark_bn254::Fr;
use ark_ff::{Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid field element: {0:?}")]
    Parse(String),

    #[error("field encoding error: {0}")]
    Encoding(String),
}

/// An element of the BN254 scalar field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(Fr);

impl FieldElement {
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    pub fn one() -> Self {
        Self(Fr::one())
    }

    /// Lift a signed integer, mapping `-n` to `p - n`.
    pub fn from_i64(v: i64) -> Self {
        let magnitude = Self::from(v.unsigned_abs());
        if v < 0 { -magnitude } else { magnitude }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn pow(&self, exp: u64) -> Self {
        Self(self.0.pow([exp]))
    }

    /// Modular inverse. Zero has none.
    pub fn inverse(&self) -> Result<Self, FieldError> {
        self.0.inverse().map(Self).ok_or(FieldError::DivisionByZero)
    }

    pub fn checked_div(&self, rhs: &Self) -> Result<Self, FieldError> {
        Ok(*self * rhs.inverse()?)
    }

    pub fn into_fr(self) -> Fr {
        self.0
    }

    /// Hex of the canonical compressed (little-endian) encoding, matching `ark-serialize`.
    pub fn to_hex(&self) -> Result<String, FieldError> {
        let mut bytes = Vec::new();
        self.0
            .serialize_compressed(&mut bytes)
            .map_err(|e| FieldError::Encoding(format!("{e}")))?;
        Ok(hex::encode(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, FieldError> {
        let bytes = hex::decode(s).map_err(|e| FieldError::Encoding(format!("invalid hex: {e}")))?;
        Fr::deserialize_compressed(&bytes[..])
            .map(Self)
            .map_err(|e| FieldError::Encoding(format!("invalid field bytes: {e}")))
    }
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self(Fr::from(v))
    }
}

impl From<Fr> for FieldElement {
    fn from(v: Fr) -> Self {
        Self(v)
    }
}

impl From<FieldElement> for Fr {
    fn from(v: FieldElement) -> Self {
        v.0
    }
}

impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for FieldElement {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for FieldElement {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for FieldElement {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 *= rhs.0;
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.into_bigint())
    }
}

/// Parses a decimal integer, reducing it modulo p.
impl FromStr for FieldElement {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::Parse(s.to_string()));
        }
        // `Fr::from_str` rejects leading zeros.
        let digits = trimmed.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero());
        }
        Fr::from_str(digits)
            .map(Self)
            .map_err(|_| FieldError::Parse(s.to_string()))
    }
}

// Decimal strings on the wire, the way circom input and witness files carry them.
impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Self::from(n)),
        }
    }
}
