//! Named value slots with single-assignment semantics.

use crate::error::{CircuitError, Result};
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Public,
    Private,
    Intermediate,
    Output,
}

impl SignalKind {
    /// Public and private signals are supplied by the caller; the rest are computed.
    pub fn is_input(self) -> bool {
        matches!(self, SignalKind::Public | SignalKind::Private)
    }

    /// Signals that end up in the proof's public statement.
    pub fn is_public(self) -> bool {
        matches!(self, SignalKind::Public | SignalKind::Output)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub kind: SignalKind,
    pub value: Option<FieldElement>,
}

/// Flat store of signals in declaration order.
///
/// A value can be written once. A second write fails even when it carries the same value.
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
    signals: Vec<Signal>,
    index: HashMap<String, usize>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: SignalKind) -> Result<usize> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CircuitError::DuplicateSignal(name));
        }
        let idx = self.signals.len();
        self.index.insert(name.clone(), idx);
        self.signals.push(Signal { name, kind, value: None });
        Ok(idx)
    }

    pub fn assign(&mut self, name: &str, value: FieldElement) -> Result<()> {
        let idx = self.index_of(name).ok_or_else(|| CircuitError::UnknownSignal(name.to_string()))?;
        let slot = &mut self.signals[idx];
        if slot.value.is_some() {
            return Err(CircuitError::AlreadyAssigned(name.to_string()));
        }
        slot.value = Some(value);
        Ok(())
    }

    pub fn read(&self, name: &str) -> Result<FieldElement> {
        let signal = self.get(name).ok_or_else(|| CircuitError::UnknownSignal(name.to_string()))?;
        signal.value.ok_or_else(|| CircuitError::Unassigned(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.index_of(name).map(|idx| &self.signals[idx])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<SignalKind> {
        self.get(name).map(|s| s.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// True once every declared signal holds a value.
    pub fn is_complete(&self) -> bool {
        self.signals.iter().all(|s| s.value.is_some())
    }

    /// Same declarations, no values.
    pub fn cleared(&self) -> Self {
        let mut table = self.clone();
        for signal in &mut table.signals {
            signal.value = None;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_rejects_duplicates() {
        let mut table = SignalTable::new();
        assert_eq!(table.declare("a", SignalKind::Public).unwrap(), 0);
        assert_eq!(table.declare("b", SignalKind::Output).unwrap(), 1);
        assert_eq!(
            table.declare("a", SignalKind::Private),
            Err(CircuitError::DuplicateSignal("a".into()))
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.kind("a"), Some(SignalKind::Public));
    }

    #[test]
    fn assign_is_single_shot() {
        let mut table = SignalTable::new();
        table.declare("x", SignalKind::Private).unwrap();
        table.assign("x", FieldElement::from(5u64)).unwrap();

        // Same value, still rejected.
        assert_eq!(
            table.assign("x", FieldElement::from(5u64)),
            Err(CircuitError::AlreadyAssigned("x".into()))
        );
        assert_eq!(
            table.assign("x", FieldElement::from(6u64)),
            Err(CircuitError::AlreadyAssigned("x".into()))
        );
        assert_eq!(table.read("x").unwrap(), FieldElement::from(5u64));
    }

    #[test]
    fn read_and_assign_unknown_or_empty() {
        let mut table = SignalTable::new();
        table.declare("y", SignalKind::Intermediate).unwrap();
        assert_eq!(table.read("y"), Err(CircuitError::Unassigned("y".into())));
        assert_eq!(table.read("z"), Err(CircuitError::UnknownSignal("z".into())));
        assert_eq!(
            table.assign("z", FieldElement::one()),
            Err(CircuitError::UnknownSignal("z".into()))
        );
        assert!(!table.is_complete());
    }

    #[test]
    fn cleared_keeps_declarations() {
        let mut table = SignalTable::new();
        table.declare("a", SignalKind::Public).unwrap();
        table.assign("a", FieldElement::one()).unwrap();
        assert!(table.is_complete());

        let fresh = table.cleared();
        assert!(fresh.contains("a"));
        assert_eq!(fresh.get("a").unwrap().value, None);
    }
}
