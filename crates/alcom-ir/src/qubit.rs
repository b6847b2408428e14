//! Qubit, classical bit and register types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit within a circuit.
///
/// Qubits are numbered across all quantum registers in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A named, contiguous block of qubits or classical bits.
///
/// `start` is the flat index of element 0, so element `i` of the register
/// is flat index `start + i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Register name as written in source (`q`, `c`, `ancilla`, ...).
    pub name: String,
    /// Number of elements.
    pub size: u32,
    /// Flat index of the first element.
    pub start: u32,
}

impl Register {
    /// Create a new register.
    pub fn new(name: impl Into<String>, size: u32, start: u32) -> Self {
        Self {
            name: name.into(),
            size,
            start,
        }
    }

    /// Whether the flat index falls inside this register.
    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index < self.start + self.size
    }

    /// Flat indices covered by this register, in element order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.start..self.start + self.size
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", ClbitId(3)), "c3");
    }

    #[test]
    fn test_register_contains() {
        let reg = Register::new("anc", 3, 2);
        assert!(!reg.contains(1));
        assert!(reg.contains(2));
        assert!(reg.contains(4));
        assert!(!reg.contains(5));
        assert_eq!(reg.indices().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(reg.to_string(), "anc[3]");
    }
}
