//! Decision-diagram nodes and edges.

use num_complex::Complex64;

use crate::complex::{self, ONE, ZERO};

/// Index of a node in its arena. Index 0 is the terminal in both the vector
/// and the matrix arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const TERMINAL: NodeId = NodeId(0);

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A weighted pointer to a node.
///
/// The represented value is `weight` times the node's vector or matrix.
/// The zero edge points at the terminal with weight 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub node: NodeId,
    pub weight: Complex64,
}

impl Edge {
    pub const fn zero() -> Self {
        Edge {
            node: NodeId::TERMINAL,
            weight: ZERO,
        }
    }

    pub const fn one() -> Self {
        Edge {
            node: NodeId::TERMINAL,
            weight: ONE,
        }
    }

    pub const fn terminal(weight: Complex64) -> Self {
        Edge {
            node: NodeId::TERMINAL,
            weight,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        complex::is_zero(self.weight)
    }

    /// Same node, weight multiplied by `factor`; collapses to the zero edge.
    #[inline]
    pub fn scaled(self, factor: Complex64) -> Self {
        let weight = self.weight * factor;
        if complex::is_zero(weight) {
            Edge::zero()
        } else {
            Edge {
                node: self.node,
                weight,
            }
        }
    }
}

/// Vector node for qubit `var`; `children[b]` is the sub-vector where the
/// qubit has value `b`.
#[derive(Debug, Clone, Copy)]
pub struct VNode {
    pub var: u32,
    pub children: [Edge; 2],
}

/// Matrix node for qubit `var`; `children[2 * row + col]` is the block
/// selected by the qubit's row and column bit.
#[derive(Debug, Clone, Copy)]
pub struct MNode {
    pub var: u32,
    pub children: [Edge; 4],
}

/// Unique-table key: variable, child ids and quantized child weights.
pub(crate) type VKey = (u32, [u32; 2], [(i64, i64); 2]);
pub(crate) type MKey = (u32, [u32; 4], [(i64, i64); 4]);

pub(crate) fn vkey(var: u32, children: &[Edge; 2]) -> VKey {
    (
        var,
        children.map(|e| e.node.0),
        children.map(|e| complex::key(e.weight)),
    )
}

pub(crate) fn mkey(var: u32, children: &[Edge; 4]) -> MKey {
    (
        var,
        children.map(|e| e.node.0),
        children.map(|e| complex::key(e.weight)),
    )
}
