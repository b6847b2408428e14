//! Sampling, collapse and dense reconstruction of vector diagrams.
//!
//! Every stored vector node is a unit vector, so the squared magnitudes of a
//! node's two edge weights are exactly the branch probabilities at that
//! level. Sampling is a single root-to-terminal walk.

use num_complex::Complex64;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::complex::{TOLERANCE, ZERO};
use crate::gates;
use crate::node::{Edge, NodeId};
use crate::package::Package;

/// Amplitudes of `root`; index bit `q` is the value of qubit `q`.
pub fn to_dense(pkg: &Package, root: Edge) -> Vec<Complex64> {
    let mut out = vec![ZERO; 1usize << pkg.num_qubits()];
    fill(pkg, root, Complex64::new(1.0, 0.0), 0, &mut out);
    out
}

fn fill(pkg: &Package, e: Edge, acc: Complex64, index: usize, out: &mut [Complex64]) {
    if e.is_zero() {
        return;
    }
    let amp = acc * e.weight;
    if e.node.is_terminal() {
        out[index] = amp;
        return;
    }
    let node = pkg.vnode(e.node);
    for (bit, child) in node.children.iter().enumerate() {
        fill(pkg, *child, amp, index | (bit << node.var), out);
    }
}

/// Draw one basis state; `bits[q]` is the value of qubit `q`.
pub fn sample<R: Rng + ?Sized>(pkg: &Package, root: Edge, rng: &mut R) -> Vec<bool> {
    let mut bits = vec![false; pkg.num_qubits() as usize];
    let mut e = root;
    while !e.node.is_terminal() {
        let node = pkg.vnode(e.node);
        let [low, high] = node.children;
        let one = if low.is_zero() {
            true
        } else if high.is_zero() {
            false
        } else {
            rng.r#gen::<f64>() >= low.weight.norm_sqr()
        };
        bits[node.var as usize] = one;
        e = if one { high } else { low };
    }
    bits
}

/// Probability that measuring `qubit` yields 1.
pub fn prob_one(pkg: &Package, root: Edge, qubit: u32) -> f64 {
    if root.is_zero() {
        return 0.0;
    }
    let mut memo = FxHashMap::default();
    prob_below(pkg, root.node, qubit, &mut memo).clamp(0.0, 1.0)
}

fn prob_below(pkg: &Package, id: NodeId, qubit: u32, memo: &mut FxHashMap<NodeId, f64>) -> f64 {
    if let Some(&p) = memo.get(&id) {
        return p;
    }
    let node = *pkg.vnode(id);
    let p = if node.var == qubit {
        node.children[1].weight.norm_sqr()
    } else {
        node.children
            .iter()
            .filter(|c| !c.is_zero())
            .map(|c| c.weight.norm_sqr() * prob_below(pkg, c.node, qubit, memo))
            .sum()
    };
    memo.insert(id, p);
    p
}

/// Measure `qubit`, returning the outcome and the renormalized
/// post-measurement state.
pub fn measure_qubit<R: Rng + ?Sized>(
    pkg: &mut Package,
    root: Edge,
    qubit: u32,
    rng: &mut R,
) -> (bool, Edge) {
    let p1 = prob_one(pkg, root, qubit);
    let outcome = if p1 < TOLERANCE {
        false
    } else if p1 > 1.0 - TOLERANCE {
        true
    } else {
        rng.r#gen::<f64>() < p1
    };
    (outcome, collapse(pkg, root, qubit, outcome))
}

/// Project `qubit` onto `outcome` and rescale to unit norm, keeping the
/// global phase.
pub fn collapse(pkg: &mut Package, root: Edge, qubit: u32, outcome: bool) -> Edge {
    let projected = pkg.apply(&gates::projector(outcome), qubit, &[], root);
    if projected.is_zero() {
        return projected;
    }
    let norm = projected.weight.norm();
    Edge {
        node: projected.node,
        weight: projected.weight / norm,
    }
}

/// Measure and flip back to |0⟩ when the outcome was 1.
pub fn reset_qubit<R: Rng + ?Sized>(pkg: &mut Package, root: Edge, qubit: u32, rng: &mut R) -> Edge {
    let (outcome, state) = measure_qubit(pkg, root, qubit, rng);
    if outcome {
        pkg.apply(&gates::x(), qubit, &[], state)
    } else {
        state
    }
}
