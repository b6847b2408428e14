//! The decision-diagram package: node arenas, unique tables, compute tables
//! and the core add / multiply operations.
//!
//! Diagrams are quasi-reduced: every path from a root at level `n - 1`
//! visits each lower level exactly once before reaching the terminal, so two
//! operands of `add` or `multiply` always sit at the same level. Zero edges
//! are the only shortcut to the terminal.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::complex::{self, TOLERANCE};
use crate::gates::Matrix2;
use crate::node::{Edge, MKey, MNode, NodeId, VKey, VNode, mkey, vkey};

pub const DEFAULT_GC_THRESHOLD: usize = 1 << 18;

type AddKey = (u32, u32, (i64, i64));

/// Owns every node of one simulation run.
pub struct Package {
    num_qubits: u32,
    vnodes: Vec<VNode>,
    vunique: FxHashMap<VKey, NodeId>,
    mnodes: Vec<MNode>,
    munique: FxHashMap<MKey, NodeId>,
    add_table: FxHashMap<AddKey, Edge>,
    mul_table: FxHashMap<(u32, u32), Edge>,
    /// `identity[k]` is the identity over levels `0..k`.
    identity: Vec<Edge>,
    gc_threshold: usize,
    gc_runs: usize,
}

impl Package {
    pub fn new(num_qubits: u32) -> Self {
        Self::with_gc_threshold(num_qubits, DEFAULT_GC_THRESHOLD)
    }

    pub fn with_gc_threshold(num_qubits: u32, gc_threshold: usize) -> Self {
        let terminal_v = VNode {
            var: u32::MAX,
            children: [Edge::zero(); 2],
        };
        let terminal_m = MNode {
            var: u32::MAX,
            children: [Edge::zero(); 4],
        };
        Self {
            num_qubits,
            vnodes: vec![terminal_v],
            vunique: FxHashMap::default(),
            mnodes: vec![terminal_m],
            munique: FxHashMap::default(),
            add_table: FxHashMap::default(),
            mul_table: FxHashMap::default(),
            identity: vec![Edge::one()],
            gc_threshold: gc_threshold.max(1024),
            gc_runs: 0,
        }
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn vnode(&self, id: NodeId) -> &VNode {
        &self.vnodes[id.index()]
    }

    pub fn mnode(&self, id: NodeId) -> &MNode {
        &self.mnodes[id.index()]
    }

    /// Nodes currently allocated in both arenas, terminals excluded.
    pub fn allocated_nodes(&self) -> usize {
        self.vnodes.len() + self.mnodes.len() - 2
    }

    pub fn gc_runs(&self) -> usize {
        self.gc_runs
    }

    /// The basis state |0…0⟩.
    pub fn zero_state(&mut self) -> Edge {
        let mut e = Edge::one();
        for var in 0..self.num_qubits {
            e = self.make_vnode(var, [e, Edge::zero()]);
        }
        e
    }

    /// Find or create the canonical vector node for `children` and return
    /// the edge pointing at it.
    ///
    /// The larger-magnitude child weight is made real and positive and the
    /// pair is scaled to unit norm; the removed factor moves to the returned
    /// edge.
    pub fn make_vnode(&mut self, var: u32, children: [Edge; 2]) -> Edge {
        let mut children = children.map(snap);
        if children[0].is_zero() && children[1].is_zero() {
            return Edge::zero();
        }

        let m0 = children[0].weight.norm_sqr();
        let m1 = children[1].weight.norm_sqr();
        let big = usize::from(children[0].is_zero() || m1 > m0 + TOLERANCE);
        let norm = (m0 + m1).sqrt();
        let lead = children[big].weight;
        let top = lead / lead.norm() * norm;

        for child in &mut children {
            *child = snap(Edge {
                node: child.node,
                weight: child.weight / top,
            });
        }

        let key = vkey(var, &children);
        let node = match self.vunique.get(&key) {
            Some(&id) => id,
            None => {
                let id = NodeId(self.vnodes.len() as u32);
                self.vnodes.push(VNode { var, children });
                self.vunique.insert(key, id);
                id
            }
        };
        Edge { node, weight: top }
    }

    /// Find or create the canonical matrix node; entries are divided by the
    /// largest-magnitude one.
    pub fn make_mnode(&mut self, var: u32, children: [Edge; 4]) -> Edge {
        let mut children = children.map(snap);
        if children.iter().all(Edge::is_zero) {
            return Edge::zero();
        }

        let mut big = 0;
        let mut best = -1.0;
        for (i, child) in children.iter().enumerate() {
            if child.is_zero() {
                continue;
            }
            let mag = child.weight.norm();
            if best < 0.0 || mag > best + TOLERANCE {
                best = mag;
                big = i;
            }
        }
        let top = children[big].weight;
        for child in &mut children {
            *child = snap(Edge {
                node: child.node,
                weight: child.weight / top,
            });
        }

        let key = mkey(var, &children);
        let node = match self.munique.get(&key) {
            Some(&id) => id,
            None => {
                let id = NodeId(self.mnodes.len() as u32);
                self.mnodes.push(MNode { var, children });
                self.munique.insert(key, id);
                id
            }
        };
        Edge { node, weight: top }
    }

    /// Identity over levels `0..levels`.
    pub fn identity(&mut self, levels: u32) -> Edge {
        while self.identity.len() <= levels as usize {
            let below = self.identity[self.identity.len() - 1];
            let var = (self.identity.len() - 1) as u32;
            let e = self.make_mnode(var, [below, Edge::zero(), Edge::zero(), below]);
            self.identity.push(e);
        }
        self.identity[levels as usize]
    }

    /// Matrix diagram of `u` on `target`, controlled on every qubit in
    /// `controls` being 1, identity elsewhere.
    pub fn gate_dd(&mut self, u: &Matrix2, target: u32, controls: &[u32]) -> Edge {
        let mut em: [Edge; 4] = std::array::from_fn(|i| snap(Edge::terminal(u[i / 2][i % 2])));

        for z in 0..target {
            if controls.contains(&z) {
                let ident = self.identity(z);
                for (i, entry) in em.iter_mut().enumerate() {
                    let off = if i / 2 == i % 2 { ident } else { Edge::zero() };
                    *entry = self.make_mnode(z, [off, Edge::zero(), Edge::zero(), *entry]);
                }
            } else {
                for entry in &mut em {
                    *entry = self.make_mnode(z, [*entry, Edge::zero(), Edge::zero(), *entry]);
                }
            }
        }

        let mut e = self.make_mnode(target, em);

        for z in (target + 1)..self.num_qubits {
            e = if controls.contains(&z) {
                let ident = self.identity(z);
                self.make_mnode(z, [ident, Edge::zero(), Edge::zero(), e])
            } else {
                self.make_mnode(z, [e, Edge::zero(), Edge::zero(), e])
            };
        }
        e
    }

    /// Sum of two vectors at the same level.
    pub fn add(&mut self, a: Edge, b: Edge) -> Edge {
        if a.is_zero() {
            return b;
        }
        if b.is_zero() {
            return a;
        }
        if a.node == b.node {
            return snap(Edge {
                node: a.node,
                weight: a.weight + b.weight,
            });
        }

        // larger weight first keeps |ratio| <= 1 inside the quantized key range
        let (wa, wb) = (a.weight.norm_sqr(), b.weight.norm_sqr());
        let (a, b) = if wa > wb || (wa == wb && a.node.0 <= b.node.0) {
            (a, b)
        } else {
            (b, a)
        };
        let ratio = b.weight / a.weight;
        let key = (a.node.0, b.node.0, complex::key(ratio));

        let unit = match self.add_table.get(&key) {
            Some(&r) => r,
            None => {
                let na = self.vnodes[a.node.index()];
                let nb = self.vnodes[b.node.index()];
                let mut sum = [Edge::zero(); 2];
                for (i, s) in sum.iter_mut().enumerate() {
                    *s = self.add(na.children[i], nb.children[i].scaled(ratio));
                }
                let r = self.make_vnode(na.var, sum);
                self.add_table.insert(key, r);
                r
            }
        };
        unit.scaled(a.weight)
    }

    /// Matrix-vector product at the same level.
    pub fn multiply(&mut self, m: Edge, v: Edge) -> Edge {
        if m.is_zero() || v.is_zero() {
            return Edge::zero();
        }
        let factor = m.weight * v.weight;
        if m.node.is_terminal() && v.node.is_terminal() {
            return Edge::terminal(factor);
        }

        let key = (m.node.0, v.node.0);
        let unit = match self.mul_table.get(&key) {
            Some(&r) => r,
            None => {
                let mn = self.mnodes[m.node.index()];
                let vn = self.vnodes[v.node.index()];
                let mut rows = [Edge::zero(); 2];
                for (row, out) in rows.iter_mut().enumerate() {
                    let left = self.multiply(mn.children[2 * row], vn.children[0]);
                    let right = self.multiply(mn.children[2 * row + 1], vn.children[1]);
                    *out = self.add(left, right);
                }
                let r = self.make_vnode(vn.var, rows);
                self.mul_table.insert(key, r);
                r
            }
        };
        unit.scaled(factor)
    }

    /// Apply a controlled single-qubit operation to `state`.
    pub fn apply(&mut self, u: &Matrix2, target: u32, controls: &[u32], state: Edge) -> Edge {
        let gate = self.gate_dd(u, target, controls);
        self.multiply(gate, state)
    }

    /// Number of distinct non-terminal vector nodes reachable from `root`.
    pub fn size(&self, root: Edge) -> usize {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack = vec![root.node];
        while let Some(id) = stack.pop() {
            if id.is_terminal() || !seen.insert(id) {
                continue;
            }
            for child in &self.vnodes[id.index()].children {
                if !child.is_zero() {
                    stack.push(child.node);
                }
            }
        }
        seen.len()
    }

    pub fn needs_gc(&self) -> bool {
        self.allocated_nodes() > self.gc_threshold
    }

    /// Rebuild the arenas keeping only nodes reachable from `vroots` and
    /// `mroots`, which are rewritten in place. Compute tables and the
    /// identity cache are dropped.
    pub fn collect_garbage(&mut self, vroots: &mut [Edge], mroots: &mut [Edge]) {
        let before = self.allocated_nodes();

        let old_v = std::mem::take(&mut self.vnodes);
        self.vunique.clear();
        self.vnodes.push(old_v[0]);
        let mut vmap: FxHashMap<u32, NodeId> = FxHashMap::default();
        for root in vroots.iter_mut() {
            root.node = self.copy_vnode(&old_v, root.node, &mut vmap);
        }

        let old_m = std::mem::take(&mut self.mnodes);
        self.munique.clear();
        self.mnodes.push(old_m[0]);
        let mut mmap: FxHashMap<u32, NodeId> = FxHashMap::default();
        for root in mroots.iter_mut() {
            root.node = self.copy_mnode(&old_m, root.node, &mut mmap);
        }

        self.add_table.clear();
        self.mul_table.clear();
        self.identity.truncate(1);
        self.gc_runs += 1;

        let after = self.allocated_nodes();
        // Keep at least half the budget free so collection does not repeat
        // after every operation.
        if after * 2 > self.gc_threshold {
            self.gc_threshold = after * 2;
        }
        debug!(before, after, threshold = self.gc_threshold, "dd garbage collection");
    }

    fn copy_vnode(&mut self, old: &[VNode], id: NodeId, map: &mut FxHashMap<u32, NodeId>) -> NodeId {
        if id.is_terminal() {
            return id;
        }
        if let Some(&new) = map.get(&id.0) {
            return new;
        }
        let node = old[id.index()];
        let mut children = node.children;
        for child in &mut children {
            if !child.is_zero() {
                child.node = self.copy_vnode(old, child.node, map);
            }
        }
        let new = NodeId(self.vnodes.len() as u32);
        self.vnodes.push(VNode {
            var: node.var,
            children,
        });
        self.vunique.insert(vkey(node.var, &children), new);
        map.insert(id.0, new);
        new
    }

    fn copy_mnode(&mut self, old: &[MNode], id: NodeId, map: &mut FxHashMap<u32, NodeId>) -> NodeId {
        if id.is_terminal() {
            return id;
        }
        if let Some(&new) = map.get(&id.0) {
            return new;
        }
        let node = old[id.index()];
        let mut children = node.children;
        for child in &mut children {
            if !child.is_zero() {
                child.node = self.copy_mnode(old, child.node, map);
            }
        }
        let new = NodeId(self.mnodes.len() as u32);
        self.mnodes.push(MNode {
            var: node.var,
            children,
        });
        self.munique.insert(mkey(node.var, &children), new);
        map.insert(id.0, new);
        new
    }
}

/// Replace a negligible edge with the canonical zero edge.
#[inline]
fn snap(e: Edge) -> Edge {
    if e.is_zero() { Edge::zero() } else { e }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ONE;
    use num_complex::Complex64;
    use crate::gates;
    use crate::measure::to_dense;

    fn approx(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_zero_state() {
        let mut pkg = Package::new(3);
        let psi = pkg.zero_state();
        assert_eq!(pkg.size(psi), 3);
        let dense = to_dense(&pkg, psi);
        assert!(approx(dense[0], ONE));
        assert!(dense[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_structural_sharing() {
        let mut pkg = Package::new(2);
        let leaf = pkg.make_vnode(0, [Edge::one(), Edge::zero()]);
        let again = pkg.make_vnode(0, [Edge::one(), Edge::zero()]);
        assert_eq!(leaf.node, again.node);

        // Same shape up to a global factor lands on the same node.
        let scaled = pkg.make_vnode(
            0,
            [Edge::terminal(Complex64::new(0.0, 2.0)), Edge::zero()],
        );
        assert_eq!(scaled.node, leaf.node);
        assert!(approx(scaled.weight, Complex64::new(0.0, 2.0)));
    }

    #[test]
    fn test_vnode_normalization() {
        let mut pkg = Package::new(1);
        let e = pkg.make_vnode(
            0,
            [
                Edge::terminal(Complex64::new(0.0, 3.0)),
                Edge::terminal(Complex64::new(4.0, 0.0)),
            ],
        );
        let node = *pkg.vnode(e.node);
        let w0 = node.children[0].weight;
        let w1 = node.children[1].weight;
        assert!((w0.norm_sqr() + w1.norm_sqr() - 1.0).abs() < 1e-12);
        // larger weight is real and positive
        assert!(w1.im.abs() < 1e-12 && w1.re > 0.0);
        assert!(approx(e.weight * w0, Complex64::new(0.0, 3.0)));
        assert!(approx(e.weight * w1, Complex64::new(4.0, 0.0)));
    }

    #[test]
    fn test_hadamard_then_cx() {
        let mut pkg = Package::new(2);
        let mut psi = pkg.zero_state();
        psi = pkg.apply(&gates::h(), 0, &[], psi);
        psi = pkg.apply(&gates::x(), 1, &[0], psi);
        let dense = to_dense(&pkg, psi);
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx(dense[0], Complex64::new(r, 0.0)));
        assert!(approx(dense[3], Complex64::new(r, 0.0)));
        assert!(dense[1].norm() < 1e-12 && dense[2].norm() < 1e-12);
    }

    #[test]
    fn test_control_below_target() {
        // X on qubit 0, then CX with control 0 and target 2: |101⟩ = index 5
        let mut pkg = Package::new(3);
        let mut psi = pkg.zero_state();
        psi = pkg.apply(&gates::x(), 0, &[], psi);
        psi = pkg.apply(&gates::x(), 2, &[0], psi);
        let dense = to_dense(&pkg, psi);
        assert!(approx(dense[5], ONE));
    }

    #[test]
    fn test_control_above_target_not_set() {
        let mut pkg = Package::new(2);
        let mut psi = pkg.zero_state();
        psi = pkg.apply(&gates::x(), 0, &[1], psi);
        let dense = to_dense(&pkg, psi);
        assert!(approx(dense[0], ONE));
    }

    #[test]
    fn test_add_is_commutative() {
        let mut pkg = Package::new(1);
        let a = pkg.make_vnode(0, [Edge::one(), Edge::zero()]);
        let b = pkg.make_vnode(0, [Edge::zero(), Edge::terminal(Complex64::new(0.0, 1.0))]);
        let ab = pkg.add(a, b);
        let ba = pkg.add(b, a);
        assert_eq!(ab.node, ba.node);
        assert!(approx(ab.weight, ba.weight));
    }

    #[test]
    fn test_add_with_huge_weight_ratios() {
        let mut pkg = Package::new(1);
        let a = pkg.make_vnode(0, [Edge::one(), Edge::zero()]);
        let b = pkg.make_vnode(0, [Edge::zero(), Edge::one()]);
        for big in [1e8, 3e9, 2e11] {
            let sum = pkg.add(a, b.scaled(Complex64::new(big, 0.0)));
            let dense = to_dense(&pkg, sum);
            assert!(approx(dense[0], ONE), "{} vs 1", dense[0]);
            assert!((dense[1].re - big).abs() < big * 1e-12, "{} vs {big}", dense[1]);
        }
    }

    #[test]
    fn test_garbage_collection_keeps_roots() {
        let mut pkg = Package::with_gc_threshold(4, 1024);
        let mut psi = pkg.zero_state();
        for q in 0..4 {
            psi = pkg.apply(&gates::h(), q, &[], psi);
        }
        let before = to_dense(&pkg, psi);

        let mut roots = [psi];
        pkg.collect_garbage(&mut roots, &mut []);
        let after = to_dense(&pkg, roots[0]);
        assert_eq!(pkg.gc_runs(), 1);
        assert_eq!(pkg.size(roots[0]), 4);
        for (x, y) in before.iter().zip(&after) {
            assert!(approx(*x, *y));
        }
    }
}
