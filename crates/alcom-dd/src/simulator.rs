//! Simulation driver: runs a [`Program`] on a fresh [`Package`] and
//! aggregates shot outcomes into a counts histogram.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alcom_ir::{Circuit, Register};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{DdError, DdResult};
use crate::measure;
use crate::node::Edge;
use crate::package::{DEFAULT_GC_THRESHOLD, Package};
use crate::program::{Operation, Program};

/// Largest register for which a dense statevector is produced.
pub const MAX_STATEVECTOR_QUBITS: usize = 30;

/// Shared flag that stops a running simulation at the next gate or shot.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub shots: u32,
    pub statevector: bool,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    pub cancel: Option<CancelToken>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            shots: 1024,
            statevector: false,
            seed: None,
            cancel: None,
        }
    }
}

/// Raw engine output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Classical bitstring to number of shots; clbit 0 is the rightmost
    /// character and registers are separated by a space.
    pub counts: BTreeMap<String, u64>,
    /// Real and imaginary parts; index bit `q` is qubit `q`.
    pub statevector: Option<(Vec<f64>, Vec<f64>)>,
}

/// Decision-diagram simulator. Every call owns its own node arena.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    gc_threshold: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }

    /// Node count above which the arena is compacted.
    pub fn with_gc_threshold(gc_threshold: usize) -> Self {
        Self { gc_threshold }
    }

    /// Parse a single OpenQASM 2.0 experiment and simulate it.
    pub fn simulate(&self, qasm: &str, want_statevector: bool, shots: u32) -> DdResult<SimulationOutput> {
        self.simulate_with(
            qasm,
            &SimulationOptions {
                shots,
                statevector: want_statevector,
                ..SimulationOptions::default()
            },
        )
    }

    #[instrument(skip_all, fields(shots = options.shots, statevector = options.statevector))]
    pub fn simulate_with(&self, qasm: &str, options: &SimulationOptions) -> DdResult<SimulationOutput> {
        let circuit = alcom_qasm::parse(qasm)?;
        self.run_circuit(&circuit, options)
    }

    pub fn run_circuit(&self, circuit: &Circuit, options: &SimulationOptions) -> DdResult<SimulationOutput> {
        let program = Program::from_circuit(circuit)?;
        self.run_program(&program, options)
    }

    pub fn run_program(&self, program: &Program, options: &SimulationOptions) -> DdResult<SimulationOutput> {
        if options.shots == 0 {
            return Err(DdError::InvalidShots);
        }
        let qubits = program.num_qubits as usize;
        if options.statevector && qubits > MAX_STATEVECTOR_QUBITS {
            return Err(DdError::StatevectorTooLarge {
                qubits,
                max: MAX_STATEVECTOR_QUBITS,
            });
        }
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let terminal = program.is_terminal_measurement();
        debug!(
            qubits = program.num_qubits,
            clbits = program.num_clbits,
            ops = program.ops.len(),
            terminal,
            "starting dd simulation"
        );

        let mut run = Run {
            pkg: Package::with_gc_threshold(program.num_qubits, self.gc_threshold),
            cancel: options.cancel.as_ref(),
        };
        let (counts, state) = if terminal {
            run.terminal(program, options.shots, &mut rng)?
        } else {
            run.dynamic(program, options.shots, &mut rng)?
        };

        let statevector = options.statevector.then(|| {
            let dense = measure::to_dense(&run.pkg, state);
            dense.iter().map(|a| (a.re, a.im)).unzip()
        });
        debug!(
            nodes = run.pkg.allocated_nodes(),
            state_nodes = run.pkg.size(state),
            gc_runs = run.pkg.gc_runs(),
            "dd simulation finished"
        );
        Ok(SimulationOutput { counts, statevector })
    }
}

struct Run<'a> {
    pkg: Package,
    cancel: Option<&'a CancelToken>,
}

impl Run<'_> {
    fn check_cancel(&self) -> DdResult<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(DdError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Fold every unconditional unitary in `ops` into `state`.
    fn apply_unitaries(&mut self, ops: &[Operation], mut state: Edge) -> DdResult<Edge> {
        for op in ops {
            if let Operation::Unitary { steps, .. } = op {
                for step in steps {
                    self.check_cancel()?;
                    state = self.pkg.apply(&step.matrix, step.target, &step.controls, state);
                }
                if self.pkg.needs_gc() {
                    let mut roots = [state];
                    self.pkg.collect_garbage(&mut roots, &mut []);
                    state = roots[0];
                }
            }
        }
        Ok(state)
    }

    /// One simulation, then one basis-state sample per shot.
    fn terminal(
        &mut self,
        program: &Program,
        shots: u32,
        rng: &mut StdRng,
    ) -> DdResult<(BTreeMap<String, u64>, Edge)> {
        let zero = self.pkg.zero_state();
        let state = self.apply_unitaries(&program.ops, zero)?;

        let measures: Vec<(usize, usize)> = program
            .ops
            .iter()
            .filter_map(|op| match op {
                Operation::Measure { qubit, clbit, .. } => Some((*qubit as usize, *clbit as usize)),
                _ => None,
            })
            .collect();

        let mut counts = BTreeMap::new();
        if measures.is_empty() {
            let clbits = vec![false; program.num_clbits as usize];
            counts.insert(format_key(&program.cregs, &clbits), u64::from(shots));
            return Ok((counts, state));
        }

        let mut clbits = vec![false; program.num_clbits as usize];
        for _ in 0..shots {
            self.check_cancel()?;
            let bits = measure::sample(&self.pkg, state, rng);
            clbits.fill(false);
            for &(q, c) in &measures {
                clbits[c] = bits[q];
            }
            *counts.entry(format_key(&program.cregs, &clbits)).or_insert(0) += 1;
        }
        Ok((counts, state))
    }

    /// Shared unitary prefix, then the remainder per shot with collapse.
    fn dynamic(
        &mut self,
        program: &Program,
        shots: u32,
        rng: &mut StdRng,
    ) -> DdResult<(BTreeMap<String, u64>, Edge)> {
        let split = program.unitary_prefix_len();
        let (prefix, rest) = program.ops.split_at(split);
        let zero = self.pkg.zero_state();
        let mut base = self.apply_unitaries(prefix, zero)?;

        // Gate diagrams of the remainder, built once and reused by every shot.
        let mut gate_dds = Vec::new();
        let mut offsets = Vec::with_capacity(rest.len());
        for op in rest {
            offsets.push(gate_dds.len());
            if let Operation::Unitary { steps, .. } = op {
                for step in steps {
                    gate_dds.push(self.pkg.gate_dd(&step.matrix, step.target, &step.controls));
                }
            }
        }

        let mut counts = BTreeMap::new();
        let mut clbits = vec![false; program.num_clbits as usize];
        let mut state = base;
        for _ in 0..shots {
            self.check_cancel()?;
            clbits.fill(false);
            state = base;

            for (op, &offset) in rest.iter().zip(&offsets) {
                if let Some(cond) = op.condition() {
                    if !cond.holds(&clbits) {
                        continue;
                    }
                }
                match op {
                    Operation::Unitary { steps, .. } => {
                        for gate in &gate_dds[offset..offset + steps.len()] {
                            self.check_cancel()?;
                            state = self.pkg.multiply(*gate, state);
                        }
                    }
                    Operation::Measure { qubit, clbit, .. } => {
                        let (outcome, post) = measure::measure_qubit(&mut self.pkg, state, *qubit, rng);
                        clbits[*clbit as usize] = outcome;
                        state = post;
                    }
                    Operation::Reset { qubit, .. } => {
                        state = measure::reset_qubit(&mut self.pkg, state, *qubit, rng);
                    }
                    Operation::Barrier => {}
                }

                if self.pkg.needs_gc() {
                    let mut roots = [base, state];
                    self.pkg.collect_garbage(&mut roots, &mut gate_dds);
                    [base, state] = roots;
                }
            }
            *counts.entry(format_key(&program.cregs, &clbits)).or_insert(0) += 1;
        }
        Ok((counts, state))
    }
}

/// Bitstring key for the classical bits: the last declared register first,
/// each register most-significant bit first, registers separated by a space.
pub fn format_key(cregs: &[Register], clbits: &[bool]) -> String {
    let mut key = String::with_capacity(clbits.len() + cregs.len());
    for (i, reg) in cregs.iter().rev().enumerate() {
        if i > 0 {
            key.push(' ');
        }
        for bit in reg.indices().collect::<Vec<_>>().into_iter().rev() {
            key.push(if clbits[bit as usize] { '1' } else { '0' });
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_key_order() {
        let cregs = vec![Register::new("a", 2, 0), Register::new("b", 1, 2)];
        // a = [1, 0] (a[0] = 1), b = [1]
        assert_eq!(format_key(&cregs, &[true, false, true]), "1 01");
        assert_eq!(format_key(&[], &[]), "");
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_zero_shots_rejected() {
        let sim = Simulator::new();
        let circuit = Circuit::bell().unwrap();
        let options = SimulationOptions {
            shots: 0,
            ..SimulationOptions::default()
        };
        assert!(matches!(
            sim.run_circuit(&circuit, &options),
            Err(DdError::InvalidShots)
        ));
    }

    #[test]
    fn test_no_measurement_gives_all_zero_key() {
        let mut circuit = Circuit::with_size("idle", 2, 3);
        circuit.h(alcom_ir::QubitId(0)).unwrap();
        let options = SimulationOptions {
            shots: 10,
            seed: Some(3),
            ..SimulationOptions::default()
        };
        let out = Simulator::new().run_circuit(&circuit, &options).unwrap();
        assert_eq!(out.counts.len(), 1);
        assert_eq!(out.counts["000"], 10);
    }
}
