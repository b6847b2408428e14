//! Shared helpers for CLI commands.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use alcom_adapter_bdd::{BddBackend, BddConfig};
use alcom_hal::{BackendRegistry, ExecutionResult};
use alcom_ir::Circuit;

/// Largest number of outcomes printed in table mode.
const MAX_TABLE_ROWS: usize = 16;

/// Read one OpenQASM 2.0 experiment from `path`.
pub fn load_circuit(path: &Path) -> Result<Circuit> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut circuit =
        alcom_qasm::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))?;
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        circuit.set_name(stem);
    }
    Ok(circuit)
}

/// Backend settings from `config` (if given) and the environment.
pub fn load_config(config: Option<&Path>) -> Result<BddConfig> {
    BddConfig::load(config).context("Invalid backend configuration")
}

/// Registry holding every backend this binary ships.
pub fn build_registry(config: BddConfig) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(BddBackend::with_config(config)));
    registry.register_type::<BddBackend>("bdd");
    registry
}

/// Counts as a table sorted by frequency, most frequent first.
pub fn format_counts(result: &ExecutionResult) -> String {
    let mut rows: Vec<_> = result.counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let total = result.counts.total_shots().max(1) as f64;
    let mut out = String::new();
    for (bitstring, count) in rows.iter().take(MAX_TABLE_ROWS) {
        let prob = **count as f64 / total * 100.0;
        let bar = "█".repeat((prob / 2.0).round() as usize);
        let key = if bitstring.is_empty() { "\"\"" } else { bitstring.as_str() };
        let _ = writeln!(
            out,
            "  {}: {:>6} ({:>6.2}%) {}",
            style(key).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }
    if rows.len() > MAX_TABLE_ROWS {
        let _ = writeln!(out, "  ... and {} more outcomes", rows.len() - MAX_TABLE_ROWS);
    }
    out
}

/// Print a result for humans.
pub fn print_results(result: &ExecutionResult) {
    println!(
        "\n{} Results ({} shots, {:.3}s):",
        style("✓").green().bold(),
        result.shots,
        result.time_taken
    );
    print!("{}", format_counts(result));

    if let Ok(amplitudes) = result.get_statevector() {
        println!("\n  Statevector ({} amplitudes):", amplitudes.len());
        for (index, amp) in amplitudes.iter().enumerate().take(MAX_TABLE_ROWS) {
            println!("    [{index:>3}] {:+.6} {:+.6}i", amp.re, amp.im);
        }
        if amplitudes.len() > MAX_TABLE_ROWS {
            println!("    ...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcom_hal::Counts;

    #[test]
    fn test_format_counts_orders_by_frequency() {
        console::set_colors_enabled(false);
        let counts: Counts = [("00", 10_u64), ("11", 30), ("01", 10)].into_iter().collect();
        let table = format_counts(&ExecutionResult::new(counts, 50));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("11:"));
        assert!(lines[1].trim_start().starts_with("00:"));
        assert!(lines[0].contains("60.00%"));
    }

    #[test]
    fn test_format_counts_empty_key() {
        console::set_colors_enabled(false);
        let counts: Counts = [("", 4_u64)].into_iter().collect();
        let table = format_counts(&ExecutionResult::new(counts, 4));
        assert!(table.contains("\"\""));
    }

    #[test]
    fn test_registry_contents() {
        let registry = build_registry(BddConfig::default());
        assert_eq!(registry.names(), vec!["bdd", "qasm_simulator"]);
        assert!(registry.get("qasm_simulator").is_ok());
    }
}
