//! Run command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use alcom_hal::{Backend, ExecutionResult, RunOptions};

use super::common::{build_registry, load_circuit, load_config, print_results};
use crate::cli::{OutputFormat, RunArgs};

pub async fn execute(args: &RunArgs) -> Result<()> {
    let result = simulate(args).await?;
    match args.format {
        OutputFormat::Table => print_results(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

/// Load, submit and wait; no output besides the spinner in table mode.
pub async fn simulate(args: &RunArgs) -> Result<ExecutionResult> {
    let table = args.format == OutputFormat::Table;
    let config = load_config(args.config.as_deref())?;
    let registry = build_registry(config);
    let backend = registry.get("qasm_simulator")?;

    let circuit = load_circuit(&args.input)?;
    if table {
        println!(
            "{} Running {} on {} ({} shots)",
            style("→").cyan().bold(),
            style(args.input.display()).green(),
            style(backend.name()).yellow(),
            args.shots
        );
        println!(
            "  Loaded: {} qubits, {} clbits, depth {}",
            circuit.num_qubits(),
            circuit.num_clbits(),
            circuit.depth()
        );
    }

    let mut options = RunOptions::with_shots(args.shots).statevector(args.statevector);
    if let Some(seed) = args.seed {
        options = options.seed(seed);
    }

    let validation = backend.validate(&circuit, &options).await?;
    debug!(?validation, "Validation result");

    let spinner = if table {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Submitting job...");
        spinner
    } else {
        ProgressBar::hidden()
    };

    let job_id = backend.submit(&circuit, &options).await?;
    spinner.set_message(format!("Running job {job_id}..."));
    let outcome = backend.wait(&job_id).await;
    spinner.finish_and_clear();

    outcome.with_context(|| format!("Job {job_id} did not complete"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(file: &std::path::Path) -> RunArgs {
        RunArgs {
            input: file.to_path_buf(),
            shots: 100,
            statevector: true,
            seed: Some(1),
            format: OutputFormat::Json,
            config: None,
        }
    }

    #[tokio::test]
    async fn test_simulate_file() {
        let mut file = tempfile::Builder::new().suffix(".qasm").tempfile().unwrap();
        write!(
            file,
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nx q[1];\nmeasure q -> c;\n"
        )
        .unwrap();

        let result = simulate(&args(file.path())).await.unwrap();
        assert_eq!(result.get_counts().get("10"), 100);
        assert_eq!(result.get_statevector().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = simulate(&args(std::path::Path::new("/nonexistent/c.qasm")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
