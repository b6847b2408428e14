//! Turns raw engine output into an [`ExecutionResult`].

use alcom_dd::SimulationOutput;
use alcom_hal::{Counts, ExecutionResult};
use tracing::error;

/// Job failure message for every non-structural engine problem.
pub const ENGINE_FAILURE: &str = "simulation terminated without returning valid output.";

/// Job metadata attached to a shaped result.
#[derive(Debug, Clone)]
pub struct ResultContext<'a> {
    pub job_id: &'a str,
    pub backend_name: &'a str,
    pub backend_version: &'a str,
    pub num_qubits: usize,
    pub shots: u32,
    pub time_taken: f64,
}

/// Reason `output` cannot be a result for a circuit of `num_qubits` qubits
/// run for `shots` shots, if any.
fn check_output(output: &SimulationOutput, num_qubits: usize, shots: u32) -> Result<(), String> {
    let total: u64 = output.counts.values().sum();
    if total != u64::from(shots) {
        return Err(format!("counts sum to {total}, expected {shots}"));
    }

    let mut key_len = None;
    for key in output.counts.keys() {
        if !key.chars().all(|c| matches!(c, '0' | '1' | ' ')) {
            return Err(format!("non-binary count key {key:?}"));
        }
        match key_len {
            None => key_len = Some(key.len()),
            Some(len) if len != key.len() => {
                return Err(format!("count keys of different widths: {len} and {}", key.len()));
            }
            Some(_) => {}
        }
    }

    if let Some((re, im)) = &output.statevector {
        let expected = u32::try_from(num_qubits)
            .ok()
            .and_then(|n| 1_usize.checked_shl(n))
            .ok_or_else(|| format!("statevector for {num_qubits} qubits is not addressable"))?;
        if re.len() != im.len() {
            return Err(format!(
                "statevector parts differ in length: {} real, {} imaginary",
                re.len(),
                im.len()
            ));
        }
        if re.len() != expected {
            return Err(format!(
                "statevector has {} amplitudes, expected {expected}",
                re.len()
            ));
        }
    }
    Ok(())
}

/// Wrap checked output with the job metadata.
fn into_result(output: SimulationOutput, ctx: &ResultContext<'_>) -> ExecutionResult {
    let mut result = ExecutionResult::new(Counts::from(output.counts), ctx.shots)
        .with_job_id(ctx.job_id)
        .with_backend(ctx.backend_name, ctx.backend_version)
        .with_time_taken(ctx.time_taken);
    if let Some((re, im)) = output.statevector {
        result = result.with_statevector(re, im);
    }
    result
}

/// Check `output` against the job and wrap it as a result.
///
/// Rejected output is logged in full; the returned reason names the first
/// problem found.
pub fn shape_result(output: SimulationOutput, ctx: &ResultContext<'_>) -> Result<ExecutionResult, String> {
    if let Err(reason) = check_output(&output, ctx.num_qubits, ctx.shots) {
        error!(job_id = ctx.job_id, %reason, raw = ?output, "Rejected engine output");
        return Err(reason);
    }
    Ok(into_result(output, ctx))
}
