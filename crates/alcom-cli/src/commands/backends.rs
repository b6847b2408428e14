//! Backends command implementation.

use anyhow::Result;
use console::style;

use alcom_hal::{Backend, Capabilities};

use super::common::{build_registry, load_config};

pub async fn execute(json: bool) -> Result<()> {
    let registry = build_registry(load_config(None)?);
    let backends = registry.backends();

    if json {
        let caps: Vec<&Capabilities> = backends.iter().map(|b| b.capabilities()).collect();
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(());
    }

    println!("{} Available backends:\n", style("ALCOM").cyan().bold());
    for backend in &backends {
        let caps = backend.capabilities();
        let availability = backend.availability().await?;
        println!(
            "  {} {} {}",
            if availability.operational {
                style("●").green()
            } else {
                style("○").red()
            },
            style(backend.name()).bold(),
            if caps.local { "(local)" } else { "" }
        );
        println!("    Version: {}", caps.backend_version);
        println!("    Qubits: {}", caps.n_qubits);
        println!("    Max shots: {}", caps.max_shots);
        println!("    Gates: {}", caps.basis_gates.join(", "));
        if !caps.features.is_empty() {
            println!("    Features: {}", caps.features.join(", "));
        }
        if !availability.status_message.is_empty() {
            println!("    Status: {}", availability.status_message);
        }
        println!();
    }
    Ok(())
}
