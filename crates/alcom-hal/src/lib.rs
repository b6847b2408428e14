//! ALCOM backend abstraction.
//!
//! Backends accept circuits as jobs, run them asynchronously and hand back
//! an [`ExecutionResult`]:
//! - [`Backend`] covers the job lifecycle (submit, poll, fetch, cancel)
//! - [`Capabilities`] describes what a backend accepts
//! - [`BackendRegistry`] collects backends and backend factories
//!
//! # Example
//!
//! ```ignore
//! use alcom_adapter_bdd::BddBackend;
//! use alcom_hal::{Backend, RunOptions};
//! use alcom_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = BddBackend::new();
//!     let circuit = Circuit::bell()?;
//!
//!     let job_id = backend.submit(&circuit, &RunOptions::with_shots(1000)).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     if let Some((bitstring, count)) = result.get_counts().most_frequent() {
//!         println!("Most frequent: {bitstring} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, NoiseModel, RunOptions,
    ValidationResult,
};
pub use capability::{Capabilities, GateConfig};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult};
