//! ALCOM `qasm_simulator` backend.
//!
//! Runs circuits on the decision-diagram engine from `alcom-dd` behind the
//! [`Backend`](alcom_hal::Backend) trait.
//!
//! | Concern | Module |
//! |---------|--------|
//! | Settings, YAML and `ALCOM_*` overrides | [`config`] |
//! | Engine entry point | [`controller`] |
//! | Advertised gate list | [`gates`] |
//! | Pre-engine checks | [`validation`] |
//! | Engine output to result record | [`shaping`] |
//! | Job table and worker tasks | [`backend`] |
//!
//! # Example
//!
//! ```no_run
//! use alcom_adapter_bdd::BddBackend;
//! use alcom_hal::{Backend, RunOptions};
//! use alcom_ir::Circuit;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = BddBackend::new();
//! let circuit = Circuit::bell()?;
//! let job_id = backend.submit(&circuit, &RunOptions::with_shots(1000)).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("{:?}", result.get_counts());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod gates;
pub mod shaping;
pub mod validation;

pub use backend::{BACKEND_VERSION, BddBackend};
pub use config::{BddConfig, ConfigError};
pub use controller::{Controller, ControllerError, DdController, SimulationRequest};
pub use shaping::ENGINE_FAILURE;
