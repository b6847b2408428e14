//! Library half of the `alcom` binary: argument definitions and command
//! implementations.

pub mod cli;
pub mod commands;
