//! Buildlog CLI library module.
//!
//! Drives the compactor from a shell, standing in for the CI host that
//! would normally call it when a run is finalized:
//! - `compact` - compress finished logs in place
//! - `inspect` - report whether logs are compressed and flag leftover side files
//!
//! # Module Organization
//!
//! - `cli` - argument parsing and command dispatch
//! - `config` - config file and environment overrides
//! - `logging` - tracing subscriber setup
//! - `*_cmd` - individual command implementations

pub mod cli;
pub mod compact_cmd;
pub mod config;
pub mod inspect_cmd;
pub mod logging;
