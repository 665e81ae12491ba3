//! Library half of the `pubrand` binary: configuration loading and the
//! command implementations, kept out of `main.rs` so they can be tested
//! without spawning a process.

pub mod commands;
pub mod config;

pub use config::CliConfig;
