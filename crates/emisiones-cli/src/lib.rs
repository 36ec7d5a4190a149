//! Command-line reconciler for scheduled broadcasts.

pub mod cli;
pub mod config;
pub mod error;
