//! The reconciliation engine.
//!
//! One run compares the broadcasts that exist on the account against the
//! plan derived from the category catalog and creates exactly the missing
//! ones, in order, until the plan is exhausted or the provider refuses
//! further creations. Runs are stateless; every invocation rebuilds its
//! view from the remote account.

pub mod orchestrator;

pub use orchestrator::{EngineConfig, EngineError, RunResult, StopReason, run, run_at};
