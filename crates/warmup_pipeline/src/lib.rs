//! End-to-end orchestration of the warmup pipeline.
//!
//! A [`Pipeline`] owns the configuration and a fixed-size worker pool and
//! sequences the stages: scan, fingerprint, graph, and serialize. Each
//! [`RunMode`] selects a prefix of that sequence. Per-asset problems are
//! collected as diagnostics and surface in the [`AnalysisReport`]; only a
//! missing root or an empty tree aborts a run.
//!
//! [`Pipeline::verify`] compares an existing cache with the current tree and
//! [`Pipeline::benchmark`] times the scan and fingerprint stages.

#![warn(missing_docs)]

pub mod bench;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod verify;

pub use bench::{BenchmarkReport, Timing};
pub use error::PipelineError;
pub use orchestrator::{Pipeline, RunMode, RunOutcome};
pub use report::{AnalysisReport, FailureEntry, KindSummary, Priority, Recommendation};
pub use verify::{VerifyMode, VerifyReport};
