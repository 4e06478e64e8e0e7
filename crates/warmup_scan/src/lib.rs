//! Parallel asset discovery.
//!
//! [`Scanner::scan`] walks a project tree, probes each regular file's first
//! four bytes to classify it, and for package containers runs a bounded
//! header parse to collect declared dependency references. Per-file problems
//! are returned as [`ScanFailure`]s; only a missing root aborts the scan.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod header;
pub mod scanner;

pub use entry::{FileStat, RawAssetEntry, ScanFailure};
pub use error::ScanError;
pub use header::{encode_package, parse_package_header, HeaderError, PackageHeader};
pub use scanner::{ScanOptions, ScanOutput, Scanner, StatOutput};
