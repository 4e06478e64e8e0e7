//! `warmup check`: the consumer-side magic check.

use warmup_cache::is_cache_usable;

use crate::pipeline::emit_output;
use crate::{CheckArgs, GlobalArgs};

/// Runs the `warmup check` command.
///
/// Writes `usable` or `unusable` and exits 0 or 1 accordingly. Only the magic
/// token is inspected; a cache that passes may still fail a full read.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let usable = is_cache_usable(&args.cache);
    emit_output(args.output.as_deref(), if usable { "usable" } else { "unusable" })?;
    if !usable && !global.quiet {
        eprintln!("   {} is missing or not a startup cache", args.cache.display());
    }
    Ok(if usable { 0 } else { 1 })
}
