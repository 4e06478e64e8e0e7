//! Shared helpers for CLI commands.
//!
//! Logging setup, configuration loading with CLI overrides, diagnostic
//! rendering, and output-destination handling.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use warmup_config::WarmupConfig;
use warmup_diagnostics::{Diagnostic, DiagnosticRenderer, TerminalRenderer};
use warmup_pipeline::Pipeline;

use crate::GlobalArgs;

/// Default cache location relative to the project root.
pub const DEFAULT_CACHE_PATH: &str = "Saved/warmup/startup.uefast";

/// Installs the stderr log subscriber. Level follows `--quiet`/`--verbose`.
pub fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        LevelFilter::ERROR
    } else if global.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(global.color)
        .try_init();
}

/// Loads `warmup.toml` from `--config` or the project root and applies CLI overrides.
pub fn load_config(root: &Path, global: &GlobalArgs) -> Result<WarmupConfig, Box<dyn std::error::Error>> {
    let mut config = match &global.config {
        Some(path) => warmup_config::load_config_file(path)?,
        None => warmup_config::load_config(root)?,
    };
    if let Some(threads) = global.threads {
        config.scan.threads = threads;
    }
    Ok(config)
}

/// Builds a pipeline for the project at `root`.
pub fn build_pipeline(root: &Path, global: &GlobalArgs) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let config = load_config(root, global)?;
    Ok(Pipeline::new(config)?)
}

/// The cache path to use: the explicit one, else the default under `root`.
pub fn cache_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_CACHE_PATH))
}

/// Prints diagnostics to stderr, followed by a one-line summary.
pub fn render_diagnostics(diagnostics: &[Diagnostic], global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    let renderer = TerminalRenderer::new(global.color);
    for diag in diagnostics {
        eprint!("{}", renderer.render(diag));
    }
    let errors = diagnostics.iter().filter(|d| d.severity.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if !diagnostics.is_empty() {
        eprintln!("   Result: {errors} excluded file(s), {warnings} warning(s)");
    }
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn emit_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Formats a byte count with a binary unit suffix.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
