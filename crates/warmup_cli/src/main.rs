//! Warmup CLI: the command-line interface for the asset startup-cache pipeline.
//!
//! `warmup scan` and `warmup analyze` inspect a project tree, `warmup cache`
//! and `warmup turbo` build a startup cache, `warmup verify` and
//! `warmup quick-verify` detect drift against an existing cache, and
//! `warmup stats`, `warmup graph-export`, `warmup benchmark`, and
//! `warmup check` report on caches, graphs, and timings.

#![warn(missing_docs)]

mod analyze;
mod bench;
mod cache;
mod check;
mod graph;
mod pipeline;
mod stats;
mod verify;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use warmup_common::AssetKind;

/// Warmup: asset analysis and startup-cache builder.
#[derive(Parser, Debug)]
#[command(name = "warmup", version, about = "Asset analysis and startup-cache pipeline")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `warmup.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Worker thread count. Overrides `scan.threads`.
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the assets found in a project tree.
    Scan(ScanArgs),
    /// Build the dependency graph and write the analysis report.
    Analyze(AnalyzeArgs),
    /// Build a startup cache with exhaustive fingerprints.
    Cache(CacheArgs),
    /// Build a startup cache with sampled fingerprints.
    Turbo(CacheArgs),
    /// Re-fingerprint every cached asset and compare against a cache.
    ///
    /// Assets are re-hashed in the cache's own fingerprint mode, so a cache
    /// built by `turbo` is verified at sampled strength only.
    Verify(VerifyArgs),
    /// Compare sizes and modification times against a cache.
    QuickVerify(VerifyArgs),
    /// Summarize the contents of a cache file.
    Stats(StatsArgs),
    /// Export the dependency graph in Graphviz DOT format.
    GraphExport(GraphExportArgs),
    /// Time the scan and fingerprint stages.
    Benchmark(BenchmarkArgs),
    /// Check whether a cache file carries the expected magic token.
    Check(CheckArgs),
}

/// Arguments for the `warmup scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Output format for the asset list.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the asset list to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List only assets of this kind.
    #[arg(long, value_enum)]
    pub filter: Option<KindFilter>,
}

/// Arguments for the `warmup analyze` subcommand.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Write the JSON report to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `warmup cache` and `warmup turbo` subcommands.
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Cache destination. Defaults to `<root>/Saved/warmup/startup.uefast`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the JSON analysis report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Rebuild even if a cache already exists at the destination.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `warmup verify` and `warmup quick-verify` subcommands.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Cache to verify. Defaults to `<root>/Saved/warmup/startup.uefast`.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Exit with status 1 when any drift is found.
    #[arg(long)]
    pub strict: bool,

    /// Output format for the verification result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the verification result to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `warmup stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Cache file to summarize.
    pub cache: PathBuf,

    /// Output format for the statistics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the statistics to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `warmup graph-export` subcommand.
#[derive(Parser, Debug)]
pub struct GraphExportArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Write the DOT graph to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export only startup-critical assets and the edges between them.
    #[arg(long)]
    pub startup_only: bool,
}

/// Arguments for the `warmup benchmark` subcommand.
#[derive(Parser, Debug)]
pub struct BenchmarkArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Number of timed iterations.
    #[arg(short = 'n', long, default_value_t = 3)]
    pub iterations: usize,

    /// Output format for the timings.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the timings to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `warmup check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Cache file to check.
    pub cache: PathBuf,

    /// Write the verdict to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Asset kinds accepted by `scan --filter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    /// Package containers.
    Package,
    /// Level containers.
    Map,
    /// Images.
    Texture,
    /// Audio streams.
    Audio,
    /// Unrecognized files.
    Unknown,
}

impl KindFilter {
    /// The asset kind this filter selects.
    pub fn kind(self) -> AssetKind {
        match self {
            KindFilter::Package => AssetKind::Package,
            KindFilter::Map => AssetKind::Map,
            KindFilter::Texture => AssetKind::Texture,
            KindFilter::Audio => AssetKind::Audio,
            KindFilter::Unknown => AssetKind::Unknown,
        }
    }
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
    /// Optional worker thread override.
    pub threads: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        threads: cli.threads,
    };
    pipeline::init_logging(&global);

    let result = match cli.command {
        Command::Scan(ref args) => analyze::run_scan(args, &global),
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::Cache(ref args) => cache::run(args, cache::Flavor::Exhaustive, &global),
        Command::Turbo(ref args) => cache::run(args, cache::Flavor::Turbo, &global),
        Command::Verify(ref args) => verify::run(args, verify::Strategy::Full, &global),
        Command::QuickVerify(ref args) => verify::run(args, verify::Strategy::Quick, &global),
        Command::Stats(ref args) => stats::run(args, &global),
        Command::GraphExport(ref args) => graph::run(args, &global),
        Command::Benchmark(ref args) => bench::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Rough terminal detection: colors are enabled when `TERM` is set.
fn atty_is_terminal() -> bool {
    std::env::var("TERM").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Parser, ValueEnum};

    #[test]
    fn parse_scan_default() {
        let cli = Cli::parse_from(["warmup", "scan"]);
        match cli.command {
            Command::Scan(ref args) => {
                assert_eq!(args.root, PathBuf::from("."));
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.output.is_none());
                assert!(args.filter.is_none());
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn parse_scan_filter() {
        let cli = Cli::parse_from(["warmup", "scan", "--filter", "texture"]);
        match cli.command {
            Command::Scan(ref args) => {
                assert_eq!(args.filter.map(KindFilter::kind), Some(AssetKind::Texture));
            }
            _ => panic!("expected Scan command"),
        }
        assert!(Cli::try_parse_from(["warmup", "scan", "--filter", "shader"]).is_err());
    }

    #[test]
    fn kind_filter_covers_every_kind() {
        let kinds: Vec<AssetKind> = KindFilter::value_variants()
            .iter()
            .map(|f| f.kind())
            .collect();
        assert_eq!(kinds, AssetKind::ALL.to_vec());
    }

    #[test]
    fn verify_help_states_sampled_strength() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let verify = cmd.find_subcommand("verify").unwrap();
        let help = verify.get_long_about().unwrap().to_string();
        assert!(help.contains("sampled strength"));
    }

    #[test]
    fn parse_analyze_with_output() {
        let cli = Cli::parse_from(["warmup", "analyze", "/proj", "-o", "report.json"]);
        match cli.command {
            Command::Analyze(ref args) => {
                assert_eq!(args.root, PathBuf::from("/proj"));
                assert_eq!(args.output.as_deref(), Some(std::path::Path::new("report.json")));
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn parse_cache_and_turbo() {
        let cli = Cli::parse_from(["warmup", "cache", "/proj", "--output", "out.uefast"]);
        match cli.command {
            Command::Cache(ref args) => {
                assert_eq!(args.output, Some(PathBuf::from("out.uefast")));
                assert!(args.report.is_none());
                assert!(!args.force);
            }
            _ => panic!("expected Cache command"),
        }

        let cli = Cli::parse_from(["warmup", "turbo", "/proj", "--report", "r.json", "--force"]);
        match cli.command {
            Command::Turbo(ref args) => {
                assert!(args.force);
                assert!(args.output.is_none());
                assert_eq!(args.report, Some(PathBuf::from("r.json")));
            }
            _ => panic!("expected Turbo command"),
        }
    }

    #[test]
    fn parse_verify_variants() {
        let cli = Cli::parse_from(["warmup", "verify", "--strict", "--cache", "c.uefast"]);
        match cli.command {
            Command::Verify(ref args) => {
                assert!(args.strict);
                assert_eq!(args.cache, Some(PathBuf::from("c.uefast")));
            }
            _ => panic!("expected Verify command"),
        }

        let cli = Cli::parse_from(["warmup", "quick-verify", "--format", "json", "-o", "v.json"]);
        match cli.command {
            Command::QuickVerify(ref args) => {
                assert!(!args.strict);
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.output, Some(PathBuf::from("v.json")));
            }
            _ => panic!("expected QuickVerify command"),
        }
    }

    #[test]
    fn parse_graph_export() {
        let cli = Cli::parse_from(["warmup", "graph-export", "--startup-only"]);
        match cli.command {
            Command::GraphExport(ref args) => {
                assert!(args.startup_only);
                assert!(args.output.is_none());
            }
            _ => panic!("expected GraphExport command"),
        }
    }

    #[test]
    fn parse_benchmark_iterations() {
        let cli = Cli::parse_from(["warmup", "benchmark", "-n", "10"]);
        match cli.command {
            Command::Benchmark(ref args) => assert_eq!(args.iterations, 10),
            _ => panic!("expected Benchmark command"),
        }
    }

    #[test]
    fn stats_and_check_require_a_cache_path() {
        assert!(Cli::try_parse_from(["warmup", "stats"]).is_err());
        assert!(Cli::try_parse_from(["warmup", "check"]).is_err());
        let cli = Cli::parse_from(["warmup", "check", "startup.uefast"]);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["warmup", "--quiet", "--color", "never", "-j", "4", "scan"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.threads, Some(4));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["warmup", "analyze", "--verbose", "--config", "alt.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }
}
