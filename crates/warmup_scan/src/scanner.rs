//! Directory walk, magic probe, and header extraction.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, Metadata};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};
use warmup_common::{normalize_relative, AssetKind, HeaderStatus};
use warmup_config::{WarmupConfig, CONFIG_FILE};

use crate::entry::{FileStat, RawAssetEntry, ScanFailure};
use crate::error::ScanError;
use crate::header::parse_package_header;

/// Minimum file size for the type probe.
pub const PROBE_LEN: u64 = 4;

/// Scanner settings, usually derived from [`WarmupConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory names skipped at any depth.
    pub exclude: BTreeSet<String>,
    /// Whether dot-files and dot-directories are visited.
    pub include_hidden: bool,
    /// Upper bound on header bytes read per file.
    pub max_header_bytes: usize,
    /// Project-relative paths that are entry assets.
    pub entries: BTreeSet<String>,
    /// Whether every map counts as an entry asset.
    pub maps_are_entries: bool,
}

impl ScanOptions {
    /// Extracts scanner settings from the pipeline configuration.
    pub fn from_config(config: &WarmupConfig) -> Self {
        Self {
            exclude: config.scan.exclude.iter().cloned().collect(),
            include_hidden: config.scan.include_hidden,
            max_header_bytes: config.scan.max_header_bytes,
            entries: config.startup.entries.iter().cloned().collect(),
            maps_are_entries: config.startup.maps_are_entries,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&WarmupConfig::default())
    }
}

/// Everything a scan produced, both lists sorted by path.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Readable files.
    pub entries: Vec<RawAssetEntry>,
    /// Files excluded because they could not be read or classified.
    pub failures: Vec<ScanFailure>,
}

/// What a metadata-only walk produced, both lists sorted by path.
#[derive(Debug, Clone, Default)]
pub struct StatOutput {
    /// Files that could be stat'ed.
    pub entries: Vec<FileStat>,
    /// Files that could not be stat'ed or are below the probe size.
    pub failures: Vec<ScanFailure>,
}

/// Walks a project tree and collects per-asset metadata.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Creates a scanner.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// The scanner's settings.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scans every regular file below `root`.
    ///
    /// Files are grouped into one shard per directory and the shards are
    /// processed on the current rayon pool. Symlinks are not followed.
    pub fn scan(&self, root: &Path) -> Result<ScanOutput, ScanError> {
        let started = Instant::now();
        let (shards, mut failures) = self.walk(root)?;

        let results: Vec<Result<RawAssetEntry, ScanFailure>> = shards
            .par_iter()
            .flat_map_iter(|(_, files)| files.iter().map(|file| self.scan_file(root, file)))
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(entry) => entries.push(entry),
                Err(failure) => failures.push(failure),
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            assets = entries.len(),
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scanned {}",
            root.display()
        );
        Ok(ScanOutput { entries, failures })
    }

    /// Walks the same files as [`scan`](Self::scan) but only stats them.
    ///
    /// No file is opened, so neither the type probe nor the header parse runs.
    /// Files below the probe size still fail with
    /// [`DiagnosticCode::PROBE_TOO_SMALL`](warmup_diagnostics::DiagnosticCode::PROBE_TOO_SMALL),
    /// keeping the asset set identical to a full scan of readable files.
    pub fn scan_metadata(&self, root: &Path) -> Result<StatOutput, ScanError> {
        let (shards, mut failures) = self.walk(root)?;

        let results: Vec<Result<FileStat, ScanFailure>> = shards
            .par_iter()
            .flat_map_iter(|(_, files)| files.iter().map(|file| stat_file(root, file)))
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(stat) => entries.push(stat),
                Err(failure) => failures.push(failure),
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(files = entries.len(), failures = failures.len(), "metadata walk done");
        Ok(StatOutput { entries, failures })
    }

    /// Scans a single file. `abs` must lie below `root`.
    pub fn scan_file(&self, root: &Path, abs: &Path) -> Result<RawAssetEntry, ScanFailure> {
        let path = display_path(root, abs);

        let mut file = File::open(abs).map_err(|e| ScanFailure::read(path.clone(), e))?;
        let meta = file
            .metadata()
            .map_err(|e| ScanFailure::read(path.clone(), e))?;
        let size = meta.len();
        if size < PROBE_LEN {
            return Err(ScanFailure::too_small(path, size));
        }
        let modified_ns = modified_ns(&meta);

        let limit = (self.options.max_header_bytes as u64).min(size);
        let mut head = Vec::with_capacity(limit as usize);
        file.by_ref()
            .take(limit)
            .read_to_end(&mut head)
            .map_err(|e| ScanFailure::read(path.clone(), e))?;
        if (head.len() as u64) < PROBE_LEN {
            return Err(ScanFailure::too_small(path, head.len() as u64));
        }

        let extension = abs.extension().and_then(|e| e.to_str());
        let kind = AssetKind::probe([head[0], head[1], head[2], head[3]], extension);

        let (header, parse_error, references) = if kind.has_header() {
            match parse_package_header(&head) {
                Ok(parsed) => (HeaderStatus::Parsed, None, parsed.references),
                Err(err) => {
                    debug!(path = %path, error = %err, "header parse failed");
                    (HeaderStatus::Failed, Some(err.to_string()), Vec::new())
                }
            }
        } else {
            (HeaderStatus::NotApplicable, None, Vec::new())
        };

        let is_entry = (kind == AssetKind::Map && self.options.maps_are_entries)
            || self.options.entries.contains(&path);

        Ok(RawAssetEntry {
            path,
            abs_path: abs.to_path_buf(),
            size,
            modified_ns,
            kind,
            header,
            parse_error,
            references,
            is_entry,
        })
    }

    // Lists the files to visit, one shard per directory. Walk errors, such as
    // an unreadable directory, become read failures.
    fn walk(&self, root: &Path) -> Result<(BTreeMap<PathBuf, Vec<PathBuf>>, Vec<ScanFailure>), ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut shards: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        let mut failures = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || self.keep(e));
        for item in walker {
            match item {
                Ok(entry) if entry.file_type().is_file() => {
                    let dir = entry
                        .path()
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    shards.entry(dir).or_default().push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| display_path(root, p))
                        .unwrap_or_else(|| root.display().to_string());
                    debug!(path = %path, error = %err, "walk error");
                    failures.push(ScanFailure::read(path, err));
                }
            }
        }

        let file_count: usize = shards.values().map(Vec::len).sum();
        debug!(shards = shards.len(), files = file_count, "walk complete");
        Ok((shards, failures))
    }

    fn keep(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if !self.options.include_hidden && name.starts_with('.') {
            return false;
        }
        if entry.file_type().is_dir() {
            return !self.options.exclude.contains(&*name);
        }
        !(entry.depth() == 1 && name == CONFIG_FILE)
    }
}

fn stat_file(root: &Path, abs: &Path) -> Result<FileStat, ScanFailure> {
    let path = display_path(root, abs);
    let meta = fs::metadata(abs).map_err(|e| ScanFailure::read(path.clone(), e))?;
    let size = meta.len();
    if size < PROBE_LEN {
        return Err(ScanFailure::too_small(path, size));
    }
    Ok(FileStat {
        path,
        abs_path: abs.to_path_buf(),
        size,
        modified_ns: modified_ns(&meta),
    })
}

fn modified_ns(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn display_path(root: &Path, path: &Path) -> String {
    normalize_relative(root, path).unwrap_or_else(|| path.display().to_string())
}
