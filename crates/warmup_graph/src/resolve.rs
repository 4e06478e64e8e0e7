//! Mapping header references to project-relative asset paths.

use std::collections::{BTreeMap, BTreeSet};

use warmup_common::{AssetKind, AssetRecord};

use crate::graph::DependencyEdge;

const MOUNT_POINTS: [(&str, &str); 2] = [("/Game/", "Content/"), ("/Engine/", "Engine/Content/")];

// Native class references name compiled code, not files.
const NATIVE_PREFIX: &str = "/Script/";

/// Resolves raw header references against the scanned asset set.
///
/// A reference is tried as an exact project-relative path first, then as an
/// extension-less package path. When several packages share a stem the
/// smallest path wins.
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    paths: BTreeSet<String>,
    stems: BTreeMap<String, String>,
}

impl ReferenceResolver {
    /// Indexes the given records. Only packages and maps are reachable by stem.
    pub fn new<'a>(records: impl IntoIterator<Item = &'a AssetRecord>) -> Self {
        let mut paths = BTreeSet::new();
        let mut packages = BTreeSet::new();
        for record in records {
            paths.insert(record.path.clone());
            if matches!(record.kind, AssetKind::Package | AssetKind::Map) {
                packages.insert(record.path.as_str());
            }
        }
        let mut stems = BTreeMap::new();
        for path in packages {
            if let Some(stem) = package_stem(path) {
                stems
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_string());
            }
        }
        Self { paths, stems }
    }

    /// Maps a raw reference to the path it should resolve to.
    ///
    /// Returns `None` for references that never name a file (native classes,
    /// empty strings). Otherwise returns the matching asset path, or the
    /// normalized candidate if nothing matches; the graph builder reports the
    /// latter as dangling.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with(NATIVE_PREFIX) {
            return None;
        }
        let candidate = normalize(reference);
        if self.paths.contains(&candidate) {
            return Some(candidate);
        }
        if let Some(path) = self.stems.get(&candidate) {
            return Some(path.clone());
        }
        // Object paths such as `/Game/Hero.Hero` name an object inside a package.
        if let Some((package, object)) = candidate.rsplit_once('.') {
            if !object.contains('/') {
                if let Some(path) = self.stems.get(package) {
                    return Some(path.clone());
                }
            }
        }
        Some(candidate)
    }

    /// Resolves every reference of `dependent` into edges.
    pub fn edges_for(&self, dependent: &str, references: &[String]) -> Vec<DependencyEdge> {
        references
            .iter()
            .filter_map(|r| self.resolve(r))
            .map(|dependency| DependencyEdge {
                dependent: dependent.to_string(),
                dependency,
            })
            .collect()
    }
}

fn normalize(reference: &str) -> String {
    for (mount, dir) in MOUNT_POINTS {
        if let Some(rest) = reference.strip_prefix(mount) {
            return format!("{dir}{rest}");
        }
    }
    reference.trim_start_matches('/').to_string()
}

fn package_stem(path: &str) -> Option<&str> {
    path.strip_suffix(".uasset")
        .or_else(|| path.strip_suffix(".umap"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_common::HeaderStatus;

    fn record(path: &str, kind: AssetKind) -> AssetRecord {
        AssetRecord {
            path: path.to_string(),
            size: 1,
            modified_ns: 0,
            kind,
            header: HeaderStatus::NotApplicable,
            fingerprint: None,
            startup_critical: false,
        }
    }

    fn resolver() -> ReferenceResolver {
        let records = vec![
            record("Content/Hero.uasset", AssetKind::Package),
            record("Content/Maps/Arena.umap", AssetKind::Map),
            record("Engine/Content/Basic.uasset", AssetKind::Package),
            record("Content/T/icon.png", AssetKind::Texture),
        ];
        ReferenceResolver::new(&records)
    }

    #[test]
    fn mount_points_map_to_directories() {
        let r = resolver();
        assert_eq!(r.resolve("/Game/Hero").as_deref(), Some("Content/Hero.uasset"));
        assert_eq!(r.resolve("/Game/Maps/Arena").as_deref(), Some("Content/Maps/Arena.umap"));
        assert_eq!(r.resolve("/Engine/Basic").as_deref(), Some("Engine/Content/Basic.uasset"));
    }

    #[test]
    fn exact_paths_resolve() {
        let r = resolver();
        assert_eq!(r.resolve("Content/T/icon.png").as_deref(), Some("Content/T/icon.png"));
        assert_eq!(r.resolve("/Content/Hero.uasset").as_deref(), Some("Content/Hero.uasset"));
    }

    #[test]
    fn object_paths_resolve_to_their_package() {
        let r = resolver();
        assert_eq!(r.resolve("/Game/Hero.Hero").as_deref(), Some("Content/Hero.uasset"));
    }

    #[test]
    fn unresolved_returns_candidate() {
        let r = resolver();
        assert_eq!(r.resolve("/Game/Missing").as_deref(), Some("Content/Missing"));
    }

    #[test]
    fn native_and_empty_are_ignored() {
        let r = resolver();
        assert_eq!(r.resolve("/Script/Engine"), None);
        assert_eq!(r.resolve("  "), None);
    }

    #[test]
    fn stem_collision_picks_smallest_path() {
        let records = vec![
            record("Content/A.umap", AssetKind::Map),
            record("Content/A.uasset", AssetKind::Package),
        ];
        let r = ReferenceResolver::new(&records);
        assert_eq!(r.resolve("/Game/A").as_deref(), Some("Content/A.uasset"));
    }

    #[test]
    fn edges_for_builds_pairs() {
        let r = resolver();
        let edges = r.edges_for(
            "Content/Maps/Arena.umap",
            &["/Game/Hero".to_string(), "/Script/Engine".to_string()],
        );
        assert_eq!(
            edges,
            vec![DependencyEdge {
                dependent: "Content/Maps/Arena.umap".into(),
                dependency: "Content/Hero.uasset".into(),
            }]
        );
    }
}
