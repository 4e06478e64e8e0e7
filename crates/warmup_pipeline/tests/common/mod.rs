//! Fixture project trees for pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::TempDir;
use warmup_scan::encode_package;

/// A throwaway project root.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Writes raw bytes, creating parent directories.
    pub fn write(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Writes a package whose header references `refs`.
    pub fn package(&self, rel: &str, refs: &[&str]) -> PathBuf {
        let name = format!("/Game/{}", rel.trim_start_matches("Content/").split('.').next().unwrap());
        self.write(rel, &encode_package(&name, refs, &[0xAB; 256]))
    }

    /// Writes a package with a payload of `payload_len` bytes of `fill`.
    pub fn package_with_payload(&self, rel: &str, refs: &[&str], fill: u8, payload_len: usize) -> PathBuf {
        self.write(rel, &encode_package("/Game/Big", refs, &vec![fill; payload_len]))
    }

    pub fn modified(&self, rel: &str) -> SystemTime {
        fs::metadata(self.path(rel)).unwrap().modified().unwrap()
    }

    /// Overwrites bytes at `offset` and restores the previous modification time.
    pub fn patch_keep_mtime(&self, rel: &str, offset: usize, bytes: &[u8]) {
        let before = self.modified(rel);
        let path = self.path(rel);
        let mut content = fs::read(&path).unwrap();
        content[offset..offset + bytes.len()].copy_from_slice(bytes);
        fs::write(&path, &content).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(before).unwrap();
    }

    /// Sets the modification time to `secs` seconds after the epoch.
    pub fn touch_at(&self, rel: &str, secs: u64) {
        let file = fs::File::options().write(true).open(self.path(rel)).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs))
            .unwrap();
    }
}

/// The two-asset project: `B` depends on `A`.
pub fn two_packages() -> Project {
    let p = Project::new();
    p.package("Content/A.uasset", &[]);
    p.package("Content/B.uasset", &["/Game/A"]);
    p
}
