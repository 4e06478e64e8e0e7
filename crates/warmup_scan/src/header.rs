//! Bounded package header parsing.
//!
//! Only the fields needed to reach the name and import tables are decoded.
//! Every read is bounds-checked against the header buffer, which the scanner
//! caps at `scan.max_header_bytes`; any offset, count, or string that points
//! outside the buffer fails the parse instead of reading further.

use std::collections::BTreeSet;

use warmup_common::PACKAGE_MAGIC;

/// Size of one import table entry.
pub const IMPORT_ENTRY_LEN: usize = 28;

const CUSTOM_VERSION_LEN: usize = 20;

/// Why a package header could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// The container signature is wrong.
    #[error("bad package magic {found:#010x}")]
    BadMagic {
        /// The value found at offset 0.
        found: u32,
    },

    /// A read would extend past the bounded header buffer.
    #[error("{what} at offset {offset} needs {needed} bytes but the header has {available}")]
    OutOfBounds {
        /// The field being read.
        what: &'static str,
        /// Start offset of the read.
        offset: usize,
        /// Bytes requested.
        needed: usize,
        /// Bytes in the header buffer.
        available: usize,
    },

    /// A count or offset field is negative.
    #[error("{what} is negative ({value})")]
    Negative {
        /// The field name.
        what: &'static str,
        /// The decoded value.
        value: i32,
    },

    /// An import names an entry past the end of the name table.
    #[error("name index {index} out of range (table has {len} names)")]
    NameIndex {
        /// The index found in the import entry.
        index: i32,
        /// Number of names in the table.
        len: usize,
    },
}

/// The decoded parts of a package header that the pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageHeader {
    /// The package's own name as recorded in the header.
    pub package_name: String,
    /// Declared file version.
    pub file_version: i32,
    /// Name table contents.
    pub names: Vec<String>,
    /// Number of import table entries.
    pub import_count: usize,
    /// Package references declared by top-level imports, sorted and deduplicated.
    pub references: Vec<String>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn take(&mut self, what: &'static str, n: usize) -> Result<&'a [u8], HeaderError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(HeaderError::OutOfBounds {
                what,
                offset: self.pos,
                needed: n,
                available: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, what: &'static str, n: usize) -> Result<(), HeaderError> {
        self.take(what, n).map(|_| ())
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, HeaderError> {
        let b = self.take(what, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32, HeaderError> {
        self.u32(what).map(|v| v as i32)
    }

    fn count(&mut self, what: &'static str) -> Result<usize, HeaderError> {
        let value = self.i32(what)?;
        usize::try_from(value).map_err(|_| HeaderError::Negative { what, value })
    }

    // Length-prefixed string: positive = UTF-8 bytes, negative = UTF-16 units,
    // both including a terminating NUL.
    fn fstring(&mut self, what: &'static str) -> Result<String, HeaderError> {
        let len = self.i32(what)?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > 0 {
            let raw = self.take(what, len as usize)?;
            let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
            return Ok(String::from_utf8_lossy(raw).into_owned());
        }
        let units = len.unsigned_abs() as usize;
        let raw = self.take(what, units.saturating_mul(2))?;
        let mut wide: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        if wide.last() == Some(&0) {
            wide.pop();
        }
        Ok(String::from_utf16_lossy(&wide))
    }
}

/// Parses a package header from the first bytes of a file.
///
/// A top-level import (outer index 0) names another package; its object name
/// is reported as a dependency reference.
pub fn parse_package_header(bytes: &[u8]) -> Result<PackageHeader, HeaderError> {
    let mut r = Reader::at(bytes, 0);

    let magic = r.u32("magic")?;
    if magic != PACKAGE_MAGIC {
        return Err(HeaderError::BadMagic { found: magic });
    }
    let _legacy_version = r.i32("legacy version")?;
    let _legacy_ue3_version = r.i32("legacy UE3 version")?;
    let file_version = r.i32("file version")?;
    let _file_version_ue5 = r.i32("UE5 file version")?;
    let _licensee_version = r.i32("licensee version")?;
    let custom_versions = r.count("custom version count")?;
    r.skip(
        "custom versions",
        custom_versions.saturating_mul(CUSTOM_VERSION_LEN),
    )?;
    let _total_header_size = r.i32("total header size")?;
    let package_name = r.fstring("package name")?;
    let _package_flags = r.u32("package flags")?;
    let name_count = r.count("name count")?;
    let name_offset = r.count("name offset")?;
    r.skip("gatherable text data", 16)?;
    let _export_count = r.count("export count")?;
    let _export_offset = r.count("export offset")?;
    let import_count = r.count("import count")?;
    let import_offset = r.count("import offset")?;

    let mut names = Vec::with_capacity(name_count.min(bytes.len() / 8));
    let mut nr = Reader::at(bytes, name_offset);
    for _ in 0..name_count {
        names.push(nr.fstring("name entry")?);
        nr.skip("name hash", 4)?;
    }

    let table = Reader::at(bytes, import_offset)
        .take("import table", import_count.saturating_mul(IMPORT_ENTRY_LEN))?;

    let mut references = BTreeSet::new();
    for entry in table.chunks_exact(IMPORT_ENTRY_LEN) {
        let mut er = Reader::at(entry, 16);
        let outer_index = er.i32("import outer index")?;
        let object_name = er.i32("import object name")?;
        if outer_index != 0 {
            continue;
        }
        let name = usize::try_from(object_name)
            .ok()
            .and_then(|i| names.get(i))
            .ok_or(HeaderError::NameIndex {
                index: object_name,
                len: names.len(),
            })?;
        if !name.is_empty() {
            references.insert(name.clone());
        }
    }

    Ok(PackageHeader {
        package_name,
        file_version,
        names,
        import_count,
        references: references.into_iter().collect(),
    })
}

/// Encodes a minimal well-formed package header that declares `references`
/// as top-level imports, followed by `payload`.
///
/// Used to produce fixture assets and benchmark trees.
pub fn encode_package(package_name: &str, references: &[&str], payload: &[u8]) -> Vec<u8> {
    fn put_i32(out: &mut Vec<u8>, v: i32) {
        out.extend_from_slice(&v.to_le_bytes());
    }
    fn put_fstring(out: &mut Vec<u8>, s: &str) {
        put_i32(out, s.len() as i32 + 1);
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    fn patch(out: &mut [u8], at: usize, v: usize) {
        out[at..at + 4].copy_from_slice(&(v as i32).to_le_bytes());
    }

    let mut names: Vec<&str> = vec!["/Script/CoreUObject", "Package"];
    names.extend_from_slice(references);

    let mut out = Vec::new();
    out.extend_from_slice(&PACKAGE_MAGIC.to_le_bytes());
    put_i32(&mut out, -8);
    put_i32(&mut out, 864);
    put_i32(&mut out, 522);
    put_i32(&mut out, 1009);
    put_i32(&mut out, 0);
    put_i32(&mut out, 0);
    let total_size_at = out.len();
    put_i32(&mut out, 0);
    put_fstring(&mut out, package_name);
    put_i32(&mut out, 0);
    put_i32(&mut out, names.len() as i32);
    let name_offset_at = out.len();
    put_i32(&mut out, 0);
    out.extend_from_slice(&[0; 16]);
    put_i32(&mut out, 0);
    put_i32(&mut out, 0);
    put_i32(&mut out, references.len() as i32);
    let import_offset_at = out.len();
    put_i32(&mut out, 0);

    let name_offset = out.len();
    for name in &names {
        put_fstring(&mut out, name);
        put_i32(&mut out, 0);
    }

    let import_offset = out.len();
    for i in 0..references.len() {
        // class package, class name, outer, object name
        put_i32(&mut out, 0);
        put_i32(&mut out, 0);
        put_i32(&mut out, 1);
        put_i32(&mut out, 0);
        put_i32(&mut out, 0);
        put_i32(&mut out, (i + 2) as i32);
        put_i32(&mut out, 0);
    }

    let total = out.len();
    patch(&mut out, total_size_at, total);
    patch(&mut out, name_offset_at, name_offset);
    patch(&mut out, import_offset_at, import_offset);
    out.extend_from_slice(payload);
    out
}
