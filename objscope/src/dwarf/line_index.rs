//! Address-to-line lookup index built from decoded line rows
//!
//! Keys are zero-padded 8-lowercase-hex address strings, so lexicographic
//! ordering of keys always coincides with numeric ordering of addresses.
//! Each row contributes its start address and the last address of its
//! implied range (the address immediately preceding the next row), so exact
//! lookups resolve at both ends of a range; interior misses are handled by
//! the correlator's sticky-line fallback.

use std::collections::BTreeMap;

use crate::dwarf::line_program::LineRow;

/// Zero-padded 8-hex-digit key for an address.
#[must_use]
pub fn address_key(addr: u32) -> String {
    format!("{addr:08x}")
}

/// What a lookup hit yields: the owning source file and the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHit {
    pub file: String,
    pub line: i32,
}

/// Ordered address→line mapping for one correlation scope (one text
/// section, or one whole linked image).
#[derive(Debug, Default)]
pub struct AddressLineIndex {
    entries: BTreeMap<String, LineHit>,
}

impl AddressLineIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert decoded rows, rebasing each row's addresses by `rebase`
    /// (the `.rela.debug_line` addend for section-relative units; 0 for
    /// already-absolute addresses).
    pub fn insert_rows(&mut self, rows: &[LineRow], rebase: i32) {
        for row in rows {
            let start = row.address_start.wrapping_add(rebase as u32);
            let hit = LineHit { file: row.file.clone(), line: row.line };
            self.entries.insert(address_key(start), hit.clone());
            let end = row.address_end.wrapping_add(rebase as u32);
            if end > start {
                // Last address covered by this row, not the next row's start.
                self.entries.insert(address_key(end - 1), hit);
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, addr: u32) -> Option<&LineHit> {
        self.entries.get(&address_key(addr))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
