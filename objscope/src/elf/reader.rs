//! ELF32 section, symbol and relocation reader
//!
//! Decodes exactly the pieces of a 32-bit ELF object this pipeline needs:
//! the section header table, section names, the symbol-name table, RELA
//! relocation tables, and the ordered pairing of `.debug_line` sections
//! with their `.rela.debug_line` companions. All multi-byte fields are
//! little-endian at fixed byte offsets; the contract is bit-exact.
//!
//! A truncated file header or section header table is fatal. A missing
//! string or symbol table is not: names degrade to their raw string-table
//! offsets and symbol resolution degrades to no-ops, since not every
//! binary under analysis carries full symbol info.

use log::{debug, warn};
use std::collections::BTreeMap;

use crate::domain::ListingError;
use crate::elf::cursor::Cursor;

/// Byte size of the portion of the ELF32 file header we consume.
const FILE_HEADER_LEN: usize = 52;
/// Fixed stride of a symbol table entry.
const SYMBOL_ENTRY_LEN: usize = 16;
/// Fixed stride of a RELA relocation entry.
const RELA_ENTRY_LEN: usize = 12;

/// One section: header fields plus its (clamped) raw content.
/// Immutable once the reader finishes.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub kind: u32,
    pub flags: u32,
    pub addr: u32,
    pub offset: u32,
    pub size: u32,
    pub link: u32,
    pub info: u32,
    pub addralign: u32,
    pub entsize: u32,
    pub content: Vec<u8>,
}

/// A decoded RELA entry. `symbol` is `None` when the entry references a
/// symbol index outside the symbol table; downstream rewriting treats that
/// as a no-op.
#[derive(Debug, Clone)]
pub struct Relocation {
    pub offset: u32,
    pub symbol: Option<String>,
    pub addend: i32,
}

/// Links a `.debug_line` section to the text section it annotates: the
/// single `.rela.debug_line` entry names the owning section symbol, and its
/// addend rebases section-relative line-program addresses.
#[derive(Debug, Clone)]
pub struct DebugLineAnchor {
    pub section: String,
    pub addend: i32,
}

/// One `.debug_line` section's content plus its anchor, when present.
#[derive(Debug, Clone)]
pub struct DebugLineUnit {
    pub content: Vec<u8>,
    pub anchor: Option<DebugLineAnchor>,
}

/// Parsed view of an ELF32 object: everything downstream stages consume.
#[derive(Debug)]
pub struct ElfObject {
    pub sections: Vec<Section>,
    /// Symbol names in table order; relocations reference entries by index.
    pub symbols: Vec<String>,
    /// `.debug_line` units in file order, paired with their
    /// `.rela.debug_line` companions by position.
    pub debug_line_units: Vec<DebugLineUnit>,
    /// Relocation tables for text sections, keyed by the name of the
    /// section they relocate (`.rela.text.foo` is keyed as `.text.foo`).
    pub text_relocations: BTreeMap<String, Vec<Relocation>>,
}

impl ElfObject {
    /// Parse raw object bytes.
    ///
    /// # Errors
    /// Returns `MalformedBinary` when the buffer is shorter than the
    /// declared file header or section header table extents.
    pub fn parse(bytes: &[u8]) -> Result<Self, ListingError> {
        if bytes.len() < FILE_HEADER_LEN {
            return Err(ListingError::truncated("ELF file header", FILE_HEADER_LEN, bytes.len()));
        }

        let mut header = Cursor::new(bytes);
        header.seek(32);
        let shoff = header.read_u32_le()? as usize;
        header.seek(46);
        let shentsize = header.read_u16_le()? as usize;
        let shnum = header.read_u16_le()? as usize;
        let shstrndx = header.read_u16_le()? as usize;

        let table_end = shoff
            .checked_add(shnum.saturating_mul(shentsize))
            .ok_or_else(|| ListingError::MalformedBinary("section header table overflow".into()))?;
        if table_end > bytes.len() {
            return Err(ListingError::truncated("section header table", table_end, bytes.len()));
        }

        let mut sections = Vec::with_capacity(shnum);
        for i in 0..shnum {
            sections.push(parse_section_header(bytes, shoff + i * shentsize)?);
        }
        resolve_section_names(&mut sections, shstrndx);
        debug!("parsed {} sections", sections.len());

        let symbols = parse_symbol_table(&sections);
        let debug_line_units = pair_debug_line_sections(&sections, &symbols);
        let text_relocations = collect_text_relocations(&sections, &symbols);

        Ok(Self { sections, symbols, debug_line_units, text_relocations })
    }

    /// Section lookup by exact name; first match wins, as in the formats
    /// this reader targets there is at most one of each special section.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn parse_section_header(bytes: &[u8], entry_offset: usize) -> Result<Section, ListingError> {
    let mut cursor = Cursor::new(bytes);
    cursor.seek(entry_offset);
    let name_off = cursor.read_u32_le()?;
    let kind = cursor.read_u32_le()?;
    let flags = cursor.read_u32_le()?;
    let addr = cursor.read_u32_le()?;
    let offset = cursor.read_u32_le()?;
    let size = cursor.read_u32_le()?;
    let link = cursor.read_u32_le()?;
    let info = cursor.read_u32_le()?;
    let addralign = cursor.read_u32_le()?;
    let entsize = cursor.read_u32_le()?;

    // Content slices are clamped rather than fatal: only the header and
    // section table extents are load-bearing for the parse itself.
    let start = (offset as usize).min(bytes.len());
    let end = (offset as usize).saturating_add(size as usize).min(bytes.len());
    let content = bytes[start..end].to_vec();

    Ok(Section {
        // Temporarily the raw offset; resolved against shstrtab below.
        name: name_off.to_string(),
        kind,
        flags,
        addr,
        offset,
        size,
        link,
        info,
        addralign,
        entsize,
        content,
    })
}

fn resolve_section_names(sections: &mut [Section], shstrndx: usize) {
    if shstrndx >= sections.len() {
        warn!("section name string table index {shstrndx} out of range; keeping raw offsets");
        return;
    }
    let shstrtab = sections[shstrndx].content.clone();
    for section in sections.iter_mut() {
        let Ok(name_off) = section.name.parse::<usize>() else {
            continue;
        };
        if name_off < shstrtab.len() {
            let mut cursor = Cursor::new(&shstrtab);
            cursor.seek(name_off);
            section.name = cursor.read_cstr();
        }
    }
}

/// Build the symbol-name table: fixed 16-byte entries whose first 4 bytes
/// are a `.strtab` offset. Missing `.symtab` or `.strtab` degrades to an
/// empty table / offset-string names.
fn parse_symbol_table(sections: &[Section]) -> Vec<String> {
    let Some(symtab) = sections.iter().find(|s| s.name == ".symtab") else {
        debug!("no .symtab section; symbol resolution disabled");
        return Vec::new();
    };
    let strtab = sections.iter().find(|s| s.name == ".strtab");
    if strtab.is_none() {
        warn!("no .strtab section; symbol names fall back to raw offsets");
    }

    let mut symbols = Vec::new();
    let mut cursor = Cursor::new(&symtab.content);
    while cursor.remaining() >= SYMBOL_ENTRY_LEN {
        let entry_start = cursor.position();
        let Ok(name_off) = cursor.read_u32_le() else { break };
        let name = match strtab {
            Some(tab) if (name_off as usize) < tab.content.len() => {
                let mut names = Cursor::new(&tab.content);
                names.seek(name_off as usize);
                names.read_cstr()
            }
            _ => name_off.to_string(),
        };
        symbols.push(name);
        cursor.seek(entry_start + SYMBOL_ENTRY_LEN);
    }
    debug!("parsed {} symbols", symbols.len());
    symbols
}

/// Decode a RELA table: 12-byte entries of (offset, info, addend), symbol
/// index in the high 24 bits of info.
fn parse_relocations(content: &[u8], symbols: &[String]) -> Vec<Relocation> {
    let mut relocations = Vec::new();
    let mut cursor = Cursor::new(content);
    while cursor.remaining() >= RELA_ENTRY_LEN {
        let (Ok(offset), Ok(info), Ok(addend)) =
            (cursor.read_u32_le(), cursor.read_u32_le(), cursor.read_i32_le())
        else {
            break;
        };
        let index = (info >> 8) as usize;
        let symbol = symbols.get(index).cloned();
        if symbol.is_none() {
            warn!("relocation at 0x{offset:x} references symbol index {index} out of range");
        }
        relocations.push(Relocation { offset, symbol, addend });
    }
    relocations
}

/// Pair `.debug_line` sections with `.rela.debug_line` sections by their
/// position in file order. Building both ordered lists in one pass and
/// zipping them keeps the file-order dependency explicit instead of
/// tracking a mutable "most recently seen" section.
fn pair_debug_line_sections(sections: &[Section], symbols: &[String]) -> Vec<DebugLineUnit> {
    let debug_lines: Vec<&Section> =
        sections.iter().filter(|s| s.name == ".debug_line").collect();
    let relas: Vec<&Section> =
        sections.iter().filter(|s| s.name == ".rela.debug_line").collect();

    debug_lines
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let anchor = relas.get(i).and_then(|rela| {
                let entries = parse_relocations(&rela.content, symbols);
                let first = entries.first()?;
                let owner = first.symbol.clone()?;
                Some(DebugLineAnchor { section: owner, addend: first.addend })
            });
            DebugLineUnit { content: section.content.clone(), anchor }
        })
        .collect()
}

fn collect_text_relocations(
    sections: &[Section],
    symbols: &[String],
) -> BTreeMap<String, Vec<Relocation>> {
    let mut tables = BTreeMap::new();
    for section in sections {
        if let Some(target) = section.name.strip_prefix(".rela") {
            if target.starts_with(".text") {
                tables.insert(target.to_string(), parse_relocations(&section.content, symbols));
            }
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::testutil::ElfBuilder;

    #[test]
    fn test_truncated_header_is_malformed() {
        let err = ElfObject::parse(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, ListingError::MalformedBinary(_)));
    }

    #[test]
    fn test_truncated_section_table_is_malformed() {
        // A header declaring a section table extending past the buffer.
        let mut bytes = vec![0u8; FILE_HEADER_LEN];
        bytes[32..36].copy_from_slice(&52u32.to_le_bytes()); // shoff
        bytes[46..48].copy_from_slice(&40u16.to_le_bytes()); // shentsize
        bytes[48..50].copy_from_slice(&4u16.to_le_bytes()); // shnum
        let err = ElfObject::parse(&bytes).unwrap_err();
        assert!(matches!(err, ListingError::MalformedBinary(_)));
    }

    #[test]
    fn test_section_names_resolve_through_shstrtab() {
        let bytes = ElfBuilder::new()
            .section(".text.main", 1, 0, b"\x00\x00\x00\x00")
            .build();
        let elf = ElfObject::parse(&bytes).unwrap();
        assert!(elf.section_by_name(".text.main").is_some());
        assert!(elf.section_by_name(".shstrtab").is_some());
    }

    #[test]
    fn test_missing_symtab_degrades_to_empty() {
        let bytes = ElfBuilder::new().section(".text.x", 1, 0, b"").build();
        let elf = ElfObject::parse(&bytes).unwrap();
        assert!(elf.symbols.is_empty());
        assert!(elf.text_relocations.is_empty());
    }

    #[test]
    fn test_symbols_and_text_relocations() {
        let bytes = ElfBuilder::new()
            .section(".text.main", 1, 0, &[0u8; 8])
            .symbols(&["", "main", "helper"])
            .rela(".rela.text.main", &[(4, 2, 0x10)])
            .build();
        let elf = ElfObject::parse(&bytes).unwrap();
        assert_eq!(elf.symbols, vec!["", "main", "helper"]);
        let relas = elf.text_relocations.get(".text.main").unwrap();
        assert_eq!(relas.len(), 1);
        assert_eq!(relas[0].offset, 4);
        assert_eq!(relas[0].symbol.as_deref(), Some("helper"));
        assert_eq!(relas[0].addend, 0x10);
    }

    #[test]
    fn test_out_of_range_symbol_index_is_none() {
        let bytes = ElfBuilder::new()
            .section(".text.main", 1, 0, &[0u8; 8])
            .symbols(&["", "main"])
            .rela(".rela.text.main", &[(0, 40, 0)])
            .build();
        let elf = ElfObject::parse(&bytes).unwrap();
        let relas = elf.text_relocations.get(".text.main").unwrap();
        assert!(relas[0].symbol.is_none());
    }

    #[test]
    fn test_debug_line_pairs_by_index() {
        let bytes = ElfBuilder::new()
            .section(".text.main", 1, 0, &[0u8; 8])
            .symbols(&["", ".text.main"])
            .section(".debug_line", 1, 0, b"unit-0")
            .rela(".rela.debug_line", &[(0, 1, 0x20)])
            .build();
        let elf = ElfObject::parse(&bytes).unwrap();
        assert_eq!(elf.debug_line_units.len(), 1);
        let anchor = elf.debug_line_units[0].anchor.as_ref().unwrap();
        assert_eq!(anchor.section, ".text.main");
        assert_eq!(anchor.addend, 0x20);
        assert_eq!(elf.debug_line_units[0].content, b"unit-0");
    }
}
