//! Correlation of parsed instructions with DWARF line info and relocations
//!
//! Three concerns live here: deciding which sections belong to the analyzed
//! source file, annotating instruction addresses with source lines (line
//! table rows are sparse, so a resolved line stays in effect until the next
//! hit), and rewriting branch operands through the relocation tables so
//! `call 0x0` becomes `call <symbol>`.

use log::warn;

use crate::asm::instruction::{is_flow_mnemonic, Instruction};
use crate::domain::SourceTag;
use crate::dwarf::{decode, AddressLineIndex};
use crate::elf::{DebugLineUnit, Relocation};

/// Does `section` hold code compiled from the source file with stem `stem`?
///
/// The compiler names per-function sections `.text.<stem>.<function>`, and
/// the bare section `.text.<stem>` also occurs. Prefix matching alone would
/// confuse `.text.foo` with `.text.foobar`, so the character after the stem
/// must end the name or be a separator.
#[must_use]
pub fn section_matches_source(section: &str, stem: &str) -> bool {
    let Some(rest) = section.strip_prefix(".text.") else {
        return false;
    };
    let Some(after) = rest.strip_prefix(stem) else {
        return false;
    };
    match after.chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric() && c != '_',
    }
}

/// Build the address→line index for one correlation scope.
///
/// With `anchored_to: Some(name)` (unlinked objects) only units whose
/// relocation anchor names that text section contribute, each rebased by
/// its anchor addend. With `None` (linked images) every unit contributes
/// at its absolute addresses.
#[must_use]
pub fn build_line_index(units: &[DebugLineUnit], anchored_to: Option<&str>) -> AddressLineIndex {
    let mut index = AddressLineIndex::new();
    for unit in units {
        let rebase = match (anchored_to, &unit.anchor) {
            (Some(name), Some(anchor)) if anchor.section == name => anchor.addend,
            (Some(_), _) => continue,
            (None, _) => 0,
        };
        match decode(&unit.content) {
            Ok(program) => index.insert_rows(&program.rows, rebase),
            Err(err) => warn!("skipping undecodable line program: {err}"),
        }
    }
    index
}

/// Sticky source-line state for one section walk.
///
/// The line table only records addresses where the line changes, so an
/// instruction between two recorded addresses inherits the most recent hit.
/// Until the first hit nothing is attached.
#[derive(Debug, Default)]
pub struct StickySource {
    current: Option<SourceTag>,
}

impl StickySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation for the instruction at `addr`. `main_file` is the
    /// file-table name the analyzed source goes by; rows from it carry
    /// `mainsource` and an empty path.
    pub fn annotate(&mut self, addr: u32, index: &AddressLineIndex, main_file: &str) -> Option<SourceTag> {
        if let Some(hit) = index.lookup(addr) {
            let mainsource = hit.file == main_file;
            self.current = Some(SourceTag {
                file: if mainsource { String::new() } else { hit.file.clone() },
                line: hit.line,
                mainsource,
            });
        }
        self.current.clone()
    }
}

/// Symbolic label for a relocation target: `<symbol>`, `<symbol+0xOFF>`,
/// or `<symbol-0xOFF>` for a negative addend. `None` when the relocation
/// could not name its symbol.
#[must_use]
pub fn relocation_label(rel: &Relocation) -> Option<String> {
    let symbol = rel.symbol.as_deref()?;
    Some(match rel.addend {
        0 => format!("<{symbol}>"),
        a if a > 0 => format!("<{symbol}+0x{a:x}>"),
        a => format!("<{symbol}-0x{:x}>", a.unsigned_abs()),
    })
}

/// Rewrite the branch-target operand of `instr` through the section's
/// relocation table. Only calls and jumps carry a rewritable target; the
/// matching entry is the one relocating this instruction's address.
pub fn apply_relocation(instr: &mut Instruction, relocations: &[Relocation]) {
    if !is_flow_mnemonic(&instr.mnemonic) || instr.operands.is_empty() {
        return;
    }
    let Some(rel) = relocations.iter().find(|r| r.offset == instr.address) else {
        return;
    };
    if let Some(label) = relocation_label(rel) {
        let last = instr.operands.len() - 1;
        instr.operands[last] = label.clone();
        instr.labels.push(label);
    }
}
