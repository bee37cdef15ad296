//! Core data types shared across the pipeline
//!
//! The envelope mirrors what the external disassembly step produces (raw
//! object bytes plus the disassembler's textual stdout), and the listing is
//! what the whole pipeline emits: section-header rows interleaved with
//! annotated instruction rows.

use serde::{Deserialize, Serialize};

/// Sentinel text the external toolchain substitutes for the disassembler
/// output when compilation failed. The pipeline must pass it through as a
/// single bare row without attempting to parse anything.
pub const COMPILATION_FAILED: &str = "<Compilation failed>";

/// Filter flags controlling grammar selection and output shape.
///
/// - `binary_object`: parse the unlinked object-file grammar (`.sdecl`
///   section declarations) instead of the linked `.sect` grammar.
/// - `library_code`: retain sections that do not belong to the analyzed
///   source file.
/// - `binary`: combined with `binary_object`, suppress the machine-code
///   byte column.
/// - `directives`: when set, render only mnemonic and operands (no address
///   or opcode columns).
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseFilters {
    pub binary_object: bool,
    pub library_code: bool,
    pub binary: bool,
    pub directives: bool,
}

/// Input envelope produced by the external disassembly step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasmEnvelope {
    /// Raw bytes of the compiled object/binary.
    pub elf: Vec<u8>,
    /// Textual stdout of the external disassembler.
    pub asm: String,
}

/// Source annotation attached to an instruction row.
///
/// `mainsource` is true when the row originates from the analyzed source
/// file itself; the `file` field is empty in that case and carries the real
/// path otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTag {
    pub file: String,
    pub line: i32,
    pub mainsource: bool,
}

/// One row of the final listing: either a bare section header
/// (`text = "NAME:"`, everything else absent) or an instruction row.
#[derive(Debug, Clone, Serialize)]
pub struct ListingRow {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opcodes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceTag>,
}

impl ListingRow {
    /// A bare row carrying only text (section headers, sentinel output).
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            opcodes: None,
            address: None,
            source: None,
        }
    }
}

/// The complete, ordered listing for one correlation run.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    #[serde(rename = "asm")]
    pub rows: Vec<ListingRow>,
    #[serde(rename = "parsingTime")]
    pub parsing_time_ms: u128,
    #[serde(rename = "filteredCount")]
    pub filtered_count: usize,
}
