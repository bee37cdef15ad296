//! Listing assembly: the end-to-end correlation pipeline
//!
//! [`process_assembly`] takes the external disassembly envelope, parses the
//! listing text with the grammar the filters select, reads the object's
//! debug-line and relocation info, and interleaves annotated instruction
//! rows under their section headers.

pub mod correlator;
pub mod render;

use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::asm::grammar::{grammar_for, AsmSection};
use crate::domain::{DisasmEnvelope, Listing, ListingError, ListingRow, ParseFilters, COMPILATION_FAILED};
use crate::dwarf::AddressLineIndex;
use crate::elf::ElfObject;
use crate::listing::correlator::{
    apply_relocation, build_line_index, section_matches_source, StickySource,
};
use crate::listing::render::{render_instruction, render_section_header};
use crate::source_files::{source_file_name, source_stem};

/// Correlate a disassembly envelope into the final listing.
///
/// The compilation-failure sentinel short-circuits into a single bare row.
/// Sections not compiled from `source_path` are dropped unless
/// `library_code` retains them.
///
/// # Errors
/// Fails when the object bytes are too truncated to carry a section header
/// table. Undecodable debug-line units degrade to missing annotations, not
/// errors.
pub fn process_assembly(
    envelope: &DisasmEnvelope,
    source_path: &Path,
    filters: &ParseFilters,
) -> Result<Listing, ListingError> {
    if envelope.asm.trim() == COMPILATION_FAILED {
        return Ok(Listing {
            rows: vec![ListingRow::bare(COMPILATION_FAILED)],
            parsing_time_ms: 0,
            filtered_count: 0,
        });
    }

    let started = Instant::now();
    let parsed = grammar_for(filters).parse(&envelope.asm);
    let elf = ElfObject::parse(&envelope.elf)?;
    debug!(
        "parsed {} asm sections, {} debug-line units",
        parsed.sections.len(),
        elf.debug_line_units.len()
    );

    let stem = source_stem(source_path);
    let main_file = source_file_name(source_path);

    // Linked images share one absolute-address index; unlinked objects get
    // a per-section index below, rebased by that section's anchor.
    let shared_index = if filters.binary_object {
        None
    } else {
        Some(build_line_index(&elf.debug_line_units, None))
    };

    let mut rows = Vec::new();
    for section in &parsed.sections {
        if !filters.library_code && !section_matches_source(&section.name, &stem) {
            continue;
        }
        let per_section;
        let index = match &shared_index {
            Some(index) => index,
            None => {
                per_section = build_line_index(&elf.debug_line_units, Some(&section.name));
                &per_section
            }
        };
        let relocations = elf.text_relocations.get(&section.name).map_or(&[][..], Vec::as_slice);
        emit_section(section, index, relocations, &main_file, filters, &mut rows);
    }

    let filtered_count = parsed.total_lines.saturating_sub(rows.len());
    let parsing_time_ms = started.elapsed().as_millis();
    info!("emitted {} rows ({filtered_count} lines filtered)", rows.len());
    Ok(Listing { rows, parsing_time_ms, filtered_count })
}

fn emit_section(
    section: &AsmSection,
    index: &AddressLineIndex,
    relocations: &[crate::elf::Relocation],
    main_file: &str,
    filters: &ParseFilters,
    rows: &mut Vec<ListingRow>,
) {
    rows.push(render_section_header(&section.name));
    let mut sticky = StickySource::new();
    for instruction in &section.instructions {
        let mut instruction = instruction.clone();
        apply_relocation(&mut instruction, relocations);
        let source = sticky.annotate(instruction.address, index, main_file);
        rows.push(render_instruction(&instruction, source, filters));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_passes_through_untouched() {
        let envelope = DisasmEnvelope {
            elf: Vec::new(),
            asm: "<Compilation failed>\n".to_string(),
        };
        let listing =
            process_assembly(&envelope, Path::new("demo.c"), &ParseFilters::default()).unwrap();
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].text, COMPILATION_FAILED);
        assert_eq!(listing.parsing_time_ms, 0);
        assert_eq!(listing.filtered_count, 0);
    }

    #[test]
    fn test_truncated_object_is_fatal() {
        let envelope = DisasmEnvelope { elf: vec![0x7f, b'E', b'L', b'F'], asm: String::new() };
        let err =
            process_assembly(&envelope, Path::new("demo.c"), &ParseFilters::default()).unwrap_err();
        assert!(matches!(err, ListingError::MalformedBinary(_)));
    }
}
