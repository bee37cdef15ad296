//! Row text rendering
//!
//! Reassembles an annotated instruction into the listing's display text.
//! Column widths follow the disassembler's own layout: 8-hex address, a
//! 20-character machine-code column, mnemonic padded to 10.

use crate::asm::instruction::Instruction;
use crate::domain::{ListingRow, ParseFilters, SourceTag};

/// Mnemonic plus operands, mnemonic padded to a 10-column field.
fn instruction_body(instr: &Instruction) -> String {
    if instr.operands.is_empty() {
        return instr.mnemonic.clone();
    }
    let pad = 10usize.saturating_sub(instr.mnemonic.len()).max(1);
    format!("{}{}{}", instr.mnemonic, " ".repeat(pad), instr.operands.join(", "))
}

/// Render one instruction into its listing row.
///
/// `directives` drops the address and machine-code columns entirely;
/// `binary` together with `binary_object` keeps the text columns but omits
/// the structured opcode list from the row.
#[must_use]
pub fn render_instruction(
    instr: &Instruction,
    source: Option<SourceTag>,
    filters: &ParseFilters,
) -> ListingRow {
    let body = instruction_body(instr);
    let text = if filters.directives {
        body
    } else {
        format!("{:08x} {:<20}{}", instr.address, instr.opcodes.join(" "), body)
    };
    let opcodes = if filters.binary && filters.binary_object {
        None
    } else {
        Some(instr.opcodes.clone())
    };
    ListingRow { text, opcodes, address: Some(instr.address), source }
}

/// Section header row: the section's display name (the part after the last
/// `/`, for sections named with path-like prefixes) with a trailing colon.
#[must_use]
pub fn render_section_header(name: &str) -> ListingRow {
    let display = name.rsplit('/').next().unwrap_or(name);
    ListingRow::bare(format!("{display}:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(address: u32, opcodes: &[&str], mnemonic: &str, operands: &[&str]) -> Instruction {
        Instruction {
            address,
            opcodes: opcodes.iter().map(|s| (*s).to_string()).collect(),
            mnemonic: mnemonic.to_string(),
            operands: operands.iter().map(|s| (*s).to_string()).collect(),
            labels: Vec::new(),
        }
    }

    #[test]
    fn test_full_row_layout() {
        let row = render_instruction(
            &instr(4, &["91", "00", "00", "48"], "movh.a", &["a4", "#0x8000"]),
            None,
            &ParseFilters::default(),
        );
        assert_eq!(row.text, "00000004 91 00 00 48         movh.a    a4, #0x8000");
        assert_eq!(row.address, Some(4));
        assert_eq!(row.opcodes.as_deref().unwrap(), ["91", "00", "00", "48"]);
    }

    #[test]
    fn test_no_operands_keeps_bare_mnemonic() {
        let row = render_instruction(&instr(12, &["00", "90"], "ret", &[]), None, &ParseFilters::default());
        assert_eq!(row.text, "0000000c 00 90               ret");
    }

    #[test]
    fn test_long_mnemonic_keeps_one_space() {
        let row = render_instruction(
            &instr(0, &["00"], "verylongmnemonic", &["d0"]),
            None,
            &ParseFilters { directives: true, ..Default::default() },
        );
        assert_eq!(row.text, "verylongmnemonic d0");
    }

    #[test]
    fn test_directives_mode_drops_columns() {
        let row = render_instruction(
            &instr(4, &["91", "00"], "mov", &["d4", "d5"]),
            None,
            &ParseFilters { directives: true, ..Default::default() },
        );
        assert_eq!(row.text, "mov       d4, d5");
        // The structured fields stay.
        assert_eq!(row.address, Some(4));
    }

    #[test]
    fn test_binary_object_binary_suppresses_opcode_list() {
        let filters = ParseFilters { binary: true, binary_object: true, ..Default::default() };
        let row = render_instruction(&instr(0, &["00", "90"], "ret", &[]), None, &filters);
        assert!(row.opcodes.is_none());
        // binary alone is not enough
        let filters = ParseFilters { binary: true, ..Default::default() };
        let row = render_instruction(&instr(0, &["00", "90"], "ret", &[]), None, &filters);
        assert!(row.opcodes.is_some());
    }

    #[test]
    fn test_section_header_uses_last_path_component() {
        assert_eq!(render_section_header(".text.demo.main").text, ".text.demo.main:");
        assert_eq!(render_section_header("lib/src/.text.util").text, ".text.util:");
    }
}
