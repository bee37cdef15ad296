//! Section grammars for the disassembler's two listing shapes
//!
//! Unlinked object listings declare sections with load addresses
//! (`.sdecl '.text.NAME', CODE AT 0xADDR`); the addresses let raw branch
//! immediates resolve to `<NAME+offset>` labels by nearest-enclosing-section
//! search. Linked and library listings declare sections by name only
//! (`.sect '.text.NAME'`) and need no address cross-linking.
//!
//! The grammar is a capability seam: one strategy per listing shape,
//! selected by the `binary_object` filter.

use std::collections::HashMap;

use crate::asm::instruction::{is_flow_mnemonic, parse_instruction_line, Instruction};
use crate::domain::ParseFilters;

/// One declared text section with its parsed instruction lines.
#[derive(Debug, Clone)]
pub struct AsmSection {
    pub name: String,
    /// Load address from the `.sdecl` declaration; `None` in the
    /// name-keyed grammar.
    pub load_address: Option<u32>,
    pub instructions: Vec<Instruction>,
}

/// Parser output: sections in declaration order plus the raw line count
/// (the correlator reports how many input lines were filtered away).
#[derive(Debug, Default)]
pub struct ParsedAsm {
    pub sections: Vec<AsmSection>,
    pub total_lines: usize,
}

/// One strategy per listing grammar.
pub trait AsmGrammar {
    fn parse(&self, asm: &str) -> ParsedAsm;
}

/// Pick the grammar for the given filters.
#[must_use]
pub fn grammar_for(filters: &ParseFilters) -> Box<dyn AsmGrammar> {
    if filters.binary_object {
        Box::new(ObjectGrammar)
    } else {
        Box::new(SectGrammar)
    }
}

/// Unlinked object grammar: `.sdecl` declarations carry load addresses,
/// and raw branch immediates are resolved against them after the parse.
pub struct ObjectGrammar;

impl AsmGrammar for ObjectGrammar {
    fn parse(&self, asm: &str) -> ParsedAsm {
        let mut parsed = parse_sections(asm, parse_sdecl_line);
        resolve_branch_targets(&mut parsed.sections);
        parsed
    }
}

/// Linked/library grammar: `.sect` declarations, name-keyed, no
/// address-based cross-linking.
pub struct SectGrammar;

impl AsmGrammar for SectGrammar {
    fn parse(&self, asm: &str) -> ParsedAsm {
        parse_sections(asm, parse_sect_line)
    }
}

fn parse_sections(
    asm: &str,
    declaration: fn(&str) -> Option<(String, Option<u32>)>,
) -> ParsedAsm {
    let mut sections: Vec<AsmSection> = Vec::new();
    let mut total_lines = 0;
    for line in asm.lines() {
        total_lines += 1;
        if line.trim().is_empty() {
            continue;
        }
        if let Some((name, load_address)) = declaration(line) {
            sections.push(AsmSection { name, load_address, instructions: Vec::new() });
        } else if let Some(instruction) = parse_instruction_line(line) {
            // Instruction lines before any declaration have no home.
            if let Some(section) = sections.last_mut() {
                section.instructions.push(instruction);
            }
        }
    }
    ParsedAsm { sections, total_lines }
}

/// `.sdecl '.text.NAME', CODE AT 0xADDR` — the address clause is optional
/// for data sections, which we still record by name.
fn parse_sdecl_line(line: &str) -> Option<(String, Option<u32>)> {
    let rest = line.trim_start().strip_prefix(".sdecl")?;
    let name = quoted_name(rest)?;
    let load_address = rest
        .split_once(" AT ")
        .and_then(|(_, addr)| addr.split_whitespace().next())
        .and_then(parse_hex_literal);
    Some((name, load_address))
}

/// `.sect '.text.NAME'`
fn parse_sect_line(line: &str) -> Option<(String, Option<u32>)> {
    let rest = line.trim_start().strip_prefix(".sect")?;
    Some((quoted_name(rest)?, None))
}

fn quoted_name(text: &str) -> Option<String> {
    let open = text.find('\'')?;
    let rest = &text[open + 1..];
    let close = rest.find('\'')?;
    Some(rest[..close].to_string())
}

fn parse_hex_literal(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))?;
    u32::from_str_radix(digits.trim_end_matches(|c: char| !c.is_ascii_hexdigit()), 16).ok()
}

/// Greatest recorded address less than or equal to `target`, over a slice
/// sorted by address.
#[must_use]
pub fn find_addr_nest<'a>(sorted: &'a [(u32, String)], target: u32) -> Option<&'a (u32, String)> {
    let idx = sorted.partition_point(|&(addr, _)| addr <= target);
    if idx == 0 {
        None
    } else {
        Some(&sorted[idx - 1])
    }
}

/// Rewrite raw `0xHEX` branch operands to `<NAME>` / `<NAME+0xOFF>` labels
/// using the declared section addresses. Resolved targets are memoized so
/// repeated references to one interior address reuse the same label.
fn resolve_branch_targets(sections: &mut [AsmSection]) {
    let mut starts: Vec<(u32, String)> = sections
        .iter()
        .filter_map(|s| s.load_address.map(|addr| (addr, s.name.clone())))
        .collect();
    starts.sort_unstable_by_key(|&(addr, _)| addr);
    if starts.is_empty() {
        return;
    }

    let mut memo: HashMap<u32, String> = HashMap::new();
    for section in sections.iter_mut() {
        for instruction in &mut section.instructions {
            if !is_flow_mnemonic(&instruction.mnemonic) {
                continue;
            }
            let Some(operand) = instruction.operands.last() else { continue };
            let Some(target) = parse_hex_literal(operand) else { continue };

            let label = memo.entry(target).or_insert_with(|| {
                match find_addr_nest(&starts, target) {
                    Some(&(addr, ref name)) if addr == target => format!("<{name}>"),
                    Some(&(addr, ref name)) => {
                        format!("<{name}+0x{:x}>", target - addr)
                    }
                    None => format!("0x{target:x}"),
                }
            });
            if label.starts_with('<') {
                let last = instruction.operands.len() - 1;
                instruction.operands[last] = label.clone();
                instruction.labels.push(label.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseFilters;

    const OBJECT_LISTING: &str = "\
.sdecl '.text.demo.main', CODE AT 0x0
00000000 6d 00 10 00   call 0x20
00000004 00 90         ret

.sdecl '.text.demo.helper', CODE AT 0x20
00000020 00 90         ret
00000022 3c 01         j 0x24
";

    #[test]
    fn test_sdecl_declaration() {
        assert_eq!(
            parse_sdecl_line(".sdecl '.text.demo.main', CODE AT 0x1000"),
            Some((".text.demo.main".to_string(), Some(0x1000)))
        );
        assert_eq!(
            parse_sdecl_line(".sdecl '.data.demo', DATA"),
            Some((".data.demo".to_string(), None))
        );
        assert!(parse_sdecl_line("00000000 00 90 ret").is_none());
    }

    #[test]
    fn test_sect_declaration() {
        assert_eq!(
            parse_sect_line("  .sect '.text.demo.main'"),
            Some((".text.demo.main".to_string(), None))
        );
        assert!(parse_sect_line(".sdecl '.text.x', CODE AT 0x0").is_none());
    }

    #[test]
    fn test_object_grammar_collects_sections() {
        let parsed = ObjectGrammar.parse(OBJECT_LISTING);
        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].name, ".text.demo.main");
        assert_eq!(parsed.sections[0].load_address, Some(0));
        assert_eq!(parsed.sections[0].instructions.len(), 2);
        assert_eq!(parsed.sections[1].instructions.len(), 2);
        assert_eq!(parsed.total_lines, 8);
    }

    #[test]
    fn test_branch_to_section_start_gets_bare_label() {
        let parsed = ObjectGrammar.parse(OBJECT_LISTING);
        let call = &parsed.sections[0].instructions[0];
        assert_eq!(call.operands, vec!["<.text.demo.helper>"]);
        assert_eq!(call.labels, vec!["<.text.demo.helper>"]);
    }

    #[test]
    fn test_branch_into_section_interior_gets_offset_label() {
        let parsed = ObjectGrammar.parse(OBJECT_LISTING);
        let jump = &parsed.sections[1].instructions[1];
        assert_eq!(jump.operands, vec!["<.text.demo.helper+0x4>"]);
    }

    #[test]
    fn test_non_flow_operands_are_untouched() {
        let listing = "\
.sdecl '.text.demo.main', CODE AT 0x0
00000000 91 00 00 48   movh.a a4,0x0
";
        let parsed = ObjectGrammar.parse(listing);
        assert_eq!(parsed.sections[0].instructions[0].operands, vec!["a4", "0x0"]);
    }

    #[test]
    fn test_find_addr_nest_picks_greatest_at_or_below() {
        let starts = vec![
            (0x0u32, "a".to_string()),
            (0x20, "b".to_string()),
            (0x80, "c".to_string()),
        ];
        assert_eq!(find_addr_nest(&starts, 0x0).unwrap().1, "a");
        assert_eq!(find_addr_nest(&starts, 0x1f).unwrap().1, "a");
        assert_eq!(find_addr_nest(&starts, 0x20).unwrap().1, "b");
        assert_eq!(find_addr_nest(&starts, 0x7f).unwrap().1, "b");
        assert_eq!(find_addr_nest(&starts, 0xffff).unwrap().1, "c");
    }

    #[test]
    fn test_sect_grammar_keeps_names_without_addresses() {
        let listing = "\
.sect '.text.demo.main'
00000000 6d 00 10 00   call 0x20
";
        let parsed = SectGrammar.parse(listing);
        assert_eq!(parsed.sections[0].load_address, None);
        // No cross-linking: the raw immediate survives.
        assert_eq!(parsed.sections[0].instructions[0].operands, vec!["0x20"]);
    }

    #[test]
    fn test_grammar_selection_by_filters() {
        let object = ParseFilters { binary_object: true, ..Default::default() };
        let linked = ParseFilters::default();
        assert_eq!(grammar_for(&object).parse(OBJECT_LISTING).sections.len(), 2);
        // The sect grammar sees no .sect declarations in an object listing.
        assert_eq!(grammar_for(&linked).parse(OBJECT_LISTING).sections.len(), 0);
    }
}
