//! Disassembler instruction-line parsing
//!
//! One line of the embedded disassembler's listing looks like:
//!
//! ```text
//! 00000004 91 00 00 48   movh.a   a4,#0x8000
//! ```
//!
//! Address: exactly 8 lowercase hex digits. Machine code: 1 to 4
//! two-hex-digit byte groups. Any `label:` tokens between the bytes and the
//! mnemonic are skipped. Mnemonic: lowercase letters, optionally dotted.
//! Operands: the comma-separated remainder.

/// One parsed instruction. Created by the text parser and mutated exactly
/// once by the correlator (source annotation, operand rewriting) before
/// being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u32,
    /// Machine-code byte groups as they appeared ("91", "00", ...).
    pub opcodes: Vec<String>,
    pub mnemonic: String,
    pub operands: Vec<String>,
    /// Symbolic labels attached by relocation or address resolution.
    pub labels: Vec<String>,
}

fn is_hex8_lower(token: &str) -> bool {
    token.len() == 8
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn is_hex2(token: &str) -> bool {
    token.len() == 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_mnemonic(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '.')
}

/// Mnemonics whose operand may be rewritten to a symbolic target: calls
/// and jumps (`j`, `jz`, `jne`, ... — the target's flow mnemonics all
/// start with `j`).
#[must_use]
pub fn is_flow_mnemonic(mnemonic: &str) -> bool {
    mnemonic == "call" || mnemonic.starts_with('j')
}

/// Parse one instruction line; `None` when the line is not an instruction
/// (directives, blank lines, headers).
#[must_use]
pub fn parse_instruction_line(line: &str) -> Option<Instruction> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 || !is_hex8_lower(tokens[0]) {
        return None;
    }
    let address = u32::from_str_radix(tokens[0], 16).ok()?;

    let mut rest = &tokens[1..];
    let mut opcodes = Vec::new();
    // Greedy but never at the cost of the mnemonic: at least one token must
    // remain after the byte groups.
    while opcodes.len() < 4 && rest.len() > 1 && is_hex2(rest[0]) {
        opcodes.push(rest[0].to_string());
        rest = &rest[1..];
    }
    if opcodes.is_empty() {
        return None;
    }

    while let Some(first) = rest.first() {
        if first.ends_with(':') {
            rest = &rest[1..];
        } else {
            break;
        }
    }

    let mnemonic = rest.first()?;
    if !is_mnemonic(mnemonic) {
        return None;
    }
    let operands = if rest.len() > 1 {
        rest[1..]
            .join(" ")
            .split(',')
            .map(|op| op.trim().to_string())
            .filter(|op| !op.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    Some(Instruction {
        address,
        opcodes,
        mnemonic: (*mnemonic).to_string(),
        operands,
        labels: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_line() {
        let instr =
            parse_instruction_line("00000004 91 00 00 48   movh.a   a4,#0x8000").unwrap();
        assert_eq!(instr.address, 4);
        assert_eq!(instr.opcodes, vec!["91", "00", "00", "48"]);
        assert_eq!(instr.mnemonic, "movh.a");
        assert_eq!(instr.operands, vec!["a4", "#0x8000"]);
    }

    #[test]
    fn test_parses_short_opcode_and_no_operands() {
        let instr = parse_instruction_line("0000000c 00 90   ret").unwrap();
        assert_eq!(instr.opcodes, vec!["00", "90"]);
        assert_eq!(instr.mnemonic, "ret");
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn test_skips_label_tokens() {
        let instr = parse_instruction_line("00000000 6d 00 main: call 0x20").unwrap();
        assert_eq!(instr.mnemonic, "call");
        assert_eq!(instr.operands, vec!["0x20"]);
    }

    #[test]
    fn test_rejects_uppercase_or_short_address() {
        assert!(parse_instruction_line("0000000C 00 90 ret").is_none());
        assert!(parse_instruction_line("000c 00 90 ret").is_none());
    }

    #[test]
    fn test_rejects_directive_lines() {
        assert!(parse_instruction_line(".sdecl '.text.demo.main', CODE AT 0x0").is_none());
        assert!(parse_instruction_line("").is_none());
    }

    #[test]
    fn test_flow_mnemonics() {
        assert!(is_flow_mnemonic("call"));
        assert!(is_flow_mnemonic("j"));
        assert!(is_flow_mnemonic("jne"));
        assert!(!is_flow_mnemonic("mov"));
        assert!(!is_flow_mnemonic("ret"));
    }
}
