//! Assembly listing text parsing
//!
//! [`instruction`] tokenizes single instruction lines; [`grammar`] groups
//! them into sections under the two declaration grammars the disassembler
//! emits (`.sdecl` for unlinked objects, `.sect` for linked images and
//! libraries).

pub mod grammar;
pub mod instruction;

pub use grammar::{
    find_addr_nest, grammar_for, AsmGrammar, AsmSection, ObjectGrammar, ParsedAsm, SectGrammar,
};
pub use instruction::{is_flow_mnemonic, parse_instruction_line, Instruction};
