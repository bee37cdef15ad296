//! # objscope - Embedded Disassembly Source Correlator
//!
//! objscope takes the two artifacts an embedded TriCore toolchain produces
//! for a compilation — the ELF object (or linked binary) and the textual
//! disassembly listing — and merges them into one annotated listing: every
//! instruction row tagged with the source file and line it was compiled
//! from, and raw branch targets rewritten to symbolic labels.
//!
//! ## Pipeline
//!
//! ```text
//!   disassembly text ──▶ asm (grammar + instruction parse)
//!                                   │
//!   object bytes ──▶ elf (sections, symbols, relocations)
//!                        │
//!                        ├─▶ dwarf (line program → address index)
//!                        ▼
//!                     listing (correlate, rewrite, render)
//! ```
//!
//! ## Module Structure
//!
//! - [`asm`]: listing-text parsing — the `.sdecl` object grammar and the
//!   `.sect` linked grammar, plus single-instruction tokenizing
//! - [`elf`]: bit-exact ELF32 reader for section headers, symbol names,
//!   RELA tables and the `.debug_line`/`.rela.debug_line` pairing
//! - [`dwarf`]: line-number program interpreter and the address-keyed
//!   line index built from its rows
//! - [`listing`]: the correlator proper — section retention, sticky
//!   source annotation, relocation rewriting, row rendering
//! - [`source_files`]: analyzed-source path helpers
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: shared types (envelope, filters, listing rows) and errors

// Expose modules for testing
pub mod asm;
pub mod cli;
pub mod domain;
pub mod dwarf;
pub mod elf;
pub mod listing;
pub mod source_files;

pub use domain::{DisasmEnvelope, Listing, ListingError, ListingRow, ParseFilters, SourceTag};
pub use listing::process_assembly;
