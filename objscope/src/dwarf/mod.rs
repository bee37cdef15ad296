//! DWARF line-number decoding
//!
//! [`line_program`] runs the opcode state machine over a `.debug_line`
//! section; [`line_index`] turns the decoded rows into the address-keyed
//! lookup the correlator consumes.

pub mod line_index;
pub mod line_program;

pub use line_index::{address_key, AddressLineIndex, LineHit};
pub use line_program::{decode, FileEntry, LineProgram, LineProgramHeader, LineRow};
