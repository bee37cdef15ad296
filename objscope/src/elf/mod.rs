//! ELF32 decoding layer
//!
//! Two pieces: the positioned byte [`cursor`] every binary reader shares,
//! and the [`reader`] that turns raw object bytes into sections, symbol
//! names, relocation tables and debug-line pairings. Everything here is a
//! pure function of the input buffer; parsed objects are immutable.

pub mod cursor;
pub mod reader;
pub mod testutil;

pub use cursor::Cursor;
pub use reader::{DebugLineAnchor, DebugLineUnit, ElfObject, Relocation, Section};
