//! DWARF line-number program interpreter
//!
//! Decodes one `.debug_line` section: the fixed header, the include
//! directory and file tables, then the opcode stream, producing ordered
//! rows of (address range, file, line, column). The machine registers are a
//! single local record threaded through the dispatch loop; the only reset
//! point is the `end_sequence` extended opcode.
//!
//! Special opcodes (`opcode >= opcode_base`) update the registers without
//! emitting a row, matching the embedded toolchain's reference decoder.
//! The DWARF standard treats them as implicit copies; see the tests for
//! both expectations.

use log::{debug, warn};

use crate::domain::ListingError;
use crate::elf::Cursor;

// Standard opcodes.
const DW_LNS_COPY: u8 = 1;
const DW_LNS_ADVANCE_PC: u8 = 2;
const DW_LNS_ADVANCE_LINE: u8 = 3;
const DW_LNS_SET_FILE: u8 = 4;
const DW_LNS_SET_COLUMN: u8 = 5;
const DW_LNS_NEGATE_STMT: u8 = 6;
const DW_LNS_SET_BASIC_BLOCK: u8 = 7;
const DW_LNS_CONST_ADD_PC: u8 = 8;
const DW_LNS_FIXED_ADVANCE_PC: u8 = 9;
const DW_LNS_SET_PROLOGUE_END: u8 = 10;
const DW_LNS_SET_EPILOGUE_BEGIN: u8 = 11;
const DW_LNS_SET_ISA: u8 = 12;

// Extended opcodes.
const DW_LNE_END_SEQUENCE: u8 = 1;
const DW_LNE_SET_ADDRESS: u8 = 2;
const DW_LNE_SET_DISCRIMINATOR: u8 = 4;

/// Fixed header of a line-number program unit.
#[derive(Debug, Clone)]
pub struct LineProgramHeader {
    pub unit_length: u32,
    pub version: u16,
    pub header_length: u32,
    pub minimum_instruction_length: u8,
    pub default_is_stmt: u8,
    pub line_base: i8,
    pub line_range: u8,
    pub opcode_base: u8,
    pub standard_opcode_lengths: Vec<u8>,
    pub include_directories: Vec<String>,
    pub file_names: Vec<FileEntry>,
}

/// One file-table entry: name plus the attributes the format carries.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub directory_index: u64,
    pub modified_time: u64,
    pub length: u64,
}

/// One decoded row. `address_end` is the start address of the next emitted
/// row (0 for the final row of the stream): line programs describe address
/// ranges, not single points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRow {
    pub address_start: u32,
    pub address_end: u32,
    pub file: String,
    pub line: i32,
    pub column: u32,
}

/// A fully decoded `.debug_line` unit.
#[derive(Debug, Clone)]
pub struct LineProgram {
    pub header: LineProgramHeader,
    pub rows: Vec<LineRow>,
}

/// Machine registers. Reset to `{address: 0, line: 1}` only by
/// `end_sequence`; ordinary opcodes never reset.
#[derive(Debug, Clone)]
struct Registers {
    address: u32,
    file: u64,
    line: i32,
    column: u32,
    is_stmt: bool,
}

impl Registers {
    fn initial(default_is_stmt: u8) -> Self {
        Self { address: 0, file: 1, line: 1, column: 0, is_stmt: default_is_stmt != 0 }
    }
}

/// Decode one `.debug_line` section's bytes.
///
/// # Errors
/// Returns `MalformedBinary` when the header or an opcode's operand runs
/// past the end of the section.
pub fn decode(content: &[u8]) -> Result<LineProgram, ListingError> {
    let mut cursor = Cursor::new(content);
    let header = parse_header(&mut cursor)?;
    let mut regs = Registers::initial(header.default_is_stmt);
    let mut rows = Vec::new();

    while !cursor.is_end() {
        let opcode = cursor.read_u8()?;
        if opcode == 0 {
            exec_extended(&mut cursor, &header, &mut regs, &mut rows)?;
        } else if opcode < header.opcode_base {
            exec_standard(&mut cursor, &header, &mut regs, &mut rows, opcode)?;
        } else {
            exec_special(&header, &mut regs, opcode);
        }
    }

    // Back-fill range ends: each row extends to the next row's start.
    for i in 1..rows.len() {
        let next_start = rows[i].address_start;
        rows[i - 1].address_end = next_start;
    }
    debug!("decoded {} line rows from {}-byte unit", rows.len(), content.len());
    Ok(LineProgram { header, rows })
}

fn parse_header(cursor: &mut Cursor<'_>) -> Result<LineProgramHeader, ListingError> {
    let unit_length = cursor.read_u32_le()?;
    let version = cursor.read_u16_le()?;
    let header_length = cursor.read_u32_le()?;
    let minimum_instruction_length = cursor.read_u8()?;
    let default_is_stmt = cursor.read_u8()?;
    let line_base = cursor.read_i8()?;
    let line_range = cursor.read_u8()?;
    let opcode_base = cursor.read_u8()?;

    let mut standard_opcode_lengths = Vec::new();
    for _ in 1..opcode_base {
        standard_opcode_lengths.push(cursor.read_u8()?);
    }

    let mut include_directories = Vec::new();
    loop {
        let dir = cursor.read_cstr();
        if dir.is_empty() {
            break;
        }
        include_directories.push(dir);
    }

    let mut file_names = Vec::new();
    loop {
        let name = cursor.read_cstr();
        if name.is_empty() {
            break;
        }
        let directory_index = cursor.read_uleb128()?;
        let modified_time = cursor.read_uleb128()?;
        let length = cursor.read_uleb128()?;
        file_names.push(FileEntry { name, directory_index, modified_time, length });
    }

    Ok(LineProgramHeader {
        unit_length,
        version,
        header_length,
        minimum_instruction_length,
        default_is_stmt,
        line_base,
        line_range,
        opcode_base,
        standard_opcode_lengths,
        include_directories,
        file_names,
    })
}

fn emit(rows: &mut Vec<LineRow>, regs: &Registers, header: &LineProgramHeader) {
    let file = match regs.file.checked_sub(1).map(|i| header.file_names.get(i as usize)) {
        Some(Some(entry)) => entry.name.clone(),
        _ => {
            warn!("line row references file index {} outside the file table", regs.file);
            String::new()
        }
    };
    rows.push(LineRow {
        address_start: regs.address,
        address_end: 0,
        file,
        line: regs.line,
        column: regs.column,
    });
}

fn exec_extended(
    cursor: &mut Cursor<'_>,
    header: &LineProgramHeader,
    regs: &mut Registers,
    rows: &mut Vec<LineRow>,
) -> Result<(), ListingError> {
    let length = cursor.read_uleb128()? as usize;
    let sub_opcode = cursor.read_u8()?;
    match sub_opcode {
        DW_LNE_END_SEQUENCE => {
            // The sequence's final row marks where its address range ends,
            // then the registers reset. This is the only reset point.
            emit(rows, regs, header);
            regs.address = 0;
            regs.line = 1;
        }
        DW_LNE_SET_ADDRESS => {
            regs.address = cursor.read_u32_le()?;
        }
        DW_LNE_SET_DISCRIMINATOR => {
            let _discriminator = cursor.read_uleb128()?;
        }
        _ => {
            cursor.skip(length.saturating_sub(1), "extended opcode operand")?;
        }
    }
    Ok(())
}

fn exec_standard(
    cursor: &mut Cursor<'_>,
    header: &LineProgramHeader,
    regs: &mut Registers,
    rows: &mut Vec<LineRow>,
    opcode: u8,
) -> Result<(), ListingError> {
    let min_inst = u32::from(header.minimum_instruction_length);
    match opcode {
        DW_LNS_COPY => emit(rows, regs, header),
        DW_LNS_ADVANCE_PC => {
            let operand = cursor.read_uleb128()? as u32;
            regs.address = regs.address.wrapping_add(operand.wrapping_mul(min_inst));
        }
        DW_LNS_ADVANCE_LINE => {
            let operand = cursor.read_sleb128()?;
            regs.line = regs.line.wrapping_add(operand as i32);
        }
        DW_LNS_SET_FILE => {
            regs.file = cursor.read_uleb128()?;
        }
        DW_LNS_SET_COLUMN => {
            regs.column = cursor.read_uleb128()? as u32;
        }
        DW_LNS_NEGATE_STMT => {
            regs.is_stmt = !regs.is_stmt;
        }
        DW_LNS_SET_BASIC_BLOCK => {}
        DW_LNS_CONST_ADD_PC => {
            regs.address = regs.address.wrapping_add(const_pc_delta(header));
        }
        DW_LNS_FIXED_ADVANCE_PC => {
            // Two raw little-endian bytes, not LEB128, and not scaled.
            let operand = cursor.read_u16_le()?;
            regs.address = regs.address.wrapping_add(u32::from(operand));
        }
        DW_LNS_SET_PROLOGUE_END | DW_LNS_SET_EPILOGUE_BEGIN | DW_LNS_SET_ISA => {}
        _ => {
            // Unknown standard opcode: skip its declared operand count.
            let count = header
                .standard_opcode_lengths
                .get(opcode as usize - 1)
                .copied()
                .unwrap_or(0);
            for _ in 0..count {
                let _ = cursor.read_uleb128()?;
            }
        }
    }
    Ok(())
}

/// Register update only; no row is emitted for special opcodes.
fn exec_special(header: &LineProgramHeader, regs: &mut Registers, opcode: u8) {
    let adjusted = u32::from(opcode - header.opcode_base);
    let line_range = u32::from(header.line_range.max(1));
    let min_inst = u32::from(header.minimum_instruction_length);
    let addr_delta = (adjusted / line_range) * min_inst;
    let line_delta = i32::from(header.line_base) + (adjusted % line_range) as i32;
    regs.address = regs.address.wrapping_add(addr_delta);
    regs.line = regs.line.wrapping_add(line_delta);
}

fn const_pc_delta(header: &LineProgramHeader) -> u32 {
    let line_range = u32::from(header.line_range.max(1));
    (u32::from(255 - header.opcode_base) / line_range)
        * u32::from(header.minimum_instruction_length)
}
