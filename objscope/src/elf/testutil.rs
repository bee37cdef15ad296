//! In-memory ELF32 object builder used by the test suite
//!
//! Produces just enough of a little-endian 32-bit ELF (file header fields
//! the reader consumes, a section header table, `.shstrtab`, optional
//! `.symtab`/`.strtab` and RELA tables) to exercise the reader and the
//! end-to-end correlation pipeline without fixture files on disk.

#![doc(hidden)]

const SH_ENTRY_LEN: usize = 40;
const FILE_HEADER_LEN: usize = 52;

struct SectionSpec {
    name: String,
    kind: u32,
    addr: u32,
    content: Vec<u8>,
}

#[derive(Default)]
pub struct ElfBuilder {
    sections: Vec<SectionSpec>,
}

impl ElfBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section with raw content.
    #[must_use]
    pub fn section(mut self, name: &str, kind: u32, addr: u32, content: &[u8]) -> Self {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            kind,
            addr,
            content: content.to_vec(),
        });
        self
    }

    /// Append `.strtab` and `.symtab` holding the given symbol names in
    /// table order (16-byte entries, name offset in the first 4 bytes).
    #[must_use]
    pub fn symbols(self, names: &[&str]) -> Self {
        let mut strtab = Vec::new();
        let mut offsets = Vec::with_capacity(names.len());
        for name in names {
            offsets.push(strtab.len() as u32);
            strtab.extend_from_slice(name.as_bytes());
            strtab.push(0);
        }
        let mut symtab = Vec::with_capacity(names.len() * 16);
        for offset in offsets {
            symtab.extend_from_slice(&offset.to_le_bytes());
            symtab.extend_from_slice(&[0u8; 12]);
        }
        self.section(".strtab", 3, 0, &strtab).section(".symtab", 2, 0, &symtab)
    }

    /// Append a RELA section from `(offset, symbol_index, addend)` triples.
    #[must_use]
    pub fn rela(self, name: &str, entries: &[(u32, u32, i32)]) -> Self {
        let mut content = Vec::with_capacity(entries.len() * 12);
        for &(offset, symbol_index, addend) in entries {
            content.extend_from_slice(&offset.to_le_bytes());
            content.extend_from_slice(&(symbol_index << 8).to_le_bytes());
            content.extend_from_slice(&addend.to_le_bytes());
        }
        self.section(name, 4, 0, &content)
    }

    /// Serialize the object: file header, section contents, then the
    /// section header table.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        // Index 0 is the conventional null section; .shstrtab goes last.
        let mut specs = vec![SectionSpec {
            name: String::new(),
            kind: 0,
            addr: 0,
            content: Vec::new(),
        }];
        specs.extend(self.sections);

        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::with_capacity(specs.len() + 1);
        for spec in &specs {
            if spec.name.is_empty() {
                name_offsets.push(0u32);
            } else {
                name_offsets.push(shstrtab.len() as u32);
                shstrtab.extend_from_slice(spec.name.as_bytes());
                shstrtab.push(0);
            }
        }
        name_offsets.push(shstrtab.len() as u32);
        shstrtab.extend_from_slice(b".shstrtab");
        shstrtab.push(0);
        specs.push(SectionSpec { name: ".shstrtab".into(), kind: 3, addr: 0, content: shstrtab });

        let shstrndx = specs.len() - 1;
        let mut offsets = Vec::with_capacity(specs.len());
        let mut pos = FILE_HEADER_LEN;
        for spec in &specs {
            offsets.push(pos as u32);
            pos += spec.content.len();
        }
        let shoff = pos;

        let mut bytes = vec![0u8; FILE_HEADER_LEN];
        bytes[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        bytes[4] = 1; // 32-bit
        bytes[5] = 1; // little-endian
        bytes[32..36].copy_from_slice(&(shoff as u32).to_le_bytes());
        bytes[46..48].copy_from_slice(&(SH_ENTRY_LEN as u16).to_le_bytes());
        bytes[48..50].copy_from_slice(&(specs.len() as u16).to_le_bytes());
        bytes[50..52].copy_from_slice(&(shstrndx as u16).to_le_bytes());

        for spec in &specs {
            bytes.extend_from_slice(&spec.content);
        }
        for (i, spec) in specs.iter().enumerate() {
            bytes.extend_from_slice(&name_offsets[i].to_le_bytes());
            bytes.extend_from_slice(&spec.kind.to_le_bytes());
            bytes.extend_from_slice(&0u32.to_le_bytes()); // flags
            bytes.extend_from_slice(&spec.addr.to_le_bytes());
            bytes.extend_from_slice(&offsets[i].to_le_bytes());
            bytes.extend_from_slice(&(spec.content.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&0u32.to_le_bytes()); // link
            bytes.extend_from_slice(&0u32.to_le_bytes()); // info
            bytes.extend_from_slice(&0u32.to_le_bytes()); // addralign
            bytes.extend_from_slice(&0u32.to_le_bytes()); // entsize
        }
        bytes
    }
}
