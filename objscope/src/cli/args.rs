//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "objscope",
    about = "Correlate embedded disassembly listings with source lines",
    after_help = "\
EXAMPLES:
    objscope demo.o demo.src demo.c                  Unlinked object listing
    objscope --binary-object demo.o demo.src demo.c  Object grammar (.sdecl)
    objscope app.elf app.src demo.c --library-code   Keep library sections"
)]
pub struct Args {
    /// Compiled ELF object or binary
    #[arg(value_name = "OBJECT")]
    pub object: PathBuf,

    /// Disassembler listing text
    #[arg(value_name = "ASM")]
    pub asm: PathBuf,

    /// Analyzed source file (drives section retention and main-source tags)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Retain sections not compiled from SOURCE
    #[arg(long)]
    pub library_code: bool,

    /// Parse the unlinked object grammar (.sdecl declarations)
    #[arg(long)]
    pub binary_object: bool,

    /// With --binary-object, omit the machine-code byte column
    #[arg(long)]
    pub binary: bool,

    /// Render mnemonic and operands only (no address or byte columns)
    #[arg(long)]
    pub directives: bool,

    /// Write the JSON listing to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
