//! # objscope - Main Entry Point
//!
//! Reads a compiled ELF object and the matching disassembler listing,
//! correlates instructions with DWARF source lines, and prints the
//! annotated listing as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::BufWriter;

use objscope::cli::Args;
use objscope::domain::{DisasmEnvelope, ParseFilters};
use objscope::listing::process_assembly;
use objscope::source_files::resolve_source_candidate;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("no such file") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let elf = fs::read(&args.object)
        .with_context(|| format!("failed to read object: {}", args.object.display()))?;
    let asm = fs::read_to_string(&args.asm)
        .with_context(|| format!("failed to read listing: {}", args.asm.display()))?;

    let source = resolve_source_candidate(&args.source);
    let filters = ParseFilters {
        binary_object: args.binary_object,
        library_code: args.library_code,
        binary: args.binary,
        directives: args.directives,
    };

    if !args.quiet {
        eprintln!("objscope v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("object: {}", args.object.display());
        eprintln!("source: {}", source.display());
    }

    let envelope = DisasmEnvelope { elf, asm };
    let listing = process_assembly(&envelope, &source, &filters)
        .context("failed to correlate listing")?;

    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create output file: {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &listing)
                .context("failed to write listing")?;
            if !args.quiet {
                eprintln!("saved: {}", path.display());
            }
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &listing)
                .context("failed to write listing")?;
            println!();
        }
    }

    Ok(())
}
