//! Assembler for the LoChip virtual machine.
//!
//! Source programs are line oriented: `;` starts a comment, `NAME:` alone
//! on a line declares a label, everything else is one instruction per
//! line. The assembled image is a two-byte big-endian reset vector
//! followed by the encoded program, and labels may be referenced before
//! they are declared.

pub use diag::Diagnostic;
pub use lodbg::SymbolDump;

mod diag;
mod encode;
mod labels;
mod mnemonic;
mod normalize;
mod opcode;
mod operand;

/// The outcome of one assembly run. The byte buffer is always returned,
/// even when encoding was stopped by the capacity guard.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub bytes: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
    /// True when encoding stopped because the image outgrew LoChip's
    /// 64 KiB address space.
    pub truncated: bool,
}

impl Assembly {
    /// The reset vector: the offset of the first encoded instruction, or
    /// zero for a program without any.
    pub fn entry(&self) -> u16 {
        u16::from_be_bytes([self.bytes[0], self.bytes[1]])
    }
}

/// Assemble a LoChip program from source text.
pub fn assemble_program(source: &str) -> Assembly {
    let lines: Vec<&str> = source.lines().collect();
    assemble_lines(&lines)
}

/// Assemble a program handed over as individual source lines.
pub fn assemble_lines<S: AsRef<str>>(lines: &[S]) -> Assembly {
    let encoded = run(lines);

    Assembly {
        bytes: encoded.bytes,
        diagnostics: encoded.diagnostics,
        truncated: encoded.truncated,
    }
}

/// Assemble and also produce the debug-symbol dump consumed by emulator
/// tooling.
pub fn assemble_with_symbols(source: &str) -> (Assembly, SymbolDump) {
    let lines: Vec<&str> = source.lines().collect();
    let encoded = run(&lines);

    let assembly = Assembly {
        bytes: encoded.bytes,
        diagnostics: encoded.diagnostics,
        truncated: encoded.truncated,
    };

    let mut symbols = SymbolDump::new(assembly.entry());
    for (name, label) in encoded.labels.iter() {
        if let Some(dest) = label.dest {
            symbols.add_label(name.clone(), dest, label.line);
        }
    }
    for line in &encoded.lines {
        symbols.add_line(line.offset, line.text.clone(), line.line_number);
    }

    (assembly, symbols)
}

fn run<S: AsRef<str>>(lines: &[S]) -> encode::Encoded {
    let cleaned = normalize::normalize_lines(lines);
    let labels = labels::collect(&cleaned);
    encode::encode(&cleaned, labels)
}
