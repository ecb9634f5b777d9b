use anyhow::Result;
use loasm::assemble_with_symbols;
use std::io::Read;
use std::{env, fs, fs::File};

fn main() -> Result<()> {
    let input: String = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::Error::msg("Need an input filename"))?;
    let output: String = env::args()
        .nth(2)
        .ok_or_else(|| anyhow::Error::msg("Need an output filename"))?;

    let mut file = File::open(input)?;
    let mut source = String::new();
    file.read_to_string(&mut source)?;

    let (assembly, symbols) = assemble_with_symbols(&source);

    for diagnostic in &assembly.diagnostics {
        eprintln!("{}", diagnostic);
    }

    fs::write(&output, &assembly.bytes)?;
    fs::write(format!("{}.sym", output), symbols.to_string()?)?;

    Ok(())
}
