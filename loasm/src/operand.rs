use crate::labels::Labels;

/// One comma-separated operand, classified by shape. Classification
/// happens once per token; the encoder's shape tables then match
/// structurally instead of re-inspecting text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `$` followed by 1-4 hex digits.
    Imm(u16),
    /// General-purpose register `Rx`.
    RegX,
    /// General-purpose register `Ry`.
    RegY,
    /// The `RxRy` register pair.
    RegPair,
    /// The index register `I`.
    Index,
    /// Delay timer `DT`.
    DelayTimer,
    /// Sound timer `ST`.
    SoundTimer,
    /// Key wait `K`.
    Key,
    /// BCD conversion target `B`.
    Bcd,
    /// The literal shift count `1`.
    One,
    /// A bare name found in the symbol table.
    LabelRef(String),
    /// Anything else. Matches no shape, so the line is diagnosed.
    Unknown(String),
}

pub fn classify(token: &str, labels: &Labels) -> Operand {
    match token {
        "Rx" => Operand::RegX,
        "Ry" => Operand::RegY,
        "RxRy" => Operand::RegPair,
        "I" => Operand::Index,
        "DT" => Operand::DelayTimer,
        "ST" => Operand::SoundTimer,
        "K" => Operand::Key,
        "B" => Operand::Bcd,
        "1" => Operand::One,
        _ => {
            if let Some(value) = parse_hex(token) {
                Operand::Imm(value)
            } else if labels.contains(token) {
                Operand::LabelRef(token.to_owned())
            } else {
                Operand::Unknown(token.to_owned())
            }
        }
    }
}

/// Parse a `$`-prefixed literal of 1-4 hex digits.
pub fn parse_hex(token: &str) -> Option<u16> {
    let digits = token.strip_prefix('$')?;

    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u16::from_str_radix(digits, 16).ok()
}

/// Everything after the line's first space, split on commas and trimmed.
/// Trailing empty operands are dropped; interior ones are kept so the
/// shape tables can reject them.
pub fn split_operands(line: &str) -> Vec<&str> {
    let Some((_, rest)) = line.split_once(' ') else {
        return Vec::new();
    };

    let mut operands: Vec<&str> = rest.split(',').map(str::trim).collect();
    while operands.last() == Some(&"") {
        operands.pop();
    }

    operands
}
