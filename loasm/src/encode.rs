use crate::diag::Diagnostic;
use crate::labels::{self, Labels};
use crate::mnemonic::Mnemonic;
use crate::opcode::Opcode;
use crate::operand::{self, Operand};

/// LoChip's addressable memory. The image may fill it exactly; growing
/// past it stops the run.
const MEMORY_LIMIT: usize = 0x1_0000;

/// One operand slot in an accepted shape.
#[derive(Debug, Clone, Copy)]
enum Pat {
    X,
    Y,
    Pair,
    I,
    Dt,
    St,
    Key,
    Bcd,
    One,
    /// An immediate byte literal.
    Imm,
    /// A 16-bit address field: hex literal or label reference.
    Addr,
}

impl Pat {
    fn matches(self, operand: &Operand) -> bool {
        matches!(
            (self, operand),
            (Pat::X, Operand::RegX)
                | (Pat::Y, Operand::RegY)
                | (Pat::Pair, Operand::RegPair)
                | (Pat::I, Operand::Index)
                | (Pat::Dt, Operand::DelayTimer)
                | (Pat::St, Operand::SoundTimer)
                | (Pat::Key, Operand::Key)
                | (Pat::Bcd, Operand::Bcd)
                | (Pat::One, Operand::One)
                | (Pat::Imm, Operand::Imm(_))
                | (Pat::Addr, Operand::Imm(_) | Operand::LabelRef(_))
        )
    }
}

/// What a matched rule appends after its opcode byte.
#[derive(Debug, Clone, Copy)]
enum Payload {
    Bare,
    /// One byte, the immediate at this operand index.
    Byte(usize),
    /// A big-endian address word from this operand index.
    Word(usize),
}

struct Rule {
    shape: &'static [Pat],
    opcode: Opcode,
    payload: Payload,
}

const fn bare(shape: &'static [Pat], opcode: Opcode) -> Rule {
    Rule {
        shape,
        opcode,
        payload: Payload::Bare,
    }
}

const fn with_byte(shape: &'static [Pat], opcode: Opcode, operand: usize) -> Rule {
    Rule {
        shape,
        opcode,
        payload: Payload::Byte(operand),
    }
}

const fn with_word(shape: &'static [Pat], opcode: Opcode, operand: usize) -> Rule {
    Rule {
        shape,
        opcode,
        payload: Payload::Word(operand),
    }
}

use Pat::{Addr, Bcd, Dt, Imm, Key, One, Pair, St, I, X, Y};

static CLS_RULES: [Rule; 1] = [bare(&[], Opcode::Cls)];
static RET_RULES: [Rule; 1] = [bare(&[], Opcode::Ret)];
static EXIT_RULES: [Rule; 1] = [bare(&[], Opcode::Exit)];
static JP_RULES: [Rule; 2] = [
    with_word(&[X, Addr], Opcode::JpX, 1),
    with_word(&[Addr], Opcode::Jp, 0),
];
static CALL_RULES: [Rule; 1] = [with_word(&[Addr], Opcode::Call, 0)];
static JE_RULES: [Rule; 2] = [
    bare(&[X, Y], Opcode::JeReg),
    with_byte(&[X, Imm], Opcode::JeImm, 1),
];
static JNE_RULES: [Rule; 2] = [
    bare(&[X, Y], Opcode::JneReg),
    with_byte(&[X, Imm], Opcode::JneImm, 1),
];
// The three-operand forms come first, and the register-to-register moves
// before the index fallbacks: several shapes overlap, so order decides.
static LD_RULES: [Rule; 17] = [
    bare(&[I, X, Y], Opcode::LdIdxXY),
    bare(&[X, Y, I], Opcode::LdXYIdx),
    with_byte(&[X, Imm], Opcode::LdXImm, 1),
    with_byte(&[Y, Imm], Opcode::LdYImm, 1),
    bare(&[X, I], Opcode::LdXIdx),
    bare(&[Y, I], Opcode::LdYIdx),
    bare(&[I, X], Opcode::LdIdxX),
    bare(&[I, Y], Opcode::LdIdxY),
    bare(&[X, Y], Opcode::LdXY),
    bare(&[Y, X], Opcode::LdYX),
    with_word(&[I, Addr], Opcode::LdIdxAddr, 1),
    bare(&[I, Pair], Opcode::LdIdxPair),
    bare(&[X, Dt], Opcode::LdXDt),
    bare(&[X, Key], Opcode::LdXKey),
    bare(&[Dt, X], Opcode::LdDtX),
    bare(&[St, X], Opcode::LdStX),
    bare(&[Bcd, X], Opcode::LdBcdX),
];
static ADD_RULES: [Rule; 4] = [
    with_byte(&[X, Imm], Opcode::AddXImm, 1),
    with_byte(&[Y, Imm], Opcode::AddYImm, 1),
    bare(&[X, Y], Opcode::AddXY),
    bare(&[I, X], Opcode::AddIdxX),
];
static OR_RULES: [Rule; 1] = [bare(&[X, Y], Opcode::Or)];
static AND_RULES: [Rule; 1] = [bare(&[X, Y], Opcode::And)];
static XOR_RULES: [Rule; 1] = [bare(&[X, Y], Opcode::Xor)];
static SUB_RULES: [Rule; 1] = [bare(&[X, Y], Opcode::Sub)];
static SUBN_RULES: [Rule; 1] = [bare(&[X, Y], Opcode::Subn)];
static SHR_RULES: [Rule; 1] = [bare(&[X, One], Opcode::Shr)];
static SHL_RULES: [Rule; 1] = [bare(&[X, One], Opcode::Shl)];
static RND_RULES: [Rule; 1] = [with_byte(&[X, Imm], Opcode::Rnd, 1)];
static DRW_RULES: [Rule; 2] = [
    with_byte(&[X, Y, Imm], Opcode::DrwSized, 2),
    bare(&[X, Y], Opcode::Drw),
];
static JKP_RULES: [Rule; 1] = [bare(&[X], Opcode::Jkp)];
static JKNP_RULES: [Rule; 1] = [bare(&[X], Opcode::Jknp)];

/// Accepted shapes per mnemonic, tried top to bottom; the first match
/// wins. `Db` is variadic and handled outside the tables.
fn rules(mnemonic: Mnemonic) -> &'static [Rule] {
    match mnemonic {
        Mnemonic::Db => &[],
        Mnemonic::CLS => &CLS_RULES,
        Mnemonic::RET => &RET_RULES,
        Mnemonic::JP => &JP_RULES,
        Mnemonic::CALL => &CALL_RULES,
        Mnemonic::JE => &JE_RULES,
        Mnemonic::JNE => &JNE_RULES,
        Mnemonic::LD => &LD_RULES,
        Mnemonic::ADD => &ADD_RULES,
        Mnemonic::OR => &OR_RULES,
        Mnemonic::AND => &AND_RULES,
        Mnemonic::XOR => &XOR_RULES,
        Mnemonic::SUB => &SUB_RULES,
        Mnemonic::SHR => &SHR_RULES,
        Mnemonic::SUBN => &SUBN_RULES,
        Mnemonic::SHL => &SHL_RULES,
        Mnemonic::RND => &RND_RULES,
        Mnemonic::DRW => &DRW_RULES,
        Mnemonic::JKP => &JKP_RULES,
        Mnemonic::JKNP => &JKNP_RULES,
        Mnemonic::EXIT => &EXIT_RULES,
    }
}

pub(crate) struct EncodedLine {
    pub line_number: usize,
    pub offset: u16,
    pub text: String,
}

pub(crate) struct Encoded {
    pub bytes: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
    pub truncated: bool,
    pub labels: Labels,
    pub lines: Vec<EncodedLine>,
}

/// Encode normalized lines against a collected symbol table, then patch
/// every recorded call site. The buffer is always returned, truncated or
/// not.
pub(crate) fn encode(lines: &[String], labels: Labels) -> Encoded {
    Encoder::new(labels).run(lines)
}

struct Encoder {
    labels: Labels,
    buf: Vec<u8>,
    diagnostics: Vec<Diagnostic>,
    lines: Vec<EncodedLine>,
    entry_set: bool,
    truncated: bool,
}

impl Encoder {
    fn new(labels: Labels) -> Self {
        Encoder {
            labels,
            // the first two bytes are reserved for the reset vector
            buf: vec![0x00, 0x00],
            diagnostics: Vec::new(),
            lines: Vec::new(),
            entry_set: false,
            truncated: false,
        }
    }

    fn run(mut self, lines: &[String]) -> Encoded {
        for (idx, line) in lines.iter().enumerate() {
            let line_number = idx + 1;
            if line.is_empty() {
                continue;
            }

            let command = line.split(' ').next().unwrap_or(line);
            if let Some(mnemonic) = Mnemonic::parse(command) {
                self.instruction(line_number, line, command, mnemonic);
            } else if let Some(name) = labels::declaration(line) {
                let dest = self.buf.len() as u16;
                self.labels.set_dest(name, dest);
            } else {
                self.diagnostics.push(Diagnostic::UnknownCommand {
                    line: line_number,
                    text: line.clone(),
                });
            }

            if self.buf.len() > MEMORY_LIMIT {
                self.diagnostics
                    .push(Diagnostic::CapacityExceeded { line: line_number });
                self.truncated = true;
                break;
            }
        }

        self.patch();

        Encoded {
            bytes: self.buf,
            diagnostics: self.diagnostics,
            truncated: self.truncated,
            labels: self.labels,
            lines: self.lines,
        }
    }

    fn instruction(&mut self, line_number: usize, line: &str, command: &str, mnemonic: Mnemonic) {
        let start = self.buf.len();
        let tokens = operand::split_operands(line);

        let emitted = if mnemonic == Mnemonic::Db {
            self.raw_bytes(line_number, command, &tokens)
        } else {
            let operands: Vec<Operand> = tokens
                .iter()
                .map(|token| operand::classify(token, &self.labels))
                .collect();
            self.shaped(line_number, command, mnemonic, &tokens, &operands)
        };

        if emitted {
            self.lines.push(EncodedLine {
                line_number,
                offset: start as u16,
                text: line.to_owned(),
            });

            // the reset vector points at the first encoded instruction
            // that is not raw data
            if mnemonic != Mnemonic::Db && !self.entry_set {
                let [hi, lo] = (start as u16).to_be_bytes();
                self.buf[0] = hi;
                self.buf[1] = lo;
                self.entry_set = true;
            }
        }
    }

    fn raw_bytes(&mut self, line_number: usize, command: &str, tokens: &[&str]) -> bool {
        if tokens.is_empty() {
            self.diagnostics.push(Diagnostic::MissingOperands {
                line: line_number,
                command: command.to_owned(),
            });
            return false;
        }

        let mut emitted = false;
        for token in tokens {
            match operand::parse_hex(token) {
                Some(value) => {
                    self.buf.push(value as u8);
                    emitted = true;
                }
                None => self.diagnostics.push(Diagnostic::BadHexLiteral {
                    line: line_number,
                    text: (*token).to_owned(),
                }),
            }
        }

        emitted
    }

    fn shaped(
        &mut self,
        line_number: usize,
        command: &str,
        mnemonic: Mnemonic,
        tokens: &[&str],
        operands: &[Operand],
    ) -> bool {
        let table = rules(mnemonic);
        let counts = table.iter().map(|rule| rule.shape.len());
        let min = counts.clone().min().unwrap_or(0);
        let max = counts.max().unwrap_or(0);

        if operands.len() < min {
            self.diagnostics.push(Diagnostic::MissingOperands {
                line: line_number,
                command: command.to_owned(),
            });
            return false;
        }
        if operands.len() > max {
            self.diagnostics.push(Diagnostic::UnexpectedOperands {
                line: line_number,
                command: command.to_owned(),
                args: tokens.join(", "),
            });
            return false;
        }

        for rule in table {
            if rule.shape.len() != operands.len() {
                continue;
            }
            if rule
                .shape
                .iter()
                .zip(operands)
                .all(|(pat, op)| pat.matches(op))
            {
                self.buf.push(rule.opcode.byte());
                match rule.payload {
                    Payload::Bare => {}
                    Payload::Byte(index) => {
                        // the shape guarantees an immediate at this index
                        if let Operand::Imm(value) = &operands[index] {
                            self.buf.push(*value as u8);
                        }
                    }
                    Payload::Word(index) => self.word(&operands[index]),
                }
                return true;
            }
        }

        self.diagnostics.push(Diagnostic::UnmatchedOperands {
            line: line_number,
            command: command.to_owned(),
            args: tokens.join(", "),
        });
        false
    }

    /// A 16-bit address field. Hex literals land directly, big-endian;
    /// label references leave a placeholder and record the call site for
    /// the patch pass.
    fn word(&mut self, operand: &Operand) {
        match operand {
            Operand::Imm(value) => self.buf.extend_from_slice(&value.to_be_bytes()),
            Operand::LabelRef(name) => {
                let site = self.buf.len() as u16;
                self.buf.push(0x00);
                self.buf.push(0x00);
                self.labels.add_call_site(name, site);
            }
            _ => {}
        }
    }

    fn patch(&mut self) {
        for (name, label) in self.labels.iter() {
            let dest = match label.dest {
                Some(dest) => dest,
                None if label.call_sites.is_empty() => continue,
                None => {
                    self.diagnostics
                        .push(Diagnostic::UnresolvedLabel { name: name.clone() });
                    0
                }
            };

            let [hi, lo] = dest.to_be_bytes();
            for &site in &label.call_sites {
                self.buf[site as usize] = hi;
                self.buf[site as usize + 1] = lo;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diag::Diagnostic;
    use crate::{assemble_lines, assemble_program};

    fn body(line: &str) -> Vec<u8> {
        let assembly = assemble_lines(&[line]);
        assert!(
            assembly.diagnostics.is_empty(),
            "unexpected diagnostics for {line:?}: {:?}",
            assembly.diagnostics
        );
        assembly.bytes[2..].to_vec()
    }

    fn sole_diagnostic(line: &str) -> Diagnostic {
        let assembly = assemble_lines(&[line]);
        assert_eq!(assembly.bytes.len(), 2, "bytes emitted for {line:?}");
        assert_eq!(assembly.diagnostics.len(), 1);
        assembly.diagnostics[0].clone()
    }

    #[test]
    fn bare_opcodes() {
        assert_eq!(body("CLS"), [0xE0]);
        assert_eq!(body("RET"), [0xEE]);
        assert_eq!(body("EXIT"), [0xAA]);
    }

    #[test]
    fn jump_and_call_words() {
        assert_eq!(body("JP $3"), [0x10, 0x00, 0x03]);
        assert_eq!(body("JP $300"), [0x10, 0x03, 0x00]);
        assert_eq!(body("JP Rx, $1234"), [0xB0, 0x12, 0x34]);
        assert_eq!(body("CALL $FFF"), [0x20, 0x0F, 0xFF]);
    }

    #[test]
    fn compare_jumps() {
        assert_eq!(body("JE Rx, Ry"), [0x50]);
        assert_eq!(body("JE Rx, $A"), [0x30, 0x0A]);
        assert_eq!(body("JNE Rx, Ry"), [0x51]);
        assert_eq!(body("JNE Rx, $FE"), [0x31, 0xFE]);
    }

    #[test]
    fn ld_matrix() {
        assert_eq!(body("LD I, Rx, Ry"), [0xFD]);
        assert_eq!(body("LD Rx, Ry, I"), [0xFE]);
        assert_eq!(body("LD Rx, $7F"), [0x60, 0x7F]);
        assert_eq!(body("LD Ry, $80"), [0x61, 0x80]);
        assert_eq!(body("LD Rx, I"), [0x62]);
        assert_eq!(body("LD Ry, I"), [0x63]);
        assert_eq!(body("LD I, Rx"), [0x64]);
        assert_eq!(body("LD I, Ry"), [0x65]);
        assert_eq!(body("LD Rx, Ry"), [0x80]);
        assert_eq!(body("LD Ry, Rx"), [0x8A]);
        assert_eq!(body("LD I, $234"), [0xA0, 0x02, 0x34]);
        assert_eq!(body("LD I, RxRy"), [0xA1]);
        assert_eq!(body("LD Rx, DT"), [0xF1]);
        assert_eq!(body("LD Rx, K"), [0xF2]);
        assert_eq!(body("LD DT, Rx"), [0xF3]);
        assert_eq!(body("LD ST, Rx"), [0xF4]);
        assert_eq!(body("LD B, Rx"), [0xFC]);
    }

    #[test]
    fn arithmetic_and_shifts() {
        assert_eq!(body("ADD Rx, $1"), [0x70, 0x01]);
        assert_eq!(body("ADD Ry, $2"), [0x71, 0x02]);
        assert_eq!(body("ADD Rx, Ry"), [0x84]);
        assert_eq!(body("ADD I, Rx"), [0xFA]);
        assert_eq!(body("OR Rx, Ry"), [0x81]);
        assert_eq!(body("AND Rx, Ry"), [0x82]);
        assert_eq!(body("XOR Rx, Ry"), [0x83]);
        assert_eq!(body("SUB Rx, Ry"), [0x85]);
        assert_eq!(body("SUBN Rx, Ry"), [0x87]);
        assert_eq!(body("SHR Rx, 1"), [0x86]);
        assert_eq!(body("SHL Rx, 1"), [0x8E]);
    }

    #[test]
    fn draw_and_keys() {
        assert_eq!(body("DRW Rx, Ry"), [0xD1]);
        assert_eq!(body("DRW Rx, Ry, $5"), [0xD0, 0x05]);
        assert_eq!(body("RND Rx, $0F"), [0xC0, 0x0F]);
        assert_eq!(body("JKP Rx"), [0xE1]);
        assert_eq!(body("JKNP Rx"), [0xE2]);
    }

    #[test]
    fn raw_bytes_and_both_spellings() {
        assert_eq!(body("DB $F0, $90, $F0"), [0xF0, 0x90, 0xF0]);
        assert_eq!(body("define $AB"), [0xAB]);
        // a wide literal keeps its low byte
        assert_eq!(body("DB $1234"), [0x34]);
    }

    #[test]
    fn missing_operands() {
        assert!(matches!(
            sole_diagnostic("JP"),
            Diagnostic::MissingOperands { line: 1, .. }
        ));
        assert!(matches!(
            sole_diagnostic("LD Rx"),
            Diagnostic::MissingOperands { line: 1, .. }
        ));
        assert!(matches!(
            sole_diagnostic("DB"),
            Diagnostic::MissingOperands { line: 1, .. }
        ));
    }

    #[test]
    fn unexpected_operands() {
        let diagnostic = sole_diagnostic("CLS $1");
        assert_eq!(
            diagnostic,
            Diagnostic::UnexpectedOperands {
                line: 1,
                command: "CLS".into(),
                args: "$1".into(),
            }
        );
        assert!(matches!(
            sole_diagnostic("EXIT Rx, Ry"),
            Diagnostic::UnexpectedOperands { line: 1, .. }
        ));
    }

    #[test]
    fn unmatched_operands() {
        assert!(matches!(
            sole_diagnostic("JP Rx"),
            Diagnostic::UnmatchedOperands { line: 1, .. }
        ));
        assert!(matches!(
            sole_diagnostic("OR Rx, Rx"),
            Diagnostic::UnmatchedOperands { line: 1, .. }
        ));
        // the shift count must be the literal token 1
        assert!(matches!(
            sole_diagnostic("SHR Rx, $1"),
            Diagnostic::UnmatchedOperands { line: 1, .. }
        ));
        assert!(matches!(
            sole_diagnostic("DRW Rx, Ry, Rx"),
            Diagnostic::UnmatchedOperands { line: 1, .. }
        ));
    }

    #[test]
    fn unknown_command_reports_whole_line() {
        let assembly = assemble_lines(&["MOV Rx, Ry"]);

        assert_eq!(assembly.bytes, [0x00, 0x00]);
        assert_eq!(
            assembly.diagnostics,
            [Diagnostic::UnknownCommand {
                line: 1,
                text: "MOV Rx, Ry".into(),
            }]
        );
    }

    #[test]
    fn bad_raw_byte_still_emits_the_rest() {
        let assembly = assemble_lines(&["DB $01, nope, $02"]);

        assert_eq!(assembly.bytes[2..], [0x01, 0x02]);
        assert_eq!(
            assembly.diagnostics,
            [Diagnostic::BadHexLiteral {
                line: 1,
                text: "nope".into(),
            }]
        );
    }

    #[test]
    fn reset_vector_skips_failed_and_raw_lines() {
        let assembly = assemble_program("JP\nDB $FF\nRET\n");

        // the failed JP emits nothing, the DB byte lands at 2, and the
        // vector points at the RET
        assert_eq!(assembly.bytes, [0x00, 0x03, 0xFF, 0xEE]);
        assert_eq!(assembly.entry(), 3);
    }

    #[test]
    fn comments_do_not_hide_operands() {
        let assembly = assemble_program("LD Rx, $0F ; load mask\n");

        assert_eq!(assembly.bytes[2..], [0x60, 0x0F]);
        assert!(assembly.diagnostics.is_empty());
    }
}
