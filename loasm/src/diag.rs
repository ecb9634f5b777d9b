use thiserror::Error;

/// Conditions reported during assembly. All but `CapacityExceeded` are
/// scoped to a single source line: the line emits no bytes and assembly
/// moves on, so later labels keep their offsets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("line {line}: the command \"{text}\" was not found and ignored")]
    UnknownCommand { line: usize, text: String },

    #[error("line {line}: missing operands for \"{command}\"")]
    MissingOperands { line: usize, command: String },

    #[error("line {line}: unexpected operands \"{args}\" for \"{command}\"")]
    UnexpectedOperands {
        line: usize,
        command: String,
        args: String,
    },

    #[error("line {line}: operands \"{args}\" match no form of \"{command}\"")]
    UnmatchedOperands {
        line: usize,
        command: String,
        args: String,
    },

    #[error("line {line}: could not parse hex value \"{text}\"")]
    BadHexLiteral { line: usize, text: String },

    #[error("label \"{name}\" is referenced but never got an address")]
    UnresolvedLabel { name: String },

    #[error("line {line}: the assembled binary no longer fits LoChip's memory, assembly was stopped")]
    CapacityExceeded { line: usize },
}
