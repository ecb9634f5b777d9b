use std::collections::HashMap;

use serde::{Deserialize, Serialize};
pub use serde_json::Error;

/// Where one assembled source line landed in the binary image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SymLine {
    pub offset: u16,
    pub text: String,
    pub line_number: usize,
}

/// A label and where its declaration resolved to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SymLabel {
    pub offset: u16,
    pub line_number: usize,
}

/// Debug symbols for an assembled LoChip image: the entry point from the
/// reset vector, every resolved label, and the offset each encoded source
/// line was placed at.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SymbolDump {
    pub entry: u16,
    pub lines: Vec<SymLine>,
    pub labels: HashMap<String, SymLabel>,
}

impl SymbolDump {
    pub fn new(entry: u16) -> Self {
        SymbolDump {
            entry,
            lines: Vec::new(),
            labels: HashMap::new(),
        }
    }

    pub fn add_label(&mut self, name: String, offset: u16, line_number: usize) {
        self.labels.insert(
            name,
            SymLabel {
                offset,
                line_number,
            },
        );
    }

    pub fn add_line(&mut self, offset: u16, text: String, line_number: usize) {
        self.lines.push(SymLine {
            offset,
            text,
            line_number,
        });
    }

    /// The source line whose bytes start at `offset`, if any.
    pub fn line_at(&self, offset: u16) -> Option<&SymLine> {
        self.lines.iter().find(|line| line.offset == offset)
    }

    pub fn to_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_string(dump: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(dump)
    }
}
