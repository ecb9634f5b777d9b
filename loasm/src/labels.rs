use indexmap::IndexMap;

/// A named jump/call target.
#[derive(Debug, Clone)]
pub struct Label {
    /// 1-based source line of the declaration.
    pub line: usize,
    /// Offset of the declaration in the output buffer. Collection leaves
    /// this unset; it depends on how many bytes earlier instructions
    /// emit, so it is filled in when the declaration line is reached
    /// during encoding.
    pub dest: Option<u16>,
    /// Offsets of the first byte of every two-byte placeholder waiting to
    /// be patched with `dest`, in emission order.
    pub call_sites: Vec<u16>,
}

/// The symbol table for one assembly run. Iteration follows declaration
/// order so diagnostics and patching are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    labels: IndexMap<String, Label>,
}

impl Labels {
    pub fn new() -> Self {
        Self {
            labels: IndexMap::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    /// Register a declaration. A name declared twice keeps the later
    /// declaration; call sites attach to the name either way.
    pub fn declare(&mut self, name: String, line: usize) {
        self.labels.insert(
            name,
            Label {
                line,
                dest: None,
                call_sites: Vec::new(),
            },
        );
    }

    pub fn set_dest(&mut self, name: &str, dest: u16) {
        if let Some(label) = self.labels.get_mut(name) {
            label.dest = Some(dest);
        }
    }

    pub fn add_call_site(&mut self, name: &str, offset: u16) {
        if let Some(label) = self.labels.get_mut(name) {
            label.call_sites.push(offset);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Label)> {
        self.labels.iter()
    }
}

/// Scan normalized lines for label declarations. Only the existence of a
/// name and its declaration line are recorded here, never its position.
pub fn collect<S: AsRef<str>>(lines: &[S]) -> Labels {
    let mut labels = Labels::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(name) = declaration(line.as_ref()) {
            labels.declare(name.to_owned(), idx + 1);
        }
    }

    labels
}

/// A declaration is a non-empty line whose final character is `:`, with a
/// single token before the colon. The encoder uses the same predicate, so
/// both passes agree on what a declaration is.
pub fn declaration(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?.trim_end();

    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }

    Some(name)
}
