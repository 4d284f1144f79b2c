//! Break targets for loops and switches.
//!
//! Entering a loop or switch pushes its exit label; leaving pops it. A
//! `break` jumps to whatever label is on top.

/// Stack of exit labels, innermost last.
#[derive(Debug, Default)]
pub struct BreakLabels {
    exits: Vec<String>,
}

impl BreakLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a loop or switch whose exit is `label`.
    pub fn enter(&mut self, label: String) {
        self.exits.push(label);
    }

    /// Leave the innermost loop or switch, returning its exit label.
    pub fn exit(&mut self) -> Option<String> {
        self.exits.pop()
    }

    /// Where a `break` at this point jumps to.
    pub fn target(&self) -> Option<&str> {
        self.exits.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.exits.len()
    }
}
