use core::fmt;

/// One line of program text in flight through the demo pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    text: String,
}

impl Instruction {
    /// Wraps a line of program text, without its line terminator.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The instruction text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `nop` is squashed by decode and never reaches execute.
    pub fn is_nop(&self) -> bool {
        self.text == "nop"
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
