//! Printer and parser options

/// Printing options for CellML documents
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Number of spaces per nesting level
    pub indent_width: usize,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl PrinterOptions {
    /// Generate indentation string for the given level
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Parsing options for CellML documents
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Report a root element outside the CellML 2.0 namespace as an error
    /// instead of a warning
    pub strict_namespace: bool,
}
