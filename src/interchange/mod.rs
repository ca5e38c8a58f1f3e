//! Reading and writing CellML documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐                          ┌──────────────┐
//! │ CellML text  │ ── Parser::parse_model ─▶ │    Model     │
//! │              │ ◀─ Printer::print_model ─ │ (entity/)    │
//! └──────────────┘                          └──────────────┘
//!                        │
//!                        ▼
//!              ParseResult { model, issues }
//! ```
//!
//! [`Printer`] and [`Parser`] are the primary entry points. [`CellmlXml`]
//! wraps them behind the byte-oriented [`ModelFormat`] trait so callers can
//! pick a format from a file path.
//!
//! ## Usage
//!
//! ```ignore
//! use cellml::interchange::{Parser, Printer};
//!
//! let result = Parser::new().parse_model(&std::fs::read_to_string("hh.cellml")?);
//! for issue in &result.issues {
//!     eprintln!("{issue}");
//! }
//! let text = Printer::new().print_model(&result.model)?;
//! ```

mod cellml_xml;
mod error;
mod format;
mod options;
mod parser;
mod printer;

pub use cellml_xml::{CellmlXml, namespace};
pub use error::InterchangeError;
pub use format::{FormatCapability, ModelFormat};
pub use options::{ParserOptions, PrinterOptions};
pub use parser::{ParseResult, Parser};
pub use printer::Printer;

/// Supported file extensions for interchange formats.
pub fn supported_extensions() -> &'static [&'static str] {
    &["cellml", "xml"]
}

/// Detect format from file extension.
pub fn detect_format(path: &std::path::Path) -> Option<Box<dyn ModelFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "cellml" | "xml" => Some(Box::new(CellmlXml)),
        _ => None,
    }
}

/// Detect format from MIME type.
pub fn detect_format_from_mime(mime: &str) -> Option<Box<dyn ModelFormat>> {
    match mime {
        "application/cellml+xml" | "application/xml" | "text/xml" => Some(Box::new(CellmlXml)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_detect_format() {
        assert!(detect_format(Path::new("model.cellml")).is_some());
        assert!(detect_format(Path::new("MODEL.XML")).is_some());
        assert!(detect_format(Path::new("model.xmi")).is_none());
        assert!(detect_format(Path::new("model")).is_none());
    }

    #[test]
    fn test_detect_format_from_mime() {
        let format = detect_format_from_mime("application/cellml+xml");
        assert_eq!(format.map(|f| f.name()), Some("CellML"));
        assert!(detect_format_from_mime("application/json").is_none());
    }
}
