//! CellML 2.0 XML format support.
//!
//! ## Document Structure
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <model xmlns="http://www.cellml.org/cellml/2.0#" name="hodgkin_huxley">
//!   <units name="millivolt">
//!     <unit prefix="milli" units="volt"/>
//!   </units>
//!   <component name="membrane">
//!     <variable name="V" units="millivolt" interface="public"/>
//!   </component>
//! </model>
//! ```

use tracing::warn;

use super::{FormatCapability, InterchangeError, ModelFormat, Parser, Printer};
use crate::entity::Model;
use crate::issue::IssueKind;

/// Namespace URIs used in CellML documents.
pub mod namespace {
    /// CellML 2.0 namespace (default namespace of `<model>`).
    pub const CELLML_2_0: &str = "http://www.cellml.org/cellml/2.0#";
    /// XLink namespace for `xlink:href` on `<import>`.
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    /// MathML namespace expected on `<math>` blocks.
    pub const MATHML: &str = "http://www.w3.org/1998/Math/MathML";
}

/// CellML 2.0 XML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellmlXml;

impl ModelFormat for CellmlXml {
    fn name(&self) -> &'static str {
        "CellML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cellml", "xml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/cellml+xml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> Result<Model, InterchangeError> {
        let text = std::str::from_utf8(input)?;
        let result = Parser::new().parse_model(text);
        if let Some(issue) = result.issues.iter().find(|i| i.kind == IssueKind::Xml && i.is_error()) {
            return Err(InterchangeError::xml(issue.description.clone()));
        }
        for issue in &result.issues {
            warn!("{issue}");
        }
        Ok(result.model)
    }

    fn write(&self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        Printer::new().print_model(model).map(String::into_bytes)
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let content = std::str::from_utf8(input)?;
        if !content.contains("<model") {
            return Err(InterchangeError::xml("Missing CellML model root element"));
        }
        if !content.contains(namespace::CELLML_2_0) {
            return Err(InterchangeError::Unsupported(
                "document is not in the CellML 2.0 namespace".to_string(),
            ));
        }
        Ok(())
    }
}
