//! # cellml-base
//!
//! Core library for building, printing and parsing CellML 2.0 models.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! imports      → Caller-driven import resolution (ImportLoader)
//!   ↓
//! interchange  → Printer, Parser, CellmlXml format
//!   ↓
//! issue        → Issue/Severity records from parsing and resolution
//!   ↓
//! entity       → Model, Component, Units, Variable, Reset, ImportSource
//! ```

// ============================================================================
// MODULES (dependency order: entity → issue → interchange → imports)
// ============================================================================

/// Entity graph: Model, Component, Units, Variable, Reset, ImportSource
pub mod entity;

/// Issues reported while reading documents or resolving imports
pub mod issue;

/// CellML 2.0 markup: Printer, Parser, format detection
pub mod interchange;

/// Import resolution through a caller-supplied loader
pub mod imports;

// Re-export the entity graph
pub use entity::{
    Component, ImportReference, ImportSource, InterfaceType, Locator, Model, ParentRef, Prefix,
    Reset, SiPrefix, StandardUnit, UnitReference, Units, ValueError, Variable, VariableUnits,
};

// Re-export the markup entry points
pub use interchange::{InterchangeError, ParseResult, Parser, Printer};
pub use issue::{Issue, IssueKind, ItemRef, Severity};
