//! Issues: model-content problems reported by the parser and import
//! resolution.
//!
//! Entity operations never fail loudly; when reading a document or
//! resolving imports turns up something that cannot be represented, an
//! [`Issue`] is recorded and processing continues.

use std::fmt;

use crate::entity::{Component, ImportSource, Model, Reset, Units, Variable};

// ============================================================================
// ISSUE TYPES
// ============================================================================

/// Severity level of an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Which part of the document an issue concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueKind {
    Component,
    Connection,
    Encapsulation,
    Import,
    MathMl,
    Model,
    Reset,
    Units,
    Variable,
    /// The document is not well-formed markup.
    Xml,
}

/// Pointer back to the entity an issue is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemRef {
    Model(Model),
    Component(Component),
    Units(Units),
    Variable(Variable),
    Reset(Reset),
    ImportSource(ImportSource),
}

impl From<&Model> for ItemRef {
    fn from(model: &Model) -> Self {
        Self::Model(model.clone())
    }
}

impl From<&Component> for ItemRef {
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

impl From<&Units> for ItemRef {
    fn from(units: &Units) -> Self {
        Self::Units(units.clone())
    }
}

impl From<&Variable> for ItemRef {
    fn from(variable: &Variable) -> Self {
        Self::Variable(variable.clone())
    }
}

impl From<&Reset> for ItemRef {
    fn from(reset: &Reset) -> Self {
        Self::Reset(reset.clone())
    }
}

impl From<&ImportSource> for ItemRef {
    fn from(source: &ImportSource) -> Self {
        Self::ImportSource(source.clone())
    }
}

/// A single reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub description: String,
    /// The offending entity, when one exists in the built graph.
    pub item: Option<ItemRef>,
}

impl Issue {
    /// Create a new error issue.
    pub fn error(kind: IssueKind, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            description: description.into(),
            item: None,
        }
    }

    /// Create a new warning issue.
    pub fn warning(kind: IssueKind, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            description: description.into(),
            item: None,
        }
    }

    /// Attach the entity this issue concerns.
    pub fn with_item(mut self, item: impl Into<ItemRef>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str(), self.description)
    }
}
