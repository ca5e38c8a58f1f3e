//! Shared handles to external documents.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Model;

#[derive(Default)]
pub(crate) struct ImportSourceData {
    url: String,
    id: String,
    model: Option<Model>,
}

/// A reference to another CellML document, identified by its URL.
///
/// Many units and components may share one `ImportSource`; the printer
/// emits one `<import>` element per shared instance. Nothing is fetched
/// automatically: the resolved document is stored with [`set_model`]
/// by whoever performs import resolution.
///
/// [`set_model`]: ImportSource::set_model
#[derive(Clone)]
pub struct ImportSource(pub(crate) Rc<RefCell<ImportSourceData>>);

impl ImportSource {
    /// Create an import source with no URL.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ImportSourceData::default())))
    }

    /// Create an import source pointing at `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        let source = Self::new();
        source.set_url(url);
        source
    }

    pub fn url(&self) -> String {
        self.0.borrow().url.clone()
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.0.borrow_mut().url = url.into();
    }

    pub fn id(&self) -> String {
        self.0.borrow().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().id = id.into();
    }

    /// The resolved document, if import resolution has run.
    pub fn model(&self) -> Option<Model> {
        self.0.borrow().model.clone()
    }

    pub fn set_model(&self, model: &Model) {
        self.0.borrow_mut().model = Some(model.clone());
    }

    pub fn has_model(&self) -> bool {
        self.0.borrow().model.is_some()
    }

    pub fn clear_model(&self) {
        self.0.borrow_mut().model = None;
    }

    /// Stable address used to group entities that share this source.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Default for ImportSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ImportSource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ImportSource {}

impl fmt::Debug for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("ImportSource")
            .field("url", &data.url)
            .field("id", &data.id)
            .field("resolved", &data.model.is_some())
            .finish()
    }
}

/// The import half of a units or component definition: where it comes from
/// and what it is called there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReference {
    source: ImportSource,
    reference: String,
}

impl ImportReference {
    pub fn new(source: &ImportSource, reference: impl Into<String>) -> Self {
        Self {
            source: source.clone(),
            reference: reference.into(),
        }
    }

    pub fn source(&self) -> &ImportSource {
        &self.source
    }

    /// Name of the entity in the source document.
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_id() {
        let source = ImportSource::with_url("other.cellml");
        source.set_id("src1");
        assert_eq!(source.url(), "other.cellml");
        assert_eq!(source.id(), "src1");
    }

    #[test]
    fn test_identity_equality() {
        let a = ImportSource::with_url("same.cellml");
        let b = ImportSource::with_url("same.cellml");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_model_slot() {
        let source = ImportSource::new();
        assert!(!source.has_model());
        source.set_model(&Model::with_name("remote"));
        assert_eq!(source.model().map(|m| m.name()).as_deref(), Some("remote"));
        source.clear_model();
        assert!(source.model().is_none());
    }
}
