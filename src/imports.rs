//! Caller-driven import resolution.
//!
//! Import placeholders only name a URL and a remote entity. Nothing is
//! fetched while the graph is built or printed; [`resolve_imports`] loads
//! each distinct [`ImportSource`] through an [`ImportLoader`], parses it,
//! and attaches the result to the source so analysis code can follow the
//! reference.
//!
//! Only the imports of the given model are resolved. Imports declared by
//! the loaded models are left for the caller to resolve in turn.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::entity::{ImportSource, Model};
use crate::interchange::{InterchangeError, Parser};
use crate::issue::{Issue, IssueKind};

/// Fetches the text of an imported document.
pub trait ImportLoader {
    fn load(&self, url: &str) -> Result<String, InterchangeError>;
}

/// Loads relative import URLs from the file system.
#[derive(Debug, Clone)]
pub struct FileImportLoader {
    base: PathBuf,
}

impl FileImportLoader {
    /// Resolve URLs relative to the directory `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve URLs relative to the directory holding `document`.
    pub fn for_document(document: &Path) -> Self {
        Self::new(document.parent().unwrap_or(Path::new(".")))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ImportLoader for FileImportLoader {
    fn load(&self, url: &str) -> Result<String, InterchangeError> {
        if url.is_empty() {
            return Err(InterchangeError::unresolved_import("empty import URL"));
        }
        if url.contains("://") {
            return Err(InterchangeError::Unsupported(format!("remote import '{url}'")));
        }
        let path = self.base.join(url);
        debug!("loading import '{}'", path.display());
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Load every distinct import source of `model` that has no model attached
/// yet, then check each placeholder against its source's model.
pub fn resolve_imports(model: &Model, loader: &dyn ImportLoader) -> Vec<Issue> {
    let mut issues = Vec::new();
    let parser = Parser::new();

    for source in model.import_sources() {
        if !source.has_model() {
            load_source(&source, loader, &parser, &mut issues);
        }
    }

    for component in model.all_components() {
        let Some(import) = component.import() else {
            continue;
        };
        let Some(remote) = import.source().model() else {
            continue;
        };
        if remote.find_component(import.reference()).is_none() {
            issues.push(
                Issue::error(
                    IssueKind::Import,
                    format!(
                        "component '{}' imports '{}' which is not defined in '{}'",
                        component.name(),
                        import.reference(),
                        import.source().url()
                    ),
                )
                .with_item(&component),
            );
        }
    }

    for units in model.all_units() {
        let Some(import) = units.import() else {
            continue;
        };
        let Some(remote) = import.source().model() else {
            continue;
        };
        if !remote.contains_units(import.reference()) {
            issues.push(
                Issue::error(
                    IssueKind::Import,
                    format!(
                        "units '{}' imports '{}' which is not defined in '{}'",
                        units.name(),
                        import.reference(),
                        import.source().url()
                    ),
                )
                .with_item(&units),
            );
        }
    }

    issues
}

fn load_source(source: &ImportSource, loader: &dyn ImportLoader, parser: &Parser, issues: &mut Vec<Issue>) {
    let url = source.url();
    let text = match loader.load(&url) {
        Ok(text) => text,
        Err(e) => {
            issues.push(
                Issue::error(IssueKind::Import, format!("import '{url}' could not be loaded: {e}"))
                    .with_item(source),
            );
            return;
        }
    };

    let result = parser.parse_model(&text);
    if result
        .issues
        .iter()
        .any(|issue| issue.kind == IssueKind::Xml && issue.is_error())
    {
        issues.push(
            Issue::error(IssueKind::Import, format!("import '{url}' is not a readable document"))
                .with_item(source),
        );
        return;
    }
    for issue in result.issues {
        issues.push(Issue {
            description: format!("in '{url}': {}", issue.description),
            ..issue
        });
    }
    source.set_model(&result.model);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Component, Units};
    use rustc_hash::FxHashMap;

    struct MapLoader(FxHashMap<&'static str, &'static str>);

    impl ImportLoader for MapLoader {
        fn load(&self, url: &str) -> Result<String, InterchangeError> {
            self.0
                .get(url)
                .map(|text| text.to_string())
                .ok_or_else(|| InterchangeError::unresolved_import(url))
        }
    }

    const LIBRARY: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                           <model xmlns=\"http://www.cellml.org/cellml/2.0#\" name=\"library\">\n  \
                           <units name=\"millivolt\"/>\n  \
                           <component name=\"membrane\"/>\n\
                           </model>\n";

    #[test]
    fn test_resolves_shared_source_once() {
        let model = Model::new();
        let source = ImportSource::with_url("library.cellml");
        let component = Component::with_name("local_membrane");
        component.set_source_component(&source, "membrane");
        let units = Units::with_name("mV");
        units.set_source_units(&source, "millivolt");
        model.add_component(&component);
        model.add_units(&units);

        let loader = MapLoader(FxHashMap::from_iter([("library.cellml", LIBRARY)]));
        let issues = resolve_imports(&model, &loader);
        assert!(issues.is_empty(), "{issues:?}");
        assert!(source.has_model());
        assert!(!model.has_unresolved_imports());
    }

    #[test]
    fn test_reports_missing_remote_entity() {
        let model = Model::new();
        let source = ImportSource::with_url("library.cellml");
        let component = Component::with_name("c");
        component.set_source_component(&source, "missing");
        model.add_component(&component);

        let loader = MapLoader(FxHashMap::from_iter([("library.cellml", LIBRARY)]));
        let issues = resolve_imports(&model, &loader);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Import);
        assert!(model.has_unresolved_imports());
    }

    #[test]
    fn test_reports_load_failure() {
        let model = Model::new();
        let component = Component::with_name("c");
        component.set_source_component(&ImportSource::with_url("nowhere.cellml"), "c");
        model.add_component(&component);

        let issues = resolve_imports(&model, &MapLoader(FxHashMap::default()));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("nowhere.cellml"));
    }
}
