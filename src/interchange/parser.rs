//! CellML 2.0 document reader.
//!
//! Reading is lenient. Anything that cannot be represented in the entity
//! graph (unknown elements or attributes, bad numbers, names that resolve
//! to nothing) becomes an [`Issue`] and is skipped. Only markup that is not
//! well-formed aborts the read, leaving an empty model and a single
//! [`IssueKind::Xml`] error.
//!
//! Math is not interpreted: each `<math>` element is captured verbatim
//! from the source text with the indentation of its opening line removed.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace};

use super::InterchangeError;
use super::cellml_xml::namespace;
use super::options::ParserOptions;
use crate::entity::{Component, ImportSource, Model, Reset, UnitReference, Units, Variable};
use crate::issue::{Issue, IssueKind, Severity};

/// A parsed model together with everything noticed while reading it.
#[derive(Debug)]
pub struct ParseResult {
    pub model: Model,
    pub issues: Vec<Issue>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }
}

/// Builds a [`Model`] from CellML 2.0 text.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse_model(&self, text: &str) -> ParseResult {
        DocumentReader::new(text, &self.options).read()
    }
}

// ============================================================================
// PENDING REFERENCES
// ============================================================================

struct PendingMapping {
    variable_1: String,
    variable_2: String,
    id: String,
}

struct PendingConnection {
    component_1: String,
    component_2: String,
    id: String,
    mappings: Vec<PendingMapping>,
}

/// One `<component_ref>` of the encapsulation tree.
struct EncapsulationNode {
    component: String,
    id: String,
    children: Vec<EncapsulationNode>,
}

struct Attr {
    name: String,
    value: String,
}

impl Attr {
    fn local(&self) -> &str {
        self.name.rsplit_once(':').map_or(self.name.as_str(), |(_, local)| local)
    }

    fn is_namespace_decl(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

// ============================================================================
// READER
// ============================================================================

struct DocumentReader<'s> {
    source: &'s str,
    options: &'s ParserOptions,
    model: Model,
    issues: Vec<Issue>,
    /// Every component in document order, imports included.
    components: Vec<Component>,
    connections: Vec<PendingConnection>,
    encapsulation: Vec<EncapsulationNode>,
}

impl<'s> DocumentReader<'s> {
    fn new(source: &'s str, options: &'s ParserOptions) -> Self {
        Self {
            source,
            options,
            model: Model::new(),
            issues: Vec::new(),
            components: Vec::new(),
            connections: Vec::new(),
            encapsulation: Vec::new(),
        }
    }

    fn read(mut self) -> ParseResult {
        let mut reader = Reader::from_str(self.source);
        reader.config_mut().trim_text(true);

        if let Err(e) = self.read_document(&mut reader) {
            debug!("abandoning malformed document: {e}");
            return ParseResult {
                model: Model::new(),
                issues: vec![Issue::error(IssueKind::Xml, e.to_string())],
            };
        }

        self.link_encapsulation();
        self.link_connections();

        debug!(
            components = self.model.all_components().len(),
            units = self.model.units_count(),
            issues = self.issues.len(),
            "parsed model '{}'",
            self.model.name()
        );
        ParseResult {
            model: self.model,
            issues: self.issues,
        }
    }

    fn read_document(&mut self, reader: &mut Reader<&'s [u8]>) -> Result<(), InterchangeError> {
        let mut found_model = false;
        loop {
            let (element, empty) = match reader.read_event() {
                Ok(Event::Start(e)) => (e, false),
                Ok(Event::Empty(e)) => (e, true),
                Ok(Event::Eof) => break,
                Ok(_) => continue,
                Err(e) => return Err(xml_error(reader, e)),
            };

            if element.local_name().as_ref() == b"model" && !found_model {
                found_model = true;
                self.read_model(reader, &element, empty)?;
            } else {
                let name = element_name(&element);
                self.issues.push(Issue::error(
                    IssueKind::Model,
                    format!("unexpected top-level element '{name}'"),
                ));
                skip(reader, &element, empty)?;
            }
        }

        if !found_model {
            self.issues
                .push(Issue::error(IssueKind::Model, "document has no 'model' element"));
        }
        Ok(())
    }

    fn read_model(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        let mut namespace_seen = false;
        for attr in self.attributes(element) {
            if attr.name == "xmlns" {
                namespace_seen = true;
                if attr.value != namespace::CELLML_2_0 {
                    self.namespace_issue(format!(
                        "model is in namespace '{}', expected '{}'",
                        attr.value,
                        namespace::CELLML_2_0
                    ));
                }
                continue;
            }
            match attr.local() {
                "name" => self.model.set_name(attr.value),
                "id" => self.model.set_id(attr.value),
                _ if attr.is_namespace_decl() => {}
                _ => self.unexpected_attribute(IssueKind::Model, "model", &attr),
            }
        }
        if !namespace_seen {
            self.namespace_issue("model has no CellML namespace declaration".to_string());
        }

        if empty {
            return Ok(());
        }
        while let Some((child, empty)) = next_child(reader, "model")? {
            match child.local_name().as_ref() {
                b"import" => self.read_import(reader, &child, empty)?,
                b"units" => self.read_units(reader, &child, empty)?,
                b"component" => self.read_component(reader, &child, empty)?,
                b"connection" => self.read_connection(reader, &child, empty)?,
                b"encapsulation" => self.read_encapsulation(reader, &child, empty)?,
                _ => {
                    self.unexpected_element(IssueKind::Model, "model", &child);
                    skip(reader, &child, empty)?;
                }
            }
        }
        Ok(())
    }

    fn read_import(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        let source = ImportSource::new();
        for attr in self.attributes(element) {
            match attr.local() {
                "href" => source.set_url(attr.value),
                "id" => source.set_id(attr.value),
                _ if attr.is_namespace_decl() => {}
                _ => self.unexpected_attribute(IssueKind::Import, "import", &attr),
            }
        }
        if empty {
            return Ok(());
        }

        while let Some((child, empty)) = next_child(reader, "import")? {
            match child.local_name().as_ref() {
                b"component" => {
                    let component = Component::new();
                    for attr in self.attributes(&child) {
                        match attr.local() {
                            "component_ref" => component.set_source_component(&source, attr.value),
                            "name" => component.set_name(attr.value),
                            "id" => component.set_id(attr.value),
                            _ => self.unexpected_attribute(IssueKind::Import, "component", &attr),
                        }
                    }
                    if !component.is_import() {
                        component.set_source_component(&source, "");
                    }
                    self.components.push(component);
                    skip(reader, &child, empty)?;
                }
                b"units" => {
                    let units = Units::new();
                    for attr in self.attributes(&child) {
                        match attr.local() {
                            "units_ref" => units.set_source_units(&source, attr.value),
                            "name" => units.set_name(attr.value),
                            "id" => units.set_id(attr.value),
                            _ => self.unexpected_attribute(IssueKind::Import, "units", &attr),
                        }
                    }
                    if !units.is_import() {
                        units.set_source_units(&source, "");
                    }
                    self.model.add_units(&units);
                    skip(reader, &child, empty)?;
                }
                _ => {
                    self.unexpected_element(IssueKind::Import, "import", &child);
                    skip(reader, &child, empty)?;
                }
            }
        }
        Ok(())
    }

    fn read_units(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        let units = Units::new();
        for attr in self.attributes(element) {
            match attr.local() {
                "name" => units.set_name(attr.value),
                "id" => units.set_id(attr.value),
                _ => self.unexpected_attribute(IssueKind::Units, "units", &attr),
            }
        }
        self.model.add_units(&units);
        if empty {
            return Ok(());
        }

        while let Some((child, empty)) = next_child(reader, "units")? {
            if child.local_name().as_ref() != b"unit" {
                self.unexpected_element(IssueKind::Units, "units", &child);
                skip(reader, &child, empty)?;
                continue;
            }
            let mut reference = UnitReference::default();
            for attr in self.attributes(&child) {
                match attr.local() {
                    "units" => reference.reference = attr.value,
                    "id" => reference.id = attr.value,
                    "prefix" => match attr.value.parse() {
                        Ok(prefix) => reference.prefix = Some(prefix),
                        Err(e) => self.push_issue(
                            Issue::warning(IssueKind::Units, format!("units '{}': {e}", units.name()))
                                .with_item(&units),
                        ),
                    },
                    "exponent" | "multiplier" => match attr.value.trim().parse::<f64>() {
                        Ok(value) if attr.local() == "exponent" => reference.exponent = Some(value),
                        Ok(value) => reference.multiplier = Some(value),
                        Err(_) => self.push_issue(
                            Issue::warning(
                                IssueKind::Units,
                                format!(
                                    "units '{}' has a unit with a non-numeric {} '{}'",
                                    units.name(),
                                    attr.local(),
                                    attr.value
                                ),
                            )
                            .with_item(&units),
                        ),
                    },
                    _ => self.unexpected_attribute(IssueKind::Units, "unit", &attr),
                }
            }
            units.add_unit_reference(reference);
            skip(reader, &child, empty)?;
        }
        Ok(())
    }

    fn read_component(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        let component = Component::new();
        for attr in self.attributes(element) {
            match attr.local() {
                "name" => component.set_name(attr.value),
                "id" => component.set_id(attr.value),
                _ => self.unexpected_attribute(IssueKind::Component, "component", &attr),
            }
        }
        self.components.push(component.clone());
        if empty {
            return Ok(());
        }

        // Reset variables are resolved once every sibling variable is known.
        let mut resets: Vec<(Reset, Option<String>, Option<String>)> = Vec::new();
        while let Some((child, empty)) = next_child(reader, "component")? {
            match child.local_name().as_ref() {
                b"variable" => {
                    let variable = self.read_variable(&child);
                    component.add_variable(&variable);
                    skip(reader, &child, empty)?;
                }
                b"reset" => {
                    let pending = self.read_reset(reader, &child, empty)?;
                    component.add_reset(&pending.0);
                    resets.push(pending);
                }
                b"math" => {
                    let math = self.capture_math(reader, &child, empty)?;
                    if !component.math().is_empty() {
                        component.append_math("\n");
                    }
                    component.append_math(&math);
                }
                _ => {
                    self.unexpected_element(IssueKind::Component, "component", &child);
                    skip(reader, &child, empty)?;
                }
            }
        }

        for (reset, variable, test_variable) in resets {
            if let Some(name) = variable {
                match component.variable(name.as_str()) {
                    Some(v) => reset.set_variable(&v),
                    None => self.unresolved_reset_variable(&component, &reset, "variable", &name),
                }
            }
            if let Some(name) = test_variable {
                match component.variable(name.as_str()) {
                    Some(v) => reset.set_test_variable(&v),
                    None => self.unresolved_reset_variable(&component, &reset, "test_variable", &name),
                }
            }
        }
        Ok(())
    }

    fn read_variable(&mut self, element: &BytesStart<'_>) -> Variable {
        let variable = Variable::new();
        for attr in self.attributes(element) {
            match attr.local() {
                "name" => variable.set_name(attr.value),
                "id" => variable.set_id(attr.value),
                "units" => variable.set_units_name(attr.value),
                "initial_value" => variable.set_initial_value_str(attr.value),
                "interface" => {
                    if !variable.set_interface_type_str(&attr.value) {
                        self.push_issue(
                            Issue::warning(
                                IssueKind::Variable,
                                format!(
                                    "variable '{}' has an unknown interface type '{}'",
                                    variable.name(),
                                    attr.value
                                ),
                            )
                            .with_item(&variable),
                        );
                    }
                }
                _ => self.unexpected_attribute(IssueKind::Variable, "variable", &attr),
            }
        }
        variable
    }

    fn read_reset(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(Reset, Option<String>, Option<String>), InterchangeError> {
        let reset = Reset::new();
        let mut variable = None;
        let mut test_variable = None;
        for attr in self.attributes(element) {
            match attr.local() {
                "variable" => variable = Some(attr.value),
                "test_variable" => test_variable = Some(attr.value),
                "id" => reset.set_id(attr.value),
                "order" => match attr.value.trim().parse::<i32>() {
                    Ok(order) => reset.set_order(order),
                    Err(_) => self.push_issue(
                        Issue::warning(
                            IssueKind::Reset,
                            format!("reset has a non-integer order '{}'", attr.value),
                        )
                        .with_item(&reset),
                    ),
                },
                _ => self.unexpected_attribute(IssueKind::Reset, "reset", &attr),
            }
        }
        if empty {
            return Ok((reset, variable, test_variable));
        }

        while let Some((child, empty)) = next_child(reader, "reset")? {
            let is_test = match child.local_name().as_ref() {
                b"test_value" => true,
                b"reset_value" => false,
                _ => {
                    self.unexpected_element(IssueKind::Reset, "reset", &child);
                    skip(reader, &child, empty)?;
                    continue;
                }
            };
            let wrapper = if is_test { "test_value" } else { "reset_value" };
            for attr in self.attributes(&child) {
                match attr.local() {
                    "id" if is_test => reset.set_test_value_id(attr.value),
                    "id" => reset.set_reset_value_id(attr.value),
                    _ => self.unexpected_attribute(IssueKind::Reset, wrapper, &attr),
                }
            }
            if empty {
                continue;
            }
            while let Some((math, empty)) = next_child(reader, wrapper)? {
                if math.local_name().as_ref() != b"math" {
                    self.unexpected_element(IssueKind::MathMl, wrapper, &math);
                    skip(reader, &math, empty)?;
                    continue;
                }
                let text = self.capture_math(reader, &math, empty)?;
                let current = if is_test { reset.test_value() } else { reset.reset_value() };
                let separator = if current.is_empty() { "" } else { "\n" };
                let value = format!("{separator}{text}");
                if is_test {
                    reset.append_test_value(&value);
                } else {
                    reset.append_reset_value(&value);
                }
            }
        }
        Ok((reset, variable, test_variable))
    }

    fn read_connection(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        let mut connection = PendingConnection {
            component_1: String::new(),
            component_2: String::new(),
            id: String::new(),
            mappings: Vec::new(),
        };
        for attr in self.attributes(element) {
            match attr.local() {
                "component_1" => connection.component_1 = attr.value,
                "component_2" => connection.component_2 = attr.value,
                "id" => connection.id = attr.value,
                _ => self.unexpected_attribute(IssueKind::Connection, "connection", &attr),
            }
        }

        if !empty {
            while let Some((child, empty)) = next_child(reader, "connection")? {
                if child.local_name().as_ref() != b"map_variables" {
                    self.unexpected_element(IssueKind::Connection, "connection", &child);
                    skip(reader, &child, empty)?;
                    continue;
                }
                let mut mapping = PendingMapping {
                    variable_1: String::new(),
                    variable_2: String::new(),
                    id: String::new(),
                };
                for attr in self.attributes(&child) {
                    match attr.local() {
                        "variable_1" => mapping.variable_1 = attr.value,
                        "variable_2" => mapping.variable_2 = attr.value,
                        "id" => mapping.id = attr.value,
                        _ => self.unexpected_attribute(IssueKind::Connection, "map_variables", &attr),
                    }
                }
                connection.mappings.push(mapping);
                skip(reader, &child, empty)?;
            }
        }
        self.connections.push(connection);
        Ok(())
    }

    fn read_encapsulation(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), InterchangeError> {
        for attr in self.attributes(element) {
            match attr.local() {
                "id" => self.model.set_encapsulation_id(attr.value),
                _ => self.unexpected_attribute(IssueKind::Encapsulation, "encapsulation", &attr),
            }
        }
        if empty {
            return Ok(());
        }
        let roots = self.read_component_refs(reader, "encapsulation")?;
        self.encapsulation.extend(roots);
        Ok(())
    }

    /// Child `<component_ref>` elements of the current element.
    fn read_component_refs(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        parent: &str,
    ) -> Result<Vec<EncapsulationNode>, InterchangeError> {
        let mut nodes = Vec::new();
        while let Some((child, empty)) = next_child(reader, parent)? {
            if child.local_name().as_ref() != b"component_ref" {
                self.unexpected_element(IssueKind::Encapsulation, parent, &child);
                skip(reader, &child, empty)?;
                continue;
            }
            let mut node = EncapsulationNode {
                component: String::new(),
                id: String::new(),
                children: Vec::new(),
            };
            for attr in self.attributes(&child) {
                match attr.local() {
                    "component" => node.component = attr.value,
                    "id" => node.id = attr.value,
                    _ => self.unexpected_attribute(IssueKind::Encapsulation, "component_ref", &attr),
                }
            }
            if !empty {
                node.children = self.read_component_refs(reader, "component_ref")?;
            }
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Raw `<math>` markup from the source, dedented by the indentation of
    /// the line it starts on.
    fn capture_math(
        &mut self,
        reader: &mut Reader<&'s [u8]>,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<String, InterchangeError> {
        let tag_end = reader.buffer_position() as usize;
        let start = self.source[..tag_end].rfind('<').unwrap_or(0);
        let end = if empty {
            tag_end
        } else {
            reader
                .read_to_end(element.to_end().name())
                .map_err(|e| xml_error(reader, e))?;
            reader.buffer_position() as usize
        };
        let width = indentation(self.source, start);
        Ok(dedent(&self.source[start..end], width))
    }

    // ── Linking ─────────────────────────────────────────────────────

    /// First component in document order called `name`.
    fn document_component(&self, name: &str) -> Option<Component> {
        self.components.iter().find(|c| c.name() == name).cloned()
    }

    /// Apply the encapsulation tree; everything not encapsulated becomes a
    /// top-level component in document order.
    fn link_encapsulation(&mut self) {
        let roots = std::mem::take(&mut self.encapsulation);
        let mut links: Vec<(Component, Component)> = Vec::new();
        for root in &roots {
            self.collect_links(None, root, &mut links);
        }

        for component in &self.components {
            if !links.iter().any(|(_, child)| child == component) {
                self.model.add_component(component);
            }
        }

        for (parent, child) in links {
            if child.parent_component().is_some() {
                self.push_issue(
                    Issue::warning(
                        IssueKind::Encapsulation,
                        format!("component '{}' is encapsulated more than once", child.name()),
                    )
                    .with_item(&child),
                );
                continue;
            }
            if !parent.add_component(&child) {
                self.push_issue(
                    Issue::error(
                        IssueKind::Encapsulation,
                        format!(
                            "encapsulating '{}' under '{}' would create a cycle",
                            child.name(),
                            parent.name()
                        ),
                    )
                    .with_item(&child),
                );
                self.model.add_component(&child);
            }
        }
    }

    fn collect_links(
        &mut self,
        parent: Option<&Component>,
        node: &EncapsulationNode,
        links: &mut Vec<(Component, Component)>,
    ) {
        let Some(component) = self.document_component(&node.component) else {
            self.push_issue(Issue::warning(
                IssueKind::Encapsulation,
                format!("component_ref names unknown component '{}'", node.component),
            ));
            for child in &node.children {
                self.collect_links(None, child, links);
            }
            return;
        };
        component.set_encapsulation_id(node.id.as_str());
        if let Some(parent) = parent {
            links.push((parent.clone(), component.clone()));
        }
        for child in &node.children {
            self.collect_links(Some(&component), child, links);
        }
    }

    fn link_connections(&mut self) {
        for connection in std::mem::take(&mut self.connections) {
            let components = (
                self.document_component(&connection.component_1),
                self.document_component(&connection.component_2),
            );
            let (Some(component_1), Some(component_2)) = components else {
                self.push_issue(Issue::error(
                    IssueKind::Connection,
                    format!(
                        "connection between '{}' and '{}' names an unknown component",
                        connection.component_1, connection.component_2
                    ),
                ));
                continue;
            };

            for mapping in &connection.mappings {
                let variable_1 = connected_variable(&component_1, &mapping.variable_1);
                let variable_2 = connected_variable(&component_2, &mapping.variable_2);
                let (Some(variable_1), Some(variable_2)) = (variable_1, variable_2) else {
                    self.push_issue(
                        Issue::error(
                            IssueKind::Connection,
                            format!(
                                "map_variables '{}' and '{}' does not match variables of '{}' and '{}'",
                                mapping.variable_1,
                                mapping.variable_2,
                                connection.component_1,
                                connection.component_2
                            ),
                        )
                        .with_item(&component_1),
                    );
                    continue;
                };
                if !Variable::add_equivalence(&variable_1, &variable_2) {
                    trace!(
                        "equivalence '{}' <-> '{}' not added",
                        variable_1.name(),
                        variable_2.name()
                    );
                    continue;
                }
                if !mapping.id.is_empty() {
                    Variable::set_equivalence_mapping_id(&variable_1, &variable_2, &mapping.id);
                }
                if !connection.id.is_empty() {
                    Variable::set_equivalence_connection_id(&variable_1, &variable_2, &connection.id);
                }
            }
        }
    }

    // ── Issues ──────────────────────────────────────────────────────

    fn push_issue(&mut self, issue: Issue) {
        trace!("{issue}");
        self.issues.push(issue);
    }

    fn namespace_issue(&mut self, description: String) {
        let severity = if self.options.strict_namespace {
            Severity::Error
        } else {
            Severity::Warning
        };
        let mut issue = Issue::warning(IssueKind::Model, description).with_item(&self.model);
        issue.severity = severity;
        self.push_issue(issue);
    }

    fn unexpected_attribute(&mut self, kind: IssueKind, element: &str, attr: &Attr) {
        self.push_issue(Issue::warning(
            kind,
            format!("element '{element}' has an unexpected attribute '{}'", attr.name),
        ));
    }

    fn unexpected_element(&mut self, kind: IssueKind, parent: &str, element: &BytesStart<'_>) {
        let name = element_name(element);
        self.push_issue(Issue::warning(
            kind,
            format!("element '{parent}' has an unexpected child '{name}'"),
        ));
    }

    fn unresolved_reset_variable(&mut self, component: &Component, reset: &Reset, role: &str, name: &str) {
        self.push_issue(
            Issue::warning(
                IssueKind::Reset,
                format!(
                    "reset {role} '{name}' is not a variable of component '{}'",
                    component.name()
                ),
            )
            .with_item(reset),
        );
    }

    /// Unescaped attributes; malformed ones are reported and dropped.
    fn attributes(&mut self, element: &BytesStart<'_>) -> Vec<Attr> {
        let mut attrs = Vec::new();
        for attr in element.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(e) => {
                    self.push_issue(Issue::error(
                        IssueKind::Xml,
                        format!("malformed attribute on '{}': {e}", element_name(element)),
                    ));
                    continue;
                }
            };
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            match attr.unescape_value() {
                Ok(value) => attrs.push(Attr {
                    name,
                    value: value.into_owned(),
                }),
                Err(e) => self.push_issue(Issue::error(
                    IssueKind::Xml,
                    format!("attribute '{name}' could not be unescaped: {e}"),
                )),
            }
        }
        attrs
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn xml_error(reader: &Reader<&[u8]>, e: impl std::fmt::Display) -> InterchangeError {
    InterchangeError::xml(format!(
        "XML parse error at position {}: {e}",
        reader.error_position()
    ))
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Next child element of the current element, or `None` at its end tag.
fn next_child<'s>(
    reader: &mut Reader<&'s [u8]>,
    parent: &str,
) -> Result<Option<(BytesStart<'s>, bool)>, InterchangeError> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => return Ok(Some((e, false))),
            Ok(Event::Empty(e)) => return Ok(Some((e, true))),
            Ok(Event::End(_)) => return Ok(None),
            Ok(Event::Eof) => {
                return Err(InterchangeError::xml(format!(
                    "unexpected end of document inside '{parent}'"
                )));
            }
            Ok(Event::Text(text)) => {
                trace!("ignoring {} bytes of text inside '{parent}'", text.len());
            }
            Ok(_) => {}
            Err(e) => return Err(xml_error(reader, e)),
        }
    }
}

/// Skip the content of a non-empty element.
fn skip(reader: &mut Reader<&[u8]>, element: &BytesStart<'_>, empty: bool) -> Result<(), InterchangeError> {
    if !empty {
        reader
            .read_to_end(element.to_end().name())
            .map_err(|e| xml_error(reader, e))?;
    }
    Ok(())
}

/// Variable `name` of `component`.
///
/// Import placeholders carry no variables of their own, so a mapped name on
/// one of them is created in place.
fn connected_variable(component: &Component, name: &str) -> Option<Variable> {
    if let Some(variable) = component.variable(name) {
        return Some(variable);
    }
    if !component.is_import() || name.is_empty() {
        return None;
    }
    trace!("creating variable '{name}' in imported component '{}'", component.name());
    let variable = Variable::with_name(name);
    component.add_variable(&variable);
    Some(variable)
}

/// Width of the whitespace run between the start of the line and `at`, or
/// zero when other text precedes `at` on that line.
fn indentation(source: &str, at: usize) -> usize {
    let line_start = source[..at].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..at];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix.len()
    } else {
        0
    }
}

/// Strip up to `width` leading blanks from every line after the first.
fn dedent(raw: &str, width: usize) -> String {
    raw.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                return line;
            }
            let blanks = line.len() - line.trim_start_matches([' ', '\t']).len();
            &line[blanks.min(width)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}
