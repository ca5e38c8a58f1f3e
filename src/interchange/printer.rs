//! CellML 2.0 document writer.
//!
//! ## Document Order
//!
//! ```text
//! <model>
//!   <import>*          one per shared ImportSource, first appearance order
//!   <units>*           local units, storage order
//!   <component>*       local components, depth-first pre-order
//!   <connection>*      one per component pair, first discovery order
//!   <encapsulation>?   component_ref tree of the hierarchy
//! </model>
//! ```
//!
//! The encapsulation hierarchy is flattened in the document and restated
//! by the `<encapsulation>` element, so a parsed document rebuilds the same
//! parent/child links.

use std::io::{Cursor, Write};
use std::rc::Rc;

use indexmap::IndexMap;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::InterchangeError;
use super::cellml_xml::namespace;
use super::options::PrinterOptions;
use crate::entity::{
    Component, ImportSource, InterfaceType, Model, Reset, Units, Variable, format_number,
};

/// Serializes a [`Model`] to CellML 2.0 text.
///
/// Printing never validates: whatever the graph holds is written,
/// including incomplete resets and dangling names.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    options: PrinterOptions,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// Print `model` as a complete document with a trailing newline.
    pub fn print_model(&self, model: &Model) -> Result<String, InterchangeError> {
        let bytes = ModelWriter::new(&self.options).write(model)?;
        String::from_utf8(bytes).map_err(|e| InterchangeError::xml(format!("Invalid UTF-8 output: {e}")))
    }
}

/// Components and units printed inside one `<import>` element.
struct ImportGroup {
    source: ImportSource,
    components: Vec<Component>,
    units: Vec<Units>,
}

/// Equivalence edges between one pair of components.
struct Connection {
    component_1: Component,
    component_2: Component,
    id: String,
    mappings: Vec<(Variable, Variable)>,
}

struct ModelWriter<'o> {
    options: &'o PrinterOptions,
    writer: Writer<Cursor<Vec<u8>>>,
    depth: usize,
}

impl<'o> ModelWriter<'o> {
    fn new(options: &'o PrinterOptions) -> Self {
        Self {
            options,
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent_width),
            depth: 0,
        }
    }

    fn write(mut self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let imports = import_groups(model);
        let units: Vec<Units> = model.all_units().into_iter().filter(|u| !u.is_import()).collect();
        let components: Vec<Component> = model
            .all_components()
            .into_iter()
            .filter(|c| !c.is_import())
            .collect();

        let document_order: Vec<Component> = imports
            .values()
            .flat_map(|group| group.components.iter().cloned())
            .chain(components.iter().cloned())
            .collect();
        let connections = connections(&document_order);
        let hierarchy: Vec<Component> = model
            .components()
            .into_iter()
            .filter(|c| c.component_count() > 0)
            .collect();

        debug!(
            imports = imports.len(),
            units = units.len(),
            components = components.len(),
            connections = connections.len(),
            "printing model '{}'",
            model.name()
        );

        let mut root = BytesStart::new("model");
        root.push_attribute(("xmlns", namespace::CELLML_2_0));
        push_attr(&mut root, "name", &model.name());
        push_attr(&mut root, "id", &model.id());

        let has_children = !imports.is_empty()
            || !units.is_empty()
            || !components.is_empty()
            || !connections.is_empty()
            || !hierarchy.is_empty();
        if !has_children {
            self.empty(root)?;
        } else {
            self.open(root)?;
            for group in imports.values() {
                self.write_import(group)?;
            }
            for u in &units {
                self.write_units(u)?;
            }
            for component in &components {
                self.write_component(component)?;
            }
            for connection in &connections {
                self.write_connection(connection)?;
            }
            if !hierarchy.is_empty() {
                self.write_encapsulation(model, &hierarchy)?;
            }
            self.close("model")?;
        }

        let mut output = self.writer.into_inner().into_inner();
        output.push(b'\n');
        Ok(output)
    }

    fn write_import(&mut self, group: &ImportGroup) -> Result<(), InterchangeError> {
        let mut import = BytesStart::new("import");
        push_attr(&mut import, "xlink:href", &group.source.url());
        import.push_attribute(("xmlns:xlink", namespace::XLINK));
        push_attr(&mut import, "id", &group.source.id());
        self.open(import)?;

        for component in &group.components {
            let mut tag = BytesStart::new("component");
            push_attr(&mut tag, "component_ref", &component.import_reference());
            push_attr(&mut tag, "name", &component.name());
            push_attr(&mut tag, "id", &component.id());
            self.empty(tag)?;
        }
        for u in &group.units {
            let mut tag = BytesStart::new("units");
            push_attr(&mut tag, "units_ref", &u.import_reference());
            push_attr(&mut tag, "name", &u.name());
            push_attr(&mut tag, "id", &u.id());
            self.empty(tag)?;
        }

        self.close("import")
    }

    fn write_units(&mut self, units: &Units) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("units");
        push_attr(&mut tag, "name", &units.name());
        push_attr(&mut tag, "id", &units.id());

        let references = units.unit_references();
        if references.is_empty() {
            return self.empty(tag);
        }

        self.open(tag)?;
        for reference in &references {
            let mut unit = BytesStart::new("unit");
            if let Some(exponent) = reference.exponent {
                unit.push_attribute(("exponent", format_number(exponent).as_str()));
            }
            if let Some(multiplier) = reference.multiplier {
                unit.push_attribute(("multiplier", format_number(multiplier).as_str()));
            }
            if let Some(prefix) = &reference.prefix {
                unit.push_attribute(("prefix", prefix.to_string().as_str()));
            }
            push_attr(&mut unit, "units", &reference.reference);
            push_attr(&mut unit, "id", &reference.id);
            self.empty(unit)?;
        }
        self.close("units")
    }

    fn write_component(&mut self, component: &Component) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("component");
        push_attr(&mut tag, "name", &component.name());
        push_attr(&mut tag, "id", &component.id());

        let variables = component.variables();
        let resets = component.resets();
        let math = component.math();
        if variables.is_empty() && resets.is_empty() && math.trim().is_empty() {
            return self.empty(tag);
        }

        self.open(tag)?;
        for variable in &variables {
            self.write_variable(variable)?;
        }
        for reset in &resets {
            self.write_reset(reset)?;
        }
        self.write_math(&math)?;
        self.close("component")
    }

    fn write_variable(&mut self, variable: &Variable) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("variable");
        push_attr(&mut tag, "name", &variable.name());
        push_attr(&mut tag, "units", &variable.units_name());
        push_attr(&mut tag, "initial_value", &variable.initial_value());
        let interface = variable.interface_type();
        if interface != InterfaceType::None {
            tag.push_attribute(("interface", interface.as_str()));
        }
        push_attr(&mut tag, "id", &variable.id());
        self.empty(tag)
    }

    fn write_reset(&mut self, reset: &Reset) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("reset");
        if let Some(variable) = reset.variable() {
            push_attr(&mut tag, "variable", &variable.name());
        }
        if let Some(variable) = reset.test_variable() {
            push_attr(&mut tag, "test_variable", &variable.name());
        }
        if let Some(order) = reset.order() {
            tag.push_attribute(("order", order.to_string().as_str()));
        }
        push_attr(&mut tag, "id", &reset.id());

        let test_value = reset.test_value();
        let test_value_id = reset.test_value_id();
        let reset_value = reset.reset_value();
        let reset_value_id = reset.reset_value_id();
        let has_test = !test_value.trim().is_empty() || !test_value_id.is_empty();
        let has_reset = !reset_value.trim().is_empty() || !reset_value_id.is_empty();
        if !has_test && !has_reset {
            return self.empty(tag);
        }

        self.open(tag)?;
        if has_test {
            self.write_math_wrapper("test_value", &test_value_id, &test_value)?;
        }
        if has_reset {
            self.write_math_wrapper("reset_value", &reset_value_id, &reset_value)?;
        }
        self.close("reset")
    }

    /// `<test_value>` or `<reset_value>` around a math blob.
    fn write_math_wrapper(&mut self, name: &'static str, id: &str, math: &str) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new(name);
        push_attr(&mut tag, "id", id);
        if math.trim().is_empty() {
            return self.empty(tag);
        }
        self.open(tag)?;
        self.write_math(math)?;
        self.close(name)
    }

    fn write_connection(&mut self, connection: &Connection) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("connection");
        push_attr(&mut tag, "component_1", &connection.component_1.name());
        push_attr(&mut tag, "component_2", &connection.component_2.name());
        push_attr(&mut tag, "id", &connection.id);
        self.open(tag)?;

        for (variable_1, variable_2) in &connection.mappings {
            let mut map = BytesStart::new("map_variables");
            push_attr(&mut map, "variable_1", &variable_1.name());
            push_attr(&mut map, "variable_2", &variable_2.name());
            push_attr(&mut map, "id", &Variable::equivalence_mapping_id(variable_1, variable_2));
            self.empty(map)?;
        }

        self.close("connection")
    }

    fn write_encapsulation(&mut self, model: &Model, roots: &[Component]) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("encapsulation");
        push_attr(&mut tag, "id", &model.encapsulation_id());
        self.open(tag)?;
        for component in roots {
            self.write_component_ref(component)?;
        }
        self.close("encapsulation")
    }

    fn write_component_ref(&mut self, component: &Component) -> Result<(), InterchangeError> {
        let mut tag = BytesStart::new("component_ref");
        push_attr(&mut tag, "component", &component.name());
        push_attr(&mut tag, "id", &component.encapsulation_id());

        let children = component.components();
        if children.is_empty() {
            return self.empty(tag);
        }
        self.open(tag)?;
        for child in &children {
            self.write_component_ref(child)?;
        }
        self.close("component_ref")
    }

    /// Raw math markup, one line per output line at the current child
    /// indentation. Blank lines stay empty.
    fn write_math(&mut self, math: &str) -> Result<(), InterchangeError> {
        if math.trim().is_empty() {
            return Ok(());
        }
        let indent = self.options.indent(self.depth);
        let out = self.writer.get_mut();
        for line in math.lines() {
            if line.trim().is_empty() {
                out.write_all(b"\n")?;
            } else {
                write!(out, "\n{indent}{line}")?;
            }
        }
        Ok(())
    }

    fn open(&mut self, tag: BytesStart<'_>) -> Result<(), InterchangeError> {
        self.event(Event::Start(tag))?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), InterchangeError> {
        self.depth = self.depth.saturating_sub(1);
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, tag: BytesStart<'_>) -> Result<(), InterchangeError> {
        self.event(Event::Empty(tag))
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), InterchangeError> {
        self.writer
            .write_event(event)
            .map_err(|e| InterchangeError::xml(format!("Write error: {e}")))
    }
}

/// Attribute that is omitted when its value is empty.
fn push_attr(tag: &mut BytesStart<'_>, key: &str, value: &str) {
    if !value.is_empty() {
        tag.push_attribute((key, value));
    }
}

/// Import placeholders grouped by shared source, in first appearance order:
/// components breadth-first, then model units.
fn import_groups(model: &Model) -> IndexMap<usize, ImportGroup> {
    let mut groups: IndexMap<usize, ImportGroup> = IndexMap::new();
    let group = |groups: &mut IndexMap<usize, ImportGroup>, source: ImportSource| -> usize {
        let key = source.key();
        groups.entry(key).or_insert_with(|| ImportGroup {
            source,
            components: Vec::new(),
            units: Vec::new(),
        });
        key
    };

    for component in model.components_breadth_first() {
        if let Some(source) = component.import_source() {
            let key = group(&mut groups, source);
            if let Some(entry) = groups.get_mut(&key) {
                entry.components.push(component);
            }
        }
    }
    for units in model.all_units() {
        if let Some(source) = units.import_source() {
            let key = group(&mut groups, source);
            if let Some(entry) = groups.get_mut(&key) {
                entry.units.push(units);
            }
        }
    }
    groups
}

fn variable_key(variable: &Variable) -> usize {
    Rc::as_ptr(&variable.0) as usize
}

/// Equivalence edges grouped per unordered component pair, in discovery
/// order over `components`.
fn connections(components: &[Component]) -> Vec<Connection> {
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut pairs: IndexMap<(usize, usize), Connection> = IndexMap::new();

    for component in components {
        for variable in component.variables() {
            for equivalent in variable.equivalents() {
                let (a, b) = (variable_key(&variable), variable_key(&equivalent));
                if !seen.insert((a.min(b), a.max(b))) {
                    continue;
                }
                let Some(other) = equivalent.parent() else {
                    trace!("skipping equivalence to orphan variable '{}'", equivalent.name());
                    continue;
                };
                let (c1, c2) = (component.key(), other.key());
                let connection = pairs.entry((c1.min(c2), c1.max(c2))).or_insert_with(|| Connection {
                    component_1: component.clone(),
                    component_2: other.clone(),
                    id: String::new(),
                    mappings: Vec::new(),
                });
                if connection.id.is_empty() {
                    connection.id = Variable::equivalence_connection_id(&variable, &equivalent);
                }
                // Keep variable_1 on the component_1 side.
                if connection.component_1 == *component {
                    connection.mappings.push((variable.clone(), equivalent));
                } else {
                    connection.mappings.push((equivalent, variable.clone()));
                }
            }
        }
    }
    pairs.into_values().collect()
}
