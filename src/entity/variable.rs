//! Variables and the equivalence relation between them.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use super::ValueError;
use super::component::{Component, ComponentData};
use super::locator::Child;
use super::units::Units;

/// Visibility of a variable across the encapsulation hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    #[default]
    None,
    Public,
    Private,
    PublicAndPrivate,
}

impl InterfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Public => "public",
            Self::Private => "private",
            Self::PublicAndPrivate => "public_and_private",
        }
    }
}

impl FromStr for InterfaceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "public_and_private" => Ok(Self::PublicAndPrivate),
            other => Err(ValueError::InterfaceType(other.to_string())),
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The units a variable is measured in.
///
/// Resolving a name to a [`Units`] entity is left to analysis code; the
/// variable stores whichever form it was given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableUnits {
    Named(String),
    Resolved(Units),
}

impl VariableUnits {
    pub fn name(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Resolved(units) => units.name(),
        }
    }
}

/// One side of an undirected equivalence edge.
pub(crate) struct Equivalence {
    pub(crate) variable: Weak<RefCell<VariableData>>,
    pub(crate) mapping_id: String,
    pub(crate) connection_id: String,
}

impl Equivalence {
    fn new(variable: &Variable) -> Self {
        Self {
            variable: Rc::downgrade(&variable.0),
            mapping_id: String::new(),
            connection_id: String::new(),
        }
    }

    fn points_at(&self, variable: &Variable) -> bool {
        self.variable.strong_count() > 0 && std::ptr::eq(self.variable.as_ptr(), Rc::as_ptr(&variable.0))
    }
}

#[derive(Default)]
pub(crate) struct VariableData {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) units: Option<VariableUnits>,
    pub(crate) initial_value: String,
    pub(crate) interface_type: InterfaceType,
    pub(crate) equivalences: Vec<Equivalence>,
    pub(crate) parent: Option<Weak<RefCell<ComponentData>>>,
}

/// A named quantity inside a component.
#[derive(Clone)]
pub struct Variable(pub(crate) Rc<RefCell<VariableData>>);

impl Variable {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(VariableData::default())))
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let variable = Self::new();
        variable.set_name(name);
        variable
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().name = name.into();
    }

    pub fn id(&self) -> String {
        self.0.borrow().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().id = id.into();
    }

    /// The component this variable belongs to, if any.
    pub fn parent(&self) -> Option<Component> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Component)
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    pub(crate) fn set_parent(&self, component: &Component) {
        self.0.borrow_mut().parent = Some(Rc::downgrade(&component.0));
    }

    /// Remove this variable from its owning component, if any.
    pub fn detach(&self) {
        if let Some(component) = self.parent() {
            component.remove_variable(self);
        }
        self.clear_parent();
    }

    // ── Units ───────────────────────────────────────────────────────

    pub fn units(&self) -> Option<VariableUnits> {
        self.0.borrow().units.clone()
    }

    /// Name of the units, or an empty string when unset.
    pub fn units_name(&self) -> String {
        self.0
            .borrow()
            .units
            .as_ref()
            .map(VariableUnits::name)
            .unwrap_or_default()
    }

    pub fn set_units(&self, units: &Units) {
        self.0.borrow_mut().units = Some(VariableUnits::Resolved(units.clone()));
    }

    /// Set the units by name. An empty name clears the units.
    pub fn set_units_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.0.borrow_mut().units = (!name.is_empty()).then_some(VariableUnits::Named(name));
    }

    pub fn clear_units(&self) {
        self.0.borrow_mut().units = None;
    }

    // ── Initial value ───────────────────────────────────────────────

    /// Initial value as written: a number or the name of another variable.
    pub fn initial_value(&self) -> String {
        self.0.borrow().initial_value.clone()
    }

    pub fn set_initial_value(&self, value: f64) {
        self.0.borrow_mut().initial_value = super::format_number(value);
    }

    /// Stored verbatim; the caller decides whether it is a literal or a name.
    pub fn set_initial_value_str(&self, value: impl Into<String>) {
        self.0.borrow_mut().initial_value = value.into();
    }

    /// Initialise from another variable, stored by its current name.
    pub fn set_initial_value_variable(&self, variable: &Variable) {
        let name = variable.name();
        self.0.borrow_mut().initial_value = name;
    }

    pub fn clear_initial_value(&self) {
        self.0.borrow_mut().initial_value.clear();
    }

    // ── Interface ───────────────────────────────────────────────────

    pub fn interface_type(&self) -> InterfaceType {
        self.0.borrow().interface_type
    }

    pub fn set_interface_type(&self, interface_type: InterfaceType) {
        self.0.borrow_mut().interface_type = interface_type;
    }

    /// Set the interface from its textual form.
    ///
    /// Returns `false` and leaves the current value in place when `value`
    /// is not a recognised interface type.
    pub fn set_interface_type_str(&self, value: &str) -> bool {
        match value.parse::<InterfaceType>() {
            Ok(interface_type) => {
                self.set_interface_type(interface_type);
                true
            }
            Err(err) => {
                tracing::debug!(variable = %self.name(), "{err}");
                false
            }
        }
    }

    // ── Equivalences ────────────────────────────────────────────────

    /// Make `a` and `b` equivalent.
    ///
    /// Returns `false` for a self-equivalence or an existing edge.
    pub fn add_equivalence(a: &Variable, b: &Variable) -> bool {
        if a == b || a.has_equivalent(b) {
            return false;
        }
        a.0.borrow_mut().equivalences.push(Equivalence::new(b));
        if !b.has_equivalent(a) {
            b.0.borrow_mut().equivalences.push(Equivalence::new(a));
        }
        true
    }

    /// Remove the edge between `a` and `b` from both sides.
    pub fn remove_equivalence(a: &Variable, b: &Variable) -> bool {
        let removed = a.drop_edge_to(b);
        b.drop_edge_to(a);
        removed
    }

    pub fn add_equivalent(&self, other: &Variable) -> bool {
        Self::add_equivalence(self, other)
    }

    pub fn remove_equivalent(&self, other: &Variable) -> bool {
        Self::remove_equivalence(self, other)
    }

    pub fn has_equivalent(&self, other: &Variable) -> bool {
        self.0
            .borrow()
            .equivalences
            .iter()
            .any(|edge| edge.points_at(other))
    }

    /// Number of live equivalence edges.
    pub fn equivalent_count(&self) -> usize {
        self.0
            .borrow()
            .equivalences
            .iter()
            .filter(|edge| edge.variable.strong_count() > 0)
            .count()
    }

    pub fn equivalent(&self, index: usize) -> Option<Variable> {
        self.equivalents().into_iter().nth(index)
    }

    /// Live equivalent variables in the order the edges were added.
    pub fn equivalents(&self) -> Vec<Variable> {
        self.0
            .borrow()
            .equivalences
            .iter()
            .filter_map(|edge| edge.variable.upgrade().map(Variable))
            .collect()
    }

    /// Remove every edge touching this variable, on both sides.
    pub fn remove_all_equivalences(&self) {
        for other in self.equivalents() {
            other.drop_edge_to(self);
        }
        self.0.borrow_mut().equivalences.clear();
    }

    /// Set the `map_variables` id carried by the edge `a`–`b`.
    ///
    /// Returns `false` when the variables are not equivalent.
    pub fn set_equivalence_mapping_id(a: &Variable, b: &Variable, id: &str) -> bool {
        Self::update_edge(a, b, |edge| edge.mapping_id = id.to_string())
    }

    pub fn equivalence_mapping_id(a: &Variable, b: &Variable) -> String {
        a.edge_field(b, |edge| edge.mapping_id.clone())
    }

    /// Set the `connection` id carried by the edge `a`–`b`.
    pub fn set_equivalence_connection_id(a: &Variable, b: &Variable, id: &str) -> bool {
        Self::update_edge(a, b, |edge| edge.connection_id = id.to_string())
    }

    pub fn equivalence_connection_id(a: &Variable, b: &Variable) -> String {
        a.edge_field(b, |edge| edge.connection_id.clone())
    }

    fn drop_edge_to(&self, other: &Variable) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.equivalences.len();
        data.equivalences.retain(|edge| !edge.points_at(other));
        data.equivalences.len() != before
    }

    fn update_edge(a: &Variable, b: &Variable, update: impl Fn(&mut Equivalence)) -> bool {
        if a == b || !a.has_equivalent(b) {
            return false;
        }
        for (this, other) in [(a, b), (b, a)] {
            let mut data = this.0.borrow_mut();
            if let Some(edge) = data.equivalences.iter_mut().find(|e| e.points_at(other)) {
                update(edge);
            }
        }
        true
    }

    fn edge_field(&self, other: &Variable, field: impl Fn(&Equivalence) -> String) -> String {
        self.0
            .borrow()
            .equivalences
            .iter()
            .find(|edge| edge.points_at(other))
            .map(field)
            .unwrap_or_default()
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Variable {}

impl Child for Variable {
    fn matches_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Variable")
            .field("name", &data.name)
            .field("id", &data.id)
            .field("units", &data.units.as_ref().map(VariableUnits::name))
            .field("initial_value", &data.initial_value)
            .field("interface_type", &data.interface_type)
            .finish()
    }
}
