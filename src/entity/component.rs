//! Components: the containers for variables, resets, maths and child
//! components.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::import_source::{ImportReference, ImportSource};
use super::locator::{Child, Locator, position, replace_child, take_child};
use super::model::{Model, ModelData};
use super::reset::Reset;
use super::variable::Variable;

/// Weak back-reference from a component to whatever owns it.
#[derive(Clone)]
pub(crate) enum WeakParent {
    Model(Weak<RefCell<ModelData>>),
    Component(Weak<RefCell<ComponentData>>),
}

impl WeakParent {
    fn upgrade(&self) -> Option<ParentRef> {
        match self {
            Self::Model(model) => model.upgrade().map(|m| ParentRef::Model(Model(m))),
            Self::Component(component) => component
                .upgrade()
                .map(|c| ParentRef::Component(Component(c))),
        }
    }
}

/// The owner of a component: the model (top level) or another component
/// (encapsulation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParentRef {
    Model(Model),
    Component(Component),
}

#[derive(Default)]
pub(crate) struct ComponentData {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) encapsulation_id: String,
    pub(crate) variables: Vec<Variable>,
    pub(crate) resets: Vec<Reset>,
    pub(crate) components: Vec<Component>,
    pub(crate) math: String,
    pub(crate) import: Option<ImportReference>,
    pub(crate) parent: Option<WeakParent>,
}

/// A named container of variables, resets, maths and child components.
///
/// An imported component is a placeholder for a component defined in
/// another document; it is printed as an `<import>` entry and never
/// expanded.
#[derive(Clone)]
pub struct Component(pub(crate) Rc<RefCell<ComponentData>>);

impl Component {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ComponentData::default())))
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let component = Self::new();
        component.set_name(name);
        component
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

    /// Id of the `component_ref` naming this component in the encapsulation.
    pub fn encapsulation_id(&self) -> String {
        self.0.borrow().encapsulation_id.clone()
    }

    pub fn set_encapsulation_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().encapsulation_id = id.into();
    }

    // ── Parent ──────────────────────────────────────────────────────

    pub fn parent(&self) -> Option<ParentRef> {
        self.0.borrow().parent.as_ref().and_then(WeakParent::upgrade)
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// The encapsulating component, when the parent is a component.
    pub fn parent_component(&self) -> Option<Component> {
        match self.parent()? {
            ParentRef::Component(component) => Some(component),
            ParentRef::Model(_) => None,
        }
    }

    /// The model at the root of this component's encapsulation chain.
    pub fn model(&self) -> Option<Model> {
        match self.parent()? {
            ParentRef::Model(model) => Some(model),
            ParentRef::Component(component) => component.model(),
        }
    }

    pub(crate) fn set_parent(&self, parent: WeakParent) {
        self.0.borrow_mut().parent = Some(parent);
    }

    /// Remove this component from its owner, if any.
    pub fn detach(&self) {
        match self.parent() {
            Some(ParentRef::Model(model)) => {
                model.remove_component(self);
            }
            Some(ParentRef::Component(parent)) => {
                parent.remove_component(self);
            }
            None => {}
        }
        self.clear_parent();
    }

    /// Whether `other` is this component or one of its encapsulating
    /// ancestors.
    fn is_self_or_ancestor(&self, other: &Component) -> bool {
        let mut current = Some(self.clone());
        while let Some(component) = current {
            if component == *other {
                return true;
            }
            current = component.parent_component();
        }
        false
    }

    // ── Variables ───────────────────────────────────────────────────

    /// Append `variable`, moving it out of any component that owns it.
    pub fn add_variable(&self, variable: &Variable) {
        variable.detach();
        self.0.borrow_mut().variables.push(variable.clone());
        variable.set_parent(self);
    }

    pub fn variable<'a>(&self, locator: impl Into<Locator<'a, Variable>>) -> Option<Variable> {
        let data = self.0.borrow();
        let index = position(&locator.into(), &data.variables)?;
        Some(data.variables[index].clone())
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.0.borrow().variables.clone()
    }

    pub fn variable_count(&self) -> usize {
        self.0.borrow().variables.len()
    }

    pub fn has_variable<'a>(&self, locator: impl Into<Locator<'a, Variable>>) -> bool {
        position(&locator.into(), &self.0.borrow().variables).is_some()
    }

    pub fn remove_variable<'a>(&self, locator: impl Into<Locator<'a, Variable>>) -> bool {
        self.take_variable(locator).is_some()
    }

    /// Detach the addressed variable and hand it to the caller.
    pub fn take_variable<'a>(&self, locator: impl Into<Locator<'a, Variable>>) -> Option<Variable> {
        let variable = take_child(&mut self.0.borrow_mut().variables, locator.into())?;
        variable.clear_parent();
        Some(variable)
    }

    pub fn replace_variable<'a>(
        &self,
        locator: impl Into<Locator<'a, Variable>>,
        replacement: &Variable,
    ) -> bool {
        replace_child(
            &self.0,
            |data: &mut ComponentData| &mut data.variables,
            locator.into(),
            replacement,
            Variable::detach,
            |variable| variable.set_parent(self),
        )
    }

    pub fn remove_all_variables(&self) {
        let variables = std::mem::take(&mut self.0.borrow_mut().variables);
        for variable in variables {
            variable.clear_parent();
        }
    }

    // ── Resets ──────────────────────────────────────────────────────

    pub fn add_reset(&self, reset: &Reset) {
        reset.detach();
        self.0.borrow_mut().resets.push(reset.clone());
        reset.set_parent(self);
    }

    pub fn reset<'a>(&self, locator: impl Into<Locator<'a, Reset>>) -> Option<Reset> {
        let data = self.0.borrow();
        let index = position(&locator.into(), &data.resets)?;
        Some(data.resets[index].clone())
    }

    pub fn resets(&self) -> Vec<Reset> {
        self.0.borrow().resets.clone()
    }

    pub fn reset_count(&self) -> usize {
        self.0.borrow().resets.len()
    }

    pub fn has_reset(&self, reset: &Reset) -> bool {
        self.0.borrow().resets.contains(reset)
    }

    pub fn remove_reset<'a>(&self, locator: impl Into<Locator<'a, Reset>>) -> bool {
        self.take_reset(locator).is_some()
    }

    pub fn take_reset<'a>(&self, locator: impl Into<Locator<'a, Reset>>) -> Option<Reset> {
        let reset = take_child(&mut self.0.borrow_mut().resets, locator.into())?;
        reset.clear_parent();
        Some(reset)
    }

    pub fn replace_reset<'a>(&self, locator: impl Into<Locator<'a, Reset>>, replacement: &Reset) -> bool {
        replace_child(
            &self.0,
            |data: &mut ComponentData| &mut data.resets,
            locator.into(),
            replacement,
            Reset::detach,
            |reset| reset.set_parent(self),
        )
    }

    pub fn remove_all_resets(&self) {
        let resets = std::mem::take(&mut self.0.borrow_mut().resets);
        for reset in resets {
            reset.clear_parent();
        }
    }

    // ── Child components ────────────────────────────────────────────

    /// Encapsulate `component` inside this one, moving it out of its
    /// current owner.
    ///
    /// Returns `false` without changes when `component` is this component
    /// or one of its ancestors.
    pub fn add_component(&self, component: &Component) -> bool {
        if self.is_self_or_ancestor(component) {
            tracing::debug!(
                parent = %self.name(),
                child = %component.name(),
                "refusing to encapsulate a component inside itself"
            );
            return false;
        }
        component.detach();
        self.0.borrow_mut().components.push(component.clone());
        component.set_parent(WeakParent::Component(Rc::downgrade(&self.0)));
        true
    }

    pub fn component<'a>(&self, locator: impl Into<Locator<'a, Component>>) -> Option<Component> {
        let data = self.0.borrow();
        let index = position(&locator.into(), &data.components)?;
        Some(data.components[index].clone())
    }

    pub fn components(&self) -> Vec<Component> {
        self.0.borrow().components.clone()
    }

    pub fn component_count(&self) -> usize {
        self.0.borrow().components.len()
    }

    /// Whether a direct child is called `name`.
    pub fn contains_component(&self, name: &str) -> bool {
        position(&Locator::Name(name), &self.0.borrow().components).is_some()
    }

    pub fn remove_component<'a>(&self, locator: impl Into<Locator<'a, Component>>) -> bool {
        self.take_component(locator).is_some()
    }

    pub fn take_component<'a>(&self, locator: impl Into<Locator<'a, Component>>) -> Option<Component> {
        let component = take_child(&mut self.0.borrow_mut().components, locator.into())?;
        component.clear_parent();
        Some(component)
    }

    /// Put `replacement` where the addressed child is, detaching the old
    /// child. Returns `false` without changes when nothing is addressed.
    pub fn replace_component<'a>(
        &self,
        locator: impl Into<Locator<'a, Component>>,
        replacement: &Component,
    ) -> bool {
        if self.is_self_or_ancestor(replacement) {
            return false;
        }
        let weak = Rc::downgrade(&self.0);
        replace_child(
            &self.0,
            |data: &mut ComponentData| &mut data.components,
            locator.into(),
            replacement,
            Component::detach,
            |component| component.set_parent(WeakParent::Component(weak)),
        )
    }

    pub fn remove_all_components(&self) {
        let components = std::mem::take(&mut self.0.borrow_mut().components);
        for component in components {
            component.clear_parent();
        }
    }

    /// First descendant (depth-first, excluding self) called `name`.
    pub fn find_component(&self, name: &str) -> Option<Component> {
        for child in self.components() {
            if child.name() == name {
                return Some(child);
            }
            if let Some(found) = child.find_component(name) {
                return Some(found);
            }
        }
        None
    }

    /// This component followed by all descendants in depth-first pre-order.
    pub(crate) fn push_depth_first(&self, out: &mut Vec<Component>) {
        out.push(self.clone());
        for child in self.components() {
            child.push_depth_first(out);
        }
    }

    // ── Maths ───────────────────────────────────────────────────────

    /// MathML content, stored verbatim.
    pub fn math(&self) -> String {
        self.0.borrow().math.clone()
    }

    pub fn set_math(&self, math: impl Into<String>) {
        self.0.borrow_mut().math = math.into();
    }

    pub fn append_math(&self, math: &str) {
        self.0.borrow_mut().math.push_str(math);
    }

    pub fn clear_math(&self) {
        self.0.borrow_mut().math.clear();
    }

    // ── Import ──────────────────────────────────────────────────────

    /// Make this component a placeholder for `reference` in `source`.
    ///
    /// Local content is kept but not printed while the import is set.
    pub fn set_source_component(&self, source: &ImportSource, reference: impl Into<String>) {
        self.0.borrow_mut().import = Some(ImportReference::new(source, reference));
    }

    pub fn is_import(&self) -> bool {
        self.0.borrow().import.is_some()
    }

    pub fn import(&self) -> Option<ImportReference> {
        self.0.borrow().import.clone()
    }

    pub fn import_source(&self) -> Option<ImportSource> {
        self.0.borrow().import.as_ref().map(|i| i.source().clone())
    }

    pub fn import_reference(&self) -> String {
        self.0
            .borrow()
            .import
            .as_ref()
            .map(|i| i.reference().to_string())
            .unwrap_or_default()
    }

    pub fn clear_import(&self) {
        self.0.borrow_mut().import = None;
    }

    /// Stable address used as a grouping key while printing.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Component {}

impl Child for Component {
    fn matches_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Component")
            .field("name", &data.name)
            .field("id", &data.id)
            .field("variables", &data.variables.len())
            .field("resets", &data.resets.len())
            .field("components", &data.components)
            .field("import", &data.import)
            .finish()
    }
}
