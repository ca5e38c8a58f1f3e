//! The model: root of the entity graph.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::component::{Component, WeakParent};
use super::import_source::ImportSource;
use super::locator::{Child, Locator, position, replace_child, take_child};
use super::units::Units;

#[derive(Default)]
pub(crate) struct ModelData {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) encapsulation_id: String,
    pub(crate) units: Vec<Units>,
    pub(crate) components: Vec<Component>,
}

/// A CellML model: top-level units and the roots of the encapsulation
/// hierarchy.
///
/// ```ignore
/// let model = Model::with_name("beeler_reuter");
/// let membrane = Component::with_name("membrane");
/// membrane.add_variable(&Variable::with_name("V"));
/// model.add_component(&membrane);
/// let text = Printer::new().print_model(&model)?;
/// ```
#[derive(Clone)]
pub struct Model(pub(crate) Rc<RefCell<ModelData>>);

impl Model {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ModelData::default())))
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let model = Self::new();
        model.set_name(name);
        model
    }

    /// Model name; empty means unnamed and is printed without a `name`
    /// attribute.
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

    /// Id of the `<encapsulation>` element.
    pub fn encapsulation_id(&self) -> String {
        self.0.borrow().encapsulation_id.clone()
    }

    pub fn set_encapsulation_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().encapsulation_id = id.into();
    }

    // ── Components ──────────────────────────────────────────────────

    /// Append a top-level component, moving it out of its current owner.
    pub fn add_component(&self, component: &Component) {
        component.detach();
        self.0.borrow_mut().components.push(component.clone());
        component.set_parent(WeakParent::Model(Rc::downgrade(&self.0)));
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

    /// Whether a top-level component is called `name`.
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

    pub fn replace_component<'a>(
        &self,
        locator: impl Into<Locator<'a, Component>>,
        replacement: &Component,
    ) -> bool {
        let weak = Rc::downgrade(&self.0);
        replace_child(
            &self.0,
            |data: &mut ModelData| &mut data.components,
            locator.into(),
            replacement,
            Component::detach,
            |component| component.set_parent(WeakParent::Model(weak)),
        )
    }

    pub fn remove_all_components(&self) {
        let components = std::mem::take(&mut self.0.borrow_mut().components);
        for component in components {
            component.clear_parent();
        }
    }

    /// First component anywhere in the encapsulation hierarchy called
    /// `name`, searched depth-first.
    pub fn find_component(&self, name: &str) -> Option<Component> {
        self.all_components()
            .into_iter()
            .find(|component| component.name() == name)
    }

    /// Every component in depth-first pre-order.
    pub fn all_components(&self) -> Vec<Component> {
        let mut out = Vec::new();
        for component in self.components() {
            component.push_depth_first(&mut out);
        }
        out
    }

    /// Every component level by level, top-level components first.
    pub fn components_breadth_first(&self) -> Vec<Component> {
        let mut out = Vec::new();
        let mut queue: VecDeque<Component> = self.components().into();
        while let Some(component) = queue.pop_front() {
            queue.extend(component.components());
            out.push(component);
        }
        out
    }

    // ── Units ───────────────────────────────────────────────────────

    pub fn add_units(&self, units: &Units) {
        units.detach();
        self.0.borrow_mut().units.push(units.clone());
        units.set_parent(self);
    }

    pub fn units<'a>(&self, locator: impl Into<Locator<'a, Units>>) -> Option<Units> {
        let data = self.0.borrow();
        let index = position(&locator.into(), &data.units)?;
        Some(data.units[index].clone())
    }

    pub fn all_units(&self) -> Vec<Units> {
        self.0.borrow().units.clone()
    }

    pub fn units_count(&self) -> usize {
        self.0.borrow().units.len()
    }

    pub fn contains_units(&self, name: &str) -> bool {
        position(&Locator::Name(name), &self.0.borrow().units).is_some()
    }

    pub fn remove_units<'a>(&self, locator: impl Into<Locator<'a, Units>>) -> bool {
        self.take_units(locator).is_some()
    }

    pub fn take_units<'a>(&self, locator: impl Into<Locator<'a, Units>>) -> Option<Units> {
        let units = take_child(&mut self.0.borrow_mut().units, locator.into())?;
        units.clear_parent();
        Some(units)
    }

    pub fn replace_units<'a>(&self, locator: impl Into<Locator<'a, Units>>, replacement: &Units) -> bool {
        replace_child(
            &self.0,
            |data: &mut ModelData| &mut data.units,
            locator.into(),
            replacement,
            Units::detach,
            |units| units.set_parent(self),
        )
    }

    pub fn remove_all_units(&self) {
        let units = std::mem::take(&mut self.0.borrow_mut().units);
        for u in units {
            u.clear_parent();
        }
    }

    // ── Imports ─────────────────────────────────────────────────────

    /// Whether any component or units is an import placeholder.
    pub fn has_imports(&self) -> bool {
        self.all_components().iter().any(Component::is_import)
            || self.all_units().iter().any(Units::is_import)
    }

    /// Distinct import sources in the order their `<import>` elements are
    /// printed: components breadth-first, then units.
    pub fn import_sources(&self) -> Vec<ImportSource> {
        let components = self
            .components_breadth_first()
            .into_iter()
            .filter_map(|c| c.import_source());
        let units = self.all_units().into_iter().filter_map(|u| u.import_source());

        let mut sources: Vec<ImportSource> = Vec::new();
        for source in components.chain(units) {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        sources
    }

    /// Whether some import placeholder cannot be found in the model
    /// attached to its import source.
    ///
    /// Only the first level of imports is checked; the attached models may
    /// carry unresolved imports of their own.
    pub fn has_unresolved_imports(&self) -> bool {
        let components_resolved = self.all_components().iter().all(|component| {
            match component.import() {
                Some(import) => import
                    .source()
                    .model()
                    .is_some_and(|model| model.find_component(import.reference()).is_some()),
                None => true,
            }
        });
        let units_resolved = self.all_units().iter().all(|units| match units.import() {
            Some(import) => import
                .source()
                .model()
                .is_some_and(|model| model.contains_units(import.reference())),
            None => true,
        });
        !(components_resolved && units_resolved)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Model {}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Model")
            .field("name", &data.name)
            .field("id", &data.id)
            .field("units", &data.units)
            .field("components", &data.components)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ParentRef;

    #[test]
    fn test_add_component_sets_model_parent() {
        let m = Model::new();
        let c = Component::with_name("c");
        m.add_component(&c);
        assert_eq!(c.parent(), Some(ParentRef::Model(m.clone())));
        assert_eq!(c.model(), Some(m));
    }

    #[test]
    fn test_component_moves_from_component_to_model() {
        let m = Model::new();
        let parent = Component::with_name("parent");
        let child = Component::with_name("child");
        parent.add_component(&child);
        m.add_component(&child);
        assert_eq!(parent.component_count(), 0);
        assert_eq!(m.component_count(), 1);
    }

    #[test]
    fn test_units_ops() {
        let m = Model::new();
        let u1 = Units::with_name("u1");
        let u2 = Units::with_name("u2");
        m.add_units(&u1);
        m.add_units(&u2);
        assert!(m.contains_units("u2"));
        assert_eq!(m.units("u1"), Some(u1.clone()));
        assert_eq!(u1.parent(), Some(m.clone()));

        let u3 = Units::with_name("u3");
        assert!(m.replace_units(0, &u3));
        assert!(u1.parent().is_none());
        assert_eq!(m.units(0), Some(u3));

        assert!(m.take_units("u2").is_some());
        assert!(u2.parent().is_none());
        assert!(!m.remove_units(1));
        assert_eq!(m.units_count(), 1);
    }

    #[test]
    fn test_breadth_and_depth_first_orders() {
        let m = Model::new();
        let a = Component::with_name("a");
        let a1 = Component::with_name("a1");
        let b = Component::with_name("b");
        a.add_component(&a1);
        m.add_component(&a);
        m.add_component(&b);

        let depth: Vec<_> = m.all_components().iter().map(Component::name).collect();
        let breadth: Vec<_> = m.components_breadth_first().iter().map(Component::name).collect();
        assert_eq!(depth, ["a", "a1", "b"]);
        assert_eq!(breadth, ["a", "b", "a1"]);
    }

    #[test]
    fn test_import_sources_are_distinct() {
        let m = Model::new();
        let shared = ImportSource::with_url("lib.cellml");
        let c = Component::with_name("c");
        c.set_source_component(&shared, "c_remote");
        let u = Units::with_name("u");
        u.set_source_units(&shared, "u_remote");
        m.add_component(&c);
        m.add_units(&u);

        assert!(m.has_imports());
        assert_eq!(m.import_sources(), vec![shared.clone()]);
        assert!(m.has_unresolved_imports());

        let remote = Model::new();
        remote.add_component(&Component::with_name("c_remote"));
        remote.add_units(&Units::with_name("u_remote"));
        shared.set_model(&remote);
        assert!(!m.has_unresolved_imports());
    }
}
