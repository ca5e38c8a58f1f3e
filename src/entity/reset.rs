//! Resets: conditional re-initialisation of a variable.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::component::{Component, ComponentData};
use super::locator::Child;
use super::variable::{Variable, VariableData};

#[derive(Default)]
pub(crate) struct ResetData {
    pub(crate) id: String,
    pub(crate) order: Option<i32>,
    pub(crate) variable: Option<Weak<RefCell<VariableData>>>,
    pub(crate) test_variable: Option<Weak<RefCell<VariableData>>>,
    pub(crate) test_value: String,
    pub(crate) test_value_id: String,
    pub(crate) reset_value: String,
    pub(crate) reset_value_id: String,
    pub(crate) parent: Option<Weak<RefCell<ComponentData>>>,
}

/// Sets `variable` to the reset value when `test_variable` reaches the
/// test value.
///
/// The test and reset values are MathML blobs kept verbatim. Nothing here
/// checks that a reset is complete; incomplete resets print whatever they
/// hold.
#[derive(Clone)]
pub struct Reset(pub(crate) Rc<RefCell<ResetData>>);

impl Reset {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ResetData::default())))
    }

    pub fn id(&self) -> String {
        self.0.borrow().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().id = id.into();
    }

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

    /// Remove this reset from its owning component, if any.
    pub fn detach(&self) {
        if let Some(component) = self.parent() {
            component.remove_reset(self);
        }
        self.clear_parent();
    }

    // ── Order ───────────────────────────────────────────────────────

    /// Explicit ordering among resets of the same variable; `None` when unset.
    pub fn order(&self) -> Option<i32> {
        self.0.borrow().order
    }

    pub fn set_order(&self, order: i32) {
        self.0.borrow_mut().order = Some(order);
    }

    pub fn clear_order(&self) {
        self.0.borrow_mut().order = None;
    }

    // ── Variables (non-owning) ──────────────────────────────────────

    pub fn variable(&self) -> Option<Variable> {
        self.0
            .borrow()
            .variable
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Variable)
    }

    pub fn set_variable(&self, variable: &Variable) {
        self.0.borrow_mut().variable = Some(Rc::downgrade(&variable.0));
    }

    pub fn clear_variable(&self) {
        self.0.borrow_mut().variable = None;
    }

    pub fn test_variable(&self) -> Option<Variable> {
        self.0
            .borrow()
            .test_variable
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Variable)
    }

    pub fn set_test_variable(&self, variable: &Variable) {
        self.0.borrow_mut().test_variable = Some(Rc::downgrade(&variable.0));
    }

    pub fn clear_test_variable(&self) {
        self.0.borrow_mut().test_variable = None;
    }

    // ── Test value ──────────────────────────────────────────────────

    pub fn test_value(&self) -> String {
        self.0.borrow().test_value.clone()
    }

    pub fn set_test_value(&self, math: impl Into<String>) {
        self.0.borrow_mut().test_value = math.into();
    }

    pub fn append_test_value(&self, math: &str) {
        self.0.borrow_mut().test_value.push_str(math);
    }

    pub fn test_value_id(&self) -> String {
        self.0.borrow().test_value_id.clone()
    }

    pub fn set_test_value_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().test_value_id = id.into();
    }

    // ── Reset value ─────────────────────────────────────────────────

    pub fn reset_value(&self) -> String {
        self.0.borrow().reset_value.clone()
    }

    pub fn set_reset_value(&self, math: impl Into<String>) {
        self.0.borrow_mut().reset_value = math.into();
    }

    pub fn append_reset_value(&self, math: &str) {
        self.0.borrow_mut().reset_value.push_str(math);
    }

    pub fn reset_value_id(&self) -> String {
        self.0.borrow().reset_value_id.clone()
    }

    pub fn set_reset_value_id(&self, id: impl Into<String>) {
        self.0.borrow_mut().reset_value_id = id.into();
    }
}

impl Default for Reset {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Reset {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Reset {}

impl Child for Reset {
    fn matches_name(&self, _name: &str) -> bool {
        false
    }

    fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }
}

impl fmt::Debug for Reset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Reset")
            .field("id", &data.id)
            .field("order", &data.order)
            .field("test_value_id", &data.test_value_id)
            .field("reset_value_id", &data.reset_value_id)
            .finish()
    }
}
