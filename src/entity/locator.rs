//! Index/name/item addressing for owned child collections.

use std::cell::RefCell;

/// Addresses one child in an ordered collection.
///
/// Container methods take `impl Into<Locator<'_, T>>`, so callers can pass
/// an index, a name, or the child handle itself:
///
/// ```ignore
/// model.remove_component(0);
/// model.remove_component("membrane");
/// model.remove_component(&membrane);
/// ```
#[derive(Debug)]
pub enum Locator<'a, T> {
    /// Zero-based position in storage order.
    Index(usize),
    /// First child with this name.
    Name(&'a str),
    /// The child with this identity.
    Item(&'a T),
}

impl<T> Clone for Locator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Locator<'_, T> {}

impl<T> From<usize> for Locator<'_, T> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a, T> From<&'a str> for Locator<'a, T> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a, T> From<&'a String> for Locator<'a, T> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

macro_rules! item_locator {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Locator<'a, $ty> {
                fn from(item: &'a $ty) -> Self {
                    Self::Item(item)
                }
            }
        )*
    };
}

item_locator!(
    super::Component,
    super::Units,
    super::Variable,
    super::Reset,
);

/// A handle that can live in an owned child collection.
pub(crate) trait Child: PartialEq {
    /// Whether this child answers to `name`. Unnamed kinds never match.
    fn matches_name(&self, name: &str) -> bool;

    /// Drop the back-reference to the owning parent.
    fn clear_parent(&self);
}

/// Position of the child `locator` addresses in `items`, if present.
pub(crate) fn position<T: Child>(locator: &Locator<'_, T>, items: &[T]) -> Option<usize> {
    match *locator {
        Locator::Index(index) => (index < items.len()).then_some(index),
        Locator::Name(name) => items.iter().position(|item| item.matches_name(name)),
        Locator::Item(target) => items.iter().position(|item| item == target),
    }
}

/// Remove the addressed child from `items`.
///
/// The caller clears the child's parent link after releasing the borrow on
/// the parent's data.
pub(crate) fn take_child<T: Child>(
    items: &mut Vec<T>,
    locator: Locator<'_, T>,
) -> Option<T> {
    let index = position(&locator, items)?;
    Some(items.remove(index))
}

/// Swap the addressed child in the collection selected by `items` for
/// `replacement`, keeping its position.
///
/// `detach` unhooks `replacement` from wherever it currently lives (which
/// may be this very collection) and `adopt` points it at its new parent.
/// No parent borrow is held while either callback runs.
pub(crate) fn replace_child<D, T: Child + Clone>(
    data: &RefCell<D>,
    items: impl Fn(&mut D) -> &mut Vec<T>,
    locator: Locator<'_, T>,
    replacement: &T,
    detach: impl FnOnce(&T),
    adopt: impl FnOnce(&T),
) -> bool {
    let current = {
        let mut data = data.borrow_mut();
        let list = items(&mut *data);
        match position(&locator, list) {
            Some(index) => list[index].clone(),
            None => return false,
        }
    };
    if current == *replacement {
        return true;
    }

    detach(replacement);

    {
        let mut data = data.borrow_mut();
        let list = items(&mut *data);
        let Some(index) = list.iter().position(|item| *item == current) else {
            return false;
        };
        list[index] = replacement.clone();
    }
    current.clear_parent();
    adopt(replacement);
    true
}
