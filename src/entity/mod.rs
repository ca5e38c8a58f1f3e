//! The CellML entity graph.
//!
//! Every entity is a cheap-to-clone handle around shared, interior-mutable
//! data. Parents own their children; children keep a weak back-reference
//! to their parent so that `parent()` works without creating cycles.
//!
//! ```text
//! Model
//! ├── units: Vec<Units>            (unit references, import placeholder)
//! └── components: Vec<Component>   (encapsulation root)
//!     ├── variables: Vec<Variable> (equivalences: weak, symmetric)
//!     ├── resets: Vec<Reset>
//!     └── components: Vec<Component>
//! ```
//!
//! Handles compare by identity: two `Component` handles are equal only when
//! they point at the same entity.
//!
//! All mutation goes through `&self` methods. Addressing a missing child
//! (out-of-range index, unknown name) is a normal outcome and is reported
//! through `bool`/`Option` returns, never a panic.

mod component;
mod import_source;
mod locator;
mod model;
mod reset;
mod units;
mod variable;

pub use component::{Component, ParentRef};
pub use import_source::{ImportReference, ImportSource};
pub use locator::Locator;
pub use model::Model;
pub use reset::Reset;
pub use units::{Prefix, SiPrefix, StandardUnit, UnitReference, Units};
pub use variable::{InterfaceType, Variable, VariableUnits};

use thiserror::Error;

/// Rejected textual value for an entity property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Not one of the SI prefix names and not an integer power of ten.
    #[error("unrecognised prefix: '{0}'")]
    Prefix(String),

    /// Not one of `none`, `public`, `private`, `public_and_private`.
    #[error("unrecognised interface type: '{0}'")]
    InterfaceType(String),
}

/// Text for a numeric attribute value.
///
/// Magnitudes outside `1e-6..1e16` use exponent notation so that tiny and
/// huge values stay short; everything else is plain decimal.
pub(crate) fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && magnitude != 0.0 && !(1e-6..1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}
