//! Units definitions, unit references and prefixes.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use super::ValueError;
use super::import_source::{ImportReference, ImportSource};
use super::locator::Child;
use super::model::{Model, ModelData};

// ============================================================================
// PREFIXES
// ============================================================================

/// The named SI prefixes accepted in a `prefix` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiPrefix {
    Yotta,
    Zetta,
    Exa,
    Peta,
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deca,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
    Femto,
    Atto,
    Zepto,
    Yocto,
}

impl SiPrefix {
    pub const ALL: [Self; 20] = [
        Self::Yotta,
        Self::Zetta,
        Self::Exa,
        Self::Peta,
        Self::Tera,
        Self::Giga,
        Self::Mega,
        Self::Kilo,
        Self::Hecto,
        Self::Deca,
        Self::Deci,
        Self::Centi,
        Self::Milli,
        Self::Micro,
        Self::Nano,
        Self::Pico,
        Self::Femto,
        Self::Atto,
        Self::Zepto,
        Self::Yocto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yotta => "yotta",
            Self::Zetta => "zetta",
            Self::Exa => "exa",
            Self::Peta => "peta",
            Self::Tera => "tera",
            Self::Giga => "giga",
            Self::Mega => "mega",
            Self::Kilo => "kilo",
            Self::Hecto => "hecto",
            Self::Deca => "deca",
            Self::Deci => "deci",
            Self::Centi => "centi",
            Self::Milli => "milli",
            Self::Micro => "micro",
            Self::Nano => "nano",
            Self::Pico => "pico",
            Self::Femto => "femto",
            Self::Atto => "atto",
            Self::Zepto => "zepto",
            Self::Yocto => "yocto",
        }
    }

    /// Power of ten this prefix stands for.
    pub fn exponent(&self) -> i32 {
        match self {
            Self::Yotta => 24,
            Self::Zetta => 21,
            Self::Exa => 18,
            Self::Peta => 15,
            Self::Tera => 12,
            Self::Giga => 9,
            Self::Mega => 6,
            Self::Kilo => 3,
            Self::Hecto => 2,
            Self::Deca => 1,
            Self::Deci => -1,
            Self::Centi => -2,
            Self::Milli => -3,
            Self::Micro => -6,
            Self::Nano => -9,
            Self::Pico => -12,
            Self::Femto => -15,
            Self::Atto => -18,
            Self::Zepto => -21,
            Self::Yocto => -24,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prefix| prefix.as_str() == name)
    }
}

/// A unit prefix, kept in the textual form it was supplied in.
///
/// `kilo` and `3` mean the same scaling but print differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prefix {
    Named(SiPrefix),
    Power(i32),
}

impl Prefix {
    pub fn exponent(&self) -> i32 {
        match self {
            Self::Named(prefix) => prefix.exponent(),
            Self::Power(power) => *power,
        }
    }
}

impl From<SiPrefix> for Prefix {
    fn from(prefix: SiPrefix) -> Self {
        Self::Named(prefix)
    }
}

impl From<i32> for Prefix {
    fn from(power: i32) -> Self {
        Self::Power(power)
    }
}

impl FromStr for Prefix {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(prefix) = SiPrefix::from_name(s) {
            return Ok(Self::Named(prefix));
        }
        s.parse::<i32>()
            .map(Self::Power)
            .map_err(|_| ValueError::Prefix(s.to_string()))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(prefix) => f.write_str(prefix.as_str()),
            Self::Power(power) => write!(f, "{power}"),
        }
    }
}

// ============================================================================
// STANDARD UNITS
// ============================================================================

/// Units every CellML document can reference without defining them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StandardUnit {
    Ampere,
    Becquerel,
    Candela,
    Coulomb,
    Dimensionless,
    Farad,
    Gram,
    Gray,
    Henry,
    Hertz,
    Joule,
    Katal,
    Kelvin,
    Kilogram,
    Litre,
    Lumen,
    Lux,
    Metre,
    Mole,
    Newton,
    Ohm,
    Pascal,
    Radian,
    Second,
    Siemens,
    Sievert,
    Steradian,
    Tesla,
    Volt,
    Watt,
    Weber,
}

impl StandardUnit {
    pub const ALL: [Self; 31] = [
        Self::Ampere,
        Self::Becquerel,
        Self::Candela,
        Self::Coulomb,
        Self::Dimensionless,
        Self::Farad,
        Self::Gram,
        Self::Gray,
        Self::Henry,
        Self::Hertz,
        Self::Joule,
        Self::Katal,
        Self::Kelvin,
        Self::Kilogram,
        Self::Litre,
        Self::Lumen,
        Self::Lux,
        Self::Metre,
        Self::Mole,
        Self::Newton,
        Self::Ohm,
        Self::Pascal,
        Self::Radian,
        Self::Second,
        Self::Siemens,
        Self::Sievert,
        Self::Steradian,
        Self::Tesla,
        Self::Volt,
        Self::Watt,
        Self::Weber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ampere => "ampere",
            Self::Becquerel => "becquerel",
            Self::Candela => "candela",
            Self::Coulomb => "coulomb",
            Self::Dimensionless => "dimensionless",
            Self::Farad => "farad",
            Self::Gram => "gram",
            Self::Gray => "gray",
            Self::Henry => "henry",
            Self::Hertz => "hertz",
            Self::Joule => "joule",
            Self::Katal => "katal",
            Self::Kelvin => "kelvin",
            Self::Kilogram => "kilogram",
            Self::Litre => "litre",
            Self::Lumen => "lumen",
            Self::Lux => "lux",
            Self::Metre => "metre",
            Self::Mole => "mole",
            Self::Newton => "newton",
            Self::Ohm => "ohm",
            Self::Pascal => "pascal",
            Self::Radian => "radian",
            Self::Second => "second",
            Self::Siemens => "siemens",
            Self::Sievert => "sievert",
            Self::Steradian => "steradian",
            Self::Tesla => "tesla",
            Self::Volt => "volt",
            Self::Watt => "watt",
            Self::Weber => "weber",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.as_str() == name)
    }

    pub fn is_standard_unit(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

// ============================================================================
// UNIT REFERENCES
// ============================================================================

/// One `<unit>` child of a units definition.
///
/// `exponent` and `multiplier` default to 1.0 when unset; unset values are
/// omitted from the printed document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitReference {
    /// Name of the referenced units (standard or model-defined).
    pub reference: String,
    pub prefix: Option<Prefix>,
    pub exponent: Option<f64>,
    pub multiplier: Option<f64>,
    pub id: String,
}

impl UnitReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<Prefix>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = Some(exponent);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Exponent with the default applied.
    pub fn exponent_value(&self) -> f64 {
        self.exponent.unwrap_or(1.0)
    }

    /// Multiplier with the default applied.
    pub fn multiplier_value(&self) -> f64 {
        self.multiplier.unwrap_or(1.0)
    }
}

// ============================================================================
// UNITS
// ============================================================================

#[derive(Default)]
pub(crate) struct UnitsData {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) unit_references: Vec<UnitReference>,
    pub(crate) import: Option<ImportReference>,
    pub(crate) parent: Option<Weak<RefCell<ModelData>>>,
}

/// A named units definition.
///
/// A units is either a base unit (no unit references), a derived unit built
/// from unit references, or an import placeholder. When an import is set it
/// takes precedence in the printed document; local unit references are kept
/// but not printed.
#[derive(Clone)]
pub struct Units(pub(crate) Rc<RefCell<UnitsData>>);

impl Units {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(UnitsData::default())))
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let units = Self::new();
        units.set_name(name);
        units
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

    /// The model this units belongs to, if any.
    pub fn parent(&self) -> Option<Model> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Model)
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    pub(crate) fn set_parent(&self, model: &Model) {
        self.0.borrow_mut().parent = Some(Rc::downgrade(&model.0));
    }

    /// Remove this units from its owning model, if any.
    pub fn detach(&self) {
        if let Some(model) = self.parent() {
            model.remove_units(self);
        }
        self.clear_parent();
    }

    // ── Unit references ─────────────────────────────────────────────

    /// Append a unit reference. No de-duplication; order is preserved.
    pub fn add_unit_reference(&self, reference: UnitReference) {
        self.0.borrow_mut().unit_references.push(reference);
    }

    /// Append a plain reference to `units` with no prefix, exponent or multiplier.
    pub fn add_unit(&self, units: impl Into<String>) {
        self.add_unit_reference(UnitReference::new(units));
    }

    pub fn add_standard_unit(&self, unit: StandardUnit) {
        self.add_unit(unit.as_str());
    }

    pub fn unit_reference(&self, index: usize) -> Option<UnitReference> {
        self.0.borrow().unit_references.get(index).cloned()
    }

    pub fn unit_references(&self) -> Vec<UnitReference> {
        self.0.borrow().unit_references.clone()
    }

    pub fn unit_reference_count(&self) -> usize {
        self.0.borrow().unit_references.len()
    }

    /// Remove the unit reference at `index`; `false` when out of range.
    pub fn remove_unit_reference(&self, index: usize) -> bool {
        let mut data = self.0.borrow_mut();
        if index < data.unit_references.len() {
            data.unit_references.remove(index);
            true
        } else {
            false
        }
    }

    pub fn remove_all_unit_references(&self) {
        self.0.borrow_mut().unit_references.clear();
    }

    /// A base unit has no unit references and is not imported.
    pub fn is_base_unit(&self) -> bool {
        let data = self.0.borrow();
        data.unit_references.is_empty() && data.import.is_none()
    }

    // ── Import ──────────────────────────────────────────────────────

    /// Make this units a placeholder for `reference` in `source`.
    ///
    /// Existing unit references are left untouched.
    pub fn set_source_units(&self, source: &ImportSource, reference: impl Into<String>) {
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

    /// Remote name, or an empty string when not imported.
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
}

impl Default for Units {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Units {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Units {}

impl Child for Units {
    fn matches_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }
}

impl fmt::Debug for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Units")
            .field("name", &data.name)
            .field("id", &data.id)
            .field("unit_references", &data.unit_references.len())
            .field("import", &data.import)
            .finish()
    }
}
