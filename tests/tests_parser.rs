#![allow(clippy::unwrap_used)]

use cellml::{
    Component, ImportSource, InterfaceType, IssueKind, Model, Parser, Printer, Reset, SiPrefix, UnitReference,
    Units, Variable, VariableUnits,
};
use cellml::entity::Prefix;
use rstest::rstest;

fn print(model: &Model) -> String {
    Printer::new().print_model(model).unwrap()
}

/// Parse `text`, asserting that nothing was reported.
fn parse_clean(text: &str) -> Model {
    let result = Parser::new().parse_model(text);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    result.model
}

fn assert_round_trip(model: &Model) {
    let first = print(model);
    let reparsed = parse_clean(&first);
    assert_eq!(print(&reparsed), first);
}

// ============================================================================
// READING
// ============================================================================

#[test]
fn test_parse_named_model() {
    let m = parse_clean(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <model xmlns=\"http://www.cellml.org/cellml/2.0#\" name=\"name\" id=\"mid\"/>\n",
    );
    assert_eq!(m.name(), "name");
    assert_eq!(m.id(), "mid");
}

#[test]
fn test_parse_component_contents() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="membrane" id="c1">
    <variable name="V" units="millivolt" initial_value="-84" interface="public_and_private" id="v1"/>
    <variable name="t" units="ms"/>
  </component>
</model>"#,
    );
    let membrane = m.component("membrane").unwrap();
    assert_eq!(membrane.id(), "c1");
    assert_eq!(membrane.variable_count(), 2);

    let v = membrane.variable("V").unwrap();
    assert_eq!(v.units(), Some(VariableUnits::Named("millivolt".to_string())));
    assert_eq!(v.initial_value(), "-84");
    assert_eq!(v.interface_type(), InterfaceType::PublicAndPrivate);
    assert_eq!(v.id(), "v1");
    assert_eq!(v.parent(), Some(membrane));
}

#[test]
fn test_parse_units() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <units name="mV_per_ms">
    <unit prefix="milli" units="volt" id="u1"/>
    <unit exponent="-1" prefix="-3" units="second"/>
  </units>
</model>"#,
    );
    let u = m.units("mV_per_ms").unwrap();
    assert_eq!(u.unit_reference_count(), 2);
    assert_eq!(
        u.unit_reference(0),
        Some(UnitReference::new("volt").with_prefix(SiPrefix::Milli).with_id("u1"))
    );
    let second = u.unit_reference(1).unwrap();
    assert_eq!(second.exponent, Some(-1.0));
    assert_eq!(second.prefix, Some(Prefix::Power(-3)));
}

#[test]
fn test_parse_imports_share_source() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <import xlink:href="lib.cellml" xmlns:xlink="http://www.w3.org/1999/xlink" id="imp">
    <component component_ref="remote_c" name="c"/>
    <units units_ref="remote_u" name="u"/>
  </import>
</model>"#,
    );
    let c = m.component("c").unwrap();
    let u = m.units("u").unwrap();
    assert!(c.is_import());
    assert_eq!(c.import_reference(), "remote_c");
    assert_eq!(u.import_reference(), "remote_u");
    assert_eq!(c.import_source(), u.import_source());

    let sources = m.import_sources();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].url(), "lib.cellml");
    assert_eq!(sources[0].id(), "imp");
}

#[test]
fn test_parse_encapsulation_builds_hierarchy() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="parent"/>
  <component name="child"/>
  <component name="other"/>
  <encapsulation id="e">
    <component_ref component="parent">
      <component_ref component="child" id="cr"/>
    </component_ref>
  </encapsulation>
</model>"#,
    );
    assert_eq!(m.component_count(), 2);
    assert_eq!(m.encapsulation_id(), "e");
    let parent = m.component(0).unwrap();
    let child = parent.component("child").unwrap();
    assert_eq!(child.parent_component(), Some(parent));
    assert_eq!(child.encapsulation_id(), "cr");
    assert_eq!(m.component(1).unwrap().name(), "other");
}

#[test]
fn test_parse_connection_sets_equivalence() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="a">
    <variable name="x"/>
  </component>
  <component name="b">
    <variable name="y"/>
  </component>
  <connection component_1="a" component_2="b" id="con">
    <map_variables variable_1="x" variable_2="y" id="map"/>
  </connection>
</model>"#,
    );
    let x = m.component("a").unwrap().variable("x").unwrap();
    let y = m.component("b").unwrap().variable("y").unwrap();
    assert!(x.has_equivalent(&y));
    assert!(y.has_equivalent(&x));
    assert_eq!(Variable::equivalence_mapping_id(&y, &x), "map");
    assert_eq!(Variable::equivalence_connection_id(&x, &y), "con");
}

#[test]
fn test_parse_math_is_dedented() {
    let m = parse_clean(
        "<model xmlns=\"http://www.cellml.org/cellml/2.0#\">\n  \
         <component name=\"c\">\n    \
         <math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n      \
         <apply><eq/><ci>a</ci><cn>1</cn></apply>\n    \
         </math>\n  \
         </component>\n\
         </model>\n",
    );
    assert_eq!(
        m.component(0).unwrap().math(),
        "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  \
         <apply><eq/><ci>a</ci><cn>1</cn></apply>\n\
         </math>"
    );
}

#[test]
fn test_parse_reset() {
    let m = parse_clean(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="c">
    <variable name="v"/>
    <variable name="t"/>
    <reset variable="v" test_variable="t" order="2" id="r">
      <test_value id="tv">
        <math xmlns="http://www.w3.org/1998/Math/MathML"/>
      </test_value>
      <reset_value id="rv"/>
    </reset>
  </component>
</model>"#,
    );
    let c = m.component(0).unwrap();
    let reset = c.reset(0).unwrap();
    assert_eq!(reset.variable(), c.variable("v"));
    assert_eq!(reset.test_variable(), c.variable("t"));
    assert_eq!(reset.order(), Some(2));
    assert_eq!(reset.id(), "r");
    assert_eq!(reset.test_value_id(), "tv");
    assert_eq!(reset.test_value(), "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"/>");
    assert_eq!(reset.reset_value_id(), "rv");
    assert_eq!(reset.parent(), Some(c));
}

// ============================================================================
// ISSUES
// ============================================================================

#[rstest]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#" colour="red"/>"#,
    IssueKind::Model
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><widget/></model>"#,
    IssueKind::Model
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><component><variable name="v" interface="sideways"/></component></model>"#,
    IssueKind::Variable
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><units name="u"><unit units="metre" exponent="two"/></units></model>"#,
    IssueKind::Units
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><units name="u"><unit units="metre" prefix="huge"/></units></model>"#,
    IssueKind::Units
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><component name="c"><reset variable="nope"/></component></model>"#,
    IssueKind::Reset
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><connection component_1="a" component_2="b"/></model>"#,
    IssueKind::Connection
)]
#[case(
    r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><encapsulation><component_ref component="ghost"/></encapsulation></model>"#,
    IssueKind::Encapsulation
)]
#[case(r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><component></model>"#, IssueKind::Xml)]
fn test_single_issue(#[case] text: &str, #[case] kind: IssueKind) {
    let result = Parser::new().parse_model(text);
    assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
    assert_eq!(result.issues[0].kind, kind);
}

#[test]
fn test_bad_values_keep_defaults() {
    let result = Parser::new().parse_model(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#"><component><variable name="v" interface="sideways"/></component></model>"#,
    );
    let v = result.model.component(0).unwrap().variable(0).unwrap();
    assert_eq!(v.interface_type(), InterfaceType::None);
}

#[test]
fn test_encapsulation_cycle_is_reported() {
    let result = Parser::new().parse_model(
        r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="a"/>
  <component name="b"/>
  <encapsulation>
    <component_ref component="a">
      <component_ref component="b">
        <component_ref component="a"/>
      </component_ref>
    </component_ref>
  </encapsulation>
</model>"#,
    );
    assert!(result.has_errors());
    assert!(result.issues.iter().all(|i| i.kind == IssueKind::Encapsulation));
    assert_eq!(result.model.all_components().len(), 2);
}

#[test]
fn test_missing_model_element() {
    let result = Parser::new().parse_model("<?xml version=\"1.0\"?>\n");
    assert!(result.has_errors());
    assert_eq!(result.issues[0].kind, IssueKind::Model);
}

// ============================================================================
// ROUND TRIPS
// ============================================================================

#[test]
fn test_round_trip_empty_name_stays_empty() {
    let m = Model::new();
    m.add_component(&Component::new());
    let reparsed = parse_clean(&print(&m));
    assert_eq!(reparsed.name(), "");
    assert_eq!(reparsed.component(0).unwrap().name(), "");
    assert_round_trip(&m);
}

#[test]
fn test_round_trip_full_model() {
    let m = Model::with_name("full");
    m.set_id("mid");
    m.set_encapsulation_id("enc");

    let source = ImportSource::with_url("library.cellml");
    source.set_id("imp");
    let imported_units = Units::with_name("mV");
    imported_units.set_source_units(&source, "millivolt");
    m.add_units(&imported_units);

    let per_ms = Units::with_name("per_ms");
    per_ms.add_unit_reference(UnitReference::new("second").with_prefix(SiPrefix::Milli).with_exponent(-1.0));
    m.add_units(&per_ms);

    let imported = Component::with_name("gate");
    imported.set_source_component(&source, "gate_template");
    m.add_component(&imported);

    let cell = Component::with_name("cell");
    let membrane = Component::with_name("membrane");
    membrane.set_encapsulation_id("mref");
    let v = Variable::with_name("V");
    v.set_units(&imported_units);
    v.set_initial_value(-84.0);
    v.set_interface_type(InterfaceType::Public);
    membrane.add_variable(&v);
    membrane.set_math(
        "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  <apply>\n    <eq/>\n  </apply>\n</math>",
    );
    let reset = Reset::new();
    reset.set_variable(&v);
    reset.set_test_variable(&v);
    reset.set_order(1);
    reset.set_reset_value("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  <cn>0</cn>\n</math>");
    membrane.add_reset(&reset);
    cell.add_component(&membrane);
    m.add_component(&cell);

    let env = Component::with_name("environment");
    let v_env = Variable::with_name("V");
    v_env.set_interface_type(InterfaceType::Public);
    env.add_variable(&v_env);
    m.add_component(&env);
    Variable::add_equivalence(&v, &v_env);
    Variable::set_equivalence_mapping_id(&v, &v_env, "map");
    Variable::set_equivalence_connection_id(&v, &v_env, "con");

    assert_round_trip(&m);

    let reparsed = parse_clean(&print(&m));
    let membrane = reparsed.find_component("membrane").unwrap();
    assert_eq!(
        membrane.parent_component().map(|c| c.name()),
        Some("cell".to_string())
    );
    assert_eq!(membrane.variable(0).unwrap().equivalent_count(), 1);
}

#[test]
fn test_round_trip_connection_to_imported_component() {
    let m = Model::new();
    let imported = Component::with_name("imp");
    imported.set_source_component(&ImportSource::with_url("lib.cellml"), "remote");
    let x = Variable::with_name("x");
    imported.add_variable(&x);
    let local = Component::with_name("local");
    let y = Variable::with_name("y");
    local.add_variable(&y);
    m.add_component(&imported);
    m.add_component(&local);
    assert!(Variable::add_equivalence(&y, &x));

    let first = print(&m);
    assert!(first.contains("<connection component_1=\"imp\" component_2=\"local\">"));
    assert_round_trip(&m);

    let reparsed = parse_clean(&first);
    let imported = reparsed.component("imp").unwrap();
    let x = imported.variable("x").unwrap();
    assert_eq!(x.parent(), Some(imported));
    assert!(x.has_equivalent(&reparsed.component("local").unwrap().variable("y").unwrap()));
}

#[test]
fn test_unknown_variable_of_local_component_is_reported() {
    let text = r#"<model xmlns="http://www.cellml.org/cellml/2.0#">
  <component name="a"/>
  <component name="b">
    <variable name="y"/>
  </component>
  <connection component_1="a" component_2="b">
    <map_variables variable_1="x" variable_2="y"/>
  </connection>
</model>"#;
    let result = Parser::new().parse_model(text);
    assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
    assert_eq!(result.issues[0].kind, IssueKind::Connection);
    assert_eq!(result.model.component("a").unwrap().variable_count(), 0);
}
