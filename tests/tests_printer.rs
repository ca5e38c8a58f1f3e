#![allow(clippy::unwrap_used)]

use cellml::{
    Component, ImportSource, InterfaceType, Model, Printer, Reset, SiPrefix, StandardUnit, UnitReference,
    Units, Variable,
};
use rstest::rstest;

const OPEN: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                    <model xmlns=\"http://www.cellml.org/cellml/2.0#\">\n";
const CLOSE: &str = "</model>\n";

fn print(model: &Model) -> String {
    Printer::new().print_model(model).unwrap()
}

fn body(lines: &[&str]) -> String {
    let mut text = OPEN.to_string();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(CLOSE);
    text
}

#[test]
fn test_unit_reference_attributes() {
    let m = Model::new();
    let u = Units::with_name("millivolt_per_second");
    u.add_unit_reference(UnitReference::new("volt").with_prefix(SiPrefix::Milli).with_id("ur1"));
    u.add_unit_reference(UnitReference::new("second").with_exponent(-1.0));
    u.add_unit_reference(UnitReference::new("metre").with_multiplier(2.5).with_prefix(-3));
    m.add_units(&u);

    let expected = body(&[
        "  <units name=\"millivolt_per_second\">",
        "    <unit prefix=\"milli\" units=\"volt\" id=\"ur1\"/>",
        "    <unit exponent=\"-1\" units=\"second\"/>",
        "    <unit multiplier=\"2.5\" prefix=\"-3\" units=\"metre\"/>",
        "  </units>",
    ]);
    assert_eq!(print(&m), expected);
}

#[test]
fn test_removed_unit_reference_is_not_printed() {
    let m = Model::new();
    let u = Units::with_name("u");
    u.add_unit_reference(UnitReference::new("metre").with_exponent(1.0));
    m.add_units(&u);

    assert!(u.remove_unit_reference(0));
    assert_eq!(u.unit_reference_count(), 0);
    assert_eq!(print(&m), body(&["  <units name=\"u\"/>"]));
}

#[test]
fn test_standard_units_by_name() {
    let m = Model::new();
    let u = Units::with_name("area");
    u.add_standard_unit(StandardUnit::Metre);
    m.add_units(&u);
    assert_eq!(
        print(&m),
        body(&["  <units name=\"area\">", "    <unit units=\"metre\"/>", "  </units>"])
    );
}

#[rstest]
#[case(InterfaceType::None, "    <variable name=\"v\"/>")]
#[case(InterfaceType::Public, "    <variable name=\"v\" interface=\"public\"/>")]
#[case(InterfaceType::Private, "    <variable name=\"v\" interface=\"private\"/>")]
#[case(
    InterfaceType::PublicAndPrivate,
    "    <variable name=\"v\" interface=\"public_and_private\"/>"
)]
fn test_variable_interface(#[case] interface: InterfaceType, #[case] line: &str) {
    let m = Model::new();
    let c = Component::with_name("c");
    let v = Variable::with_name("v");
    v.set_interface_type(interface);
    c.add_variable(&v);
    m.add_component(&c);

    assert_eq!(print(&m), body(&["  <component name=\"c\">", line, "  </component>"]));
}

#[test]
fn test_variable_attribute_order() {
    let m = Model::new();
    let c = Component::with_name("c");
    let v = Variable::with_name("V");
    v.set_id("v_id");
    v.set_interface_type(InterfaceType::Public);
    v.set_initial_value(-84.0);
    v.set_units_name("millivolt");
    c.add_variable(&v);
    m.add_component(&c);

    assert_eq!(
        print(&m),
        body(&[
            "  <component name=\"c\">",
            "    <variable name=\"V\" units=\"millivolt\" initial_value=\"-84\" interface=\"public\" id=\"v_id\"/>",
            "  </component>",
        ])
    );
}

#[test]
fn test_component_import() {
    let m = Model::new();
    let source = ImportSource::with_url("library.cellml");
    let c = Component::with_name("local");
    c.set_source_component(&source, "foo");
    m.add_component(&c);

    assert!(c.is_import());
    assert_eq!(
        print(&m),
        body(&[
            "  <import xlink:href=\"library.cellml\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">",
            "    <component component_ref=\"foo\" name=\"local\"/>",
            "  </import>",
        ])
    );
}

#[test]
fn test_shared_source_prints_one_import() {
    let m = Model::new();
    let source = ImportSource::with_url("library.cellml");
    let c = Component::with_name("c");
    c.set_source_component(&source, "c_remote");
    let u = Units::with_name("u");
    u.set_source_units(&source, "u_remote");
    m.add_units(&u);
    m.add_component(&c);

    assert_eq!(
        print(&m),
        body(&[
            "  <import xlink:href=\"library.cellml\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">",
            "    <component component_ref=\"c_remote\" name=\"c\"/>",
            "    <units units_ref=\"u_remote\" name=\"u\"/>",
            "  </import>",
        ])
    );
}

#[test]
fn test_import_takes_precedence_over_local_content() {
    let m = Model::new();
    let c = Component::with_name("c");
    c.add_variable(&Variable::with_name("hidden"));
    c.set_source_component(&ImportSource::with_url("lib.cellml"), "remote");
    m.add_component(&c);

    let text = print(&m);
    assert!(!text.contains("hidden"));
    assert_eq!(c.variable_count(), 1);

    c.clear_import();
    assert!(print(&m).contains("<variable name=\"hidden\"/>"));
}

#[test]
fn test_encapsulation_is_flattened() {
    let m = Model::new();
    let parent = Component::with_name("parent");
    let child = Component::with_name("child");
    let grandchild = Component::with_name("grandchild");
    let sibling = Component::with_name("sibling");
    child.add_component(&grandchild);
    parent.add_component(&child);
    m.add_component(&parent);
    m.add_component(&sibling);
    m.set_encapsulation_id("enc");
    child.set_encapsulation_id("cref");

    assert_eq!(
        print(&m),
        body(&[
            "  <component name=\"parent\"/>",
            "  <component name=\"child\"/>",
            "  <component name=\"grandchild\"/>",
            "  <component name=\"sibling\"/>",
            "  <encapsulation id=\"enc\">",
            "    <component_ref component=\"parent\">",
            "      <component_ref component=\"child\" id=\"cref\">",
            "        <component_ref component=\"grandchild\"/>",
            "      </component_ref>",
            "    </component_ref>",
            "  </encapsulation>",
        ])
    );
}

#[test]
fn test_connections() {
    let m = Model::new();
    let a = Component::with_name("a");
    let b = Component::with_name("b");
    let x = Variable::with_name("x");
    let y = Variable::with_name("y");
    a.add_variable(&x);
    b.add_variable(&y);
    m.add_component(&a);
    m.add_component(&b);
    assert!(Variable::add_equivalence(&x, &y));
    Variable::set_equivalence_mapping_id(&x, &y, "map1");
    Variable::set_equivalence_connection_id(&y, &x, "con1");

    assert_eq!(
        print(&m),
        body(&[
            "  <component name=\"a\">",
            "    <variable name=\"x\"/>",
            "  </component>",
            "  <component name=\"b\">",
            "    <variable name=\"y\"/>",
            "  </component>",
            "  <connection component_1=\"a\" component_2=\"b\" id=\"con1\">",
            "    <map_variables variable_1=\"x\" variable_2=\"y\" id=\"map1\"/>",
            "  </connection>",
        ])
    );
}

#[test]
fn test_reset_with_math() {
    let m = Model::new();
    let c = Component::with_name("c");
    let v = Variable::with_name("v");
    c.add_variable(&v);
    let r = Reset::new();
    r.set_variable(&v);
    r.set_test_variable(&v);
    r.set_order(1);
    r.set_test_value("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  <cn>1</cn>\n</math>");
    c.add_reset(&r);
    m.add_component(&c);

    assert_eq!(
        print(&m),
        body(&[
            "  <component name=\"c\">",
            "    <variable name=\"v\"/>",
            "    <reset variable=\"v\" test_variable=\"v\" order=\"1\">",
            "      <test_value>",
            "        <math xmlns=\"http://www.w3.org/1998/Math/MathML\">",
            "          <cn>1</cn>",
            "        </math>",
            "      </test_value>",
            "    </reset>",
            "  </component>",
        ])
    );
}

#[test]
fn test_attribute_values_are_escaped() {
    let m = Model::with_name("a<b & \"c\"");
    let text = print(&m);
    assert!(text.contains("name=\"a&lt;b &amp; &quot;c&quot;\""));
}

#[test]
fn test_number_formatting() {
    let m = Model::new();
    let u = Units::with_name("u");
    u.add_unit_reference(UnitReference::new("metre").with_exponent(1.0).with_multiplier(1e-30));
    u.add_unit_reference(UnitReference::new("second").with_multiplier(6.02e23));
    m.add_units(&u);
    let c = Component::with_name("c");
    let v = Variable::with_name("v");
    v.set_initial_value(0.000_000_1);
    c.add_variable(&v);
    m.add_component(&c);

    assert_eq!(
        print(&m),
        body(&[
            "  <units name=\"u\">",
            "    <unit exponent=\"1\" multiplier=\"1e-30\" units=\"metre\"/>",
            "    <unit multiplier=\"6.02e23\" units=\"second\"/>",
            "  </units>",
            "  <component name=\"c\">",
            "    <variable name=\"v\" initial_value=\"1e-7\"/>",
            "  </component>",
        ])
    );
}
