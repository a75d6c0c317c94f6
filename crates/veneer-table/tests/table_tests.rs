//! Integration tests for attribute table lookups

use std::sync::Arc;
use std::thread;

use veneer_table::{AttributeTable, AttributeTableBuilder, CustomAttributeTable};
use veneer_types::{
    AccessExpr, Attribute, AttributeKind, BindingFlags, MemberKey, MemberRef, MethodDescription,
    MethodKey, PropertyDescription, TypeDescription, TypeKind, TypeRef, Universe, UniverseBuilder,
};

struct Fixture {
    universe: Arc<Universe>,
    base: TypeRef,
    derived: TypeRef,
    int: TypeRef,
}

/// `Base { Count: int; Run(int); Run(string); Title { get; } }` and
/// `Derived : Base` with no members of its own
fn fixture() -> Fixture {
    let mut b = UniverseBuilder::new();
    let asm = b.add_assembly("Lib", Default::default());
    let int = b.add_type(asm, "System", "Int32", TypeKind::Struct);
    let string = b.add_type(asm, "System", "String", TypeKind::Class);
    let base = b.add_type(asm, "Lib", "Base", TypeKind::Class);
    b.add_field(base, "Count", int);
    b.add_method(base, "Run", &[("value", int.into())], None);
    b.add_method(base, "Run", &[("value", string.into())], None);
    let title = b.add_property(base, "Title", string);
    let get_title = b.add_method(base, "get_Title", &[], Some(string.into()));
    b.set_accessors(title, Some(get_title), None);
    let derived = b.add_type(asm, "Lib", "Derived", TypeKind::Class);
    b.set_base_type(derived, base);
    let universe = b.build().unwrap();

    Fixture {
        base: universe.ty(base).unwrap(),
        derived: universe.ty(derived).unwrap(),
        int: universe.ty(int).unwrap(),
        universe,
    }
}

fn attr(name: &str) -> Attribute {
    Attribute::new(AttributeKind::new(name))
}

fn names(attributes: &[veneer_types::AttributeRef]) -> Vec<String> {
    attributes
        .iter()
        .map(|attr| attr.kind().name().to_string())
        .collect()
}

// ============================================================================
// Member lookups
// ============================================================================

#[test]
fn test_member_reached_through_derived_type_hits_same_entry() {
    let f = fixture();
    let mut builder = AttributeTableBuilder::new();
    let count = f.base.field("Count", BindingFlags::ALL).unwrap();
    builder
        .add_member_attributes(&MemberRef::Field(count), [attr("Range")])
        .unwrap();
    let table = builder.build();

    let via_derived = f.derived.field("Count", BindingFlags::ALL).unwrap();
    assert_eq!(
        via_derived.reflected_type().unwrap().handle(),
        f.derived.handle()
    );
    assert_eq!(
        names(table.member_attributes(&MemberRef::Field(via_derived))),
        ["Range"]
    );
}

#[test]
fn test_overloads_are_distinguished() {
    let f = fixture();
    let run_int = f
        .base
        .method("Run", BindingFlags::ALL, Some(&[f.int.clone()]))
        .unwrap()
        .unwrap();
    let run_string = f
        .base
        .methods(BindingFlags::ALL)
        .into_iter()
        .find(|method| method.name() == "Run" && MethodKey::of(method.as_ref()) != MethodKey::of(run_int.as_ref()))
        .unwrap();

    let mut builder = AttributeTableBuilder::new();
    builder
        .add_member_attributes(&MemberRef::Method(run_int.clone()), [attr("Hot")])
        .unwrap();
    let table = builder.build();

    assert_eq!(names(table.member_attributes(&MemberRef::Method(run_int))), ["Hot"]);
    assert!(table
        .member_attributes(&MemberRef::Method(run_string))
        .is_empty());
}

#[test]
fn test_method_key_ignores_reflected_type() {
    let f = fixture();
    let from_base = f
        .base
        .method("Run", BindingFlags::ALL, Some(&[f.int.clone()]))
        .unwrap()
        .unwrap();
    let from_derived = f
        .derived
        .method("Run", BindingFlags::ALL, Some(&[f.int.clone()]))
        .unwrap()
        .unwrap();

    assert_eq!(MethodKey::of(from_base.as_ref()), MethodKey::of(from_derived.as_ref()));
    assert_eq!(MemberKey::of(from_base.as_ref()), MemberKey::of(from_derived.as_ref()));
}

#[test]
fn test_access_expression_registration() {
    let f = fixture();
    let title = f.base.property("Title", BindingFlags::ALL).unwrap();
    let expr = AccessExpr::property(&f.derived, &title).convert();

    let mut builder = AttributeTableBuilder::new();
    builder.add_access_attributes(&expr, [attr("Display")]).unwrap();
    let table = builder.build();

    assert_eq!(
        names(table.member_attributes(&MemberRef::Property(title.clone()))),
        ["Display"]
    );
    assert!(title.getter().is_some());
    let getter = title.getter().unwrap();
    assert!(table.member_attributes(&MemberRef::Method(getter)).is_empty());
}

#[test]
fn test_custom_members_are_rejected() {
    let f = fixture();
    let count = f.base.field("Count", BindingFlags::ALL).unwrap();
    let custom = MemberRef::Custom(count);

    let mut builder = AttributeTableBuilder::new();
    assert!(builder.add_member_attributes(&custom, [attr("X")]).is_err());
    assert!(AttributeTable::empty().member_attributes(&custom).is_empty());
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameter_overlay_through_derived_handle() {
    let f = fixture();
    let run = f
        .derived
        .method("Run", BindingFlags::ALL, Some(&[f.int.clone()]))
        .unwrap()
        .unwrap();

    let mut builder = AttributeTableBuilder::new();
    let param = run.parameters().remove(0);
    builder
        .add_attributes_to_parameter(param.as_ref(), [attr("Required")])
        .unwrap();
    let table = builder.build();

    let from_base = f
        .base
        .method("Run", BindingFlags::ALL, Some(&[f.int.clone()]))
        .unwrap()
        .unwrap();
    assert_eq!(
        names(table.parameter_attributes(from_base.parameters()[0].as_ref())),
        ["Required"]
    );
    assert!(table
        .parameter_attributes(from_base.return_parameter().unwrap().as_ref())
        .is_empty());
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn test_table_is_shared_across_threads() {
    let f = fixture();
    let mut builder = AttributeTableBuilder::new();
    builder.add_type_attributes(f.base.as_ref(), [attr("Serializable")]);
    let table = Arc::new(builder.build());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = Arc::clone(&table);
            let base = f.base.clone();
            thread::spawn(move || table.type_attributes(base.as_ref()).len())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert!(table.type_attributes(f.derived.as_ref()).is_empty());
    assert_eq!(f.universe.type_count(), 4);
}
