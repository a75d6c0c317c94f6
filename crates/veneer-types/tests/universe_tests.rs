//! Integration tests for the in-memory universe
//!
//! These exercise the description traits end to end: navigation, member
//! inheritance, constructed types, interface mapping and identity keys.

use std::sync::Arc;

use veneer_types::model::{MethodIdx, TypeIdx};
use veneer_types::{
    AssemblyDescription, AssemblyVersion, Attribute, AttributeKind, AttributeProvider,
    BindingFlags, MemberDescription, MemberKey, MemberKind, MemberKinds, MetaError, MethodDescription,
    MethodKey, TypeDescription, TypeKind, TypeRef, Universe, UniverseBuilder,
};

struct Fixture {
    universe: Arc<Universe>,
    int: TypeIdx,
    string: TypeIdx,
    shape: TypeIdx,
    circle: TypeIdx,
    drawable: TypeIdx,
    list: TypeIdx,
    area: MethodIdx,
}

fn fixture() -> Fixture {
    let mut b = UniverseBuilder::new();
    let core = b.add_assembly("Core", AssemblyVersion::new(4, 0, 0, 0));
    let geo = b.add_assembly("Geometry", AssemblyVersion::new(1, 2, 0, 0));
    b.add_satellite_assembly(geo, "fr-FR", AssemblyVersion::new(1, 2, 0, 0));

    let int = b.add_type(core, "System", "Int32", TypeKind::Struct);
    let string = b.add_type(core, "System", "String", TypeKind::Class);
    let list = b.add_type(core, "System.Collections", "List`1", TypeKind::Class);
    let item = b.add_generic_parameter(list, "T");
    b.add_method(list, "Add", &[("item", item.handle())], None);

    let drawable = b.add_type(geo, "Geo", "IDrawable", TypeKind::Interface);
    b.add_method(drawable, "Draw", &[("scale", int.handle())], None);

    let shape = b.add_type(geo, "Geo", "Shape", TypeKind::Class);
    b.add_interface(shape, drawable);
    let serializable = AttributeKind::new("SerializableAttribute").with_inherited(true);
    b.add_type_attribute(shape, Attribute::new(serializable));
    b.add_type_attribute(shape, Attribute::new(AttributeKind::new("SealedHintAttribute").with_inherited(false)));
    let area = b.add_method(shape, "Area", &[], Some(int.handle()));
    b.set_virtual(area, true);
    b.add_method(shape, "Draw", &[("scale", int.handle())], None);
    b.add_field(shape, "name", string);
    let hidden = b.add_field(shape, "secret", int);
    b.set_member_public(hidden, false);
    let counter = b.add_field(shape, "Count", int);
    b.set_static(counter, true);

    let circle = b.add_type(geo, "Geo", "Circle", TypeKind::Class);
    b.set_base_type(circle, shape);
    b.add_constructor(circle, &[("radius", int.handle())]);
    let circle_area = b.add_method(circle, "Area", &[], Some(int.handle()));
    b.set_override(circle_area, area);
    b.add_nested_type(circle, "Builder", TypeKind::Class);

    let universe = b.build().unwrap();
    Fixture {
        universe,
        int,
        string,
        shape,
        circle,
        drawable,
        list,
        area,
    }
}

fn ty(f: &Fixture, idx: TypeIdx) -> TypeRef {
    f.universe.ty(idx).unwrap()
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_names_and_assemblies() {
    let f = fixture();
    let circle = ty(&f, f.circle);
    assert_eq!(circle.name(), "Circle");
    assert_eq!(circle.full_name(), "Geo.Circle");
    assert_eq!(circle.namespace().as_deref(), Some("Geo"));
    assert_eq!(circle.assembly().name(), "Geometry");
    assert_eq!(
        circle.assembly().full_name(),
        "Geometry, Version=1.2.0.0, Culture=neutral"
    );
    assert_eq!(circle.base_type().unwrap().handle(), f.shape.handle());

    let builder = circle.nested_type("Builder", BindingFlags::DEFAULT).unwrap();
    assert_eq!(builder.full_name(), "Geo.Circle+Builder");
    assert_eq!(builder.declaring_type().unwrap().handle(), f.circle.handle());
}

#[test]
fn test_inherited_members() {
    let f = fixture();
    let circle = ty(&f, f.circle);

    let methods: Vec<String> = circle
        .methods(BindingFlags::DEFAULT)
        .iter()
        .map(|m| format!("{}:{}", m.declaring_type().unwrap().name(), m.name()))
        .collect();
    assert_eq!(methods, vec!["Circle:Area", "Shape:Draw"]);

    let declared = circle.methods(BindingFlags::DEFAULT | BindingFlags::DECLARED_ONLY);
    assert_eq!(declared.len(), 1);

    // Static and non-public base members are not inherited
    let fields: Vec<String> = circle
        .fields(BindingFlags::ALL)
        .iter()
        .map(|field| field.name())
        .collect();
    assert_eq!(fields, vec!["name"]);

    let shape = ty(&f, f.shape);
    assert_eq!(shape.fields(BindingFlags::ALL).len(), 3);
    assert_eq!(
        shape
            .fields(BindingFlags::INSTANCE | BindingFlags::NON_PUBLIC)
            .len(),
        1
    );
}

#[test]
fn test_member_search() {
    let f = fixture();
    let circle = ty(&f, f.circle);

    let ctor = circle
        .constructor(BindingFlags::DEFAULT, &[ty(&f, f.int)])
        .unwrap();
    assert!(ctor.is_constructor());
    assert!(ctor.return_parameter().is_none());

    let named = circle.member("Area", MemberKinds::METHOD, BindingFlags::DEFAULT);
    assert_eq!(named.len(), 1);

    let found = circle.find_members(MemberKinds::all(), BindingFlags::DEFAULT, &|m| {
        m.kind() == MemberKind::NestedType
    });
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "Builder");

    assert!(circle
        .method("Area", BindingFlags::DEFAULT, Some(&[ty(&f, f.string)]))
        .unwrap()
        .is_none());
}

#[test]
fn test_override_chain() {
    let f = fixture();
    let circle = ty(&f, f.circle);
    let area = circle
        .method("Area", BindingFlags::DEFAULT, None)
        .unwrap()
        .unwrap();
    assert!(area.is_virtual());
    let root = area.base_definition().unwrap();
    assert_eq!(root.declaring_type().unwrap().handle(), f.shape.handle());
    assert!(f.universe.method(f.area).unwrap().base_definition().is_none());
}

#[test]
fn test_inherited_attributes() {
    let f = fixture();
    let circle = ty(&f, f.circle);
    assert!(circle.custom_attributes(None, false).is_empty());

    let inherited = circle.custom_attributes(None, true);
    assert_eq!(inherited.len(), 1);
    assert_eq!(inherited[0].kind().name(), "SerializableAttribute");
    assert_eq!(ty(&f, f.shape).custom_attributes(None, true).len(), 2);
}

// ============================================================================
// Constructed types
// ============================================================================

#[test]
fn test_generic_instantiation() {
    let f = fixture();
    let list = ty(&f, f.list);
    assert!(list.is_generic_type_definition());
    assert_eq!(list.generic_arguments()[0].generic_parameter_position(), Some(0));

    let ints = list.make_generic_type(&[ty(&f, f.int)]).unwrap();
    assert_eq!(ints.full_name(), "System.Collections.List`1[System.Int32]");
    assert!(!ints.is_generic_type_definition());
    assert_eq!(ints.generic_type_definition().unwrap().handle(), f.list.handle());
    assert_eq!(ints.methods(BindingFlags::DEFAULT).len(), 1);
    assert_eq!(
        ints.handle(),
        f.list.instantiate(vec![f.int.handle()])
    );

    assert!(matches!(
        list.make_generic_type(&[]),
        Err(MetaError::InvalidArgument { .. })
    ));
    assert!(matches!(
        ty(&f, f.int).make_generic_type(&[ty(&f, f.int)]),
        Err(MetaError::InvalidOperation { .. })
    ));
}

#[test]
fn test_arrays_and_by_refs() {
    let f = fixture();
    let int = ty(&f, f.int);

    let vector = int.make_array_type(None).unwrap();
    assert_eq!(vector.name(), "Int32[]");
    assert_eq!(vector.array_rank().unwrap(), 1);
    assert_eq!(vector.element_type().unwrap().handle(), f.int.handle());
    assert_eq!(vector.kind(), TypeKind::Array);

    let matrix = int.make_array_type(Some(2)).unwrap();
    assert_eq!(matrix.full_name(), "System.Int32[,]");
    assert!(int.make_array_type(Some(0)).is_err());

    let by_ref = int.make_by_ref_type().unwrap();
    assert_eq!(by_ref.name(), "Int32&");
    assert!(by_ref.make_by_ref_type().is_err());
    assert!(by_ref.make_array_type(None).is_err());
    assert!(int.array_rank().is_err());
}

#[test]
fn test_assignability() {
    let f = fixture();
    let shape = ty(&f, f.shape);
    let circle = ty(&f, f.circle);
    let drawable = ty(&f, f.drawable);

    assert!(shape.is_assignable_from(&circle));
    assert!(!circle.is_assignable_from(&shape));
    assert!(drawable.is_assignable_from(&circle));
    assert!(circle.is_subclass_of(&shape));
    assert!(!circle.is_subclass_of(&circle));

    let shapes = shape.make_array_type(None).unwrap();
    let circles = circle.make_array_type(None).unwrap();
    assert!(shapes.is_assignable_from(&circles));
}

#[test]
fn test_interface_map() {
    let f = fixture();
    let circle = ty(&f, f.circle);
    let drawable = ty(&f, f.drawable);

    assert_eq!(circle.interfaces().len(), 1);
    assert!(circle.interface("idrawable", true).is_some());

    let map = circle.interface_map(&drawable).unwrap();
    assert_eq!(map.interface_methods.len(), 1);
    assert_eq!(
        map.target_methods[0].declaring_type().unwrap().handle(),
        f.shape.handle()
    );
    assert!(circle.interface_map(&ty(&f, f.int)).is_err());
}

// ============================================================================
// Assemblies
// ============================================================================

#[test]
fn test_assembly_lookups() {
    let f = fixture();
    let geometry = ty(&f, f.circle).assembly();

    let found = geometry.get_type("geo.shape", false, true).unwrap().unwrap();
    assert_eq!(found.handle(), f.shape.handle());
    assert!(geometry.get_type("Geo.Missing", false, false).unwrap().is_none());
    assert!(matches!(
        geometry.get_type("Geo.Missing", true, false),
        Err(MetaError::TypeNotFound { .. })
    ));

    let satellite = geometry.satellite_assembly("fr-fr", None).unwrap();
    assert_eq!(satellite.name(), "Geometry.resources");
    assert_eq!(satellite.culture().as_deref(), Some("fr-FR"));
    assert!(geometry
        .satellite_assembly("fr-FR", Some(AssemblyVersion::new(9, 0, 0, 0)))
        .is_err());
    assert_eq!(geometry.exported_types().len(), 4);
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_descriptions_compare_by_identity() {
    let f = fixture();
    let a = ty(&f, f.circle);
    let b = f.universe.find_type("Geo.Circle").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(&a, &b);
    assert_ne!(&a, &ty(&f, f.shape));
}

#[test]
fn test_keys_ignore_reflected_type() {
    let f = fixture();
    let circle = ty(&f, f.circle);
    let shape = ty(&f, f.shape);

    let via_derived = circle.method("Draw", BindingFlags::DEFAULT, None).unwrap().unwrap();
    let via_declaring = shape.method("Draw", BindingFlags::DEFAULT, None).unwrap().unwrap();

    // Different member identities, same declaration
    assert_ne!(via_derived.identity(), via_declaring.identity());
    assert_eq!(
        MethodKey::of(via_derived.as_ref()),
        MethodKey::of(via_declaring.as_ref())
    );

    let name_derived = circle.field("name", BindingFlags::DEFAULT).unwrap();
    let name_declaring = shape.field("name", BindingFlags::DEFAULT).unwrap();
    assert_eq!(
        MemberKey::of(name_derived.as_ref()),
        MemberKey::of(name_declaring.as_ref())
    );
}

#[test]
fn test_builder_rejects_cycles() {
    let mut b = UniverseBuilder::new();
    let asm = b.add_assembly("Loop", AssemblyVersion::default());
    let a = b.add_type(asm, "", "A", TypeKind::Class);
    let c = b.add_type(asm, "", "C", TypeKind::Class);
    b.set_base_type(a, c);
    b.set_base_type(c, a);
    assert!(matches!(b.build(), Err(MetaError::InvalidArgument { .. })));
}

#[test]
fn test_builder_rejects_bad_parameter_position() {
    let mut b = UniverseBuilder::new();
    let asm = b.add_assembly("Bad", AssemblyVersion::default());
    let t = b.add_type(asm, "", "T", TypeKind::Class);
    let m = b.add_method(t, "M", &[], None);
    b.add_parameter_attribute(m, 0, Attribute::new(AttributeKind::new("X")));
    assert!(b.build().is_err());
}
