//! Interface Composition Tests
//!
//! Interfaces composed onto classes, end to end:
//! - Required members and requirement ordering
//! - Deferring to and chaining up to interface defaults
//! - Interface getters and setters
//! - Interfaces implemented on a superclass
//! - Interfaces that require a class
//!
//! # Running Tests
//! ```bash
//! cargo test --test interface_tests
//! ```

use mosaic_core::{
    ClassDefinition, ClassRef, DefinitionError, InterfaceDefinition, InterfaceRef, LangError,
    Runtime, Value,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// The interfaces and classes most tests share
struct Fixture {
    runtime: Runtime,
    my_interface: InterfaceRef,
    my_other_interface: InterfaceRef,
    my_object: ClassRef,
    my_demanding_interface: InterfaceRef,
}

fn text(s: &str) -> Result<Value, LangError> {
    Ok(Value::from(s))
}

fn join(head: &str, tail: Value) -> Result<Value, LangError> {
    Ok(Value::string(format!("{}\n{}", head, tail)))
}

fn fixture() -> Fixture {
    let runtime = Runtime::new();

    // `usesThis` reaches a private member through the interface's generic form
    let own: Arc<OnceCell<InterfaceRef>> = Arc::new(OnceCell::new());
    let uses_this = own.clone();
    let my_interface = runtime
        .define_interface(
            InterfaceDefinition::new("MyInterface")
                .unimplemented("required")
                .method("optional", |_, _| text("MyInterface.optional()"))
                .method("optionalGeneric", |_, _| text("MyInterface.optionalGeneric()"))
                .method("usesThis", move |this, args| {
                    let iface = uses_this.get().expect("MyInterface is defined");
                    iface.call("_interfacePrivateMethod", this, args)
                })
                .method("_interfacePrivateMethod", |_, _| text("interface private method"))
                .getter("some_prop", |_, _| text("MyInterface.some_prop getter"))
                .setter("some_prop", |this, _| {
                    this.set("some_prop_setter_called", true)?;
                    Ok(Value::Undefined)
                }),
        )
        .unwrap();
    own.set(my_interface.clone()).unwrap();

    let base = my_interface.clone();
    let generic = my_interface.clone();
    let my_other_interface = runtime
        .define_interface(
            InterfaceDefinition::new("MyOtherInterface")
                .requires(&my_interface)
                .method("optional", move |this, args| {
                    join("MyOtherInterface.optional()", base.call("optional", this, args)?)
                })
                .method("optionalGeneric", move |this, args| {
                    join(
                        "MyOtherInterface.optionalGeneric()",
                        generic.call("optionalGeneric", this, args)?,
                    )
                }),
        )
        .unwrap();

    let chain_optional = my_interface.clone();
    let chain_generic = my_interface.clone();
    let my_object = runtime
        .define_class(
            ClassDefinition::new("MyObject")
                .implements(&my_interface)
                .method("_init", |this, _| this.parent(&[]))
                .method("required", |_, _| Ok(Value::Undefined))
                .method("optional", move |this, args| {
                    chain_optional.call("optional", this, args)
                })
                .method("optionalGeneric", move |this, args| {
                    chain_generic.call("optionalGeneric", this, args)
                }),
        )
        .unwrap();

    let my_demanding_interface = runtime
        .define_interface(
            InterfaceDefinition::new("MyDemandingInterface")
                .requires(&my_object)
                .requires(&my_other_interface),
        )
        .unwrap();

    Fixture {
        runtime,
        my_interface,
        my_other_interface,
        my_object,
        my_demanding_interface,
    }
}

fn minimal(f: &Fixture, name: &str, interfaces: &[&InterfaceRef]) -> Result<ClassRef, LangError> {
    let mut def = ClassDefinition::new(name).method("required", |_, _| Ok(Value::Undefined));
    for iface in interfaces {
        def = def.implements(iface);
    }
    f.runtime.define_class(def)
}

// ===== Construction =====

#[test]
fn test_interface_cannot_be_instantiated() {
    let f = fixture();
    assert_eq!(
        f.my_interface.instantiate(&[]).unwrap_err(),
        LangError::Definition(DefinitionError::InterfaceInstantiation {
            name: "MyInterface".to_string()
        })
    );
}

#[test]
fn test_object_can_implement_interface() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    assert_eq!(obj.class(), &f.my_object);
    obj.call("required", &[]).unwrap();
}

#[test]
fn test_object_does_not_implement_unrelated_interfaces() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert!(!obj.implements(&f.my_other_interface));
    assert!(!obj.implements(&f.my_demanding_interface));

    let sub = f
        .runtime
        .define_class(ClassDefinition::new("SubObject").extends(&f.my_object))
        .unwrap();
    assert!(sub.implements(&f.my_object));
    assert!(!f.my_object.implements(&sub));
    assert!(!obj.implements(&sub));
}

#[test]
fn test_class_must_implement_required_function() {
    let f = fixture();
    let err = f
        .runtime
        .define_class(ClassDefinition::new("MyBadObject").implements(&f.my_interface))
        .unwrap_err();
    assert!(err.is_composition());
    assert!(err.to_string().contains("not implemented yet: required"));
    assert!(f.runtime.class("MyBadObject").is_none());
}

#[test]
fn test_class_doesnt_have_to_implement_optional_function() {
    let f = fixture();
    let class = minimal(&f, "MyMinimalObject", &[&f.my_interface]).unwrap();
    let obj = class.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    assert_eq!(obj.call("optional", &[]).unwrap(), Value::from("MyInterface.optional()"));
}

// ===== Chaining =====

#[test]
fn test_object_can_chain_up_to_interface() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert_eq!(obj.call("optional", &[]).unwrap(), Value::from("MyInterface.optional()"));
    assert_eq!(
        obj.call("optionalGeneric", &[]).unwrap(),
        Value::from("MyInterface.optionalGeneric()")
    );
}

#[test]
fn test_interface_can_chain_up_to_other_interface() {
    let f = fixture();
    let chain_optional = f.my_other_interface.clone();
    let chain_generic = f.my_other_interface.clone();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("MyOtherObject")
                .implements(&f.my_interface)
                .implements(&f.my_other_interface)
                .method("required", |_, _| Ok(Value::Undefined))
                .method("optional", move |this, args| {
                    chain_optional.call("optional", this, args)
                })
                .method("optionalGeneric", move |this, args| {
                    chain_generic.call("optionalGeneric", this, args)
                }),
        )
        .unwrap();

    let obj = class.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    assert!(obj.implements(&f.my_other_interface));
    assert_eq!(
        obj.call("optional", &[]).unwrap(),
        Value::from("MyOtherInterface.optional()\nMyInterface.optional()")
    );
    assert_eq!(
        obj.call("optionalGeneric", &[]).unwrap(),
        Value::from("MyOtherInterface.optionalGeneric()\nMyInterface.optionalGeneric()")
    );
}

#[test]
fn test_object_defers_to_last_interface_optional_function() {
    let f = fixture();
    let class = minimal(
        &f,
        "MyOtherMinimalObject",
        &[&f.my_interface, &f.my_other_interface],
    )
    .unwrap();
    let obj = class.new_instance().unwrap();
    assert_eq!(
        obj.call("optionalGeneric", &[]).unwrap(),
        Value::from("MyOtherInterface.optionalGeneric()\nMyInterface.optionalGeneric()")
    );
}

#[test]
fn test_generic_form_survives_override() {
    let f = fixture();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("Overrider")
                .implements(&f.my_interface)
                .method("required", |_, _| Ok(Value::Undefined))
                .method("optional", |_, _| text("Overrider.optional()")),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();
    assert_eq!(obj.call("optional", &[]).unwrap(), Value::from("Overrider.optional()"));
    for _ in 0..3 {
        assert_eq!(
            f.my_interface.call("optional", &obj, &[]).unwrap(),
            Value::from("MyInterface.optional()")
        );
    }
}

#[test]
fn test_interface_methods_can_call_other_members() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert_eq!(
        obj.call("usesThis", &[]).unwrap(),
        Value::from("interface private method")
    );
}

#[test]
fn test_private_interface_members_not_copied() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert!(matches!(
        obj.call("_interfacePrivateMethod", &[]),
        Err(LangError::NoSuchMember { .. })
    ));
    assert_eq!(
        f.my_interface
            .call("_interfacePrivateMethod", &obj, &[])
            .unwrap(),
        Value::from("interface private method")
    );
}

// ===== Accessors =====

#[test]
fn test_object_can_defer_to_interface_getter_and_setter() {
    let f = fixture();
    let obj = f.my_object.new_instance().unwrap();
    assert_eq!(
        obj.get("some_prop").unwrap(),
        Value::from("MyInterface.some_prop getter")
    );
    obj.set("some_prop", "foobar").unwrap();
    assert_eq!(obj.get("some_prop_setter_called").unwrap(), Value::from(true));
}

#[test]
fn test_object_can_override_interface_getter() {
    let f = fixture();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("MyGetterObject")
                .implements(&f.my_interface)
                .method("required", |_, _| Ok(Value::Undefined))
                .getter("some_prop", |_, _| text("MyGetterObject.some_prop getter")),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();
    assert_eq!(
        obj.get("some_prop").unwrap(),
        Value::from("MyGetterObject.some_prop getter")
    );
}

#[test]
fn test_object_can_override_interface_setter() {
    let f = fixture();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("MySetterObject")
                .implements(&f.my_interface)
                .method("required", |_, _| Ok(Value::Undefined))
                .setter("some_prop", |this, _| {
                    this.set("overridden_some_prop_setter_called", true)?;
                    Ok(Value::Undefined)
                }),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();
    obj.set("some_prop", "foobar").unwrap();
    assert_eq!(
        obj.get("overridden_some_prop_setter_called").unwrap(),
        Value::from(true)
    );
    assert!(obj.get("some_prop_setter_called").unwrap().is_undefined());
    assert!(obj.get("some_prop").unwrap().is_undefined());
}

// ===== Requirements =====

#[test]
fn test_class_must_implement_all_required_interfaces() {
    let f = fixture();
    let err = minimal(&f, "MyBadObject", &[&f.my_other_interface]).unwrap_err();
    assert!(err
        .to_string()
        .contains("must be implemented before MyOtherInterface: MyInterface"));
}

#[test]
fn test_class_must_implement_required_interfaces_in_order() {
    let f = fixture();
    let err = minimal(
        &f,
        "MyBadObject",
        &[&f.my_other_interface, &f.my_interface],
    )
    .unwrap_err();
    match err {
        LangError::Composition(e) => {
            assert_eq!(e.class, "MyBadObject");
            assert_eq!(e.interface, "MyOtherInterface");
            assert_eq!(e.misordered, vec!["MyInterface".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_interfaces_can_be_implemented_on_a_parent_class() {
    let f = fixture();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("MyParentalObject")
                .extends(&f.my_object)
                .implements(&f.my_other_interface),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    assert!(obj.implements(&f.my_other_interface));
}

#[test]
fn test_interfaces_can_require_being_implemented_on_a_subclass() {
    let f = fixture();
    let class = f
        .runtime
        .define_class(
            ClassDefinition::new("MyConformingObject")
                .extends(&f.my_object)
                .implements(&f.my_other_interface)
                .implements(&f.my_demanding_interface),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    assert!(obj.implements(&f.my_other_interface));
    assert!(obj.implements(&f.my_demanding_interface));
}

#[test]
fn test_objects_must_subclass_if_required() {
    let f = fixture();
    let err = minimal(
        &f,
        "MyNonConformingObject",
        &[
            &f.my_interface,
            &f.my_other_interface,
            &f.my_demanding_interface,
        ],
    )
    .unwrap_err();
    match err {
        LangError::Composition(e) => {
            assert_eq!(e.interface, "MyDemandingInterface");
            assert_eq!(e.misordered, vec!["MyObject".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_subclass_implements_the_same_interface_as_its_parent() {
    let f = fixture();
    let sub = f
        .runtime
        .define_class(ClassDefinition::new("SubObject").extends(&f.my_object))
        .unwrap();
    assert!(sub.new_instance().unwrap().implements(&f.my_interface));

    let reimplementer = f
        .runtime
        .define_class(
            ClassDefinition::new("SubImplementer")
                .extends(&f.my_object)
                .implements(&f.my_interface),
        )
        .unwrap();
    let obj = reimplementer.new_instance().unwrap();
    assert!(obj.implements(&f.my_interface));
    obj.call("required", &[]).unwrap();
}

// ===== Required members satisfied by sibling interfaces =====

#[test]
fn test_later_interface_default_satisfies_earlier_requirement() {
    let runtime = Runtime::new();
    let needs = runtime
        .define_interface(InterfaceDefinition::new("NeedsSize").unimplemented("size"))
        .unwrap();
    let gives = runtime
        .define_interface(InterfaceDefinition::new("GivesSize").method("size", |_, _| Ok(Value::from(4))))
        .unwrap();

    let class = runtime
        .define_class(ClassDefinition::new("Sized").implements(&needs).implements(&gives))
        .unwrap();
    assert_eq!(class.new_instance().unwrap().call("size", &[]).unwrap(), Value::from(4));

    // The reverse order leaves the later sentinel on top
    let err = runtime
        .define_class(ClassDefinition::new("Unsized").implements(&gives).implements(&needs))
        .unwrap_err();
    assert!(err.to_string().contains("members of NeedsSize are not implemented yet: size"));
}

// ===== End to end =====

#[test]
fn test_speaker_dog_cat() {
    let runtime = Runtime::new();
    let speaker = runtime
        .define_interface(
            InterfaceDefinition::new("Speaker")
                .method("greet", |_, _| text("Speaker.greet()"))
                .unimplemented("name"),
        )
        .unwrap();

    let dog = runtime
        .define_class(
            ClassDefinition::new("Dog")
                .implements(&speaker)
                .method("name", |_, _| text("Rex")),
        )
        .unwrap();
    let rex = dog.new_instance().unwrap();
    assert_eq!(rex.call("greet", &[]).unwrap(), Value::from("Speaker.greet()"));
    assert_eq!(rex.call("name", &[]).unwrap(), Value::from("Rex"));
    assert!(rex.implements(&speaker));

    let err = runtime
        .define_class(ClassDefinition::new("Cat").implements(&speaker))
        .unwrap_err();
    match err {
        LangError::Composition(e) => assert_eq!(e.unimplemented, vec!["name".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_ordering_end_to_end() {
    let runtime = Runtime::new();
    let a = runtime.define_interface(InterfaceDefinition::new("A")).unwrap();
    let b = runtime
        .define_interface(InterfaceDefinition::new("B").requires(&a))
        .unwrap();

    let err = runtime
        .define_class(ClassDefinition::new("BA").implements(&b).implements(&a))
        .unwrap_err();
    assert!(err.to_string().contains(": A"));

    let class = runtime
        .define_class(ClassDefinition::new("AB").implements(&a).implements(&b))
        .unwrap();
    let obj = class.new_instance().unwrap();
    assert!(obj.implements(&a));
    assert!(obj.implements(&b));
}
