//! Interface validation run during class construction

use crate::class::ClassRef;
use crate::entity::{Entity, TypeRef};
use crate::error::InterfaceCompositionError;
use crate::interface::InterfaceRef;

/// Check `iface` against a freshly composed `class`.
///
/// Ordering: each interface `iface` requires must sit earlier in the class's
/// own list, or already be implemented by the superclass. A required class
/// must be the class itself or one of its ancestors.
///
/// Members: each unimplemented member of `iface` must resolve to a concrete
/// member on the class or an ancestor. Because interface members are copied
/// in declaration order, a later interface's default satisfies an earlier
/// interface's requirement, but not the other way round.
pub fn validate_interface(
    class: &ClassRef,
    iface: &InterfaceRef,
) -> Result<(), InterfaceCompositionError> {
    let own_index = class.interface_position(iface);

    let misordered: Vec<String> = iface
        .requires()
        .iter()
        .filter(|required| !requirement_met(class, own_index, required))
        .map(|required| required.entity_name().to_string())
        .collect();

    let unimplemented: Vec<String> = iface
        .required_members()
        .filter(|name| class.resolve(name).is_none())
        .map(str::to_string)
        .collect();

    if misordered.is_empty() && unimplemented.is_empty() {
        return Ok(());
    }
    Err(InterfaceCompositionError {
        class: class.name().to_string(),
        interface: iface.name().to_string(),
        misordered,
        unimplemented,
    })
}

fn requirement_met(class: &ClassRef, own_index: Option<usize>, required: &TypeRef) -> bool {
    match required {
        TypeRef::Class(required) => class.inherits(required),
        TypeRef::Interface(required) => {
            let earlier = match (class.interface_position(required), own_index) {
                (Some(at), Some(own)) => at < own,
                _ => false,
            };
            earlier
                || class
                    .superclass()
                    .is_some_and(|superclass| superclass.implements(required))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassBuilder, ClassDefinition};
    use crate::interface::{InterfaceBuilder, InterfaceDefinition};
    use crate::value::Value;

    fn a_and_b() -> (InterfaceRef, InterfaceRef) {
        let builder = InterfaceBuilder::new();
        let a = builder.build(InterfaceDefinition::new("A")).unwrap();
        let b = builder
            .build(InterfaceDefinition::new("B").requires(&a))
            .unwrap();
        (a, b)
    }

    #[test]
    fn test_required_interface_must_come_first() {
        let (a, b) = a_and_b();
        let builder = ClassBuilder::default();

        let err = builder
            .build(ClassDefinition::new("Wrong").implements(&b).implements(&a))
            .unwrap_err();
        match err {
            crate::LangError::Composition(e) => {
                assert_eq!(e.interface, "B");
                assert_eq!(e.misordered, vec!["A".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(builder
            .build(ClassDefinition::new("Right").implements(&a).implements(&b))
            .is_ok());
    }

    #[test]
    fn test_missing_requirement_named() {
        let (_, b) = a_and_b();
        let err = ClassBuilder::default()
            .build(ClassDefinition::new("Lonely").implements(&b))
            .unwrap_err();
        assert!(err.to_string().contains("before B: A"));
    }

    #[test]
    fn test_all_failures_aggregated() {
        let builder = InterfaceBuilder::new();
        let a = builder.build(InterfaceDefinition::new("A")).unwrap();
        let c = builder
            .build(
                InterfaceDefinition::new("C")
                    .requires(&a)
                    .unimplemented("x")
                    .unimplemented("y"),
            )
            .unwrap();

        let err = ClassBuilder::default()
            .build(
                ClassDefinition::new("Partial")
                    .implements(&c)
                    .method("y", |_, _| Ok(Value::Undefined)),
            )
            .unwrap_err();
        match err {
            crate::LangError::Composition(e) => {
                assert_eq!(e.misordered, vec!["A".to_string()]);
                assert_eq!(e.unimplemented, vec!["x".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
