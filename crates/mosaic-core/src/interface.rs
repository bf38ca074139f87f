//! Interface definitions and the interface builder
//!
//! Interfaces are never constructible. Their members are copied into each
//! implementing class; a member marked [`Slot::Unimplemented`] must be
//! supplied by the implementer. Every function member also gets a generic
//! form on the interface itself, so an override can reach the interface's
//! default with `Iface.call("name", this, args)`.

use crate::class::{add_accessor, PARENT};
use crate::descriptor::{MemberTable, PropertyDescriptor, ProtoChain, Slot};
use crate::entity::{Entity, EntityId, TypeRef};
use crate::error::{DefinitionError, EntityKind, LangError};
use crate::host::PropertySpec;
use crate::instance::Instance;
use crate::method::Method;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Declarative description of an interface
#[derive(Debug, Clone, Default)]
pub struct InterfaceDefinition {
    /// Interface name (required)
    pub name: Option<String>,
    /// Host-facing type name, defaults to `name`
    pub type_name: Option<String>,
    /// Interfaces (or classes) an implementer must already have
    pub requires: Vec<TypeRef>,
    /// Declared members, in declaration order
    pub members: Vec<(String, Slot)>,
    /// Host properties
    pub properties: Vec<PropertySpec>,
    /// Host signals
    pub signals: Vec<String>,
}

impl InterfaceDefinition {
    /// Start a definition for interface `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Append a requirement
    pub fn requires(mut self, required: impl Into<TypeRef>) -> Self {
        self.requires.push(required.into());
        self
    }

    /// Set the host-facing type name
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add a default method
    pub fn method<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        self.members
            .push((name.to_string(), Slot::Method(Method::new(func))));
        self
    }

    /// Declare a member implementers must supply
    pub fn unimplemented(mut self, name: &str) -> Self {
        self.members.push((name.to_string(), Slot::Unimplemented));
        self
    }

    /// Add a default getter
    pub fn getter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        add_accessor(&mut self.members, name, Some(Method::new(func)), None);
        self
    }

    /// Add a default setter
    pub fn setter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        add_accessor(&mut self.members, name, None, Some(Method::new(func)));
        self
    }

    /// Add a plain data member
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.push((name.to_string(), Slot::Value(value.into())));
        self
    }

    /// Declare a host property
    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    /// Declare a host signal
    pub fn signal(mut self, name: impl Into<String>) -> Self {
        self.signals.push(name.into());
        self
    }
}

struct InterfaceInner {
    id: EntityId,
    name: Arc<str>,
    type_name: Arc<str>,
    requires: Vec<TypeRef>,
    members: MemberTable,
    generics: FxHashMap<Arc<str>, Method>,
    properties: Vec<PropertySpec>,
    signals: Vec<String>,
}

/// A built, immutable interface
#[derive(Clone)]
pub struct InterfaceRef(Arc<InterfaceInner>);

impl InterfaceRef {
    /// Interface id
    pub fn id(&self) -> EntityId {
        self.0.id
    }

    /// Interface name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Host-facing type name
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Requirements, in declaration order
    pub fn requires(&self) -> &[TypeRef] {
        &self.0.requires
    }

    /// Members owned by the interface
    pub fn members(&self) -> &MemberTable {
        &self.0.members
    }

    /// Names of members implementers must supply
    pub fn required_members(&self) -> impl Iterator<Item = &str> {
        self.0
            .members
            .iter()
            .filter(|(_, desc)| desc.is_unimplemented())
            .map(|(name, _)| name)
    }

    /// Host properties declared by the interface
    pub fn properties(&self) -> &[PropertySpec] {
        &self.0.properties
    }

    /// Host signals declared by the interface
    pub fn signals(&self) -> &[String] {
        &self.0.signals
    }

    /// Generic form of function member `name`
    pub fn generic(&self, name: &str) -> Option<Method> {
        self.0.generics.get(name).cloned()
    }

    /// Run the interface's own implementation of `name` against `this`
    pub fn call(&self, name: &str, this: &Instance, args: &[Value]) -> Result<Value, LangError> {
        match self.0.generics.get(name) {
            Some(method) => method.invoke(this, args),
            None if self.0.members.contains(name) => Err(LangError::NotCallable {
                class: self.name().to_string(),
                member: name.to_string(),
            }),
            None => Err(LangError::NoSuchMember {
                class: self.name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Interfaces cannot be constructed; always fails
    pub fn instantiate(&self, _args: &[Value]) -> Result<Instance, LangError> {
        Err(DefinitionError::InterfaceInstantiation {
            name: self.name().to_string(),
        }
        .into())
    }
}

impl PartialEq for InterfaceRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for InterfaceRef {}

impl Entity for InterfaceRef {
    fn entity_id(&self) -> EntityId {
        self.0.id
    }

    fn entity_name(&self) -> &str {
        &self.0.name
    }

    fn entity_kind(&self) -> EntityKind {
        EntityKind::Interface
    }
}

impl ProtoChain for InterfaceRef {
    fn chain_name(&self) -> &str {
        &self.0.name
    }

    fn own_members(&self) -> &MemberTable {
        &self.0.members
    }

    fn chain_parent(&self) -> Option<&dyn ProtoChain> {
        None
    }
}

impl fmt::Display for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[interface Interface for {}]", self.0.name)
    }
}

impl fmt::Debug for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceRef({}{})", self.0.name, self.0.id)
    }
}

/// Turns interface definitions into interfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceBuilder;

impl InterfaceBuilder {
    /// Create a builder
    pub fn new() -> Self {
        InterfaceBuilder
    }

    /// Build an interface
    pub fn build(&self, definition: InterfaceDefinition) -> Result<InterfaceRef, LangError> {
        let name: Arc<str> = match definition.name.as_deref() {
            Some(name) => Arc::from(name),
            None => return Err(DefinitionError::MissingName(EntityKind::Interface).into()),
        };

        let mut members = MemberTable::new();
        let mut generics = FxHashMap::default();
        for (member, slot) in definition.members {
            if member == PARENT {
                warn!(target: "mosaic::interface", interface = %name, "member 'parent' is reserved and was ignored");
                continue;
            }
            if let Slot::Method(method) = &slot {
                generics.insert(Arc::from(member.as_str()), method.clone());
            }
            members.define(&member, PropertyDescriptor::new(slot).sealed());
        }

        let type_name = definition
            .type_name
            .as_deref()
            .map(Arc::from)
            .unwrap_or_else(|| name.clone());
        let iface = InterfaceRef(Arc::new(InterfaceInner {
            id: EntityId::next(),
            name,
            type_name,
            requires: definition.requires,
            members,
            generics,
            properties: definition.properties,
            signals: definition.signals,
        }));

        debug!(
            target: "mosaic::interface",
            interface = %iface.name(),
            requires = iface.requires().len(),
            required_members = iface.required_members().count(),
            "interface built"
        );
        Ok(iface)
    }
}
