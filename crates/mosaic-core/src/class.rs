//! Class definitions and the class builder
//!
//! A [`ClassDefinition`] is consumed once by [`ClassBuilder::build`], which
//! composes the member table (interface defaults first, own members last),
//! validates every declared interface and hands the result to the effective
//! metaclass. Nothing is returned unless all of that succeeds.

use crate::config::RuntimeConfig;
use crate::descriptor::{copy_public_members, MemberTable, PropertyDescriptor, ProtoChain, Slot};
use crate::entity::{Entity, EntityId};
use crate::error::{DefinitionError, EntityKind, LangError};
use crate::host::PropertySpec;
use crate::instance::Instance;
use crate::interface::InterfaceRef;
use crate::metaclass::{default_metaclass, MetaClass};
use crate::method::{Method, Owner};
use crate::validate::validate_interface;
use crate::value::Value;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Reserved member name of the chaining primitive
pub const PARENT: &str = "parent";

/// Member run on instantiation
pub const INIT: &str = "_init";

/// Name of the implicit root class
pub const BASE_NAME: &str = "_Base";

/// Declarative description of a class
#[derive(Debug, Clone, Default)]
pub struct ClassDefinition {
    /// Class name (required)
    pub name: Option<String>,
    /// Host-facing type name, defaults to `name`
    pub type_name: Option<String>,
    /// Superclass, defaults to the implicit root
    pub superclass: Option<ClassRef>,
    /// Implemented interfaces, in declaration order
    pub interfaces: Vec<InterfaceRef>,
    /// Explicit metaclass
    pub metaclass: Option<Arc<dyn MetaClass>>,
    /// Instantiation always fails when set
    pub is_abstract: bool,
    /// Declared members, in declaration order
    pub members: Vec<(String, Slot)>,
    /// Host properties
    pub properties: Vec<PropertySpec>,
    /// Host signals
    pub signals: Vec<String>,
}

impl ClassDefinition {
    /// Start a definition for class `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: &ClassRef) -> Self {
        self.superclass = Some(superclass.clone());
        self
    }

    /// Append an implemented interface
    pub fn implements(mut self, iface: &InterfaceRef) -> Self {
        self.interfaces.push(iface.clone());
        self
    }

    /// Set the metaclass
    pub fn metaclass(mut self, metaclass: Arc<dyn MetaClass>) -> Self {
        self.metaclass = Some(metaclass);
        self
    }

    /// Mark as abstract
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the host-facing type name
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add a method
    pub fn method<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        self.method_value(name, Method::new(func))
    }

    /// Add an existing method (it is rewrapped for this class)
    pub fn method_value(mut self, name: &str, method: Method) -> Self {
        self.members.push((name.to_string(), Slot::Method(method)));
        self
    }

    /// Add a getter, merging with a setter of the same name
    pub fn getter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        add_accessor(&mut self.members, name, Some(Method::new(func)), None);
        self
    }

    /// Add a setter, merging with a getter of the same name
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

/// Merge a getter/setter into `members`, pairing with an existing accessor
pub(crate) fn add_accessor(
    members: &mut Vec<(String, Slot)>,
    name: &str,
    get: Option<Method>,
    set: Option<Method>,
) {
    for (existing, slot) in members.iter_mut() {
        if existing == name {
            if let Slot::Accessor { get: g, set: s } = slot {
                if get.is_some() {
                    *g = get;
                }
                if set.is_some() {
                    *s = set;
                }
                return;
            }
        }
    }
    members.push((name.to_string(), Slot::Accessor { get, set }));
}

pub(crate) struct ClassInner {
    id: EntityId,
    name: Arc<str>,
    type_name: Arc<str>,
    superclass: Option<ClassRef>,
    interfaces: Vec<InterfaceRef>,
    metaclass: Arc<dyn MetaClass>,
    members: MemberTable,
    /// Flattened name -> member table, unimplemented markers skipped
    dispatch: FxHashMap<Arc<str>, PropertyDescriptor>,
    /// Ids of this class, its ancestors and every interface they declare
    ancestry: FxHashSet<EntityId>,
    is_abstract: bool,
    properties: Vec<PropertySpec>,
    signals: Vec<String>,
    max_call_depth: usize,
}

/// A built, immutable class
#[derive(Clone)]
pub struct ClassRef(Arc<ClassInner>);

impl ClassRef {
    /// Class id
    pub fn id(&self) -> EntityId {
        self.0.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Host-facing type name
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Immediate superclass (`None` only for the implicit root)
    pub fn superclass(&self) -> Option<&ClassRef> {
        self.0.superclass.as_ref()
    }

    /// Interfaces this class itself declared, in order
    pub fn interfaces(&self) -> &[InterfaceRef] {
        &self.0.interfaces
    }

    /// Position of `iface` in this class's own declaration list
    pub fn interface_position(&self, iface: &InterfaceRef) -> Option<usize> {
        self.0.interfaces.iter().position(|i| i == iface)
    }

    /// Metaclass that built this class
    pub fn metaclass(&self) -> &Arc<dyn MetaClass> {
        &self.0.metaclass
    }

    /// Whether instantiation is refused
    pub fn is_abstract(&self) -> bool {
        self.0.is_abstract
    }

    /// Members owned by this class
    pub fn own_members(&self) -> &MemberTable {
        &self.0.members
    }

    /// Host properties declared by this class
    pub fn properties(&self) -> &[PropertySpec] {
        &self.0.properties
    }

    /// Host signals declared by this class
    pub fn signals(&self) -> &[String] {
        &self.0.signals
    }

    /// Limit of nested wrapped calls per instance
    pub fn max_call_depth(&self) -> usize {
        self.0.max_call_depth
    }

    /// Resolve a concrete member through the class and its ancestors
    pub fn resolve(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.0.dispatch.get(name)
    }

    /// Names of every member reachable by dispatch, sorted
    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.dispatch.keys().map(|n| n.as_ref()).collect();
        names.sort_unstable();
        names
    }

    /// Whether `target` is this class, an ancestor, or an interface declared
    /// by either
    pub fn implements<E: Entity + ?Sized>(&self, target: &E) -> bool {
        self.0.ancestry.contains(&target.entity_id())
    }

    /// Whether this class is `other` or descends from it
    pub fn inherits(&self, other: &ClassRef) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.superclass();
        }
        false
    }

    /// This class followed by its ancestors, ending at the implicit root
    pub fn ancestors(&self) -> Vec<ClassRef> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(class) = current {
            current = class.superclass().cloned();
            chain.push(class);
        }
        chain
    }

    /// Construct an instance and run `_init` with `args`
    pub fn instantiate(&self, args: &[Value]) -> Result<Instance, LangError> {
        if self.0.is_abstract {
            return Err(DefinitionError::AbstractInstantiation {
                name: self.name().to_string(),
            }
            .into());
        }
        let instance = Instance::new(self.clone());
        self.0.metaclass.instance_created(&instance)?;
        instance.call(INIT, args)?;
        trace!(target: "mosaic::class", class = %self.name(), object = instance.id(), "instantiated");
        Ok(instance)
    }

    /// Construct an instance with no arguments
    pub fn new_instance(&self) -> Result<Instance, LangError> {
        self.instantiate(&[])
    }

    fn assemble(parts: ClassParts) -> ClassRef {
        let mut dispatch = parts
            .superclass
            .as_ref()
            .map(|s| s.0.dispatch.clone())
            .unwrap_or_default();
        for (name, desc) in parts.members.iter() {
            if !desc.is_unimplemented() {
                dispatch.insert(Arc::from(name), desc.clone());
            }
        }

        let mut ancestry = parts
            .superclass
            .as_ref()
            .map(|s| s.0.ancestry.clone())
            .unwrap_or_default();
        ancestry.insert(parts.id);
        ancestry.extend(parts.interfaces.iter().map(|i| i.id()));

        ClassRef(Arc::new(ClassInner {
            id: parts.id,
            name: parts.name,
            type_name: parts.type_name,
            superclass: parts.superclass,
            interfaces: parts.interfaces,
            metaclass: parts.metaclass,
            members: parts.members,
            dispatch,
            ancestry,
            is_abstract: parts.is_abstract,
            properties: parts.properties,
            signals: parts.signals,
            max_call_depth: parts.max_call_depth,
        }))
    }
}

struct ClassParts {
    id: EntityId,
    name: Arc<str>,
    type_name: Arc<str>,
    superclass: Option<ClassRef>,
    interfaces: Vec<InterfaceRef>,
    metaclass: Arc<dyn MetaClass>,
    members: MemberTable,
    is_abstract: bool,
    properties: Vec<PropertySpec>,
    signals: Vec<String>,
    max_call_depth: usize,
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ClassRef {}

impl Entity for ClassRef {
    fn entity_id(&self) -> EntityId {
        self.0.id
    }

    fn entity_name(&self) -> &str {
        &self.0.name
    }

    fn entity_kind(&self) -> EntityKind {
        EntityKind::Class
    }
}

impl ProtoChain for ClassRef {
    fn chain_name(&self) -> &str {
        &self.0.name
    }

    fn own_members(&self) -> &MemberTable {
        &self.0.members
    }

    fn chain_parent(&self) -> Option<&dyn ProtoChain> {
        self.0.superclass.as_ref().map(|s| s as &dyn ProtoChain)
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {} for {}]", self.0.metaclass.name(), self.0.name)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({}{})", self.0.name, self.0.id)
    }
}

static BASE: Lazy<ClassRef> = Lazy::new(|| {
    let mut members = MemberTable::new();
    members.define(
        INIT,
        PropertyDescriptor::new(Slot::Method(Method::new(|_, _| Ok(Value::Undefined))))
            .sealed()
            .hidden(),
    );
    ClassRef::assemble(ClassParts {
        id: EntityId::next(),
        name: Arc::from(BASE_NAME),
        type_name: Arc::from(BASE_NAME),
        superclass: None,
        interfaces: Vec::new(),
        metaclass: default_metaclass(),
        members,
        is_abstract: true,
        properties: Vec::new(),
        signals: Vec::new(),
        max_call_depth: RuntimeConfig::default().max_call_depth,
    })
});

/// The implicit abstract root every class extends
pub fn base_class() -> ClassRef {
    BASE.clone()
}

/// Stage of a single class construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildPhase {
    Pending,
    MembersComposed,
    Validating,
    Usable,
    Rejected,
}

/// Turns class definitions into classes
#[derive(Debug, Clone, Default)]
pub struct ClassBuilder {
    config: RuntimeConfig,
}

impl ClassBuilder {
    /// Create a builder with the given configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Builder configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Build a class; on error no class is produced
    pub fn build(&self, definition: ClassDefinition) -> Result<ClassRef, LangError> {
        self.build_admitted(definition, |_| Ok(()))
            .map(|(class, ())| class)
    }

    /// Build a class, asking `admit` for a ticket once the class validates
    ///
    /// The ticket is held while the metaclass registers the class and is
    /// returned with it. When `admit` fails the metaclass never sees the class.
    pub(crate) fn build_admitted<T>(
        &self,
        mut definition: ClassDefinition,
        admit: impl FnOnce(&ClassRef) -> Result<T, LangError>,
    ) -> Result<(ClassRef, T), LangError> {
        let metaclass = effective_metaclass(&definition);
        metaclass.prepare(&mut definition)?;

        let name: Arc<str> = match definition.name.as_deref() {
            Some(name) => Arc::from(name),
            None => return Err(DefinitionError::MissingName(EntityKind::Class).into()),
        };
        trace!(target: "mosaic::class", class = %name, phase = ?BuildPhase::Pending, metaclass = metaclass.name());

        let owner = Owner {
            id: EntityId::next(),
            name: name.clone(),
            superclass: Some(definition.superclass.clone().unwrap_or_else(base_class)),
        };
        let members = self.compose_members(&definition, &owner)?;
        trace!(target: "mosaic::class", class = %name, phase = ?BuildPhase::MembersComposed, members = members.len());

        let type_name = definition
            .type_name
            .as_deref()
            .map(Arc::from)
            .unwrap_or_else(|| name.clone());
        let class = ClassRef::assemble(ClassParts {
            id: owner.id,
            name: name.clone(),
            type_name,
            superclass: owner.superclass,
            interfaces: definition.interfaces,
            metaclass: metaclass.clone(),
            members,
            is_abstract: definition.is_abstract,
            properties: definition.properties,
            signals: definition.signals,
            max_call_depth: self.config.max_call_depth,
        });

        trace!(target: "mosaic::class", class = %name, phase = ?BuildPhase::Validating);
        for iface in class.interfaces() {
            if let Err(err) = validate_interface(&class, iface) {
                debug!(target: "mosaic::class", class = %name, phase = ?BuildPhase::Rejected, error = %err);
                return Err(err.into());
            }
        }
        let ticket = match admit(&class) {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(target: "mosaic::class", class = %name, phase = ?BuildPhase::Rejected, error = %err);
                return Err(err);
            }
        };
        if let Err(err) = metaclass.register(&class) {
            debug!(target: "mosaic::class", class = %name, phase = ?BuildPhase::Rejected, error = %err);
            return Err(err);
        }

        debug!(
            target: "mosaic::class",
            class = %name,
            phase = ?BuildPhase::Usable,
            superclass = class.superclass().map(|s| s.name()).unwrap_or(BASE_NAME),
            interfaces = class.interfaces().len(),
            "class built"
        );
        Ok((class, ticket))
    }

    fn compose_members(
        &self,
        definition: &ClassDefinition,
        owner: &Owner,
    ) -> Result<MemberTable, LangError> {
        let mut table = MemberTable::new();
        for iface in &definition.interfaces {
            copy_public_members(iface, &mut table, &self.config.private_prefix)?;
        }
        for (name, slot) in &definition.members {
            if name == PARENT {
                warn!(target: "mosaic::class", class = %owner.name, "member 'parent' is reserved and was ignored");
                continue;
            }
            let slot = match slot {
                Slot::Method(method) => Slot::Method(method.wrap(owner.bind(name))),
                other => other.clone(),
            };
            table.define(name, PropertyDescriptor::new(slot).sealed());
        }
        Ok(table)
    }
}

/// Explicit metaclass, else the superclass's, else the default
fn effective_metaclass(definition: &ClassDefinition) -> Arc<dyn MetaClass> {
    definition
        .metaclass
        .clone()
        .or_else(|| definition.superclass.as_ref().map(|s| s.metaclass().clone()))
        .unwrap_or_else(default_metaclass)
}
