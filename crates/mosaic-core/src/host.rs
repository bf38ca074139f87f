//! Boundary to a host object/type system
//!
//! A host registers classes as native types and backs every instance with a
//! native object. The core only hands over the resolved class (members,
//! interfaces, declared properties and signals); how the host stores them is
//! its own business. [`HostMetaClass`] is the metaclass that drives a
//! [`HostTypeSystem`].

use crate::class::{ClassDefinition, ClassRef};
use crate::error::{HostError, LangError};
use crate::instance::Instance;
use crate::metaclass::MetaClass;
use crate::value::Value;
use crate::EntityId;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque native object attached to an instance
pub type NativeHandle = Arc<dyn Any + Send + Sync>;

/// Host-assigned type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostTypeId(pub u64);

/// Access flags of a host property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFlags {
    /// Property can be read
    pub readable: bool,
    /// Property can be written
    pub writable: bool,
}

impl PropertyFlags {
    /// Read-only
    pub const READABLE: PropertyFlags = PropertyFlags {
        readable: true,
        writable: false,
    };

    /// Read-write
    pub const READWRITE: PropertyFlags = PropertyFlags {
        readable: true,
        writable: true,
    };
}

/// A property declared for the host
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    /// Property name
    pub name: String,
    /// Default value
    pub default: Value,
    /// Access flags
    pub flags: PropertyFlags,
}

impl PropertySpec {
    /// Create a property spec
    pub fn new(name: impl Into<String>, default: impl Into<Value>, flags: PropertyFlags) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            flags,
        }
    }
}

/// A property together with the entity that declared it
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredProperty {
    /// Declaring class or interface (type name)
    pub declared_by: String,
    /// The property
    pub spec: PropertySpec,
}

/// Everything a host needs to register one class
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRegistration {
    /// Host-facing type name
    pub type_name: String,
    /// Host-facing type name of the superclass
    pub parent_type_name: Option<String>,
    /// Names of all members reachable by dispatch, sorted
    pub members: Vec<String>,
    /// Host-facing names of the declared interfaces, in order
    pub interfaces: Vec<String>,
    /// Properties of the class and of its interfaces
    pub properties: Vec<DeclaredProperty>,
    /// Signals of the class and of its interfaces
    pub signals: Vec<String>,
    /// Interface properties the class and its ancestors do not re-declare
    pub unoverridden: Vec<String>,
}

impl TypeRegistration {
    /// Collect the registration data of a built class
    pub fn for_class(class: &ClassRef) -> Self {
        let mut properties: Vec<DeclaredProperty> = class
            .properties()
            .iter()
            .map(|spec| DeclaredProperty {
                declared_by: class.type_name().to_string(),
                spec: spec.clone(),
            })
            .collect();
        let mut signals: Vec<String> = Vec::new();
        let mut add_signal = |signal: &String| {
            if !signals.contains(signal) {
                signals.push(signal.clone());
            }
        };
        class.signals().iter().for_each(&mut add_signal);
        let mut unoverridden = Vec::new();

        for iface in class.interfaces() {
            for spec in iface.properties() {
                if !declared_by_lineage(class, &spec.name) {
                    unoverridden.push(spec.name.clone());
                }
                properties.push(DeclaredProperty {
                    declared_by: iface.type_name().to_string(),
                    spec: spec.clone(),
                });
            }
            iface.signals().iter().for_each(&mut add_signal);
        }

        Self {
            type_name: class.type_name().to_string(),
            parent_type_name: class.superclass().map(|s| s.type_name().to_string()),
            members: class.member_names().into_iter().map(str::to_string).collect(),
            interfaces: class
                .interfaces()
                .iter()
                .map(|i| i.type_name().to_string())
                .collect(),
            properties,
            signals,
            unoverridden,
        }
    }
}

fn declared_by_lineage(class: &ClassRef, property: &str) -> bool {
    class
        .ancestors()
        .iter()
        .any(|c| c.properties().iter().any(|p| p.name == property))
}

/// A host object/type system
pub trait HostTypeSystem: Send + Sync {
    /// Register a class as a native type
    fn register_type(&self, registration: &TypeRegistration) -> Result<HostTypeId, HostError>;

    /// Create the native object backing `instance`
    fn construct_native(
        &self,
        type_id: HostTypeId,
        instance: &Instance,
    ) -> Result<NativeHandle, HostError>;
}

/// Metaclass registering its classes with a host type system
pub struct HostMetaClass<H> {
    name: String,
    host: H,
    types: RwLock<FxHashMap<EntityId, HostTypeId>>,
}

impl<H: HostTypeSystem> HostMetaClass<H> {
    /// Create a host metaclass named `name`
    pub fn new(name: impl Into<String>, host: H) -> Self {
        Self {
            name: name.into(),
            host,
            types: RwLock::new(FxHashMap::default()),
        }
    }

    /// The host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Host type registered for `class`
    pub fn type_id_of(&self, class: &ClassRef) -> Option<HostTypeId> {
        self.types.read().get(&class.id()).copied()
    }

    /// Host type of `class` or of its nearest registered ancestor
    fn lookup_type(&self, class: &ClassRef) -> Option<HostTypeId> {
        let types = self.types.read();
        class
            .ancestors()
            .iter()
            .find_map(|c| types.get(&c.id()).copied())
    }
}

impl<H> fmt::Debug for HostMetaClass<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostMetaClass")
            .field("name", &self.name)
            .field("types", &self.types.read().len())
            .finish()
    }
}

impl<H: HostTypeSystem> MetaClass for HostMetaClass<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, definition: &mut ClassDefinition) -> Result<(), LangError> {
        let mut seen = Vec::with_capacity(definition.properties.len());
        for spec in &definition.properties {
            if seen.contains(&spec.name.as_str()) {
                return Err(HostError(format!(
                    "property '{}' declared twice on {}",
                    spec.name,
                    definition.name.as_deref().unwrap_or("<unnamed>")
                ))
                .into());
            }
            seen.push(spec.name.as_str());
        }
        Ok(())
    }

    fn register(&self, class: &ClassRef) -> Result<(), LangError> {
        let registration = TypeRegistration::for_class(class);
        for property in &registration.unoverridden {
            warn!(
                target: "mosaic::host",
                class = %class.name(),
                property = %property,
                "class doesn't implement interface property"
            );
        }
        let type_id = self.host.register_type(&registration)?;
        self.types.write().insert(class.id(), type_id);
        debug!(target: "mosaic::host", class = %class.name(), type_id = type_id.0, "registered with host");
        Ok(())
    }

    fn instance_created(&self, instance: &Instance) -> Result<(), LangError> {
        let type_id = self.lookup_type(instance.class()).ok_or_else(|| {
            HostError(format!("{} is not registered with the host", instance.class().name()))
        })?;
        let handle = self.host.construct_native(type_id, instance)?;
        instance.attach_native(handle)
    }
}
