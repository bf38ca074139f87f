//! Identity shared by classes and interfaces

use crate::class::ClassRef;
use crate::error::EntityKind;
use crate::interface::InterfaceRef;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique entity IDs
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a built class or interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate a fresh id
    pub(crate) fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything `implements` can be asked about
pub trait Entity {
    /// Unique id
    fn entity_id(&self) -> EntityId;

    /// Declared name
    fn entity_name(&self) -> &str;

    /// Class or interface
    fn entity_kind(&self) -> EntityKind;
}

/// Reference to either kind of entity
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A class
    Class(ClassRef),
    /// An interface
    Interface(InterfaceRef),
}

impl TypeRef {
    /// Get the class if this refers to one
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Class(class) => Some(class),
            TypeRef::Interface(_) => None,
        }
    }

    /// Get the interface if this refers to one
    pub fn as_interface(&self) -> Option<&InterfaceRef> {
        match self {
            TypeRef::Interface(iface) => Some(iface),
            TypeRef::Class(_) => None,
        }
    }
}

impl Entity for TypeRef {
    fn entity_id(&self) -> EntityId {
        match self {
            TypeRef::Class(class) => class.entity_id(),
            TypeRef::Interface(iface) => iface.entity_id(),
        }
    }

    fn entity_name(&self) -> &str {
        match self {
            TypeRef::Class(class) => class.name(),
            TypeRef::Interface(iface) => iface.name(),
        }
    }

    fn entity_kind(&self) -> EntityKind {
        match self {
            TypeRef::Class(_) => EntityKind::Class,
            TypeRef::Interface(_) => EntityKind::Interface,
        }
    }
}

impl From<ClassRef> for TypeRef {
    fn from(class: ClassRef) -> Self {
        TypeRef::Class(class)
    }
}

impl From<&ClassRef> for TypeRef {
    fn from(class: &ClassRef) -> Self {
        TypeRef::Class(class.clone())
    }
}

impl From<InterfaceRef> for TypeRef {
    fn from(iface: InterfaceRef) -> Self {
        TypeRef::Interface(iface)
    }
}

impl From<&InterfaceRef> for TypeRef {
    fn from(iface: &InterfaceRef) -> Self {
        TypeRef::Interface(iface.clone())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Class(class) => write!(f, "{}", class),
            TypeRef::Interface(iface) => write!(f, "{}", iface),
        }
    }
}
