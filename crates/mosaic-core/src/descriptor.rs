//! Member descriptors, member tables and descriptor copying
//!
//! A [`MemberTable`] is the ordered name → descriptor map owned by one level
//! of a prototype chain (a class or an interface). [`copy_member`] installs a
//! member found anywhere along a source chain onto a target table, keeping
//! its exact kind (value, method, getter, setter, getter + setter) and
//! enumerability.

use crate::error::LookupError;
use crate::method::Method;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// What a member holds
#[derive(Clone)]
pub enum Slot {
    /// Plain data member
    Value(Value),
    /// Callable member
    Method(Method),
    /// Accessor pair; either side may be absent
    Accessor {
        /// Getter
        get: Option<Method>,
        /// Setter
        set: Option<Method>,
    },
    /// No default implementation; an implementer must supply one
    Unimplemented,
}

impl Slot {
    /// Short kind label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Value(_) => "value",
            Slot::Method(_) => "method",
            Slot::Accessor {
                get: Some(_),
                set: Some(_),
            } => "accessor",
            Slot::Accessor { get: Some(_), .. } => "getter",
            Slot::Accessor { set: Some(_), .. } => "setter",
            Slot::Accessor { .. } => "accessor",
            Slot::Unimplemented => "unimplemented",
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Slot::Method(m) => f.debug_tuple("Method").field(m).finish(),
            Slot::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
            Slot::Unimplemented => write!(f, "Unimplemented"),
        }
    }
}

/// A member together with its attributes
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Member payload
    pub slot: Slot,
    /// Visible to enumeration
    pub enumerable: bool,
    /// Value members may be shadowed by instance fields
    pub writable: bool,
    /// Members installed on a built entity are never configurable
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Descriptor with the attributes of a declared member
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            enumerable: true,
            writable: true,
            configurable: true,
        }
    }

    /// Mark as non-configurable
    pub fn sealed(mut self) -> Self {
        self.configurable = false;
        self
    }

    /// Mark as non-enumerable
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    /// Whether this marks a member an implementer must supply
    pub fn is_unimplemented(&self) -> bool {
        matches!(self.slot, Slot::Unimplemented)
    }

    /// Method payload, if any
    pub fn as_method(&self) -> Option<&Method> {
        match &self.slot {
            Slot::Method(m) => Some(m),
            _ => None,
        }
    }
}

/// Ordered member table of one chain level
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    /// Name to entry index mapping
    indices: FxHashMap<Arc<str>, usize>,
    /// Entries in definition order
    entries: Vec<(Arc<str>, PropertyDescriptor)>,
}

impl MemberTable {
    /// Create new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a member; redefining keeps the original position
    pub fn define(&mut self, name: &str, descriptor: PropertyDescriptor) {
        if let Some(&index) = self.indices.get(name) {
            self.entries[index].1 = descriptor;
            return;
        }
        let name: Arc<str> = Arc::from(name);
        self.indices.insert(name.clone(), self.entries.len());
        self.entries.push((name, descriptor));
    }

    /// Get member by name
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.indices.get(name).map(|&index| &self.entries[index].1)
    }

    /// Check if member exists (including unimplemented markers)
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Member names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_ref())
    }

    /// Entries in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.entries.iter().map(|(name, desc)| (name.as_ref(), desc))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One level of a prototype chain
pub trait ProtoChain {
    /// Name of this level, for diagnostics
    fn chain_name(&self) -> &str;

    /// Members owned by this level
    fn own_members(&self) -> &MemberTable;

    /// Next level up, if any
    fn chain_parent(&self) -> Option<&dyn ProtoChain>;
}

/// Find the descriptor of `name` at the first level of the chain that owns it
pub fn find_descriptor<'a>(source: &'a dyn ProtoChain, name: &str) -> Option<&'a PropertyDescriptor> {
    let mut level = Some(source);
    while let Some(current) = level {
        if let Some(desc) = current.own_members().get(name) {
            return Some(desc);
        }
        level = current.chain_parent();
    }
    None
}

/// Copy member `name` from `source`'s chain onto `target`, non-configurable
pub fn copy_member(
    source: &dyn ProtoChain,
    target: &mut MemberTable,
    name: &str,
) -> Result<(), LookupError> {
    let desc = find_descriptor(source, name).ok_or_else(|| LookupError {
        owner: source.chain_name().to_string(),
        member: name.to_string(),
    })?;
    target.define(name, desc.clone().sealed());
    Ok(())
}

/// Copy every own member of `source` whose name lacks `private_prefix`
///
/// Returns the number of members copied.
pub fn copy_public_members(
    source: &dyn ProtoChain,
    target: &mut MemberTable,
    private_prefix: &str,
) -> Result<usize, LookupError> {
    let names: Vec<&str> = source
        .own_members()
        .names()
        .filter(|name| !name.starts_with(private_prefix))
        .collect();
    for name in &names {
        copy_member(source, target, name)?;
    }
    Ok(names.len())
}
