//! Error types for class and interface composition

use std::fmt;
use thiserror::Error;

/// Kind of entity a definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A constructible class
    Class,
    /// A non-constructible interface
    Interface,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Class => write!(f, "Class"),
            EntityKind::Interface => write!(f, "Interface"),
        }
    }
}

/// Malformed definition or illegal instantiation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    /// Definition without a name
    #[error("{0} definitions require an explicit name")]
    MissingName(EntityKind),

    /// Attempt to construct an interface
    #[error("Cannot instantiate interface {name}")]
    InterfaceInstantiation {
        /// Interface name
        name: String,
    },

    /// Attempt to construct an abstract class
    #[error("Cannot instantiate abstract class {name}")]
    AbstractInstantiation {
        /// Class name
        name: String,
    },

    /// Name already taken in the runtime registry
    #[error("{kind} name '{name}' is already defined")]
    DuplicateName {
        /// Kind of the rejected definition
        kind: EntityKind,
        /// Conflicting name
        name: String,
    },
}

/// A member was requested from a chain that does not hold it.
///
/// Raised only when internal member tables disagree with each other.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Member '{member}' not found on {owner} or its ancestors")]
pub struct LookupError {
    /// Name of the chain that was searched
    pub owner: String,
    /// Requested member
    pub member: String,
}

/// Failure of the explicit `parent` chaining primitive
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    /// `parent` used outside any wrapped method
    #[error("The method 'parent' cannot be called outside a class method")]
    NoActiveFrame,

    /// Superclass has no member with the executing method's name
    #[error("The method '{member}' is not on the superclass of {class}")]
    MissingSuperMember {
        /// Class owning the executing method
        class: String,
        /// Executing method name
        member: String,
    },

    /// Superclass member exists but is not a method
    #[error("The member '{member}' on the superclass of {class} is not callable")]
    NotCallable {
        /// Class owning the executing method
        class: String,
        /// Executing method name
        member: String,
    },
}

/// Aggregated ordering and required-member failures for one interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceCompositionError {
    /// Class being built
    pub class: String,
    /// Interface that failed validation
    pub interface: String,
    /// Required interfaces or classes that are missing or declared too late
    pub misordered: Vec<String>,
    /// Required members without a concrete implementation
    pub unimplemented: Vec<String>,
}

impl fmt::Display for InterfaceCompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.class)?;
        if !self.misordered.is_empty() {
            write!(
                f,
                "The following interfaces must be implemented before {}: {}",
                self.interface,
                self.misordered.join(", ")
            )?;
            if !self.unimplemented.is_empty() {
                write!(f, "; ")?;
            }
        }
        if !self.unimplemented.is_empty() {
            write!(
                f,
                "The following members of {} are not implemented yet: {}",
                self.interface,
                self.unimplemented.join(", ")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for InterfaceCompositionError {}

/// Failure reported by a host type system
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct HostError(pub String);

/// Any failure raised while building entities or dispatching members
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LangError {
    /// Malformed definition or illegal instantiation
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Inconsistent member tables
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// `parent` chaining failure
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Interface validation failure
    #[error(transparent)]
    Composition(#[from] InterfaceCompositionError),

    /// Host type system failure
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Dispatch to a member that does not exist
    #[error("{class} has no member '{member}'")]
    NoSuchMember {
        /// Class of the receiver
        class: String,
        /// Requested member
        member: String,
    },

    /// Call of a member that is a value or accessor
    #[error("Member '{member}' of {class} is not callable")]
    NotCallable {
        /// Class of the receiver
        class: String,
        /// Requested member
        member: String,
    },

    /// Read of a method as if it were a value
    #[error("Member '{member}' of {class} is a method, not a value")]
    NotAValue {
        /// Class of the receiver
        class: String,
        /// Requested member
        member: String,
    },

    /// Write to a method, a getter-only accessor or a read-only value
    #[error("Member '{member}' of {class} is read-only")]
    ReadOnly {
        /// Class of the receiver
        class: String,
        /// Requested member
        member: String,
    },

    /// Too many nested wrapped calls on one instance
    #[error("Maximum call depth of {limit} exceeded in {class}.{member}")]
    CallDepthExceeded {
        /// Configured limit
        limit: usize,
        /// Owner of the method that would exceed the limit
        class: String,
        /// Method that would exceed the limit
        member: String,
    },

    /// Error raised by a user-supplied method body
    #[error("{0}")]
    Raised(String),
}

impl LangError {
    /// Raise an error from inside a method body
    pub fn raised(message: impl Into<String>) -> Self {
        LangError::Raised(message.into())
    }

    /// Whether this is an interface composition failure
    pub fn is_composition(&self) -> bool {
        matches!(self, LangError::Composition(_))
    }
}
