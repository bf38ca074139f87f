//! Mosaic Object Model
//!
//! This crate provides runtime-defined classes and interfaces:
//! - **Classes**: single inheritance, wrapped methods and explicit `parent` chaining (`class` module)
//! - **Interfaces**: mixin-style default members, required members and requirements (`interface` module)
//! - **Validation**: ordering and required-member checks run while a class is built (`validate` module)
//! - **Metaclasses**: construction hooks and the host type-system boundary (`metaclass`, `host` modules)
//! - **Runtime**: builders plus a registry of defined names (`runtime` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use mosaic_core::{ClassDefinition, InterfaceDefinition, Runtime, Value};
//!
//! let runtime = Runtime::new();
//! let speaker = runtime.define_interface(
//!     InterfaceDefinition::new("Speaker")
//!         .method("greet", |this, _| Ok(Value::string(format!("Hello, {}", this.get("name")?))))
//!         .unimplemented("name"),
//! )?;
//! let dog = runtime.define_class(
//!     ClassDefinition::new("Dog")
//!         .implements(&speaker)
//!         .value("name", "Rex"),
//! )?;
//!
//! let rex = dog.new_instance()?;
//! assert_eq!(rex.call("greet", &[])?, Value::from("Hello, Rex"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Object Model
// ============================================================================

/// Class definitions, the class builder and the implicit root
pub mod class;

/// Member descriptors and the descriptor copier
pub mod descriptor;

/// Entity identity shared by classes and interfaces
pub mod entity;

/// Object instances and member dispatch
pub mod instance;

/// Interface definitions and the interface builder
pub mod interface;

/// Native methods and the call-frame wrapper
pub mod method;

/// Interface validation
pub mod validate;

/// Dynamic values
pub mod value;

// ============================================================================
// Construction Hooks & Runtime
// ============================================================================

/// Configuration
pub mod config;

/// Error types
pub mod error;

/// Host type-system boundary
pub mod host;

/// Metaclasses
pub mod metaclass;

/// Runtime registry
pub mod runtime;

// Re-export commonly used types
pub use class::{base_class, ClassBuilder, ClassDefinition, ClassRef, BASE_NAME, INIT, PARENT};
pub use config::{ConfigError, RuntimeConfig};
pub use descriptor::{
    copy_member, copy_public_members, find_descriptor, MemberTable, PropertyDescriptor,
    ProtoChain, Slot,
};
pub use entity::{Entity, EntityId, TypeRef};
pub use error::{
    ChainError, DefinitionError, EntityKind, HostError, InterfaceCompositionError, LangError,
    LookupError,
};
pub use host::{
    DeclaredProperty, HostMetaClass, HostTypeId, HostTypeSystem, NativeHandle, PropertyFlags,
    PropertySpec, TypeRegistration,
};
pub use instance::Instance;
pub use interface::{InterfaceBuilder, InterfaceDefinition, InterfaceRef};
pub use metaclass::{default_metaclass, DefaultMetaClass, MetaClass};
pub use method::{Binding, Method, NativeMethod};
pub use runtime::Runtime;
pub use validate::validate_interface;
pub use value::Value;
