//! Runtime: builders plus a registry of defined names

use crate::class::{ClassBuilder, ClassDefinition, ClassRef};
use crate::config::RuntimeConfig;
use crate::entity::{Entity, TypeRef};
use crate::error::{DefinitionError, EntityKind, LangError};
use crate::interface::{InterfaceBuilder, InterfaceDefinition, InterfaceRef};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Owns the builders and the name registry of one program
#[derive(Debug, Default)]
pub struct Runtime {
    classes: ClassBuilder,
    interfaces: InterfaceBuilder,
    registry: RwLock<FxHashMap<String, TypeRef>>,
}

impl Runtime {
    /// Create a runtime with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime with the given configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            classes: ClassBuilder::new(config),
            interfaces: InterfaceBuilder::new(),
            registry: RwLock::new(FxHashMap::default()),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RuntimeConfig {
        self.classes.config()
    }

    /// Build and register a class
    ///
    /// The name is claimed under the registry lock, which stays held while the
    /// metaclass `register` hook runs.
    pub fn define_class(&self, definition: ClassDefinition) -> Result<ClassRef, LangError> {
        if let Some(name) = definition.name.as_deref() {
            self.check_free(EntityKind::Class, name)?;
        }
        let (class, mut registry) = self.classes.build_admitted(definition, |class| {
            let registry = self.registry.write();
            self.claim(&registry, EntityKind::Class, class.name())?;
            Ok(registry)
        })?;
        let kind = EntityKind::Class;
        debug!(target: "mosaic::runtime", kind = %kind, name = %class.name(), "registered");
        registry.insert(class.name().to_string(), TypeRef::Class(class.clone()));
        Ok(class)
    }

    /// Build and register an interface
    pub fn define_interface(
        &self,
        definition: InterfaceDefinition,
    ) -> Result<InterfaceRef, LangError> {
        if let Some(name) = definition.name.as_deref() {
            self.check_free(EntityKind::Interface, name)?;
        }
        let iface = self.interfaces.build(definition)?;
        self.register(TypeRef::Interface(iface.clone()))?;
        Ok(iface)
    }

    /// Registered class named `name`
    pub fn class(&self, name: &str) -> Option<ClassRef> {
        self.registry
            .read()
            .get(name)
            .and_then(|entry| entry.as_class().cloned())
    }

    /// Registered interface named `name`
    pub fn interface(&self, name: &str) -> Option<InterfaceRef> {
        self.registry
            .read()
            .get(name)
            .and_then(|entry| entry.as_interface().cloned())
    }

    /// Registered entity named `name`, of either kind
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.registry.read().get(name).cloned()
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn check_free(&self, kind: EntityKind, name: &str) -> Result<(), LangError> {
        self.claim(&self.registry.read(), kind, name)
    }

    fn claim(
        &self,
        registry: &FxHashMap<String, TypeRef>,
        kind: EntityKind,
        name: &str,
    ) -> Result<(), LangError> {
        if self.config().unique_names && registry.contains_key(name) {
            return Err(DefinitionError::DuplicateName {
                kind,
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn register(&self, entry: TypeRef) -> Result<(), LangError> {
        let name = entry.entity_name().to_string();
        let kind = entry.entity_kind();
        let mut registry = self.registry.write();
        self.claim(&registry, kind, &name)?;
        debug!(target: "mosaic::runtime", kind = %kind, name = %name, "registered");
        registry.insert(name, entry);
        Ok(())
    }
}
