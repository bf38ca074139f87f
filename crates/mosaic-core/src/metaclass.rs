//! Metaclasses: customization points for class construction
//!
//! The class builder picks the effective metaclass of a definition (explicit,
//! else the superclass's, else [`DefaultMetaClass`]) and drives construction
//! through its hooks. A failing hook rejects the class.

use crate::class::{ClassDefinition, ClassRef};
use crate::error::LangError;
use crate::instance::Instance;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// A class used to construct other classes
pub trait MetaClass: Send + Sync + fmt::Debug {
    /// Name used in class diagnostics (`[object <name> for <class>]`)
    fn name(&self) -> &str;

    /// Inspect or rewrite a definition before it is composed
    fn prepare(&self, _definition: &mut ClassDefinition) -> Result<(), LangError> {
        Ok(())
    }

    /// Called once a class has passed validation
    fn register(&self, _class: &ClassRef) -> Result<(), LangError> {
        Ok(())
    }

    /// Called for every new instance, before `_init` runs
    fn instance_created(&self, _instance: &Instance) -> Result<(), LangError> {
        Ok(())
    }
}

/// Metaclass of plain classes
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMetaClass;

impl MetaClass for DefaultMetaClass {
    fn name(&self) -> &str {
        "Class"
    }
}

static DEFAULT: Lazy<Arc<dyn MetaClass>> = Lazy::new(|| Arc::new(DefaultMetaClass));

/// Shared instance of [`DefaultMetaClass`]
pub fn default_metaclass() -> Arc<dyn MetaClass> {
    DEFAULT.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassBuilder, ClassDefinition};
    use crate::error::HostError;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl MetaClass for Recording {
        fn name(&self) -> &str {
            "RecordingClass"
        }

        fn prepare(&self, definition: &mut ClassDefinition) -> Result<(), LangError> {
            if definition.name.is_none() {
                definition.name = Some("Anonymous".to_string());
            }
            Ok(())
        }

        fn register(&self, class: &ClassRef) -> Result<(), LangError> {
            if class.name() == "Forbidden" {
                return Err(HostError("refused".to_string()).into());
            }
            self.seen.lock().push(class.name().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_metaclass_is_inherited() {
        let meta = Arc::new(Recording::default());
        let builder = ClassBuilder::default();

        let parent = builder
            .build(ClassDefinition::new("Widget").metaclass(meta.clone()))
            .unwrap();
        let child = builder
            .build(ClassDefinition::new("Button").extends(&parent))
            .unwrap();

        assert_eq!(child.metaclass().name(), "RecordingClass");
        assert_eq!(child.to_string(), "[object RecordingClass for Button]");
        assert_eq!(*meta.seen.lock(), vec!["Widget", "Button"]);
    }

    #[test]
    fn test_prepare_runs_before_name_check() {
        let class = ClassBuilder::default()
            .build(ClassDefinition::default().metaclass(Arc::new(Recording::default())))
            .unwrap();
        assert_eq!(class.name(), "Anonymous");
    }

    #[test]
    fn test_register_failure_rejects_class() {
        let meta = Arc::new(Recording::default());
        let err = ClassBuilder::default()
            .build(ClassDefinition::new("Forbidden").metaclass(meta.clone()))
            .unwrap_err();
        assert_eq!(err, LangError::Host(HostError("refused".to_string())));
        assert!(meta.seen.lock().is_empty());
    }

    #[test]
    fn test_default_metaclass_name() {
        assert_eq!(default_metaclass().name(), "Class");
    }
}
