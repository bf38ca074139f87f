//! Object instances, member dispatch and `parent` chaining

use crate::class::{ClassRef, PARENT};
use crate::descriptor::Slot;
use crate::entity::Entity;
use crate::error::{ChainError, HostError, LangError};
use crate::host::NativeHandle;
use crate::method::Binding;
use crate::value::Value;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Call-frame record of one instance
#[derive(Default)]
struct FrameState {
    /// Binding of the wrapped method currently running on this instance
    current: Option<Arc<Binding>>,
    /// Number of wrapped calls currently nested on this instance
    depth: usize,
}

struct InstanceInner {
    id: u64,
    class: ClassRef,
    fields: Mutex<FxHashMap<Arc<str>, Value>>,
    frames: Mutex<FrameState>,
    native: OnceCell<NativeHandle>,
}

/// Handle to an object instance
///
/// The call-frame record is per instance. Concurrent calls on the same
/// instance from several threads need external synchronization.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

/// Restores the previous call-frame record when dropped
pub(crate) struct FrameGuard<'a> {
    instance: &'a Instance,
    previous: Option<Arc<Binding>>,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let mut frames = self.instance.0.frames.lock();
        frames.current = self.previous.take();
        frames.depth -= 1;
    }
}

impl Instance {
    pub(crate) fn new(class: ClassRef) -> Self {
        Instance(Arc::new(InstanceInner {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            class,
            fields: Mutex::new(FxHashMap::default()),
            frames: Mutex::new(FrameState::default()),
            native: OnceCell::new(),
        }))
    }

    /// Unique object id
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Class this instance was constructed from
    pub fn class(&self) -> &ClassRef {
        &self.0.class
    }

    /// Whether the instance's class is or implements `target`
    pub fn implements<E: Entity + ?Sized>(&self, target: &E) -> bool {
        self.0.class.implements(target)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Name of the class owning the wrapped method currently running, if any
    pub fn current_owner(&self) -> Option<String> {
        self.0
            .frames
            .lock()
            .current
            .as_ref()
            .map(|b| b.owner().to_string())
    }

    /// Number of wrapped calls currently running on this instance
    pub fn call_depth(&self) -> usize {
        self.0.frames.lock().depth
    }

    pub(crate) fn enter_frame(&self, binding: Arc<Binding>) -> Result<FrameGuard<'_>, LangError> {
        let mut frames = self.0.frames.lock();
        let limit = self.0.class.max_call_depth();
        if frames.depth >= limit {
            return Err(LangError::CallDepthExceeded {
                limit,
                class: binding.owner().to_string(),
                member: binding.member().to_string(),
            });
        }
        trace!(
            target: "mosaic::dispatch",
            object = self.0.id,
            owner = binding.owner(),
            member = binding.member(),
            depth = frames.depth + 1,
            "enter"
        );
        let previous = frames.current.replace(binding);
        frames.depth += 1;
        Ok(FrameGuard {
            instance: self,
            previous,
        })
    }

    /// Call method `name`. Calling `"parent"` chains to the superclass.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, LangError> {
        if name == PARENT {
            return self.parent(args);
        }
        let class = &self.0.class;
        match class.resolve(name).map(|desc| &desc.slot) {
            Some(Slot::Method(method)) => method.invoke(self, args),
            Some(_) => Err(LangError::NotCallable {
                class: class.name().to_string(),
                member: name.to_string(),
            }),
            None => Err(LangError::NoSuchMember {
                class: class.name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Call the superclass version of the wrapped method currently running
    pub fn parent(&self, args: &[Value]) -> Result<Value, LangError> {
        let binding = self
            .0
            .frames
            .lock()
            .current
            .clone()
            .ok_or(ChainError::NoActiveFrame)?;

        let missing = || ChainError::MissingSuperMember {
            class: binding.owner().to_string(),
            member: binding.member().to_string(),
        };
        let superclass = binding.superclass.as_ref().ok_or_else(missing)?;
        match superclass.resolve(binding.member()).map(|desc| &desc.slot) {
            Some(Slot::Method(method)) => method.invoke(self, args),
            Some(_) => Err(ChainError::NotCallable {
                class: binding.owner().to_string(),
                member: binding.member().to_string(),
            }
            .into()),
            None => Err(missing().into()),
        }
    }

    /// Read a member: own field, class value, or getter result
    pub fn get(&self, name: &str) -> Result<Value, LangError> {
        if let Some(value) = self.0.fields.lock().get(name) {
            return Ok(value.clone());
        }
        let class = &self.0.class;
        match class.resolve(name).map(|desc| &desc.slot) {
            None | Some(Slot::Unimplemented) => Ok(Value::Undefined),
            Some(Slot::Value(value)) => Ok(value.clone()),
            Some(Slot::Accessor { get: Some(getter), .. }) => getter.invoke(self, &[]),
            Some(Slot::Accessor { get: None, .. }) => Ok(Value::Undefined),
            Some(Slot::Method(_)) => Err(LangError::NotAValue {
                class: class.name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Write a member: setter if one exists, otherwise an own field
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), LangError> {
        let value = value.into();
        let class = &self.0.class;
        let read_only = || LangError::ReadOnly {
            class: class.name().to_string(),
            member: name.to_string(),
        };
        if let Some(desc) = class.resolve(name) {
            match &desc.slot {
                Slot::Accessor { set: Some(setter), .. } => {
                    setter.invoke(self, &[value])?;
                    return Ok(());
                }
                Slot::Accessor { set: None, .. } | Slot::Method(_) => return Err(read_only()),
                Slot::Value(_) if !desc.writable => return Err(read_only()),
                _ => {}
            }
        }
        self.0.fields.lock().insert(Arc::from(name), value);
        Ok(())
    }

    /// Whether an own field named `name` exists
    pub fn has_field(&self, name: &str) -> bool {
        self.0.fields.lock().contains_key(name)
    }

    /// Names of own fields, sorted
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.fields.lock().keys().map(|k| k.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Host native handle, if one was attached
    pub fn native(&self) -> Option<&NativeHandle> {
        self.0.native.get()
    }

    /// Attach the host native handle; only one may ever be attached
    pub fn attach_native(&self, handle: NativeHandle) -> Result<(), LangError> {
        self.0.native.set(handle).map_err(|_| {
            HostError(format!("{} already has a native handle", self)).into()
        })
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.0.class.name())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({} #{})", self.0.class.name(), self.0.id)
    }
}
