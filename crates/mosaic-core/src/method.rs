//! Native methods and the call-frame wrapper
//!
//! Every function member a class declares is wrapped with a [`Binding`]
//! naming the owning class and member. While a wrapped method runs, the
//! receiver's call-frame record points at that binding; `parent` reads it to
//! find the superclass implementation of the running member.

use crate::class::ClassRef;
use crate::error::LangError;
use crate::instance::Instance;
use crate::value::Value;
use crate::EntityId;
use std::fmt;
use std::sync::Arc;

/// Signature of every method body
pub type NativeMethod = dyn Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync;

/// Owner record attached to a wrapped method
#[derive(Debug, Clone)]
pub struct Binding {
    pub(crate) owner_id: EntityId,
    pub(crate) owner: Arc<str>,
    pub(crate) superclass: Option<ClassRef>,
    pub(crate) member: Arc<str>,
}

impl Binding {
    /// Name of the class whose body declared the method
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Member name the method was declared under
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Id of the owning class
    pub fn owner_id(&self) -> EntityId {
        self.owner_id
    }
}

/// Class-side information needed to wrap members before the class exists
#[derive(Debug, Clone)]
pub(crate) struct Owner {
    pub(crate) id: EntityId,
    pub(crate) name: Arc<str>,
    pub(crate) superclass: Option<ClassRef>,
}

impl Owner {
    pub(crate) fn bind(&self, member: &str) -> Binding {
        Binding {
            owner_id: self.id,
            owner: self.name.clone(),
            superclass: self.superclass.clone(),
            member: Arc::from(member),
        }
    }
}

/// A callable member, optionally wrapped with an owner binding
#[derive(Clone)]
pub struct Method {
    func: Arc<NativeMethod>,
    binding: Option<Arc<Binding>>,
}

impl Method {
    /// Create an unwrapped method from a closure
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, LangError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            binding: None,
        }
    }

    /// Wrap this method's origin for `owner.member`.
    ///
    /// Wrapping an already wrapped method rebinds its original body.
    pub(crate) fn wrap(&self, binding: Binding) -> Method {
        Method {
            func: self.func.clone(),
            binding: Some(Arc::new(binding)),
        }
    }

    /// The unwrapped body
    pub fn origin(&self) -> Method {
        Method {
            func: self.func.clone(),
            binding: None,
        }
    }

    /// Owner binding, if wrapped
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_deref()
    }

    /// Whether the method carries an owner binding
    pub fn is_wrapped(&self) -> bool {
        self.binding.is_some()
    }

    /// Whether two methods share the same body
    pub fn same_origin(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }

    /// Invoke with `this` as receiver.
    ///
    /// For wrapped methods the receiver's call-frame record points at this
    /// binding for the duration of the call and is restored afterwards, also
    /// when the body fails.
    pub fn invoke(&self, this: &Instance, args: &[Value]) -> Result<Value, LangError> {
        match &self.binding {
            None => (self.func)(this, args),
            Some(binding) => {
                let _frame = this.enter_frame(binding.clone())?;
                (self.func)(this, args)
            }
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(b) => write!(f, "Method({}.{})", b.owner, b.member),
            None => write!(f, "Method(<unbound>)"),
        }
    }
}
