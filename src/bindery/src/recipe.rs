use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::catalog::ParamSpec;
use crate::resolver::ResolveError;
use crate::value::{Args, Object};

/// What a binding resolves to: a pre-built instance returned verbatim, a
/// factory invoked with resolved arguments, or a catalog type name that is
/// introspected and instantiated.
///
/// Recipes are cheap to clone, so the binding table hands copies out and no
/// table lock is held while a resolution runs.
#[derive(Clone)]
pub enum Recipe {
    Instance(Object),
    Factory(Factory),
    Type(String),
}

impl Recipe {
    pub fn instance<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::Instance(Arc::new(value))
    }

    pub fn from_object(object: Object) -> Self {
        Self::Instance(object)
    }

    pub fn factory<F>(params: Vec<ParamSpec>, call: F) -> Self
    where
        F: Fn(Args) -> Result<Object, ResolveError> + Send + Sync + 'static,
    {
        Self::Factory(Factory::new(params, call))
    }

    pub fn of_type(name: impl Into<String>) -> Self {
        Self::Type(name.into())
    }
}

impl Debug for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Instance(_) => f.write_str("Recipe::Instance(..)"),
            Self::Factory(factory) => f.debug_tuple("Recipe::Factory").field(factory).finish(),
            Self::Type(name) => f.debug_tuple("Recipe::Type").field(name).finish(),
        }
    }
}

/// An invocable recipe: a call function plus the parameter descriptors the
/// resolver walks to build its argument list, since closures cannot be
/// introspected at runtime.
#[derive(Clone)]
pub struct Factory {
    params: Vec<ParamSpec>,
    call: Arc<dyn Fn(Args) -> Result<Object, ResolveError> + Send + Sync>,
}

impl Factory {
    pub fn new<F>(params: Vec<ParamSpec>, call: F) -> Self
    where
        F: Fn(Args) -> Result<Object, ResolveError> + Send + Sync + 'static,
    {
        Self {
            params,
            call: Arc::new(call),
        }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn call(&self, args: Args) -> Result<Object, ResolveError> {
        (self.call)(args)
    }
}

impl Debug for Factory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Factory")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
