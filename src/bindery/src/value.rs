use std::any::{self, Any};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::resolver::ResolveError;

/// A type-erased, shareable object handle. Reference identity is
/// [`Arc::ptr_eq`]; handing a pooled object out clones the `Arc`, never the
/// value behind it.
pub type Object = Arc<dyn Any + Send + Sync>;

/// A resolved argument: either an [`Object`] or the null produced by the
/// nullable fallback.
#[derive(Clone)]
pub enum Value {
    Object(Object),
    Null,
}

impl Value {
    pub fn of<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::Object(Arc::new(value))
    }

    pub fn object(object: Object) -> Self {
        Self::Object(object)
    }

    pub fn null() -> Self {
        Self::Null
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            Self::Null => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(|object| object.downcast_ref())
    }

    pub fn downcast_arc<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.as_object()
            .and_then(|object| Arc::clone(object).downcast().ok())
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Object(_) => f.write_str("Value::Object(..)"),
            Self::Null => f.write_str("Value::Null"),
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

/// The argument list handed to a factory or constructor, in declaration
/// order, with each entry labeled by its parameter name.
///
/// Overrides are injected verbatim, so the typed accessors are where a
/// mismatched value finally surfaces, as a [`ResolveError::ParameterType`].
pub struct Args {
    values: Vec<(&'static str, Value)>,
}

impl Args {
    pub(crate) fn new(values: Vec<(&'static str, Value)>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }

    /// Returns the named argument as an `Arc<T>`. Null or a value of another
    /// type is a construction error.
    pub fn arc<T>(&self, name: &str) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        match self.opt_arc(name)? {
            Some(object) => Ok(object),
            None => Err(ResolveError::ParameterType {
                param: name.to_owned(),
                expected: any::type_name::<T>(),
            }),
        }
    }

    /// Returns the named argument as an `Arc<T>`, or `None` if it resolved
    /// to null.
    pub fn opt_arc<T>(&self, name: &str) -> Result<Option<Arc<T>>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        let value = self
            .value(name)
            .ok_or_else(|| ResolveError::ParameterUnresolved {
                name: name.to_owned(),
            })?;
        match value {
            Value::Null => Ok(None),
            Value::Object(_) => {
                value
                    .downcast_arc()
                    .map(Some)
                    .ok_or_else(|| ResolveError::ParameterType {
                        param: name.to_owned(),
                        expected: any::type_name::<T>(),
                    })
            }
        }
    }

    /// Clones the named argument out of its `Arc`.
    pub fn cloned<T>(&self, name: &str) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.arc::<T>(name).map(|object| (*object).clone())
    }
}
