//! Static-style access to resources of the global registry.
//!
//! A facade names a resource ([`Facade::call_name`]) and says what it should
//! resolve to ([`Facade::call_target`]). The first [`run`](Facade::run)
//! binds the target if the global registry does not already know the name;
//! every call then resolves through the global registry, so all facade users
//! share the pooled instance.

use std::any;

use snafu::prelude::*;

use crate::bundle::{self, BindingError};
use crate::recipe::Recipe;
use crate::registry::global;
use crate::resolver::ResolveError;
use crate::value::Object;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum FacadeError {
    #[snafu(display("could not bind facade target `{name}`"))]
    #[non_exhaustive]
    Bind {
        name: &'static str,
        source: BindingError,
    },
    #[snafu(display("could not resolve facade target `{name}`"))]
    #[non_exhaustive]
    Resolve {
        name: &'static str,
        source: ResolveError,
    },
    #[snafu(display("facade target `{name}` is not a `{expected}`"))]
    #[non_exhaustive]
    Target {
        name: &'static str,
        expected: &'static str,
    },
}

pub trait Facade {
    /// The identifier used for binding and lookup.
    fn call_name() -> &'static str;

    /// What the identifier should resolve to when it is not yet bound.
    fn call_target() -> Recipe;

    /// Resolves the facade's target through the global registry, binding
    /// [`call_name`](Self::call_name) → [`call_target`](Self::call_target)
    /// on first use.
    fn run() -> Result<Object, FacadeError> {
        let name = Self::call_name();
        let registry = global();

        if !registry.has(name) {
            bundle::set_one(name, Self::call_target()).context(BindSnafu { name })?;
        }

        registry.get(name).context(ResolveSnafu { name })
    }

    /// Resolves the target and forwards one invocation to it.
    fn call<T, R, F>(f: F) -> Result<R, FacadeError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) -> R,
    {
        let object = Self::run()?;
        let target = object.downcast_ref::<T>().context(TargetSnafu {
            name: Self::call_name(),
            expected: any::type_name::<T>(),
        })?;
        Ok(f(target))
    }
}
