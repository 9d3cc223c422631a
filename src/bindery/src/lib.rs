#![allow(clippy::new_without_default)]

pub mod bundle;
pub mod catalog;
pub mod facade;
pub mod recipe;
pub mod registry;
pub mod resolver;
pub mod value;

pub mod prelude {
    pub use crate::bundle::{self, BindingError};
    pub use crate::catalog::{self, ParamSpec, TypeSpec};
    pub use crate::facade::{Facade, FacadeError};
    pub use crate::recipe::{Factory, Recipe};
    pub use crate::registry::{
        global, reset_global, set_global, Registry, RegistryAware, REGISTRY_ID,
    };
    pub use crate::resolver::{Lookup, Overrides, ResolveError, Resolver};
    pub use crate::value::{Args, Object, Value};
}
