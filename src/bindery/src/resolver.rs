//! The autowiring resolver: turns a [`Recipe`] plus explicit overrides into
//! a constructed object, pulling dependencies from a [`Lookup`].

use std::collections::HashMap;

use snafu::prelude::*;
use tracing::trace;

use crate::catalog::{self, ParamSpec};
use crate::recipe::{Factory, Recipe};
use crate::value::{Args, Object, Value};

/// The lookup protocol every resolution client consumes. [`Registry`]
/// implements it; tests substitute a mock.
///
/// [`Registry`]: crate::registry::Registry
#[cfg_attr(test, mockall::automock)]
pub trait Lookup: Send + Sync {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Result<Object, ResolveError>;
}

/// Explicit per-parameter overrides, keyed by parameter name. An override is
/// used verbatim, without type checking, and takes priority over every other
/// resolution rule.
pub type Overrides = HashMap<String, Value>;

/// A resolution failure. [`ResolveError::NotFound`] is the distinguished
/// registry miss; the remaining variants are construction errors. The enum
/// is `Clone` so one failure can be fanned out to every waiter blocked on
/// the same in-flight construction.
#[derive(Clone, Debug, Snafu)]
#[non_exhaustive]
pub enum ResolveError {
    #[snafu(display("could not find resource `{id}` in the registry"))]
    #[non_exhaustive]
    NotFound { id: String },
    #[snafu(display("could not instantiate `{name}` which is not a registered type"))]
    #[non_exhaustive]
    UnknownType { name: String },
    #[snafu(display("could not instantiate `{name}` which is not a concrete type"))]
    #[non_exhaustive]
    NotInstantiable { name: String },
    #[snafu(display("could not resolve the required parameter `{name}`"))]
    #[non_exhaustive]
    ParameterUnresolved { name: String },
    #[snafu(display("parameter `{param}` does not hold a value of type `{expected}`"))]
    #[non_exhaustive]
    ParameterType {
        param: String,
        expected: &'static str,
    },
    #[snafu(display("could not construct `{id}` which depends on itself"))]
    #[non_exhaustive]
    CyclicDependency { id: String },
}

/// The stateless resolution algorithm, parameterized by the lookup that
/// satisfies type-matched parameters.
pub struct Resolver<'a> {
    lookup: &'a dyn Lookup,
}

impl<'a> Resolver<'a> {
    pub fn new(lookup: &'a dyn Lookup) -> Self {
        Self { lookup }
    }

    /// Constructs an object from `recipe`. Pre-built instances are returned
    /// as-is; factories and catalog types have their parameter lists
    /// resolved in declaration order first.
    pub fn make(&self, recipe: &Recipe, overrides: &Overrides) -> Result<Object, ResolveError> {
        match recipe {
            Recipe::Instance(object) => Ok(Object::clone(object)),
            Recipe::Factory(factory) => self.invoke_factory(factory, overrides),
            Recipe::Type(name) => self.instantiate(name, overrides),
        }
    }

    fn invoke_factory(
        &self,
        factory: &Factory,
        overrides: &Overrides,
    ) -> Result<Object, ResolveError> {
        let args = self.resolve_args(factory.params(), overrides)?;
        factory.call(args)
    }

    fn instantiate(&self, name: &str, overrides: &Overrides) -> Result<Object, ResolveError> {
        let spec = catalog::lookup(name).context(UnknownTypeSnafu { name })?;
        let (params, build) = spec
            .as_concrete()
            .context(NotInstantiableSnafu { name })?;

        trace!(name, "instantiating type");
        let args = self.resolve_args(params, overrides)?;
        build(args)
    }

    fn resolve_args(
        &self,
        params: &[ParamSpec],
        overrides: &Overrides,
    ) -> Result<Args, ResolveError> {
        let values = params
            .iter()
            .map(|param| Ok((param.name(), self.resolve_param(param, overrides)?)))
            .collect::<Result<Vec<_>, ResolveError>>()?;
        Ok(Args::new(values))
    }

    /// Resolves one parameter: override, then the first declared candidate
    /// type the lookup recognizes (declaration order is the tie-break), then
    /// the null fallback for nullable typed parameters, then the declared
    /// default, and otherwise a hard failure.
    fn resolve_param(
        &self,
        param: &ParamSpec,
        overrides: &Overrides,
    ) -> Result<Value, ResolveError> {
        if let Some(value) = overrides.get(param.name()) {
            return Ok(value.clone());
        }

        for candidate in param.candidates() {
            if self.lookup.has(candidate) {
                return self.lookup.get(candidate).map(Value::Object);
            }
        }

        if !param.candidates().is_empty() && param.is_nullable() {
            return Ok(Value::Null);
        }

        if let Some(default) = param.default_value() {
            return Ok(default.clone());
        }

        ParameterUnresolvedSnafu { name: param.name() }.fail()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::catalog::TypeSpec;
    use crate::test_support;

    use super::*;

    fn no_overrides() -> Overrides {
        Overrides::new()
    }

    #[test]
    fn make_returns_identical_object_when_recipe_is_an_instance() {
        let lookup = MockLookup::new();
        let object: Object = Arc::new(7i32);
        let recipe = Recipe::from_object(Arc::clone(&object));

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert!(Arc::ptr_eq(&made, &object));
    }

    #[test]
    fn make_uses_override_without_consulting_the_lookup() {
        // No expectations: any `has`/`get` call would panic the mock.
        let lookup = MockLookup::new();
        let recipe = Recipe::factory(vec![ParamSpec::typed("x", "Bound")], |args| {
            args.arc::<i32>("x").map(|x| x as Object)
        });

        let mut overrides = Overrides::new();
        overrides.insert(String::from("x"), Value::of(9i32));

        let made = Resolver::new(&lookup).make(&recipe, &overrides).unwrap();
        assert_eq!(*made.downcast_ref::<i32>().unwrap(), 9);
    }

    #[test]
    fn make_passes_mismatched_overrides_through_to_the_factory() {
        let lookup = MockLookup::new();
        let recipe = Recipe::factory(vec![ParamSpec::typed("x", "Bound")], |args| {
            args.arc::<i32>("x").map(|x| x as Object)
        });

        let mut overrides = Overrides::new();
        overrides.insert(String::from("x"), Value::of("not a number"));

        let err = Resolver::new(&lookup).make(&recipe, &overrides).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterType { param, .. } if param == "x"
        ));
    }

    #[test]
    fn make_prefers_first_declared_candidate_when_both_are_bound() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().withf(|id| id == "A").return_const(true);
        lookup
            .expect_get()
            .withf(|id| id == "A")
            .returning(|_| Ok(Arc::new("from A") as Object));

        let recipe = Recipe::factory(vec![ParamSpec::typed("dep", "A").of("B")], |args| {
            args.arc::<&str>("dep").map(|dep| dep as Object)
        });

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert_eq!(*made.downcast_ref::<&str>().unwrap(), "from A");
    }

    #[test]
    fn make_skips_candidates_the_lookup_does_not_recognize() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().withf(|id| id == "A").return_const(false);
        lookup.expect_has().withf(|id| id == "B").return_const(true);
        lookup
            .expect_get()
            .withf(|id| id == "B")
            .returning(|_| Ok(Arc::new("from B") as Object));

        let recipe = Recipe::factory(vec![ParamSpec::typed("dep", "A").of("B")], |args| {
            args.arc::<&str>("dep").map(|dep| dep as Object)
        });

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert_eq!(*made.downcast_ref::<&str>().unwrap(), "from B");
    }

    #[test]
    fn make_yields_null_when_nullable_type_is_unbound() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().return_const(false);

        let recipe = Recipe::factory(vec![ParamSpec::typed("dep", "A").nullable()], |args| {
            let dep = args.opt_arc::<i32>("dep")?;
            Ok(Arc::new(dep.is_none()) as Object)
        });

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert!(*made.downcast_ref::<bool>().unwrap());
    }

    #[test]
    fn make_uses_default_when_parameter_is_untyped() {
        let lookup = MockLookup::new();
        let recipe = Recipe::factory(
            vec![ParamSpec::new("retries").with_default(Value::of(3usize))],
            |args| args.arc::<usize>("retries").map(|retries| retries as Object),
        );

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert_eq!(*made.downcast_ref::<usize>().unwrap(), 3);
    }

    #[test]
    fn make_uses_default_when_typed_parameter_is_unbound() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().return_const(false);

        let recipe = Recipe::factory(
            vec![ParamSpec::typed("dep", "A").with_default(Value::of(1i32))],
            |args| args.arc::<i32>("dep").map(|dep| dep as Object),
        );

        let made = Resolver::new(&lookup).make(&recipe, &no_overrides()).unwrap();
        assert_eq!(*made.downcast_ref::<i32>().unwrap(), 1);
    }

    #[test]
    fn make_fails_when_required_parameter_is_unresolvable() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().return_const(false);

        let recipe = Recipe::factory(vec![ParamSpec::typed("dep", "A")], |args| {
            args.arc::<i32>("dep").map(|dep| dep as Object)
        });

        let err = Resolver::new(&lookup)
            .make(&recipe, &no_overrides())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterUnresolved { name } if name == "dep"
        ));
    }

    #[test]
    fn make_propagates_nested_resolution_errors() {
        let mut lookup = MockLookup::new();
        lookup.expect_has().withf(|id| id == "A").return_const(true);
        lookup.expect_get().withf(|id| id == "A").returning(|_| {
            Err(ResolveError::ParameterUnresolved {
                name: String::from("inner"),
            })
        });

        let recipe = Recipe::factory(vec![ParamSpec::typed("dep", "A")], |args| {
            args.arc::<i32>("dep").map(|dep| dep as Object)
        });

        let err = Resolver::new(&lookup)
            .make(&recipe, &no_overrides())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterUnresolved { name } if name == "inner"
        ));
    }

    #[test]
    fn make_fails_when_type_is_unknown() {
        let _guard = test_support::shared_state_lock();
        let lookup = MockLookup::new();

        let err = Resolver::new(&lookup)
            .make(&Recipe::of_type("Ghost"), &no_overrides())
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownType { name } if name == "Ghost"));
    }

    #[test]
    fn make_fails_when_type_is_abstract() {
        let _guard = test_support::shared_state_lock();
        catalog::register(TypeSpec::abstract_type("Port"));
        let lookup = MockLookup::new();

        let err = Resolver::new(&lookup)
            .make(&Recipe::of_type("Port"), &no_overrides())
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotInstantiable { name } if name == "Port"));
    }

    #[test]
    fn make_builds_catalog_type_with_resolved_parameters() {
        let _guard = test_support::shared_state_lock();
        catalog::register(TypeSpec::concrete(
            "Greeter",
            vec![ParamSpec::typed("name", "Name")],
            |args| {
                let name = args.cloned::<String>("name")?;
                Ok(Arc::new(format!("hello {name}")) as Object)
            },
        ));

        let mut lookup = MockLookup::new();
        lookup.expect_has().withf(|id| id == "Name").return_const(true);
        lookup
            .expect_get()
            .withf(|id| id == "Name")
            .returning(|_| Ok(Arc::new(String::from("world")) as Object));

        let made = Resolver::new(&lookup)
            .make(&Recipe::of_type("Greeter"), &no_overrides())
            .unwrap();
        assert_eq!(*made.downcast_ref::<String>().unwrap(), "hello world");
    }
}
