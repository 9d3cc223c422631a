//! Parameter descriptors and the process-wide type catalog.
//!
//! Constructible types are described by manually-authored descriptor tables
//! instead of runtime reflection: a [`TypeSpec`] names a type and, if it is
//! concrete, lists its constructor parameters and carries the function that
//! builds an instance from a resolved argument list.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::resolver::ResolveError;
use crate::value::{Args, Object, Value};

/// Builds an instance from an already-resolved argument list.
pub type BuildFn = Arc<dyn Fn(Args) -> Result<Object, ResolveError> + Send + Sync>;

/// Describes one constructor or factory parameter: its name, its candidate
/// types in declaration order (empty means untyped), whether it tolerates
/// null, and an optional declared default.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    name: &'static str,
    types: Vec<&'static str>,
    nullable: bool,
    default: Option<Value>,
}

impl ParamSpec {
    /// An untyped, non-nullable parameter without a default.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            types: Vec::new(),
            nullable: false,
            default: None,
        }
    }

    /// A parameter with a single declared type.
    pub fn typed(name: &'static str, ty: &'static str) -> Self {
        Self::new(name).of(ty)
    }

    /// Appends a candidate type. Calling this repeatedly declares a union;
    /// the call order is the declaration order the resolver tie-breaks on.
    pub fn of(mut self, ty: &'static str) -> Self {
        self.types.push(ty);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn candidates(&self) -> &[&'static str] {
        &self.types
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// The catalog entry for one named type.
#[derive(Clone)]
pub struct TypeSpec {
    name: &'static str,
    kind: TypeKind,
}

#[derive(Clone)]
enum TypeKind {
    /// Known to the catalog but not instantiable (an interface or abstract
    /// type that bindings may name as an alias target).
    Abstract,
    Concrete {
        params: Vec<ParamSpec>,
        build: BuildFn,
    },
}

impl TypeSpec {
    pub fn abstract_type(name: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Abstract,
        }
    }

    /// A concrete type with the given constructor parameters. An empty
    /// parameter list means the type is instantiated without arguments.
    pub fn concrete<F>(name: &'static str, params: Vec<ParamSpec>, build: F) -> Self
    where
        F: Fn(Args) -> Result<Object, ResolveError> + Send + Sync + 'static,
    {
        Self {
            name,
            kind: TypeKind::Concrete {
                params,
                build: Arc::new(build),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_instantiable(&self) -> bool {
        matches!(self.kind, TypeKind::Concrete { .. })
    }

    pub(crate) fn as_concrete(&self) -> Option<(&[ParamSpec], &BuildFn)> {
        match &self.kind {
            TypeKind::Concrete { params, build } => Some((params, build)),
            TypeKind::Abstract => None,
        }
    }
}

impl Debug for TypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let kind = match self.kind {
            TypeKind::Abstract => "abstract",
            TypeKind::Concrete { .. } => "concrete",
        };
        f.debug_struct("TypeSpec")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

static CATALOG: RwLock<Option<HashMap<&'static str, TypeSpec>>> = RwLock::new(None);

/// Registers a type descriptor, overwriting any previous entry of the same
/// name.
pub fn register(spec: TypeSpec) {
    trace!(name = spec.name(), "registered type");
    let mut catalog = CATALOG.write();
    catalog
        .get_or_insert_with(HashMap::new)
        .insert(spec.name(), spec);
}

pub fn contains(name: &str) -> bool {
    CATALOG
        .read()
        .as_ref()
        .is_some_and(|catalog| catalog.contains_key(name))
}

pub fn lookup(name: &str) -> Option<TypeSpec> {
    CATALOG
        .read()
        .as_ref()
        .and_then(|catalog| catalog.get(name).cloned())
}

/// Empties the catalog. A test hook: production code registers types once
/// at startup and never tears them down.
pub fn reset() {
    *CATALOG.write() = None;
}
