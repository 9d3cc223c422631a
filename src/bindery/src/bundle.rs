//! The process-wide binding table, shared by every [`Registry`] instance.
//!
//! [`Registry`]: crate::registry::Registry

use std::collections::HashMap;

use parking_lot::RwLock;
use snafu::prelude::*;
use tracing::debug;

use crate::catalog;
use crate::recipe::Recipe;

/// A configuration-level failure: missing or rejected binding table entries,
/// as opposed to the resolution failures in
/// [`ResolveError`](crate::resolver::ResolveError).
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum BindingError {
    #[snafu(display("`{id}` is not bound yet"))]
    #[non_exhaustive]
    NotBound { id: String },
    #[snafu(display("`{name}` is neither an instance, a factory, nor a registered type"))]
    #[non_exhaustive]
    InvalidRecipe { name: String },
}

static BUNDLE: RwLock<Option<HashMap<String, Recipe>>> = RwLock::new(None);

/// Atomically replaces the whole table, discarding all prior bindings.
///
/// The bulk path is deliberately unvalidated: a type-name recipe unknown to
/// the catalog surfaces later, at construction time.
pub fn set_all(bindings: HashMap<String, Recipe>) {
    debug!(count = bindings.len(), "replaced all bindings");
    *BUNDLE.write() = Some(bindings);
}

/// Adds or overwrites one binding. Instances and factories always pass;
/// a type-name recipe must be known to the catalog.
pub fn set_one(id: impl Into<String>, recipe: Recipe) -> Result<(), BindingError> {
    if let Recipe::Type(name) = &recipe {
        ensure!(
            catalog::contains(name),
            InvalidRecipeSnafu { name: name.clone() }
        );
    }

    let id = id.into();
    debug!(id = %id, recipe = ?recipe, "bound resource");
    BUNDLE
        .write()
        .get_or_insert_with(HashMap::new)
        .insert(id, recipe);
    Ok(())
}

/// Reads one binding. A missing id is a [`BindingError::NotBound`], which
/// reports missing configuration rather than a missing resolved instance.
pub fn get(id: &str) -> Result<Recipe, BindingError> {
    BUNDLE
        .read()
        .as_ref()
        .and_then(|bundle| bundle.get(id).cloned())
        .context(NotBoundSnafu { id })
}

/// Snapshots the whole table.
pub fn get_all() -> HashMap<String, Recipe> {
    BUNDLE.read().clone().unwrap_or_default()
}

pub fn contains(id: &str) -> bool {
    BUNDLE
        .read()
        .as_ref()
        .is_some_and(|bundle| bundle.contains_key(id))
}

/// Discards the whole table. A test hook, like [`catalog::reset`].
pub fn reset() {
    *BUNDLE.write() = None;
}
