use parking_lot::RwLock;
use tracing::debug;

use super::Registry;

static GLOBAL: RwLock<Option<Registry>> = RwLock::new(None);

/// Returns the process-wide registry, creating it on first access.
pub fn global() -> Registry {
    if let Some(registry) = GLOBAL.read().as_ref() {
        return registry.clone();
    }

    let mut slot = GLOBAL.write();
    slot.get_or_insert_with(Registry::new).clone()
}

/// Replaces the process-wide registry, e.g. with one prepared by test code.
pub fn set_global(registry: Registry) {
    debug!("replaced the global registry");
    *GLOBAL.write() = Some(registry);
}

/// Drops the process-wide registry; the next [`global`] call creates a
/// fresh one.
pub fn reset_global() {
    *GLOBAL.write() = None;
}
