use std::collections::HashMap;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use crate::bundle;
use crate::recipe::Recipe;
use crate::resolver::{Lookup, Overrides, ResolveError, Resolver};
use crate::value::Object;

/// The pool and construction machinery behind a [`Registry`] handle.
///
/// Pool access is atomic per id: the first `get` on an uncached id claims an
/// in-flight marker under the write lock, resolves with no lock held, then
/// publishes the object to the pool and to every waiter that queued up in
/// the meantime. A racing `get` never produces two distinct objects under
/// the same id.
///
/// [`Registry`]: crate::registry::Registry
pub(super) struct RegistryCore {
    pool: RwLock<PoolData>,
}

impl RegistryCore {
    pub fn new() -> Self {
        Self {
            pool: RwLock::new(PoolData::new()),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pool.read().objects.contains_key(id)
    }

    pub fn insert(&self, id: String, object: Object) {
        debug!(id = %id, "pooled object");
        self.pool.write().objects.insert(id, object);
    }

    pub fn clear(&self) {
        debug!("cleared object pool");
        self.pool.write().objects.clear();
    }

    pub fn get_object(&self, id: &str) -> Result<Object, ResolveError> {
        if let Some(object) = self.pool.read().objects.get(id) {
            return Ok(Object::clone(object));
        }

        let Ok(recipe) = bundle::get(id) else {
            return Err(ResolveError::NotFound { id: id.to_owned() });
        };
        self.get_or_construct(id, &recipe)
    }

    fn get_or_construct(&self, id: &str, recipe: &Recipe) -> Result<Object, ResolveError> {
        let mut pool = self.pool.write();

        // A peer may have finished constructing between the unlocked read
        // and this write lock.
        if let Some(object) = pool.objects.get(id) {
            return Ok(Object::clone(object));
        }

        if let Some(watch) = pool.constructing.get_mut(id) {
            if watch.is_held_by_current_thread() {
                Err(self.stop_construction_on_cycle(pool, id))
            } else {
                self.wait_for_peer(pool, id)
            }
        } else {
            self.construct(pool, id, recipe)
        }
    }

    fn stop_construction_on_cycle(
        &self,
        pool: RwLockWriteGuard<'_, PoolData>,
        id: &str,
    ) -> ResolveError {
        let err = ResolveError::CyclicDependency { id: id.to_owned() };
        self.notify_waiters(pool, id, WaitOutcome::Failed(err.clone()));
        err
    }

    fn wait_for_peer(
        &self,
        mut pool: RwLockWriteGuard<'_, PoolData>,
        id: &str,
    ) -> Result<Object, ResolveError> {
        let receiver = {
            let (sender, receiver) = oneshot::channel();
            let Some(watch) = pool.constructing.get_mut(id) else {
                unreachable!("the in-flight entry was checked before registering a waiter")
            };
            watch.waiters.push(sender);
            receiver
        };
        drop(pool);

        self.recv_outcome(receiver)
    }

    fn recv_outcome(&self, receiver: Receiver<WaitOutcome>) -> Result<Object, ResolveError> {
        match receiver.recv() {
            Ok(WaitOutcome::Built(object)) => Ok(object),
            Ok(WaitOutcome::Failed(err)) => Err(err),
            Err(_) => unreachable!("the constructing peer should always notify its waiters"),
        }
    }

    fn construct(
        &self,
        mut pool: RwLockWriteGuard<'_, PoolData>,
        id: &str,
        recipe: &Recipe,
    ) -> Result<Object, ResolveError> {
        trace!(id = %id, "resolving recipe");
        let watch = ConstructionWatch::new(thread::current().id());
        pool.constructing.insert(id.to_owned(), watch);
        drop(pool);

        match Resolver::new(self).make(recipe, &Overrides::new()) {
            Ok(object) => {
                let mut pool = self.pool.write();
                pool.objects.insert(id.to_owned(), Object::clone(&object));
                self.notify_waiters(pool, id, WaitOutcome::Built(Object::clone(&object)));
                Ok(object)
            }
            Err(err) => {
                let pool = self.pool.write();
                self.notify_waiters(pool, id, WaitOutcome::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut pool: RwLockWriteGuard<'_, PoolData>,
        id: &str,
        outcome: WaitOutcome,
    ) {
        if let Some(watch) = pool.constructing.remove(id) {
            drop(pool);
            watch.notify(outcome);
        }
    }
}

impl Lookup for RegistryCore {
    fn has(&self, id: &str) -> bool {
        self.contains(id) || bundle::contains(id)
    }

    fn get(&self, id: &str) -> Result<Object, ResolveError> {
        self.get_object(id)
    }
}

struct PoolData {
    objects: HashMap<String, Object>,
    constructing: HashMap<String, ConstructionWatch>,
}

impl PoolData {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            constructing: HashMap::new(),
        }
    }
}

struct ConstructionWatch {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitOutcome>>,
}

impl ConstructionWatch {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_held_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn notify(self, outcome: WaitOutcome) {
        for sender in self.waiters {
            let _ = sender.send(outcome.clone());
        }
    }
}

#[derive(Clone)]
enum WaitOutcome {
    Built(Object),
    Failed(ResolveError),
}
