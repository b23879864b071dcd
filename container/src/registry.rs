//! The mappings behind a container: recipes, registered instances, the
//! resolved-instance cache and the deferred proxy cache.

use crate::container::Container;
use crate::core::{Instance, Lifetime, TypeDescriptor};

use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

/// The lock every container operation goes through.
///
/// Reentrant so that a builder running under the lock can resolve or register
/// on the same container. The `RefCell` borrow is never held across a build.
pub(crate) type State = ReentrantMutex<RefCell<Registry>>;

pub(crate) type Factory = Arc<dyn Fn(&Container) -> Instance + Send + Sync>;

/// How to produce the value for one id.
#[derive(Clone)]
pub(crate) struct Recipe {
  /// `None` only for untyped builders.
  pub(crate) produces: Option<TypeDescriptor>,
  pub(crate) lifetime: Lifetime,
  factory: Factory,
}

impl Recipe {
  pub(crate) fn new(produces: Option<TypeDescriptor>, lifetime: Lifetime, factory: Factory) -> Self {
    Self {
      produces,
      lifetime,
      factory,
    }
  }

  pub(crate) fn build(&self, container: &Container) -> Instance {
    (self.factory)(container)
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recipe")
      .field("produces", &self.produces)
      .field("lifetime", &self.lifetime)
      .finish_non_exhaustive()
  }
}

/// All per-id state of a container.
///
/// An id has at most one recipe (in `types` or `builders`) and at most one
/// realized value (in `instances` or `resolved`).
#[derive(Default)]
pub(crate) struct Registry {
  types: HashMap<String, Recipe>,
  builders: HashMap<String, Recipe>,
  instances: HashMap<String, Instance>,
  resolved: HashMap<String, Instance>,
  /// Each value points at a `Proxy<T>` for the declared `T` of the id. Held
  /// weakly because an unbuilt proxy keeps its container alive.
  proxies: HashMap<String, Weak<dyn Any + Send + Sync>>,
  pub(crate) building: HashSet<String>,
}

impl Registry {
  // --- Mutation ---

  pub(crate) fn install_type(&mut self, id: &str, recipe: Recipe) {
    self.evict(id);
    self.types.insert(id.to_owned(), recipe);
  }

  pub(crate) fn install_builder(&mut self, id: &str, recipe: Recipe) {
    self.evict(id);
    self.builders.insert(id.to_owned(), recipe);
  }

  pub(crate) fn install_instance(&mut self, id: &str, instance: Instance) {
    self.evict(id);
    self.instances.insert(id.to_owned(), instance);
  }

  /// Drops the realized value and any proxy for `id`, keeping its recipe.
  /// Returns whether anything was removed.
  pub(crate) fn flush(&mut self, id: &str) -> bool {
    let instance = self.instances.remove(id).is_some();
    let resolved = self.resolved.remove(id).is_some();
    let proxy = self.proxies.remove(id).is_some_and(|proxy| proxy.strong_count() > 0);
    instance || resolved || proxy
  }

  pub(crate) fn cache_resolved(&mut self, id: &str, instance: Instance) {
    self.resolved.insert(id.to_owned(), instance);
  }

  pub(crate) fn cache_proxy(&mut self, id: &str, proxy: &Arc<dyn Any + Send + Sync>) {
    self.proxies.insert(id.to_owned(), Arc::downgrade(proxy));
  }

  fn evict(&mut self, id: &str) {
    self.types.remove(id);
    self.builders.remove(id);
    self.flush(id);
  }

  // --- Queries ---

  pub(crate) fn recipe(&self, id: &str) -> Option<Recipe> {
    self.types.get(id).or_else(|| self.builders.get(id)).cloned()
  }

  /// The registered instance or the cached build result for `id`.
  pub(crate) fn realized(&self, id: &str) -> Option<Instance> {
    self.instances.get(id).or_else(|| self.resolved.get(id)).cloned()
  }

  /// The live proxy for `id`. Once every handle to it is gone a new one
  /// is issued.
  pub(crate) fn proxy(&self, id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
    self.proxies.get(id).and_then(Weak::upgrade)
  }

  pub(crate) fn is_registered(&self, id: &str) -> bool {
    self.types.contains_key(id) || self.builders.contains_key(id) || self.instances.contains_key(id)
  }

  pub(crate) fn is_resolved(&self, id: &str) -> bool {
    self.instances.contains_key(id) || self.resolved.contains_key(id)
  }

  pub(crate) fn ids(&self) -> BTreeSet<String> {
    self
      .types
      .keys()
      .chain(self.builders.keys())
      .chain(self.instances.keys())
      .cloned()
      .collect()
  }

  /// A snapshot for a new container. Proxies belong to the container that
  /// issued them and are not carried over.
  pub(crate) fn fork(&self) -> Self {
    Self {
      types: self.types.clone(),
      builders: self.builders.clone(),
      instances: self.instances.clone(),
      resolved: self.resolved.clone(),
      proxies: HashMap::new(),
      building: HashSet::new(),
    }
  }
}
