//! The main `Container` struct and its associated methods.

use crate::builder::ContainerBuilder;
use crate::core::{BuildGuard, Instance, Lifetime, TypeDescriptor};
use crate::deferred::{Proxy, Resolved};
use crate::error::{Error, Result};
use crate::registry::{Factory, Recipe, Registry, State};

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, trace};

/// A type the container can construct by itself.
///
/// The constructor receives the container so it can resolve its own
/// dependencies. Registered with [`Container::register_type`].
pub trait FromContainer: Sized {
  fn from_container(container: &Container) -> Self;
}

pub(crate) struct Shared {
  pub(crate) label: String,
  pub(crate) deferred: bool,
  pub(crate) state: State,
}

/// The dependency-resolution container.
///
/// Every id maps to at most one recipe (a type or a builder) and at most one
/// realized value. Registering anything under an id evicts whatever was there
/// before, including a cached build result.
///
/// `Container` is cheap to clone; clones share the same registry. Use
/// [`Container::to_deferred`] for an independent snapshot.
///
/// # Thread safety
///
/// All state sits behind a single reentrant lock that is also held across
/// every build-then-cache sequence, so a shared recipe is cached at most once
/// per build. Builders may resolve or register on the container they receive.
///
/// Each container has its own lock. A builder that resolves from a second
/// container (for example [`global`](crate::global)) while another thread's
/// builder on that second container uses a proxy issued by the first takes
/// the two locks in opposite order and deadlocks. Keep cross-container
/// resolution one-directional when builds can run on several threads.
#[derive(Clone)]
pub struct Container {
  pub(crate) shared: Arc<Shared>,
}

impl Container {
  /// Creates a new, empty, non-deferred `Container`.
  pub fn new() -> Self {
    ContainerBuilder::new().build()
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  pub(crate) fn from_parts(label: String, deferred: bool, registry: Registry) -> Self {
    Self {
      shared: Arc::new(Shared {
        label,
        deferred,
        state: ReentrantMutex::new(RefCell::new(registry)),
      }),
    }
  }

  pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
    Self { shared }
  }

  pub fn label(&self) -> &str {
    &self.shared.label
  }

  pub fn is_deferred(&self) -> bool {
    self.shared.deferred
  }

  // --- PRIVATE HELPERS ---

  fn install_type<T: Any + Send + Sync>(&self, id: &str, lifetime: Lifetime, factory: Factory) {
    let recipe = Recipe::new(Some(TypeDescriptor::of::<T>()), lifetime, factory);
    self.shared.state.lock().borrow_mut().install_type(id, recipe);
    debug!(
      container = %self.shared.label,
      id,
      ty = std::any::type_name::<T>(),
      ?lifetime,
      "registered type"
    );
  }

  fn install_builder(&self, id: &str, produces: Option<TypeDescriptor>, lifetime: Lifetime, factory: Factory) {
    let recipe = Recipe::new(produces, lifetime, factory);
    self.shared.state.lock().borrow_mut().install_builder(id, recipe);
    debug!(
      container = %self.shared.label,
      id,
      ty = produces.map(|p| p.name()).unwrap_or("<untyped>"),
      ?lifetime,
      "registered builder"
    );
  }

  fn install_instance(&self, id: &str, instance: Instance) {
    let ty = instance.type_name();
    self.shared.state.lock().borrow_mut().install_instance(id, instance);
    debug!(container = %self.shared.label, id, ty, "registered instance");
  }

  // --- Type Registration ---

  /// Registers `T` under `id`. It is built with [`FromContainer::from_container`]
  /// on first resolution and cached until flushed.
  pub fn register_type<T>(&self, id: &str)
  where
    T: FromContainer + Any + Send + Sync,
  {
    let factory: Factory = Arc::new(|c: &Container| Instance::new(T::from_container(c)));
    self.install_type::<T>(id, Lifetime::Shared, factory);
  }

  /// Like [`Container::register_type`], but a new `T` is built on every
  /// resolution.
  pub fn register_transient_type<T>(&self, id: &str)
  where
    T: FromContainer + Any + Send + Sync,
  {
    let factory: Factory = Arc::new(|c: &Container| Instance::new(T::from_container(c)));
    self.install_type::<T>(id, Lifetime::Transient, factory);
  }

  // --- Builder Registration ---

  /// Registers a builder for `id`. The builder runs on first resolution and its
  /// result is cached until flushed.
  pub fn register_builder<T, F>(&self, id: &str, builder: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> T + Send + Sync + 'static,
  {
    let factory: Factory = Arc::new(move |c: &Container| Instance::new(builder(c)));
    self.install_builder(id, Some(TypeDescriptor::of::<T>()), Lifetime::Shared, factory);
  }

  /// Like [`Container::register_builder`], but the builder runs on every
  /// resolution.
  pub fn register_transient_builder<T, F>(&self, id: &str, builder: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> T + Send + Sync + 'static,
  {
    let factory: Factory = Arc::new(move |c: &Container| Instance::new(builder(c)));
    self.install_builder(id, Some(TypeDescriptor::of::<T>()), Lifetime::Transient, factory);
  }

  /// Registers a builder that produces a trait object, resolved as `dyn I`.
  pub fn register_trait_builder<I, F>(&self, id: &str, builder: F)
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn(&Container) -> Arc<I> + Send + Sync + 'static,
  {
    let factory: Factory = Arc::new(move |c: &Container| Instance::from_arc(builder(c)));
    self.install_builder(id, Some(TypeDescriptor::of::<I>()), Lifetime::Shared, factory);
  }

  /// Registers a builder whose produced type is only known once it has run.
  ///
  /// Works like any other builder in a regular container. A deferred container
  /// cannot issue a proxy for it and fails with [`Error::CannotBuildDeferred`].
  pub fn register_untyped_builder<F>(&self, id: &str, builder: F)
  where
    F: Fn(&Container) -> Instance + Send + Sync + 'static,
  {
    let factory: Factory = Arc::new(builder);
    self.install_builder(id, None, Lifetime::Shared, factory);
  }

  // --- Instance Registration ---

  /// Registers an already-built value. Every resolution returns the same `Arc`.
  pub fn register_instance<T: Any + Send + Sync>(&self, id: &str, instance: T) {
    self.install_instance(id, Instance::new(instance));
  }

  /// Registers an existing `Arc`, which resolutions hand back unchanged. This
  /// also accepts trait objects.
  pub fn register_instance_arc<T: ?Sized + Any + Send + Sync>(&self, id: &str, instance: Arc<T>) {
    self.install_instance(id, Instance::from_arc(instance));
  }

  /// Forgets the realized value for `id`.
  ///
  /// A type or builder keeps its recipe and is rebuilt on the next resolution.
  /// An id registered with an instance has nothing to rebuild from and becomes
  /// unregistered. A deferred container also drops its proxy for `id`, so the
  /// next resolution issues a fresh one.
  pub fn flush_instance(&self, id: &str) {
    let removed = self.shared.state.lock().borrow_mut().flush(id);
    debug!(container = %self.shared.label, id, removed, "flushed instance");
  }

  // --- Queries ---

  /// True if `id` has a type, builder or instance registration.
  pub fn is_registered(&self, id: &str) -> bool {
    self.shared.state.lock().borrow().is_registered(id)
  }

  /// True once a value for `id` exists: a registered instance, or a cached
  /// build result. An untouched deferred proxy does not count.
  pub fn is_resolved(&self, id: &str) -> bool {
    self.shared.state.lock().borrow().is_resolved(id)
  }

  /// All ids with a type, builder or instance registration, sorted.
  pub fn registered_ids(&self) -> BTreeSet<String> {
    self.shared.state.lock().borrow().ids()
  }

  // --- Resolution ---

  /// Resolves `id` as a `T`.
  ///
  /// A regular container returns the cached or registered value if there is
  /// one, otherwise builds it from the recipe, caching shared results.
  ///
  /// A deferred container returns its proxy for `id` if it issued one before.
  /// Otherwise it returns an existing value directly, or issues a new proxy
  /// without running the recipe.
  ///
  /// A resolution that loops back onto an id whose build has not finished
  /// fails with [`Error::ResolutionInProgress`]. Builders taking part in a
  /// cycle on a regular container must tolerate that.
  pub fn resolve<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Resolved<T>> {
    if self.shared.deferred {
      self.resolve_deferred(id)
    } else {
      self.materialize(id).map(Resolved::ready)
    }
  }

  /// Creates a deferred snapshot of this container.
  ///
  /// The snapshot copies every mapping; later registrations on either side
  /// are not seen by the other.
  pub fn to_deferred(&self) -> Container {
    let registry = self.shared.state.lock().borrow().fork();
    debug!(container = %self.shared.label, "forked deferred container");
    Container::from_parts(self.shared.label.clone(), true, registry)
  }

  /// Returns the existing value for `id`, or builds it.
  pub(crate) fn materialize<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    let lock = self.shared.state.lock();

    let realized = lock.borrow().realized(id);
    if let Some(instance) = realized {
      trace!(container = %self.shared.label, id, "served existing instance");
      return instance.downcast::<T>(id);
    }

    let recipe = lock.borrow().recipe(id);
    let recipe = recipe.ok_or_else(|| Error::NotRegistered(id.to_owned()))?;
    if let Some(produces) = recipe.produces {
      expect_type::<T>(id, produces)?;
    }

    let instance = {
      let _guard = BuildGuard::enter(&self.shared.state, id)?;
      debug!(container = %self.shared.label, id, lifetime = ?recipe.lifetime, "building instance");
      recipe.build(self)
    };
    let value = instance.downcast::<T>(id)?;
    if recipe.lifetime == Lifetime::Shared {
      lock.borrow_mut().cache_resolved(id, instance);
    }
    Ok(value)
  }

  fn resolve_deferred<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Resolved<T>> {
    let lock = self.shared.state.lock();

    let issued = lock.borrow().proxy(id);
    if let Some(proxy) = issued {
      trace!(container = %self.shared.label, id, "served existing proxy");
      return proxy
        .downcast::<Proxy<T>>()
        .map(Resolved::deferred)
        .map_err(|_| Error::TypeMismatch {
          id: id.to_owned(),
          expected: std::any::type_name::<T>(),
          actual: lock
            .borrow()
            .recipe(id)
            .and_then(|recipe| recipe.produces)
            .map_or("<proxy>", |produces| produces.name()),
        });
    }

    let realized = lock.borrow().realized(id);
    if let Some(instance) = realized {
      trace!(container = %self.shared.label, id, "served existing instance");
      return instance.downcast::<T>(id).map(Resolved::ready);
    }

    let recipe = lock.borrow().recipe(id);
    let recipe = recipe.ok_or_else(|| Error::NotRegistered(id.to_owned()))?;
    let produces = recipe
      .produces
      .ok_or_else(|| Error::CannotBuildDeferred(id.to_owned()))?;
    expect_type::<T>(id, produces)?;

    let proxy = Arc::new(Proxy::<T>::new(id, self.shared.clone()));
    if recipe.lifetime == Lifetime::Shared {
      let erased: Arc<dyn Any + Send + Sync> = proxy.clone();
      lock.borrow_mut().cache_proxy(id, &erased);
    }
    debug!(container = %self.shared.label, id, ty = produces.name(), "issued deferred proxy");
    Ok(Resolved::deferred(proxy))
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("label", &self.shared.label)
      .field("deferred", &self.shared.deferred)
      .field("registered", &self.registered_ids())
      .finish()
  }
}

fn expect_type<T: ?Sized + Any>(id: &str, produces: TypeDescriptor) -> Result<()> {
  if produces.is::<T>() {
    Ok(())
  } else {
    Err(Error::TypeMismatch {
      id: id.to_owned(),
      expected: std::any::type_name::<T>(),
      actual: produces.name(),
    })
  }
}
