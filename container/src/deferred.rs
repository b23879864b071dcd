//! Forward references handed out by deferred containers.

use crate::container::{Container, Shared};
use crate::error::Result;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A stand-in for a value that has not been built yet.
///
/// A proxy is created by a deferred container before its recipe runs. The
/// first access builds the value through the owning container (caching it
/// there like any other resolution) and every later access sees that same
/// value.
///
/// An unbuilt proxy keeps its container alive, so it can still be built after
/// every other handle to the container is gone. The container only holds the
/// proxy weakly, and the proxy lets go of the container once its slot is
/// filled.
pub struct Proxy<T: ?Sized + 'static> {
  id: String,
  slot: OnceCell<Arc<T>>,
  owner: Mutex<Option<Arc<Shared>>>,
}

impl<T: ?Sized + Any + Send + Sync> Proxy<T> {
  pub(crate) fn new(id: &str, owner: Arc<Shared>) -> Self {
    Self {
      id: id.to_owned(),
      slot: OnceCell::new(),
      owner: Mutex::new(Some(owner)),
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn is_realized(&self) -> bool {
    self.slot.get().is_some()
  }

  fn force(&self) -> Result<&Arc<T>> {
    if let Some(value) = self.slot.get() {
      return Ok(value);
    }
    let owner = self.owner.lock().clone();
    let shared = match owner {
      Some(shared) => shared,
      // The owner is released only after the slot has been filled.
      None => return Ok(self.slot.wait()),
    };
    let container = Container::from_shared(shared);

    // Two threads racing on the same proxy must not both run a transient
    // recipe, so the slot is re-checked under the container lock.
    let _lock = container.shared.state.lock();
    if let Some(value) = self.slot.get() {
      return Ok(value);
    }
    let value = container.materialize::<T>(&self.id)?;
    let value = self.slot.get_or_init(|| value);
    self.owner.lock().take();
    Ok(value)
  }
}

impl<T: ?Sized + 'static> fmt::Debug for Proxy<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Proxy")
      .field("id", &self.id)
      .field("realized", &self.slot.get().is_some())
      .finish()
  }
}

enum Inner<T: ?Sized + 'static> {
  Ready(Arc<T>),
  Deferred(Arc<Proxy<T>>),
}

/// The result of a resolution.
///
/// Derefs to `T`. A handle from a regular container wraps the built `Arc<T>`;
/// one from a deferred container wraps a [`Proxy`] that builds on first use.
///
/// # Panics
///
/// Dereferencing a proxy whose build fails panics with the underlying
/// [`Error`](crate::Error). Use [`Resolved::get`] or [`Resolved::to_arc`] to handle the
/// failure instead.
pub struct Resolved<T: ?Sized + 'static> {
  inner: Inner<T>,
}

impl<T: ?Sized + Any + Send + Sync> Resolved<T> {
  pub(crate) fn ready(value: Arc<T>) -> Self {
    Self {
      inner: Inner::Ready(value),
    }
  }

  pub(crate) fn deferred(proxy: Arc<Proxy<T>>) -> Self {
    Self {
      inner: Inner::Deferred(proxy),
    }
  }

  /// Returns the value, building it first if this is an untouched proxy.
  pub fn get(&self) -> Result<&T> {
    self.arc().map(|value| &**value)
  }

  /// Returns the shared `Arc` behind this handle, building it if necessary.
  pub fn to_arc(&self) -> Result<Arc<T>> {
    self.arc().cloned()
  }

  pub fn is_deferred(&self) -> bool {
    matches!(self.inner, Inner::Deferred(_))
  }

  /// Whether the value exists yet. Always true for non-deferred handles.
  pub fn is_realized(&self) -> bool {
    self.peek().is_some()
  }

  /// Whether both handles refer to the same object.
  ///
  /// Two handles are the same when they share a proxy, or when the values they
  /// have realized are the same allocation. Unrealized proxies are never
  /// forced by this check.
  pub fn ptr_eq(this: &Self, other: &Self) -> bool {
    if let (Inner::Deferred(a), Inner::Deferred(b)) = (&this.inner, &other.inner) {
      if Arc::ptr_eq(a, b) {
        return true;
      }
    }
    match (this.peek(), other.peek()) {
      (Some(a), Some(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }

  fn arc(&self) -> Result<&Arc<T>> {
    match &self.inner {
      Inner::Ready(value) => Ok(value),
      Inner::Deferred(proxy) => proxy.force(),
    }
  }

  fn peek(&self) -> Option<&Arc<T>> {
    match &self.inner {
      Inner::Ready(value) => Some(value),
      Inner::Deferred(proxy) => proxy.slot.get(),
    }
  }
}

impl<T: ?Sized + Any + Send + Sync> Deref for Resolved<T> {
  type Target = T;

  fn deref(&self) -> &T {
    match self.get() {
      Ok(value) => value,
      Err(err) => panic!("Failed to build deferred service: {}", err),
    }
  }
}

impl<T: ?Sized + 'static> Clone for Resolved<T> {
  fn clone(&self) -> Self {
    let inner = match &self.inner {
      Inner::Ready(value) => Inner::Ready(value.clone()),
      Inner::Deferred(proxy) => Inner::Deferred(proxy.clone()),
    };
    Self { inner }
  }
}

impl<T: ?Sized + fmt::Debug + 'static> fmt::Debug for Resolved<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.inner {
      Inner::Ready(value) => f.debug_tuple("Resolved").field(value).finish(),
      Inner::Deferred(proxy) => match proxy.slot.get() {
        Some(value) => f.debug_tuple("Resolved").field(value).finish(),
        None => f.debug_tuple("Resolved").field(proxy).finish(),
      },
    }
  }
}
