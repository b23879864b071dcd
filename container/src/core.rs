//! Core data structures shared by the registry, the container and its proxies.

use crate::error::{Error, Result};
use crate::registry::State;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Identifies the concrete type a registration produces.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
  id: TypeId,
  name: &'static str,
}

impl TypeDescriptor {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub(crate) fn is<T: ?Sized + Any>(&self) -> bool {
    self.id == TypeId::of::<T>()
  }
}

impl PartialEq for TypeDescriptor {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeDescriptor({})", self.name)
  }
}

/// How often a recipe runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
  /// Built once, then served from the resolved-instance cache until flushed.
  #[default]
  Shared,
  /// Built on every resolution and never cached.
  Transient,
}

/// A type-erased, already-built value.
///
/// Internally this is an `Arc<T>` hidden behind `dyn Any`, so both sized types
/// and trait objects survive the round trip with their identity intact.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  descriptor: TypeDescriptor,
}

impl Instance {
  /// Wraps a freshly built value.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an existing `Arc`. Resolving the instance hands out clones of this
  /// exact `Arc`.
  pub fn from_arc<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value: Arc::new(value),
      descriptor: TypeDescriptor::of::<T>(),
    }
  }

  pub fn descriptor(&self) -> TypeDescriptor {
    self.descriptor
  }

  pub fn type_name(&self) -> &'static str {
    self.descriptor.name
  }

  pub(crate) fn downcast<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    self
      .value
      .downcast_ref::<Arc<T>>()
      .cloned()
      .ok_or_else(|| Error::TypeMismatch {
        id: id.to_owned(),
        expected: std::any::type_name::<T>(),
        actual: self.descriptor.name,
      })
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Instance").field(&self.descriptor.name).finish()
  }
}

/// An RAII guard marking an id as "currently being built".
///
/// Entering fails if the id is already marked, which is how a resolution that
/// loops back onto an unfinished build is turned into
/// [`Error::ResolutionInProgress`] instead of unbounded recursion. Dropping the
/// guard clears the mark, including during unwinding.
pub(crate) struct BuildGuard<'a> {
  state: &'a State,
  id: String,
}

impl<'a> BuildGuard<'a> {
  pub(crate) fn enter(state: &'a State, id: &str) -> Result<Self> {
    let lock = state.lock();
    // `insert` returns `false` if the id was already present.
    if !lock.borrow_mut().building.insert(id.to_owned()) {
      return Err(Error::ResolutionInProgress(id.to_owned()));
    }
    Ok(Self {
      state,
      id: id.to_owned(),
    })
  }
}

impl Drop for BuildGuard<'_> {
  fn drop(&mut self) {
    self.state.lock().borrow_mut().building.remove(&self.id);
  }
}
