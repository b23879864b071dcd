//! The two-method lookup shape some callers expect from a service container.

use crate::container::Container;
use crate::deferred::Resolved;
use crate::error::Result;

use std::any::Any;

/// A minimal `has`/`get` view over a container.
///
/// `has` is [`Container::is_registered`] and `get` is [`Container::resolve`].
/// Circular registrations are not supported through this interface: on a
/// regular container one side of the cycle gets
/// [`Error::ResolutionInProgress`](crate::Error::ResolutionInProgress), which
/// `get` callers are not expected to handle. Use a deferred container or call
/// `resolve` directly for cycles.
pub trait ServiceLookup {
  fn has(&self, id: &str) -> bool;

  fn get<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Resolved<T>>;
}

impl ServiceLookup for Container {
  fn has(&self, id: &str) -> bool {
    self.is_registered(id)
  }

  fn get<T: ?Sized + Any + Send + Sync>(&self, id: &str) -> Result<Resolved<T>> {
    self.resolve(id)
  }
}
