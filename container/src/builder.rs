use crate::container::Container;
use crate::registry::Registry;

/// A builder for creating `Container` instances.
///
/// ```
/// use open_container::Container;
///
/// let container = Container::builder().label("app").build();
/// assert_eq!(container.label(), "app");
/// assert!(!container.is_deferred());
/// ```
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
  label: String,
  deferred: bool,
}

impl Default for ContainerBuilder {
  fn default() -> Self {
    Self {
      label: String::from("container"),
      deferred: false,
    }
  }
}

impl ContainerBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the name attached to every log event the container emits.
  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.label = label.into();
    self
  }

  /// Builds the container directly in deferred mode, as if
  /// [`Container::to_deferred`] had been called on an empty one.
  pub fn deferred(mut self, deferred: bool) -> Self {
    self.deferred = deferred;
    self
  }

  pub fn build(self) -> Container {
    Container::from_parts(self.label, self.deferred, Registry::default())
  }
}
