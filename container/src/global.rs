//! The process-wide container and its access function.

use crate::builder::ContainerBuilder;
use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(|| ContainerBuilder::new().label("global").build());

/// Provides a reference to the process-wide container.
///
/// # Examples
///
/// ```
/// use open_container::global;
///
/// global().register_instance("greeting", String::from("Hello from global!"));
/// assert!(global().is_registered("greeting"));
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
