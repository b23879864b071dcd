//! Public macros for ergonomic service resolution.

/// Resolves a service, panicking if it cannot be resolved.
///
/// `resolve!(Type, "id")` resolves from the [`global`](crate::global)
/// container; `resolve!(in container, Type, "id")` resolves from an explicit
/// one. Either form evaluates to a [`Resolved`](crate::Resolved) handle.
///
/// # Panics
///
/// Panics with the resolution error. For a non-panicking version, call
/// [`Container::resolve`](crate::Container::resolve) directly.
///
/// # Examples
///
/// ```
/// use open_container::{global, resolve, Container};
///
/// global().register_builder("answer", |_| 42_u32);
/// assert_eq!(*resolve!(u32, "answer"), 42);
///
/// let container = Container::new();
/// container.register_instance("name", String::from("local"));
/// assert_eq!(*resolve!(in container, String, "name"), "local");
/// ```
#[macro_export]
macro_rules! resolve {
    (in $container:expr, $type:ty, $id:expr) => {
        match $container.resolve::<$type>($id) {
            Ok(resolved) => resolved,
            Err(err) => panic!(
                "Failed to resolve required service '{}' as {}: {}",
                $id,
                std::any::type_name::<$type>(),
                err
            ),
        }
    };

    ($type:ty, $id:expr) => {
        $crate::resolve!(in $crate::global(), $type, $id)
    };
}
