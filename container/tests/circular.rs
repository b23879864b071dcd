use open_container::{Container, Error, FromContainer, Resolved};

// --- Circular Fixtures ---

// Each side tolerates an absent counterpart.
struct CircularOne {
  dependency: Option<Resolved<CircularTwo>>,
}

impl FromContainer for CircularOne {
  fn from_container(container: &Container) -> Self {
    CircularOne {
      dependency: container.resolve("CircularTwo").ok(),
    }
  }
}

struct CircularTwo {
  dependency: Option<Resolved<CircularOne>>,
}

impl FromContainer for CircularTwo {
  fn from_container(container: &Container) -> Self {
    CircularTwo {
      dependency: container.resolve("CircularOne").ok(),
    }
  }
}

fn circular_container() -> Container {
  let container = Container::new();
  container.register_type::<CircularOne>("CircularOne");
  container.register_type::<CircularTwo>("CircularTwo");
  container
}

// --- Circular Tests ---

#[test]
fn test_regular_container_leaves_one_side_absent() {
  // Arrange
  let container = circular_container();

  // Act
  let foo = container.resolve::<CircularOne>("CircularOne").unwrap();
  let bar = container.resolve::<CircularTwo>("CircularTwo").unwrap();

  // Assert
  // `bar` was built while `foo` was still under construction.
  assert!(bar.dependency.is_none());
  let foo_dependency = foo.dependency.as_ref().expect("foo should see bar");
  assert!(Resolved::ptr_eq(foo_dependency, &bar));
}

#[test]
fn test_deferred_container_links_both_sides() {
  // Arrange
  let deferred = circular_container().to_deferred();

  // Act
  let foo = deferred.resolve::<CircularOne>("CircularOne").unwrap();
  let bar = deferred.resolve::<CircularTwo>("CircularTwo").unwrap();

  // Assert
  let foo_dependency = foo.dependency.as_ref().expect("foo should see bar");
  let bar_dependency = bar.dependency.as_ref().expect("bar should see foo");
  assert!(Resolved::ptr_eq(foo_dependency, &bar));
  assert!(Resolved::ptr_eq(bar_dependency, &foo));
  assert!(bar_dependency.dependency.is_some());
}

#[test]
fn test_reentrant_resolution_reports_in_progress() {
  // Arrange
  let container = Container::new();
  container.register_builder("loop", |c| c.resolve::<Option<Error>>("loop").err());

  // Act
  let seen = container.resolve::<Option<Error>>("loop").unwrap();

  // Assert
  assert_eq!(
    *seen,
    Some(Error::ResolutionInProgress("loop".to_string()))
  );
  // The failed inner attempt does not stop the outer build from caching.
  assert!(container.is_resolved("loop"));
}

#[test]
fn test_in_progress_mark_is_cleared_after_panicking_builder() {
  let container = Container::new();
  container.register_builder("fragile", |_| -> u32 { panic!("builder failed") });

  let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    container.resolve::<u32>("fragile")
  }));
  assert!(outcome.is_err());

  // The in-progress mark must not outlive the failed build.
  container.register_builder("fragile", |_| 8_u32);
  assert_eq!(*container.resolve::<u32>("fragile").unwrap(), 8);
}
