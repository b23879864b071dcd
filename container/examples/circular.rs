use open_container::{Container, Resolved};
use tracing_subscriber::EnvFilter;

// Two services that need each other.
struct Parent {
  name: String,
  child: Resolved<Child>,
}

struct Child {
  name: String,
  parent: Resolved<Parent>,
}

fn main() {
  // Run with RUST_LOG=open_container=debug to watch proxies being issued and built.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::builder().label("family").build();
  container.register_builder("parent", |c| Parent {
    name: "parent".to_string(),
    child: c.resolve("child").expect("child is registered"),
  });
  container.register_builder("child", |c| Child {
    name: "child".to_string(),
    parent: c.resolve("parent").expect("parent is registered"),
  });

  // A regular container would hit the cycle while building; a deferred one
  // hands out proxies and builds each side on first use.
  let deferred = container.to_deferred();
  let parent = deferred
    .resolve::<Parent>("parent")
    .expect("parent resolves");

  println!("parent built yet? {}", deferred.is_resolved("parent"));
  println!("{} -> {}", parent.name, parent.child.name);
  println!("{} -> {}", parent.child.name, parent.child.parent.name);
  println!("parent built yet? {}", deferred.is_resolved("parent"));
}
