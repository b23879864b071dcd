//! Serving a trait object under an id, and swapping the implementation
//! behind it without touching the services that depend on it.

use open_container::{global, resolve, Container, FromContainer, Resolved};
use std::sync::Arc;

trait AuditSink: Send + Sync {
  fn record(&self, event: &str);
}

struct StdoutSink;

impl AuditSink for StdoutSink {
  fn record(&self, event: &str) {
    println!("[audit] {}", event);
  }
}

struct PrefixedSink {
  prefix: &'static str,
}

impl AuditSink for PrefixedSink {
  fn record(&self, event: &str) {
    println!("[{}] {}", self.prefix, event);
  }
}

struct Checkout {
  audit: Resolved<dyn AuditSink>,
}

impl FromContainer for Checkout {
  fn from_container(container: &Container) -> Self {
    Checkout {
      audit: resolve!(in container, dyn AuditSink, "audit"),
    }
  }
}

impl Checkout {
  fn place_order(&self, sku: &str) {
    self.audit.record(&format!("order placed for {}", sku));
  }
}

fn main() {
  global().register_trait_builder::<dyn AuditSink, _>("audit", |_| Arc::new(StdoutSink));
  global().register_type::<Checkout>("checkout");

  resolve!(Checkout, "checkout").place_order("sku-17");

  // Replacing the sink evicts nothing else, so the cached checkout keeps the
  // old one until it is flushed and rebuilt.
  let sink: Arc<dyn AuditSink> = Arc::new(PrefixedSink { prefix: "staging" });
  global().register_instance_arc("audit", sink);
  global().flush_instance("checkout");

  resolve!(Checkout, "checkout").place_order("sku-18");
}
