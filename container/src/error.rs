use thiserror::Error;

/// The error type for every fallible container operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Nothing is registered under this id: no type, no builder, no instance.
  #[error("Could not find \"{0}\" registered in the container")]
  NotRegistered(String),

  /// A deferred container cannot build a proxy because the builder does not
  /// declare the type it produces.
  #[error("Cannot build \"{0}\" in a deferred container: its builder does not declare a produced type")]
  CannotBuildDeferred(String),

  /// The registration exists but produces a different type than requested.
  #[error("\"{id}\" produces `{actual}`, but `{expected}` was requested")]
  TypeMismatch {
    id: String,
    expected: &'static str,
    actual: &'static str,
  },

  /// The id was requested again while its own build was still running.
  #[error("\"{0}\" is already being built further up the resolution chain")]
  ResolutionInProgress(String),
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
