use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the harness can hit is fatal. There is no recoverable path: a run with a retried
/// or skipped iteration would report timings for work that never happened.
#[derive(Debug, Error)]
pub enum Error {
  /// A configuration value could not be used, detected before any connection attempt.
  #[error("invalid configuration: {var}={value:?}: {reason}")]
  InvalidConfig {
    var: &'static str,
    value: String,
    reason: String,
  },

  /// The shared session could not be established.
  #[error("connection failure: {0}")]
  ConnectionFailure(String),

  /// Transport or protocol error while a query was in flight.
  #[error("query failed: {0}")]
  QueryFailed(String),
}

impl Error {
  pub fn kind(&self) -> &'static str {
    match self {
      Error::InvalidConfig { .. } => "InvalidConfig",
      Error::ConnectionFailure(_) => "ConnectionFailure",
      Error::QueryFailed(_) => "QueryFailed",
    }
  }

  /// Process exit status used when this error aborts a benchmark run.
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::InvalidConfig { .. } => 2,
      Error::ConnectionFailure(_) => 3,
      Error::QueryFailed(_) => 4,
    }
  }
}
