use std::path::Path;

use select_bench_core::{Connector, ConnectionConfig, Error, Result, SharedConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "select_bench_core=info,select_bench_eval=info";

/// Install the global subscriber. Logs go to stderr so they don't interleave with criterion's
/// report on stdout.
pub fn init_tracing() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .try_init()?;
  Ok(())
}

/// Load variables from an env file into the process environment. Variables that are already set
/// keep their value. Returns whether the file was read.
pub fn load_env_file(path: &Path) -> bool {
  match dotenvy::from_path(path) {
    Ok(()) => {
      tracing::debug!(path = %path.display(), "loaded environment file");
      true
    }
    Err(_) => false,
  }
}

/// Startup path of a benchmark binary: load `.env` from the working directory if there is one,
/// resolve the settings and open the shared connection.
pub fn connect_from_env<K: Connector>(connector: &K) -> Result<SharedConnection<K::Connection>> {
  load_env_file(Path::new(".env"));
  let config = ConnectionConfig::resolve()?;
  SharedConnection::open(connector, config)
}

/// Report a fatal error and terminate with its exit code.
pub fn fail_fast(err: Error) -> ! {
  tracing::error!(kind = err.kind(), "{err}");
  eprintln!("fatal {}: {err}", err.kind());
  std::process::exit(err.exit_code())
}
