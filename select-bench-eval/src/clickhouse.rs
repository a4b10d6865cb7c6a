//! [`Connection`] over the ClickHouse native TCP protocol, backed by `clickhouse-rs`.
//!
//! The client is async. The connection owns a current-thread tokio runtime and drives the result
//! stream one block per `next()`, so the harness stays synchronous and never buffers more than the
//! block it is looking at.

use clickhouse_rs::{errors::Error as ClientError, ClientHandle, Options, Pool};
use futures::{stream::BoxStream, StreamExt};
use select_bench_core::{
  config::HOST_VAR, Block, Connection, ConnectionConfig, Connector, Error, Result,
};
use tokio::runtime::Runtime;
use url::Url;

pub struct ClickHouseBlock(clickhouse_rs::Block);

impl Block for ClickHouseBlock {
  fn row_count(&self) -> usize {
    self.0.row_count()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClickHouseConnector;

impl Connector for ClickHouseConnector {
  type Connection = ClickHouseConnection;

  fn connect(&self, config: &ConnectionConfig) -> Result<ClickHouseConnection> {
    let options = client_options(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(|err| Error::ConnectionFailure(format!("failed to start runtime: {err}")))?;

    let (pool, handle) = runtime
      .block_on(async {
        let pool = Pool::new(options);
        let handle = pool.get_handle().await?;
        Ok::<_, ClientError>((pool, handle))
      })
      .map_err(|err| {
        Error::ConnectionFailure(format!("{}:{}: {err}", config.host, config.port))
      })?;

    tracing::info!(host = %config.host, port = config.port, "connected to clickhouse");
    Ok(ClickHouseConnection {
      handle,
      _pool: pool,
      runtime,
    })
  }
}

/// A single checked-out session. Fields drop in declaration order, so the handle and pool are
/// released while the runtime is still alive.
pub struct ClickHouseConnection {
  handle: ClientHandle,
  _pool: Pool,
  runtime: Runtime,
}

impl Connection for ClickHouseConnection {
  type Block = ClickHouseBlock;
  type Blocks<'a> = ClickHouseBlocks<'a>;

  fn query<'a>(&'a mut self, sql: &'a str) -> Result<ClickHouseBlocks<'a>> {
    tracing::trace!(sql, "issuing query");
    let stream = self.handle.query(sql).stream_blocks();
    Ok(ClickHouseBlocks {
      runtime: &self.runtime,
      stream,
      finished: false,
    })
  }

  fn close(self) -> Result<()> {
    let Self {
      handle,
      _pool,
      runtime,
    } = self;
    drop(handle);
    drop(_pool);
    drop(runtime);
    tracing::info!("clickhouse connection released");
    Ok(())
  }
}

pub struct ClickHouseBlocks<'a> {
  runtime: &'a Runtime,
  stream: BoxStream<'a, std::result::Result<clickhouse_rs::Block, ClientError>>,
  finished: bool,
}

impl Iterator for ClickHouseBlocks<'_> {
  type Item = Result<ClickHouseBlock>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }
    match self.runtime.block_on(self.stream.next()) {
      Some(Ok(block)) => Some(Ok(ClickHouseBlock(block))),
      Some(Err(err)) => {
        self.finished = true;
        Some(Err(Error::QueryFailed(err.to_string())))
      }
      None => {
        self.finished = true;
        None
      }
    }
  }
}

/// Translate the settings into `clickhouse-rs` options.
///
/// Credentials and database go through the option builders unchanged; only the server address is
/// a URL. The pool is pinned to a single session and transparent resend is disabled: a retried
/// query would be timed as if it were one round trip.
pub fn client_options(config: &ConnectionConfig) -> Result<Options> {
  Ok(
    Options::new(server_addr(config)?)
      .database(&config.database)
      .username(&config.user)
      .password(&config.password)
      .ping_before_query(config.ping_before_query)
      .send_retries(0)
      .pool_min(1)
      .pool_max(1),
  )
}

/// `tcp://host:port`, accepted only when the host is a bare name or address.
fn server_addr(config: &ConnectionConfig) -> Result<Url> {
  let invalid_host = |reason: &str| Error::InvalidConfig {
    var: HOST_VAR,
    value: config.host.clone(),
    reason: reason.to_string(),
  };

  let host = if config.host.contains(':') && !config.host.starts_with('[') {
    format!("[{}]", config.host)
  } else {
    config.host.clone()
  };

  let addr = Url::parse(&format!("tcp://{}:{}", host, config.port))
    .map_err(|err| invalid_host(&err.to_string()))?;

  let bare = addr.host_str().is_some_and(|h| !h.is_empty())
    && addr.port() == Some(config.port)
    && addr.username().is_empty()
    && addr.password().is_none()
    && addr.path().is_empty()
    && addr.query().is_none()
    && addr.fragment().is_none();
  if !bare {
    return Err(invalid_host("not a plain host name or address"));
  }
  Ok(addr)
}
