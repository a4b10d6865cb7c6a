use crate::{
  config::ConnectionConfig,
  error::Result,
  traits::{Connection, Connector},
};

/// The one connection every benchmark case runs against.
///
/// It is built once at startup and handed to each case by `&mut`, never cloned, so all measured
/// queries go through the same session's serial request/response cycle. It implements
/// [`Connection`] itself, which lets a case run against it or against any bare connection.
pub struct SharedConnection<C> {
  inner: C,
  config: ConnectionConfig,
}

impl<C: Connection> SharedConnection<C> {
  /// Connect eagerly, so an unreachable store fails here rather than inside the first case.
  pub fn open<K>(connector: &K, config: ConnectionConfig) -> Result<Self>
  where
    K: Connector<Connection = C>,
  {
    tracing::info!(
      host = %config.host,
      port = config.port,
      database = %config.database,
      "opening shared connection"
    );
    let inner = connector.connect(&config)?;
    Ok(Self { inner, config })
  }

  pub fn config(&self) -> &ConnectionConfig {
    &self.config
  }

  pub fn get_mut(&mut self) -> &mut C {
    &mut self.inner
  }
}

impl<C: Connection> Connection for SharedConnection<C> {
  type Block = C::Block;
  type Blocks<'a> = C::Blocks<'a> where Self: 'a;

  fn query<'a>(&'a mut self, sql: &'a str) -> Result<Self::Blocks<'a>> {
    self.inner.query(sql)
  }

  fn close(self) -> Result<()> {
    tracing::info!(host = %self.config.host, port = self.config.port, "closing shared connection");
    self.inner.close()
  }
}
