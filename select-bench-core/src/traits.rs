use crate::{config::ConnectionConfig, error::Result};

/// A unit of query result data. The harness never looks at column values, only at how many rows
/// a block carries.
pub trait Block {
  fn row_count(&self) -> usize;
}

/// The narrow slice of a store client the harness needs: issue a query and walk its result blocks.
pub trait Connection {
  type Block: Block;

  /// Lazy, finite, non-restartable sequence of result blocks. A block is produced only when the
  /// previous one has been consumed, and the sequence ends after the first error.
  type Blocks<'a>: Iterator<Item = Result<Self::Block>>
  where
    Self: 'a;

  fn query<'a>(&'a mut self, sql: &'a str) -> Result<Self::Blocks<'a>>;

  /// Release the session on an orderly shutdown path.
  fn close(self) -> Result<()>
  where
    Self: Sized,
  {
    Ok(())
  }
}

/// Opens a [`Connection`] from resolved settings.
pub trait Connector {
  type Connection: Connection;

  fn connect(&self, config: &ConnectionConfig) -> Result<Self::Connection>;
}
