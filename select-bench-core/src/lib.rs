//! This crate provides the store-agnostic core of the SELECT micro benchmarks, including:
//! - Connection settings resolved from the environment
//! - The [`Connection`] seam a store client has to fill
//! - The [`SharedConnection`] every case runs against
//! - The benchmark cases and their measured loop
//!
//! A case issues one fixed query per iteration and only counts the rows of each block it gets back,
//! so the time spent per iteration is the client's round trip, header and type-name parsing and
//! block decoding, and nothing downstream of it.

pub mod config;
pub mod error;
pub mod shared;
pub mod traits;

use std::hint::black_box;

pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use shared::SharedConnection;
pub use traits::{Block, Connection, Connector};

/// A named query that is issued once per measured iteration.
///
/// Cases own nothing but `'static` data, so invoking one any number of times leaves no state
/// behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkCase {
  pub name: &'static str,
  pub query: &'static str,
  /// Number of columns in the result.
  pub columns: usize,
  /// Total number of rows the query returns, summed over all blocks.
  pub rows: usize,
}

/// Three columns over 1000 generated rows: a few distinct columns repeated over many rows.
pub const SELECT_NUMBER: BenchmarkCase = BenchmarkCase {
  name: "SelectNumber",
  query: "SELECT number, number, number FROM system.numbers LIMIT 1000",
  columns: 3,
  rows: 1000,
};

/// Ten columns over 100 rows. The column count dominates the row count, which puts the weight on
/// per-column type-name parsing.
pub const SELECT_NUMBER_MORE_COLUMNS: BenchmarkCase = BenchmarkCase {
  name: "SelectNumberMoreColumns",
  query: "SELECT \
          number, number, number, number, number, number, number, number, number, number \
          FROM system.numbers LIMIT 100",
  columns: 10,
  rows: 100,
};

/// One column over 10000 rows, for the data transfer side of the client.
pub const SELECT_LARGE_RESULT: BenchmarkCase = BenchmarkCase {
  name: "SelectLargeResult",
  query: "SELECT number FROM system.numbers LIMIT 10000",
  columns: 1,
  rows: 10000,
};

/// All cases, in registration order.
pub const SELECT_CASES: [BenchmarkCase; 3] =
  [SELECT_NUMBER, SELECT_NUMBER_MORE_COLUMNS, SELECT_LARGE_RESULT];

impl BenchmarkCase {
  /// Run a single iteration: issue the query and drain its blocks, reading nothing but the row
  /// count of each one. Returns the total number of rows.
  pub fn iteration<C: Connection>(&self, connection: &mut C) -> Result<usize> {
    connection
      .query(self.query)?
      .try_fold(0, |rows, block| Ok(rows + block?.row_count()))
  }

  /// The measured loop.
  ///
  /// `keep_running` is owned by the driver and consulted at the top of every iteration.
  /// Iterations are strictly sequential. The first error ends the loop and is returned without
  /// issuing another query.
  pub fn run<C, F>(&self, connection: &mut C, mut keep_running: F) -> Result<()>
  where
    C: Connection,
    F: FnMut() -> bool,
  {
    while keep_running() {
      black_box(self.iteration(connection)?);
    }
    Ok(())
  }

  /// An untimed iteration that checks the store returns the expected number of rows. Drivers call
  /// it once before measuring so a broken setup never produces numbers.
  pub fn warm_up<C: Connection>(&self, connection: &mut C) -> Result<()> {
    let rows = self.iteration(connection)?;
    if rows != self.rows {
      return Err(Error::QueryFailed(format!(
        "{} returned {} rows, expected {}",
        self.name, rows, self.rows
      )));
    }
    tracing::debug!(case = self.name, rows, "warm-up iteration passed");
    Ok(())
  }
}

/// A `keep_running` predicate that answers `true` exactly `n` times.
pub fn iterations(n: u64) -> impl FnMut() -> bool {
  let mut remaining = n;
  move || {
    if remaining == 0 {
      return false;
    }
    remaining -= 1;
    true
  }
}
