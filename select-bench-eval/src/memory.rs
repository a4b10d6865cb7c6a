//! An in-process stand-in for the store.
//!
//! Every registered query answers with a `system.numbers`-shaped result: `columns` identical
//! `UInt64` columns counting up from zero, `rows` rows in total, cut into Arrow [`RecordBatch`]es
//! of at most `block_size` rows. Batches are materialized lazily as the harness asks for them,
//! matching the one-block-at-a-time behaviour of a real connection. Running the benchmark cases
//! against it measures what the harness itself costs.

use std::{cell::Cell, collections::HashMap, sync::Arc};

use arrow::{
  array::{ArrayRef, UInt64Array},
  datatypes::{DataType, Field, Schema, SchemaRef},
  record_batch::RecordBatch,
};
use select_bench_core::{
  BenchmarkCase, Block, Connection, ConnectionConfig, Connector, Error, Result,
};

/// Max rows per block, the server's default `max_block_size` for `system.numbers`.
pub const DEFAULT_BLOCK_SIZE: usize = 65409;

pub struct MemoryBlock(RecordBatch);

impl Block for MemoryBlock {
  fn row_count(&self) -> usize {
    self.0.num_rows()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
  columns: usize,
  rows: usize,
}

pub struct MemoryStore {
  tables: HashMap<String, Shape>,
  block_size: usize,
  reachable: bool,
  connects: Cell<usize>,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      tables: HashMap::new(),
      block_size: DEFAULT_BLOCK_SIZE,
      reachable: true,
      connects: Cell::new(0),
    }
  }

  /// A store that knows the result shape of every given case.
  pub fn with_cases(cases: &[BenchmarkCase]) -> Self {
    cases.iter().fold(Self::new(), |store, case| {
      store.with_table(case.query, case.columns, case.rows)
    })
  }

  pub fn with_table(mut self, query: &str, columns: usize, rows: usize) -> Self {
    self.tables.insert(query.to_string(), Shape { columns, rows });
    self
  }

  /// Zero is treated as one.
  pub fn with_block_size(mut self, block_size: usize) -> Self {
    self.block_size = block_size.max(1);
    self
  }

  /// Make every connection attempt fail.
  pub fn unreachable(mut self) -> Self {
    self.reachable = false;
    self
  }

  /// Number of connection attempts so far.
  pub fn connections_opened(&self) -> usize {
    self.connects.get()
  }
}

impl Connector for MemoryStore {
  type Connection = MemoryConnection;

  fn connect(&self, config: &ConnectionConfig) -> Result<MemoryConnection> {
    self.connects.set(self.connects.get() + 1);
    if !self.reachable {
      return Err(Error::ConnectionFailure(format!(
        "{}:{}: connection refused",
        config.host, config.port
      )));
    }
    Ok(MemoryConnection {
      tables: Arc::new(self.tables.clone()),
      block_size: self.block_size,
      queries: 0,
    })
  }
}

pub struct MemoryConnection {
  tables: Arc<HashMap<String, Shape>>,
  block_size: usize,
  queries: usize,
}

impl MemoryConnection {
  /// Number of queries issued on this connection.
  pub fn queries_issued(&self) -> usize {
    self.queries
  }
}

impl Connection for MemoryConnection {
  type Block = MemoryBlock;
  type Blocks<'a> = MemoryBlocks;

  fn query<'a>(&'a mut self, sql: &'a str) -> Result<MemoryBlocks> {
    self.queries += 1;
    let shape = *self
      .tables
      .get(sql)
      .ok_or_else(|| Error::QueryFailed(format!("unknown table for query: {sql}")))?;

    let fields: Vec<Field> = (0..shape.columns)
      .map(|_| Field::new("number", DataType::UInt64, false))
      .collect();
    Ok(MemoryBlocks {
      schema: Arc::new(Schema::new(fields)),
      columns: shape.columns,
      rows: shape.rows,
      offset: 0,
      block_size: self.block_size,
      failed: false,
    })
  }
}

pub struct MemoryBlocks {
  schema: SchemaRef,
  columns: usize,
  rows: usize,
  offset: usize,
  block_size: usize,
  failed: bool,
}

impl Iterator for MemoryBlocks {
  type Item = Result<MemoryBlock>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.offset >= self.rows {
      return None;
    }
    let len = self.block_size.min(self.rows - self.offset);
    let start = self.offset as u64;
    let column: ArrayRef = Arc::new(UInt64Array::from_iter_values(start..start + len as u64));
    self.offset += len;

    match RecordBatch::try_new(self.schema.clone(), vec![column; self.columns]) {
      Ok(batch) => Some(Ok(MemoryBlock(batch))),
      Err(err) => {
        self.failed = true;
        Some(Err(Error::QueryFailed(err.to_string())))
      }
    }
  }
}
