//! The SELECT cases against the in-memory store. No network and no wire decoding, so this is the
//! floor the ClickHouse numbers should be read against.

use criterion::{criterion_group, criterion_main, Criterion};
use select_bench_core::{Connection, ConnectionConfig, SharedConnection, SELECT_CASES};
use select_bench_eval::{harness::bench_cases, memory::MemoryStore, util::fail_fast};

fn bench_baseline(criterion: &mut Criterion) {
  let store = MemoryStore::with_cases(&SELECT_CASES);
  let mut connection = SharedConnection::open(&store, ConnectionConfig::default())
    .unwrap_or_else(|err| fail_fast(err));

  bench_cases(criterion, "baseline", &mut connection, &SELECT_CASES);
  if let Err(err) = connection.close() {
    fail_fast(err);
  }
}

criterion_group!(benches, bench_baseline);
criterion_main!(benches);
