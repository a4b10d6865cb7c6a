use std::time::Instant;

use criterion::{measurement::WallTime, Criterion};
use select_bench_core::{iterations, BenchmarkCase, Connection};

use crate::util::fail_fast;

/// Register `cases` as one criterion benchmark group, all running against `connection`.
///
/// A case is warmed up once, untimed, the first time criterion runs it, so cases excluded by a name
/// filter never touch the store. Criterion picks the iteration count and the measurement is the
/// wall-clock time around [`BenchmarkCase::run`] for that many iterations. Any error terminates
/// the process.
pub fn bench_cases<C: Connection>(
  criterion: &mut Criterion<WallTime>,
  group_name: &str,
  connection: &mut C,
  cases: &[BenchmarkCase],
) {
  let mut group = criterion.benchmark_group(group_name);

  for case in cases {
    let mut warmed_up = false;
    group.bench_function(case.name, |b| {
      if !warmed_up {
        if let Err(err) = case.warm_up(connection) {
          fail_fast(err);
        }
        tracing::info!(case = case.name, query = case.query, "running benchmark");
        warmed_up = true;
      }
      b.iter_custom(|iters| {
        let start = Instant::now();
        if let Err(err) = case.run(connection, iterations(iters)) {
          fail_fast(err);
        }
        start.elapsed()
      })
    });
  }

  group.finish();
}
