//! This crate implements the concrete side of the SELECT micro benchmarks, including:
//! - A ClickHouse native-protocol connection for the core harness
//! - An Arrow-backed in-memory store used as a baseline and in tests
//! - The criterion adapter that times the cases
//! - Startup and fatal-error utilities

pub mod clickhouse;
pub mod harness;
pub mod memory;
pub mod util;
