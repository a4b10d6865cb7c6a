//! Tests against a running ClickHouse server, configured through the usual `CLICKHOUSE_*`
//! variables. Run with `cargo test -- --ignored`.

use anyhow::Result;
use select_bench_core::{
  iterations, Connection, ConnectionConfig, Error, SharedConnection, SELECT_CASES,
  SELECT_NUMBER, SELECT_NUMBER_MORE_COLUMNS,
};
use select_bench_eval::clickhouse::{ClickHouseConnection, ClickHouseConnector};

fn connect() -> Result<SharedConnection<ClickHouseConnection>> {
  let config = ConnectionConfig::resolve()?;
  Ok(SharedConnection::open(&ClickHouseConnector, config)?)
}

#[test]
#[ignore = "requires a ClickHouse server"]
fn test_select_number_returns_1000_rows() -> Result<()> {
  let mut connection = connect()?;
  assert_eq!(SELECT_NUMBER.iteration(&mut connection)?, 1000);
  connection.close()?;
  Ok(())
}

#[test]
#[ignore = "requires a ClickHouse server"]
fn test_select_number_more_columns_returns_100_rows() -> Result<()> {
  let mut connection = connect()?;
  assert_eq!(SELECT_NUMBER_MORE_COLUMNS.iteration(&mut connection)?, 100);
  connection.close()?;
  Ok(())
}

#[test]
#[ignore = "requires a ClickHouse server"]
fn test_all_cases_share_one_session() -> Result<()> {
  let mut connection = connect()?;
  for case in SELECT_CASES {
    case.warm_up(&mut connection)?;
    case.run(&mut connection, iterations(10))?;
  }
  connection.close()?;
  Ok(())
}

#[test]
#[ignore = "requires a ClickHouse server"]
fn test_server_error_is_query_failed() -> Result<()> {
  let mut connection = connect()?;
  let result = connection
    .query("SELECT no_such_column FROM system.numbers LIMIT 1")?
    .collect::<Vec<_>>();
  assert!(matches!(result.last(), Some(Err(Error::QueryFailed(_)))));
  Ok(())
}

#[test]
#[ignore = "opens a socket to a closed local port"]
fn test_unreachable_server_is_connection_failure() {
  let config = ConnectionConfig {
    host: "127.0.0.1".to_string(),
    port: 1,
    ..Default::default()
  };
  let err = SharedConnection::open(&ClickHouseConnector, config)
    .err()
    .expect("connecting to a closed port must fail");
  assert!(matches!(err, Error::ConnectionFailure(_)));
}
