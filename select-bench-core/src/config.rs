//! Connection settings resolved from the process environment.
//!
//! Each field has a fixed variable name and a fixed default. A variable that is unset or set to the
//! empty string falls back to its default without any warning. Only the port can fail to resolve.

use std::fmt;

use crate::error::{Error, Result};

pub const HOST_VAR: &str = "CLICKHOUSE_HOST";
pub const PORT_VAR: &str = "CLICKHOUSE_PORT";
pub const USER_VAR: &str = "CLICKHOUSE_USER";
pub const PASSWORD_VAR: &str = "CLICKHOUSE_PASSWORD";
pub const DATABASE_VAR: &str = "CLICKHOUSE_DB";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_USER: &str = "default";
pub const DEFAULT_PASSWORD: &str = "";
pub const DEFAULT_DATABASE: &str = "default";

/// Parameters for the single shared connection. Computed once at startup and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
  pub host: String,
  pub port: u16,
  pub user: String,
  pub password: String,
  pub database: String,
  /// Off unless set programmatically: a ping would add a round trip in front of every measured
  /// query.
  pub ping_before_query: bool,
}

impl Default for ConnectionConfig {
  fn default() -> Self {
    Self {
      host: DEFAULT_HOST.to_string(),
      port: DEFAULT_PORT,
      user: DEFAULT_USER.to_string(),
      password: DEFAULT_PASSWORD.to_string(),
      database: DEFAULT_DATABASE.to_string(),
      ping_before_query: false,
    }
  }
}

impl ConnectionConfig {
  /// Resolve from the process environment.
  pub fn resolve() -> Result<Self> {
    Self::resolve_with(|name| std::env::var(name).ok())
  }

  /// Resolve from an arbitrary variable lookup.
  /// * `lookup`: returns the raw value of a variable, or `None` when it is unset
  pub fn resolve_with<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let read = |name: &str, default: &str| -> String {
      lookup(name)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
    };

    let port = match lookup(PORT_VAR).filter(|value| !value.is_empty()) {
      Some(raw) => parse_port(&raw)?,
      None => DEFAULT_PORT,
    };

    let config = Self {
      host: read(HOST_VAR, DEFAULT_HOST),
      port,
      user: read(USER_VAR, DEFAULT_USER),
      password: read(PASSWORD_VAR, DEFAULT_PASSWORD),
      database: read(DATABASE_VAR, DEFAULT_DATABASE),
      ping_before_query: false,
    };
    tracing::debug!(?config, "resolved connection config");
    Ok(config)
  }

  pub fn with_ping_before_query(self, ping_before_query: bool) -> Self {
    Self {
      ping_before_query,
      ..self
    }
  }
}

impl fmt::Debug for ConnectionConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let password = if self.password.is_empty() { "" } else { "***" };
    f.debug_struct("ConnectionConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("user", &self.user)
      .field("password", &password)
      .field("database", &self.database)
      .field("ping_before_query", &self.ping_before_query)
      .finish()
  }
}

fn parse_port(raw: &str) -> Result<u16> {
  let invalid = |reason: String| Error::InvalidConfig {
    var: PORT_VAR,
    value: raw.to_string(),
    reason,
  };
  match raw.trim().parse::<u16>() {
    Ok(0) => Err(invalid("port must be positive".to_string())),
    Ok(port) => Ok(port),
    Err(err) => Err(invalid(err.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use rstest::rstest;

  use super::*;

  fn resolve_from(vars: &[(&str, &str)]) -> Result<ConnectionConfig> {
    let env: HashMap<String, String> = vars
      .iter()
      .map(|(name, value)| (name.to_string(), value.to_string()))
      .collect();
    ConnectionConfig::resolve_with(|name| env.get(name).cloned())
  }

  #[test]
  fn test_empty_environment_uses_defaults() {
    let config = resolve_from(&[]).unwrap();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 9000);
    assert_eq!(config.user, "default");
    assert_eq!(config.password, "");
    assert_eq!(config.database, "default");
    assert!(!config.ping_before_query);
    assert_eq!(config, ConnectionConfig::default());
  }

  #[test]
  fn test_host_and_port_only() {
    let config = resolve_from(&[(HOST_VAR, "db1.internal"), (PORT_VAR, "9440")]).unwrap();
    assert_eq!(config.host, "db1.internal");
    assert_eq!(config.port, 9440);
    assert_eq!(config.user, DEFAULT_USER);
    assert_eq!(config.password, DEFAULT_PASSWORD);
    assert_eq!(config.database, DEFAULT_DATABASE);
  }

  #[rstest]
  #[case(HOST_VAR, "ch.example.com")]
  #[case(USER_VAR, "bench")]
  #[case(PASSWORD_VAR, "s3cr3t")]
  #[case(DATABASE_VAR, "perf")]
  fn test_set_variable_is_taken_verbatim(#[case] var: &str, #[case] value: &str) {
    let config = resolve_from(&[(var, value)]).unwrap();
    let field = match var {
      HOST_VAR => &config.host,
      USER_VAR => &config.user,
      PASSWORD_VAR => &config.password,
      DATABASE_VAR => &config.database,
      _ => unreachable!(),
    };
    assert_eq!(field, value);

    // Every other field keeps its default
    let mut expected = ConnectionConfig::default();
    match var {
      HOST_VAR => expected.host = value.to_string(),
      USER_VAR => expected.user = value.to_string(),
      PASSWORD_VAR => expected.password = value.to_string(),
      DATABASE_VAR => expected.database = value.to_string(),
      _ => unreachable!(),
    }
    assert_eq!(config, expected);
  }

  #[test]
  fn test_all_variables_set() {
    let config = resolve_from(&[
      (HOST_VAR, "10.0.0.7"),
      (PORT_VAR, "19000"),
      (USER_VAR, "reader"),
      (PASSWORD_VAR, "pw"),
      (DATABASE_VAR, "system"),
    ])
    .unwrap();
    assert_eq!(
      config,
      ConnectionConfig {
        host: "10.0.0.7".to_string(),
        port: 19000,
        user: "reader".to_string(),
        password: "pw".to_string(),
        database: "system".to_string(),
        ping_before_query: false,
      }
    );
  }

  #[rstest]
  #[case(HOST_VAR)]
  #[case(PORT_VAR)]
  #[case(USER_VAR)]
  #[case(PASSWORD_VAR)]
  #[case(DATABASE_VAR)]
  fn test_empty_variable_falls_back(#[case] var: &str) {
    let config = resolve_from(&[(var, "")]).unwrap();
    assert_eq!(config, ConnectionConfig::default());
  }

  #[rstest]
  #[case("abc")]
  #[case("9000x")]
  #[case("-1")]
  #[case("0")]
  #[case("65536")]
  #[case("90.00")]
  fn test_bad_port_is_invalid_config(#[case] raw: &str) {
    let err = resolve_from(&[(PORT_VAR, raw)]).unwrap_err();
    match err {
      Error::InvalidConfig { var, value, .. } => {
        assert_eq!(var, PORT_VAR);
        assert_eq!(value, raw);
      }
      other => panic!("expected InvalidConfig, got {other:?}"),
    }
  }

  #[rstest]
  #[case("1", 1)]
  #[case("8123", 8123)]
  #[case(" 9440 ", 9440)]
  #[case("65535", 65535)]
  fn test_port_parsing(#[case] raw: &str, #[case] expected: u16) {
    assert_eq!(resolve_from(&[(PORT_VAR, raw)]).unwrap().port, expected);
  }

  #[test]
  fn test_ping_is_not_read_from_environment() {
    let config = resolve_from(&[("CLICKHOUSE_PING_BEFORE_QUERY", "true")]).unwrap();
    assert!(!config.ping_before_query);
    assert!(config.with_ping_before_query(true).ping_before_query);
  }

  #[test]
  fn test_debug_redacts_password() {
    let config = resolve_from(&[(PASSWORD_VAR, "hunter2")]).unwrap();
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("***"));
  }
}
