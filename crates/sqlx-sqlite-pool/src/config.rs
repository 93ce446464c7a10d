//! Configuration for the SQLite connection pool

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Configuration for a [`PoolManager`](crate::PoolManager) pool
///
/// The defaults are the service's fixed pool parameters. Connections are opened
/// one at a time as demand requires, so the pool always grows in steps of one.
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_pool::PoolConfig;
///
/// // Use defaults
/// let config = PoolConfig::default();
/// assert_eq!(config.max_connections, 5);
///
/// // Override just one field
/// let config = PoolConfig {
///     acquire_timeout_secs: 1,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
   /// Connections kept open even when idle
   ///
   /// Default: 1
   pub min_connections: u32,

   /// Upper bound on open connections, and therefore on in-flight operations
   ///
   /// Default: 5
   pub max_connections: u32,

   /// Idle connections above `min_connections` are closed after this many seconds
   ///
   /// Default: 60
   pub idle_timeout_secs: u64,

   /// How long a caller waits for a free connection before `PoolExhausted`
   ///
   /// Default: 30
   pub acquire_timeout_secs: u64,

   /// Connections are recycled once they have been open this long
   ///
   /// Default: 14400 (4 hours)
   pub max_lifetime_secs: u64,
}

impl Default for PoolConfig {
   fn default() -> Self {
      Self {
         min_connections: 1,
         max_connections: 5,
         idle_timeout_secs: 60,
         acquire_timeout_secs: 30,
         max_lifetime_secs: 60 * 60 * 4,
      }
   }
}

impl PoolConfig {
   pub fn idle_timeout(&self) -> Duration {
      Duration::from_secs(self.idle_timeout_secs)
   }

   pub fn acquire_timeout(&self) -> Duration {
      Duration::from_secs(self.acquire_timeout_secs)
   }

   pub fn max_lifetime(&self) -> Duration {
      Duration::from_secs(self.max_lifetime_secs)
   }

   /// Reject sizes and timeouts sqlx would either refuse or silently misbehave with
   pub fn validate(&self) -> Result<(), Error> {
      if self.max_connections == 0 {
         return Err(Error::InvalidConfig(
            "max_connections must be at least 1".into(),
         ));
      }

      if self.min_connections > self.max_connections {
         return Err(Error::InvalidConfig(format!(
            "min_connections ({}) exceeds max_connections ({})",
            self.min_connections, self.max_connections
         )));
      }

      if self.acquire_timeout_secs == 0 {
         return Err(Error::InvalidConfig(
            "acquire_timeout_secs must be at least 1".into(),
         ));
      }

      Ok(())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_defaults_match_service_pool_parameters() {
      let config = PoolConfig::default();

      assert_eq!(config.min_connections, 1);
      assert_eq!(config.max_connections, 5);
      assert_eq!(config.idle_timeout(), Duration::from_secs(60));
      assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
      assert_eq!(config.max_lifetime(), Duration::from_secs(4 * 60 * 60));
      assert!(config.validate().is_ok());
   }

   #[test]
   fn test_validate_rejects_zero_max() {
      let config = PoolConfig {
         min_connections: 0,
         max_connections: 0,
         ..Default::default()
      };

      assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
   }

   #[test]
   fn test_validate_rejects_min_above_max() {
      let config = PoolConfig {
         min_connections: 6,
         ..Default::default()
      };

      let err = config.validate().unwrap_err();
      assert!(err.to_string().contains("min_connections (6)"));
   }

   #[test]
   fn test_validate_rejects_zero_acquire_timeout() {
      let config = PoolConfig {
         acquire_timeout_secs: 0,
         ..Default::default()
      };

      assert!(config.validate().is_err());
   }

   #[test]
   fn test_partial_deserialize_uses_defaults() {
      let config: PoolConfig = serde_json::from_str(r#"{"max_connections": 2}"#).unwrap();

      assert_eq!(config.max_connections, 2);
      assert_eq!(config.min_connections, 1);
      assert_eq!(config.acquire_timeout_secs, 30);
   }
}
