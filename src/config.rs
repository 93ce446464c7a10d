//! Service configuration

use std::env::VarError;

use serde::{Deserialize, Serialize};
use sqlx_sqlite_pool::PoolConfig;

use crate::{Error, Result};

/// Environment variable holding the store's connection URL
pub const DATABASE_URL_VAR: &str = "TRANSLATOR_DATABASE_URL";

/// Connection URL used when [`DATABASE_URL_VAR`] is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite:translator.db";

/// Everything the composition root needs to build a [`Translator`](crate::Translator)
///
/// # Examples
///
/// ```
/// use live_translator::{PoolConfig, ServiceConfig};
///
/// let config = ServiceConfig {
///     database_url: "sqlite:/var/lib/translator/store.db".into(),
///     pool: PoolConfig {
///         acquire_timeout_secs: 5,
///         ..Default::default()
///     },
/// };
/// assert_eq!(config.pool.max_connections, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
   /// SQLite connection URL
   ///
   /// Default: `sqlite:translator.db`
   pub database_url: String,

   /// Pool sizing and timeouts
   pub pool: PoolConfig,
}

impl Default for ServiceConfig {
   fn default() -> Self {
      Self {
         database_url: DEFAULT_DATABASE_URL.to_string(),
         pool: PoolConfig::default(),
      }
   }
}

impl ServiceConfig {
   /// Read the connection URL from `TRANSLATOR_DATABASE_URL`
   ///
   /// Pool parameters always take their defaults. The store has no credential
   /// pair, so nothing else is read.
   pub fn from_env() -> Result<Self> {
      let url = match std::env::var(DATABASE_URL_VAR) {
         Ok(url) => Some(url),
         Err(VarError::NotPresent) => None,
         Err(VarError::NotUnicode(_)) => {
            return Err(Error::Config(format!("{DATABASE_URL_VAR} is not valid unicode")));
         }
      };

      Self::with_database_url(url)
   }

   fn with_database_url(url: Option<String>) -> Result<Self> {
      match url {
         None => Ok(Self::default()),
         Some(url) if url.trim().is_empty() => {
            Err(Error::Config(format!("{DATABASE_URL_VAR} is set but empty")))
         }
         Some(url) => Ok(Self {
            database_url: url.trim().to_string(),
            ..Self::default()
         }),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_unset_url_uses_default() {
      let config = ServiceConfig::with_database_url(None).unwrap();

      assert_eq!(config.database_url, "sqlite:translator.db");
      assert_eq!(config.pool, PoolConfig::default());
   }

   #[test]
   fn test_url_is_taken_as_given() {
      let config = ServiceConfig::with_database_url(Some(" sqlite:/srv/t.db ".into())).unwrap();
      assert_eq!(config.database_url, "sqlite:/srv/t.db");
   }

   #[test]
   fn test_empty_url_is_rejected() {
      let err = ServiceConfig::with_database_url(Some("  ".into())).unwrap_err();

      assert!(matches!(err, Error::Config(ref m) if m.contains(DATABASE_URL_VAR)));
   }

   #[test]
   fn test_deserialize_partial() {
      let config: ServiceConfig =
         serde_json::from_str(r#"{"pool": {"max_connections": 2}}"#).unwrap();

      assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
      assert_eq!(config.pool.max_connections, 2);
      assert_eq!(config.pool.acquire_timeout_secs, 30);
   }
}
