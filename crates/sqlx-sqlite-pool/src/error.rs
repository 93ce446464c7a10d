//! Error types for sqlx-sqlite-pool

use std::time::Duration;

use thiserror::Error;

/// Errors that may occur while building the pool or leasing a connection
#[derive(Error, Debug)]
pub enum Error {
   /// The store could not be reached, either while constructing the pool or
   /// while opening a fresh connection for a lease. Not retried.
   #[error("connection error: {0}")]
   Connection(#[source] sqlx::Error),

   /// No connection became available within the acquire timeout
   #[error("no pooled connection became available within {0:?}")]
   PoolExhausted(Duration),

   /// The pool has been closed and cannot hand out connections
   #[error("connection pool has been closed")]
   PoolClosed,

   /// A connection was leased but the store rejected `BEGIN` on it
   #[error("failed to begin transaction: {0}")]
   Begin(#[source] sqlx::Error),

   /// Pool parameters or the connection URL were rejected before connecting
   #[error("invalid pool configuration: {0}")]
   InvalidConfig(String),
}

impl Error {
   /// Classify an error sqlx returned while handing out a connection
   pub(crate) fn from_acquire(err: sqlx::Error, timeout: Duration) -> Self {
      match err {
         sqlx::Error::PoolTimedOut => Error::PoolExhausted(timeout),
         sqlx::Error::PoolClosed => Error::PoolClosed,
         other => Error::Connection(other),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_timed_out_maps_to_exhausted() {
      let err = Error::from_acquire(sqlx::Error::PoolTimedOut, Duration::from_secs(30));
      assert!(matches!(err, Error::PoolExhausted(d) if d == Duration::from_secs(30)));
      assert!(err.to_string().contains("30s"));
   }

   #[test]
   fn test_closed_maps_to_pool_closed() {
      let err = Error::from_acquire(sqlx::Error::PoolClosed, Duration::from_secs(1));
      assert!(matches!(err, Error::PoolClosed));
   }

   #[test]
   fn test_begin_failure_is_not_a_connection_error() {
      let err = Error::Begin(sqlx::Error::Protocol("database is locked".into()));

      assert!(!matches!(err, Error::Connection(_)));
      assert_eq!(
         err.to_string(),
         "failed to begin transaction: encountered unexpected or invalid data: database is locked"
      );
   }

   #[test]
   fn test_other_errors_map_to_connection() {
      let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
      let err = Error::from_acquire(sqlx::Error::Io(io), Duration::from_secs(1));
      assert!(matches!(err, Error::Connection(_)));
      assert!(err.to_string().starts_with("connection error"));
   }
}
