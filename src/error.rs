use serde::{Serialize, Serializer};

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for clients.
#[derive(Serialize)]
struct ErrorResponse {
   code: String,
   message: String,
}

/// Error types for the translator service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The store rejected a new session, e.g. the user does not exist.
   #[error("session rejected by the store: {0}")]
   InvalidSession(#[source] sqlx_sqlite_exec::Error),

   /// Error from query execution.
   #[error(transparent)]
   Exec(sqlx_sqlite_exec::Error),

   /// Error from the connection pool.
   #[error(transparent)]
   Pool(#[from] sqlx_sqlite_pool::Error),

   /// A stored timestamp is not ISO-8601.
   #[error("stored {column} {value:?} is not an ISO-8601 timestamp")]
   Timestamp {
      column: &'static str,
      value: String,
      #[source]
      source: time::error::Parse,
   },

   /// Service configuration could not be loaded.
   #[error("invalid configuration: {0}")]
   Config(String),
}

impl From<sqlx_sqlite_exec::Error> for Error {
   fn from(err: sqlx_sqlite_exec::Error) -> Self {
      // Pool failures keep their own variant whichever layer reports them
      match err {
         sqlx_sqlite_exec::Error::Pool(e) => Error::Pool(e),
         other => Error::Exec(other),
      }
   }
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for client error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::InvalidSession(_) => "INVALID_SESSION".to_string(),
         Error::Exec(e) => e.error_code(),
         Error::Pool(e) => match e {
            sqlx_sqlite_pool::Error::Connection(_) => "CONNECTION_ERROR".to_string(),
            sqlx_sqlite_pool::Error::PoolExhausted(_) => "POOL_EXHAUSTED".to_string(),
            sqlx_sqlite_pool::Error::PoolClosed => "POOL_CLOSED".to_string(),
            sqlx_sqlite_pool::Error::Begin(_) => "BEGIN_FAILED".to_string(),
            sqlx_sqlite_pool::Error::InvalidConfig(_) => "INVALID_CONFIG".to_string(),
         },
         Error::Timestamp { .. } => "INVALID_TIMESTAMP".to_string(),
         Error::Config(_) => "CONFIG_ERROR".to_string(),
      }
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      let response = ErrorResponse {
         code: self.error_code(),
         message: self.to_string(),
      };
      response.serialize(serializer)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_pool_errors_keep_their_variant() {
      let err = Error::from(sqlx_sqlite_exec::Error::Pool(
         sqlx_sqlite_pool::Error::PoolClosed,
      ));
      assert!(matches!(err, Error::Pool(sqlx_sqlite_pool::Error::PoolClosed)));
      assert_eq!(err.error_code(), "POOL_CLOSED");
   }

   #[test]
   fn test_exec_error_code_passes_through() {
      let err = Error::from(sqlx_sqlite_exec::Error::EmptyReturn);
      assert_eq!(err.error_code(), "EMPTY_RETURN");
   }

   #[test]
   fn test_serializes_as_code_and_message() {
      let err = Error::Config("TRANSLATOR_DATABASE_URL is empty".into());
      let json = serde_json::to_value(&err).unwrap();

      assert_eq!(json["code"], "CONFIG_ERROR");
      assert_eq!(
         json["message"],
         "invalid configuration: TRANSLATOR_DATABASE_URL is empty"
      );
   }

   #[test]
   fn test_invalid_session_wraps_inner_message() {
      let err = Error::InvalidSession(sqlx_sqlite_exec::Error::NullReturn);

      assert_eq!(err.error_code(), "INVALID_SESSION");
      assert_eq!(
         err.to_string(),
         "session rejected by the store: RETURNING returned NULL"
      );
   }
}
