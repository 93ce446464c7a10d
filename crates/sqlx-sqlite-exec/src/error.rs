/// Result type alias for executor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for query execution and scalar extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Acquiring a connection failed (unreachable store, exhausted or closed pool).
   #[error(transparent)]
   Pool(sqlx_sqlite_pool::Error),

   /// The store rejected the statement. The sqlx error carries the store's message.
   #[error("query error: {0}")]
   Query(#[source] sqlx::Error),

   /// The RETURNING clause matched no rows.
   #[error("RETURNING produced no values")]
   EmptyReturn,

   /// The RETURNING clause matched a row whose returned column is NULL.
   #[error("RETURNING returned NULL")]
   NullReturn,

   /// The RETURNING clause produced more than the single value expected.
   #[error("RETURNING produced {0} values, expected exactly 1")]
   MultipleReturn(usize),

   /// The returned value cannot be represented as the declared output type.
   #[error("cannot coerce {found} to {expected}")]
   ScalarCoercion {
      expected: &'static str,
      found: String,
   },

   /// The output parameter is missing, repeated, or not written as `INTO :name`.
   #[error("invalid output bind: {0}")]
   InvalidOutputBind(String),

   /// The SQL references a named parameter that has no value.
   #[error("missing value for parameter :{0}")]
   MissingParameter(String),

   /// A value was supplied for a parameter the SQL never references.
   #[error("parameter :{0} is not used by the statement")]
   UnknownParameter(String),

   /// The SQL uses a positional or non-colon placeholder.
   #[error("unsupported placeholder {0:?}: parameters must be bound by :name")]
   PositionalPlaceholder(String),

   /// SQLite type that cannot be mapped to a value.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Row has no column with the requested name or index.
   #[error("no column {0} in row")]
   ColumnNotFound(String),

   /// The unit of work was already committed or rolled back.
   #[error("unit of work already committed or rolled back")]
   TransactionAlreadyFinalized,

   /// Column holds a value of a different type than requested.
   #[error("column {column} holds {found}, expected {expected}")]
   ColumnType {
      column: String,
      expected: &'static str,
      found: &'static str,
   },
}

impl From<sqlx_sqlite_pool::Error> for Error {
   fn from(err: sqlx_sqlite_pool::Error) -> Self {
      match err {
         // The connection was fine; the store itself refused BEGIN
         sqlx_sqlite_pool::Error::Begin(e) => Error::Query(e),
         other => Error::Pool(other),
      }
   }
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Pool(e) => match e {
            sqlx_sqlite_pool::Error::Connection(_) => "CONNECTION_ERROR".to_string(),
            sqlx_sqlite_pool::Error::PoolExhausted(_) => "POOL_EXHAUSTED".to_string(),
            sqlx_sqlite_pool::Error::PoolClosed => "POOL_CLOSED".to_string(),
            sqlx_sqlite_pool::Error::Begin(_) => "BEGIN_FAILED".to_string(),
            sqlx_sqlite_pool::Error::InvalidConfig(_) => "INVALID_CONFIG".to_string(),
         },
         Error::Query(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "QUERY_ERROR".to_string()
         }
         Error::EmptyReturn => "EMPTY_RETURN".to_string(),
         Error::NullReturn => "NULL_RETURN".to_string(),
         Error::MultipleReturn(_) => "MULTIPLE_RETURN".to_string(),
         Error::ScalarCoercion { .. } => "SCALAR_COERCION".to_string(),
         Error::InvalidOutputBind(_) => "INVALID_OUTPUT_BIND".to_string(),
         Error::MissingParameter(_) => "MISSING_PARAMETER".to_string(),
         Error::UnknownParameter(_) => "UNKNOWN_PARAMETER".to_string(),
         Error::PositionalPlaceholder(_) => "POSITIONAL_PLACEHOLDER".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::ColumnNotFound(_) => "COLUMN_NOT_FOUND".to_string(),
         Error::TransactionAlreadyFinalized => "TRANSACTION_ALREADY_FINALIZED".to_string(),
         Error::ColumnType { .. } => "COLUMN_TYPE".to_string(),
      }
   }

   /// The store's own message when the store rejected the statement.
   pub fn store_message(&self) -> Option<&str> {
      match self {
         Error::Query(e) => e.as_database_error().map(|db_err| db_err.message()),
         _ => None,
      }
   }
}
