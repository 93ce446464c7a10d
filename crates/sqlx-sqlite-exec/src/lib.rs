//! Named-parameter query execution on top of a lazily pooled SQLite store.
//!
//! This crate sits between the pool manager (`sqlx-sqlite-pool`) and
//! application services. It provides:
//!
//! - [`Executor`]: one statement per call, each on its own leased connection
//! - [`UnitOfWork`]: several statements on one connection inside one transaction
//! - `RETURNING ... INTO :name` output parameters resolved to a single [`Scalar`]
//! - Typed [`Value`]s and [`Row`]s decoded from SQLite storage classes
//!
//! SQL is always written with `:name` placeholders and values are always bound,
//! never spliced into the statement text.
//!
//! # Example
//!
//! ```no_run
//! use sqlx_sqlite_exec::{Commit, Executor, PoolManager, params};
//!
//! # async fn example() -> Result<(), sqlx_sqlite_exec::Error> {
//! let executor = Executor::new(PoolManager::new("sqlite://app.db?mode=rwc", None)?);
//!
//! // Write
//! executor
//!    .execute_mutation(
//!       "UPDATE sessions SET finished_at = CURRENT_TIMESTAMP WHERE id = :id",
//!       &params! { "id" => 1 },
//!       Commit::Immediate,
//!    )
//!    .await?;
//!
//! // Read
//! let rows = executor.fetch_all("SELECT * FROM sessions", &params! {}).await?;
//!
//! // Unit of work
//! let mut uow = executor.begin().await?;
//! uow.execute_mutation("DELETE FROM sessions WHERE id = :id", &params! { "id" => 1 }).await?;
//! uow.commit().await?;
//!
//! executor.pool().close().await;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod error;
pub mod executor;
pub mod named;
pub mod returning;
pub mod transaction;
pub mod value;

pub use decode::to_value;
pub use error::{Error, Result};
pub use executor::{Commit, Executor};
pub use named::{NamedStatement, bind_value};
pub use returning::{Scalar, ScalarType, normalize_returned};
pub use transaction::UnitOfWork;
pub use value::{FromValue, Params, Row, Value};

// Re-export commonly used types from dependencies
pub use sqlx_sqlite_pool::{PoolConfig, PoolManager};

/// Build [`Params`] from `name => value` pairs.
///
/// Names may be written with or without the leading colon.
#[macro_export]
macro_rules! params {
   () => {
      $crate::Params::new()
   };
   ($($name:expr => $value:expr),+ $(,)?) => {
      $crate::Params::new()$(.bind($name, $value))+
   };
}
