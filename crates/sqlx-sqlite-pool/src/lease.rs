//! PooledConnection lease handed out by the pool manager

use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use sqlx::Sqlite;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;
use tracing::trace;

/// RAII lease on one pooled connection
///
/// The caller owns the connection exclusively until the lease is dropped, at
/// which point it goes back to the pool (it is not closed). This holds on every
/// exit path, including early returns through `?` and dropped futures.
///
/// The lease derefs to `SqliteConnection` so it can be used directly with sqlx queries.
///
/// # Example
///
/// ```no_run
/// use sqlx_sqlite_pool::PoolManager;
///
/// # async fn example() -> Result<(), sqlx_sqlite_pool::Error> {
/// let manager = PoolManager::new("sqlite://translator.db", None)?;
/// let mut conn = manager.lease().await?;
/// sqlx::query("SELECT 1").execute(&mut *conn).await.ok();
/// // Connection is returned to the pool here
/// drop(conn);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PooledConnection {
   conn: PoolConnection<Sqlite>,
   acquired_at: Instant,
}

impl PooledConnection {
   pub(crate) fn new(conn: PoolConnection<Sqlite>) -> Self {
      Self {
         conn,
         acquired_at: Instant::now(),
      }
   }

   /// How long this lease has been held
   pub fn held_for(&self) -> Duration {
      self.acquired_at.elapsed()
   }
}

impl Deref for PooledConnection {
   type Target = SqliteConnection;

   fn deref(&self) -> &Self::Target {
      &*self.conn
   }
}

impl DerefMut for PooledConnection {
   fn deref_mut(&mut self) -> &mut Self::Target {
      &mut *self.conn
   }
}

impl Drop for PooledConnection {
   fn drop(&mut self) {
      // PoolConnection returns itself to the pool once this guard's fields drop
      trace!("returning connection to pool after {:?}", self.held_for());
   }
}
