//! Lazily constructed SQLite connection pool

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, Transaction};
use tokio::sync::OnceCell;
use tracing::{debug, error, trace, warn};

use crate::Result;
use crate::config::PoolConfig;
use crate::error::Error;
use crate::lease::PooledConnection;

/// Owner of one bounded SQLite connection pool.
///
/// The pool itself is not created by [`PoolManager::new`]; it is built on the first
/// acquisition request and reused for every later one. Concurrent first requests
/// wait on the same construction, so at most one pool ever exists per manager.
///
/// Every connection is opened with foreign key enforcement and WAL journaling.
///
/// # Example
///
/// ```no_run
/// use sqlx_sqlite_pool::PoolManager;
///
/// # async fn example() -> Result<(), sqlx_sqlite_pool::Error> {
/// let manager = PoolManager::new("sqlite://translator.db", None)?;
///
/// // First call connects, later calls return the same pool
/// let pool = manager.acquire_pool().await?;
/// let again = manager.acquire_pool().await?;
/// assert!(std::ptr::eq(pool, again));
///
/// manager.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PoolManager {
   /// Connection URL as given (used in log output)
   url: String,

   options: SqliteConnectOptions,

   config: PoolConfig,

   /// Set exactly once, by whichever caller first needs a connection
   pool: OnceCell<Pool<Sqlite>>,

   /// Marks the pool as closed to prevent further leases
   closed: AtomicBool,
}

impl PoolManager {
   /// Create a manager for the store at `url`
   ///
   /// Validates the configuration and parses the URL but does not connect.
   ///
   /// # Arguments
   ///
   /// * `url` - SQLite connection URL, e.g. `sqlite://data/translator.db` or
   ///   `sqlite://data/translator.db?mode=rwc` to create a missing file
   /// * `custom_config` - Pass `None` for the service defaults (1..=5 connections,
   ///   60s idle timeout, 30s acquire timeout, 4h max lifetime)
   pub fn new(url: &str, custom_config: Option<PoolConfig>) -> Result<Arc<Self>> {
      let config = custom_config.unwrap_or_default();
      config.validate()?;

      if url.trim().is_empty() {
         return Err(Error::InvalidConfig("database url cannot be empty".into()));
      }

      let options = SqliteConnectOptions::from_str(url)
         .map_err(|e| Error::InvalidConfig(format!("{url}: {e}")))?
         .foreign_keys(true)
         .journal_mode(SqliteJournalMode::Wal);

      Ok(Arc::new(Self {
         url: url.to_string(),
         options,
         config,
         pool: OnceCell::new(),
         closed: AtomicBool::new(false),
      }))
   }

   /// Get the pool, constructing it on first use
   ///
   /// Construction opens `min_connections` connections. If the store cannot be
   /// reached this fails with [`Error::Connection`]; nothing is cached, so a later
   /// call tries again. There is no retry or backoff here.
   pub async fn acquire_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::PoolClosed);
      }

      let pool = self.pool.get_or_try_init(|| self.build_pool()).await?;

      // close() may have run while the pool was still being built
      if self.closed.load(Ordering::SeqCst) {
         if !pool.is_closed() {
            pool.close().await;
            debug!("Closed pool for {} built after close()", self.url);
         }
         return Err(Error::PoolClosed);
      }

      Ok(pool)
   }

   async fn build_pool(&self) -> Result<Pool<Sqlite>> {
      debug!(
         "Creating pool for {} (min={}, max={}, acquire_timeout={:?})",
         self.url,
         self.config.min_connections,
         self.config.max_connections,
         self.config.acquire_timeout()
      );

      SqlitePoolOptions::new()
         .min_connections(self.config.min_connections)
         .max_connections(self.config.max_connections)
         .idle_timeout(Some(self.config.idle_timeout()))
         .acquire_timeout(self.config.acquire_timeout())
         .max_lifetime(Some(self.config.max_lifetime()))
         .connect_with(self.options.clone())
         .await
         .map_err(|e| {
            error!("Failed to create pool for {}: {}", self.url, e);
            Error::Connection(e)
         })
   }

   /// Lease one connection, waiting up to the acquire timeout
   ///
   /// Fails with [`Error::PoolExhausted`] when every connection stays busy for
   /// the whole wait. The lease goes back to the pool when dropped.
   pub async fn lease(&self) -> Result<PooledConnection> {
      let pool = self.acquire_pool().await?;

      let conn = pool.acquire().await.map_err(|e| self.acquire_failed(e))?;

      trace!(
         "Leased connection (size={}, idle={})",
         pool.size(),
         pool.num_idle()
      );

      Ok(PooledConnection::new(conn))
   }

   /// Lease one connection with a transaction already started on it
   ///
   /// The transaction owns the connection. Dropping it without commit rolls back
   /// and returns the connection to the pool. Acquisition failures are classified
   /// like [`PoolManager::lease`]; a rejected `BEGIN` is [`Error::Begin`].
   pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
      let pool = self.acquire_pool().await?;

      let conn = pool.acquire().await.map_err(|e| self.acquire_failed(e))?;

      Transaction::begin(conn, None).await.map_err(|e| {
         warn!("BEGIN rejected on {}: {}", self.url, e);
         Error::Begin(e)
      })
   }

   fn acquire_failed(&self, err: sqlx::Error) -> Error {
      let err = Error::from_acquire(err, self.config.acquire_timeout());
      if let Error::PoolExhausted(waited) = &err {
         warn!("No connection available for {} after {:?}", self.url, waited);
      }
      err
   }

   /// Returns true once the pool has been constructed
   pub fn is_initialized(&self) -> bool {
      self.pool.initialized()
   }

   pub fn config(&self) -> &PoolConfig {
      &self.config
   }

   pub fn url(&self) -> &str {
      &self.url
   }

   /// Close the pool
   ///
   /// Waits for outstanding leases to come back, then closes every connection.
   /// Later acquisitions fail with [`Error::PoolClosed`]. Closing a pool that was
   /// never constructed only marks the manager closed.
   pub async fn close(&self) {
      self.closed.store(true, Ordering::SeqCst);

      if let Some(pool) = self.pool.get() {
         pool.close().await;
         debug!("Closed pool for {}", self.url);
      }
   }
}
