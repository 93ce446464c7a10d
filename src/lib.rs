//! Session store for the Live Translator service.
//!
//! [`Translator`] is the composition root: it owns the connection pool, the
//! executor built on it and the [`SessionService`]. The endpoint handlers in
//! [`commands`] and the [`FrameRelay`] sit on top and hold no transport code.
//!
//! # Example
//!
//! ```no_run
//! use live_translator::{ServiceConfig, Translator, commands};
//!
//! # async fn example() -> Result<(), live_translator::Error> {
//! let translator = Translator::new(ServiceConfig::from_env()?)?;
//!
//! let started = translator.sessions().create_session(1, "pl", "en").await?;
//! translator.sessions().finish_session(started.session_id).await?;
//!
//! let response = commands::get_session(&translator, started.session_id).await;
//! assert_eq!(response.status, 200);
//!
//! translator.close().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use sqlx_sqlite_exec::Executor;
use sqlx_sqlite_pool::PoolManager;
use tracing::debug;

pub mod commands;
mod config;
mod error;
mod relay;
mod sessions;
pub mod timestamp;

pub use config::{DATABASE_URL_VAR, DEFAULT_DATABASE_URL, ServiceConfig};
pub use error::{Error, Result};
pub use relay::{Frame, FrameRelay, Reply};
pub use sessions::{Session, SessionService, SessionState, StartedSession};

// Re-export commonly used types from dependencies
pub use sqlx_sqlite_pool::PoolConfig;

/// Owns the pool and every service built on it.
///
/// Cloning is cheap and shares the same pool.
#[derive(Debug, Clone)]
pub struct Translator {
   executor: Executor,
   sessions: SessionService,
}

impl Translator {
   /// Build the service graph. The pool itself is opened on first use.
   pub fn new(config: ServiceConfig) -> Result<Self> {
      let pool = PoolManager::new(&config.database_url, Some(config.pool))?;
      debug!("Translator configured for {}", pool.url());

      Ok(Self::with_pool(pool))
   }

   /// Build the service graph around an existing pool manager
   pub fn with_pool(pool: Arc<PoolManager>) -> Self {
      let executor = Executor::new(pool);
      let sessions = SessionService::new(executor.clone());

      Self { executor, sessions }
   }

   pub fn executor(&self) -> &Executor {
      &self.executor
   }

   pub fn sessions(&self) -> &SessionService {
      &self.sessions
   }

   pub fn pool(&self) -> &Arc<PoolManager> {
      self.executor.pool()
   }

   /// Close the pool. Later operations fail with a pool-closed error.
   pub async fn close(&self) {
      self.pool().close().await;
   }
}
