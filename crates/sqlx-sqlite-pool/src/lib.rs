//! # sqlx-sqlite-pool
//!
//! A small wrapper around SQLx's pool that owns exactly one bounded SQLite pool,
//! built lazily on first use, and hands out RAII connection leases.
//!
//! ## Core Types
//!
//! - **[`PoolManager`]**: Owns the pool; constructs it on the first acquisition request
//! - **[`PoolConfig`]**: Pool sizing and timeouts (defaults are the service's fixed values)
//! - **[`PooledConnection`]**: RAII lease returned to the pool on drop
//! - **[`Error`]**: Connection, exhaustion and configuration failures
//!
//! ## Usage
//!
//! ```no_run
//! use sqlx_sqlite_pool::PoolManager;
//!
//! #[tokio::main]
//! async fn main() -> sqlx_sqlite_pool::Result<()> {
//!     // Nothing is opened yet
//!     let manager = PoolManager::new("sqlite://translator.db", None)?;
//!
//!     // First lease builds the pool, waits up to 30s for a free connection
//!     let mut conn = manager.lease().await?;
//!     sqlx::query("SELECT 1").execute(&mut *conn).await.ok();
//!     drop(conn);
//!
//!     manager.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Principles
//!
//! - Uses sqlx's `SqlitePoolOptions` for all pool configuration
//! - Uses sqlx's `SqliteConnectOptions` for connection flags
//! - No retry or backoff: failures go straight back to the caller
//! - The manager is an ordinary value owned by the composition root, not a global
//!
mod config;
mod error;
mod lease;
mod pool;

// Re-export public types
pub use config::PoolConfig;
pub use error::Error;
pub use lease::PooledConnection;
pub use pool::PoolManager;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
