//! Single-statement query execution over a pooled connection

use std::sync::Arc;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection};
use sqlx::{Connection, Sqlite};
use sqlx_sqlite_pool::PoolManager;
use tracing::{debug, trace};

use crate::decode::{column_value, decode_rows};
use crate::named::NamedStatement;
use crate::returning::{Scalar, ScalarType, normalize_returned};
use crate::transaction::UnitOfWork;
use crate::value::{Params, Row, Value};
use crate::{Error, Result};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// When a mutation's changes become durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commit {
   /// Autocommit: the statement is durable once the call returns.
   #[default]
   Immediate,
   /// Run inside a transaction that is never committed. The connection goes
   /// back to the pool when the call ends, so the change is rolled back.
   /// Use [`Executor::begin`] for work that spans several statements.
   Deferred,
}

/// Runs one named-parameter statement per call.
///
/// Each call leases its own connection and returns it on every exit path,
/// including errors and cancellation. Parameter problems are reported before a
/// connection is leased.
///
/// # Example
///
/// ```no_run
/// use sqlx_sqlite_exec::{Commit, Executor, ScalarType, params};
/// use sqlx_sqlite_pool::PoolManager;
///
/// # async fn example() -> Result<(), sqlx_sqlite_exec::Error> {
/// let executor = Executor::new(PoolManager::new("sqlite://app.db?mode=rwc", None)?);
///
/// executor
///    .execute_mutation(
///       "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT)",
///       &params! {},
///       Commit::Immediate,
///    )
///    .await?;
///
/// let id = executor
///    .execute_returning_scalar(
///       "INSERT INTO users (name) VALUES (:name) RETURNING id INTO :out_id",
///       &params! { "name" => "Alice" },
///       "out_id",
///       ScalarType::Integer,
///    )
///    .await?;
///
/// let row = executor
///    .fetch_one("SELECT name FROM users WHERE id = :id", &params! { "id" => id.as_i64() })
///    .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
   pool: Arc<PoolManager>,
}

impl Executor {
   pub fn new(pool: Arc<PoolManager>) -> Self {
      Self { pool }
   }

   pub fn pool(&self) -> &Arc<PoolManager> {
      &self.pool
   }

   /// Run an INSERT, UPDATE, DELETE or DDL statement and return the affected row count.
   pub async fn execute_mutation(&self, sql: &str, params: &Params, commit: Commit) -> Result<u64> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      let mut conn = self.pool.lease().await?;

      match commit {
         Commit::Immediate => {
            let affected = run_mutation(&mut conn, query).await?;
            trace!("Mutation affected {} rows", affected);
            Ok(affected)
         }
         Commit::Deferred => {
            let mut tx = conn.begin().await.map_err(Error::Query)?;
            let affected = run_mutation(&mut tx, query).await?;
            tx.rollback().await.map_err(Error::Query)?;
            debug!(
               "Deferred mutation ({} rows) rolled back on release",
               affected
            );
            Ok(affected)
         }
      }
   }

   /// Fetch the first row, or `None` when nothing matches.
   ///
   /// Rows past the first are ignored.
   pub async fn fetch_one(&self, sql: &str, params: &Params) -> Result<Option<Row>> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      let mut conn = self.pool.lease().await?;
      run_fetch_one(&mut conn, query).await
   }

   /// Fetch every matching row in result order.
   pub async fn fetch_all(&self, sql: &str, params: &Params) -> Result<Vec<Row>> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      let mut conn = self.pool.lease().await?;
      run_fetch_all(&mut conn, query).await
   }

   /// Run a statement with a `RETURNING <expr> INTO :out_bind` clause and return
   /// the single value it produced, coerced to `out_type`.
   ///
   /// The statement always commits before the output is examined, so an
   /// `UPDATE ... RETURNING` that matched nothing still commits (a no-op) and
   /// then fails with [`Error::EmptyReturn`].
   pub async fn execute_returning_scalar(
      &self,
      sql: &str,
      params: &Params,
      out_bind: &str,
      out_type: ScalarType,
   ) -> Result<Scalar> {
      let statement = NamedStatement::parse_returning(sql, out_bind)?;
      let query = statement.bind(params)?;

      let mut conn = self.pool.lease().await?;
      let mut tx = conn.begin().await.map_err(Error::Query)?;
      let returned = run_returning(&mut tx, query).await?;
      tx.commit().await.map_err(Error::Query)?;

      resolve_returned(returned, out_type)
   }

   /// Start a unit of work: several statements on one connection, one transaction.
   pub async fn begin(&self) -> Result<UnitOfWork> {
      let tx = self.pool.begin().await?;
      Ok(UnitOfWork::new(tx))
   }
}

pub(crate) async fn run_mutation(conn: &mut SqliteConnection, query: SqliteQuery<'_>) -> Result<u64> {
   let result = query.execute(&mut *conn).await.map_err(Error::Query)?;
   Ok(result.rows_affected())
}

pub(crate) async fn run_fetch_one(
   conn: &mut SqliteConnection,
   query: SqliteQuery<'_>,
) -> Result<Option<Row>> {
   match query.fetch_optional(&mut *conn).await.map_err(Error::Query)? {
      Some(row) => Ok(decode_rows(vec![row])?.pop()),
      None => Ok(None),
   }
}

pub(crate) async fn run_fetch_all(
   conn: &mut SqliteConnection,
   query: SqliteQuery<'_>,
) -> Result<Vec<Row>> {
   let rows = query.fetch_all(&mut *conn).await.map_err(Error::Query)?;
   decode_rows(rows)
}

/// Values the RETURNING clause produced, one per affected row.
pub(crate) async fn run_returning(
   conn: &mut SqliteConnection,
   query: SqliteQuery<'_>,
) -> Result<Vec<Value>> {
   let rows = query.fetch_all(&mut *conn).await.map_err(Error::Query)?;
   rows.iter().map(|row| column_value(row, 0)).collect()
}

pub(crate) fn resolve_returned(returned: Vec<Value>, out_type: ScalarType) -> Result<Scalar> {
   let value = normalize_returned(returned)?;
   let scalar = out_type.coerce(value)?;
   trace!("RETURNING produced {:?}", scalar);
   Ok(scalar)
}
