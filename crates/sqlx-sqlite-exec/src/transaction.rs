//! Multi-statement units of work

use sqlx::sqlite::SqliteConnection;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::executor::{resolve_returned, run_fetch_all, run_fetch_one, run_mutation, run_returning};
use crate::named::NamedStatement;
use crate::returning::{Scalar, ScalarType};
use crate::value::{Params, Row};
use crate::{Error, Result};

/// Several statements on one leased connection, inside one transaction.
///
/// Nothing is visible to other connections until [`UnitOfWork::commit`].
/// Dropping the unit without committing rolls back and returns the connection
/// to the pool.
#[must_use = "if unused, the unit of work is immediately rolled back"]
pub struct UnitOfWork {
   id: String,
   tx: Option<Transaction<'static, Sqlite>>,
}

impl UnitOfWork {
   pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
      let id = uuid::Uuid::new_v4().to_string();
      debug!("Unit of work {} started", id);

      Self { id, tx: Some(tx) }
   }

   /// Generated identifier, used in log output
   pub fn id(&self) -> &str {
      &self.id
   }

   fn conn_mut(&mut self) -> Result<&mut SqliteConnection> {
      self
         .tx
         .as_deref_mut()
         .ok_or(Error::TransactionAlreadyFinalized)
   }

   fn take_tx(&mut self) -> Result<Transaction<'static, Sqlite>> {
      self.tx.take().ok_or(Error::TransactionAlreadyFinalized)
   }

   pub async fn execute_mutation(&mut self, sql: &str, params: &Params) -> Result<u64> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      run_mutation(self.conn_mut()?, query).await
   }

   pub async fn fetch_one(&mut self, sql: &str, params: &Params) -> Result<Option<Row>> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      run_fetch_one(self.conn_mut()?, query).await
   }

   pub async fn fetch_all(&mut self, sql: &str, params: &Params) -> Result<Vec<Row>> {
      let statement = NamedStatement::parse(sql)?;
      let query = statement.bind(params)?;

      run_fetch_all(self.conn_mut()?, query).await
   }

   /// Same output rules as [`crate::Executor::execute_returning_scalar`], but the
   /// insert commits together with the rest of the unit.
   pub async fn execute_returning_scalar(
      &mut self,
      sql: &str,
      params: &Params,
      out_bind: &str,
      out_type: ScalarType,
   ) -> Result<Scalar> {
      let statement = NamedStatement::parse_returning(sql, out_bind)?;
      let query = statement.bind(params)?;

      let returned = run_returning(self.conn_mut()?, query).await?;
      resolve_returned(returned, out_type)
   }

   /// Commit this unit of work
   pub async fn commit(mut self) -> Result<()> {
      let tx = self.take_tx()?;
      tx.commit().await.map_err(Error::Query)?;

      debug!("Unit of work {} committed", self.id);
      Ok(())
   }

   /// Rollback this unit of work
   pub async fn rollback(mut self) -> Result<()> {
      let tx = self.take_tx()?;
      tx.rollback().await.map_err(Error::Query)?;

      debug!("Unit of work {} rolled back", self.id);
      Ok(())
   }
}

impl Drop for UnitOfWork {
   fn drop(&mut self) {
      if self.tx.is_some() {
         debug!("Unit of work {} dropped without commit, rolling back", self.id);
      }
   }
}

impl std::fmt::Debug for UnitOfWork {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("UnitOfWork")
         .field("id", &self.id)
         .field("finalized", &self.tx.is_none())
         .finish()
   }
}
