//! Translation session lifecycle
//!
//! A session is `Open` from creation until `finish_session` sets its
//! `finished_at`, after which it is `Finished`. Sessions are never deleted.

use serde::Serialize;
use sqlx_sqlite_exec::{Commit, Executor, Row, ScalarType, params};
use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::{Error, Result, timestamp};

const INSERT_SESSION: &str = "
   INSERT INTO translation_sessions (user_id, source_lang, target_lang, started_at)
   VALUES (:user_id, :source_lang, :target_lang, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
   RETURNING id INTO :out_id";

const SELECT_STARTED_AT: &str = "SELECT started_at FROM translation_sessions WHERE id = :id";

const FINISH_SESSION: &str = "
   UPDATE translation_sessions
   SET finished_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
   WHERE id = :id";

const SELECT_SESSION: &str = "
   SELECT id, user_id, source_lang, target_lang, started_at, finished_at
   FROM translation_sessions WHERE id = :id";

/// Lifecycle state derived from `finished_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
   Open,
   Finished,
}

/// A stored translation session.
///
/// Serializes as `{id, user_id, source_lang, target_lang, started_at, finished_at}`
/// with timestamps rendered as UTC ISO-8601 ending in `Z`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
   pub id: i64,
   pub user_id: i64,
   pub source_lang: String,
   pub target_lang: String,
   #[serde(serialize_with = "timestamp::serialize")]
   pub started_at: OffsetDateTime,
   #[serde(serialize_with = "timestamp::serialize_option")]
   pub finished_at: Option<OffsetDateTime>,
}

impl Session {
   pub fn state(&self) -> SessionState {
      match self.finished_at {
         Some(_) => SessionState::Finished,
         None => SessionState::Open,
      }
   }

   fn from_row(row: &Row) -> Result<Self> {
      let started_at: String = row.get("started_at")?;
      let finished_at: Option<String> = row.get("finished_at")?;

      Ok(Self {
         id: row.get("id")?,
         user_id: row.get("user_id")?,
         source_lang: row.get("source_lang")?,
         target_lang: row.get("target_lang")?,
         started_at: timestamp::parse("started_at", &started_at)?,
         finished_at: finished_at
            .map(|ts| timestamp::parse("finished_at", &ts))
            .transpose()?,
      })
   }
}

/// Identifier and store-assigned start time of a new session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedSession {
   pub session_id: i64,
   #[serde(serialize_with = "timestamp::serialize")]
   pub started_at: OffsetDateTime,
}

/// Creates, finishes and reads translation sessions.
#[derive(Debug, Clone)]
pub struct SessionService {
   executor: Executor,
}

impl SessionService {
   pub fn new(executor: Executor) -> Self {
      Self { executor }
   }

   /// Insert a new open session and return its id and start time.
   ///
   /// The store assigns both. The insert and the read of `started_at` share one
   /// unit of work, so the session is committed only when both succeed. If the
   /// store rejects the insert (for example because `user_id` references no
   /// user) the failure is returned as [`Error::InvalidSession`] with the store's
   /// message intact. Pool failures are returned as they are.
   pub async fn create_session(
      &self,
      user_id: i64,
      source_lang: &str,
      target_lang: &str,
   ) -> Result<StartedSession> {
      let mut uow = self.executor.begin().await?;

      let session_id = uow
         .execute_returning_scalar(
            INSERT_SESSION,
            &params! {
               "user_id" => user_id,
               "source_lang" => source_lang,
               "target_lang" => target_lang,
            },
            "out_id",
            ScalarType::Integer,
         )
         .await
         .map_err(|e| match e {
            sqlx_sqlite_exec::Error::Query(_) => Error::InvalidSession(e),
            other => Error::from(other),
         })?;

      let session_id = session_id
         .as_i64()
         .ok_or_else(|| sqlx_sqlite_exec::Error::ScalarCoercion {
            expected: "integer",
            found: format!("{session_id:?}"),
         })?;

      let row = uow
         .fetch_one(SELECT_STARTED_AT, &params! { "id" => session_id })
         .await?
         .ok_or(sqlx_sqlite_exec::Error::EmptyReturn)?;
      let started_at = timestamp::parse("started_at", &row.get::<String>("started_at")?)?;

      uow.commit().await?;
      debug!("Session {} started for user {}", session_id, user_id);

      Ok(StartedSession {
         session_id,
         started_at,
      })
   }

   /// Mark a session finished, returning the number of rows updated.
   ///
   /// The update runs unconditionally: finishing twice re-sets the timestamp,
   /// and an unknown id updates nothing without being an error.
   pub async fn finish_session(&self, session_id: i64) -> Result<u64> {
      let affected = self
         .executor
         .execute_mutation(FINISH_SESSION, &params! { "id" => session_id }, Commit::Immediate)
         .await?;

      if affected == 0 {
         trace!("finish_session: no session {}", session_id);
      } else {
         debug!("Session {} finished", session_id);
      }

      Ok(affected)
   }

   /// Read one session, or `None` if the id is unknown.
   pub async fn get_session(&self, session_id: i64) -> Result<Option<Session>> {
      self
         .executor
         .fetch_one(SELECT_SESSION, &params! { "id" => session_id })
         .await?
         .as_ref()
         .map(Session::from_row)
         .transpose()
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use time::macros::datetime;

   fn session(finished_at: Option<OffsetDateTime>) -> Session {
      Session {
         id: 7,
         user_id: 1,
         source_lang: "pl".into(),
         target_lang: "en".into(),
         started_at: datetime!(2025-10-17 10:12:34.567 UTC),
         finished_at,
      }
   }

   #[test]
   fn test_state_follows_finished_at() {
      assert_eq!(session(None).state(), SessionState::Open);
      assert_eq!(
         session(Some(datetime!(2025-10-17 10:20:00 UTC))).state(),
         SessionState::Finished
      );
   }

   #[test]
   fn test_open_session_json() {
      let json = serde_json::to_string(&session(None)).unwrap();

      assert_eq!(
         json,
         r#"{"id":7,"user_id":1,"source_lang":"pl","target_lang":"en","started_at":"2025-10-17T10:12:34.567Z","finished_at":null}"#
      );
   }

   #[test]
   fn test_finished_session_json() {
      let value = serde_json::to_value(session(Some(datetime!(2025-10-17 10:20:00 UTC)))).unwrap();
      assert_eq!(value["finished_at"], "2025-10-17T10:20:00.000Z");
   }

   #[test]
   fn test_started_session_json() {
      let started = StartedSession {
         session_id: 3,
         started_at: datetime!(2025-10-17 10:12:34.567 UTC),
      };

      assert_eq!(
         serde_json::to_string(&started).unwrap(),
         r#"{"session_id":3,"started_at":"2025-10-17T10:12:34.567Z"}"#
      );
   }
}
