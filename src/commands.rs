//! Session endpoint handlers
//!
//! Each handler turns one request into a status code and JSON body. They hold
//! no transport code, so any HTTP framework can route to them.

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use sqlx_sqlite_exec::params;
use tracing::{error, warn};

use crate::Translator;

/// Status code and JSON body produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
   pub status: u16,
   pub body: JsonValue,
}

impl Response {
   fn ok(body: JsonValue) -> Self {
      Self { status: 200, body }
   }

   fn with_status(status: u16, body: JsonValue) -> Self {
      Self { status, body }
   }
}

/// Payload to start a translation session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartSessionRequest {
   pub user_id: i64,
   pub source_lang: String,
   pub target_lang: String,
}

impl Default for StartSessionRequest {
   fn default() -> Self {
      Self {
         user_id: 1,
         source_lang: "pl".to_string(),
         target_lang: "en".to_string(),
      }
   }
}

/// Lightweight store check.
///
/// Always answers 200 so a failing store is visible in the body rather than
/// as a server error.
pub async fn health(translator: &Translator) -> Response {
   let result = translator
      .executor()
      .fetch_one("SELECT 1 AS ok", &params! {})
      .await
      .and_then(|row| row.map(|r| r.get::<i64>("ok")).transpose());

   match result {
      Ok(Some(1)) => Response::ok(json!({ "status": "ok", "db": true })),
      Ok(_) => Response::ok(json!({ "status": "fail", "db": false })),
      Err(e) => {
         warn!("Health check failed: {}", e);
         Response::ok(json!({ "status": "fail", "db": false, "error": e.to_string() }))
      }
   }
}

/// Create a session and return its id and start time
///
/// Any failure, including a user id the store does not know, is a 400.
pub async fn start_session(translator: &Translator, request: StartSessionRequest) -> Response {
   let result = translator
      .sessions()
      .create_session(request.user_id, &request.source_lang, &request.target_lang)
      .await;

   match result {
      Ok(started) => match serde_json::to_value(&started) {
         Ok(body) => Response::ok(body),
         Err(e) => start_failed(e),
      },
      Err(e) => start_failed(e),
   }
}

/// Mark a session finished
pub async fn finish_session(translator: &Translator, session_id: i64) -> Response {
   match translator.sessions().finish_session(session_id).await {
      Ok(_) => Response::ok(json!({ "session_id": session_id, "status": "finished" })),
      Err(e) => server_error(e),
   }
}

/// Read a session record
pub async fn get_session(translator: &Translator, session_id: i64) -> Response {
   match translator.sessions().get_session(session_id).await {
      Ok(Some(session)) => match serde_json::to_value(&session) {
         Ok(body) => Response::ok(body),
         Err(e) => server_error(e),
      },
      Ok(None) => Response::ok(json!({ "error": "not_found" })),
      Err(e) => server_error(e),
   }
}

fn start_failed(e: impl std::fmt::Display) -> Response {
   warn!("Cannot start session: {}", e);
   Response::with_status(
      400,
      json!({ "detail": format!("Cannot start session: {e}") }),
   )
}

fn server_error(e: impl std::fmt::Display) -> Response {
   error!("Session request failed: {}", e);
   Response::with_status(500, json!({ "detail": e.to_string() }))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_start_request_defaults() {
      let request: StartSessionRequest = serde_json::from_str("{}").unwrap();
      assert_eq!(request, StartSessionRequest::default());
      assert_eq!(request.user_id, 1);
      assert_eq!(request.source_lang, "pl");
      assert_eq!(request.target_lang, "en");
   }

   #[test]
   fn test_start_request_partial() {
      let request: StartSessionRequest =
         serde_json::from_str(r#"{"user_id": 42, "target_lang": "de"}"#).unwrap();

      assert_eq!(request.user_id, 42);
      assert_eq!(request.source_lang, "pl");
      assert_eq!(request.target_lang, "de");
   }
}
