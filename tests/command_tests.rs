use live_translator::commands::{self, StartSessionRequest};
use live_translator::{ServiceConfig, Translator};
use serde_json::json;
use sqlx_sqlite_exec::{Commit, params};
use tempfile::TempDir;

async fn create_translator() -> (Translator, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let config = ServiceConfig {
      database_url: format!(
         "sqlite://{}?mode=rwc",
         temp_dir.path().join("translator.db").display()
      ),
      ..Default::default()
   };
   let translator = Translator::new(config).expect("Failed to build translator");

   for ddl in [
      "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT NOT NULL UNIQUE)",
      "CREATE TABLE translation_sessions (
         id INTEGER PRIMARY KEY AUTOINCREMENT,
         user_id INTEGER NOT NULL REFERENCES users(id),
         source_lang TEXT NOT NULL,
         target_lang TEXT NOT NULL,
         started_at TEXT NOT NULL,
         finished_at TEXT
      )",
      "INSERT INTO users (username) VALUES ('demo')",
   ] {
      translator
         .executor()
         .execute_mutation(ddl, &params! {}, Commit::Immediate)
         .await
         .expect("Failed to create schema");
   }

   (translator, temp_dir)
}

#[tokio::test]
async fn test_health_ok() {
   let (translator, _temp) = create_translator().await;

   let response = commands::health(&translator).await;

   assert_eq!(response.status, 200);
   assert_eq!(response.body, json!({ "status": "ok", "db": true }));
}

#[tokio::test]
async fn test_health_reports_failure_in_body() {
   let (translator, _temp) = create_translator().await;
   translator.close().await;

   let response = commands::health(&translator).await;

   assert_eq!(response.status, 200);
   assert_eq!(response.body["status"], "fail");
   assert_eq!(response.body["db"], false);
   assert!(response.body["error"].as_str().unwrap().contains("closed"));
}

#[tokio::test]
async fn test_session_lifecycle() {
   let (translator, _temp) = create_translator().await;

   // Defaults: user 1, pl -> en
   let start = commands::start_session(&translator, StartSessionRequest::default()).await;
   assert_eq!(start.status, 200, "{:?}", start.body);
   let session_id = start.body["session_id"].as_i64().unwrap();
   assert!(start.body["started_at"].as_str().unwrap().ends_with('Z'));

   let get = commands::get_session(&translator, session_id).await;
   assert_eq!(get.status, 200);
   assert_eq!(get.body["id"], session_id);
   assert_eq!(get.body["user_id"], 1);
   assert_eq!(get.body["source_lang"], "pl");
   assert_eq!(get.body["target_lang"], "en");
   assert_eq!(get.body["started_at"], start.body["started_at"]);
   assert!(get.body["finished_at"].is_null());

   let finish = commands::finish_session(&translator, session_id).await;
   assert_eq!(finish.status, 200);
   assert_eq!(
      finish.body,
      json!({ "session_id": session_id, "status": "finished" })
   );

   let again = commands::get_session(&translator, session_id).await;
   assert_eq!(again.status, 200);
   assert!(again.body["finished_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_session_record_has_exactly_the_public_fields() {
   let (translator, _temp) = create_translator().await;

   let start = commands::start_session(&translator, StartSessionRequest::default()).await;
   let session_id = start.body["session_id"].as_i64().unwrap();

   let get = commands::get_session(&translator, session_id).await;
   let mut keys: Vec<&str> = get
      .body
      .as_object()
      .unwrap()
      .keys()
      .map(String::as_str)
      .collect();
   keys.sort_unstable();

   assert_eq!(
      keys,
      ["finished_at", "id", "source_lang", "started_at", "target_lang", "user_id"]
   );
}

#[tokio::test]
async fn test_start_for_missing_user_is_400() {
   let (translator, _temp) = create_translator().await;

   let response = commands::start_session(
      &translator,
      StartSessionRequest {
         user_id: 999_999,
         ..Default::default()
      },
   )
   .await;

   assert_eq!(response.status, 400);
   let detail = response.body["detail"].as_str().unwrap();
   assert!(detail.starts_with("Cannot start session:"), "{detail}");
   assert!(detail.contains("FOREIGN KEY constraint failed"), "{detail}");
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found_body() {
   let (translator, _temp) = create_translator().await;

   let response = commands::get_session(&translator, 42).await;

   assert_eq!(response.status, 200);
   assert_eq!(response.body, json!({ "error": "not_found" }));
}

#[tokio::test]
async fn test_finish_unknown_session_still_reports_finished() {
   let (translator, _temp) = create_translator().await;

   let response = commands::finish_session(&translator, 42).await;

   assert_eq!(response.status, 200);
   assert_eq!(response.body["status"], "finished");
}

#[tokio::test]
async fn test_finish_on_closed_pool_is_500() {
   let (translator, _temp) = create_translator().await;
   translator.close().await;

   let response = commands::finish_session(&translator, 1).await;

   assert_eq!(response.status, 500);
   assert!(response.body["detail"].as_str().unwrap().contains("closed"));
}
