//! Named-parameter statements
//!
//! SQL is written with `:name` placeholders. SQLite numbers its own placeholders,
//! so before execution each distinct name is rewritten to `?N` and the values are
//! bound in that order. Values never enter the SQL text.
//!
//! Quoted strings, quoted identifiers and comments are copied untouched, so a
//! colon inside `'10:30'` is not a placeholder.

use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use crate::value::{Params, Value};
use crate::{Error, Result};

/// A statement with its named placeholders resolved to SQLite numbered ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedStatement {
   sql: String,
   names: Vec<String>,
}

impl NamedStatement {
   /// Parse a statement that only has input parameters.
   pub fn parse(sql: &str) -> Result<Self> {
      let (statement, _) = rewrite(sql, None)?;
      Ok(statement)
   }

   /// Parse a statement ending in `RETURNING <expr> INTO :out_bind`.
   ///
   /// The `INTO :out_bind` part is removed; the rows the RETURNING clause yields
   /// become the output variable. The output parameter must appear exactly once.
   pub fn parse_returning(sql: &str, out_bind: &str) -> Result<Self> {
      let out_bind = out_bind.strip_prefix(':').unwrap_or(out_bind);
      let (statement, occurrences) = rewrite(sql, Some(out_bind))?;

      match occurrences {
         1 => Ok(statement),
         0 => Err(Error::InvalidOutputBind(format!(
            ":{out_bind} does not appear in the statement"
         ))),
         n => Err(Error::InvalidOutputBind(format!(
            ":{out_bind} appears {n} times, expected once"
         ))),
      }
   }

   /// The rewritten SQL, with `?N` placeholders.
   pub fn sql(&self) -> &str {
      &self.sql
   }

   /// Input parameter names; the name at index `i` is bound to `?{i + 1}`.
   pub fn parameter_names(&self) -> &[String] {
      &self.names
   }

   /// Build a sqlx query with every named value bound to its number.
   ///
   /// Every referenced name must have a value and every value must be referenced.
   pub(crate) fn bind<'q>(
      &'q self,
      params: &Params,
   ) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
      if let Some(unused) = params
         .names()
         .find(|name| !self.names.iter().any(|n| n == name))
      {
         return Err(Error::UnknownParameter(unused.to_string()));
      }

      let mut query = sqlx::query(&self.sql);
      for name in &self.names {
         let value = params
            .get(name)
            .ok_or_else(|| Error::MissingParameter(name.clone()))?;
         query = bind_value(query, value.clone());
      }

      Ok(query)
   }
}

/// Helper function to bind a value to a SQLx query
pub fn bind_value<'a>(
   query: Query<'a, Sqlite, SqliteArguments<'a>>,
   value: Value,
) -> Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      Value::Null => query.bind(None::<i64>),
      Value::Integer(v) => query.bind(v),
      Value::Real(v) => query.bind(v),
      Value::Text(v) => query.bind(v),
      Value::Blob(v) => query.bind(v),
   }
}

/// Rewrite `:name` placeholders, returning the statement and how often `out_bind` appeared.
fn rewrite(sql: &str, out_bind: Option<&str>) -> Result<(NamedStatement, usize)> {
   let chars: Vec<char> = sql.chars().collect();
   let mut out = String::with_capacity(sql.len());
   let mut names: Vec<String> = Vec::new();
   let mut out_occurrences = 0;
   let mut i = 0;

   while i < chars.len() {
      let c = chars[i];
      let next = chars.get(i + 1).copied();

      match c {
         '\'' | '"' | '`' => {
            let end = skip_quoted(&chars, i, c);
            out.extend(&chars[i..end]);
            i = end;
         }
         '[' => {
            let end = skip_past(&chars, i + 1, &[']']);
            out.extend(&chars[i..end]);
            i = end;
         }
         '-' if next == Some('-') => {
            let end = skip_past(&chars, i + 2, &['\n']);
            out.extend(&chars[i..end]);
            i = end;
         }
         '/' if next == Some('*') => {
            let end = skip_past(&chars, i + 2, &['*', '/']);
            out.extend(&chars[i..end]);
            i = end;
         }
         ':' if next.is_some_and(is_ident_start) => {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && is_ident_char(chars[end]) {
               end += 1;
            }
            let name: String = chars[start..end].iter().collect();

            if out_bind == Some(name.as_str()) {
               strip_trailing_into(&mut out, &name)?;
               out_occurrences += 1;
            } else {
               let number = match names.iter().position(|n| *n == name) {
                  Some(pos) => pos + 1,
                  None => {
                     names.push(name);
                     names.len()
                  }
               };
               out.push('?');
               out.push_str(&number.to_string());
            }
            i = end;
         }
         '?' => {
            let mut end = i + 1;
            while end < chars.len() && chars[end].is_ascii_digit() {
               end += 1;
            }
            return Err(Error::PositionalPlaceholder(chars[i..end].iter().collect()));
         }
         '$' | '@'
            if next.is_some_and(is_ident_char)
               && !out.chars().next_back().is_some_and(is_ident_char) =>
         {
            let mut end = i + 1;
            while end < chars.len() && is_ident_char(chars[end]) {
               end += 1;
            }
            return Err(Error::PositionalPlaceholder(chars[i..end].iter().collect()));
         }
         _ => {
            out.push(c);
            i += 1;
         }
      }
   }

   Ok((NamedStatement { sql: out, names }, out_occurrences))
}

/// End index of a quoted run starting at `start`; a doubled quote is an escaped quote.
/// An unterminated run extends to the end and is left for SQLite to reject.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
   let mut i = start + 1;
   while i < chars.len() {
      if chars[i] == quote {
         if chars.get(i + 1) == Some(&quote) {
            i += 2;
            continue;
         }
         return i + 1;
      }
      i += 1;
   }
   chars.len()
}

/// Index just past the first occurrence of `terminator` at or after `from`.
fn skip_past(chars: &[char], from: usize, terminator: &[char]) -> usize {
   let mut i = from;
   while i + terminator.len() <= chars.len() {
      if chars[i..i + terminator.len()] == *terminator {
         return i + terminator.len();
      }
      i += 1;
   }
   chars.len()
}

/// Drop the `INTO` keyword that must precede the output parameter.
fn strip_trailing_into(out: &mut String, name: &str) -> Result<()> {
   let trimmed = out.trim_end();
   let keyword_start = trimmed.len().saturating_sub(4);
   let has_into = trimmed.len() >= 4
      && trimmed.is_char_boundary(keyword_start)
      && trimmed[keyword_start..].eq_ignore_ascii_case("into")
      && !trimmed[..keyword_start]
         .chars()
         .next_back()
         .is_some_and(is_ident_char);

   if !has_into {
      return Err(Error::InvalidOutputBind(format!(
         ":{name} must be written as `RETURNING <expr> INTO :{name}`"
      )));
   }

   out.truncate(keyword_start);
   Ok(())
}

fn is_ident_start(c: char) -> bool {
   c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
   c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_names_become_numbered_placeholders() {
      let stmt = NamedStatement::parse(
         "INSERT INTO t (user_id, lang) VALUES (:user_id, :lang)",
      )
      .unwrap();

      assert_eq!(stmt.sql(), "INSERT INTO t (user_id, lang) VALUES (?1, ?2)");
      assert_eq!(stmt.parameter_names(), ["user_id", "lang"]);
   }

   #[test]
   fn test_repeated_name_reuses_number() {
      let stmt = NamedStatement::parse("SELECT * FROM t WHERE a = :x OR b = :y OR c = :x").unwrap();

      assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = ?1 OR b = ?2 OR c = ?1");
      assert_eq!(stmt.parameter_names(), ["x", "y"]);
   }

   #[test]
   fn test_literals_and_comments_are_untouched() {
      let sql = "SELECT ':not', \"col:umn\", [a:b] -- :comment\nFROM t /* :block */ WHERE x = :real";
      let stmt = NamedStatement::parse(sql).unwrap();

      assert_eq!(
         stmt.sql(),
         "SELECT ':not', \"col:umn\", [a:b] -- :comment\nFROM t /* :block */ WHERE x = ?1"
      );
      assert_eq!(stmt.parameter_names(), ["real"]);
   }

   #[test]
   fn test_escaped_quote_inside_literal() {
      let stmt = NamedStatement::parse("SELECT 'it''s :fine' WHERE a = :a").unwrap();

      assert_eq!(stmt.sql(), "SELECT 'it''s :fine' WHERE a = ?1");
   }

   #[test]
   fn test_positional_placeholders_rejected() {
      for sql in [
         "SELECT * FROM t WHERE id = ?",
         "SELECT * FROM t WHERE id = ?1",
         "SELECT * FROM t WHERE id = $id",
         "SELECT * FROM t WHERE id = @id",
      ] {
         assert!(
            matches!(
               NamedStatement::parse(sql),
               Err(Error::PositionalPlaceholder(_))
            ),
            "{sql} should be rejected"
         );
      }
   }

   #[test]
   fn test_dollar_inside_identifier_is_allowed() {
      let stmt = NamedStatement::parse("SELECT a$b FROM t").unwrap();
      assert_eq!(stmt.sql(), "SELECT a$b FROM t");
   }

   #[test]
   fn test_returning_into_is_stripped() {
      let stmt = NamedStatement::parse_returning(
         "INSERT INTO users(username) VALUES(:u) RETURNING id INTO :out_id",
         "out_id",
      )
      .unwrap();

      assert_eq!(
         stmt.sql(),
         "INSERT INTO users(username) VALUES(?1) RETURNING id "
      );
      assert_eq!(stmt.parameter_names(), ["u"]);
   }

   #[test]
   fn test_returning_into_is_case_insensitive() {
      let stmt =
         NamedStatement::parse_returning("insert into t(a) values(:a) returning id into\n  :new_id", ":new_id")
            .unwrap();

      assert_eq!(stmt.sql(), "insert into t(a) values(?1) returning id ");
   }

   #[test]
   fn test_returning_missing_out_bind() {
      let err = NamedStatement::parse_returning(
         "INSERT INTO t(a) VALUES(:a) RETURNING id",
         "out_id",
      )
      .unwrap_err();

      assert!(matches!(err, Error::InvalidOutputBind(m) if m.contains("does not appear")));
   }

   #[test]
   fn test_returning_repeated_out_bind() {
      let err = NamedStatement::parse_returning(
         "INSERT INTO t(a) VALUES(1) RETURNING id INTO :out_id, a INTO :out_id",
         "out_id",
      )
      .unwrap_err();

      assert!(matches!(err, Error::InvalidOutputBind(m) if m.contains("2 times")));
   }

   #[test]
   fn test_out_bind_without_into() {
      let err = NamedStatement::parse_returning(
         "UPDATE t SET a = :out_id",
         "out_id",
      )
      .unwrap_err();

      assert!(matches!(err, Error::InvalidOutputBind(m) if m.contains("INTO :out_id")));

      // A word merely ending in "into" is not the keyword
      assert!(
         NamedStatement::parse_returning("SELECT 1 AS xinto :out_id", "out_id").is_err()
      );
   }

   #[test]
   fn test_bind_checks_params() {
      let stmt = NamedStatement::parse("SELECT :a, :b").unwrap();

      // Query has no Debug impl, so unwrap through err()
      let missing = stmt.bind(&Params::new().bind("a", 1)).err().unwrap();
      assert!(matches!(missing, Error::MissingParameter(n) if n == "b"));

      let unknown = stmt
         .bind(&Params::new().bind("a", 1).bind("b", 2).bind("c", 3))
         .err()
         .unwrap();
      assert!(matches!(unknown, Error::UnknownParameter(n) if n == "c"));

      assert!(stmt.bind(&Params::new().bind(":a", 1).bind("b", 2)).is_ok());
   }
}
