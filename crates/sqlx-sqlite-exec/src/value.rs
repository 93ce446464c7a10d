//! Typed dynamic values, named parameters and result rows

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// A single SQLite value, tagged with its storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   Null,
   Integer(i64),
   Real(f64),
   Text(String),
   Blob(Vec<u8>),
}

impl Value {
   pub fn is_null(&self) -> bool {
      matches!(self, Value::Null)
   }

   /// SQLite storage class name, as used in error messages.
   pub fn type_name(&self) -> &'static str {
      match self {
         Value::Null => "NULL",
         Value::Integer(_) => "INTEGER",
         Value::Real(_) => "REAL",
         Value::Text(_) => "TEXT",
         Value::Blob(_) => "BLOB",
      }
   }

   /// Convert to JSON.
   ///
   /// BLOB values become base64 strings since JSON has no native binary type.
   /// Non-finite reals become `null`.
   pub fn to_json(&self) -> JsonValue {
      match self {
         Value::Null => JsonValue::Null,
         Value::Integer(v) => JsonValue::Number((*v).into()),
         Value::Real(v) => JsonValue::from(*v),
         Value::Text(v) => JsonValue::String(v.clone()),
         Value::Blob(v) => JsonValue::String(base64_encode(v)),
      }
   }
}

impl Serialize for Value {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      self.to_json().serialize(serializer)
   }
}

impl From<i64> for Value {
   fn from(v: i64) -> Self {
      Value::Integer(v)
   }
}

impl From<i32> for Value {
   fn from(v: i32) -> Self {
      Value::Integer(v.into())
   }
}

impl From<u32> for Value {
   fn from(v: u32) -> Self {
      Value::Integer(v.into())
   }
}

impl From<bool> for Value {
   fn from(v: bool) -> Self {
      Value::Integer(v.into())
   }
}

impl From<f64> for Value {
   fn from(v: f64) -> Self {
      Value::Real(v)
   }
}

impl From<&str> for Value {
   fn from(v: &str) -> Self {
      Value::Text(v.to_owned())
   }
}

impl From<String> for Value {
   fn from(v: String) -> Self {
      Value::Text(v)
   }
}

impl From<Vec<u8>> for Value {
   fn from(v: Vec<u8>) -> Self {
      Value::Blob(v)
   }
}

impl<T: Into<Value>> From<Option<T>> for Value {
   fn from(v: Option<T>) -> Self {
      v.map_or(Value::Null, Into::into)
   }
}

/// Named parameter values for one statement.
///
/// Names are stored without the leading colon; `":id"` and `"id"` refer to the
/// same parameter. Insertion order is kept for stable debug output.
///
/// ```
/// use sqlx_sqlite_exec::{Params, params};
///
/// let a = Params::new().bind("user_id", 1).bind(":lang", "pl");
/// let b = params! { "user_id" => 1, "lang" => "pl" };
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, Value>);

impl Params {
   pub fn new() -> Self {
      Self::default()
   }

   /// Builder-style insert
   pub fn bind(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
      self.insert(name, value);
      self
   }

   /// Set a parameter, returning the value it replaced
   pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
      self
         .0
         .insert(bare_name(name.as_ref()).to_string(), value.into())
   }

   pub fn get(&self, name: &str) -> Option<&Value> {
      self.0.get(bare_name(name))
   }

   pub fn len(&self) -> usize {
      self.0.len()
   }

   pub fn is_empty(&self) -> bool {
      self.0.is_empty()
   }

   pub fn names(&self) -> impl Iterator<Item = &str> {
      self.0.keys().map(String::as_str)
   }
}

fn bare_name(name: &str) -> &str {
   name.strip_prefix(':').unwrap_or(name)
}

/// Conversion from a borrowed [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
   /// Storage class named in errors when the conversion fails
   const EXPECTED: &'static str;

   fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
   const EXPECTED: &'static str = "INTEGER";

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Integer(v) => Some(*v),
         _ => None,
      }
   }
}

impl FromValue for f64 {
   const EXPECTED: &'static str = "REAL";

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Real(v) => Some(*v),
         Value::Integer(v) => Some(*v as f64),
         _ => None,
      }
   }
}

impl FromValue for bool {
   const EXPECTED: &'static str = "INTEGER";

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Integer(v) => Some(*v != 0),
         _ => None,
      }
   }
}

impl FromValue for String {
   const EXPECTED: &'static str = "TEXT";

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Text(v) => Some(v.clone()),
         _ => None,
      }
   }
}

impl FromValue for Vec<u8> {
   const EXPECTED: &'static str = "BLOB";

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Blob(v) => Some(v.clone()),
         _ => None,
      }
   }
}

impl FromValue for Value {
   const EXPECTED: &'static str = "any value";

   fn from_value(value: &Value) -> Option<Self> {
      Some(value.clone())
   }
}

impl<T: FromValue> FromValue for Option<T> {
   const EXPECTED: &'static str = T::EXPECTED;

   fn from_value(value: &Value) -> Option<Self> {
      match value {
         Value::Null => Some(None),
         other => T::from_value(other).map(Some),
      }
   }
}

/// One result row: values in column order plus the column names.
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
   columns: Arc<[String]>,
   values: Vec<Value>,
}

impl Row {
   pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
      Self { columns, values }
   }

   pub fn columns(&self) -> &[String] {
      &self.columns
   }

   pub fn values(&self) -> &[Value] {
      &self.values
   }

   pub fn into_values(self) -> Vec<Value> {
      self.values
   }

   pub fn len(&self) -> usize {
      self.values.len()
   }

   pub fn is_empty(&self) -> bool {
      self.values.is_empty()
   }

   /// Raw value of a column, matched by name (ASCII case-insensitive like SQLite).
   pub fn value(&self, column: &str) -> Result<&Value> {
      self
         .position(column)
         .map(|i| &self.values[i])
         .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
   }

   /// Typed value of a column by name.
   ///
   /// ```
   /// # fn example(row: &sqlx_sqlite_exec::Row) -> sqlx_sqlite_exec::Result<()> {
   /// let id: i64 = row.get("id")?;
   /// let finished_at: Option<String> = row.get("finished_at")?;
   /// # Ok(())
   /// # }
   /// ```
   pub fn get<T: FromValue>(&self, column: &str) -> Result<T> {
      let value = self.value(column)?;
      T::from_value(value).ok_or_else(|| Error::ColumnType {
         column: column.to_string(),
         expected: T::EXPECTED,
         found: value.type_name(),
      })
   }

   /// Typed value of a column by position.
   pub fn get_at<T: FromValue>(&self, index: usize) -> Result<T> {
      let value = self
         .values
         .get(index)
         .ok_or_else(|| Error::ColumnNotFound(format!("#{index}")))?;
      T::from_value(value).ok_or_else(|| Error::ColumnType {
         column: self.columns[index].clone(),
         expected: T::EXPECTED,
         found: value.type_name(),
      })
   }

   /// Column name to JSON value, in column order.
   pub fn to_json(&self) -> IndexMap<String, JsonValue> {
      self
         .columns
         .iter()
         .zip(&self.values)
         .map(|(column, value)| (column.clone(), value.to_json()))
         .collect()
   }

   fn position(&self, column: &str) -> Option<usize> {
      self
         .columns
         .iter()
         .position(|c| c == column)
         .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))
   }
}

impl Serialize for Row {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      self.to_json().serialize(serializer)
   }
}

/// Base64 encode binary data for JSON serialization.
fn base64_encode(data: &[u8]) -> String {
   use base64::Engine;
   base64::engine::general_purpose::STANDARD.encode(data)
}
