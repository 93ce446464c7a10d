use std::sync::Arc;

use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row as _, TypeInfo, Value as _, ValueRef};

use crate::Error;
use crate::value::{Row, Value};

/// Convert a SQLite value to a typed [`Value`].
///
/// SQLite reports the storage class of each value at runtime, so expression
/// columns (e.g. `SELECT 1`) decode the same way as table columns. Declared
/// types such as DATE or DATETIME are stored as TEXT and stay text here.
pub fn to_value(value: SqliteValueRef) -> Result<Value, Error> {
   if value.is_null() {
      return Ok(Value::Null);
   }

   let column_type = value.type_info();
   let owned = value.to_owned();

   let result = match column_type.name() {
      "INTEGER" | "BOOLEAN" => Value::Integer(owned.try_decode::<i64>().map_err(Error::Query)?),

      "NUMERIC" => match owned.try_decode::<i64>() {
         Ok(v) => Value::Integer(v),
         Err(_) => Value::Real(owned.try_decode::<f64>().map_err(Error::Query)?),
      },

      "REAL" => Value::Real(owned.try_decode::<f64>().map_err(Error::Query)?),

      "TEXT" | "DATE" | "TIME" | "DATETIME" => {
         Value::Text(owned.try_decode::<String>().map_err(Error::Query)?)
      }

      "BLOB" => Value::Blob(owned.try_decode::<Vec<u8>>().map_err(Error::Query)?),

      "NULL" => Value::Null,

      other => {
         // For unknown types, try to decode as text
         if let Ok(text) = owned.try_decode::<String>() {
            Value::Text(text)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown SQLite type: {}",
               other
            )));
         }
      }
   };

   Ok(result)
}

/// Decode one column of a row.
pub(crate) fn column_value(row: &SqliteRow, index: usize) -> Result<Value, Error> {
   let raw = row.try_get_raw(index).map_err(Error::Query)?;
   to_value(raw)
}

/// Decode a result set, sharing one column-name list between its rows.
pub(crate) fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<Row>, Error> {
   let Some(first) = rows.first() else {
      return Ok(Vec::new());
   };

   let columns: Arc<[String]> = first
      .columns()
      .iter()
      .map(|column| column.name().to_string())
      .collect();

   let mut decoded = Vec::with_capacity(rows.len());
   for row in &rows {
      let values = (0..columns.len())
         .map(|i| column_value(row, i))
         .collect::<Result<Vec<_>, _>>()?;
      decoded.push(Row::new(Arc::clone(&columns), values));
   }

   Ok(decoded)
}
