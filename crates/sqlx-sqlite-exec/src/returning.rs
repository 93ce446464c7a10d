//! Output-variable handling for `RETURNING ... INTO :name` statements

use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::{Error, Result};

/// Declared type of an output parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
   Integer,
   Text,
   Float,
}

impl ScalarType {
   fn name(self) -> &'static str {
      match self {
         ScalarType::Integer => "integer",
         ScalarType::Text => "text",
         ScalarType::Float => "float",
      }
   }

   /// Coerce a non-null returned value to this type.
   ///
   /// Integers pass as-is, reals truncate toward zero and numeric text parses.
   /// Text passes unchanged; numbers render as text. Floats accept integers and
   /// numeric text. Blobs never coerce.
   pub fn coerce(self, value: Value) -> Result<Scalar> {
      let mismatch = |found: String| Error::ScalarCoercion {
         expected: self.name(),
         found,
      };

      match (self, value) {
         (ScalarType::Integer, Value::Integer(v)) => Ok(Scalar::Integer(v)),
         (ScalarType::Integer, Value::Real(v)) => {
            let truncated = v.trunc();
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
               Ok(Scalar::Integer(truncated as i64))
            } else {
               Err(mismatch(format!("REAL {v}")))
            }
         }
         (ScalarType::Integer, Value::Text(v)) => v
            .trim()
            .parse::<i64>()
            .map(Scalar::Integer)
            .map_err(|_| mismatch(format!("TEXT {v:?}"))),

         (ScalarType::Text, Value::Text(v)) => Ok(Scalar::Text(v)),
         (ScalarType::Text, Value::Integer(v)) => Ok(Scalar::Text(v.to_string())),
         (ScalarType::Text, Value::Real(v)) => Ok(Scalar::Text(v.to_string())),

         (ScalarType::Float, Value::Real(v)) => Ok(Scalar::Float(v)),
         (ScalarType::Float, Value::Integer(v)) => Ok(Scalar::Float(v as f64)),
         (ScalarType::Float, Value::Text(v)) => v
            .trim()
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|_| mismatch(format!("TEXT {v:?}"))),

         (_, Value::Null) => Err(Error::NullReturn),
         (_, other) => Err(mismatch(other.type_name().to_string())),
      }
   }
}

/// A value extracted from an output parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
   Integer(i64),
   Text(String),
   Float(f64),
}

impl Scalar {
   pub fn as_i64(&self) -> Option<i64> {
      match self {
         Scalar::Integer(v) => Some(*v),
         _ => None,
      }
   }

   pub fn as_str(&self) -> Option<&str> {
      match self {
         Scalar::Text(v) => Some(v),
         _ => None,
      }
   }

   pub fn as_f64(&self) -> Option<f64> {
      match self {
         Scalar::Float(v) => Some(*v),
         _ => None,
      }
   }

   pub fn scalar_type(&self) -> ScalarType {
      match self {
         Scalar::Integer(_) => ScalarType::Integer,
         Scalar::Text(_) => ScalarType::Text,
         Scalar::Float(_) => ScalarType::Float,
      }
   }
}

/// Resolve the values an output parameter received into its single value.
///
/// This is the one place that decides between "no row matched" (`EmptyReturn`),
/// "a row matched but the column was NULL" (`NullReturn`) and "more than one row
/// matched" (`MultipleReturn`). Callers must not re-check.
pub fn normalize_returned(values: Vec<Value>) -> Result<Value> {
   let count = values.len();
   let mut values = values.into_iter();

   match (values.next(), count) {
      (None, _) => Err(Error::EmptyReturn),
      (Some(Value::Null), 1) => Err(Error::NullReturn),
      (Some(value), 1) => Ok(value),
      (Some(_), n) => Err(Error::MultipleReturn(n)),
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_normalize_empty() {
      assert!(matches!(normalize_returned(vec![]), Err(Error::EmptyReturn)));
   }

   #[test]
   fn test_normalize_null() {
      assert!(matches!(
         normalize_returned(vec![Value::Null]),
         Err(Error::NullReturn)
      ));
   }

   #[test]
   fn test_normalize_single() {
      assert_eq!(
         normalize_returned(vec![Value::Integer(42)]).unwrap(),
         Value::Integer(42)
      );
   }

   #[test]
   fn test_normalize_multiple() {
      assert!(matches!(
         normalize_returned(vec![Value::Integer(1), Value::Null]),
         Err(Error::MultipleReturn(2))
      ));
   }

   #[test]
   fn test_integer_coercion() {
      assert_eq!(
         ScalarType::Integer.coerce(Value::Integer(5)).unwrap(),
         Scalar::Integer(5)
      );
      assert_eq!(
         ScalarType::Integer.coerce(Value::Real(5.9)).unwrap(),
         Scalar::Integer(5)
      );
      assert_eq!(
         ScalarType::Integer.coerce(Value::Real(-5.9)).unwrap(),
         Scalar::Integer(-5)
      );
      assert_eq!(
         ScalarType::Integer.coerce(Value::Text(" 17 ".into())).unwrap(),
         Scalar::Integer(17)
      );
      assert!(matches!(
         ScalarType::Integer.coerce(Value::Text("abc".into())),
         Err(Error::ScalarCoercion {
            expected: "integer",
            ..
         })
      ));
      assert!(ScalarType::Integer.coerce(Value::Real(f64::NAN)).is_err());
   }

   #[test]
   fn test_text_passes_through() {
      assert_eq!(
         ScalarType::Text.coerce(Value::Text("abc".into())).unwrap(),
         Scalar::Text("abc".into())
      );
      assert_eq!(
         ScalarType::Text.coerce(Value::Integer(3)).unwrap(),
         Scalar::Text("3".into())
      );
   }

   #[test]
   fn test_float_coercion() {
      assert_eq!(
         ScalarType::Float.coerce(Value::Integer(2)).unwrap(),
         Scalar::Float(2.0)
      );
      assert_eq!(
         ScalarType::Float.coerce(Value::Text("2.5".into())).unwrap(),
         Scalar::Float(2.5)
      );
   }

   #[test]
   fn test_blob_never_coerces() {
      for ty in [ScalarType::Integer, ScalarType::Text, ScalarType::Float] {
         assert!(matches!(
            ty.coerce(Value::Blob(vec![1])),
            Err(Error::ScalarCoercion { found, .. }) if found == "BLOB"
         ));
      }
   }

   #[test]
   fn test_scalar_serializes_untagged() {
      assert_eq!(serde_json::to_string(&Scalar::Integer(9)).unwrap(), "9");
      assert_eq!(serde_json::to_string(&Scalar::Text("x".into())).unwrap(), "\"x\"");
   }
}
