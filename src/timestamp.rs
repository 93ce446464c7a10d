//! UTC timestamps as stored and as rendered to clients
//!
//! The store writes `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, e.g.
//! `2025-10-17T10:12:34.567Z`. Clients get the same shape back.

use serde::Serializer;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, Result};

const ISO_Z: &[BorrowedFormatItem<'static>] =
   format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Parse a stored timestamp
pub fn parse(column: &'static str, value: &str) -> Result<OffsetDateTime> {
   OffsetDateTime::parse(value, &Rfc3339)
      .map(|ts| ts.to_offset(UtcOffset::UTC))
      .map_err(|source| Error::Timestamp {
         column,
         value: value.to_string(),
         source,
      })
}

/// Render as UTC ISO-8601 with milliseconds and a trailing `Z`
pub fn format(ts: OffsetDateTime) -> std::result::Result<String, time::error::Format> {
   ts.to_offset(UtcOffset::UTC).format(ISO_Z)
}

pub(crate) fn serialize<S>(ts: &OffsetDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
   S: Serializer,
{
   let text = format(*ts).map_err(serde::ser::Error::custom)?;
   serializer.serialize_str(&text)
}

pub(crate) fn serialize_option<S>(
   ts: &Option<OffsetDateTime>,
   serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
   S: Serializer,
{
   match ts {
      Some(ts) => serialize(ts, serializer),
      None => serializer.serialize_none(),
   }
}
