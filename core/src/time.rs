//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into ISO8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse time from RFC2822 (HTTP `Date` header): `Wed, 26 Dec 2012 06:10:30 GMT`
pub fn parse_rfc2822(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc2822(s.trim()).map_err(|e| {
        Error::request_invalid(format!("invalid rfc2822 time: {s}")).with_source(e)
    })?;

    Ok(t.with_timezone(&Utc))
}
