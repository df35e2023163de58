//! Time related utils.

use chrono::Utc;

/// DateTime used in wxsign.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into unix timestamp seconds, as the payment APIs expect in `timeStamp`.
pub fn format_unix_timestamp(t: DateTime) -> String {
    t.timestamp().to_string()
}
