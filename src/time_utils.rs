// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

/// Current time as Unix seconds, the unit of the JWT `exp` claim.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Local calendar date; appointment dates are entered in local time.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a Unix timestamp for display, or `None` if out of range.
pub fn format_unix(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(format_utc_rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unix() {
        assert_eq!(format_unix(0).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(
            format_unix(1_767_225_600).as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
    }
}
