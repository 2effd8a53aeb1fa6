//! Calendar source for "today" filters
//!
//! The backend stores lot dates as UTC calendar days, so "today" is the UTC
//! date.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

/// Supplies the current calendar day.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[must_use]
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

#[must_use]
pub fn system_today() -> Today {
    Arc::new(utc_today)
}

/// Fixed day, for tests and replays.
#[must_use]
pub fn fixed_today(day: NaiveDate) -> Today {
    Arc::new(move || day)
}

/// Supplies the current instant as Unix epoch milliseconds.
pub type NowMillis = Arc<dyn Fn() -> i64 + Send + Sync>;

#[must_use]
pub fn system_now_millis() -> NowMillis {
    Arc::new(|| Utc::now().timestamp_millis())
}
