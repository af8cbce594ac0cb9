//! Rendering of optional record fields into label and sample values.
//!
//! Absent fields render as the empty string so a null never aborts a record.

use crate::hosting::{Label, User};
use chrono::{DateTime, Utc};
use std::borrow::Cow;

#[must_use]
pub fn text(value: Option<&str>) -> Cow<'_, str> {
    Cow::Borrowed(value.unwrap_or_default())
}

#[must_use]
pub fn number(value: Option<i64>) -> Cow<'static, str> {
    value.map_or(Cow::Borrowed(""), |v| Cow::Owned(v.to_string()))
}

#[must_use]
pub const fn flag(value: Option<bool>) -> Cow<'static, str> {
    match value {
        Some(true) => Cow::Borrowed("true"),
        Some(false) => Cow::Borrowed("false"),
        None => Cow::Borrowed(""),
    }
}

/// Renders as `2024-01-02 03:04:05 UTC`
#[must_use]
pub fn timestamp(value: Option<DateTime<Utc>>) -> Cow<'static, str> {
    value.map_or(Cow::Borrowed(""), |v| Cow::Owned(v.to_string()))
}

#[must_use]
pub fn login(user: Option<&User>) -> Cow<'_, str> {
    text(user.and_then(|u| u.login.as_deref()))
}

/// Comma-joined logins, skipping users without one
#[must_use]
pub fn logins(users: Option<&[User]>) -> Cow<'static, str> {
    let joined = users
        .unwrap_or_default()
        .iter()
        .filter_map(|u| u.login.as_deref())
        .collect::<Vec<_>>()
        .join(",");
    Cow::Owned(joined)
}

/// Name of the first label, if any
#[must_use]
pub fn first_label(labels: Option<&[Label]>) -> Cow<'_, str> {
    text(labels.and_then(<[Label]>::first).and_then(|l| l.name.as_deref()))
}

/// Sample value for a count field
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "GitHub counts are far below 2^52")]
pub fn count_value(value: Option<i64>) -> Option<f64> {
    value.map(|v| v as f64)
}

/// Sample value for a boolean field: 1 for true, 0 for false
#[must_use]
pub fn flag_value(value: Option<bool>) -> Option<f64> {
    value.map(|v| if v { 1.0 } else { 0.0 })
}

/// Sample value for a timestamp field, in Unix seconds
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "Unix seconds are far below 2^52")]
pub fn timestamp_value(value: Option<DateTime<Utc>>) -> Option<f64> {
    value.map(|v| v.timestamp() as f64)
}

/// Sample value carrying a record's position in its listing
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "listing positions are small")]
pub fn position_value(position: usize) -> f64 {
    position as f64
}
