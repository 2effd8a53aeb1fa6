//! Lenient decoding of loosely typed backend fields
//!
//! The backend serializes decimals inconsistently: plain JSON numbers,
//! strings such as `"12.5"`, and strings with a decimal comma such as
//! `"12,5"`. Everything here collapses those spellings into `f64`.

use serde::{Deserialize, Deserializer};

/// Parse a decimal that may use a comma as the decimal separator.
///
/// Returns `None` for empty or non-numeric input.
///
/// # Examples
///
/// ```
/// use marops_domain::utils::lenient::parse_decimal;
///
/// assert_eq!(parse_decimal("12,5"), Some(12.5));
/// assert_eq!(parse_decimal(" 3 "), Some(3.0));
/// assert_eq!(parse_decimal("abc"), None);
/// ```
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimal places for display totals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Missing(()),
}

impl Loose {
    fn into_f64(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => parse_decimal(&s),
            Self::Missing(()) => None,
        }
    }
}

/// Deserialize a number that may arrive as a string; null or garbage is 0.
///
/// # Errors
/// Only fails when the value is neither a number, a string nor null.
pub fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.into_f64().unwrap_or(0.0))
}

/// Deserialize an optional number that may arrive as a string.
///
/// # Errors
/// Only fails when the value is neither a number, a string nor null.
pub fn de_lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.into_f64())
}

/// Deserialize an optional label that may arrive as a number (product codes).
///
/// # Errors
/// Fails on arrays, objects and booleans.
pub fn de_opt_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Int(i64),
        Float(f64),
        Text(String),
        Missing(()),
    }

    Ok(match Label::deserialize(deserializer)? {
        Label::Int(n) => Some(n.to_string()),
        Label::Float(f) => Some(f.to_string()),
        Label::Text(s) => Some(s),
        Label::Missing(()) => None,
    })
}
