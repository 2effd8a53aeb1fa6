//! Line status rule
//!
//! Every quantity-tracked line (production items, lot material lines) shows a
//! status derived from how much of the required quantity has been fulfilled.

use serde::{Deserialize, Deserializer, Serialize};

/// Fulfilment status of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "PARCIAL")]
    Partial,
    #[serde(rename = "COMPLETO", alias = "OK")]
    Complete,
    /// Reported by the server only; never derived locally.
    #[serde(rename = "DIVERGENTE")]
    Divergent,
}

impl LineStatus {
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::Partial => "PARCIAL",
            Self::Complete => "COMPLETO",
            Self::Divergent => "DIVERGENTE",
        }
    }

    /// Parse a wire status, accepting `OK` for complete.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDENTE" => Some(Self::Pending),
            "PARCIAL" => Some(Self::Partial),
            "COMPLETO" | "OK" => Some(Self::Complete),
            "DIVERGENTE" => Some(Self::Divergent),
            _ => None,
        }
    }
}

/// Decode an optional status; unrecognised strings count as absent so the
/// status gets derived locally instead of failing the whole payload.
///
/// # Errors
/// Fails only when the value is not a string or null.
pub fn de_opt_line_status<'de, D>(deserializer: D) -> Result<Option<LineStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| LineStatus::from_wire(&s)))
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Derive a line status from fulfilled and required quantities.
///
/// `Complete` needs a positive requirement; any positive fulfilment short of
/// that is `Partial`.
///
/// # Examples
///
/// ```
/// use marops_domain::{derive_line_status, LineStatus};
///
/// assert_eq!(derive_line_status(0.0, 10.0), LineStatus::Pending);
/// assert_eq!(derive_line_status(4.0, 10.0), LineStatus::Partial);
/// assert_eq!(derive_line_status(10.0, 10.0), LineStatus::Complete);
/// assert_eq!(derive_line_status(0.0, 0.0), LineStatus::Pending);
/// ```
#[must_use]
pub fn derive_line_status(fulfilled: f64, required: f64) -> LineStatus {
    if fulfilled >= required && required > 0.0 {
        LineStatus::Complete
    } else if fulfilled > 0.0 {
        LineStatus::Partial
    } else {
        LineStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_fulfilment_is_complete() {
        assert_eq!(derive_line_status(12.0, 10.0), LineStatus::Complete);
    }

    #[test]
    fn zero_requirement_with_fulfilment_is_partial() {
        assert_eq!(derive_line_status(3.0, 0.0), LineStatus::Partial);
    }

    #[test]
    fn ok_is_an_alias_of_complete() {
        let parsed: LineStatus = serde_json::from_str("\"OK\"").unwrap();
        assert_eq!(parsed, LineStatus::Complete);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"COMPLETO\"");
    }

    #[test]
    fn unknown_optional_status_is_absent() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "de_opt_line_status")]
            status: Option<LineStatus>,
        }
        let row: Row = serde_json::from_str(r#"{"status": "EM_ANALISE"}"#).unwrap();
        assert_eq!(row.status, None);
        let row: Row = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(row.status, Some(LineStatus::Complete));
    }

    #[test]
    fn divergent_comes_from_the_wire() {
        let parsed: LineStatus = serde_json::from_str("\"DIVERGENTE\"").unwrap();
        assert_eq!(parsed, LineStatus::Divergent);
    }
}
