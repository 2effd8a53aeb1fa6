//! Macro for implementing wire conversions on backend status enums
//!
//! The backend exchanges statuses and sectors as upper-case strings
//! (`"RASCUNHO"`, `"ESTOQUE"`, ...). This macro generates `Display`,
//! `FromStr`, `Serialize` and `Deserialize` from a single variant table so the
//! wire spelling lives in exactly one place.
//!
//! # Example
//!
//! ```rust
//! use marops_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, PartialEq, Eq)]
//! pub enum Shift {
//!     Morning,
//!     Night,
//!     Other(String),
//! }
//!
//! impl_wire_enum_conversions!(Shift {
//!     Morning => "MANHA",
//!     Night => "NOITE",
//! } else Other);
//!
//! assert_eq!("noite".parse::<Shift>().unwrap(), Shift::Night);
//! assert_eq!(Shift::Other("TARDE".into()).to_string(), "TARDE");
//! ```

/// Implements Display, FromStr and serde for wire enums
///
/// This macro generates:
/// - Display trait: writes the wire string of the variant
/// - FromStr trait: parses case-insensitive strings to enum variants
/// - Serialize / Deserialize: through the string forms above
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
/// * `else $fallback` - Optional tuple variant holding unrecognised values
///   verbatim; without it, unknown strings are a parse error
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }

        $crate::impl_wire_enum_conversions!(@serde $enum_name);
    };

    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? } else $fallback:ident) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                    Self::$fallback(raw) => f.write_str(raw),
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Ok(Self::$fallback(trimmed.to_string()))
            }
        }

        $crate::impl_wire_enum_conversions!(@serde $enum_name);
    };

    (@serde $enum_name:ident) => {
        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
