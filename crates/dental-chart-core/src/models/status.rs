//! Tooth status model and conversion from backend representations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Clinical status of a single tooth.
///
/// Numeric codes (`0..=5`) match the backend enum and are what the update
/// endpoint expects on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ToothStatus {
    #[default]
    Healthy,
    Caries,
    Treated,
    Lost,
    Other,
    Unknown,
}

impl ToothStatus {
    /// Every status in code order, for building option lists.
    pub const ALL: [ToothStatus; 6] = [
        ToothStatus::Healthy,
        ToothStatus::Caries,
        ToothStatus::Treated,
        ToothStatus::Lost,
        ToothStatus::Other,
        ToothStatus::Unknown,
    ];

    /// Numeric code used by the backend.
    pub fn code(self) -> u8 {
        match self {
            ToothStatus::Healthy => 0,
            ToothStatus::Caries => 1,
            ToothStatus::Treated => 2,
            ToothStatus::Lost => 3,
            ToothStatus::Other => 4,
            ToothStatus::Unknown => 5,
        }
    }

    /// Status for a numeric code, if it is in range.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ToothStatus::Healthy),
            1 => Some(ToothStatus::Caries),
            2 => Some(ToothStatus::Treated),
            3 => Some(ToothStatus::Lost),
            4 => Some(ToothStatus::Other),
            5 => Some(ToothStatus::Unknown),
            _ => None,
        }
    }

    /// Status for a name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "healthy" => Some(ToothStatus::Healthy),
            "caries" => Some(ToothStatus::Caries),
            "treated" => Some(ToothStatus::Treated),
            "lost" => Some(ToothStatus::Lost),
            "other" => Some(ToothStatus::Other),
            "unknown" => Some(ToothStatus::Unknown),
            _ => None,
        }
    }

    /// Convert whatever the backend sent into a status.
    ///
    /// Never fails: names are tried first, then a numeric code (either a JSON
    /// number or a string holding one). Anything else is logged and becomes
    /// [`ToothStatus::Unknown`].
    pub fn from_raw(raw: &RawStatus) -> Self {
        let converted = match raw {
            RawStatus::Code(code) => Self::from_code(*code),
            RawStatus::Text(text) => Self::from_name(text).or_else(|| {
                text.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(Self::from_code)
            }),
            RawStatus::Other(_) => None,
        };

        converted.unwrap_or_else(|| {
            tracing::warn!(raw = %raw, "Unrecognized tooth status, defaulting to Unknown");
            ToothStatus::Unknown
        })
    }

    /// Canonical name, as the REST API spells it.
    pub fn name(self) -> &'static str {
        match self {
            ToothStatus::Healthy => "Healthy",
            ToothStatus::Caries => "Caries",
            ToothStatus::Treated => "Treated",
            ToothStatus::Lost => "Lost",
            ToothStatus::Other => "Other",
            ToothStatus::Unknown => "Unknown",
        }
    }

    /// Fill colour for the tooth diagram.
    pub fn color(self) -> &'static str {
        match self {
            ToothStatus::Healthy => "#4ade80",
            ToothStatus::Caries => "#facc15",
            ToothStatus::Treated => "#60a5fa",
            ToothStatus::Lost => "#f87171",
            ToothStatus::Other => "#a78bfa",
            ToothStatus::Unknown => "#6b7280",
        }
    }
}

impl fmt::Display for ToothStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A status exactly as the backend returned it.
///
/// The teeth endpoint is inconsistent: some deployments send the enum name,
/// some the numeric code, some the code as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for RawStatus {
    fn default() -> Self {
        RawStatus::Text(String::new())
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawStatus::Code(code) => write!(f, "{}", code),
            RawStatus::Text(text) => write!(f, "{:?}", text),
            RawStatus::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for RawStatus {
    fn from(text: &str) -> Self {
        RawStatus::Text(text.to_string())
    }
}

impl From<String> for RawStatus {
    fn from(text: String) -> Self {
        RawStatus::Text(text)
    }
}

impl From<i64> for RawStatus {
    fn from(code: i64) -> Self {
        RawStatus::Code(code)
    }
}

impl From<ToothStatus> for RawStatus {
    fn from(status: ToothStatus) -> Self {
        RawStatus::Text(status.name().to_string())
    }
}

/// Serde adapter writing a [`ToothStatus`] as its numeric code.
pub(crate) mod as_code {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{RawStatus, ToothStatus};

    pub fn serialize<S: Serializer>(status: &ToothStatus, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(status.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ToothStatus, D::Error> {
        let raw = RawStatus::deserialize(deserializer)?;
        Ok(ToothStatus::from_raw(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_case_insensitive() {
        assert_eq!(ToothStatus::from_raw(&"Healthy".into()), ToothStatus::Healthy);
        assert_eq!(ToothStatus::from_raw(&"caries".into()), ToothStatus::Caries);
        assert_eq!(ToothStatus::from_raw(&"TREATED".into()), ToothStatus::Treated);
        assert_eq!(ToothStatus::from_raw(&"lost".into()), ToothStatus::Lost);
        assert_eq!(ToothStatus::from_raw(&"Other".into()), ToothStatus::Other);
        assert_eq!(ToothStatus::from_raw(&"unknown".into()), ToothStatus::Unknown);
    }

    #[test]
    fn test_numeric_codes() {
        for (code, expected) in ToothStatus::ALL.iter().enumerate() {
            assert_eq!(ToothStatus::from_raw(&(code as i64).into()), *expected);
            assert_eq!(ToothStatus::from_raw(&code.to_string().into()), *expected);
        }
    }

    #[test]
    fn test_unrecognized_defaults_to_unknown() {
        assert_eq!(ToothStatus::from_raw(&"garbage".into()), ToothStatus::Unknown);
        assert_eq!(ToothStatus::from_raw(&99i64.into()), ToothStatus::Unknown);
        assert_eq!(ToothStatus::from_raw(&(-1i64).into()), ToothStatus::Unknown);
        assert_eq!(ToothStatus::from_raw(&"".into()), ToothStatus::Unknown);
        assert_eq!(
            ToothStatus::from_raw(&RawStatus::Other(serde_json::Value::Bool(true))),
            ToothStatus::Unknown
        );
    }

    #[test]
    fn test_raw_status_deserializes_both_shapes() {
        let code: RawStatus = serde_json::from_str("3").unwrap();
        assert_eq!(code, RawStatus::Code(3));

        let text: RawStatus = serde_json::from_str("\"Caries\"").unwrap();
        assert_eq!(text, RawStatus::Text("Caries".into()));

        let other: RawStatus = serde_json::from_str("null").unwrap();
        assert_eq!(ToothStatus::from_raw(&other), ToothStatus::Unknown);
    }

    #[test]
    fn test_code_round_trip() {
        for status in ToothStatus::ALL {
            assert_eq!(ToothStatus::from_code(status.code() as i64), Some(status));
            assert_eq!(ToothStatus::from_name(status.name()), Some(status));
        }
    }

    #[test]
    fn test_colors_distinct() {
        let colors: std::collections::HashSet<_> =
            ToothStatus::ALL.iter().map(|s| s.color()).collect();
        assert_eq!(colors.len(), ToothStatus::ALL.len());
    }
}
