//! Wire format for timestamps: `yyyy-MM-ddTHH:mm:ss`, no offset, no fraction.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(FORMAT))
}

/// Accepts the canonical format and, for peers that send them, fractional seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, FORMAT)
        .or_else(|_| raw.parse::<NaiveDateTime>())
        .map_err(serde::de::Error::custom)
}

/// Current UTC wall clock truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: NaiveDateTime,
    }

    #[test]
    fn test_formats_without_fraction() {
        let at = NaiveDateTime::parse_from_str("2024-03-01T10:15:30", FORMAT).unwrap();
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T10:15:30"}"#);
    }

    #[test]
    fn test_accepts_fractional_seconds() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-03-01T10:15:30.123456"}"#).unwrap();
        assert_eq!(parsed.at.format(FORMAT).to_string(), "2024-03-01T10:15:30");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }

    #[test]
    fn test_now_has_no_fraction() {
        assert_eq!(now().and_utc().timestamp_subsec_nanos(), 0);
    }
}
