//! Stored timestamp format
//!
//! Timestamps are RFC 3339 UTC strings with a fixed six-digit fraction, so
//! sorting the stored strings sorts them chronologically.

use bson::Bson;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time at the stored precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time as a stored value, for update documents
pub fn now_bson() -> Bson {
    Bson::String(format(&now()))
}

pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(time))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_width_sorts_chronologically() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(1);
        assert_eq!(format(&whole), "2024-01-01T00:00:00.000000Z");
        assert!(format(&whole) < format(&later));
    }

    #[test]
    fn test_now_survives_a_round_trip() {
        let time = now();
        let parsed = DateTime::parse_from_rfc3339(&format(&time))
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, time);
    }
}
