//! Timestamp decoding shared by every document type.
//!
//! Stored dates come in several shapes depending on which client wrote them:
//! RFC 3339 strings, bare `YYYY-MM-DD` dates, integer epoch seconds, and
//! `{seconds, nanoseconds}` objects. All of them decode to `DateTime<Utc>`;
//! writes always use RFC 3339.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Seconds(i64),
    Object {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
}

impl RawTimestamp {
    fn resolve(self) -> Result<Option<DateTime<Utc>>, String> {
        match self {
            RawTimestamp::Text(text) if text.trim().is_empty() => Ok(None),
            RawTimestamp::Text(text) => parse(&text)
                .map(Some)
                .ok_or_else(|| format!("unrecognised timestamp {:?}", text)),
            RawTimestamp::Seconds(seconds) => Utc
                .timestamp_opt(seconds, 0)
                .single()
                .map(Some)
                .ok_or_else(|| format!("epoch seconds out of range: {}", seconds)),
            RawTimestamp::Object {
                seconds,
                nanoseconds,
            } => Utc
                .timestamp_opt(seconds, nanoseconds)
                .single()
                .map(Some)
                .ok_or_else(|| format!("timestamp out of range: {}s {}ns", seconds, nanoseconds)),
        }
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?
        .resolve()
        .map_err(D::Error::custom)?
        .ok_or_else(|| D::Error::custom("timestamp is empty"))
}

/// Like [`deserialize`], but `null` and empty strings become `None`
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(raw) => raw.resolve().map_err(D::Error::custom),
        None => Ok(None),
    }
}
