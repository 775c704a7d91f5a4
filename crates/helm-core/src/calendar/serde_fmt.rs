//! Serde adapters for the persisted item list.
//!
//! The stored list predates the core and carries dates in two shapes:
//! plain `YYYY-MM-DD` strings and full RFC 3339 timestamps written by the
//! editor. Both are normalised to a local calendar day here so the
//! resolver only ever sees `NaiveDate`. Empty strings mean "unset".

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

/// Parse a stored date: `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, DATE_FMT) {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .map_err(|_| format!("malformed date '{raw}'"))
}

/// Parse a wall-clock `HH:MM` time of day.
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FMT)
        .map_err(|_| format!("malformed time '{raw}' (expected HH:MM)"))
}

pub mod opt_date {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(day) => s.serialize_str(&day.format(DATE_FMT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_date(&raw).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

pub mod time {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(TIME_FMT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time(&raw).map_err(D::Error::custom)
    }
}

pub mod opt_time {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&t.format(TIME_FMT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_time(&raw).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_date("2024-05-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
    }

    #[test]
    fn parses_timestamps_as_local_day() {
        let expected = DateTime::parse_from_rfc3339("2024-05-10T12:00:00.000Z")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(parse_date("2024-05-10T12:00:00.000Z").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("next tuesday").is_err());
        assert!(parse_time("9am").is_err());
    }
}
