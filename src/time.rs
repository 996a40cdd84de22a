//! Timestamp normalization
//!
//! Producers report time in two textual forms; historical logs mix both.
//! The [`Normalizer`] turns either form into an instant in the configured
//! IANA zone:
//!
//! - `"YYYY-MM-DD HH:MM:SS"` (space at byte 10) — naive, interpreted as UTC
//! - ISO-8601 with `T`, optional fractional seconds, optional trailing `Z` —
//!   an explicit offset is honored, otherwise UTC is assumed
//!
//! The zone is carried explicitly by the `Normalizer` value rather than read
//! from process-wide state, so every time-dependent operation receives it as
//! a parameter. Records that fail to normalize are skipped by every read-side
//! consumer; the failure never aborts a scan.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::store::Reading;

/// Timestamp normalization failures
///
/// Always soft-failed: consumers skip the record and continue.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeError {
    /// Record carries neither `timestamp` nor `ts_server`
    #[error("record has no timestamp field")]
    Missing,

    /// Value matched neither accepted textual form
    #[error("unrecognized timestamp: {0}")]
    Unrecognized(String),
}

/// Converts producer timestamps into instants in a fixed local zone
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    zone: Tz,
}

impl Normalizer {
    /// Create a normalizer for an explicit zone
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Create a normalizer from a configured IANA zone name.
    ///
    /// Unset or invalid names fall back to UTC.
    pub fn from_name(name: Option<&str>) -> Self {
        let zone = match name {
            Some(n) => match n.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    tracing::warn!(zone = %n, "Invalid IANA zone name, falling back to UTC");
                    Tz::UTC
                }
            },
            None => Tz::UTC,
        };
        Self { zone }
    }

    /// The configured local zone
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Today's date in the configured zone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }

    /// Normalize a record's timestamp: `timestamp` first, else `ts_server`
    pub fn normalize(&self, reading: &Reading) -> Result<DateTime<Tz>, TimeError> {
        let raw = reading
            .timestamp
            .as_deref()
            .or(reading.ts_server.as_deref())
            .ok_or(TimeError::Missing)?;
        self.parse(raw)
    }

    /// Parse one timestamp string in either accepted form
    pub fn parse(&self, raw: &str) -> Result<DateTime<Tz>, TimeError> {
        // Form (a): space separator at byte 10, naive local-looking, read as UTC
        if raw.as_bytes().get(10) == Some(&b' ') {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
                return Ok(Utc.from_utc_datetime(&naive).with_timezone(&self.zone));
            }
        }

        if raw.contains('T') {
            // Explicit offset (including Z) is honored
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Ok(dt.with_timezone(&self.zone));
            }

            // No offset: strip a stray trailing Z and assume UTC
            let bare = raw.strip_suffix('Z').unwrap_or(raw);
            if let Ok(naive) = NaiveDateTime::parse_from_str(bare, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(Utc.from_utc_datetime(&naive).with_timezone(&self.zone));
            }
        }

        Err(TimeError::Unrecognized(raw.to_string()))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc_normalizer() -> Normalizer {
        Normalizer::new(Tz::UTC)
    }

    #[test]
    fn test_space_form_read_as_utc() {
        let n = utc_normalizer();
        let dt = n.parse("2024-01-01 05:00:00").unwrap();
        assert_eq!(dt.hour(), 5);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_iso_form_without_offset_assumed_utc() {
        let n = utc_normalizer();
        let dt = n.parse("2024-01-01T05:00:00").unwrap();
        assert_eq!(dt.hour(), 5);
    }

    #[test]
    fn test_iso_form_fractional_and_z() {
        let n = utc_normalizer();
        let with_z = n.parse("2024-01-01T05:00:00.489761Z").unwrap();
        let bare = n.parse("2024-01-01T05:00:00.489761").unwrap();
        assert_eq!(with_z, bare);
    }

    #[test]
    fn test_iso_form_honors_offset() {
        let n = utc_normalizer();
        let dt = n.parse("2024-01-01T05:00:00-06:00").unwrap();
        assert_eq!(dt.hour(), 11);
    }

    #[test]
    fn test_conversion_to_configured_zone() {
        let n = Normalizer::new(chrono_tz::America::Costa_Rica);
        // UTC-6, no DST
        let dt = n.parse("2024-01-01 05:00:00").unwrap();
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_normalize_field_priority() {
        let n = utc_normalizer();
        let r = Reading::new("Z1", 20.0, 60.0)
            .timestamp("2024-01-01 05:00:00")
            .ts_server("2024-06-01T12:00:00Z");
        // `timestamp` wins over `ts_server`
        assert_eq!(n.normalize(&r).unwrap().hour(), 5);

        let only_server = Reading::new("Z1", 20.0, 60.0).ts_server("2024-06-01T12:00:00Z");
        assert_eq!(n.normalize(&only_server).unwrap().hour(), 12);
    }

    #[test]
    fn test_missing_and_unrecognized() {
        let n = utc_normalizer();
        assert_eq!(n.normalize(&Reading::default()), Err(TimeError::Missing));
        assert!(matches!(n.parse("yesterday"), Err(TimeError::Unrecognized(_))));
        assert!(matches!(n.parse("2024-01-01"), Err(TimeError::Unrecognized(_))));
    }

    #[test]
    fn test_reparse_of_canonical_output_is_idempotent() {
        let n = Normalizer::new(chrono_tz::America::Costa_Rica);
        let first = n.parse("2024-01-01T05:00:00.250Z").unwrap();
        let again = n.parse(&first.to_rfc3339()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_invalid_zone_name_falls_back_to_utc() {
        let n = Normalizer::from_name(Some("Mars/Olympus_Mons"));
        assert_eq!(n.zone(), Tz::UTC);
        assert_eq!(Normalizer::from_name(None).zone(), Tz::UTC);
    }
}
