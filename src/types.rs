use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Decomposed calendar/time fields, the interchange representation between
/// form widgets and the server.
///
/// A value produced from a partial pattern keeps the zero default for every
/// field the pattern did not mention: a time-only parse has `years == 0` and
/// `date == 0`, which is not a valid calendar date. Callers that need a real
/// date must check that the source format carried date fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInstant {
    /// Calendar year, e.g. 2023. Not zero-based.
    pub years: i32,
    /// Zero-based month, 0 = January.
    pub months: u32,
    /// 1-based day of month; 0 when absent from the source.
    pub date: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl TimeInstant {
    /// Decompose a finite epoch-millisecond value into UTC fields.
    /// Returns `None` for NaN, infinities, or values outside the
    /// representable range.
    pub fn from_epoch_ms(ms: f64) -> Option<TimeInstant> {
        if !ms.is_finite() {
            return None;
        }
        let dt = DateTime::from_timestamp_millis(ms.trunc() as i64)?;
        Some(TimeInstant {
            years: dt.year(),
            months: dt.month0(),
            date: dt.day(),
            hours: dt.hour(),
            minutes: dt.minute(),
            seconds: dt.second(),
            milliseconds: dt.timestamp_subsec_millis(),
        })
    }

    /// Reconstruct an epoch-millisecond value from the fields, UTC frame.
    ///
    /// Out-of-range fields roll over the way a native date constructor
    /// rolls them: month 12 becomes January of the next year, date 0
    /// becomes the last day of the previous month. Returns NaN when the
    /// result falls outside the representable range.
    pub fn to_epoch_ms(&self) -> f64 {
        crate::epoch::compose(
            self.years as i64,
            self.months as i64,
            self.date as i64,
            self.hours as i64,
            self.minutes as i64,
            self.seconds as i64,
            self.milliseconds as i64,
        )
    }
}

/// One entry of the server-supplied time zone catalog.
///
/// `minute_offset` is the zone's offset from UTC in minutes, positive when
/// the zone is ahead of UTC. Note this is the opposite sign convention from
/// the platform's own offset query (JS `getTimezoneOffset()` reports
/// minutes *behind* UTC); the converter arithmetic in `zone` is written
/// against the catalog convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeZoneInfo {
    pub time_zone_id: String,
    pub label: String,
    pub minute_offset: i64,
}

/// Epoch milliseconds of a zone-aware chrono value, as the uniform `f64`
/// time representation used throughout the crate.
pub fn epoch_ms_of<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_epoch_utc() {
        // 2024-06-12T23:59:59.250Z
        let t = TimeInstant::from_epoch_ms(1718236799250.0).unwrap();
        assert_eq!(t.years, 2024);
        assert_eq!(t.months, 5);
        assert_eq!(t.date, 12);
        assert_eq!(t.hours, 23);
        assert_eq!(t.minutes, 59);
        assert_eq!(t.seconds, 59);
        assert_eq!(t.milliseconds, 250);
    }

    #[test]
    fn decompose_rejects_nan_and_infinity() {
        assert_eq!(TimeInstant::from_epoch_ms(f64::NAN), None);
        assert_eq!(TimeInstant::from_epoch_ms(f64::INFINITY), None);
    }

    #[test]
    fn compose_round_trips_decompose() {
        let ms = 1718236799250.0;
        let t = TimeInstant::from_epoch_ms(ms).unwrap();
        assert_eq!(t.to_epoch_ms(), ms);
    }

    #[test]
    fn compose_rolls_over_date_zero() {
        // date 0 means the last day of the previous month
        let t = TimeInstant {
            years: 2024,
            months: 2,
            date: 0,
            ..TimeInstant::default()
        };
        let back = TimeInstant::from_epoch_ms(t.to_epoch_ms()).unwrap();
        assert_eq!((back.years, back.months, back.date), (2024, 1, 29));
    }

    #[test]
    fn epoch_ms_of_collapses_native_dates() {
        use chrono::Utc;
        let dt = Utc.timestamp_millis_opt(1718236799250).unwrap();
        assert_eq!(epoch_ms_of(&dt), 1718236799250.0);
    }

    #[test]
    fn catalog_entry_decodes_server_json() {
        let raw = r#"{"timeZoneId":"America/New_York","label":"Eastern","minuteOffset":-300}"#;
        let tz: TimeZoneInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(tz.time_zone_id, "America/New_York");
        assert_eq!(tz.minute_offset, -300);
    }
}
