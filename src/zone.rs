//! Epoch conversion between the local zone and named business zones.
//!
//! The zone catalog comes from the server and is passed into every call;
//! caching it is the caller's concern. `minute_offset` is minutes ahead of
//! UTC, which is the opposite sign from the platform's own offset query
//! (JS `getTimezoneOffset()` counts minutes behind UTC). All arithmetic
//! here follows the catalog convention; if the catalog convention ever
//! changes, `convert_to_local`/`convert_to_other` change with it.
//!
//! An id missing from the catalog is a configuration bug, not a runtime
//! condition: the converter fails hard instead of guessing, because a
//! silent UTC or local default would corrupt a scheduled time.

use std::io::Read;
use std::sync::OnceLock;

use tracing::debug;

use crate::types::TimeZoneInfo;

#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// The catalog has no entry for the referenced id. Not recoverable;
    /// the catalog and the ids in use are out of sync.
    #[error("unknown time zone id: {zone_id}")]
    UnknownZone { zone_id: String },

    /// The platform did not report a usable local IANA zone name.
    #[error("could not resolve the local time zone: {0}")]
    LocalZone(String),

    /// The catalog payload was not the expected JSON array.
    #[error("time zone catalog decode failed: {0}")]
    Catalog(#[from] serde_json::Error),
}

static LOCAL_ZONE: OnceLock<Result<String, String>> = OnceLock::new();

/// Resolve and cache the process-local IANA zone id. Idempotent: however
/// many call sites run through here, the platform query happens once.
pub fn init() {
    let _ = resolve_local_zone();
}

fn resolve_local_zone() -> &'static Result<String, String> {
    LOCAL_ZONE.get_or_init(|| iana_time_zone::get_timezone().map_err(|e| e.to_string()))
}

/// The local IANA zone id as cached by [`init`].
pub fn local_zone_id() -> Result<&'static str, ZoneError> {
    match resolve_local_zone() {
        Ok(id) => Ok(id.as_str()),
        Err(e) => Err(ZoneError::LocalZone(e.clone())),
    }
}

#[cfg(test)]
pub(crate) fn pin_local_zone(id: &str) {
    // first setter wins; every test pins the same id
    let _ = LOCAL_ZONE.set(Ok(id.to_string()));
}

/// Linear catalog lookup. A miss is a hard error, never a default offset.
pub fn minute_offset(zone_id: &str, catalog: &[TimeZoneInfo]) -> Result<i64, ZoneError> {
    catalog
        .iter()
        .find(|tz| tz.time_zone_id == zone_id)
        .map(|tz| tz.minute_offset)
        .ok_or_else(|| ZoneError::UnknownZone {
            zone_id: zone_id.to_string(),
        })
}

/// The catalog offset of the local zone, resolved via the platform's
/// zone name.
pub fn local_minute_offset(catalog: &[TimeZoneInfo]) -> Result<i64, ZoneError> {
    minute_offset(local_zone_id()?, catalog)
}

fn offset_diff_ms(zone_id: &str, catalog: &[TimeZoneInfo]) -> Result<f64, ZoneError> {
    let diff = local_minute_offset(catalog)? - minute_offset(zone_id, catalog)?;
    Ok((diff * 60_000) as f64)
}

/// Shift an epoch value so it reads as the same wall-clock instant
/// translated from `zone_id` into the local zone.
pub fn convert_to_local(
    epoch_ms: f64,
    zone_id: &str,
    catalog: &[TimeZoneInfo],
) -> Result<f64, ZoneError> {
    Ok(epoch_ms - offset_diff_ms(zone_id, catalog)?)
}

/// Inverse of [`convert_to_local`]: translate a local wall-clock epoch
/// into zone `zone_id`.
pub fn convert_to_other(
    epoch_ms: f64,
    zone_id: &str,
    catalog: &[TimeZoneInfo],
) -> Result<f64, ZoneError> {
    Ok(epoch_ms + offset_diff_ms(zone_id, catalog)?)
}

/// Decode a catalog payload: a JSON array of
/// `{"timeZoneId", "label", "minuteOffset"}` records. One shared decode
/// path for the CLI and tests; fetching and caching stay with the caller.
pub fn load_catalog<R: Read>(reader: R) -> Result<Vec<TimeZoneInfo>, ZoneError> {
    let catalog: Vec<TimeZoneInfo> = serde_json::from_reader(reader)?;
    debug!(entries = catalog.len(), "time zone catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<TimeZoneInfo> {
        load_catalog(
            r#"[
                {"timeZoneId": "America/New_York", "label": "Eastern", "minuteOffset": -300},
                {"timeZoneId": "Europe/Berlin", "label": "Central Europe", "minuteOffset": 120},
                {"timeZoneId": "Asia/Kolkata", "label": "India", "minuteOffset": 330},
                {"timeZoneId": "Etc/UTC", "label": "UTC", "minuteOffset": 0}
            ]"#
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn lookup_finds_catalog_offsets() {
        let cat = catalog();
        assert_eq!(minute_offset("Asia/Kolkata", &cat).unwrap(), 330);
        assert_eq!(minute_offset("America/New_York", &cat).unwrap(), -300);
    }

    #[test]
    fn unknown_zone_is_a_hard_error() {
        let err = minute_offset("Not/AZone", &catalog()).unwrap_err();
        assert!(matches!(err, ZoneError::UnknownZone { ref zone_id } if zone_id == "Not/AZone"));
    }

    #[test]
    fn local_offset_uses_pinned_zone() {
        pin_local_zone("America/New_York");
        assert_eq!(local_minute_offset(&catalog()).unwrap(), -300);
    }

    #[test]
    fn init_is_idempotent() {
        pin_local_zone("America/New_York");
        init();
        init();
        assert_eq!(local_zone_id().unwrap(), "America/New_York");
    }

    #[test]
    fn conversion_round_trips() {
        pin_local_zone("America/New_York");
        let cat = catalog();
        let e = 1697468075673.0;
        for zone in ["Europe/Berlin", "Asia/Kolkata", "Etc/UTC"] {
            let there = convert_to_other(e, zone, &cat).unwrap();
            let back = convert_to_local(there, zone, &cat).unwrap();
            assert_eq!(back, e, "round trip through {zone}");
        }
    }

    #[test]
    fn conversion_direction_follows_catalog_sign() {
        // local pinned at UTC-5, target at UTC+2: diff is -420 minutes, so
        // viewing a Berlin instant locally moves the epoch forward 7 hours
        pin_local_zone("America/New_York");
        let cat = catalog();
        assert_eq!(convert_to_local(0.0, "Europe/Berlin", &cat).unwrap(), 25_200_000.0);
        assert_eq!(convert_to_other(0.0, "Europe/Berlin", &cat).unwrap(), -25_200_000.0);
    }

    #[test]
    fn catalog_decode_error_propagates() {
        assert!(load_catalog("{not json".as_bytes()).is_err());
    }
}
