use std::fmt;

use chrono::offset::LocalResult;
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone as _, Utc,
};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::errors::TimestampError;

/// Zone the pump firmware stamps its epoch values in, whatever the user's zone is.
pub const DEVICE_REFERENCE_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Layouts accepted for wall-clock strings, tried in order.
pub const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

const GAP_SEARCH_HOURS: i64 = 24;

/// Wall-clock fields plus the offset they were resolved to in `zone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedTimestamp {
    local: NaiveDateTime,
    offset: FixedOffset,
    zone: Tz,
}

impl ZonedTimestamp {
    /// Attaches `zone`'s offset to the given wall-clock fields without moving them.
    ///
    /// An ambiguous local time (DST fall-back overlap) takes the earlier, pre-transition
    /// offset. A local time inside a spring-forward gap keeps its fields and takes the
    /// offset in force just after the gap.
    pub fn resolve(local: NaiveDateTime, zone: Tz) -> Result<Self, TimestampError> {
        let offset = match zone.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.offset().fix(),
            LocalResult::Ambiguous(earlier, later) => {
                let earlier = earlier.offset().fix();
                warn!(
                    %local,
                    zone = zone.name(),
                    %earlier,
                    later = %later.offset().fix(),
                    "ambiguous local time, using pre-transition offset"
                );
                earlier
            }
            LocalResult::None => {
                let offset = offset_after_gap(local, zone).ok_or_else(|| {
                    TimestampError::UnresolvableLocalTime {
                        local,
                        zone: zone.name().to_string(),
                    }
                })?;
                warn!(
                    %local,
                    zone = zone.name(),
                    %offset,
                    "local time falls in a DST gap, using post-transition offset"
                );
                offset
            }
        };

        Ok(Self {
            local,
            offset,
            zone,
        })
    }

    pub fn wall_clock(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn to_datetime(&self) -> DateTime<FixedOffset> {
        let utc = self.local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, self.offset)
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.to_datetime().with_timezone(&Utc)
    }

    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}

impl fmt::Display for ZonedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for ZonedTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Corrects an epoch value stamped in [`DEVICE_REFERENCE_TIMEZONE`].
///
/// The epoch is rendered in the device zone to recover the wall-clock the user saw on
/// the pump, then those same fields are relabelled with `canonical`'s offset. The
/// offset is looked up again from the wall-clock fields, so DST transitions in either
/// zone are handled independently.
pub fn correct_epoch_seconds(epoch: i64, canonical: Tz) -> Result<ZonedTimestamp, TimestampError> {
    let instant = DateTime::<Utc>::from_timestamp(epoch, 0)
        .ok_or(TimestampError::EpochOutOfRange(epoch))?;
    let device_wall_clock = instant
        .with_timezone(&DEVICE_REFERENCE_TIMEZONE)
        .naive_local();
    ZonedTimestamp::resolve(device_wall_clock, canonical)
}

/// Parses a wall-clock string that is already in `canonical` and attaches its offset.
pub fn parse_wall_clock(value: &str, canonical: Tz) -> Result<ZonedTimestamp, TimestampError> {
    let trimmed = value.trim();
    let local = WALL_CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| TimestampError::UnparseableWallClock {
            value: value.to_string(),
            formats: WALL_CLOCK_FORMATS.join(", "),
        })?;
    ZonedTimestamp::resolve(local, canonical)
}

fn offset_after_gap(local: NaiveDateTime, zone: Tz) -> Option<FixedOffset> {
    (1..=GAP_SEARCH_HOURS)
        .map(|hours| local + Duration::hours(hours))
        .find_map(|later| zone.from_local_datetime(&later).latest())
        .map(|dt| dt.offset().fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn naive(ts: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").expect("parse timestamp")
    }

    #[test]
    fn resolve_keeps_fields_for_single_local_time() {
        let ts = ZonedTimestamp::resolve(naive("2024-07-01 12:00:00"), New_York).expect("resolve");
        assert_eq!(ts.wall_clock(), naive("2024-07-01 12:00:00"));
        assert_eq!(ts.offset().local_minus_utc(), -4 * 3600);
        assert_eq!(ts.to_rfc3339(), "2024-07-01T12:00:00-04:00");
    }

    #[test]
    fn resolve_takes_earlier_offset_when_ambiguous() {
        let ts = ZonedTimestamp::resolve(naive("2024-11-03 01:30:00"), New_York).expect("resolve");
        assert_eq!(ts.to_rfc3339(), "2024-11-03T01:30:00-04:00");
        assert_eq!(ts.to_utc(), naive("2024-11-03 05:30:00").and_utc());
    }

    #[test]
    fn resolve_labels_gap_time_with_post_transition_offset() {
        let ts = ZonedTimestamp::resolve(naive("2024-03-10 02:30:00"), New_York).expect("resolve");
        assert_eq!(ts.wall_clock(), naive("2024-03-10 02:30:00"));
        assert_eq!(ts.to_rfc3339(), "2024-03-10T02:30:00-04:00");
    }

    #[test]
    fn fractional_seconds_survive_formatting() {
        let ts = parse_wall_clock("2024-07-01T12:00:00.250", New_York).expect("parse");
        assert_eq!(ts.to_rfc3339(), "2024-07-01T12:00:00.250-04:00");
    }

    #[test]
    fn epoch_outside_range_is_rejected() {
        let err = correct_epoch_seconds(i64::MAX, New_York).unwrap_err();
        assert_eq!(err, TimestampError::EpochOutOfRange(i64::MAX));
    }

    #[test]
    fn offset_bearing_strings_are_not_wall_clock() {
        let err = parse_wall_clock("2024-07-01T12:00:00-04:00", New_York).unwrap_err();
        assert!(matches!(err, TimestampError::UnparseableWallClock { .. }));
    }
}
