use chrono_tz::Tz;

use crate::config::NormalizerConfig;
use crate::errors::EntryError;
use crate::model::BolusEntry;
use crate::raw::{RawFields, RawRecord};
use crate::timestamp_fixer::ZonedTimestamp;

const CATEGORY: &str = "bolus";
const EXTENDED_MARKER: &str = "extended";

/// Bolus export row. All of its date-times are already in the user's zone.
///
/// Standard request/completion times are only read for a complete standard bolus and
/// bolex start/completion times only for a complete extended bolus; the other pair is
/// left empty and need not be present on the row.
pub fn normalize_bolus(
    fields: &RawFields,
    config: &NormalizerConfig,
) -> Result<BolusEntry, EntryError> {
    let record = RawRecord::new(CATEGORY, fields);
    let zone = config.canonical_timezone();

    let extended_complete = record.flag_field("ExtendedBolusIsComplete")?;
    let standard_complete = record.flag_field("BolusIsComplete")?;
    let complete = extended_complete || standard_complete;

    let description = record.str_field("Description")?;
    let extended_bolus = description.to_lowercase().contains(EXTENDED_MARKER);

    let completion = if extended_bolus {
        record.passthrough("BolexCompletionStatusDesc")?
    } else {
        record.passthrough("CompletionStatusDesc")?
    };

    let standard_times = complete && !extended_bolus;
    let bolex_times = complete && extended_bolus;

    Ok(BolusEntry {
        description: description.to_string(),
        complete,
        completion,
        request_time: timestamp_if(standard_times, &record, "RequestDateTime", zone)?,
        completion_time: timestamp_if(standard_times, &record, "CompletionDateTime", zone)?,
        insulin: record.passthrough("InsulinDelivered")?,
        carbs: record.passthrough("CarbSize")?,
        user_override: record.passthrough("UserOverride")?,
        extended_bolus,
        bolex_completion_time: timestamp_if(bolex_times, &record, "BolexCompletionDateTime", zone)?,
        bolex_start_time: timestamp_if(bolex_times, &record, "BolexStartDateTime", zone)?,
    })
}

fn timestamp_if(
    wanted: bool,
    record: &RawRecord<'_>,
    field: &'static str,
    zone: Tz,
) -> Result<Option<ZonedTimestamp>, EntryError> {
    if wanted {
        record.wall_clock_timestamp(field, zone).map(Some)
    } else {
        Ok(None)
    }
}
