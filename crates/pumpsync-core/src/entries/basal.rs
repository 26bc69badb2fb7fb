use crate::config::NormalizerConfig;
use crate::errors::EntryError;
use crate::model::{BasalEntry, UNKNOWN_DELIVERY_TYPE};
use crate::raw::{RawFields, RawRecord};

const STREAM_CATEGORY: &str = "stream-basal";
const EXPORT_CATEGORY: &str = "export-basal";

/// Basal segment from the continuous device stream.
///
/// `x` is a device-zone epoch and is corrected; `duration` is in seconds. The stream
/// does not say which delivery type a segment belongs to, so the caller supplies it.
pub fn normalize_stream_basal(
    fields: &RawFields,
    delivery_type: &str,
    config: &NormalizerConfig,
) -> Result<BasalEntry, EntryError> {
    let record = RawRecord::new(STREAM_CATEGORY, fields);
    let time = record.epoch_timestamp("x", config.canonical_timezone())?;
    let duration_secs = record.f64_field("duration")?;
    let basal_rate = record.passthrough("y")?;

    Ok(BasalEntry {
        time,
        delivery_type: delivery_type.to_string(),
        duration_mins: Some(duration_secs / 60.0),
        basal_rate,
    })
}

/// Basal row from the periodic export, whose `EventDateTime` is already local.
pub fn normalize_export_basal(
    fields: &RawFields,
    duration_mins: Option<f64>,
    config: &NormalizerConfig,
) -> Result<BasalEntry, EntryError> {
    let record = RawRecord::new(EXPORT_CATEGORY, fields);
    let time = record.wall_clock_timestamp("EventDateTime", config.canonical_timezone())?;
    let basal_rate = record.passthrough("BasalRate")?;

    Ok(BasalEntry {
        time,
        delivery_type: UNKNOWN_DELIVERY_TYPE.to_string(),
        duration_mins,
        basal_rate,
    })
}
