use crate::config::NormalizerConfig;
use crate::errors::EntryError;
use crate::model::IobEntry;
use crate::raw::{RawFields, RawRecord};

const CATEGORY: &str = "iob";

pub fn normalize_iob_snapshot(
    fields: &RawFields,
    config: &NormalizerConfig,
) -> Result<IobEntry, EntryError> {
    let record = RawRecord::new(CATEGORY, fields);
    let time = record.wall_clock_timestamp("EventDateTime", config.canonical_timezone())?;

    Ok(IobEntry {
        time,
        iob: record.passthrough("IOB")?,
        event_id: record.passthrough("EventID")?,
    })
}
