use crate::config::NormalizerConfig;
use crate::errors::EntryError;
use crate::model::CgmEntry;
use crate::raw::{RawFields, RawRecord};

const CATEGORY: &str = "cgm";

pub fn normalize_cgm_reading(
    fields: &RawFields,
    config: &NormalizerConfig,
) -> Result<CgmEntry, EntryError> {
    let record = RawRecord::new(CATEGORY, fields);
    let time = record.wall_clock_timestamp("EventDateTime", config.canonical_timezone())?;

    Ok(CgmEntry {
        time,
        reading: record.passthrough("Readings (CGM / BGM)")?,
        reading_type: record.passthrough("Description")?,
    })
}
