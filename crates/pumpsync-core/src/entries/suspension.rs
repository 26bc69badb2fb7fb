use crate::config::NormalizerConfig;
use crate::errors::EntryError;
use crate::model::SuspensionEntry;
use crate::raw::{RawFields, RawRecord};

const CATEGORY: &str = "suspension";

pub fn normalize_suspension(
    fields: &RawFields,
    config: &NormalizerConfig,
) -> Result<SuspensionEntry, EntryError> {
    let record = RawRecord::new(CATEGORY, fields);
    let time = record.epoch_timestamp("x", config.canonical_timezone())?;

    Ok(SuspensionEntry {
        time,
        continuation: record.passthrough("continuation")?,
        suspend_reason: record.passthrough("suspendReason")?,
    })
}
