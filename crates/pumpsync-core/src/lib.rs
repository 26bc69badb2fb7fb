//! Normalization of insulin pump and CGM records into canonical, correctly zoned entries.

pub mod config;
pub mod entries;
pub mod errors;
pub mod model;
pub mod raw;
mod registry;
pub mod timestamp_fixer;

pub use config::NormalizerConfig;
pub use errors::{BatchError, ConfigError, EntryError, TimestampError};
pub use model::{
    ActivityEventKind, BasalEntry, BasalEventKind, BolusEntry, CanonicalRecord, CgmEntry,
    IobEntry, SuspensionEntry, UNKNOWN_DELIVERY_TYPE,
};
pub use raw::{RawFields, RawRecord};
pub use registry::{EntryCategory, EntryContext, EntryNormalizer, UnknownCategory};
pub use timestamp_fixer::{
    correct_epoch_seconds, parse_wall_clock, ZonedTimestamp, DEVICE_REFERENCE_TIMEZONE,
};
